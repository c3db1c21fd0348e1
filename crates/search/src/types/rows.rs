//! Result row shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{SearchError, SearchResult};

/// A row as returned by an executor in object mode.
pub type Row = serde_json::Map<String, Value>;

/// One post of a post search page.
///
/// The derived aggregate columns are typed; every other post column is kept
/// as-is in [`post`](Self::post).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSearchRow {
    /// Post table columns.
    #[serde(flatten)]
    pub post: Row,

    /// Image rows of the post.
    #[serde(default)]
    pub images: Vec<Value>,

    /// Tag array, present when tags were joined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    /// Number of tags, present when tags were joined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_count: Option<i64>,

    /// Largest image size including its upscaled copy, in bytes.
    #[serde(default)]
    pub file_size: Option<f64>,

    /// Width over height of the largest image.
    #[serde(default)]
    pub aspect_ratio: Option<f64>,

    /// Number of images in the post.
    #[serde(default)]
    pub variation_count: i64,

    /// Number of users who favorited the post.
    #[serde(default)]
    pub favorite_count: i64,

    /// Rounded mean cuteness vote.
    #[serde(default)]
    pub cuteness: Option<f64>,

    /// Whether any post names this one as its parent.
    #[serde(default)]
    pub has_children: bool,

    /// Whether the post belongs to at least one group.
    #[serde(default)]
    pub is_grouped: bool,

    /// Whether the acting user favorited the post.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorited: Option<bool>,

    /// Whether the post is in one of the acting user's favorite groups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favgrouped: Option<bool>,

    /// Total matching posts across all pages, as a decimal string.
    #[serde(default)]
    pub post_count: String,
}

impl PostSearchRow {
    /// Decodes an object-mode row.
    pub fn from_value(value: Value) -> SearchResult<Self> {
        serde_json::from_value(value).map_err(|e| SearchError::MalformedRow {
            statement: "page",
            message: e.to_string(),
        })
    }

    /// Returns the post id column, if present.
    pub fn post_id(&self) -> Option<i64> {
        match self.post.get("postID")? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

/// Decodes an object-mode row into a plain map.
pub fn into_row(value: Value) -> SearchResult<Row> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(SearchError::MalformedRow {
            statement: "page",
            message: format!("expected an object row, got {}", other),
        }),
    }
}
