//! Search request types.
//!
//! A request is built once per call and compiled into statements by the
//! functions in [`crate::query`]. Requests serialize to a stable JSON form,
//! which the dispatcher uses as part of the executor cache key.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::filters::{PostType, Rating, Style, TagCategory};
use super::pagination::Pagination;
use super::sort::{GroupSort, PostSort, TagCategorySort, TagSort};
use crate::query::binder::Placeholder;

/// A fixed predicate contributed by a specialized post entry point.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Condition {
    /// Source or mirror is a pixiv artwork URL ending in the id.
    PixivId(String),
    /// Source or mirror is an x.com / twitter.com status URL ending in the id.
    TwitterId(String),
    /// Source or mirror contains the substring.
    Source(String),
}

impl Condition {
    /// The value bound for the condition's placeholder.
    pub fn value(&self) -> &str {
        match self {
            Condition::PixivId(v) | Condition::TwitterId(v) | Condition::Source(v) => v,
        }
    }

    /// Renders the predicate with the value bound at `p`.
    pub fn predicate(&self, p: Placeholder) -> String {
        match self {
            Condition::PixivId(_) => format!(
                "(posts.\"source\" LIKE 'https://%pixiv.net/%/' || {p} \
                 OR posts.\"mirrors\"::text LIKE 'https://%pixiv.net/%/' || {p})"
            ),
            Condition::TwitterId(_) => format!(
                "(posts.\"source\" LIKE 'https://%x.com/%/status/' || {p} \
                 OR posts.\"source\" LIKE 'https://%twitter.com/%/status/' || {p} \
                 OR posts.\"mirrors\"::text LIKE 'https://%x.com/%/status/' || {p} \
                 OR posts.\"mirrors\"::text LIKE 'https://%twitter.com/%/status/' || {p})"
            ),
            Condition::Source(_) => format!(
                "(posts.\"source\" LIKE '%' || {p} || '%' \
                 OR posts.\"mirrors\"::text LIKE '%' || {p} || '%')"
            ),
        }
    }
}

/// A faceted post search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostSearch {
    /// Prefixed tag tokens (see [`crate::query::classifier`]).
    pub tags: Vec<String>,
    /// Media type filter.
    #[serde(rename = "type")]
    pub post_type: PostType,
    /// Rating filter.
    pub rating: Rating,
    /// Style filter.
    pub style: Style,
    /// Sort order. Unknown keys fall back to the default order.
    #[serde(deserialize_with = "post_sort_or_default")]
    pub sort: PostSort,
    /// Offset/limit window.
    #[serde(flatten)]
    pub pagination: Pagination,
    /// Project the post's tag array even when no tag filter needs it.
    pub with_tags: bool,
    /// Include child posts.
    pub show_children: bool,
    /// Acting user, if signed in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Case-insensitive title substring.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Image filename suffix, such as `png`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Entry-point condition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    /// Apply ORDER BY/LIMIT/OFFSET inside the aggregation CTE rather than on
    /// the outer select.
    pub interm_limit: bool,
}

fn post_sort_or_default<'de, D>(deserializer: D) -> Result<PostSort, D::Error>
where
    D: Deserializer<'de>,
{
    let sort = Option::<String>::deserialize(deserializer)?;
    Ok(sort.map(|s| PostSort::parse_or_default(&s)).unwrap_or_default())
}

impl Default for PostSearch {
    fn default() -> Self {
        Self {
            tags: Vec::new(),
            post_type: PostType::default(),
            rating: Rating::default(),
            style: Style::default(),
            sort: PostSort::default(),
            pagination: Pagination::default(),
            with_tags: false,
            show_children: false,
            username: None,
            search: None,
            format: None,
            condition: None,
            interm_limit: true,
        }
    }
}

impl PostSearch {
    /// Creates a search for the given tag tokens with default filters.
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Sets the media type filter.
    pub fn with_type(mut self, post_type: PostType) -> Self {
        self.post_type = post_type;
        self
    }

    /// Sets the rating filter.
    pub fn with_rating(mut self, rating: Rating) -> Self {
        self.rating = rating;
        self
    }

    /// Sets the style filter.
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Sets the sort order.
    pub fn with_sort(mut self, sort: PostSort) -> Self {
        self.sort = sort;
        self
    }

    /// Sets the offset.
    pub fn with_offset(mut self, offset: u32) -> Self {
        self.pagination.offset = Some(offset);
        self
    }

    /// Sets the limit.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.pagination.limit = Some(limit);
        self
    }

    /// Sets whether the tag array is projected.
    pub fn with_tags(mut self, with_tags: bool) -> Self {
        self.with_tags = with_tags;
        self
    }

    /// Sets whether child posts are included.
    pub fn with_children(mut self, show_children: bool) -> Self {
        self.show_children = show_children;
        self
    }

    /// Sets the acting user.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the title search term.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Sets the image format suffix.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Sets the entry-point condition.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Sets where pagination is applied.
    pub fn with_interm_limit(mut self, interm_limit: bool) -> Self {
        self.interm_limit = interm_limit;
        self
    }

    /// The acting user, ignoring empty names.
    pub fn user(&self) -> Option<&str> {
        self.username.as_deref().filter(|u| !u.is_empty())
    }
}

/// Tag type restriction for tag search.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum TagTypeFilter {
    /// Any type.
    #[default]
    All,
    /// The general-purpose types (appearance, outfit, accessory, scenery,
    /// action and plain tags).
    Tags,
    /// A single type, bound as a parameter.
    Exact(String),
}

impl fmt::Display for TagTypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagTypeFilter::All => write!(f, "all"),
            TagTypeFilter::Tags => write!(f, "tags"),
            TagTypeFilter::Exact(t) => f.write_str(t),
        }
    }
}

impl FromStr for TagTypeFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "" | "all" => TagTypeFilter::All,
            "tags" => TagTypeFilter::Tags,
            other => TagTypeFilter::Exact(other.to_string()),
        })
    }
}

impl Serialize for TagTypeFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TagTypeFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Tag search by name or alias substring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TagSearch {
    /// Substring of the tag or one of its aliases.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Sort order; `None` leaves rows unordered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<TagSort>,
    /// Tag type restriction.
    #[serde(rename = "type")]
    pub tag_type: TagTypeFilter,
    /// Offset/limit window.
    #[serde(flatten)]
    pub pagination: Pagination,
}

impl TagSearch {
    /// Creates a tag search for a substring.
    pub fn new(search: impl Into<String>) -> Self {
        Self {
            search: Some(search.into()),
            ..Default::default()
        }
    }

    /// Sets the sort order.
    pub fn with_sort(mut self, sort: TagSort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Sets the tag type restriction.
    pub fn with_type(mut self, tag_type: TagTypeFilter) -> Self {
        self.tag_type = tag_type;
        self
    }

    /// Sets the pagination window.
    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }
}

/// Browse tags of one category with sample posts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagCategorySearch {
    /// The category to browse.
    pub category: TagCategory,
    /// Sort order; `None` leaves rows unordered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<TagCategorySort>,
    /// Tag name prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Offset/limit window.
    #[serde(flatten)]
    pub pagination: Pagination,
}

impl TagCategorySearch {
    /// Creates a search over one category.
    pub fn new(category: TagCategory) -> Self {
        Self {
            category,
            sort: None,
            search: None,
            pagination: Pagination::default(),
        }
    }

    /// Sets the sort order.
    pub fn with_sort(mut self, sort: TagCategorySort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Sets the tag name prefix.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Sets the pagination window.
    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }
}

/// Group search by name substring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupSearch {
    /// Substring of the group name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Sort order; `None` leaves rows unordered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<GroupSort>,
    /// Rating filter on the group.
    pub rating: Rating,
    /// Offset/limit window.
    #[serde(flatten)]
    pub pagination: Pagination,
    /// Acting user, if signed in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl GroupSearch {
    /// Creates a group search for a substring.
    pub fn new(search: impl Into<String>) -> Self {
        Self {
            search: Some(search.into()),
            ..Default::default()
        }
    }

    /// Sets the sort order.
    pub fn with_sort(mut self, sort: GroupSort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Sets the rating filter.
    pub fn with_rating(mut self, rating: Rating) -> Self {
        self.rating = rating;
        self
    }

    /// Sets the pagination window.
    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    /// Sets the acting user.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::binder::{Binder, SqlParam};
    use crate::types::sort::{PostSortField, Sort};

    #[test]
    fn test_default_uses_interm_limit() {
        let search = PostSearch::default();
        assert!(search.interm_limit);
        assert_eq!(search.rating, Rating::All);
        assert_eq!(search.style, Style::All);
        assert_eq!(search.sort, PostSort::default());
    }

    #[test]
    fn test_builder() {
        let search = PostSearch::new(["kawaii", "+dog"])
            .with_type(PostType::Image)
            .with_sort(Sort::reversed(PostSortField::Cuteness))
            .with_limit(20)
            .with_offset(40)
            .with_username("alice");
        assert_eq!(search.tags, vec!["kawaii", "+dog"]);
        assert_eq!(search.pagination.limit, Some(20));
        assert_eq!(search.pagination.offset, Some(40));
        assert_eq!(search.user(), Some("alice"));
    }

    #[test]
    fn test_empty_username_is_anonymous() {
        let search = PostSearch::default().with_username("");
        assert_eq!(search.user(), None);
    }

    #[test]
    fn test_serialization_is_stable() {
        let a = PostSearch::new(["a"]).with_limit(10);
        let b = PostSearch::new(["a"]).with_limit(10);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["type"], "all");
        assert_eq!(json["sort"], "date");
        assert_eq!(json["limit"], 10);
        assert!(json.get("username").is_none());
    }

    #[test]
    fn test_deserialize_partial_request() {
        let search: PostSearch =
            serde_json::from_str(r#"{"tags":["x"],"rating":"all+h","sort":"reverse posted"}"#)
                .unwrap();
        assert_eq!(search.rating, Rating::AllH);
        assert_eq!(search.sort, Sort::reversed(PostSortField::Posted));
        assert!(search.interm_limit);
    }

    #[test]
    fn test_deserialize_unknown_or_null_sort_uses_default() {
        let search: PostSearch =
            serde_json::from_str(r#"{"tags":["a"],"sort":"sideways"}"#).unwrap();
        assert_eq!(search.sort, PostSort::default());

        let search: PostSearch = serde_json::from_str(r#"{"sort":null}"#).unwrap();
        assert_eq!(search.sort, PostSort::default());

        let search: PostSearch = serde_json::from_str(r#"{"sort":"reverse random"}"#).unwrap();
        assert_eq!(search.sort, PostSort::default());
    }

    #[test]
    fn test_condition_predicate_reuses_placeholder() {
        let (p, _) = Binder::new().bind(SqlParam::text("12345"));
        let cond = Condition::PixivId("12345".to_string());
        assert_eq!(
            cond.predicate(p),
            "(posts.\"source\" LIKE 'https://%pixiv.net/%/' || $1 \
             OR posts.\"mirrors\"::text LIKE 'https://%pixiv.net/%/' || $1)"
        );
        assert_eq!(cond.value(), "12345");
        assert_eq!(
            Condition::TwitterId("9".to_string()).predicate(p).matches("$1").count(),
            4
        );
    }

    #[test]
    fn test_tag_type_filter_parse() {
        assert_eq!("all".parse::<TagTypeFilter>().unwrap(), TagTypeFilter::All);
        assert_eq!("".parse::<TagTypeFilter>().unwrap(), TagTypeFilter::All);
        assert_eq!("tags".parse::<TagTypeFilter>().unwrap(), TagTypeFilter::Tags);
        assert_eq!(
            "artist".parse::<TagTypeFilter>().unwrap(),
            TagTypeFilter::Exact("artist".to_string())
        );
    }
}
