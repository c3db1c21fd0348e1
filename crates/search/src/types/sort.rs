//! Sort keys.
//!
//! Every entry point has its own closed set of sort fields. A [`Sort`] pairs
//! a field with a direction; the wire form is the field name, optionally
//! preceded by `reverse ` (for example `"reverse cuteness"`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SearchError;

/// A closed set of sortable fields for one entry point.
pub trait SortField: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Facet name used in error messages.
    const FACET: &'static str;

    /// The wire name of the field.
    fn name(self) -> &'static str;

    /// Looks up a field by wire name.
    fn from_name(name: &str) -> Option<Self>;

    /// Whether the field accepts the `reverse ` prefix.
    fn reversible(self) -> bool {
        true
    }
}

/// A sort field with a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sort<F> {
    /// The field to order by.
    pub field: F,
    /// True for the `reverse` twin of the field.
    pub reverse: bool,
}

impl<F: SortField> Sort<F> {
    /// Creates a forward sort.
    pub fn new(field: F) -> Self {
        Self {
            field,
            reverse: false,
        }
    }

    /// Creates a reverse sort.
    pub fn reversed(field: F) -> Self {
        Self {
            field,
            reverse: true,
        }
    }
}

impl<F: SortField> fmt::Display for Sort<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reverse {
            write!(f, "reverse {}", self.field.name())
        } else {
            f.write_str(self.field.name())
        }
    }
}

impl<F: SortField> FromStr for Sort<F> {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SearchError::InvalidSort {
            facet: F::FACET,
            value: s.to_string(),
        };
        let (name, reverse) = match s.strip_prefix("reverse ") {
            Some(rest) => (rest, true),
            None => (s, false),
        };
        let field = F::from_name(name).ok_or_else(invalid)?;
        if reverse && !field.reversible() {
            return Err(invalid());
        }
        Ok(Self { field, reverse })
    }
}

impl<F: SortField> Serialize for Sort<F> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de, F: SortField> Deserialize<'de> for Sort<F> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Post search sort fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostSortField {
    /// Upload date.
    Date,
    /// When the acting user last viewed the post.
    ViewDate,
    /// Original publication date.
    Posted,
    /// Mean cuteness vote.
    Cuteness,
    /// Favorite count.
    Popularity,
    /// Number of images in the post.
    Variations,
    /// Whether the post has children.
    Parent,
    /// Parent post id.
    Child,
    /// Whether the post belongs to a group.
    Groups,
    /// Number of tags.
    TagCount,
    /// Largest image size.
    FileSize,
    /// Width over height of the largest image.
    AspectRatio,
    /// Bookmark count.
    Bookmarks,
    /// When the acting user favorited the post.
    Favorites,
    /// Hidden posts first.
    Hidden,
    /// Locked posts first.
    Locked,
    /// Private posts first.
    Private,
    /// Random order, never cached.
    Random,
}

impl SortField for PostSortField {
    const FACET: &'static str = "post";

    fn name(self) -> &'static str {
        match self {
            PostSortField::Date => "date",
            PostSortField::ViewDate => "viewDate",
            PostSortField::Posted => "posted",
            PostSortField::Cuteness => "cuteness",
            PostSortField::Popularity => "popularity",
            PostSortField::Variations => "variations",
            PostSortField::Parent => "parent",
            PostSortField::Child => "child",
            PostSortField::Groups => "groups",
            PostSortField::TagCount => "tagcount",
            PostSortField::FileSize => "filesize",
            PostSortField::AspectRatio => "aspectRatio",
            PostSortField::Bookmarks => "bookmarks",
            PostSortField::Favorites => "favorites",
            PostSortField::Hidden => "hidden",
            PostSortField::Locked => "locked",
            PostSortField::Private => "private",
            PostSortField::Random => "random",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "date" => PostSortField::Date,
            "viewDate" => PostSortField::ViewDate,
            "posted" => PostSortField::Posted,
            "cuteness" => PostSortField::Cuteness,
            "popularity" => PostSortField::Popularity,
            "variations" => PostSortField::Variations,
            "parent" => PostSortField::Parent,
            "child" => PostSortField::Child,
            "groups" => PostSortField::Groups,
            "tagcount" => PostSortField::TagCount,
            "filesize" => PostSortField::FileSize,
            "aspectRatio" => PostSortField::AspectRatio,
            "bookmarks" => PostSortField::Bookmarks,
            "favorites" => PostSortField::Favorites,
            "hidden" => PostSortField::Hidden,
            "locked" => PostSortField::Locked,
            "private" => PostSortField::Private,
            "random" => PostSortField::Random,
            _ => return None,
        })
    }

    fn reversible(self) -> bool {
        self != PostSortField::Random
    }
}

/// Post search sort key.
pub type PostSort = Sort<PostSortField>;

impl Default for PostSort {
    fn default() -> Self {
        Sort::new(PostSortField::Date)
    }
}

impl PostSort {
    /// Parses a sort key, falling back to the default order for unknown input.
    pub fn parse_or_default(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| {
            tracing::warn!(sort = %s, "unknown post sort, using upload date");
            Self::default()
        })
    }

    /// Returns false for orders whose results must not be served from cache.
    pub fn is_cacheable(&self) -> bool {
        !matches!(
            self.field,
            PostSortField::Random | PostSortField::Favorites
        )
    }

    /// Returns true if the order is only meaningful for a signed-in user.
    pub fn needs_user(&self) -> bool {
        matches!(
            self.field,
            PostSortField::Favorites | PostSortField::ViewDate
        )
    }
}

/// Tag search sort fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagSortField {
    /// Random order.
    Random,
    /// Last update date.
    Date,
    /// Tag name.
    Alphabetic,
    /// Number of posts with the tag.
    Posts,
    /// Number of distinct tag images.
    Image,
    /// Number of aliases.
    Aliases,
    /// Tag name length.
    Length,
}

impl SortField for TagSortField {
    const FACET: &'static str = "tag";

    fn name(self) -> &'static str {
        match self {
            TagSortField::Random => "random",
            TagSortField::Date => "date",
            TagSortField::Alphabetic => "alphabetic",
            TagSortField::Posts => "posts",
            TagSortField::Image => "image",
            TagSortField::Aliases => "aliases",
            TagSortField::Length => "length",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "random" => TagSortField::Random,
            "date" => TagSortField::Date,
            "alphabetic" => TagSortField::Alphabetic,
            "posts" => TagSortField::Posts,
            "image" => TagSortField::Image,
            "aliases" => TagSortField::Aliases,
            "length" => TagSortField::Length,
            _ => return None,
        })
    }

    fn reversible(self) -> bool {
        self != TagSortField::Random
    }
}

/// Tag search sort key.
pub type TagSort = Sort<TagSortField>;

/// Tag category sort fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagCategorySortField {
    /// Random order.
    Random,
    /// Mean cuteness of the tag's posts.
    Cuteness,
    /// Number of posts with the tag.
    Posts,
    /// Tag name.
    Alphabetic,
}

impl SortField for TagCategorySortField {
    const FACET: &'static str = "tag category";

    fn name(self) -> &'static str {
        match self {
            TagCategorySortField::Random => "random",
            TagCategorySortField::Cuteness => "cuteness",
            TagCategorySortField::Posts => "posts",
            TagCategorySortField::Alphabetic => "alphabetic",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "random" => TagCategorySortField::Random,
            "cuteness" => TagCategorySortField::Cuteness,
            "posts" => TagCategorySortField::Posts,
            "alphabetic" => TagCategorySortField::Alphabetic,
            _ => return None,
        })
    }

    fn reversible(self) -> bool {
        self != TagCategorySortField::Random
    }
}

/// Tag category sort key.
pub type TagCategorySort = Sort<TagCategorySortField>;

/// Group search sort fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupSortField {
    /// Random order.
    Random,
    /// Creation date.
    Date,
    /// Number of posts in the group.
    Posts,
}

impl SortField for GroupSortField {
    const FACET: &'static str = "group";

    fn name(self) -> &'static str {
        match self {
            GroupSortField::Random => "random",
            GroupSortField::Date => "date",
            GroupSortField::Posts => "posts",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "random" => GroupSortField::Random,
            "date" => GroupSortField::Date,
            "posts" => GroupSortField::Posts,
            _ => return None,
        })
    }

    fn reversible(self) -> bool {
        self != GroupSortField::Random
    }
}

/// Group search sort key.
pub type GroupSort = Sort<GroupSortField>;
