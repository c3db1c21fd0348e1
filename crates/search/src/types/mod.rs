//! Request and result types.
//!
//! - [`filters`] - closed-set type, rating, style and category filters
//! - [`sort`] - per-entry-point sort keys
//! - [`pagination`] - offset/limit windows and their caps
//! - [`search_params`] - post, tag, tag category and group search requests
//! - [`rows`] - result row shapes

pub mod filters;
pub mod pagination;
pub mod rows;
pub mod search_params;
pub mod sort;

pub use filters::{PostType, Rating, Style, TagCategory};
pub use pagination::{
    MAX_GROUP_LIMIT, MAX_POST_LIMIT, MAX_TAG_CATEGORY_LIMIT, MAX_TAG_LIMIT, Pagination,
};
pub use rows::{PostSearchRow, Row};
pub use search_params::{
    Condition, GroupSearch, PostSearch, TagCategorySearch, TagSearch, TagTypeFilter,
};
pub use sort::{
    GroupSort, GroupSortField, PostSort, PostSortField, Sort, SortField, TagCategorySort,
    TagCategorySortField, TagSort, TagSortField,
};
