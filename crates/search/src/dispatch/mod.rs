//! Search dispatch.
//!
//! [`SearchService`] exposes one async method per entry point. Each compiles
//! its request, runs the statements on an [`Executor`](crate::core::Executor)
//! and shapes the rows.
//!
//! | Entry point | Cache key prefix |
//! |-------------|------------------|
//! | `search` | `search/posts` |
//! | `search_pixiv_id` | `search/pixiv-id` |
//! | `search_twitter_id` | `search/twitter-id` |
//! | `search_source` | `search/source` |
//! | `search_format` | `search/format` |
//! | `posts_by_id` | `search/posts/ids` |
//! | `deleted_posts` | `search/posts/deleted` |
//! | `unverified_posts` | not cached |
//! | `tag_category` | not cached |
//! | `tag_search` | `search/tags` |
//! | `tag_social_search` | `search/tags/social` |
//! | `group_search` | not cached |
//!
//! Post searches sorted by `random` or `favorites`, and tag searches sorted
//! by `random`, are never cached.

pub mod service;

pub use service::{SearchService, cache_key, parse_count};
