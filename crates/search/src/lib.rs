//! Moepictures Search
//!
//! This crate compiles post, tag, tag category and group searches for the
//! Moepictures media board into parameterized PostgreSQL statements, and
//! dispatches them through a pluggable executor with optional result caching.
//!
//! # Features
//!
//! - **Tag algebra**: required, any-of, excluded and wildcard tags in one query string
//! - **Facets**: post type, content rating, art style, child visibility, title search
//! - **Sorts**: closed sort vocabulary per entry point, each reversible except `random`
//! - **Paired statements**: every post search yields a page and a count statement sharing one `WHERE`
//! - **Caching**: keyed TTL cache in front of any executor
//!
//! # Backend Features
//!
//! ```toml
//! [dependencies]
//! moepictures-search = { version = "0.1", features = ["postgres"] }
//! ```
//!
//! - `postgres` (default) - pooled PostgreSQL executor
//!
//! # Architecture
//!
//! - [`types`] - request, sort, pagination and row types
//! - [`query`] - pure statement compilation
//! - [`core`] - the [`Executor`](core::Executor) trait and the result cache
//! - [`dispatch`] - named entry points over an executor
//! - [`backends`] - executor implementations
//! - [`error`] - error types for all operations
//!
//! # Quick Start
//!
//! ```
//! use moepictures_search::query::compile_post_search;
//! use moepictures_search::types::{PostSearch, PostSort, Rating};
//!
//! let search = PostSearch::new(["landscape", "-text", "*^sky"])
//!     .with_rating(Rating::Cute)
//!     .with_sort("reverse cuteness".parse::<PostSort>().unwrap())
//!     .with_limit(25);
//!
//! let statements = compile_post_search(&search);
//!
//! // Both statements filter on the same predicates
//! assert!(statements.page.text.contains(&statements.where_clause));
//! assert!(statements.count.text.contains(&statements.where_clause));
//!
//! // The count statement binds a prefix of the page statement's values
//! let n = statements.count.values.len();
//! assert_eq!(statements.count.values[..], statements.page.values[..n]);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod core;
pub mod dispatch;
pub mod error;
pub mod query;
pub mod types;

pub use core::{CacheConfig, CachingExecutor, Executor};
pub use dispatch::SearchService;
pub use error::{BackendError, SearchError, SearchResult, StorageError, StorageResult};
pub use query::{PostStatements, SqlParam, Statement, compile_post_search};
pub use types::{PostSearch, PostSearchRow, Row};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
