//! Executor abstractions.
//!
//! - [`Executor`] - runs a [`Statement`](crate::query::Statement) and returns rows
//! - [`CachingExecutor`] - keyed, TTL-bounded result cache wrapping any executor

pub mod cache;
pub mod executor;

pub use cache::{CacheConfig, CachingExecutor};
pub use executor::Executor;
