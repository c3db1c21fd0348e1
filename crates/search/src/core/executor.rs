//! The executor abstraction.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StorageResult;
use crate::query::Statement;

/// Runs compiled statements against a database.
///
/// Object-mode statements return one JSON object per row; array-mode
/// statements return one JSON array per row. The cache key is a hint:
/// executors that do not cache ignore it.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Runs a statement and returns its rows.
    async fn run(&self, statement: &Statement, cache_key: Option<&str>) -> StorageResult<Vec<Value>>;
}

#[async_trait]
impl<E: Executor + ?Sized> Executor for Arc<E> {
    async fn run(&self, statement: &Statement, cache_key: Option<&str>) -> StorageResult<Vec<Value>> {
        (**self).run(statement, cache_key).await
    }
}
