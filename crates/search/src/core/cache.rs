//! Result caching in front of an executor.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::Instant;

use super::executor::Executor;
use crate::error::StorageResult;
use crate::query::Statement;

/// Configuration for [`CachingExecutor`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// How long a cached result stays valid.
    #[serde(with = "humantime_serde", default = "default_ttl")]
    pub ttl: Duration,

    /// Maximum number of cached results.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_ttl() -> Duration {
    Duration::from_secs(60)
}

fn default_max_entries() -> usize {
    1000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: default_ttl(),
            max_entries: default_max_entries(),
        }
    }
}

impl CacheConfig {
    /// Sets the TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the entry cap.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    rows: Vec<Value>,
    inserted: Instant,
}

/// Caches rows by key in front of another executor.
///
/// Statements run without a key always go to the inner executor.
pub struct CachingExecutor<E> {
    inner: E,
    config: CacheConfig,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl<E> std::fmt::Debug for CachingExecutor<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingExecutor")
            .field("config", &self.config)
            .field("entries", &self.entries.read().len())
            .finish_non_exhaustive()
    }
}

impl<E: Executor> CachingExecutor<E> {
    /// Wraps an executor.
    pub fn new(inner: E, config: CacheConfig) -> Self {
        Self {
            inner,
            config,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The wrapped executor.
    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// Number of cached results, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drops every cached result.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Drops cached results whose key starts with `prefix`, returning how many.
    pub fn clear_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        let removed = before - entries.len();
        tracing::debug!(prefix, removed, "cleared cached results");
        removed
    }

    fn lookup(&self, key: &str) -> Option<Vec<Value>> {
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        (entry.inserted.elapsed() < self.config.ttl).then(|| entry.rows.clone())
    }

    fn store(&self, key: &str, rows: &[Value]) {
        if self.config.max_entries == 0 {
            return;
        }
        let mut entries = self.entries.write();
        if entries.len() >= self.config.max_entries && !entries.contains_key(key) {
            let ttl = self.config.ttl;
            entries.retain(|_, entry| entry.inserted.elapsed() < ttl);
            if entries.len() >= self.config.max_entries {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.inserted)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                }
            }
        }
        entries.insert(
            key.to_string(),
            CacheEntry {
                rows: rows.to_vec(),
                inserted: Instant::now(),
            },
        );
    }
}

#[async_trait]
impl<E: Executor> Executor for CachingExecutor<E> {
    async fn run(&self, statement: &Statement, cache_key: Option<&str>) -> StorageResult<Vec<Value>> {
        let Some(key) = cache_key else {
            return self.inner.run(statement, None).await;
        };

        if let Some(rows) = self.lookup(key) {
            tracing::debug!(key, rows = rows.len(), "cache hit");
            return Ok(rows);
        }

        tracing::debug!(key, "cache miss");
        let rows = self.inner.run(statement, Some(key)).await?;
        self.store(key, &rows);
        Ok(rows)
    }
}

/// Serde module for Duration with humantime format.
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
