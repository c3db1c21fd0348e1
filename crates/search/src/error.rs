//! Error types for the search layer.
//!
//! Errors are split the same way the work is split: [`SearchError`] covers
//! everything the compiler and dispatcher can reject on their own, and
//! [`BackendError`] covers failures reported by an [`Executor`](crate::core::Executor).
//! [`StorageError`] wraps both and is what every async entry point returns.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for all search operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Compilation or result-shaping errors
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Executor/backend errors
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors raised while validating input or shaping results.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// A closed-set filter value (type, rating, style, ...) was not recognized.
    #[error("invalid {facet} filter: '{value}'")]
    InvalidFilter { facet: &'static str, value: String },

    /// A sort key was not recognized for an entry point that has no fallback order.
    #[error("invalid {facet} sort: '{value}'")]
    InvalidSort { facet: &'static str, value: String },

    /// A row returned by the executor did not have the expected shape.
    #[error("malformed {statement} row: {message}")]
    MalformedRow {
        statement: &'static str,
        message: String,
    },
}

/// Errors originating from the database executor.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Connection to the backend failed.
    #[error("connection failed to {backend_name}: {message}")]
    ConnectionFailed {
        backend_name: String,
        message: String,
    },

    /// Query execution error.
    #[error("query execution failed: {message}")]
    QueryError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {message}")]
    SerializationError { message: String },

    /// Internal backend error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Result type alias for executor-backed operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for validation and result shaping.
pub type SearchResult<T> = Result<T, SearchError>;

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Backend(BackendError::SerializationError {
            message: err.to_string(),
        })
    }
}

#[cfg(feature = "postgres")]
impl From<tokio_postgres::Error> for StorageError {
    fn from(err: tokio_postgres::Error) -> Self {
        StorageError::Backend(BackendError::QueryError {
            message: err.to_string(),
            source: Some(Box::new(err)),
        })
    }
}

#[cfg(feature = "postgres")]
impl From<deadpool_postgres::PoolError> for StorageError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        StorageError::Backend(BackendError::ConnectionFailed {
            backend_name: "postgres".to_string(),
            message: err.to_string(),
        })
    }
}
