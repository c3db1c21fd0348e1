//! Executor backends.
//!
//! Backends are enabled by Cargo features:
//!
//! - `postgres` (default): [`PostgresExecutor`](postgres::PostgresExecutor), pooled with deadpool-postgres

#[cfg(feature = "postgres")]
pub mod postgres;
