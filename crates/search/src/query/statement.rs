//! Compiled statements handed to an executor.

use serde::Serialize;

use super::binder::{Binder, SqlParam};
use crate::types::Pagination;

/// How the executor should shape returned rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowMode {
    /// One JSON object per row, keyed by column name.
    #[default]
    Object,
    /// One JSON array per row, in column order.
    Array,
}

/// A parameterized SQL statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    /// The SQL text with `$N` placeholders.
    pub text: String,
    /// Parameter values; `values[N - 1]` binds `$N`.
    pub values: Vec<SqlParam>,
    /// Row shape requested from the executor.
    pub row_mode: RowMode,
}

impl Statement {
    /// Creates an object-mode statement.
    pub fn new(text: impl Into<String>, values: Vec<SqlParam>) -> Self {
        Self {
            text: text.into(),
            values,
            row_mode: RowMode::Object,
        }
    }

    /// Creates an array-mode statement.
    pub fn array(text: impl Into<String>, values: Vec<SqlParam>) -> Self {
        Self {
            text: text.into(),
            values,
            row_mode: RowMode::Array,
        }
    }
}

/// Joins non-empty SQL lines with newlines.
///
/// Optional fragments are passed as empty strings and dropped, which keeps
/// the assembled text free of blank lines and stable across calls.
pub(crate) fn lines<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parts
        .into_iter()
        .filter_map(|part| {
            let part = part.as_ref().trim();
            (!part.is_empty()).then(|| part.to_string())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders `WHERE a AND b`, or an empty string when there are no predicates.
pub(crate) fn where_clause<S: AsRef<str>>(predicates: &[S]) -> String {
    if predicates.is_empty() {
        return String::new();
    }
    let joined = predicates
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" AND ");
    format!("WHERE {}", joined)
}

/// Binds a pagination window, returning `LIMIT ... [OFFSET ...]`.
///
/// The limit is capped at `max`; without one the page is `default` rows.
pub(crate) fn bind_window(
    binder: Binder,
    pagination: &Pagination,
    max: u32,
    default: u32,
) -> (String, Binder) {
    let (limit, binder) = binder.bind_opt(pagination.clamped_limit(max).map(SqlParam::from));
    let (offset, binder) = binder.bind_opt(pagination.effective_offset().map(SqlParam::from));
    let limit = match limit {
        Some(p) => format!("LIMIT {p}"),
        None => format!("LIMIT {default}"),
    };
    let window = match offset {
        Some(p) => format!("{limit} OFFSET {p}"),
        None => limit,
    };
    (window, binder)
}
