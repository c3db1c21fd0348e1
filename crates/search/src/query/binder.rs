//! Positional parameter binding.
//!
//! A [`Binder`] owns the parameter list of one statement. Binding a value
//! consumes the binder and hands back the reserved [`Placeholder`] together
//! with the next binder, so a clause can only ever reference a slot that
//! was filled for it, and two clauses can never claim the same slot.

use std::fmt;

use serde::Serialize;

/// A typed SQL parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SqlParam {
    /// `text` parameter.
    Text(String),
    /// `text[]` parameter.
    TextArray(Vec<String>),
    /// `bigint` parameter.
    Integer(i64),
    /// `bigint[]` parameter.
    IntegerArray(Vec<i64>),
}

impl SqlParam {
    /// Creates a text parameter.
    pub fn text(s: impl Into<String>) -> Self {
        SqlParam::Text(s.into())
    }

    /// Creates a text array parameter.
    pub fn text_array<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SqlParam::TextArray(items.into_iter().map(Into::into).collect())
    }

    /// Returns the SQL type the parameter is bound as.
    pub fn sql_type(&self) -> &'static str {
        match self {
            SqlParam::Text(_) => "text",
            SqlParam::TextArray(_) => "text[]",
            SqlParam::Integer(_) => "bigint",
            SqlParam::IntegerArray(_) => "bigint[]",
        }
    }
}

impl From<u32> for SqlParam {
    fn from(value: u32) -> Self {
        SqlParam::Integer(i64::from(value))
    }
}

/// A reserved `$N` position in a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Placeholder(usize);

impl Placeholder {
    /// Returns the 1-based parameter index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// Accumulates the parameters of one statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Binder {
    params: Vec<SqlParam>,
}

impl Binder {
    /// Creates an empty binder; the first bind reserves `$1`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a value, returning its placeholder and the advanced binder.
    #[must_use]
    pub fn bind(mut self, param: SqlParam) -> (Placeholder, Self) {
        self.params.push(param);
        (Placeholder(self.params.len()), self)
    }

    /// Binds a value only when present.
    #[must_use]
    pub fn bind_opt(self, param: Option<SqlParam>) -> (Option<Placeholder>, Self) {
        match param {
            Some(param) => {
                let (placeholder, binder) = self.bind(param);
                (Some(placeholder), binder)
            }
            None => (None, self),
        }
    }

    /// Number of values bound so far.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns true if nothing has been bound.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// The values bound so far, in placeholder order.
    pub fn params(&self) -> &[SqlParam] {
        &self.params
    }

    /// Consumes the binder, returning the values in placeholder order.
    pub fn into_params(self) -> Vec<SqlParam> {
        self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_bind_is_one() {
        let (p, binder) = Binder::new().bind(SqlParam::text("alice"));
        assert_eq!(p.index(), 1);
        assert_eq!(p.to_string(), "$1");
        assert_eq!(binder.len(), 1);
    }

    #[test]
    fn test_binds_are_contiguous() {
        let binder = Binder::new();
        let (a, binder) = binder.bind(SqlParam::text_array(["kawaii"]));
        let (b, binder) = binder.bind(SqlParam::text("^chib"));
        let (c, binder) = binder.bind(SqlParam::Integer(100));
        assert_eq!((a.index(), b.index(), c.index()), (1, 2, 3));
        assert_eq!(
            binder.into_params(),
            vec![
                SqlParam::TextArray(vec!["kawaii".to_string()]),
                SqlParam::Text("^chib".to_string()),
                SqlParam::Integer(100),
            ]
        );
    }

    #[test]
    fn test_bind_opt_none_does_not_advance() {
        let (p, binder) = Binder::new().bind_opt(None);
        assert!(p.is_none());
        assert!(binder.is_empty());

        let (p, binder) = binder.bind_opt(Some(SqlParam::from(25u32)));
        assert_eq!(p.map(Placeholder::index), Some(1));
        assert_eq!(binder.params(), &[SqlParam::Integer(25)]);
    }

    #[test]
    fn test_sql_types() {
        assert_eq!(SqlParam::text("x").sql_type(), "text");
        assert_eq!(SqlParam::text_array(["x"]).sql_type(), "text[]");
        assert_eq!(SqlParam::Integer(1).sql_type(), "bigint");
        assert_eq!(SqlParam::IntegerArray(vec![1]).sql_type(), "bigint[]");
    }

    #[test]
    fn test_untagged_serialization() {
        let json = serde_json::to_string(&vec![
            SqlParam::text_array(["dog"]),
            SqlParam::text("alice"),
            SqlParam::Integer(5),
        ])
        .unwrap();
        assert_eq!(json, r#"[["dog"],"alice",5]"#);
    }
}
