//! Tag token classification.
//!
//! Query tokens carry their boolean role as a prefix:
//!
//! | Prefix | Group | Meaning |
//! |--------|-------|---------|
//! | *(none)* | AND | post has every tag |
//! | `+` | OR | post has at least one tag |
//! | `-` | NOT | post does not have every tag |
//! | `+-` | NOT-OR | post has none of the tags |
//! | `*` | PATTERN | some tag matches the case-insensitive regex |
//!
//! `+-` is tested before `+` and `-`. Exactly one prefix is stripped, so
//! `--foo` is a NOT tag named `-foo`.

use serde::Serialize;

/// The boolean group a token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagClass {
    /// No prefix.
    And,
    /// `+` prefix.
    Or,
    /// `-` prefix.
    Not,
    /// `+-` prefix.
    NotOr,
    /// `*` prefix.
    Pattern,
}

impl TagClass {
    /// Classifies a single token, returning its group and the stripped tag.
    pub fn of(token: &str) -> (TagClass, &str) {
        if let Some(rest) = token.strip_prefix("+-") {
            (TagClass::NotOr, rest)
        } else if let Some(rest) = token.strip_prefix('+') {
            (TagClass::Or, rest)
        } else if let Some(rest) = token.strip_prefix('-') {
            (TagClass::Not, rest)
        } else if let Some(rest) = token.strip_prefix('*') {
            (TagClass::Pattern, rest)
        } else {
            (TagClass::And, token)
        }
    }
}

/// Tokens split into their five disjoint groups, each in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassifiedTags {
    /// Tags the post must all have.
    pub and: Vec<String>,
    /// Tags of which the post must have at least one.
    pub or: Vec<String>,
    /// Tags the post must not have all of.
    pub not: Vec<String>,
    /// Tags the post must have none of.
    pub not_or: Vec<String>,
    /// Case-insensitive regexes, each matched by some tag.
    pub patterns: Vec<String>,
}

impl ClassifiedTags {
    /// Returns true if no group has any tag.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of classified tags.
    pub fn len(&self) -> usize {
        self.and.len() + self.or.len() + self.not.len() + self.not_or.len() + self.patterns.len()
    }
}

/// Splits tokens into AND / OR / NOT / NOT-OR / PATTERN groups.
pub fn classify<S: AsRef<str>>(tokens: &[S]) -> ClassifiedTags {
    let mut out = ClassifiedTags::default();
    for token in tokens {
        let (class, tag) = TagClass::of(token.as_ref());
        let group = match class {
            TagClass::And => &mut out.and,
            TagClass::Or => &mut out.or,
            TagClass::Not => &mut out.not,
            TagClass::NotOr => &mut out.not_or,
            TagClass::Pattern => &mut out.patterns,
        };
        group.push(tag.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_prefixes() {
        let tags = classify(&["kawaii", "+dog", "-scary", "+-gore", "*^chib"]);
        assert_eq!(tags.and, vec!["kawaii"]);
        assert_eq!(tags.or, vec!["dog"]);
        assert_eq!(tags.not, vec!["scary"]);
        assert_eq!(tags.not_or, vec!["gore"]);
        assert_eq!(tags.patterns, vec!["^chib"]);
    }

    #[test]
    fn test_not_or_checked_before_or() {
        assert_eq!(TagClass::of("+-x"), (TagClass::NotOr, "x"));
        assert_eq!(TagClass::of("-+x"), (TagClass::Not, "+x"));
    }

    #[test]
    fn test_only_one_prefix_stripped() {
        assert_eq!(TagClass::of("--x"), (TagClass::Not, "-x"));
        assert_eq!(TagClass::of("++x"), (TagClass::Or, "+x"));
        assert_eq!(TagClass::of("**x"), (TagClass::Pattern, "*x"));
    }

    #[test]
    fn test_inner_prefix_characters_kept() {
        assert_eq!(TagClass::of("c++"), (TagClass::And, "c++"));
        assert_eq!(TagClass::of("-x-ray"), (TagClass::Not, "x-ray"));
    }

    #[test]
    fn test_order_within_group_preserved() {
        let tags = classify(&["+b", "a", "+a", "c"]);
        assert_eq!(tags.and, vec!["a", "c"]);
        assert_eq!(tags.or, vec!["b", "a"]);
    }

    #[test]
    fn test_prefix_only_tokens_are_classified() {
        let tags = classify(&["+", "-", "*", ""]);
        assert_eq!(tags.or, vec![""]);
        assert_eq!(tags.not, vec![""]);
        assert_eq!(tags.patterns, vec![""]);
        assert_eq!(tags.and, vec![""]);
        assert_eq!(tags.len(), 4);
    }

    #[test]
    fn test_groups_partition_input() {
        let input = ["a", "+b", "-c", "+-d", "*e", "f", "+-g"];
        let tags = classify(&input);
        assert_eq!(tags.len(), input.len());

        let mut rejoined: Vec<String> = tags
            .and
            .iter()
            .chain(&tags.or)
            .chain(&tags.not)
            .chain(&tags.not_or)
            .chain(&tags.patterns)
            .cloned()
            .collect();
        rejoined.sort();
        let mut expected: Vec<String> = input.iter().map(|t| TagClass::of(t).1.to_string()).collect();
        expected.sort();
        assert_eq!(rejoined, expected);
    }

    #[test]
    fn test_empty_input() {
        let empty: [&str; 0] = [];
        assert!(classify(&empty).is_empty());
    }
}
