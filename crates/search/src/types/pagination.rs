//! Offset/limit pagination windows.

use serde::{Deserialize, Serialize};

/// Largest page a post search will return.
pub const MAX_POST_LIMIT: u32 = 100;

/// Largest page a tag search will return.
pub const MAX_TAG_LIMIT: u32 = 200;

/// Largest page a tag category search will return.
pub const MAX_TAG_CATEGORY_LIMIT: u32 = 25;

/// Largest page a group search will return.
pub const MAX_GROUP_LIMIT: u32 = 100;

/// Pagination window for a search request.
///
/// Both fields are optional. A missing or zero limit means "the entry point's
/// default page", and an offset of zero is the same as no offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pagination {
    /// Rows to skip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,

    /// Maximum rows to return.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl Pagination {
    /// Creates pagination with the given limit and no offset.
    pub fn new(limit: u32) -> Self {
        Self {
            offset: None,
            limit: Some(limit),
        }
    }

    /// Sets the offset.
    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Sets the limit.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns the requested limit capped at `max`, or `None` if unset or zero.
    pub fn clamped_limit(&self, max: u32) -> Option<u32> {
        self.limit.filter(|&l| l > 0).map(|l| l.min(max))
    }

    /// Returns the offset if it is greater than zero.
    pub fn effective_offset(&self) -> Option<u32> {
        self.offset.filter(|&o| o > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_clamped() {
        assert_eq!(Pagination::new(500).clamped_limit(MAX_POST_LIMIT), Some(100));
        assert_eq!(Pagination::new(40).clamped_limit(MAX_POST_LIMIT), Some(40));
        assert_eq!(
            Pagination::new(300).clamped_limit(MAX_TAG_LIMIT),
            Some(200)
        );
    }

    #[test]
    fn test_zero_limit_is_unset() {
        assert_eq!(Pagination::new(0).clamped_limit(MAX_POST_LIMIT), None);
        assert_eq!(Pagination::default().clamped_limit(MAX_POST_LIMIT), None);
    }

    #[test]
    fn test_zero_offset_is_unset() {
        assert_eq!(Pagination::default().with_offset(0).effective_offset(), None);
        assert_eq!(
            Pagination::default().with_offset(200).effective_offset(),
            Some(200)
        );
    }

    #[test]
    fn test_serialization_skips_unset() {
        let json = serde_json::to_string(&Pagination::default().with_limit(10)).unwrap();
        assert_eq!(json, r#"{"limit":10}"#);
    }
}
