//! Code families - the numeric blocks of the code space.
//!
//! ```text
//! ┌──────────┬───────────┬─────────────┬──────────────┐
//! │ reserved │ generic   │ handshake   │ application  │
//! │ 0-99     │ 100-999   │ 1000-4999   │ 5000-65535   │
//! └──────────┴───────────┴─────────────┴──────────────┘
//! ```
//!
//! Each kind declares its family; the builder rejects codes outside the
//! family's block unless enforcement is turned off in
//! [`RegistryConfig`](crate::config::RegistryConfig). A new family of
//! messages claims a fresh block here.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Highest code that is never assigned.
pub const MAX_RESERVED_CODE: u16 = 99;

/// A block of the code space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeFamily {
    /// Transport-agnostic payloads: message, error, heartbeat, tuples.
    Generic,
    /// Per-transport hello request/response pairs.
    Handshake,
    /// Application messages (gateway to provider and beyond).
    Application,
}

impl CodeFamily {
    /// All families, in code order.
    pub const ALL: [CodeFamily; 3] = [
        CodeFamily::Generic,
        CodeFamily::Handshake,
        CodeFamily::Application,
    ];

    /// The inclusive block of codes owned by this family.
    pub fn range(self) -> RangeInclusive<u16> {
        match self {
            CodeFamily::Generic => 100..=999,
            CodeFamily::Handshake => 1000..=4999,
            CodeFamily::Application => 5000..=u16::MAX,
        }
    }

    /// Check whether `code` lies in this family's block.
    #[inline]
    pub fn contains(self, code: u16) -> bool {
        self.range().contains(&code)
    }

    /// Classify a code. Returns `None` for reserved codes.
    pub fn of(code: u16) -> Option<CodeFamily> {
        Self::ALL.into_iter().find(|family| family.contains(code))
    }

    /// Lowercase name, as used in manifests.
    pub fn as_str(self) -> &'static str {
        match self {
            CodeFamily::Generic => "generic",
            CodeFamily::Handshake => "handshake",
            CodeFamily::Application => "application",
        }
    }
}

impl fmt::Display for CodeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check if a code is in the reserved block.
#[inline]
pub fn is_reserved(code: u16) -> bool {
    code <= MAX_RESERVED_CODE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_boundaries() {
        assert_eq!(CodeFamily::of(99), None);
        assert_eq!(CodeFamily::of(100), Some(CodeFamily::Generic));
        assert_eq!(CodeFamily::of(999), Some(CodeFamily::Generic));
        assert_eq!(CodeFamily::of(1000), Some(CodeFamily::Handshake));
        assert_eq!(CodeFamily::of(4999), Some(CodeFamily::Handshake));
        assert_eq!(CodeFamily::of(5000), Some(CodeFamily::Application));
        assert_eq!(CodeFamily::of(u16::MAX), Some(CodeFamily::Application));
    }

    #[test]
    fn test_families_do_not_overlap() {
        for code in 0..=u16::MAX {
            let owners = CodeFamily::ALL
                .iter()
                .filter(|family| family.contains(code))
                .count();
            if is_reserved(code) {
                assert_eq!(owners, 0, "reserved code {} has an owner", code);
            } else {
                assert_eq!(owners, 1, "code {} has {} owners", code, owners);
            }
        }
    }

    #[test]
    fn test_reserved() {
        assert!(is_reserved(0));
        assert!(is_reserved(99));
        assert!(!is_reserved(100));
    }

    #[test]
    fn test_display_and_serde_agree() {
        for family in CodeFamily::ALL {
            let json = serde_json::to_string(&family).unwrap();
            assert_eq!(json, format!("\"{}\"", family));
        }
    }
}
