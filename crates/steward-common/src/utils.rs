//! Utility functions for Steward
//!
//! Helpers for cleaning up values that arrive from the technician UI.

use crate::constants::NOT_AVAILABLE;

/// Values the UI sends in place of a missing field.
const PLACEHOLDERS: &[&str] = &["", "null", "undefined", NOT_AVAILABLE];

/// Check whether a path or body value is a UI placeholder rather than data
///
/// # Examples
///
/// ```
/// use steward_common::is_placeholder;
///
/// assert!(is_placeholder("undefined"));
/// assert!(is_placeholder("  "));
/// assert!(!is_placeholder("aa:bb:cc:dd:ee:ff"));
/// ```
pub fn is_placeholder(value: &str) -> bool {
    let trimmed = value.trim();
    PLACEHOLDERS
        .iter()
        .any(|p| trimmed.eq_ignore_ascii_case(p))
}

/// Drop placeholders and duplicates from a list of MAC addresses,
/// keeping the first occurrence order.
///
/// Duplicates are compared case-insensitively; the first spelling wins.
pub fn normalize_mac_addresses<I, S>(macs: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut result: Vec<String> = Vec::new();
    for mac in macs {
        let mac = mac.as_ref().trim();
        if is_placeholder(mac) {
            continue;
        }
        if result.iter().any(|m| m.eq_ignore_ascii_case(mac)) {
            continue;
        }
        result.push(mac.to_string());
    }
    result
}
