//! Email validation shared by the form and the submission endpoint.
//!
//! Both sides call [`validate_email`], so they accept and reject the same
//! strings.

use regex::Regex;
use std::sync::LazyLock;

use crate::utils::error::ValidationError;

/// `local@domain.tld`: no whitespace and no `@` in either part, and a `.`
/// with at least one character on each side somewhere in the domain.
///
/// Whitespace is the ECMAScript `\s` set spelled out: it includes U+FEFF
/// and excludes U+0085, unlike the regex crate's Unicode `\s`.
pub const EMAIL_PATTERN: &str = concat!(
    r"^[^\t\n\x0B\x0C\r \u{A0}\u{1680}\u{2000}-\u{200A}\u{2028}\u{2029}\u{202F}\u{205F}\u{3000}\u{FEFF}@]+",
    r"@[^\t\n\x0B\x0C\r \u{A0}\u{1680}\u{2000}-\u{200A}\u{2028}\u{2029}\u{202F}\u{205F}\u{3000}\u{FEFF}@]+",
    r"\.[^\t\n\x0B\x0C\r \u{A0}\u{1680}\u{2000}-\u{200A}\u{2028}\u{2029}\u{202F}\u{205F}\u{3000}\u{FEFF}@]+$",
);

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("EMAIL_PATTERN is a valid regex"));

pub fn validate_email(raw: &str) -> Result<(), ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::Empty);
    }

    if EMAIL_RE.is_match(raw) {
        Ok(())
    } else {
        Err(ValidationError::Malformed(raw.to_string()))
    }
}

pub fn is_valid_email(raw: &str) -> bool {
    validate_email(raw).is_ok()
}
