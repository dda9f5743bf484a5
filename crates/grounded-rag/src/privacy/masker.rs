//! Regex-based PII masker
//!
//! Only two categories are covered: email addresses and runs of ten or more
//! digits (treated as phone numbers). Names, street addresses, national IDs
//! and shorter phone numbers pass through unchanged. Masking is one-way; the
//! unmasked text is not kept anywhere.

use once_cell::sync::Lazy;
use regex::Regex;

/// Replacement token for email addresses
pub const EMAIL_PLACEHOLDER: &str = "[EMAIL]";

/// Replacement token for long digit runs
pub const PHONE_PLACEHOLDER: &str = "[PHONE]";

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[\w.-]+@[\w.-]+\.\w+\b").expect("email pattern is valid")
});

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{10,}\b").expect("phone pattern is valid"));

/// Mask emails, then long digit runs, across the whole text
pub fn mask(text: &str) -> String {
    let text = EMAIL_RE.replace_all(text, EMAIL_PLACEHOLDER);
    PHONE_RE.replace_all(&text, PHONE_PLACEHOLDER).into_owned()
}

/// Whether [`mask`] would rewrite anything in `text`
pub fn contains_pii(text: &str) -> bool {
    EMAIL_RE.is_match(text) || PHONE_RE.is_match(text)
}
