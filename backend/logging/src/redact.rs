//! Log Redaction Layer
//!
//! Scrubs bot API tokens and user-scoped cache keys from strings prior
//! to logging.

use once_cell::sync::Lazy;
use regex::Regex;

static BOT_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+:[A-Za-z0-9_-]{30,}").unwrap());
static SCOPE_USER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"user:\d+").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let mut redacted = input.to_string();

    // Redact bot API tokens
    redacted = BOT_TOKEN_RE.replace_all(&redacted, "[REDACTED_TOKEN]").to_string();

    // Redact user ids inside reply-scope cache keys
    redacted = SCOPE_USER_RE.replace_all(&redacted, "user:[REDACTED]").to_string();

    redacted
}
