//! Metric name sanitization.

use regex::Regex;
use std::sync::LazyLock;

// Runs of anything outside the metric-name alphabet.
static ILLEGAL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9_]+").expect("valid sanitizer pattern"));

/// Rewrites `name` so that it contains only `[A-Za-z0-9_]`.
///
/// Each run of one or more other characters collapses into a single
/// underscore. The result of sanitizing an already sanitized name is the
/// name itself.
#[must_use]
pub fn sanitize(name: &str) -> String {
    ILLEGAL_CHARS.replace_all(name, "_").into_owned()
}

/// Returns `true` if `name` is already in sanitized form.
#[must_use]
pub fn is_sanitized(name: &str) -> bool {
    !ILLEGAL_CHARS.is_match(name)
}
