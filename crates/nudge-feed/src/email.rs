//! Contact address extraction from free text.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[A-Z0-9._%+\-]+@[A-Z0-9.\-]+\.[A-Z]{2,}\b").expect("valid regex")
});
static BRACKET_AT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[at\]|\(at\)").expect("valid regex"));
static AT_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bat\b").expect("valid regex"));
static PADDED_AT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*@\s*").expect("valid regex"));

/// Rewrite common address obfuscations into a bare `@`.
///
/// Handles `[at]`, `(at)`, the standalone word `at`, and whitespace padding
/// around `@`, in that order. Blank input yields an empty string.
#[must_use]
pub fn normalize_obfuscated_email(input: &str) -> String {
    if input.trim().is_empty() {
        return String::new();
    }

    let output = BRACKET_AT_RE.replace_all(input, "@");
    let output = AT_WORD_RE.replace_all(&output, "@");
    PADDED_AT_RE.replace_all(&output, "@").into_owned()
}

/// Return the first address found in `text` after de-obfuscation.
#[must_use]
pub fn extract_first_email(text: &str) -> Option<String> {
    let normalized = normalize_obfuscated_email(text);
    EMAIL_RE
        .find(&normalized)
        .map(|m| m.as_str().to_string())
}
