//! Whitespace normalization and length capping for extracted text.

/// Collapse every run of whitespace (spaces, tabs, newlines, Unicode
/// spaces) into a single space and trim both ends.
///
/// Idempotent: normalizing normalized text returns it unchanged.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep the first `max_chars` characters of `text`.
///
/// Cuts on a character boundary, possibly mid-word.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
