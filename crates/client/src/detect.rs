//! URL detection in free-form text.
//!
//! Finds the first URL-shaped substring in a chat message so the caller can
//! scrape it and treat the rest of the message as the question. The scheme
//! is optional: `example.com/page` matches just like `https://example.com/page`.

use regex::Regex;
use std::sync::LazyLock;

/// Optional scheme, dotted host ending in an alphabetic label of two or more
/// letters, optional port, optional path/query/fragment.
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"((https?|ftp)://)?([a-zA-Z0-9.-]+)(\.[a-zA-Z]{2,})(:[0-9]{1,5})?(/[-a-zA-Z0-9()@:%_+.~#?&/=]*)?")
        .expect("invalid URL pattern")
});

/// First URL found in a message, with the text left once it is removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedUrl<'a> {
    pub url: &'a str,
    pub query: String,
}

/// Return the first URL-shaped substring of `text`, if any.
///
/// Later URLs are ignored.
pub fn detect_url(text: &str) -> Option<&str> {
    URL_PATTERN.find(text).map(|m| m.as_str())
}

/// Split a message into its first URL and the remaining question.
///
/// The query is the text with that one URL occurrence cut out, trimmed.
/// Any further URLs stay in the query untouched.
pub fn split_query(text: &str) -> Option<DetectedUrl<'_>> {
    let m = URL_PATTERN.find(text)?;
    let query = format!("{}{}", &text[..m.start()], &text[m.end()..]).trim().to_string();
    Some(DetectedUrl { url: m.as_str(), query })
}
