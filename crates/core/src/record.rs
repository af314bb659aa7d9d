//! The scraped page record and its structural validation.
//!
//! `ScrapedContent` is both the pipeline output and the cached value. Its
//! JSON form uses camelCase keys:
//!
//! ```json
//! {
//!   "url": "https://example.com",
//!   "title": "Example",
//!   "headings": { "h1": "Example", "h2": "" },
//!   "metaDescription": "",
//!   "content": "Example ...",
//!   "error": null,
//!   "cachedAt": 1737331200000
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Hard cap on `content`, in characters.
pub const MAX_CONTENT_CHARS: usize = 40_000;

/// Error message carried by every failed scrape.
pub const SCRAPE_FAILED_MESSAGE: &str = "Failed to scrape URL";

/// Concatenated heading text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Headings {
    pub h1: String,
    pub h2: String,
}

/// Normalized text representation of one fetched page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedContent {
    pub url: String,
    pub title: String,
    pub headings: Headings,
    pub meta_description: String,
    pub content: String,
    pub error: Option<String>,

    /// Epoch milliseconds, stamped when the record is written to the cache.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_at: Option<i64>,
}

impl ScrapedContent {
    /// Build the record returned when a page could not be fetched or parsed.
    pub fn failed(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            headings: Headings::default(),
            meta_description: String::new(),
            content: String::new(),
            error: Some(SCRAPE_FAILED_MESSAGE.to_string()),
            cached_at: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// First field that failed structural validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    #[error("expected a JSON object")]
    NotAnObject,

    #[error("field `{0}` is missing")]
    Missing(&'static str),

    #[error("field `{field}` must be {expected}")]
    WrongType { field: &'static str, expected: &'static str },

    #[error("field `content` exceeds the character cap ({0} characters)")]
    ContentTooLong(usize),
}

/// Check that an untyped value has exactly the shape of a `ScrapedContent`.
///
/// Extra keys are tolerated. `cachedAt` is optional but must be an integer
/// when present.
pub fn validate_shape(value: &Value) -> Result<(), ShapeError> {
    let obj = value.as_object().ok_or(ShapeError::NotAnObject)?;

    for field in ["url", "title", "metaDescription", "content"] {
        expect_string(obj.get(field), field)?;
    }

    let headings = obj.get("headings").ok_or(ShapeError::Missing("headings"))?;
    let headings = headings
        .as_object()
        .ok_or(ShapeError::WrongType { field: "headings", expected: "an object" })?;
    expect_string(headings.get("h1"), "headings.h1")?;
    expect_string(headings.get("h2"), "headings.h2")?;

    match obj.get("error") {
        None => return Err(ShapeError::Missing("error")),
        Some(Value::Null | Value::String(_)) => {}
        Some(_) => return Err(ShapeError::WrongType { field: "error", expected: "null or a string" }),
    }

    if let Some(cached_at) = obj.get("cachedAt")
        && !(cached_at.is_i64() || cached_at.is_u64())
    {
        return Err(ShapeError::WrongType { field: "cachedAt", expected: "an integer" });
    }

    let content_chars = obj
        .get("content")
        .and_then(Value::as_str)
        .map(|s| s.chars().count())
        .unwrap_or(0);
    if content_chars > MAX_CONTENT_CHARS {
        return Err(ShapeError::ContentTooLong(content_chars));
    }

    Ok(())
}

fn expect_string(value: Option<&Value>, field: &'static str) -> Result<(), ShapeError> {
    match value {
        None => Err(ShapeError::Missing(field)),
        Some(Value::String(_)) => Ok(()),
        Some(_) => Err(ShapeError::WrongType { field, expected: "a string" }),
    }
}
