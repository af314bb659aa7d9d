//! URL canonicalization ahead of fetching.
//!
//! Detected URLs often arrive without a scheme (`example.com/page`); they
//! are made fetchable here. The caller's original string is still what the
//! record and cache key carry.

/// Error type for URL canonicalization failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("URL has no host")]
    MissingHost,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Canonicalize a URL string for fetching.
///
/// 1. Trim leading/trailing whitespace
/// 2. Default scheme to https:// if missing
/// 3. Accept only http and https
/// 4. Lowercase the host
/// 5. Remove fragment (#...), keep the query as-is
pub fn canonicalize(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let url_str = match trimmed.split_once("://") {
        Some(_) => trimmed.to_string(),
        None => format!("https://{trimmed}"),
    };

    let mut parsed = url::Url::parse(&url_str).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    let host = parsed.host_str().ok_or(UrlError::MissingHost)?.to_lowercase();
    parsed
        .set_host(Some(&host))
        .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    parsed.set_fragment(None);

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_bare_domain_with_path() {
        let url = canonicalize("example.com/page?id=7").unwrap();
        assert_eq!(url.as_str(), "https://example.com/page?id=7");
    }

    #[test]
    fn test_canonicalize_keeps_http_and_port() {
        let url = canonicalize("http://docs.example.org:8080/guide").unwrap();
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.port(), Some(8080));
    }

    #[test]
    fn test_canonicalize_lowercase_host_and_drop_fragment() {
        let url = canonicalize("  https://EXAMPLE.COM/Path#section  ").unwrap();
        assert_eq!(url.as_str(), "https://example.com/Path");
    }

    #[test]
    fn test_canonicalize_rejects_ftp() {
        let result = canonicalize("ftp://files.example.net/pub");
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(s)) if s == "ftp"));
    }

    #[test]
    fn test_canonicalize_empty() {
        assert!(matches!(canonicalize(""), Err(UrlError::Empty)));
        assert!(matches!(canonicalize("   "), Err(UrlError::Empty)));
    }

    #[test]
    fn test_canonicalize_garbage() {
        assert!(matches!(canonicalize("http://"), Err(UrlError::InvalidUrl(_))));
    }

    #[test]
    fn test_canonicalize_loopback_ip() {
        let url = canonicalize("http://127.0.0.1:3000/").unwrap();
        assert_eq!(url.host_str(), Some("127.0.0.1"));
    }
}
