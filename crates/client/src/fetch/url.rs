//! URL canonicalization so identical resources map to one store key.

use url::Url;

/// Error type for URL canonicalization failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Canonicalize a URL string against the site origin.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Resolve relative references against `origin`
/// 3. Lowercase the host
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (do not reorder)
pub fn canonicalize(input: &str, origin: &Url) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = origin.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(host) = parsed.host_str() {
        let lowered = host.to_lowercase();
        parsed
            .set_host(Some(&lowered))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// Whether two URLs share scheme, host and port.
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        Url::parse("https://blog.example.com").unwrap()
    }

    #[test]
    fn test_canonicalize_relative_path() {
        let url = canonicalize("/style.css", &origin()).unwrap();
        assert_eq!(url.as_str(), "https://blog.example.com/style.css");
    }

    #[test]
    fn test_canonicalize_absolute_keeps_host() {
        let url = canonicalize("https://cdn.example.net/app.js", &origin()).unwrap();
        assert_eq!(url.host_str(), Some("cdn.example.net"));
    }

    #[test]
    fn test_canonicalize_lowercase_host() {
        let url = canonicalize("https://BLOG.Example.COM/", &origin()).unwrap();
        assert_eq!(url.host_str(), Some("blog.example.com"));
    }

    #[test]
    fn test_canonicalize_remove_fragment() {
        let url = canonicalize("/2024/05/post.html#comments", &origin()).unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.path(), "/2024/05/post.html");
    }

    #[test]
    fn test_canonicalize_preserve_query() {
        let url = canonicalize("/search?b=2&a=1", &origin()).unwrap();
        assert_eq!(url.query(), Some("b=2&a=1"));
    }

    #[test]
    fn test_canonicalize_trim_whitespace() {
        let url = canonicalize("  /  ", &origin()).unwrap();
        assert_eq!(url.as_str(), "https://blog.example.com/");
    }

    #[test]
    fn test_canonicalize_unsupported_scheme() {
        let result = canonicalize("data:text/plain,hi", &origin());
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_canonicalize_empty() {
        assert!(matches!(canonicalize("", &origin()), Err(UrlError::Empty)));
        assert!(matches!(canonicalize("   ", &origin()), Err(UrlError::Empty)));
    }

    #[test]
    fn test_same_origin() {
        let a = Url::parse("https://blog.example.com/a").unwrap();
        let b = Url::parse("https://blog.example.com/b?x=1").unwrap();
        let other_port = Url::parse("https://blog.example.com:8443/a").unwrap();
        let http = Url::parse("http://blog.example.com/a").unwrap();
        assert!(same_origin(&a, &b));
        assert!(!same_origin(&a, &other_port));
        assert!(!same_origin(&a, &http));
    }
}
