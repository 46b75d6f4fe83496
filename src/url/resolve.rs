use url::Url;

/// Resolves an href against a base URL
///
/// Returns None if the link should be excluded:
/// - empty or fragment-only hrefs
/// - javascript:, mailto:, tel: and data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_href(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url)
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/docs/page").unwrap()
    }

    #[test]
    fn test_absolute_link() {
        let url = resolve_href("https://other.com/page", &base_url()).unwrap();
        assert_eq!(url.as_str(), "https://other.com/page");
    }

    #[test]
    fn test_root_relative_link() {
        let url = resolve_href("/other", &base_url()).unwrap();
        assert_eq!(url.as_str(), "https://example.com/other");
    }

    #[test]
    fn test_path_relative_link() {
        let url = resolve_href("other", &base_url()).unwrap();
        assert_eq!(url.as_str(), "https://example.com/docs/other");
    }

    #[test]
    fn test_skipped_schemes() {
        assert!(resolve_href("javascript:void(0)", &base_url()).is_none());
        assert!(resolve_href("mailto:test@example.com", &base_url()).is_none());
        assert!(resolve_href("tel:+1234567890", &base_url()).is_none());
        assert!(resolve_href("data:text/html,<h1>x</h1>", &base_url()).is_none());
    }

    #[test]
    fn test_fragment_only_and_empty() {
        assert!(resolve_href("#section", &base_url()).is_none());
        assert!(resolve_href("   ", &base_url()).is_none());
    }
}
