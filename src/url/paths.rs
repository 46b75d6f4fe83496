use crate::url::normalize::PageUrl;
use crate::url::scope::SiteScope;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use url::Url;

/// Directory (relative to the output root) that holds downloaded images
pub const IMAGE_DIR: &str = "img";

/// Percent-encodes characters that are unsafe in file names on common filesystems
///
/// `%` itself is encoded too, so distinct segments always yield distinct names.
fn sanitize_segment(segment: &str) -> String {
    let mut cleaned = String::with_capacity(segment.len());
    for c in segment.chars() {
        match c {
            '<' | '>' | ':' | '"' | '\\' | '|' | '?' | '*' | '%' | '/' => {
                cleaned.push_str(&format!("%{:02X}", c as u32));
            }
            c if c.is_control() => cleaned.push_str(&format!("%{:02X}", c as u32)),
            c => cleaned.push(c),
        }
    }

    match cleaned.as_str() {
        "." => "%2E".to_string(),
        ".." => "%2E%2E".to_string(),
        _ => cleaned,
    }
}

/// Derives the output file path of a page, relative to the output root
///
/// The base path prefix is stripped, an empty remainder becomes `index` and
/// `.md` is appended to the last segment. Unsafe characters are
/// percent-encoded. When query strings are part of page identity, the query
/// is folded into the file name after an encoded `?`. Distinct page URLs
/// always map to distinct files.
///
/// # Examples
///
/// ```
/// use docmirror::url::{normalize_url, page_output_path, SiteScope};
///
/// let scope = SiteScope::new(normalize_url("https://example.com/docs", false).unwrap(), false);
/// let page = normalize_url("https://example.com/docs/guide/setup.html", false).unwrap();
/// assert_eq!(page_output_path(&scope, &page).to_str(), Some("guide/setup.md"));
/// ```
pub fn page_output_path(scope: &SiteScope, page: &PageUrl) -> PathBuf {
    let relative = scope.relative_path(page);
    let relative = if relative.is_empty() { "index" } else { relative };

    let mut segments: Vec<String> = relative
        .split('/')
        .filter(|s| !s.is_empty())
        .map(sanitize_segment)
        .collect();

    if let Some(last) = segments.last_mut() {
        if let Some(query) = page.as_url().query() {
            last.push_str("%3F");
            last.push_str(&sanitize_segment(query));
        }
        last.push_str(".md");
    }

    segments.iter().collect()
}

/// Derives the root-relative local path of an image, e.g. `img/diagram.png`
///
/// The basename of the URL path is used when it looks like a file name;
/// otherwise a stable name is derived from a hash of the full URL.
pub fn image_local_path(image_url: &Url) -> String {
    let basename = image_url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();

    let filename = if !basename.is_empty() && basename.contains('.') {
        sanitize_segment(basename)
    } else {
        let digest = Sha256::digest(image_url.as_str().as_bytes());
        let hash = hex::encode(digest);
        format!("image_{}.png", &hash[..8])
    };

    format!("{}/{}", IMAGE_DIR, filename)
}

/// Returns the `../` prefix that leads from a page file back to the output root
pub fn image_link_prefix(page_path: &std::path::Path) -> String {
    let depth = page_path.components().count().saturating_sub(1);
    "../".repeat(depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::normalize_url;
    use std::path::Path;

    fn scope(base: &str, keep_query: bool) -> SiteScope {
        SiteScope::new(normalize_url(base, keep_query).unwrap(), keep_query)
    }

    fn path_for(scope: &SiteScope, url: &str) -> String {
        let page = normalize_url(url, scope.keep_query()).unwrap();
        page_output_path(scope, &page)
            .to_string_lossy()
            .replace('\\', "/")
    }

    #[test]
    fn test_base_maps_to_index() {
        let scope = scope("https://example.com/docs", false);
        assert_eq!(path_for(&scope, "https://example.com/docs/"), "index.md");
        let root = self::scope("https://example.com", false);
        assert_eq!(path_for(&root, "https://example.com/"), "index.md");
    }

    #[test]
    fn test_nested_path() {
        let scope = scope("https://example.com/docs", false);
        assert_eq!(
            path_for(&scope, "https://example.com/docs/guide/setup/"),
            "guide/setup.md"
        );
    }

    #[test]
    fn test_html_extension_replaced() {
        let scope = scope("https://example.com", false);
        assert_eq!(path_for(&scope, "https://example.com/a/b.html"), "a/b.md");
        assert_eq!(path_for(&scope, "https://example.com/a/c.htm"), "a/c.md");
    }

    #[test]
    fn test_md_page_keeps_its_name() {
        let scope = scope("https://example.com", false);
        assert_eq!(path_for(&scope, "https://example.com/readme.md"), "readme.md.md");
        assert_eq!(path_for(&scope, "https://example.com/readme"), "readme.md");
    }

    #[test]
    fn test_unsafe_characters_encoded() {
        let scope = scope("https://example.com", false);
        assert_eq!(
            path_for(&scope, "https://example.com/api/get:item"),
            "api/get%3Aitem.md"
        );
        assert_eq!(
            path_for(&scope, "https://example.com/api/get_item"),
            "api/get_item.md"
        );
    }

    #[test]
    fn test_query_folded_into_name() {
        let scope = scope("https://example.com", true);
        assert_eq!(
            path_for(&scope, "https://example.com/page?v=2&p=a/b"),
            "page%3Fv=2&p=a%2Fb.md"
        );
    }

    #[test]
    fn test_equivalent_forms_share_one_page() {
        let scope = scope("https://example.com/docs", false);
        let pairs = [
            ("https://example.com/docs", "https://example.com/docs/index"),
            ("https://example.com/docs/a", "https://example.com/docs/a.html"),
            ("https://example.com/docs/a/", "https://example.com/docs/a/index.html"),
        ];
        for (a, b) in pairs {
            assert_eq!(
                normalize_url(a, false).unwrap(),
                normalize_url(b, false).unwrap()
            );
            assert_eq!(path_for(&scope, a), path_for(&scope, b));
        }
    }

    #[test]
    fn test_distinct_pages_never_share_a_path() {
        let scope = scope("https://example.com/docs", true);
        let urls = [
            "https://example.com/docs",
            "https://example.com/docs/a",
            "https://example.com/docs/a/b",
            "https://example.com/docs/a.md",
            "https://example.com/docs/a.mdx",
            "https://example.com/docs/get:item",
            "https://example.com/docs/get_item",
            "https://example.com/docs/get%3Aitem",
            "https://example.com/docs/get_item?x=1",
            "https://example.com/docs/get_item%3Fx=1",
            "https://example.com/docs/page?v=a/b",
            "https://example.com/docs/page?v=a_b",
        ];

        let mut pages = std::collections::HashSet::new();
        let mut paths = std::collections::HashSet::new();
        for url in urls {
            pages.insert(normalize_url(url, true).unwrap());
            paths.insert(path_for(&scope, url));
        }
        assert_eq!(pages.len(), urls.len());
        assert_eq!(paths.len(), urls.len());
    }

    #[test]
    fn test_distinct_urls_distinct_paths() {
        let scope = scope("https://example.com/docs", false);
        let a = path_for(&scope, "https://example.com/docs/a");
        let b = path_for(&scope, "https://example.com/docs/a/b");
        assert_ne!(a, b);
    }

    #[test]
    fn test_image_basename() {
        let url = Url::parse("https://cdn.example.com/assets/diagram.png?w=800").unwrap();
        assert_eq!(image_local_path(&url), "img/diagram.png");
    }

    #[test]
    fn test_image_hash_name_is_stable() {
        let url = Url::parse("https://cdn.example.com/render/12345").unwrap();
        let first = image_local_path(&url);
        let second = image_local_path(&url);
        assert_eq!(first, second);
        assert!(first.starts_with("img/image_"));
        assert!(first.ends_with(".png"));
        assert_eq!(first.len(), "img/image_".len() + 8 + ".png".len());
    }

    #[test]
    fn test_image_link_prefix() {
        assert_eq!(image_link_prefix(Path::new("index.md")), "");
        assert_eq!(image_link_prefix(Path::new("guide/setup.md")), "../");
        assert_eq!(image_link_prefix(Path::new("a/b/c.md")), "../../");
    }
}
