use crate::UrlError;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use url::Url;

/// Last path segments that name the page of their parent directory
const INDEX_NAMES: &[&str] = &["index.html", "index.htm", "index"];

/// Page extensions that do not take part in page identity
const PAGE_EXTENSIONS: &[&str] = &[".html", ".htm"];

/// A normalized absolute page URL; the identity key for deduplication
///
/// Two URLs that differ only by trailing slash, fragment, default port,
/// host case, repeated slashes, an `index` page name, an `.html` extension or
/// (unless kept) query string normalize to the same `PageUrl`.
///
/// Besides the key, a `PageUrl` remembers the location it was found at
/// (trailing slash and page name intact). Pages are fetched there, and
/// relative links on them resolve against it.
#[derive(Debug, Clone)]
pub struct PageUrl {
    key: Url,
    location: Url,
}

impl PageUrl {
    /// Returns the normalized URL as a string slice
    pub fn as_str(&self) -> &str {
        self.key.as_str()
    }

    /// Returns the underlying normalized URL
    pub fn as_url(&self) -> &Url {
        &self.key
    }

    /// Returns the normalized path (no trailing slash except for the root)
    pub fn path(&self) -> &str {
        self.key.path()
    }

    /// Returns the URL the page is fetched from
    pub fn location(&self) -> &Url {
        &self.location
    }
}

impl PartialEq for PageUrl {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for PageUrl {}

impl Hash for PageUrl {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for PageUrl {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PageUrl {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl fmt::Display for PageUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key.as_str())
    }
}

impl AsRef<str> for PageUrl {
    fn as_ref(&self) -> &str {
        self.key.as_str()
    }
}

/// Normalizes a URL string into a [`PageUrl`]
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Require an http or https scheme and a host
/// 3. Host is lowercased and default ports dropped (by the parser)
/// 4. Normalize path:
///    - Remove dot segments and empty segments (repeated slashes)
///    - Remove a trailing `index`, `index.html` or `index.htm` segment
///    - Remove an `.html` / `.htm` extension
///    - Remove trailing slash (except for root /)
/// 5. Remove fragment
/// 6. Remove query string unless `keep_query` is set
///
/// The location keeps the page name and trailing slash of the input.
///
/// # Examples
///
/// ```
/// use docmirror::url::normalize_url;
///
/// let url = normalize_url("https://Docs.Example.com/guide/#intro", false).unwrap();
/// assert_eq!(url.as_str(), "https://docs.example.com/guide");
/// assert_eq!(url.location().as_str(), "https://docs.example.com/guide/");
/// ```
pub fn normalize_url(url_str: &str, keep_query: bool) -> Result<PageUrl, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize_parsed(url, keep_query)
}

/// Normalizes an already parsed URL
pub fn normalize_parsed(mut url: Url, keep_query: bool) -> Result<PageUrl, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    let collapsed = normalize_path(url.path());
    let location_path = if url.path().ends_with('/') && collapsed != "/" {
        format!("{}/", collapsed)
    } else {
        collapsed.clone()
    };
    url.set_path(&location_path);

    url.set_fragment(None);

    if !keep_query || url.query() == Some("") {
        url.set_query(None);
    }

    let mut key = url.clone();
    key.set_path(&canonical_path(&collapsed));

    Ok(PageUrl { key, location: url })
}

/// Normalizes a URL path by removing dot segments, empty segments and trailing slashes
fn normalize_path(path: &str) -> String {
    let mut normalized_segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                normalized_segments.pop();
            }
            _ => normalized_segments.push(segment),
        }
    }

    format!("/{}", normalized_segments.join("/"))
}

/// Folds index page names and page extensions out of a collapsed path
fn canonical_path(collapsed: &str) -> String {
    let (parent, last) = collapsed.rsplit_once('/').unwrap_or(("", collapsed));

    if INDEX_NAMES.contains(&last) {
        return if parent.is_empty() {
            "/".to_string()
        } else {
            parent.to_string()
        };
    }

    for ext in PAGE_EXTENSIONS {
        if let Some(stem) = last.strip_suffix(ext) {
            if !stem.is_empty() {
                return format!("{}/{}", parent, stem);
            }
        }
    }

    collapsed.to_string()
}
