use crate::url::normalize::{normalize_parsed, PageUrl};
use url::Url;

/// Path prefixes that only ever hold build artifacts, never pages
const ASSET_PREFIXES: &[&str] = &["/_next/", "/static/"];

/// File extensions of static assets that are never queued as pages
const ASSET_EXTENSIONS: &[&str] = &[
    "js", "mjs", "css", "map", "json", "xml", "txt", "png", "jpg", "jpeg", "gif", "svg", "webp",
    "ico", "avif", "bmp", "woff", "woff2", "ttf", "otf", "eot", "pdf", "zip", "gz", "mp4",
    "webm", "mp3",
];

/// The part of the web that belongs to the site being mirrored
///
/// A URL is in scope when it has the same host (and port) as the base URL and
/// its path equals the base path or lies below it.
#[derive(Debug, Clone)]
pub struct SiteScope {
    base: PageUrl,
    host: String,
    port: Option<u16>,
    base_path: String,
    keep_query: bool,
}

impl SiteScope {
    /// Creates the scope rooted at a normalized base URL
    pub fn new(base: PageUrl, keep_query: bool) -> Self {
        let url = base.as_url();
        let host = url.host_str().unwrap_or_default().to_string();
        let port = url.port_or_known_default();
        let base_path = url.path().trim_end_matches('/').to_string();

        Self {
            base,
            host,
            port,
            base_path,
            keep_query,
        }
    }

    /// Returns the normalized base URL
    pub fn base(&self) -> &PageUrl {
        &self.base
    }

    /// Returns the base path without trailing slash (empty for a site root)
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Returns the origin of the base URL, e.g. `https://docs.example.com`
    pub fn origin(&self) -> String {
        self.base.as_url().origin().ascii_serialization()
    }

    /// Whether query strings take part in page identity
    pub fn keep_query(&self) -> bool {
        self.keep_query
    }

    /// Returns true if the URL is on the same host and under the base path
    pub fn contains(&self, url: &Url) -> bool {
        if url.host_str() != Some(self.host.as_str()) || url.port_or_known_default() != self.port {
            return false;
        }

        let path = url.path();
        if self.base_path.is_empty() {
            return true;
        }

        path == self.base_path
            || path
                .strip_prefix(self.base_path.as_str())
                .map_or(false, |rest| rest.starts_with('/'))
    }

    /// Returns true if the path points at a build artifact or static asset
    pub fn is_asset(path: &str) -> bool {
        if ASSET_PREFIXES.iter().any(|prefix| path.contains(prefix)) {
            return true;
        }

        let last_segment = path.rsplit('/').next().unwrap_or_default();
        match last_segment.rsplit_once('.') {
            Some((_, ext)) => ASSET_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
            None => false,
        }
    }

    /// Normalizes a candidate link and keeps it only if it is an in-scope page
    pub fn page_url(&self, url: &Url) -> Option<PageUrl> {
        let page = normalize_parsed(url.clone(), self.keep_query).ok()?;
        if self.contains(page.as_url()) && !Self::is_asset(page.path()) {
            Some(page)
        } else {
            None
        }
    }

    /// Returns the path of a page relative to the base path, without leading slash
    pub fn relative_path<'a>(&self, page: &'a PageUrl) -> &'a str {
        let path = page.path();
        let rest = path.strip_prefix(self.base_path.as_str()).unwrap_or(path);
        rest.trim_start_matches('/')
    }
}
