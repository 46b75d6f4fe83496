use crate::crawler::HttpFetcher;
use crate::discovery::{dedupe_in_scope, SiteAdapter};
use crate::url::{PageUrl, SiteScope};
use crate::{MirrorError, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// Keys whose values hold navigation entries
const NAV_KEYS: &[&str] = &[
    "navigation",
    "pages",
    "groups",
    "tabs",
    "anchors",
    "versions",
    "languages",
    "dropdowns",
];

/// Keys whose string values name a page
const LINK_KEYS: &[&str] = &["href", "url"];

/// Flattens a navigation manifest into page references, in document order
///
/// Strings inside navigation arrays and `href`/`url` fields of navigation
/// objects are returned as written; `topbarLinks` contribute only their
/// site-relative hrefs.
///
/// # Example
///
/// ```
/// use docmirror::discovery::flatten_manifest;
///
/// let manifest = serde_json::json!({
///     "navigation": [{ "group": "Start", "pages": ["intro", "setup"] }]
/// });
/// assert_eq!(flatten_manifest(&manifest), vec!["intro", "setup"]);
/// ```
pub fn flatten_manifest(manifest: &Value) -> Vec<String> {
    let mut entries = Vec::new();
    walk(manifest, &mut entries);

    if let Some(Value::Array(links)) = manifest.get("topbarLinks") {
        for link in links {
            if let Some(href) = link.get("href").and_then(Value::as_str) {
                if !href.starts_with("http") {
                    entries.push(href.to_string());
                }
            }
        }
    }

    entries
}

fn walk(value: &Value, entries: &mut Vec<String>) {
    match value {
        Value::String(s) => entries.push(s.clone()),
        Value::Array(items) => items.iter().for_each(|item| walk(item, entries)),
        Value::Object(map) => {
            for key in LINK_KEYS {
                if let Some(Value::String(link)) = map.get(*key) {
                    entries.push(link.clone());
                }
            }
            for key in NAV_KEYS {
                if let Some(nested) = map.get(*key) {
                    walk(nested, entries);
                }
            }
        }
        _ => {}
    }
}

/// Resolves one manifest entry to an absolute URL string
///
/// Absolute URLs are kept, `/x` is resolved against the origin and anything
/// else against the base URL.
pub fn resolve_manifest_entry(scope: &SiteScope, entry: &str) -> Option<String> {
    let entry = entry.trim();
    if entry.is_empty() || entry.starts_with('#') {
        return None;
    }
    if entry.starts_with("http://") || entry.starts_with("https://") {
        return Some(entry.to_string());
    }
    if entry.starts_with('/') {
        return Some(format!("{}{}", scope.origin(), entry));
    }
    Some(format!(
        "{}{}/{}",
        scope.origin(),
        scope.base_path(),
        entry.trim_start_matches("./")
    ))
}

/// Discovers pages from a site navigation manifest such as `mint.json`
pub struct ManifestAdapter {
    scope: SiteScope,
    files: &'static [&'static str],
}

impl ManifestAdapter {
    pub fn new(scope: SiteScope, files: &'static [&'static str]) -> Self {
        Self { scope, files }
    }

    /// Manifest locations to try: each file below the base path, then at the origin
    pub fn locations(&self) -> Vec<String> {
        let origin = self.scope.origin();
        let mut locations = Vec::new();
        for file in self.files {
            for location in [
                format!("{}{}/{}", origin, self.scope.base_path(), file),
                format!("{}/{}", origin, file),
            ] {
                if !locations.contains(&location) {
                    locations.push(location);
                }
            }
        }
        locations
    }

    async fn load(&self, fetcher: &HttpFetcher, location: &str) -> Result<Value> {
        let fetched = fetcher.get(location).await?;
        serde_json::from_slice(&fetched.body).map_err(|e| MirrorError::Parse {
            what: "manifest",
            url: location.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl SiteAdapter for ManifestAdapter {
    fn name(&self) -> &'static str {
        "manifest"
    }

    fn scope(&self) -> &SiteScope {
        &self.scope
    }

    async fn discover_seeds(&self, fetcher: &HttpFetcher) -> Result<Vec<PageUrl>> {
        for location in self.locations() {
            let manifest = match self.load(fetcher, &location).await {
                Ok(manifest) => manifest,
                Err(e) => {
                    debug!("Could not use manifest {}: {}", location, e);
                    continue;
                }
            };

            let resolved: Vec<String> = flatten_manifest(&manifest)
                .iter()
                .filter_map(|entry| resolve_manifest_entry(&self.scope, entry))
                .collect();
            let pages = dedupe_in_scope(&self.scope, resolved.iter().map(String::as_str));

            if !pages.is_empty() {
                debug!("Found {} in-scope pages from manifest {}", pages.len(), location);
                return Ok(pages);
            }
        }
        Ok(Vec::new())
    }
}
