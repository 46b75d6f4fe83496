use crate::crawler::HttpFetcher;
use crate::discovery::{dedupe_in_scope, SiteAdapter};
use crate::url::{PageUrl, SiteScope};
use crate::{MirrorError, Result};
use async_trait::async_trait;
use quick_xml::events::Event as XmlEvent;
use quick_xml::Reader;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, warn};

/// How deep sitemap indexes are followed below the root sitemap
const MAX_INDEX_DEPTH: usize = 2;

/// A parsed sitemap document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sitemap {
    /// `<urlset>`: page locations
    UrlSet(Vec<String>),
    /// `<sitemapindex>`: locations of child sitemaps
    Index(Vec<String>),
}

/// Parses a sitemap or sitemap index
///
/// Namespaced and un-namespaced documents are both accepted; every `<loc>`
/// element contributes one location.
///
/// # Errors
///
/// Returns `MirrorError::Parse` if the document is neither a `<urlset>` nor
/// a `<sitemapindex>`.
pub fn parse_sitemap(xml: &[u8], source_url: &str) -> Result<Sitemap> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut in_loc = false;
    let mut locs: Vec<String> = Vec::new();
    let mut saw_urlset = false;
    let mut saw_sitemapindex = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(XmlEvent::Start(e)) => {
                let name = e.name();
                if name.as_ref().ends_with(b"urlset") {
                    saw_urlset = true;
                } else if name.as_ref().ends_with(b"sitemapindex") {
                    saw_sitemapindex = true;
                } else if name.as_ref().ends_with(b"loc") {
                    in_loc = true;
                }
            }
            Ok(XmlEvent::End(e)) => {
                if e.name().as_ref().ends_with(b"loc") {
                    in_loc = false;
                }
            }
            Ok(XmlEvent::Text(t)) if in_loc => {
                let text = t.unescape().map_err(|e| MirrorError::Parse {
                    what: "sitemap",
                    url: source_url.to_string(),
                    message: e.to_string(),
                })?;
                locs.push(text.trim().to_string());
            }
            Ok(XmlEvent::CData(c)) if in_loc => {
                locs.push(String::from_utf8_lossy(&c.into_inner()).trim().to_string());
            }
            Ok(XmlEvent::Eof) => break,
            Err(e) => {
                if saw_urlset || saw_sitemapindex {
                    warn!("Sitemap {} is truncated or malformed: {}", source_url, e);
                    break;
                }
                return Err(MirrorError::Parse {
                    what: "sitemap",
                    url: source_url.to_string(),
                    message: e.to_string(),
                });
            }
            _ => {}
        }
        buf.clear();
    }

    locs.retain(|loc| !loc.is_empty());

    if saw_sitemapindex && !saw_urlset {
        Ok(Sitemap::Index(locs))
    } else if saw_urlset {
        Ok(Sitemap::UrlSet(locs))
    } else {
        Err(MirrorError::Parse {
            what: "sitemap",
            url: source_url.to_string(),
            message: "document is neither a urlset nor a sitemapindex".to_string(),
        })
    }
}

/// Discovers pages from `sitemap.xml`, following sitemap indexes
pub struct SitemapAdapter {
    scope: SiteScope,
}

impl SitemapAdapter {
    pub fn new(scope: SiteScope) -> Self {
        Self { scope }
    }

    /// Sitemap locations to try, in order: below the base path, then at the origin
    pub fn locations(&self) -> Vec<String> {
        let origin = self.scope.origin();
        let mut locations = vec![format!("{}{}/sitemap.xml", origin, self.scope.base_path())];
        let at_origin = format!("{}/sitemap.xml", origin);
        if !locations.contains(&at_origin) {
            locations.push(at_origin);
        }
        locations
    }

    /// Collects all page locations reachable from one root sitemap
    async fn collect(&self, fetcher: &HttpFetcher, root: &str) -> Result<Vec<String>> {
        let mut pages = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<(String, usize)> = VecDeque::new();
        queue.push_back((root.to_string(), 0));

        while let Some((sitemap_url, depth)) = queue.pop_front() {
            if !seen.insert(sitemap_url.clone()) {
                continue;
            }

            let parsed = fetcher
                .get(&sitemap_url)
                .await
                .and_then(|fetched| parse_sitemap(&fetched.body, &sitemap_url));

            let sitemap = match parsed {
                Ok(sitemap) => sitemap,
                // The root decides whether this location exists at all
                Err(e) if depth == 0 => return Err(e),
                Err(e) => {
                    warn!("Skipping child sitemap {}: {}", sitemap_url, e);
                    continue;
                }
            };

            match sitemap {
                Sitemap::UrlSet(locs) => {
                    debug!("Found {} URLs in {}", locs.len(), sitemap_url);
                    pages.extend(locs);
                }
                Sitemap::Index(children) if depth < MAX_INDEX_DEPTH => {
                    debug!("Sitemap index {} lists {} sitemaps", sitemap_url, children.len());
                    queue.extend(children.into_iter().map(|child| (child, depth + 1)));
                }
                Sitemap::Index(_) => {
                    debug!("Not following sitemap index {} (too deep)", sitemap_url);
                }
            }
        }

        Ok(pages)
    }
}

#[async_trait]
impl SiteAdapter for SitemapAdapter {
    fn name(&self) -> &'static str {
        "sitemap"
    }

    fn scope(&self) -> &SiteScope {
        &self.scope
    }

    async fn discover_seeds(&self, fetcher: &HttpFetcher) -> Result<Vec<PageUrl>> {
        for location in self.locations() {
            match self.collect(fetcher, &location).await {
                Ok(locs) => {
                    let pages = dedupe_in_scope(&self.scope, locs.iter().map(String::as_str));
                    if !pages.is_empty() {
                        debug!("Found {} in-scope pages from sitemap {}", pages.len(), location);
                        return Ok(pages);
                    }
                }
                Err(e) => debug!("Could not use sitemap {}: {}", location, e),
            }
        }
        Ok(Vec::new())
    }
}
