//! Seed discovery
//!
//! This module provides:
//! - [`SiteAdapter`], the capability every discovery strategy implements
//! - Sitemap, manifest and navigation-crawl strategies
//! - [`discover`], which tries the strategies of a family in priority order

mod manifest;
mod navcrawl;
mod sitemap;

pub use manifest::{flatten_manifest, resolve_manifest_entry, ManifestAdapter};
pub use navcrawl::NavCrawlAdapter;
pub use sitemap::{parse_sitemap, Sitemap, SitemapAdapter};

use crate::crawler::HttpFetcher;
use crate::site::SiteProfile;
use crate::url::{resolve_href, PageUrl, SiteScope};
use crate::Result;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

static ANCHOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("anchor selector is valid"));

/// A strategy for finding the pages of a documentation site
#[async_trait]
pub trait SiteAdapter: Send + Sync {
    /// Short name used in log lines
    fn name(&self) -> &'static str;

    /// The site being mirrored
    fn scope(&self) -> &SiteScope;

    /// Produces the initial page list; an empty list means this strategy found nothing
    async fn discover_seeds(&self, fetcher: &HttpFetcher) -> Result<Vec<PageUrl>>;

    /// Collects in-scope page links from a fetched document
    fn extract_links(&self, document: &Html, page_url: &Url) -> Vec<PageUrl> {
        collect_anchors(self.scope(), document.root_element(), page_url)
    }
}

/// Outcome of seed discovery
pub struct Discovery {
    /// Seed pages, always starting with the base URL
    pub seeds: Vec<PageUrl>,
    /// The strategy that produced the seeds (the last one if none did)
    pub adapter: Arc<dyn SiteAdapter>,
}

/// Builds the ordered strategy list for a site
///
/// Sitemap first, then the navigation manifest when the family publishes
/// one, then the navigation crawl.
pub fn adapter_chain(scope: &SiteScope, profile: &'static SiteProfile) -> Vec<Arc<dyn SiteAdapter>> {
    let mut chain: Vec<Arc<dyn SiteAdapter>> = vec![Arc::new(SitemapAdapter::new(scope.clone()))];
    if !profile.manifest_files.is_empty() {
        chain.push(Arc::new(ManifestAdapter::new(
            scope.clone(),
            profile.manifest_files,
        )));
    }
    chain.push(Arc::new(NavCrawlAdapter::new(scope.clone(), profile)));
    chain
}

/// Runs the strategies in order and stops at the first one yielding a page
///
/// # Arguments
///
/// * `chain` - Strategies in priority order, as built by [`adapter_chain`]
/// * `scope` - The site being mirrored
/// * `fetcher` - Shared HTTP capability
///
/// # Returns
///
/// The seed list (base URL first, no duplicates) and the winning strategy.
/// Strategy errors are logged and treated as "found nothing".
pub async fn discover(
    chain: Vec<Arc<dyn SiteAdapter>>,
    scope: &SiteScope,
    fetcher: &HttpFetcher,
) -> Discovery {
    let mut found: Option<(Vec<PageUrl>, Arc<dyn SiteAdapter>)> = None;
    let mut last: Option<Arc<dyn SiteAdapter>> = None;

    for adapter in chain {
        let outcome = adapter.discover_seeds(fetcher).await;
        match outcome {
            Ok(pages) if !pages.is_empty() => {
                info!("Discovered {} pages via {}", pages.len(), adapter.name());
                found = Some((pages, adapter));
                break;
            }
            Ok(_) => debug!("Discovery via {} found no pages", adapter.name()),
            Err(e) => warn!("Discovery via {} failed: {}", adapter.name(), e),
        }
        last = Some(adapter);
    }

    let (pages, adapter) = match (found, last) {
        (Some(found), _) => found,
        (None, Some(last)) => {
            warn!("No discovery strategy found pages; starting from the base URL only");
            (Vec::new(), last)
        }
        (None, None) => (
            Vec::new(),
            Arc::new(NavCrawlAdapter::new(
                scope.clone(),
                SiteProfile::for_family(Default::default()),
            )) as Arc<dyn SiteAdapter>,
        ),
    };

    let mut seeds = vec![scope.base().clone()];
    seeds.extend(pages.into_iter().filter(|page| page != scope.base()));

    Discovery { seeds, adapter }
}

/// Collects in-scope page links below `region`, deduplicated in document order
pub(crate) fn collect_anchors(scope: &SiteScope, region: ElementRef<'_>, page_url: &Url) -> Vec<PageUrl> {
    let mut seen = HashSet::new();
    region
        .select(&ANCHOR)
        .filter(|anchor| anchor.value().attr("download").is_none())
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter_map(|href| resolve_href(href, page_url))
        .filter_map(|url| scope.page_url(&url))
        .filter(|page| seen.insert(page.clone()))
        .collect()
}

/// Keeps the in-scope pages among absolute URL strings, deduplicated in order
pub(crate) fn dedupe_in_scope<'a>(
    scope: &SiteScope,
    urls: impl Iterator<Item = &'a str>,
) -> Vec<PageUrl> {
    let mut seen = HashSet::new();
    urls.filter_map(|raw| Url::parse(raw.trim()).ok())
        .filter_map(|url| scope.page_url(&url))
        .filter(|page| seen.insert(page.clone()))
        .collect()
}
