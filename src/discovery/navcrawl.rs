use crate::crawler::HttpFetcher;
use crate::discovery::{collect_anchors, SiteAdapter};
use crate::site::SiteProfile;
use crate::url::{PageUrl, SiteScope};
use crate::Result;
use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

/// Discovers pages from the navigation region of the base page
///
/// This is the fallback strategy for sites without a sitemap or manifest.
pub struct NavCrawlAdapter {
    scope: SiteScope,
    profile: &'static SiteProfile,
}

impl NavCrawlAdapter {
    pub fn new(scope: SiteScope, profile: &'static SiteProfile) -> Self {
        Self { scope, profile }
    }

    /// Collects in-scope links from the navigation region of a parsed page
    ///
    /// The region is the first element matching one of the family's sidebar
    /// selectors, else the first `<nav>`, else the whole document.
    pub fn nav_links(&self, document: &Html, page_url: &Url) -> Vec<PageUrl> {
        let region = self
            .profile
            .sidebar_selectors
            .iter()
            .chain(std::iter::once(&"nav"))
            .filter_map(|css| Selector::parse(css).ok())
            .find_map(|selector| document.select(&selector).next())
            .unwrap_or_else(|| document.root_element());

        debug!(
            "Collecting navigation links from <{}>",
            region.value().name()
        );
        collect_anchors(&self.scope, region, page_url)
    }
}

#[async_trait]
impl SiteAdapter for NavCrawlAdapter {
    fn name(&self) -> &'static str {
        "nav-crawl"
    }

    fn scope(&self) -> &SiteScope {
        &self.scope
    }

    async fn discover_seeds(&self, fetcher: &HttpFetcher) -> Result<Vec<PageUrl>> {
        let base = self.scope.base().location();
        let fetched = fetcher.get(base.as_str()).await?;
        let page_url = Url::parse(&fetched.final_url).unwrap_or_else(|_| base.clone());

        let document = Html::parse_document(&fetched.text());
        Ok(self.nav_links(&document, &page_url))
    }
}
