use crate::config::ContentConfig;
use crate::extract::boilerplate::{is_furniture, STRUCTURAL_SELECTORS};
use crate::extract::permalink::{heading_text, is_permalink_anchor};
use crate::site::SiteProfile;
use crate::{ConfigError, MirrorError, Result};
use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};

/// A page reduced to its content region
pub struct ExtractedPage {
    document: Html,
    root: NodeId,
    title: Option<String>,
}

impl ExtractedPage {
    /// The content region, with boilerplate already removed
    pub fn root(&self) -> Option<ElementRef<'_>> {
        self.document.tree.get(self.root).and_then(ElementRef::wrap)
    }

    /// Resolved page title, if any
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

/// Isolates the main content of a page and strips site furniture from it
pub struct ContentExtractor {
    profile: &'static SiteProfile,
    content_selectors: Vec<Selector>,
    removal_selectors: Vec<Selector>,
    body: Selector,
    h1: Selector,
    title: Selector,
    anchors: Selector,
    furniture: Selector,
}

fn compile(css: &str) -> std::result::Result<Selector, ConfigError> {
    Selector::parse(css).map_err(|e| ConfigError::InvalidSelector {
        selector: css.to_string(),
        message: format!("{:?}", e),
    })
}

impl ContentExtractor {
    /// Builds an extractor for a site family plus user-supplied selectors
    ///
    /// User content selectors are tried before the family's own; user removal
    /// selectors are applied on top of the built-in boilerplate rules.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidSelector` if any selector fails to parse.
    pub fn new(
        profile: &'static SiteProfile,
        content: &ContentConfig,
    ) -> std::result::Result<Self, ConfigError> {
        let content_selectors = content
            .selectors
            .iter()
            .map(String::as_str)
            .chain(profile.content_selectors.iter().copied())
            .map(compile)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let removal_selectors = STRUCTURAL_SELECTORS
            .iter()
            .copied()
            .chain(profile.boilerplate_selectors.iter().copied())
            .chain(content.remove.iter().map(String::as_str))
            .map(compile)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            profile,
            content_selectors,
            removal_selectors,
            body: compile("body")?,
            h1: compile("h1")?,
            title: compile("title")?,
            anchors: compile("h1 a, h2 a, h3 a, h4 a, h5 a, h6 a")?,
            furniture: compile("p, div, span, small, time")?,
        })
    }

    /// Extracts the content region of a parsed page
    ///
    /// # Steps
    ///
    /// 1. Select the main-content node (configured selectors, then family
    ///    selectors, then `<body>` when the family allows it)
    /// 2. Remove heading permalink anchors so heading text stays clean
    /// 3. Resolve the title: first `<h1>`, else `<title>` up to the first `|`
    /// 4. Remove structural boilerplate and textual furniture inside the region
    ///
    /// # Errors
    ///
    /// Returns `MirrorError::Extraction` when no content region is found.
    pub fn extract(&self, mut document: Html, page_url: &str) -> Result<ExtractedPage> {
        let root = self
            .find_root(&document)
            .ok_or_else(|| MirrorError::Extraction {
                url: page_url.to_string(),
            })?;

        let permalinks: Vec<NodeId> = document
            .select(&self.anchors)
            .filter(|anchor| is_permalink_anchor(*anchor, self.profile))
            .map(|anchor| anchor.id())
            .collect();
        detach_all(&mut document, &permalinks, root);

        let title = self.resolve_title(&document);

        let boilerplate = self.collect_boilerplate(&document, root);
        detach_all(&mut document, &boilerplate, root);

        Ok(ExtractedPage {
            document,
            root,
            title,
        })
    }

    fn find_root(&self, document: &Html) -> Option<NodeId> {
        self.content_selectors
            .iter()
            .find_map(|selector| document.select(selector).next())
            .or_else(|| {
                if self.profile.body_fallback {
                    document.select(&self.body).next()
                } else {
                    None
                }
            })
            .map(|element| element.id())
    }

    fn resolve_title(&self, document: &Html) -> Option<String> {
        let from_heading = document
            .select(&self.h1)
            .next()
            .map(|h1| heading_text(h1, self.profile))
            .filter(|text| !text.is_empty());

        from_heading.or_else(|| {
            document.select(&self.title).next().and_then(|title| {
                let text: String = title.text().collect();
                let text = text.split('|').next().unwrap_or_default().trim().to_string();
                if text.is_empty() {
                    None
                } else {
                    Some(text)
                }
            })
        })
    }

    fn collect_boilerplate(&self, document: &Html, root: NodeId) -> Vec<NodeId> {
        let Some(region) = document.tree.get(root).and_then(ElementRef::wrap) else {
            return Vec::new();
        };

        let mut ids: Vec<NodeId> = self
            .removal_selectors
            .iter()
            .flat_map(|selector| region.select(selector))
            .map(|element| element.id())
            .collect();

        ids.extend(
            region
                .select(&self.furniture)
                .filter(|element| is_furniture(*element))
                .map(|element| element.id()),
        );

        ids
    }
}

/// Detaches the given nodes, never the content root itself
fn detach_all(document: &mut Html, ids: &[NodeId], root: NodeId) {
    for id in ids {
        if *id == root {
            continue;
        }
        if let Some(mut node) = document.tree.get_mut(*id) {
            node.detach();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::SiteFamily;

    fn extractor(family: SiteFamily) -> ContentExtractor {
        ContentExtractor::new(family.profile(), &ContentConfig::default()).unwrap()
    }

    fn region_html(page: &ExtractedPage) -> String {
        page.root().unwrap().html()
    }

    #[test]
    fn test_prefers_main_landmark() {
        let html = Html::parse_document(
            "<html><body><div class='chrome'>Menu</div><main><p>Real content</p></main></body></html>",
        );
        let page = extractor(SiteFamily::Generic)
            .extract(html, "https://example.com/")
            .unwrap();
        let region = region_html(&page);
        assert!(region.starts_with("<main>"));
        assert!(!region.contains("Menu"));
    }

    #[test]
    fn test_body_fallback_for_generic() {
        let html = Html::parse_document("<html><body><p>Only body</p></body></html>");
        let page = extractor(SiteFamily::Generic)
            .extract(html, "https://example.com/")
            .unwrap();
        assert!(region_html(&page).contains("Only body"));
    }

    #[test]
    fn test_no_region_for_strict_family() {
        let html = Html::parse_document("<html><body><p>Only body</p></body></html>");
        let result = extractor(SiteFamily::Mkdocs).extract(html, "https://example.com/x");
        assert!(matches!(result, Err(MirrorError::Extraction { .. })));
    }

    #[test]
    fn test_configured_selector_wins() {
        let content = ContentConfig {
            selectors: vec!["#docs".to_string()],
            ..ContentConfig::default()
        };
        let extractor = ContentExtractor::new(SiteFamily::Generic.profile(), &content).unwrap();
        let html = Html::parse_document(
            "<html><body><main><p>Wrapper</p><div id='docs'><p>Inner</p></div></main></body></html>",
        );
        let page = extractor.extract(html, "https://example.com/").unwrap();
        let region = region_html(&page);
        assert!(region.contains("Inner"));
        assert!(!region.contains("Wrapper"));
    }

    #[test]
    fn test_invalid_configured_selector() {
        let content = ContentConfig {
            remove: vec!["div[".to_string()],
            ..ContentConfig::default()
        };
        assert!(matches!(
            ContentExtractor::new(SiteFamily::Generic.profile(), &content),
            Err(ConfigError::InvalidSelector { .. })
        ));
    }

    #[test]
    fn test_boilerplate_removed() {
        let html = Html::parse_document(
            r#"<html><body><article>
                <nav>Breadcrumbs</nav>
                <p>Keep me</p>
                <button>Copy</button>
                <p>Last updated on May 1</p>
                <div>Was this page helpful?</div>
                <a rel="next" href="/next">Next page</a>
                <footer>Footer</footer>
            </article></body></html>"#,
        );
        let page = extractor(SiteFamily::Generic)
            .extract(html, "https://example.com/")
            .unwrap();
        let region = region_html(&page);
        assert!(region.contains("Keep me"));
        for junk in ["Breadcrumbs", "Copy", "Last updated", "helpful", "Next page", "Footer"] {
            assert!(!region.contains(junk), "{} survived", junk);
        }
    }

    #[test]
    fn test_stamp_removed_from_wrapper_that_holds_content() {
        let html = Html::parse_document(
            r#"<html><body><article><h1>Install</h1><div>
                <p>Run cargo install docmirror to get started.</p>
                <p>Last updated on May 1</p>
            </div></article></body></html>"#,
        );
        let page = extractor(SiteFamily::Generic)
            .extract(html, "https://example.com/")
            .unwrap();
        let region = region_html(&page);
        assert!(region.contains("Run cargo install docmirror"));
        assert!(!region.contains("Last updated"));
    }

    #[test]
    fn test_family_boilerplate_removed() {
        let html = Html::parse_document(
            r#"<html><body><article class="md-content__inner">
                <a class="md-content__button" href="/edit">Edit this page</a>
                <p>Body</p>
            </article></body></html>"#,
        );
        let page = extractor(SiteFamily::Mkdocs)
            .extract(html, "https://example.com/")
            .unwrap();
        assert!(!region_html(&page).contains("Edit this page"));
    }

    #[test]
    fn test_title_from_h1_without_permalink() {
        let html = Html::parse_document(
            r##"<html><head><title>Ignored | Site</title></head><body><main>
                <h1 id="intro">Introduction<a class="headerlink" href="#intro">¶</a></h1>
                <p>Text</p></main></body></html>"##,
        );
        let page = extractor(SiteFamily::Generic)
            .extract(html, "https://example.com/")
            .unwrap();
        assert_eq!(page.title(), Some("Introduction"));
        assert!(!region_html(&page).contains("headerlink"));
    }

    #[test]
    fn test_title_from_document_title() {
        let html = Html::parse_document(
            "<html><head><title>Getting Started | Acme Docs</title></head><body><main><p>Text</p></main></body></html>",
        );
        let page = extractor(SiteFamily::Generic)
            .extract(html, "https://example.com/")
            .unwrap();
        assert_eq!(page.title(), Some("Getting Started"));
    }
}
