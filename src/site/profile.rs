use crate::site::SiteFamily;

/// Static per-family extraction and discovery knowledge
#[derive(Debug)]
pub struct SiteProfile {
    /// Main-content selectors, tried in order
    pub content_selectors: &'static [&'static str],

    /// Use `<body>` when no content selector matches
    pub body_fallback: bool,

    /// Dedicated sidebar navigation selectors used by nav-crawl discovery
    pub sidebar_selectors: &'static [&'static str],

    /// Navigation manifest file names, relative to the base URL and to the origin
    pub manifest_files: &'static [&'static str],

    /// Family-specific boilerplate removed from the content region
    pub boilerplate_selectors: &'static [&'static str],

    /// Junk the platform prepends to heading text
    pub heading_prefixes: &'static [&'static str],

    /// Every anchor inside a heading is a permalink, whatever its class
    pub strip_heading_anchors: bool,

    /// Content only appears after client-side rendering
    pub requires_rendering: bool,

    /// Raw Markdown sources are published next to the rendered pages
    pub publishes_sources: bool,
}

const GENERIC: SiteProfile = SiteProfile {
    content_selectors: &["article", "main", "div[role=main]", "[role=main]"],
    body_fallback: true,
    sidebar_selectors: &["nav.sidebar", ".sidebar nav", "aside nav"],
    manifest_files: &["mint.json", "docs.json"],
    boilerplate_selectors: &[],
    heading_prefixes: &[],
    strip_heading_anchors: false,
    requires_rendering: false,
    publishes_sources: false,
};

const MKDOCS: SiteProfile = SiteProfile {
    content_selectors: &[
        "article.md-content__inner",
        "article",
        "div.md-content",
        "main",
        "div[role=main]",
    ],
    body_fallback: false,
    sidebar_selectors: &["nav.md-nav--primary", "nav.md-nav"],
    manifest_files: &[],
    boilerplate_selectors: &[
        "a.md-content__button",
        ".md-footer-nav",
        "nav.md-footer__inner",
        "a.md-source",
    ],
    heading_prefixes: &[],
    strip_heading_anchors: false,
    requires_rendering: false,
    publishes_sources: false,
};

const GITBOOK: SiteProfile = SiteProfile {
    content_selectors: &["main", "article", "div[role=main]"],
    body_fallback: false,
    sidebar_selectors: &["aside nav", "aside"],
    manifest_files: &[],
    boilerplate_selectors: &[],
    heading_prefixes: &["Direct link to heading", "hashtag"],
    strip_heading_anchors: true,
    requires_rendering: false,
    publishes_sources: false,
};

const README: SiteProfile = SiteProfile {
    content_selectors: &["article", "main", "div[role=main]"],
    body_fallback: false,
    sidebar_selectors: &["nav.rm-Sidebar", "nav[aria-label]"],
    manifest_files: &[],
    boilerplate_selectors: &[
        "nav[aria-label='Pagination Controls']",
        "nav[aria-label='Table of contents']",
    ],
    heading_prefixes: &["Skip link to"],
    strip_heading_anchors: true,
    requires_rendering: false,
    publishes_sources: false,
};

const MINTLIFY: SiteProfile = SiteProfile {
    content_selectors: &["#content-area", "article", "main", "div[role=main]"],
    body_fallback: true,
    sidebar_selectors: &["#sidebar", "#sidebar-content"],
    manifest_files: &["mint.json", "docs.json"],
    boilerplate_selectors: &["#pagination", "#footer"],
    heading_prefixes: &["Navigate to header"],
    strip_heading_anchors: false,
    requires_rendering: false,
    publishes_sources: true,
};

const STOPLIGHT: SiteProfile = SiteProfile {
    content_selectors: &["main", "article"],
    body_fallback: true,
    sidebar_selectors: &["[data-testid='sidebar']"],
    manifest_files: &[],
    boilerplate_selectors: &["header"],
    heading_prefixes: &[],
    strip_heading_anchors: false,
    requires_rendering: true,
    publishes_sources: false,
};

impl SiteProfile {
    /// Looks up the static profile of a family
    pub fn for_family(family: SiteFamily) -> &'static SiteProfile {
        match family {
            SiteFamily::Generic => &GENERIC,
            SiteFamily::Mkdocs => &MKDOCS,
            SiteFamily::Gitbook => &GITBOOK,
            SiteFamily::Readme => &README,
            SiteFamily::Mintlify => &MINTLIFY,
            SiteFamily::Stoplight => &STOPLIGHT,
        }
    }
}
