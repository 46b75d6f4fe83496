use crate::site::SiteFamily;
use serde::Deserialize;

/// Main configuration structure for docmirror
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mirror: MirrorConfig,
    pub http: HttpConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub content: ContentConfig,
}

/// What to mirror and where to put it
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MirrorConfig {
    /// Root URL of the documentation site; only pages under its path are mirrored
    pub base_url: String,

    /// Directory the Markdown tree is written to
    pub output_dir: String,

    /// Number of concurrent workers, also the global fetch limit
    pub concurrency: u32,

    /// Leave pre-existing output files untouched and skip their fetch
    pub skip_existing: bool,

    /// Documentation platform the site is built with
    pub family: SiteFamily,

    /// Try `<page>.md` / `<page>.mdx` before converting HTML.
    /// Defaults to the family's preference when unset.
    pub prefer_source: Option<bool>,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            output_dir: "./downloaded_docs".to_string(),
            concurrency: 5,
            skip_existing: false,
            family: SiteFamily::Generic,
            prefer_source: None,
        }
    }
}

/// Network timing configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpConfig {
    /// Whole-request timeout (seconds)
    pub timeout_secs: u64,

    /// TCP connect timeout (seconds)
    pub connect_timeout_secs: u64,

    /// How long an idle worker waits on an empty frontier before re-checking (seconds)
    pub idle_timeout_secs: u64,

    /// Maximum redirects followed per request
    pub max_redirects: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            idle_timeout_secs: 5,
            max_redirects: 10,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the mirroring tool
    pub crawler_name: String,

    /// Version of the mirroring tool
    pub crawler_version: String,

    /// Optional URL with information about the tool
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "docmirror".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the user agent header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

/// Content extraction tuning
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ContentConfig {
    /// Extra main-content selectors tried before the family's own list
    pub selectors: Vec<String>,

    /// Extra boilerplate selectors removed from the content region
    pub remove: Vec<String>,

    /// Pages whose body (title line excluded) is shorter than this are skipped
    pub min_content_chars: usize,

    /// Treat URLs differing only by query string as distinct pages
    pub keep_query: bool,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            selectors: Vec::new(),
            remove: Vec::new(),
            min_content_chars: 10,
            keep_query: false,
        }
    }
}
