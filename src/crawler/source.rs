//! Raw Markdown source probe
//!
//! Some platforms publish the Markdown a page was built from next to the
//! rendered page (`<page>.md` or `<page>.mdx`). When available it is saved
//! verbatim instead of converting the HTML, with its image references
//! rewritten to the local copies.

use crate::crawler::{HttpFetcher, ImagePipeline};
use crate::markdown::ImageReference;
use crate::url::{image_link_prefix, image_local_path, resolve_href, PageUrl};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;
use url::Url;

/// Extensions probed, in order
const SOURCE_EXTENSIONS: &[&str] = &["md", "mdx"];

/// How much of a body is inspected for an HTML signature
const SNIFF_BYTES: usize = 500;

static MARKDOWN_IMAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(!\[[^\]]*\]\()([^)\s]+)((?:\s+"[^"]*")?\))"#).expect("markdown image regex is valid")
});

static HTML_IMAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(<img\b[^>]*?\bsrc=["'])([^"']+)(["'])"#).expect("html image regex is valid")
});

/// Returns the candidate source URLs of a page
pub fn source_candidates(page: &PageUrl) -> Vec<String> {
    let stem = if page.path() == "/" {
        format!("{}index", page.as_str())
    } else {
        page.as_str().trim_end_matches('/').to_string()
    };

    let (stem, query) = match stem.split_once('?') {
        Some((stem, query)) => (stem.to_string(), format!("?{}", query)),
        None => (stem, String::new()),
    };

    SOURCE_EXTENSIONS
        .iter()
        .map(|ext| format!("{}.{}{}", stem, ext, query))
        .collect()
}

/// Returns true if a body is an HTML page rather than Markdown
pub fn looks_like_html(content_type: &str, body: &[u8]) -> bool {
    if content_type.contains("text/html") {
        return true;
    }
    let head = &body[..body.len().min(SNIFF_BYTES)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();
    head.contains("<!doctype html") || head.contains("<html")
}

/// Collects the distinct image sources referenced by Markdown or inline HTML
fn image_sources(markdown: &str) -> Vec<String> {
    let mut sources: Vec<String> = Vec::new();
    let found = MARKDOWN_IMAGE
        .captures_iter(markdown)
        .chain(HTML_IMAGE.captures_iter(markdown))
        .map(|caps| caps[2].to_string());
    for source in found {
        if !sources.contains(&source) {
            sources.push(source);
        }
    }
    sources
}

/// Rewrites image sources found in `localized` to their local paths
fn rewrite_images(markdown: &str, localized: &HashMap<String, String>) -> String {
    let replace = |caps: &Captures<'_>| match localized.get(&caps[2]) {
        Some(local) => format!("{}{}{}", &caps[1], local, &caps[3]),
        None => caps[0].to_string(),
    };
    let markdown = MARKDOWN_IMAGE.replace_all(markdown, replace);
    HTML_IMAGE.replace_all(&markdown, replace).into_owned()
}

/// Tries to fetch the raw source of a page and localize its images
///
/// # Arguments
///
/// * `fetcher` - Shared HTTP capability
/// * `images` - Run-wide image pipeline
/// * `page` - The page whose source is probed
/// * `page_path` - Output path of the page, relative to the output root
///
/// # Returns
///
/// The Markdown to save, or `None` when no candidate answered with a
/// non-HTML body.
pub async fn probe_source(
    fetcher: &HttpFetcher,
    images: &ImagePipeline,
    page: &PageUrl,
    page_path: &Path,
) -> Option<String> {
    for candidate in source_candidates(page) {
        let fetched = match fetcher.get(&candidate).await {
            Ok(fetched) => fetched,
            Err(e) => {
                debug!("No source at {}: {}", candidate, e);
                continue;
            }
        };

        if looks_like_html(&fetched.content_type, &fetched.body) {
            debug!("Source probe {} returned HTML", candidate);
            continue;
        }

        let markdown = fetched.text();
        if markdown.trim().is_empty() {
            continue;
        }

        let source_base = Url::parse(&fetched.final_url).unwrap_or_else(|_| page.location().clone());
        let prefix = image_link_prefix(page_path);
        let mut localized = HashMap::new();
        for source in image_sources(&markdown) {
            if source.starts_with("data:") {
                continue;
            }
            let Some(mut url) = resolve_href(&source, &source_base) else {
                continue;
            };
            url.set_fragment(None);

            let image = ImageReference {
                local_path: image_local_path(&url),
                source_url: url.to_string(),
            };
            if images.ensure(&image).await.is_ok() {
                localized.insert(source, format!("{}{}", prefix, image.local_path));
            }
        }

        debug!("Using raw source {}", candidate);
        return Some(rewrite_images(&markdown, &localized));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::normalize_url;

    #[test]
    fn test_source_candidates() {
        let page = normalize_url("https://docs.example.com/guide/setup", false).unwrap();
        assert_eq!(
            source_candidates(&page),
            vec![
                "https://docs.example.com/guide/setup.md",
                "https://docs.example.com/guide/setup.mdx",
            ]
        );

        let root = normalize_url("https://docs.example.com/", false).unwrap();
        assert_eq!(source_candidates(&root)[0], "https://docs.example.com/index.md");
    }

    #[test]
    fn test_looks_like_html() {
        assert!(looks_like_html("text/html; charset=utf-8", b"# Title"));
        assert!(looks_like_html("text/plain", b"\n<!DOCTYPE html><html></html>"));
        assert!(looks_like_html("", b"<HTML><body></body></HTML>"));
        assert!(!looks_like_html("text/markdown", b"# Title\n\nBody"));
    }

    #[test]
    fn test_image_sources() {
        let markdown = concat!(
            "![Diagram](/images/diagram.png)\n",
            "![Again](/images/diagram.png \"title\")\n",
            "<img src=\"https://cdn.example.com/logo.svg\" alt=\"logo\" />\n",
        );
        assert_eq!(
            image_sources(markdown),
            vec!["/images/diagram.png", "https://cdn.example.com/logo.svg"]
        );
    }

    #[test]
    fn test_rewrite_images() {
        let markdown = "![A](/a.png \"t\") and <img class=\"x\" src='/b.png'> and ![C](/c.png)";
        let mut localized = HashMap::new();
        localized.insert("/a.png".to_string(), "../img/a.png".to_string());
        localized.insert("/b.png".to_string(), "../img/b.png".to_string());
        assert_eq!(
            rewrite_images(markdown, &localized),
            "![A](../img/a.png \"t\") and <img class=\"x\" src='../img/b.png'> and ![C](/c.png)"
        );
    }
}
