//! Heading permalink detection and heading text cleanup

use crate::site::SiteProfile;
use scraper::{ElementRef, Node};

/// Class names documentation generators put on heading permalink anchors
const PERMALINK_CLASSES: &[&str] = &[
    "headerlink",
    "anchor",
    "hash-link",
    "heading-anchor",
    "anchor-link",
];

/// Visible texts of icon-only permalink anchors
const PERMALINK_TEXTS: &[&str] = &["", "¶", "#", "🔗", "hashtag"];

/// Returns true for heading tags `h1` through `h6`
pub fn heading_level(name: &str) -> Option<u8> {
    match name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// Returns true if the element is inside (or is) a heading
fn within_heading(element: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| heading_level(ancestor.value().name()).is_some())
}

/// Decides whether an anchor only exists to make its heading linkable
///
/// An anchor inside a heading is a permalink when it carries one of the
/// well-known permalink classes, when its visible text is an icon glyph, when
/// its label starts with "Direct link" or "Permalink", or when the site family
/// marks every heading anchor as a permalink.
pub fn is_permalink_anchor(anchor: ElementRef<'_>, profile: &SiteProfile) -> bool {
    if anchor.value().name() != "a" || !within_heading(anchor) {
        return false;
    }

    if profile.strip_heading_anchors {
        return true;
    }

    if anchor
        .value()
        .classes()
        .any(|class| PERMALINK_CLASSES.contains(&class))
    {
        return true;
    }

    let text: String = anchor.text().collect();
    if PERMALINK_TEXTS.contains(&text.trim()) {
        return true;
    }

    ["aria-label", "title"].iter().any(|attr| {
        anchor.value().attr(attr).map_or(false, |label| {
            label.starts_with("Direct link") || label.starts_with("Permalink")
        })
    })
}

/// Strips pilcrows and platform-specific junk prefixes from heading text
pub fn clean_heading_text(text: &str, prefixes: &[&str]) -> String {
    let cleaned = text.replace('¶', "");
    let mut current = cleaned.trim();

    loop {
        let before = current.len();
        for prefix in prefixes {
            if let Some(rest) = current.strip_prefix(prefix) {
                current = rest.trim_start();
            }
        }
        if current.len() == before {
            break;
        }
    }

    current.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collects the text of a heading, leaving out permalink anchors
pub fn heading_text(heading: ElementRef<'_>, profile: &SiteProfile) -> String {
    let mut text = String::new();
    collect_heading_text(heading, profile, &mut text);
    clean_heading_text(&text, profile.heading_prefixes)
}

fn collect_heading_text(element: ElementRef<'_>, profile: &SiteProfile, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    if is_permalink_anchor(child_element, profile) {
                        continue;
                    }
                    let name = child_element.value().name();
                    if matches!(name, "svg" | "script" | "style" | "button") {
                        continue;
                    }
                    collect_heading_text(child_element, profile, out);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::SiteFamily;
    use scraper::{Html, Selector};

    fn first<'a>(document: &'a Html, css: &str) -> ElementRef<'a> {
        let selector = Selector::parse(css).unwrap();
        document.select(&selector).next().unwrap()
    }

    #[test]
    fn test_headerlink_class_is_permalink() {
        let html = Html::parse_fragment(
            r##"<h2 id="x">Install<a class="headerlink" href="#x">¶</a></h2>"##,
        );
        let anchor = first(&html, "a");
        assert!(is_permalink_anchor(anchor, SiteFamily::Generic.profile()));
    }

    #[test]
    fn test_icon_text_is_permalink() {
        let html = Html::parse_fragment(r##"<h3><a href="#y">#</a> Usage</h3>"##);
        let anchor = first(&html, "a");
        assert!(is_permalink_anchor(anchor, SiteFamily::Generic.profile()));
    }

    #[test]
    fn test_aria_label_is_permalink() {
        let html = Html::parse_fragment(
            r##"<h2><a aria-label="Direct link to Setup" href="#setup">x</a>Setup</h2>"##,
        );
        let anchor = first(&html, "a");
        assert!(is_permalink_anchor(anchor, SiteFamily::Generic.profile()));
    }

    #[test]
    fn test_real_link_in_heading_is_kept() {
        let html =
            Html::parse_fragment(r#"<h2>Using <a href="/api">the API</a></h2>"#);
        let anchor = first(&html, "a");
        assert!(!is_permalink_anchor(anchor, SiteFamily::Generic.profile()));
        assert!(is_permalink_anchor(anchor, SiteFamily::Gitbook.profile()));
    }

    #[test]
    fn test_anchor_outside_heading_is_not_permalink() {
        let html = Html::parse_fragment(r##"<p><a class="anchor" href="#x">#</a></p>"##);
        let anchor = first(&html, "a");
        assert!(!is_permalink_anchor(anchor, SiteFamily::Generic.profile()));
    }

    #[test]
    fn test_clean_heading_text() {
        assert_eq!(clean_heading_text("Install ¶", &[]), "Install");
        assert_eq!(
            clean_heading_text("hashtag Direct link to heading Setup", &["Direct link to heading", "hashtag"]),
            "Setup"
        );
        assert_eq!(clean_heading_text("Skip link to Auth", &["Skip link to"]), "Auth");
    }

    #[test]
    fn test_heading_text_skips_permalinks() {
        let html = Html::parse_fragment(
            r##"<h2>Config <code>file</code><a class="headerlink" href="#c">¶</a></h2>"##,
        );
        let heading = first(&html, "h2");
        assert_eq!(
            heading_text(heading, SiteFamily::Mkdocs.profile()),
            "Config file"
        );
    }
}
