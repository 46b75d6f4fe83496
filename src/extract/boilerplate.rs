//! Site furniture recognition
//!
//! Structural boilerplate is matched by CSS selector; textual furniture
//! ("Last updated…", feedback widgets, login prompts, copy labels) is matched
//! on the text of small elements so real paragraphs that merely mention those
//! words survive.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;

/// Selectors removed from every content region
pub const STRUCTURAL_SELECTORS: &[&str] = &[
    "nav",
    "aside",
    "footer",
    "button",
    "[data-clipboard-target]",
    "[aria-label='Copy']",
    "[aria-label='Copy to clipboard']",
    "a[rel='prev']",
    "a[rel='next']",
    ".pagination",
    ".pagination-nav",
];

/// Elements small enough to be a furniture stamp rather than content
const FURNITURE_TAGS: &[&str] = &["p", "div", "span", "small", "time"];

/// Children that make an element a container of content rather than a stamp
const BLOCK_CHILDREN: &[&str] = &[
    "p", "div", "section", "article", "main", "ul", "ol", "dl", "table", "pre", "blockquote",
    "figure", "h1", "h2", "h3", "h4", "h5", "h6",
];

/// Longest text (in chars) a furniture element may have
const FURNITURE_MAX_CHARS: usize = 200;

static FURNITURE_PHRASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(last updated|last modified|was this page helpful|did this page help you|log in to see|\bupdated\s+.*\bago\b)",
    )
    .expect("Invalid furniture regex pattern")
});

static COPY_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:Copy|Copy to clipboard|Copy Code)$").expect("Invalid copy label regex pattern")
});

/// Returns true if a small leaf element's text is a furniture phrase
///
/// Elements with block-level children are containers; only the stamp inside
/// them is furniture, never the wrapper.
pub fn is_furniture(element: ElementRef<'_>) -> bool {
    if !FURNITURE_TAGS.contains(&element.value().name()) {
        return false;
    }

    let has_block_child = element
        .children()
        .filter_map(ElementRef::wrap)
        .any(|child| BLOCK_CHILDREN.contains(&child.value().name()));
    if has_block_child {
        return false;
    }

    let text: String = element.text().collect();
    let text = text.trim();
    if text.is_empty() || text.chars().count() > FURNITURE_MAX_CHARS {
        return false;
    }

    COPY_LABEL.is_match(text) || FURNITURE_PHRASE.is_match(text)
}
