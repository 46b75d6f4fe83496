use crate::extract::heading_level;
use scraper::node::Element;

/// Conversion category of an HTML element
///
/// Every element maps to exactly one kind; the converter matches on the kind
/// exhaustively, so a new category has to be handled everywhere it matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// `h1`..`h6`
    Heading(u8),
    /// `p`
    Paragraph,
    /// `pre`, a fenced code block
    Preformatted,
    /// `code`, `kbd`, `samp` outside a code block
    Code,
    /// `ul`
    UnorderedList,
    /// `ol`
    OrderedList,
    /// `blockquote`
    Blockquote,
    /// `table`
    Table,
    /// `a`
    Link,
    /// `img`
    Image,
    /// `strong`, `b`
    Bold,
    /// `em`, `i`
    Italic,
    /// `br`
    LineBreak,
    /// `hr`
    HorizontalRule,
    /// `figure` (image plus caption)
    Figure,
    /// MkDocs `div.admonition` and `details`
    Admonition,
    /// Presentation-only or interactive elements, dropped with their subtree
    Skip,
    /// Block-level wrapper; children are converted, surrounding text is split
    Block,
    /// Anything else; children are converted in place
    Container,
}

const SKIPPED: &[&str] = &[
    "script", "style", "nav", "footer", "svg", "noscript", "template", "button", "iframe",
    "canvas", "form", "input", "select", "textarea", "head", "link", "meta", "object", "video",
    "audio",
];

const BLOCKS: &[&str] = &[
    "html", "body", "main", "article", "section", "header", "div", "aside", "dl", "dt", "dd",
    "li", "tr", "td", "th", "thead", "tbody", "tfoot", "caption", "figcaption", "summary",
    "address", "hgroup", "center",
];

impl ElementKind {
    /// Classifies an element by tag name (and class for admonitions)
    pub fn classify(element: &Element) -> Self {
        let name = element.name();

        if let Some(level) = heading_level(name) {
            return Self::Heading(level);
        }

        match name {
            "p" => Self::Paragraph,
            "pre" => Self::Preformatted,
            "code" | "kbd" | "samp" => Self::Code,
            "ul" => Self::UnorderedList,
            "ol" => Self::OrderedList,
            "blockquote" => Self::Blockquote,
            "table" => Self::Table,
            "a" => Self::Link,
            "img" => Self::Image,
            "strong" | "b" => Self::Bold,
            "em" | "i" => Self::Italic,
            "br" => Self::LineBreak,
            "hr" => Self::HorizontalRule,
            "figure" => Self::Figure,
            "details" => Self::Admonition,
            "div" if element.classes().any(|class| class == "admonition") => Self::Admonition,
            _ if SKIPPED.contains(&name) => Self::Skip,
            _ if BLOCKS.contains(&name) => Self::Block,
            _ => Self::Container,
        }
    }

    /// Returns true for kinds that produce their own Markdown block
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            Self::Heading(_)
                | Self::Paragraph
                | Self::Preformatted
                | Self::UnorderedList
                | Self::OrderedList
                | Self::Blockquote
                | Self::Table
                | Self::HorizontalRule
                | Self::Figure
                | Self::Admonition
                | Self::Block
        )
    }
}
