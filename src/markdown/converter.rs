use crate::extract::{heading_text, is_permalink_anchor};
use crate::markdown::element::ElementKind;
use crate::markdown::postprocess::postprocess;
use crate::site::SiteProfile;
use crate::url::{image_link_prefix, image_local_path};
use scraper::{ElementRef, Node};
use std::path::Path;
use url::Url;

/// An image found during conversion
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageReference {
    /// Absolute URL of the image
    pub source_url: String,
    /// Path relative to the output root, e.g. `img/diagram.png`
    pub local_path: String,
}

/// Result of converting one content region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// Normalized Markdown body
    pub markdown: String,
    /// Distinct images referenced by the body, in order of appearance
    pub images: Vec<ImageReference>,
}

/// Language class prefixes used by syntax highlighters
const LANGUAGE_PREFIXES: &[&str] = &["language-", "lang-", "highlight-source-", "highlight-"];

/// Link texts of pagination controls
const PAGINATION_WORDS: &[&str] = &["Previous", "Next", "Prev"];

/// Link texts that are icon names rather than words
const ICON_TEXTS: &[&str] = &[
    "arrow-left",
    "arrow-right",
    "arrow-up-right",
    "external-link",
    "hashtag",
    "¶",
    "#",
    "→",
    "←",
];

/// Converts a content region into Markdown
///
/// The conversion is a pure function of the subtree and the page URL:
/// converting the same region twice yields byte-identical output.
#[derive(Debug, Clone, Copy)]
pub struct MarkdownConverter {
    profile: &'static SiteProfile,
}

impl MarkdownConverter {
    /// Creates a converter using a family's heading rules
    pub fn new(profile: &'static SiteProfile) -> Self {
        Self { profile }
    }

    /// Converts a region; image links point at `img/...` from the output root
    ///
    /// # Example
    ///
    /// ```
    /// use docmirror::markdown::MarkdownConverter;
    /// use docmirror::SiteFamily;
    /// use scraper::{Html, Selector};
    /// use url::Url;
    ///
    /// let html = Html::parse_fragment("<div><h1>Title</h1><p>Body</p></div>");
    /// let root = html.select(&Selector::parse("div").unwrap()).next().unwrap();
    /// let page = Url::parse("https://docs.example.com/").unwrap();
    ///
    /// let converter = MarkdownConverter::new(SiteFamily::Generic.profile());
    /// assert_eq!(converter.convert(root, &page).markdown, "# Title\n\nBody");
    /// ```
    pub fn convert(&self, root: ElementRef<'_>, page_url: &Url) -> Conversion {
        self.convert_with_prefix(root, page_url, "")
    }

    /// Converts a region saved at `page_path` (relative to the output root)
    ///
    /// Image links are written relative to the page file, e.g. `../img/a.png`
    /// from `guide/setup.md`.
    pub fn convert_at(&self, root: ElementRef<'_>, page_url: &Url, page_path: &Path) -> Conversion {
        let prefix = image_link_prefix(page_path);
        self.convert_with_prefix(root, page_url, &prefix)
    }

    fn convert_with_prefix(&self, root: ElementRef<'_>, page_url: &Url, prefix: &str) -> Conversion {
        let mut walker = Walker {
            profile: self.profile,
            page_url,
            image_prefix: prefix,
            blocks: Vec::new(),
            inline: String::new(),
            images: Vec::new(),
        };

        if ElementKind::classify(root.value()) == ElementKind::Skip {
            walker.walk_children(root);
        } else {
            walker.walk_element(root);
        }
        walker.flush_inline();

        Conversion {
            markdown: postprocess(&walker.blocks.join("\n\n")),
            images: walker.images,
        }
    }
}

struct Walker<'a> {
    profile: &'static SiteProfile,
    page_url: &'a Url,
    image_prefix: &'a str,
    blocks: Vec<String>,
    inline: String,
    images: Vec<ImageReference>,
}

impl<'a> Walker<'a> {
    fn push_block(&mut self, block: String) {
        if !block.trim().is_empty() {
            self.blocks.push(block);
        }
    }

    /// Turns pending inline text into a paragraph block
    fn flush_inline(&mut self) {
        let pending = std::mem::take(&mut self.inline);
        let paragraph = tidy_lines(&pending);
        self.push_block(paragraph);
    }

    fn walk_children(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.inline.push_str(&collapse_whitespace(text)),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.walk_element(child);
                    }
                }
                _ => {}
            }
        }
    }

    fn walk_element(&mut self, element: ElementRef<'_>) {
        let kind = ElementKind::classify(element.value());
        if kind.is_block() {
            self.flush_inline();
        }

        match kind {
            ElementKind::Heading(level) => {
                let text = heading_text(element, self.profile);
                if !text.is_empty() {
                    self.push_block(format!("{} {}", "#".repeat(level as usize), text));
                }
            }
            ElementKind::Paragraph => {
                let text = tidy_lines(&self.inline_children(element, false));
                self.push_block(text);
            }
            ElementKind::Preformatted => {
                let block = code_block(element);
                self.push_block(block);
            }
            ElementKind::UnorderedList | ElementKind::OrderedList => {
                let block = self.list(element, kind == ElementKind::OrderedList);
                self.push_block(block);
            }
            ElementKind::Blockquote => {
                let quoted = flattened_lines(element)
                    .iter()
                    .map(|line| format!("> {}", line))
                    .collect::<Vec<_>>()
                    .join("\n");
                self.push_block(quoted);
            }
            ElementKind::Table => {
                let block = table(element);
                self.push_block(block);
            }
            ElementKind::Figure => self.figure(element),
            ElementKind::Admonition => {
                let block = admonition(element);
                self.push_block(block);
            }
            ElementKind::HorizontalRule => self.push_block("---".to_string()),
            ElementKind::Block => {
                self.walk_children(element);
                self.flush_inline();
            }
            ElementKind::Container => self.walk_children(element),
            ElementKind::Code
            | ElementKind::Link
            | ElementKind::Image
            | ElementKind::Bold
            | ElementKind::Italic
            | ElementKind::LineBreak => {
                let inline = self.inline_element(element, kind);
                self.inline.push_str(&inline);
            }
            ElementKind::Skip => {}
        }
    }

    /// Converts the children of an element to inline Markdown
    fn inline_children(&mut self, element: ElementRef<'_>, skip_lists: bool) -> String {
        let mut out = String::new();
        for child in element.children() {
            match child.value() {
                Node::Text(text) => out.push_str(&collapse_whitespace(text)),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        let kind = ElementKind::classify(child.value());
                        if skip_lists
                            && matches!(kind, ElementKind::UnorderedList | ElementKind::OrderedList)
                        {
                            continue;
                        }
                        let inline = self.inline_element(child, kind);
                        out.push_str(&inline);
                    }
                }
                _ => {}
            }
        }
        out
    }

    /// Converts one element in inline context
    fn inline_element(&mut self, element: ElementRef<'_>, kind: ElementKind) -> String {
        match kind {
            ElementKind::Code => {
                let text: String = element.text().collect();
                if text.is_empty() {
                    String::new()
                } else {
                    format!("`{}`", text)
                }
            }
            ElementKind::Bold => wrap_flattened(element, "**"),
            ElementKind::Italic => wrap_flattened(element, "*"),
            ElementKind::Link => self.link(element),
            ElementKind::Image => self.image(element),
            ElementKind::LineBreak => "\n".to_string(),
            ElementKind::Skip => String::new(),
            ElementKind::Container => self.inline_children(element, false),
            ElementKind::Heading(_)
            | ElementKind::Paragraph
            | ElementKind::Preformatted
            | ElementKind::UnorderedList
            | ElementKind::OrderedList
            | ElementKind::Blockquote
            | ElementKind::Table
            | ElementKind::Figure
            | ElementKind::Admonition
            | ElementKind::Block => format!(" {} ", self.inline_children(element, false)),
            ElementKind::HorizontalRule => " ".to_string(),
        }
    }

    fn link(&mut self, anchor: ElementRef<'_>) -> String {
        if is_permalink_anchor(anchor, self.profile) {
            return String::new();
        }

        if let Some(img) = first_descendant(anchor, "img") {
            return self.image(img);
        }

        let text = collapse_whitespace(&anchor.text().collect::<String>())
            .trim()
            .to_string();
        if is_pagination_or_icon(&text) {
            return String::new();
        }

        let href = anchor.value().attr("href").map(str::trim).unwrap_or("");
        if href.is_empty() || href.to_ascii_lowercase().starts_with("javascript:") {
            return text;
        }

        match self.page_url.join(href) {
            Ok(absolute) => format!("[{}]({})", text, absolute),
            Err(_) => text,
        }
    }

    fn image(&mut self, img: ElementRef<'_>) -> String {
        let value = img.value();
        let src = value
            .attr("src")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or_else(|| value.attr("data-src").map(str::trim))
            .unwrap_or("");
        let alt = collapse_whitespace(value.attr("alt").unwrap_or("")).trim().to_string();

        if src.is_empty() {
            return String::new();
        }

        if src.starts_with("data:") {
            return format!("![{}]({})", alt, src);
        }

        let mut absolute = match self.page_url.join(src) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => url,
            _ => return String::new(),
        };
        absolute.set_fragment(None);

        let local_path = image_local_path(&absolute);
        let reference = ImageReference {
            source_url: absolute.to_string(),
            local_path: local_path.clone(),
        };
        if !self.images.contains(&reference) {
            self.images.push(reference);
        }

        format!("![{}]({}{})", alt, self.image_prefix, local_path)
    }

    fn list(&mut self, list: ElementRef<'_>, ordered: bool) -> String {
        let start: usize = list
            .value()
            .attr("start")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(1);

        let items: Vec<String> = list
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|child| child.value().name() == "li")
            .map(|li| tidy_single_line(&self.inline_children(li, true)))
            .filter(|text| !text.is_empty())
            .collect();

        items
            .iter()
            .enumerate()
            .map(|(i, text)| {
                if ordered {
                    format!("{}. {}", start + i, text)
                } else {
                    format!("- {}", text)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn figure(&mut self, figure: ElementRef<'_>) {
        if let Some(img) = first_descendant(figure, "img") {
            let image = self.image(img);
            self.push_block(image);
        }

        if let Some(caption) = first_descendant(figure, "figcaption") {
            let text = tidy_single_line(&caption.text().collect::<String>());
            if !text.is_empty() {
                self.push_block(format!("*{}*", text));
            }
        }
    }
}

/// Replaces every whitespace run with a single space
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Squeezes spaces on every line and drops empty lines
fn tidy_lines(text: &str) -> String {
    text.split('\n')
        .map(tidy_single_line)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn tidy_single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn wrap_flattened(element: ElementRef<'_>, marker: &str) -> String {
    let text = tidy_single_line(&element.text().collect::<String>());
    if text.is_empty() {
        String::new()
    } else {
        format!("{}{}{}", marker, text, marker)
    }
}

/// Non-empty trimmed lines of an element's text
fn flattened_lines(element: ElementRef<'_>) -> Vec<String> {
    let text: String = element.text().collect();
    text.lines()
        .map(tidy_single_line)
        .filter(|line| !line.is_empty())
        .collect()
}

fn first_descendant<'a>(element: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    element
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|descendant| descendant.value().name() == name)
}

fn is_pagination_or_icon(text: &str) -> bool {
    if text.is_empty() || ICON_TEXTS.contains(&text) {
        return true;
    }

    if text.to_ascii_lowercase().contains("chevron") {
        return true;
    }

    // "Next" alone, or glued to the target title as in "NextGetting started"
    PAGINATION_WORDS.iter().any(|word| match text.strip_prefix(word) {
        Some("") => true,
        Some(rest) => rest.chars().next().map_or(false, char::is_uppercase),
        None => false,
    })
}

fn detect_language(pre: ElementRef<'_>, code: Option<ElementRef<'_>>) -> String {
    let parent = pre.parent().and_then(ElementRef::wrap);
    let candidates = code.into_iter().chain(Some(pre)).chain(parent);

    for element in candidates {
        for class in element.value().classes() {
            for prefix in LANGUAGE_PREFIXES {
                if let Some(lang) = class.strip_prefix(prefix) {
                    if !lang.is_empty() {
                        return lang.to_string();
                    }
                }
            }
        }
    }

    String::new()
}

fn code_block(pre: ElementRef<'_>) -> String {
    let code = first_descendant(pre, "code");
    let language = detect_language(pre, code);
    let text: String = code.unwrap_or(pre).text().collect();
    let text = text.trim_end_matches(&['\n', '\r'][..]);

    format!("```{}\n{}\n```", language, text)
}

fn escape_cell(text: &str) -> String {
    tidy_single_line(text).replace('|', "\\|")
}

fn table(table: ElementRef<'_>) -> String {
    let rows: Vec<Vec<String>> = table
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| element.value().name() == "tr")
        .map(|row| {
            row.children()
                .filter_map(ElementRef::wrap)
                .filter(|cell| matches!(cell.value().name(), "th" | "td"))
                .map(|cell| escape_cell(&cell.text().collect::<String>()))
                .collect::<Vec<_>>()
        })
        .filter(|cells| !cells.is_empty())
        .collect();

    let Some((header, body)) = rows.split_first() else {
        return String::new();
    };

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(format!("| {} |", header.join(" | ")));
    lines.push(format!("| {} |", vec!["---"; header.len()].join(" | ")));
    for row in body {
        lines.push(format!("| {} |", row.join(" | ")));
    }
    lines.join("\n")
}

fn is_admonition_title(element: ElementRef<'_>) -> bool {
    element.value().name() == "summary"
        || element
            .value()
            .classes()
            .any(|class| class == "admonition-title")
}

fn admonition(element: ElementRef<'_>) -> String {
    let children: Vec<ElementRef<'_>> = element.children().filter_map(ElementRef::wrap).collect();

    let title = children
        .iter()
        .find(|child| is_admonition_title(**child))
        .map(|child| tidy_single_line(&child.text().collect::<String>()))
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| admonition_type(element));

    let mut lines = vec![format!("> **{}**", title)];
    for child in children.iter().filter(|child| !is_admonition_title(**child)) {
        if ElementKind::classify(child.value()) == ElementKind::Skip {
            continue;
        }
        let text = tidy_single_line(&child.text().collect::<String>());
        if !text.is_empty() {
            lines.push(format!("> {}", text));
        }
    }

    lines.join("\n")
}

/// Derives a title such as "Warning" from the admonition's class list
fn admonition_type(element: ElementRef<'_>) -> String {
    if element.value().name() == "details" {
        return "Details".to_string();
    }

    element
        .value()
        .attr("class")
        .unwrap_or_default()
        .split_whitespace()
        .find(|class| *class != "admonition")
        .map(|class| {
            let mut chars = class.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .unwrap_or_else(|| "Note".to_string())
}
