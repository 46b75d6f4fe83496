//! Output normalization and document assembly

/// Most consecutive blank lines allowed in a document
const MAX_BLANK_RUN: usize = 2;

/// Normalizes converted Markdown
///
/// Guarantees for every output:
/// - no trailing whitespace on any line
/// - no run of more than two consecutive blank lines
/// - no leading or trailing blank lines
pub fn postprocess(markdown: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut blank_run = 0;

    for line in markdown.lines().map(str::trim_end) {
        if line.is_empty() {
            blank_run += 1;
            if blank_run > MAX_BLANK_RUN || lines.is_empty() {
                continue;
            }
        } else {
            blank_run = 0;
        }
        lines.push(line);
    }

    while lines.last().map_or(false, |line| line.is_empty()) {
        lines.pop();
    }

    lines.join("\n")
}

/// Prepends `# title` unless the body already opens with that heading
pub fn compose_document(title: Option<&str>, body: &str) -> String {
    match title {
        Some(title) if !title.is_empty() => {
            let heading = format!("# {}", title);
            if body.lines().next().map(str::trim_end) == Some(heading.as_str()) {
                body.to_string()
            } else if body.is_empty() {
                heading
            } else {
                format!("{}\n\n{}", heading, body)
            }
        }
        _ => body.to_string(),
    }
}

/// Returns true if the document has less than `min_chars` of content after its title line
pub fn is_stub(markdown: &str, min_chars: usize) -> bool {
    let trimmed = markdown.trim_start();
    let rest = if trimmed.starts_with("# ") {
        trimmed.split_once('\n').map_or("", |(_, rest)| rest)
    } else {
        trimmed
    };
    rest.trim().chars().count() < min_chars
}
