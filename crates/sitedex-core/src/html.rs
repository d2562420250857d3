//! HTML to plain text helpers.
//!
//! Parsing is delegated to `scraper`. `scraper::Html` is `!Send`, so every
//! helper here is synchronous and returns owned strings; nothing holds a
//! parsed document across an `.await`.

use scraper::{ElementRef, Html, Node, Selector};

/// Elements whose text never counts as page content
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Elements that start a new line of text when rendered
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main",
    "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Extract the page title: `<title>` first, then the first `<h1>`.
pub fn page_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    ["title", "h1"].iter().find_map(|tag| {
        let selector = Selector::parse(tag).ok()?;
        document
            .select(&selector)
            .next()
            .map(|el| collapse_whitespace(&element_text(el)))
            .filter(|title| !title.is_empty())
    })
}

/// Extract the visible body text of a page with whitespace collapsed.
///
/// Documents without a `<body>` fall back to the text of the whole tree.
pub fn page_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let body = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next());
    let raw = body.map_or_else(|| element_text(document.root_element()), element_text);
    collapse_whitespace(&raw)
}

/// Collapse every whitespace run to a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max_chars` characters, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    push_text(element, &mut out);
    out
}

/// Text nodes are joined as-is, like `textContent`; only block boundaries
/// add a separator, so inline markup never splits a word.
fn push_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        let Some(child_el) = ElementRef::wrap(child) else {
            if let Node::Text(text) = child.value() {
                out.push_str(text);
            }
            continue;
        };
        let name = child_el.value().name();
        if SKIPPED_ELEMENTS.contains(&name) {
            continue;
        }
        let block = BLOCK_ELEMENTS.contains(&name);
        if block {
            out.push(' ');
        }
        push_text(child_el, out);
        if block {
            out.push(' ');
        }
    }
}
