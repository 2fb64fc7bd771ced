use dom_smoothie::{Config, Readability};
use reqwest::Client;
use scraper::{ElementRef, Html, Node, Selector};
use once_cell::sync::Lazy;
use tracing::debug;
use crate::error::{AppError, Result};

// Candidate content roots, most specific first
static ROOT_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["article", "main", "[role=main]", "body"]
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .collect()
});

static BLOCK_SELECTOR: Lazy<Option<Selector>> = Lazy::new(|| {
    Selector::parse("h1, h2, h3, h4, h5, h6, p, li, blockquote, pre, td, th").ok()
});

const BLOCK_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "li", "blockquote", "pre", "td", "th",
];

const BOILERPLATE_TAGS: &[&str] = &[
    "nav", "header", "footer", "aside", "script", "style", "noscript", "template", "svg",
];

pub async fn fetch_html(client: &Client, url: &str) -> Result<String> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(AppError::FetchError(format!("{} returned status {}", url, status)));
    }
    let html = response.text().await?;
    debug!(url, bytes = html.len(), "fetched page");
    Ok(html)
}

/// Extracts the readable main content of a page.
///
/// Readability runs first; when it finds nothing, the page is walked for
/// block elements instead. Returns an empty string when nothing readable
/// is left.
pub fn extract_main_text(html: &str, url: Option<&str>) -> String {
    if let Some(text) = readability_text(html, url) {
        return text;
    }
    debug!(url, "readability found no article, walking blocks");
    extract_blocks(html)
}

fn readability_text(html: &str, url: Option<&str>) -> Option<String> {
    let cfg = Config {
        max_elements_to_parse: 9000,
        ..Default::default()
    };

    let mut readability = Readability::new(html, url, Some(cfg)).ok()?;
    let article = readability.parse().ok()?;
    let text = format_lines(&article.text_content);
    (!text.is_empty()).then_some(text)
}

// Trimmed non-empty lines, inner whitespace collapsed
fn format_lines(text: &str) -> String {
    text.lines()
        .map(normalize_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Outermost block elements under the content root, one per line.
/// Navigation, headers, footers, scripts and similar chrome are skipped.
pub fn extract_blocks(html: &str) -> String {
    let document = Html::parse_document(html);

    let root = ROOT_SELECTORS
        .iter()
        .find_map(|selector| document.select(selector).next())
        .unwrap_or_else(|| document.root_element());

    let mut blocks = Vec::new();
    if let Some(block_selector) = BLOCK_SELECTOR.as_ref() {
        for element in root.select(block_selector) {
            if has_ancestor_in(element, root, BOILERPLATE_TAGS)
                || has_ancestor_in(element, root, BLOCK_TAGS)
            {
                continue;
            }
            let text = normalize_whitespace(&visible_text(element));
            if !text.is_empty() {
                blocks.push(text);
            }
        }
    }

    if blocks.is_empty() {
        return normalize_whitespace(&visible_text(root));
    }

    blocks.join("\n")
}

// Only ancestors below `root` count
fn has_ancestor_in(element: ElementRef<'_>, root: ElementRef<'_>, tags: &[&str]) -> bool {
    element
        .ancestors()
        .take_while(|ancestor| ancestor.id() != root.id())
        .filter_map(ElementRef::wrap)
        .any(|ancestor| tags.contains(&ancestor.value().name()))
}

// Text nodes under `element`, skipping anything inside boilerplate tags
fn visible_text(element: ElementRef<'_>) -> String {
    let mut result = String::new();
    for node in element.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .take_while(|ancestor| ancestor.id() != element.id())
            .filter_map(ElementRef::wrap)
            .any(|ancestor| BOILERPLATE_TAGS.contains(&ancestor.value().name()));
        if !hidden {
            result.push_str(text);
            result.push(' ');
        }
    }
    result
}

pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
