//! Selector-based text extraction.
//!
//! Turns raw HTML into a [`ScrapedContent`] record.
//!
//! ### Algorithm
//! - Parse into a DOM tree and detach every `script`, `style`, `noscript`
//!   and `iframe` subtree.
//! - Pull title, meta description, `h1`, `h2`, `article`, `main`,
//!   `*content*` class/id elements, `p` and `li` text.
//! - Join those regions in that order, normalize whitespace, cap at
//!   [`MAX_CONTENT_CHARS`].
//!
//! Regions overlap (a `p` inside an `article` is counted twice); the
//! combined text is a bag of words for prompting, not a rendering.
//!
//! ### Stable Abstraction
//! - Uses the `Extractor` trait so the engine can be swapped without
//!   touching the orchestrator.

pub mod normalize;

pub use normalize::{normalize_whitespace, truncate_chars};

use linkpeek_core::{Error, Headings, MAX_CONTENT_CHARS, ScrapedContent};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

/// Tags whose subtrees never contribute text.
const NOISE_TAGS: &str = "script, style, noscript, iframe";

static NOISE: LazyLock<Selector> = LazyLock::new(|| selector(NOISE_TAGS));
static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static META_DESCRIPTION: LazyLock<Selector> = LazyLock::new(|| selector(r#"meta[name="description"]"#));
static H1: LazyLock<Selector> = LazyLock::new(|| selector("h1"));
static H2: LazyLock<Selector> = LazyLock::new(|| selector("h2"));
static ARTICLE: LazyLock<Selector> = LazyLock::new(|| selector("article"));
static MAIN: LazyLock<Selector> = LazyLock::new(|| selector("main"));
static CONTENT_BLOCK: LazyLock<Selector> = LazyLock::new(|| selector(r#"[class*="content"], [id*="content"]"#));
static PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| selector("p"));
static LIST_ITEM: LazyLock<Selector> = LazyLock::new(|| selector("li"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("invalid selector")
}

/// Stable extractor trait for content extraction.
pub trait Extractor: Send + Sync {
    /// Build a record for `url` from its HTML.
    ///
    /// Missing elements produce empty fields, not errors.
    fn extract(&self, html: &str, url: &str) -> Result<ScrapedContent, Error>;
}

/// Extractor driven by fixed CSS selectors over a `scraper` DOM.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectorExtractor;

impl SelectorExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for SelectorExtractor {
    fn extract(&self, html: &str, url: &str) -> Result<ScrapedContent, Error> {
        let mut document = Html::parse_document(html);
        strip_noise(&mut document);
        let root = document.root_element();

        let title = root.select(&TITLE).next().map(element_text).unwrap_or_default();
        let meta_description = root
            .select(&META_DESCRIPTION)
            .next()
            .and_then(|el| el.value().attr("content"))
            .unwrap_or_default()
            .to_string();
        let h1 = joined_text(root, &H1);
        let h2 = joined_text(root, &H2);

        let combined = [
            title.clone(),
            meta_description.clone(),
            h1.clone(),
            h2.clone(),
            joined_text(root, &ARTICLE),
            joined_text(root, &MAIN),
            joined_text(root, &CONTENT_BLOCK),
            joined_text(root, &PARAGRAPH),
            joined_text(root, &LIST_ITEM),
        ]
        .join(" ");

        let content = truncate_chars(&normalize_whitespace(&combined), MAX_CONTENT_CHARS);

        Ok(ScrapedContent {
            url: url.to_string(),
            title: normalize_whitespace(&title),
            headings: Headings { h1: normalize_whitespace(&h1), h2: normalize_whitespace(&h2) },
            meta_description: normalize_whitespace(&meta_description),
            content,
            error: None,
            cached_at: None,
        })
    }
}

/// Detach every noise subtree.
///
/// `Html::select` still visits detached nodes, so every later lookup goes
/// through `root_element()`, which only walks the attached tree.
fn strip_noise(document: &mut Html) {
    let ids: Vec<_> = document.select(&NOISE).map(|el| el.id()).collect();
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// All descendant text of one element, concatenated as-is.
fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Text of every match under `root`, one space between elements.
fn joined_text(root: ElementRef<'_>, selector: &Selector) -> String {
    root.select(selector)
        .map(element_text)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extract a record using the default extractor.
pub fn extract_page(html: &str, url: &str) -> Result<ScrapedContent, Error> {
    SelectorExtractor::new().extract(html, url)
}
