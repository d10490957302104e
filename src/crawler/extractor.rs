//! HTML extraction of link and image references
//!
//! The coordinator only sees the [`Extractor`] trait, so the HTML parser can
//! be swapped or faked in tests. [`HtmlExtractor`] is the `scraper`-backed
//! default.

use scraper::{Html, Selector};
use url::Url;

/// Raw references found on one page, in document order
///
/// Values are the attribute text exactly as written in the HTML; resolution
/// against the page URL happens in the coordinator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedRefs {
    /// One entry per `<a href=...>`
    pub links: Vec<String>,

    /// One entry per `<img src=...>`
    pub images: Vec<String>,
}

impl ExtractedRefs {
    /// Link references in document order
    pub fn links(&self) -> impl Iterator<Item = &str> {
        self.links.iter().map(String::as_str)
    }

    /// Image references in document order
    pub fn images(&self) -> impl Iterator<Item = &str> {
        self.images.iter().map(String::as_str)
    }

    /// Returns true if the page yielded no references at all
    pub fn is_empty(&self) -> bool {
        self.links.is_empty() && self.images.is_empty()
    }
}

/// Pulls link and image references out of a fetched page
///
/// Implementations must not fail: a body that cannot be understood yields
/// an empty [`ExtractedRefs`] so one bad page never aborts the crawl.
pub trait Extractor: Send + Sync {
    /// Extracts references from `html`, which was fetched from `base_url`
    fn extract(&self, html: &[u8], base_url: &Url) -> ExtractedRefs;
}

/// Default extractor built on `scraper`
///
/// Invalid UTF-8 is replaced rather than rejected, and html5ever's error
/// recovery means broken markup still produces whatever anchors and images
/// it can find.
///
/// # Example
///
/// ```
/// use sumi_harvest::crawler::{Extractor, HtmlExtractor};
/// use url::Url;
///
/// let html = br#"<a href="/about">About</a><img src="/logo.png">"#;
/// let base = Url::parse("http://example.test/").unwrap();
/// let refs = HtmlExtractor.extract(html, &base);
/// assert_eq!(refs.links, vec!["/about"]);
/// assert_eq!(refs.images, vec!["/logo.png"]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlExtractor;

impl Extractor for HtmlExtractor {
    fn extract(&self, html: &[u8], base_url: &Url) -> ExtractedRefs {
        let text = String::from_utf8_lossy(html);
        let document = Html::parse_document(&text);

        let refs = ExtractedRefs {
            links: collect_attr(&document, "a[href]", "href"),
            images: collect_attr(&document, "img[src]", "src"),
        };

        tracing::trace!(
            "Extracted {} links and {} images from {}",
            refs.links.len(),
            refs.images.len(),
            base_url
        );

        refs
    }
}

/// Collects one attribute from every element matching `selector`
fn collect_attr(document: &Html, selector: &str, attr: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr(attr))
        .map(str::to_string)
        .collect()
}
