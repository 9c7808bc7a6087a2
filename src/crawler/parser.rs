//! HTML extractor for page links and asset references
//!
//! This module handles parsing HTML content to extract:
//! - Page links (from `<a href>` elements)
//! - Asset references (from the `src` attribute of any element)

use crate::url::canonicalize_url;
use scraper::{Html, Selector};
use url::Url;

/// Absolute URLs found in a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    /// Page links, in document order
    pub links: Vec<Url>,

    /// Asset references, in document order
    pub assets: Vec<Url>,
}

/// Parses HTML content and extracts page links and asset references
///
/// # Extraction Rules
///
/// **Links:** `<a href="...">`
///
/// **Assets:** `src="..."` on any element (`img`, `script`, `iframe`, `source`, ...)
///
/// Relative references resolve against the document's `<base href>` when it has
/// one, otherwise against `base_url`. Fragments are stripped.
///
/// **Dropped silently:**
/// - Empty and fragment-only references
/// - `javascript:`, `mailto:`, `tel:` and `data:` references
/// - References that fail to resolve or resolve to a non-HTTP(S) URL
///
/// # Example
///
/// ```
/// use site_sweep::crawler::extract;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/about">About</a><img src="/img.png"></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let extracted = extract(html, &base_url);
/// assert_eq!(extracted.links[0].as_str(), "https://example.com/about");
/// assert_eq!(extracted.assets[0].as_str(), "https://example.com/img.png");
/// ```
pub fn extract(html: &str, base_url: &Url) -> Extracted {
    let document = Html::parse_document(html);
    let base = document_base(&document, base_url);

    Extracted {
        links: collect_attr(&document, "a[href]", "href", &base),
        assets: collect_attr(&document, "[src]", "src", &base),
    }
}

/// Returns the base URL declared by `<base href>`, or `fallback`
fn document_base(document: &Html, fallback: &Url) -> Url {
    let Ok(selector) = Selector::parse("base[href]") else {
        return fallback.clone();
    };

    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("href"))
        .and_then(|href| fallback.join(href.trim()).ok())
        .unwrap_or_else(|| fallback.clone())
}

/// Collects resolved values of `attr` from every element matching `selector`
fn collect_attr(document: &Html, selector: &str, attr: &str, base: &Url) -> Vec<Url> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr(attr))
        .filter_map(|value| resolve_reference(value, base))
        .collect()
}

/// Resolves a reference to an absolute, canonical URL
///
/// Returns None if the reference should be dropped.
fn resolve_reference(reference: &str, base_url: &Url) -> Option<Url> {
    let reference = reference.trim();

    if reference.is_empty() || reference.starts_with('#') {
        return None;
    }

    let lower = reference.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let absolute = base_url.join(reference).ok()?;
    canonicalize_url(absolute).ok()
}
