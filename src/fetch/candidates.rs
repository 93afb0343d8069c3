//! Cover candidate extraction from landing-page HTML.
//!
//! Pages are parsed with `scraper` (html5ever underneath), so attribute
//! values arrive entity-decoded and quoting quirks are handled by a real
//! tokenizer. Only `<img>` and `<base>` elements are looked at.

use crate::config::FetchConfig;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

static IMG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img[src], img[data-src]").expect("valid selector"));
static BASE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("base[href]").expect("valid selector"));

/// One `<img>` tag as found on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImgTag {
    pub src: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// `"300"` and `"300px"` parse; percentages and other units don't.
fn parse_dimension(raw: &str) -> Option<u32> {
    raw.trim()
        .trim_end_matches("px")
        .trim()
        .parse()
        .ok()
}

fn attr<'a>(element: &ElementRef<'a>, name: &str) -> Option<&'a str> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn img_tag(element: ElementRef<'_>) -> Option<ImgTag> {
    let src = attr(&element, "src").or_else(|| attr(&element, "data-src"))?;
    Some(ImgTag {
        src: src.to_string(),
        width: attr(&element, "width").and_then(parse_dimension),
        height: attr(&element, "height").and_then(parse_dimension),
    })
}

fn img_tags(document: &Html) -> Vec<ImgTag> {
    document.select(&IMG_SELECTOR).filter_map(img_tag).collect()
}

fn base_href(document: &Html) -> Option<String> {
    document
        .select(&BASE_SELECTOR)
        .find_map(|element| attr(&element, "href"))
        .map(str::to_string)
}

/// All `<img>` tags with a usable source attribute, in document order.
pub fn collect_img_tags(html: &str) -> Vec<ImgTag> {
    img_tags(&Html::parse_document(html))
}

/// The page's `<base href>`, if any.
pub fn collect_base_href(html: &str) -> Option<String> {
    base_href(&Html::parse_document(html))
}

/// Both dimensions declared and both under the threshold.
fn is_too_small(tag: &ImgTag, min_dimension: u32) -> bool {
    matches!((tag.width, tag.height), (Some(w), Some(h)) if w < min_dimension && h < min_dimension)
}

/// Matched against the `src` value as written, so the page's own host never
/// trips the denylist for relative sources.
fn is_denied(src: &str, denylist: &[String]) -> bool {
    let src = src.to_ascii_lowercase();
    denylist
        .iter()
        .any(|needle| src.contains(&needle.to_ascii_lowercase()))
}

/// Absolute candidate URLs worth trying, deduplicated, in document order.
pub fn collect_candidates(html: &str, page_url: &Url, config: &FetchConfig) -> Vec<Url> {
    let document = Html::parse_document(html);
    let base = base_href(&document)
        .and_then(|href| page_url.join(&href).ok())
        .unwrap_or_else(|| page_url.clone());

    let mut seen = Vec::new();
    for tag in img_tags(&document) {
        if tag.src.starts_with("data:") {
            continue;
        }
        if is_too_small(&tag, config.min_dimension) || is_denied(&tag.src, &config.denylist) {
            continue;
        }
        let Ok(url) = base.join(&tag.src) else {
            continue;
        };
        if !matches!(url.scheme(), "http" | "https") {
            continue;
        }
        if !seen.contains(&url) {
            seen.push(url);
        }
    }
    seen
}
