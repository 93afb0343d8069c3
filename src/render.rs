//! HTML card rendering.
//!
//! One `<article class="gallery-item">` per entry, built with maud so every
//! field value is escaped. Cards carry no layout of their own; the host page
//! styles `.gallery-item`, `.gallery-image` and `.gallery-link`.
//!
//! ```html
//! <a href="…" target="_blank" rel="noopener noreferrer" class="gallery-link">
//!   <article class="gallery-item">
//!     <img loading="lazy" src="img/papers/cards/2021_Smith_FooBar.jpg" …>
//!     <p>Foo Bar</p>
//!     <p>Smith, John, Doe, Jane</p>
//!     <p>Journal of Foo 2021</p>
//!   </article>
//! </a>
//! ```

use crate::bibliography::Entry;
use crate::config::{GalleryConfig, LinkStyle, SortOrder};
use crate::format::{format_authors, resolve_url};
use maud::{Markup, html};
use std::path::Path;

/// Year used for ordering when an entry has none.
const MISSING_YEAR: &str = "0000";

/// Everything a card displays, already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub title: String,
    pub authors: String,
    pub venue: String,
    pub year: String,
    pub image_src: String,
    pub placeholder_src: String,
    pub link: Option<String>,
    pub link_style: LinkStyle,
}

pub fn card_view(entry: &Entry, image_src: &Path, config: &GalleryConfig) -> CardView {
    CardView {
        title: entry.title().unwrap_or_default().to_string(),
        authors: entry
            .authors()
            .map(|a| format_authors(a, config.authors.max_listed))
            .unwrap_or_default(),
        venue: entry.venue().unwrap_or_default().to_string(),
        year: entry.year().unwrap_or_default().to_string(),
        image_src: web_path(image_src),
        placeholder_src: web_path(Path::new(&config.paths.placeholder)),
        link: resolve_url(entry, &config.links),
        link_style: config.cards.link_style,
    }
}

/// Forward slashes regardless of platform.
fn web_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn card_body(view: &CardView) -> Markup {
    let alt = format!("{} cover image", view.title);
    let fallback = format!("this.onerror=null;this.src='{}';", view.placeholder_src);
    html! {
        img loading="lazy"
            src=(view.image_src)
            alt=(alt)
            class="gallery-image"
            onerror=(fallback);
        p { (view.title) }
        p { (view.authors) }
        p { (view.venue) " " (view.year) }
    }
}

pub fn render_card(view: &CardView) -> String {
    let markup = match (&view.link, view.link_style) {
        (Some(href), LinkStyle::Wrap) => html! {
            a href=(href) target="_blank" rel="noopener noreferrer" class="gallery-link" {
                article class="gallery-item" { (card_body(view)) }
            }
        },
        (Some(href), LinkStyle::Button) => html! {
            article class="gallery-item" {
                (card_body(view))
                p {
                    a href=(href) target="_blank" rel="noopener noreferrer" class="gallery-link" {
                        "View paper"
                    }
                }
            }
        },
        (None, _) => html! {
            article class="gallery-item" { (card_body(view)) }
        },
    };
    markup.into_string()
}

/// Cards joined with newlines, in the order given.
pub fn render_cards(views: &[CardView]) -> String {
    views.iter().map(render_card).collect::<Vec<_>>().join("\n")
}

/// Order entries by `(year, title)`. Stable, so ties keep file order.
pub fn sort_entries(entries: &mut [Entry], order: SortOrder) {
    fn key(entry: &Entry) -> (&str, &str) {
        (
            entry.year().unwrap_or(MISSING_YEAR),
            entry.title().unwrap_or_default(),
        )
    }
    match order {
        SortOrder::NewestFirst => entries.sort_by(|a, b| key(b).cmp(&key(a))),
        SortOrder::OldestFirst => entries.sort_by(|a, b| key(a).cmp(&key(b))),
    }
}
