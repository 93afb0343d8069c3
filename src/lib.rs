//! # Paper Gallery
//!
//! Turns a bibliography export into a gallery of publication cards inside an
//! existing HTML page. Each entry gets a cover image at a stable filename, a
//! normalized card-sized derivative, and a card with title, authors, venue and
//! a link; the cards replace whatever sits between two comment markers in the
//! page.
//!
//! # Architecture: One Pass, Four Steps
//!
//! ```text
//! scholar.bib ─→ entries ─→ images ─→ cards ─→ index.html
//!   (load)       (sort)    (resolve)  (render)  (inject)
//! ```
//!
//! Loading and marker validation run first and are fatal. Image work is never
//! fatal: anything that goes wrong while finding, fetching or normalizing a
//! cover ends with the card pointing at the placeholder image.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`bibliography`] | Parses BibTeX/BibLaTeX into flat [`bibliography::Entry`] values |
//! | [`format`] | Pure formatters: author lists, link selection, image filenames |
//! | [`resolve`] | Per-entry image policy: existing → fetched → placeholder, then normalize |
//! | [`fetch`] | Remote cover scraping from an entry's landing page |
//! | [`imaging`] | Pure-Rust crop, resize and JPEG encoding behind a backend trait |
//! | [`cache`] | Modification-time freshness checks and run statistics |
//! | [`render`] | Card markup with Maud, plus card ordering |
//! | [`inject`] | Marker-delimited replacement in the target page |
//! | [`pipeline`] | Wires the steps together for `build`, `scan` and `check` |
//! | [`config`] | `gallery.toml` loading, merging over stock defaults, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Stable Filenames Over Entry Keys
//!
//! Images are named `<year>_<Surname>_<TitleSlug>.jpg` rather than by citation
//! key. Keys in exported bibliographies change whenever the exporter feels like
//! it; year, first author and title rarely do. A curated cover dropped into the
//! originals directory under that name is picked up on the next run and never
//! overwritten.
//!
//! ## Originals and Derivatives
//!
//! Originals are whatever the user (or the fetcher) put there, in any format
//! the `image` crate reads. Derivatives are always center-cropped JPEGs of one
//! configured size, regenerated only when older than their original, so a
//! rebuild with nothing changed encodes nothing.
//!
//! ## Maud For Cards
//!
//! Card HTML is built with [Maud](https://maud.lambda.xyz/). Bibliography
//! fields are arbitrary text and end up in attributes as well as element
//! bodies; Maud escapes every interpolation, so a title containing `<` or `"`
//! cannot break the page.

pub mod bibliography;
pub mod cache;
pub mod config;
pub mod fetch;
pub mod format;
pub mod imaging;
pub mod inject;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod resolve;

#[cfg(test)]
pub(crate) mod test_helpers;
