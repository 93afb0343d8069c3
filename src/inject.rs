//! Marker-delimited replacement in the target HTML page.
//!
//! Everything strictly between [`START_MARKER`] and the first [`END_MARKER`]
//! after it is replaced on each run; the markers themselves and the rest of
//! the page are left byte-for-byte intact, so re-running only ever swaps the
//! card region.

use std::path::{Path, PathBuf};
use thiserror::Error;

pub const START_MARKER: &str = "<!-- PUBLICATIONS-START -->";
pub const END_MARKER: &str = "<!-- PUBLICATIONS-END -->";

#[derive(Error, Debug)]
pub enum InjectError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{path}: expected <!-- PUBLICATIONS-START --> followed by <!-- PUBLICATIONS-END -->")]
    MarkersNotFound { path: PathBuf },
}

/// Byte range of the replaceable region, if both markers are present in order.
fn region(html: &str) -> Option<(usize, usize)> {
    let start = html.find(START_MARKER)? + START_MARKER.len();
    let end = start + html[start..].find(END_MARKER)?;
    Some((start, end))
}

/// Replace the marker region with `"\n" + cards + "\n"`.
///
/// Returns `None` when the markers are missing or out of order.
pub fn splice_region(html: &str, cards: &str) -> Option<String> {
    let (start, end) = region(html)?;
    let mut out = String::with_capacity(html.len() + cards.len());
    out.push_str(&html[..start]);
    out.push('\n');
    out.push_str(cards);
    out.push('\n');
    out.push_str(&html[end..]);
    Some(out)
}

/// Fail early if `html_path` cannot take an injection.
pub fn check_markers(html_path: &Path) -> Result<(), InjectError> {
    let html = std::fs::read_to_string(html_path)?;
    region(&html)
        .map(|_| ())
        .ok_or_else(|| InjectError::MarkersNotFound {
            path: html_path.to_path_buf(),
        })
}

/// Rewrite `html_path` with `cards` between the markers.
///
/// The file is not written at all when the markers are missing.
pub fn inject_cards(html_path: &Path, cards: &str) -> Result<(), InjectError> {
    let html = std::fs::read_to_string(html_path)?;
    let updated = splice_region(&html, cards).ok_or_else(|| InjectError::MarkersNotFound {
        path: html_path.to_path_buf(),
    })?;
    std::fs::write(html_path, updated)?;
    log::debug!("wrote card region to {}", html_path.display());
    Ok(())
}
