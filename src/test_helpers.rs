//! Shared test utilities for the paper-gallery test suite.
//!
//! Image fixtures, timestamp manipulation, and a small site layout
//! (bibliography + marker page) that pipeline tests can mutate freely.

use image::{ImageEncoder, RgbImage};
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

pub const MARKED_PAGE: &str = "<html>\n<body>\n  <section class=\"gallery\">\n    <!-- PUBLICATIONS-START -->\n    <p>stale</p>\n    <!-- PUBLICATIONS-END -->\n  </section>\n</body>\n</html>\n";

pub const ONE_ENTRY_BIB: &str = r#"
@article{smith2021foo,
  title={Foo Bar},
  author={Smith, John and Doe, Jane},
  year={2021}
}
"#;

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Create a small valid JPEG file with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let img = gradient(width, height);
    let file = fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Create a small valid PNG file with the given dimensions.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    let img = gradient(width, height);
    let file = fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::png::PngEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Shift a file's modification time by `seconds` relative to now.
pub fn set_mtime_offset(path: &Path, seconds: i64) {
    let now = SystemTime::now();
    let offset = Duration::from_secs(seconds.unsigned_abs());
    let time = if seconds < 0 { now - offset } else { now + offset };
    fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

/// A temp site with `scholar.bib` and `index.html`, no images.
pub fn setup_site(bib: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("scholar.bib"), bib).unwrap();
    fs::write(tmp.path().join("index.html"), MARKED_PAGE).unwrap();
    tmp
}

/// Text strictly between the publication markers.
pub fn marker_region(html: &str) -> &str {
    let start = html.find(crate::inject::START_MARKER).expect("start marker")
        + crate::inject::START_MARKER.len();
    let end = html.find(crate::inject::END_MARKER).expect("end marker");
    &html[start..end]
}
