//! Pure Rust image processing backend built on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, TIFF, WebP) | `image::ImageReader` with content sniffing |
//! | Color model | `DynamicImage::to_rgb8` |
//! | Crop | `DynamicImage::crop_imm` with [`calculate_center_crop`] |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//!
//! Formats are sniffed from file content rather than the extension: fetched
//! covers are always stored as `.jpg` but may really be PNG or WebP.
//!
//! Cards are encoded into a temp file in the destination directory and
//! renamed over the destination, so an interrupted run never leaves a
//! truncated JPEG that the mtime cache would then treat as fresh.

use super::backend::{BackendError, ImageBackend};
use super::calculations::calculate_center_crop;
use super::params::NormalizeParams;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Encode as baseline JPEG and atomically move it to `path`.
fn save_jpeg(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(".paper-gallery-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        let encoder = JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100) as u8);
        img.write_with_encoder(encoder)
            .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))?;
        writer.flush()?;
    }
    // the temp file is removed on drop if the rename fails
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

impl ImageBackend for RustBackend {
    fn normalize(&self, params: &NormalizeParams) -> Result<(), BackendError> {
        let img = DynamicImage::ImageRgb8(load_image(&params.source)?.to_rgb8());
        let crop = calculate_center_crop(
            (img.width(), img.height()),
            (params.width, params.height),
        );
        let resized = img
            .crop_imm(crop.x, crop.y, crop.width, crop.height)
            .resize_exact(params.width, params.height, FilterType::Lanczos3);
        save_jpeg(&resized, &params.output, params.quality.value())
    }
}
