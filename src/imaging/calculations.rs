//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// A crop rectangle in source pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Largest centered rectangle of `source` with the aspect ratio of `target`.
///
/// Sources wider than the target lose columns on the left and right; taller
/// sources lose rows on the top and bottom. Extents use integer floor
/// division, so an odd surplus leaves the extra pixel on the right/bottom.
///
/// ```
/// # use paper_gallery::imaging::{calculate_center_crop, CropRect};
/// // 1000x500 into 4:3 → keep the middle 666 columns
/// assert_eq!(
///     calculate_center_crop((1000, 500), (640, 480)),
///     CropRect { x: 167, y: 0, width: 666, height: 500 }
/// );
/// ```
pub fn calculate_center_crop(source: (u32, u32), target: (u32, u32)) -> CropRect {
    let (src_w, src_h) = (source.0 as u64, source.1 as u64);
    let (tgt_w, tgt_h) = (target.0 as u64, target.1 as u64);

    if src_w * tgt_h > src_h * tgt_w {
        // Wider than target: full height, trim the sides
        let width = (src_h * tgt_w / tgt_h).max(1);
        CropRect {
            x: ((src_w - width) / 2) as u32,
            y: 0,
            width: width as u32,
            height: src_h as u32,
        }
    } else {
        // Taller than (or equal to) target: full width, trim top and bottom
        let height = (src_w * tgt_h / tgt_w).max(1);
        CropRect {
            x: 0,
            y: ((src_h - height) / 2) as u32,
            width: src_w as u32,
            height: height as u32,
        }
    }
}
