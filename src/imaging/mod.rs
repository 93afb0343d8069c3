//! Image processing — pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Normalize** | center crop + `resize_exact` (Lanczos3) → JPEG |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for crop math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Cache-aware functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use calculations::{CropRect, calculate_center_crop};
pub use operations::{NormalizeConfig, NormalizeOutcome, normalize_image};
pub use params::{NormalizeParams, Quality};
pub use rust_backend::RustBackend;
