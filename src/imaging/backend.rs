//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the one operation the pipeline needs:
//! normalize a source into a card-sized JPEG. The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend); tests use a recording
//! mock so resolver and cache logic can be checked without encoding pixels.

use super::params::NormalizeParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Trait for image processing backends.
pub trait ImageBackend {
    /// Center-crop, resize, and write a JPEG as described by `params`.
    fn normalize(&self, params: &NormalizeParams) -> Result<(), BackendError>;
}
