//! High-level image operations.
//!
//! Combines the freshness check from [`cache`](crate::cache) with backend
//! execution. The backend is only invoked when the derivative is missing or
//! older than its source.

use super::backend::{BackendError, ImageBackend};
use super::params::{NormalizeParams, Quality};
use crate::cache::is_fresh;
use crate::config::ImagesConfig;
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Target size and encoding for normalized card images.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizeConfig {
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
}

impl NormalizeConfig {
    pub fn from_images_config(config: &ImagesConfig) -> Self {
        Self {
            width: config.size[0],
            height: config.size[1],
            quality: Quality::new(config.quality),
        }
    }
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self::from_images_config(&ImagesConfig::default())
    }
}

/// What [`normalize_image`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeOutcome {
    /// Derivative was already up to date; nothing was written.
    Fresh,
    /// Derivative was (re)encoded.
    Written,
}

/// Plan a normalize operation without executing it.
pub fn plan_normalize(source: &Path, dest: &Path, config: &NormalizeConfig) -> NormalizeParams {
    NormalizeParams {
        source: source.to_path_buf(),
        output: dest.to_path_buf(),
        width: config.width,
        height: config.height,
        quality: config.quality,
    }
}

/// Produce `dest` from `source` unless `dest` is already fresh.
///
/// With `use_cache = false` the freshness check is skipped. The destination
/// directory is created on demand.
pub fn normalize_image(
    backend: &impl ImageBackend,
    source: &Path,
    dest: &Path,
    config: &NormalizeConfig,
    use_cache: bool,
) -> Result<NormalizeOutcome> {
    if use_cache && is_fresh(source, dest) {
        log::debug!("{} is fresh, skipping", dest.display());
        return Ok(NormalizeOutcome::Fresh);
    }
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    log::info!("normalizing {} -> {}", source.display(), dest.display());
    backend.normalize(&plan_normalize(source, dest, config))?;
    Ok(NormalizeOutcome::Written)
}
