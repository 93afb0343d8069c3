//! Per-entry image resolution.
//!
//! Turns an [`Entry`] into an image path the card can reference, creating or
//! refreshing files on the way. Paths in and out of this module are relative
//! to the site root (the directory holding the target HTML page), which is
//! exactly what ends up in `src` attributes.
//!
//! ## Policy
//!
//! ```text
//! original = <originals>/<filename_for(entry)>
//! cached   = <normalized>/<same filename>
//!
//! original missing?
//!   strategy = fetch and a landing page is known → try CoverSource
//!   still missing → copy placeholder (placeholder missing → give up)
//! normalize original → cached (skipped when cached is fresh)
//! return cached
//! ```
//!
//! [`ImageResolver::resolve`] never fails. Every error is logged and mapped
//! to the placeholder path so rendering can always proceed; the
//! [`ImageOutcome::Fallback`] variant carries the reason for reports and
//! tests.

use crate::bibliography::Entry;
use crate::config::{GalleryConfig, ImageStrategy};
use crate::fetch::CoverSource;
use crate::format::{LinkKind, filename_for, resolve_link};
use crate::imaging::{
    BackendError, ImageBackend, NormalizeConfig, NormalizeOutcome, normalize_image,
};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("placeholder image not found: {0}")]
    PlaceholderMissing(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image processing failed: {0}")]
    Backend(#[from] BackendError),
}

/// Site-relative locations derived from an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePaths {
    /// Stable, user-curatable source image.
    pub original: PathBuf,
    /// Normalized derivative referenced by the card.
    pub cached: PathBuf,
}

/// How the original image came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginalSource {
    /// Already on disk (curated, or left over from an earlier run).
    Existing,
    /// Downloaded from the entry's landing page.
    Fetched,
    /// Copied from the placeholder.
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    /// Derivative was up to date.
    Cached { original: OriginalSource },
    /// Derivative was (re)encoded.
    Normalized { original: OriginalSource },
    /// Something failed; the card points at the placeholder.
    Fallback { reason: String },
}

/// The image a card should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    /// Site-relative path for the `src` attribute.
    pub path: PathBuf,
    pub outcome: ImageOutcome,
}

impl ResolvedImage {
    pub fn is_fallback(&self) -> bool {
        matches!(self.outcome, ImageOutcome::Fallback { .. })
    }
}

/// Resolves entry images against one site root.
pub struct ImageResolver<'a, B: ImageBackend> {
    backend: &'a B,
    covers: Option<&'a dyn CoverSource>,
    config: &'a GalleryConfig,
    site_root: &'a Path,
    normalize: NormalizeConfig,
    use_cache: bool,
}

impl<'a, B: ImageBackend> ImageResolver<'a, B> {
    pub fn new(backend: &'a B, config: &'a GalleryConfig, site_root: &'a Path) -> Self {
        Self {
            backend,
            covers: None,
            config,
            site_root,
            normalize: NormalizeConfig::from_images_config(&config.images),
            use_cache: true,
        }
    }

    /// Cover source used when `images.strategy = "fetch"`.
    pub fn with_cover_source(mut self, covers: &'a dyn CoverSource) -> Self {
        self.covers = Some(covers);
        self
    }

    /// Disable the freshness check so every derivative is re-encoded.
    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Site-relative placeholder path.
    pub fn placeholder(&self) -> PathBuf {
        PathBuf::from(&self.config.paths.placeholder)
    }

    pub fn paths_for(&self, entry: &Entry) -> ImagePaths {
        let filename = filename_for(entry, self.config.images.slug_words);
        ImagePaths {
            original: Path::new(&self.config.paths.originals).join(&filename),
            cached: Path::new(&self.config.paths.normalized).join(&filename),
        }
    }

    /// Resolve an entry's image. Never fails; see the module docs.
    pub fn resolve(&self, entry: &Entry) -> ResolvedImage {
        match self.try_resolve(entry) {
            Ok(resolved) => resolved,
            Err(e) => {
                log::warn!("{}: using placeholder ({e})", entry.key());
                ResolvedImage {
                    path: self.placeholder(),
                    outcome: ImageOutcome::Fallback {
                        reason: e.to_string(),
                    },
                }
            }
        }
    }

    fn try_resolve(&self, entry: &Entry) -> Result<ResolvedImage, ResolveError> {
        let paths = self.paths_for(entry);
        let original = self.site_root.join(&paths.original);
        let cached = self.site_root.join(&paths.cached);

        let source = self.ensure_original(entry, &original)?;

        let outcome = match normalize_image(
            self.backend,
            &original,
            &cached,
            &self.normalize,
            self.use_cache,
        )? {
            NormalizeOutcome::Fresh => ImageOutcome::Cached { original: source },
            NormalizeOutcome::Written => ImageOutcome::Normalized { original: source },
        };

        Ok(ResolvedImage {
            path: paths.cached,
            outcome,
        })
    }

    /// Make sure `original` exists, fetching or copying as policy allows.
    fn ensure_original(
        &self,
        entry: &Entry,
        original: &Path,
    ) -> Result<OriginalSource, ResolveError> {
        if original.exists() {
            return Ok(OriginalSource::Existing);
        }

        if self.try_fetch(entry, original) {
            return Ok(OriginalSource::Fetched);
        }

        let placeholder = self.site_root.join(self.placeholder());
        if !placeholder.exists() {
            return Err(ResolveError::PlaceholderMissing(self.placeholder()));
        }
        if let Some(parent) = original.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(&placeholder, original)?;
        log::debug!("{}: copied placeholder to {}", entry.key(), original.display());
        Ok(OriginalSource::Placeholder)
    }

    /// `true` when a cover was downloaded into `original`.
    fn try_fetch(&self, entry: &Entry, original: &Path) -> bool {
        if self.config.images.strategy != ImageStrategy::Fetch {
            return false;
        }
        let Some(covers) = self.covers else {
            return false;
        };
        let Some(link) = resolve_link(entry, &self.config.links) else {
            return false;
        };
        if link.kind == LinkKind::Search {
            return false;
        }
        match covers.fetch_cover(&link.url, original) {
            Ok(()) => original.exists(),
            Err(e) => {
                log::warn!("{}: cover fetch from {} failed: {e}", entry.key(), link.url);
                false
            }
        }
    }
}
