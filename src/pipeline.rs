//! End-to-end runs: bibliography in, updated HTML page out.
//!
//! ```text
//! load entries ─→ check markers ─→ sort ─→ resolve image per entry
//!                                               │
//!                        inject ←─ render cards ←┘
//! ```
//!
//! Loading and marker validation are fatal and happen before any image is
//! touched. Image problems never are: the resolver maps them to the
//! placeholder and the run carries on.

use crate::bibliography::{BibliographyError, Entry, load_entries};
use crate::cache::CacheStats;
use crate::config::{GalleryConfig, ImageStrategy};
use crate::fetch::{CoverSource, RemoteFetcher};
use crate::format::{ResolvedLink, resolve_link};
use crate::imaging::{ImageBackend, RustBackend};
use crate::inject::{InjectError, check_markers, inject_cards};
use crate::render::{card_view, render_cards, sort_entries};
use crate::resolve::{ImageOutcome, ImageResolver, ResolvedImage};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Bibliography(#[from] BibliographyError),
    #[error(transparent)]
    Inject(#[from] InjectError),
}

#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    /// Reuse fresh derivatives instead of re-encoding.
    pub use_cache: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self { use_cache: true }
    }
}

/// Image result for one rendered entry.
#[derive(Debug, Clone)]
pub struct EntryReport {
    pub key: String,
    pub title: String,
    pub image: ResolvedImage,
}

#[derive(Debug, Clone)]
pub struct BuildReport {
    pub html_path: PathBuf,
    /// In card order.
    pub entries: Vec<EntryReport>,
    pub cache_stats: CacheStats,
}

/// Directory image paths are resolved against: the page's own directory.
pub fn site_root(html_path: &Path) -> PathBuf {
    match html_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Run the full pipeline with the production backend.
///
/// A [`RemoteFetcher`] is only constructed for `images.strategy = "fetch"`.
pub fn build(
    bib_path: &Path,
    html_path: &Path,
    config: &GalleryConfig,
    options: BuildOptions,
) -> Result<BuildReport, BuildError> {
    let backend = RustBackend::new();
    match config.images.strategy {
        ImageStrategy::Fetch => {
            let fetcher = RemoteFetcher::new(&config.fetch);
            let covers: &dyn CoverSource = &fetcher;
            build_with(&backend, Some(covers), bib_path, html_path, config, options)
        }
        ImageStrategy::Curated => build_with(&backend, None, bib_path, html_path, config, options),
    }
}

/// Run the full pipeline with explicit image and cover seams.
pub fn build_with(
    backend: &impl ImageBackend,
    covers: Option<&dyn CoverSource>,
    bib_path: &Path,
    html_path: &Path,
    config: &GalleryConfig,
    options: BuildOptions,
) -> Result<BuildReport, BuildError> {
    let mut entries = load_entries(bib_path)?;
    check_markers(html_path)?;
    sort_entries(&mut entries, config.cards.sort);

    let root = site_root(html_path);
    let mut resolver = ImageResolver::new(backend, config, &root).with_cache(options.use_cache);
    if let Some(covers) = covers {
        resolver = resolver.with_cover_source(covers);
    }

    let mut cache_stats = CacheStats::default();
    let mut reports = Vec::with_capacity(entries.len());
    let mut views = Vec::with_capacity(entries.len());

    for entry in &entries {
        let image = resolver.resolve(entry);
        match image.outcome {
            ImageOutcome::Cached { .. } => cache_stats.hit(),
            ImageOutcome::Normalized { .. } => cache_stats.miss(),
            ImageOutcome::Fallback { .. } => cache_stats.fallback(),
        }
        views.push(card_view(entry, &image.path, config));
        reports.push(EntryReport {
            key: entry.key().to_string(),
            title: entry.title().unwrap_or_default().to_string(),
            image,
        });
    }

    inject_cards(html_path, &render_cards(&views))?;
    log::info!("injected {} cards into {}", views.len(), html_path.display());

    Ok(BuildReport {
        html_path: html_path.to_path_buf(),
        entries: reports,
        cache_stats,
    })
}

/// Dry-run view of one entry: what it would be linked to and named.
#[derive(Debug, Clone, Serialize)]
pub struct ScanRecord {
    pub key: String,
    pub title: String,
    pub year: Option<String>,
    pub link: Option<ResolvedLink>,
    /// Site-relative original image path.
    pub original: PathBuf,
    /// Site-relative normalized image path.
    pub normalized: PathBuf,
    /// Whether the original is already on disk.
    pub has_original: bool,
}

/// List entries in card order with derived paths and links. Writes nothing.
pub fn scan(
    bib_path: &Path,
    site_root: &Path,
    config: &GalleryConfig,
) -> Result<Vec<ScanRecord>, BuildError> {
    let mut entries = load_entries(bib_path)?;
    sort_entries(&mut entries, config.cards.sort);
    let backend = RustBackend::new();
    let resolver = ImageResolver::new(&backend, config, site_root);
    Ok(entries
        .iter()
        .map(|entry| scan_record(entry, &resolver, site_root, config))
        .collect())
}

fn scan_record<B: ImageBackend>(
    entry: &Entry,
    resolver: &ImageResolver<'_, B>,
    site_root: &Path,
    config: &GalleryConfig,
) -> ScanRecord {
    let paths = resolver.paths_for(entry);
    ScanRecord {
        key: entry.key().to_string(),
        title: entry.title().unwrap_or_default().to_string(),
        year: entry.year().map(str::to_string),
        link: resolve_link(entry, &config.links),
        has_original: site_root.join(&paths.original).exists(),
        original: paths.original,
        normalized: paths.cached,
    }
}

/// Result of a read-only validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub entries: usize,
    /// Placeholder path, relative to the site root.
    pub placeholder: PathBuf,
    pub placeholder_present: bool,
}

/// Validate the bibliography and markers; report placeholder presence.
pub fn check(
    bib_path: &Path,
    html_path: &Path,
    config: &GalleryConfig,
) -> Result<CheckReport, BuildError> {
    let entries = load_entries(bib_path)?;
    check_markers(html_path)?;
    let placeholder = PathBuf::from(&config.paths.placeholder);
    let placeholder_present = site_root(html_path).join(&placeholder).exists();
    Ok(CheckReport {
        entries: entries.len(),
        placeholder,
        placeholder_present,
    })
}
