//! Gallery configuration module.
//!
//! Handles loading, validating, and merging `gallery.toml`. The file lives next
//! to the target HTML page (the *site root*); every image path in it is
//! relative to that directory, which is also how the paths end up in the
//! generated `src` attributes.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [paths]
//! originals = "img/papers/original"      # Curated / fetched source images
//! normalized = "img/papers/cards"        # Cropped + resized derivatives
//! placeholder = "img/papers/placeholder.jpg"
//!
//! [authors]
//! max_listed = 6            # More authors than this → "A, B, …, et al."
//!
//! [links]
//! search_fallback = true    # Link to a title search when no url/doi
//! search_url = "https://scholar.google.com/scholar"
//!
//! [cards]
//! sort = "newest-first"     # or "oldest-first"
//! link_style = "wrap"       # or "button"
//!
//! [images]
//! strategy = "curated"      # or "fetch"
//! size = [640, 480]         # Card image width, height (also the crop ratio)
//! quality = 85              # JPEG quality (1-100)
//! slug_words = 4            # Title words used in image filenames
//!
//! [fetch]
//! timeout_secs = 15
//! delay_ms = 1000
//! user_agent = "Mozilla/5.0 (compatible; paper-gallery)"
//! min_dimension = 150
//! denylist = ["logo", "icon", "spinner", "badge", "pixel", "sprite", "analytics"]
//! shuffle = true
//! ```
//!
//! Config files are sparse — override just the values you want. Unknown keys
//! are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the config file looked up in the site root.
pub const CONFIG_FILENAME: &str = "gallery.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Gallery configuration loaded from `gallery.toml`.
///
/// Constructed once at startup and passed by reference to every stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Image directories and the placeholder asset.
    pub paths: PathsConfig,
    /// Author list formatting.
    pub authors: AuthorsConfig,
    /// Card link selection.
    pub links: LinksConfig,
    /// Card ordering and link presentation.
    pub cards: CardsConfig,
    /// Cover image acquisition and normalization.
    pub images: ImagesConfig,
    /// Remote cover fetching (only used with `images.strategy = "fetch"`).
    pub fetch: FetchConfig,
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.images.quality == 0 || self.images.quality > 100 {
            return Err(ConfigError::Validation(
                "images.quality must be 1-100".into(),
            ));
        }
        if self.images.size[0] == 0 || self.images.size[1] == 0 {
            return Err(ConfigError::Validation(
                "images.size values must be non-zero".into(),
            ));
        }
        if self.images.slug_words == 0 {
            return Err(ConfigError::Validation(
                "images.slug_words must be at least 1".into(),
            ));
        }
        if self.authors.max_listed == 0 {
            return Err(ConfigError::Validation(
                "authors.max_listed must be at least 1".into(),
            ));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "fetch.timeout_secs must be non-zero".into(),
            ));
        }
        if url::Url::parse(&self.links.search_url).is_err() {
            return Err(ConfigError::Validation(format!(
                "links.search_url is not a valid URL: {}",
                self.links.search_url
            )));
        }
        Ok(())
    }
}

/// Where images live, relative to the site root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Stable, user-curatable source images (one per entry).
    pub originals: String,
    /// Regenerable normalized derivatives referenced by the cards.
    pub normalized: String,
    /// Stand-in image copied for entries without a curated original.
    pub placeholder: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            originals: "img/papers/original".to_string(),
            normalized: "img/papers/cards".to_string(),
            placeholder: "img/papers/placeholder.jpg".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthorsConfig {
    /// Author lists longer than this are truncated with `", et al."`.
    pub max_listed: usize,
}

impl Default for AuthorsConfig {
    fn default() -> Self {
        Self { max_listed: 6 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinksConfig {
    /// Fall back to a title search link when an entry has no `url` or `doi`.
    pub search_fallback: bool,
    /// Search endpoint; the title is passed as the `q` query parameter.
    pub search_url: String,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            search_fallback: true,
            search_url: "https://scholar.google.com/scholar".to_string(),
        }
    }
}

/// Card ordering by `(year, title)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// How the resolved link is attached to a card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkStyle {
    /// The whole card is wrapped in an anchor.
    #[default]
    Wrap,
    /// A separate "View paper" link is appended inside the card.
    Button,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CardsConfig {
    pub sort: SortOrder,
    pub link_style: LinkStyle,
}

/// How an entry without a curated original gets one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageStrategy {
    /// Copy the placeholder; the user replaces it by hand later.
    #[default]
    Curated,
    /// Try to scrape a cover from the entry's landing page first.
    Fetch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    pub strategy: ImageStrategy,
    /// Output `[width, height]` in pixels. The crop uses the same ratio.
    pub size: [u32; 2],
    /// JPEG encoding quality (1 = worst, 100 = best).
    pub quality: u32,
    /// Number of title words kept in the image filename slug.
    pub slug_words: usize,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            strategy: ImageStrategy::default(),
            size: [640, 480],
            quality: 85,
            slug_words: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Fixed pause before every remote request.
    pub delay_ms: u64,
    pub user_agent: String,
    /// Candidates with both an explicit width and height below this are skipped.
    pub min_dimension: u32,
    /// Candidate URLs containing any of these substrings are skipped.
    pub denylist: Vec<String>,
    /// Try candidates in random order instead of document order.
    pub shuffle: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            delay_ms: 1000,
            user_agent: "Mozilla/5.0 (compatible; paper-gallery)".to_string(),
            min_dimension: 150,
            denylist: [
                "logo",
                "icon",
                "spinner",
                "badge",
                "pixel",
                "sprite",
                "analytics",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            shuffle: true,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(GalleryConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<GalleryConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: GalleryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `gallery.toml` from the site root, falling back to defaults when absent.
pub fn load_config(site_root: &Path) -> Result<GalleryConfig, ConfigError> {
    load_config_file(&site_root.join(CONFIG_FILENAME))
}

/// Load an explicit config file path. A missing file yields the defaults.
pub fn load_config_file(path: &Path) -> Result<GalleryConfig, ConfigError> {
    resolve_config(load_raw_config(path)?)
}

/// Returns a fully-commented stock `gallery.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# paper-gallery configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.
#
# Paths are relative to the directory holding the target HTML page.

# ---------------------------------------------------------------------------
# Image locations
# ---------------------------------------------------------------------------
[paths]
# One source image per publication. Drop a real cover here under the
# generated filename (see `paper-gallery scan`) to replace the placeholder.
originals = "img/papers/original"
# Cropped and resized copies referenced by the cards. Safe to delete.
normalized = "img/papers/cards"
# Copied in for publications without an original.
placeholder = "img/papers/placeholder.jpg"

# ---------------------------------------------------------------------------
# Authors
# ---------------------------------------------------------------------------
[authors]
# Lists longer than this show the first names followed by ", et al."
max_listed = 6

# ---------------------------------------------------------------------------
# Links
# ---------------------------------------------------------------------------
[links]
# Precedence: url field, then https://doi.org/<doi>, then a title search.
search_fallback = true
search_url = "https://scholar.google.com/scholar"

# ---------------------------------------------------------------------------
# Cards
# ---------------------------------------------------------------------------
[cards]
# "newest-first" or "oldest-first" (by year, then title).
sort = "newest-first"
# "wrap" makes the whole card a link; "button" adds a "View paper" link.
link_style = "wrap"

# ---------------------------------------------------------------------------
# Images
# ---------------------------------------------------------------------------
[images]
# "curated" copies the placeholder for missing originals.
# "fetch" first tries to scrape a cover image from the publication page.
strategy = "curated"
# Card image size as [width, height]; the center crop uses the same ratio.
size = [640, 480]
# JPEG quality (1 = worst, 100 = best).
quality = 85
# Title words kept in image filenames (2021_Smith_DeepLearningForCats.jpg).
slug_words = 4

# ---------------------------------------------------------------------------
# Remote fetching (strategy = "fetch" only)
# ---------------------------------------------------------------------------
[fetch]
timeout_secs = 15
# Pause before every request, to go easy on publisher sites.
delay_ms = 1000
user_agent = "Mozilla/5.0 (compatible; paper-gallery)"
# Images declaring both width and height below this are ignored.
min_dimension = 150
# Image URLs containing any of these are ignored.
denylist = ["logo", "icon", "spinner", "badge", "pixel", "sprite", "analytics"]
# Try candidate images in random order (false = page order).
shuffle = true
"##
}
