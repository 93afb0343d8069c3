//! Freshness rules for the normalized image cache.
//!
//! Card images are derivatives of the originals and can always be rebuilt,
//! so the cache is nothing more than the files themselves: a derivative is
//! reused when it exists and its modification time is not older than its
//! source's. There is no manifest and no content hashing.
//!
//! Because only timestamps are compared, copying a site with a tool that
//! resets or preserves mtimes can make stale derivatives look fresh (or the
//! reverse). Pass `--no-cache` to `build` to re-encode everything.

use std::fmt;
use std::path::Path;
use std::time::SystemTime;

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// `true` iff `dest` exists and was modified no earlier than `source`.
///
/// An unreadable source counts as stale so the caller surfaces the real error.
pub fn is_fresh(source: &Path, dest: &Path) -> bool {
    match (modified(source), modified(dest)) {
        (Some(src), Some(dst)) => dst >= src,
        _ => false,
    }
}

/// Summary of image work for a build run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Derivative reused as-is.
    pub hits: u32,
    /// Derivative (re)encoded.
    pub misses: u32,
    /// Entry fell back to the placeholder reference.
    pub fallbacks: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn fallback(&mut self) {
        self.fallbacks += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.misses + self.fallbacks
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} cached, {} encoded", self.hits, self.misses)?;
        if self.fallbacks > 0 {
            write!(f, ", {} placeholder", self.fallbacks)?;
        }
        write!(f, " ({} total)", self.total())
    }
}
