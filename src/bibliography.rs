//! Bibliography loading.
//!
//! Parses a BibTeX/BibLaTeX export (Google Scholar's "Export all citations"
//! produces one) into plain [`Entry`] values. Parsing is delegated to the
//! [`biblatex`] crate; this module flattens each field to a display string so
//! the rest of the pipeline never sees LaTeX chunk structure.
//!
//! Field values are whitespace-normalized: line breaks and runs of spaces
//! collapse to a single space, and leftover protective braces are dropped.
//!
//! Repeated citation keys are common in exported bibliographies and are not
//! an error here: later occurrences are renamed `key-2`, `key-3`, … before
//! parsing so every record survives.

use biblatex::{Bibliography, ChunksExt};
use regex::{Captures, Regex};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

// `@type{key,` at the start of an entry
static ENTRY_HEAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(\s*@\s*([A-Za-z]+)\s*[{(]\s*)([^\s,{}()=\\\x22#%']+)(\s*,)")
        .expect("valid regex")
});

/// Entry types that carry no citation key.
const KEYLESS_TYPES: &[&str] = &["string", "preamble", "comment"];

#[derive(Error, Debug)]
pub enum BibliographyError {
    #[error("cannot read bibliography {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed bibliography {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// One bibliographic record: citation key plus lowercase field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    key: String,
    fields: BTreeMap<String, String>,
}

impl Entry {
    /// Build an entry from raw field pairs. Names are lowercased and values
    /// normalized the same way parsed entries are.
    pub fn new<K, V>(key: impl Into<String>, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let fields = fields
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_lowercase(), normalize_value(v.as_ref())))
            .collect();
        Self {
            key: key.into(),
            fields,
        }
    }

    /// Citation key (`ID`).
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Field value by (case-insensitive) name. Blank values count as missing.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(&name.to_lowercase())
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title")
    }

    /// Raw author list, names separated by `" and "`.
    pub fn authors(&self) -> Option<&str> {
        self.get("author")
    }

    /// Publication year; BibLaTeX `date` (`2021-05-01`) is used when `year` is absent.
    pub fn year(&self) -> Option<&str> {
        self.get("year").or_else(|| {
            self.get("date")
                .and_then(|d| d.get(..4))
                .filter(|y| y.chars().all(|c| c.is_ascii_digit()))
        })
    }

    /// Journal or proceedings name.
    pub fn venue(&self) -> Option<&str> {
        self.get("journal")
            .or_else(|| self.get("journaltitle"))
            .or_else(|| self.get("booktitle"))
    }

    pub fn url(&self) -> Option<&str> {
        self.get("url")
    }

    pub fn doi(&self) -> Option<&str> {
        self.get("doi")
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }
}

fn normalize_value(raw: &str) -> String {
    raw.replace(['{', '}'], "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Rename repeated citation keys so each entry has a unique one.
///
/// The first occurrence keeps its key; later ones get `-2`, `-3`, … (skipping
/// suffixes that are already taken). Keys compare case-sensitively.
pub fn dedupe_keys(src: &str) -> Cow<'_, str> {
    let mut taken: HashSet<String> = ENTRY_HEAD_RE
        .captures_iter(src)
        .map(|cap| cap[3].to_string())
        .collect();
    let mut seen: HashMap<String, usize> = HashMap::new();

    ENTRY_HEAD_RE.replace_all(src, |cap: &Captures| {
        let kind = cap[2].to_ascii_lowercase();
        let key = &cap[3];
        if KEYLESS_TYPES.contains(&kind.as_str()) {
            return cap[0].to_string();
        }
        let count = seen.entry(key.to_string()).or_insert(0);
        *count += 1;
        if *count == 1 {
            return cap[0].to_string();
        }
        let mut n = *count;
        let mut renamed = format!("{key}-{n}");
        while taken.contains(&renamed) {
            n += 1;
            renamed = format!("{key}-{n}");
        }
        log::warn!("duplicate citation key {key}, renamed to {renamed}");
        taken.insert(renamed.clone());
        format!("{}{}{}", &cap[1], renamed, &cap[4])
    })
}

/// Parse bibliography source text into entries, in file order.
pub fn parse_entries(src: &str) -> Result<Vec<Entry>, String> {
    let src = dedupe_keys(src);
    let bibliography = Bibliography::parse(&src).map_err(|e| e.to_string())?;
    Ok(bibliography
        .iter()
        .map(|entry| {
            Entry::new(
                entry.key.clone(),
                entry
                    .fields
                    .iter()
                    .map(|(name, chunks)| (name.clone(), chunks.format_verbatim())),
            )
        })
        .collect())
}

/// Read and parse a bibliography file.
pub fn load_entries(path: &Path) -> Result<Vec<Entry>, BibliographyError> {
    let src = std::fs::read_to_string(path).map_err(|source| BibliographyError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let entries = parse_entries(&src).map_err(|message| BibliographyError::Parse {
        path: path.to_path_buf(),
        message,
    })?;
    log::debug!("loaded {} entries from {}", entries.len(), path.display());
    Ok(entries)
}
