//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Each publication leads with its positional index and title; citation key,
//! image path and link follow as indented context lines. Untitled entries
//! show their citation key in parentheses instead, since that is the only
//! identity they have.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Publications
//! 001 Foo Bar (2021)
//!     Key: smith2021foo
//!     Original: img/papers/original/2021_Smith_FooBar.jpg (missing)
//!     Link: https://doi.org/10.1000/foo (doi)
//! ```
//!
//! ## Build
//!
//! ```text
//! 001 Foo Bar
//!     Image: img/papers/cards/2021_Smith_FooBar.jpg (encoded)
//! 002 (lee2019)
//!     Image: img/papers/placeholder.jpg (placeholder: placeholder image not found: …)
//! Cache: 1 cached, 1 encoded, 1 placeholder (3 total)
//! Updated index.html with 3 publications.
//! ```
//!
//! ## Check
//!
//! ```text
//! Bibliography: 3 entries
//! Markers: ok
//! Placeholder: img/papers/placeholder.jpg (missing)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::format::LinkKind;
use crate::pipeline::{BuildReport, CheckReport, ScanRecord};
use crate::resolve::{ImageOutcome, OriginalSource};
use std::path::Path;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format an entry header: titled entries show title, untitled show key in parens.
///
/// ```text
/// 001 Foo Bar (2021)
/// 002 (lee2019)
/// ```
fn entry_header(index: usize, title: &str, key: &str, year: Option<&str>) -> String {
    let label = if title.is_empty() {
        format!("({})", key)
    } else {
        title.to_string()
    };
    match year {
        Some(y) => format!("{} {} ({})", format_index(index), label, y),
        None => format!("{} {}", format_index(index), label),
    }
}

fn link_kind_label(kind: LinkKind) -> &'static str {
    match kind {
        LinkKind::Explicit => "url",
        LinkKind::Doi => "doi",
        LinkKind::Search => "search",
    }
}

fn outcome_label(outcome: &ImageOutcome) -> String {
    let origin = |source: &OriginalSource| match source {
        OriginalSource::Existing => "",
        OriginalSource::Fetched => ", fetched",
        OriginalSource::Placeholder => ", from placeholder",
    };
    match outcome {
        ImageOutcome::Cached { original } => format!("cached{}", origin(original)),
        ImageOutcome::Normalized { original } => format!("encoded{}", origin(original)),
        ImageOutcome::Fallback { reason } => format!("placeholder: {}", reason),
    }
}

// ============================================================================
// Scan
// ============================================================================

pub fn format_scan_output(records: &[ScanRecord]) -> Vec<String> {
    let mut lines = vec!["Publications".to_string()];
    for (idx, record) in records.iter().enumerate() {
        lines.push(entry_header(
            idx + 1,
            &record.title,
            &record.key,
            record.year.as_deref(),
        ));
        if !record.title.is_empty() {
            lines.push(format!("{}Key: {}", indent(1), record.key));
        }
        let status = if record.has_original { "present" } else { "missing" };
        lines.push(format!(
            "{}Original: {} ({})",
            indent(1),
            record.original.display(),
            status
        ));
        match &record.link {
            Some(link) => lines.push(format!(
                "{}Link: {} ({})",
                indent(1),
                link.url,
                link_kind_label(link.kind)
            )),
            None => lines.push(format!("{}Link: none", indent(1))),
        }
    }
    if records.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    lines
}

pub fn print_scan_output(records: &[ScanRecord]) {
    for line in format_scan_output(records) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

/// The final line of a build.
pub fn summary_line(html_path: &Path, count: usize) -> String {
    format!("Updated {} with {} publications.", html_path.display(), count)
}

pub fn format_build_output(report: &BuildReport) -> Vec<String> {
    let mut lines = Vec::new();
    for (idx, entry) in report.entries.iter().enumerate() {
        lines.push(entry_header(idx + 1, &entry.title, &entry.key, None));
        lines.push(format!(
            "{}Image: {} ({})",
            indent(1),
            entry.image.path.display(),
            outcome_label(&entry.image.outcome)
        ));
    }
    lines.push(format!("Cache: {}", report.cache_stats));
    lines.push(summary_line(&report.html_path, report.entries.len()));
    lines
}

pub fn print_build_output(report: &BuildReport) {
    for line in format_build_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

pub fn format_check_output(report: &CheckReport) -> Vec<String> {
    let placeholder = if report.placeholder_present {
        "present"
    } else {
        "missing"
    };
    vec![
        format!("Bibliography: {} entries", report.entries),
        "Markers: ok".to_string(),
        format!(
            "Placeholder: {} ({})",
            report.placeholder.display(),
            placeholder
        ),
    ]
}

pub fn print_check_output(report: &CheckReport) {
    for line in format_check_output(report) {
        println!("{}", line);
    }
}
