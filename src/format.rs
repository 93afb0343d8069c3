//! Pure field formatters: author lists, link selection, and image filenames.
//!
//! Nothing here touches the filesystem or network, so every rule is unit
//! tested directly.
//!
//! ## Image filenames
//!
//! Each entry maps to a stable filename so a curated cover can be dropped in
//! by hand and picked up on the next run:
//!
//! ```text
//! year=2021, author="Smith, John and Doe, Jane", title="Foo Bar: a study"
//!   → 2021_Smith_FooBarAStudy.jpg
//! ```

use crate::bibliography::Entry;
use crate::config::LinksConfig;
use serde::Serialize;
use url::Url;

/// Separator between names in a BibTeX author field.
const AUTHOR_SEPARATOR: &str = " and ";

/// Join author names with commas, truncating past `max_listed` with `", et al."`.
///
/// ```
/// # use paper_gallery::format::format_authors;
/// assert_eq!(format_authors("Smith, John and Doe, Jane", 6), "Smith, John, Doe, Jane");
/// assert_eq!(format_authors("A and B and C", 2), "A, B, et al.");
/// ```
pub fn format_authors(raw: &str, max_listed: usize) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }
    let authors: Vec<&str> = raw.split(AUTHOR_SEPARATOR).map(str::trim).collect();
    if authors.len() <= max_listed {
        authors.join(", ")
    } else {
        format!("{}, et al.", authors[..max_listed].join(", "))
    }
}

/// Where a card link came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// The entry's own `url` field.
    Explicit,
    /// Built from the `doi` field.
    Doi,
    /// A title search; not a landing page worth scraping.
    Search,
}

/// A resolved card link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLink {
    pub url: String,
    pub kind: LinkKind,
}

/// Pick the best link for an entry: `url` → DOI → title search → none.
pub fn resolve_link(entry: &Entry, links: &LinksConfig) -> Option<ResolvedLink> {
    if let Some(url) = entry.url() {
        return Some(ResolvedLink {
            url: url.to_string(),
            kind: LinkKind::Explicit,
        });
    }
    if let Some(doi) = entry.doi() {
        return Some(ResolvedLink {
            url: doi_url(doi),
            kind: LinkKind::Doi,
        });
    }
    if links.search_fallback
        && let Some(title) = entry.title()
        && let Ok(url) = Url::parse_with_params(&links.search_url, &[("q", title)])
    {
        return Some(ResolvedLink {
            url: url.into(),
            kind: LinkKind::Search,
        });
    }
    None
}

/// [`resolve_link`] without the provenance tag.
pub fn resolve_url(entry: &Entry, links: &LinksConfig) -> Option<String> {
    resolve_link(entry, links).map(|link| link.url)
}

/// `https://doi.org/<doi>`, tolerating values that already carry a resolver
/// prefix or a `doi:` scheme.
fn doi_url(doi: &str) -> String {
    let bare = doi
        .trim()
        .trim_start_matches("https://doi.org/")
        .trim_start_matches("http://doi.org/")
        .trim_start_matches("https://dx.doi.org/")
        .trim_start_matches("http://dx.doi.org/")
        .trim_start_matches("doi:");
    format!("https://doi.org/{bare}")
}

/// Python-style capitalize: first character upper, the rest lower.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// CamelCase slug of the first `max_words` title words, ASCII alphanumerics only.
///
/// Returns `"paper"` when nothing survives the filtering.
pub fn slugify(title: &str, max_words: usize) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect();
    let slug: String = cleaned
        .split_whitespace()
        .take(max_words)
        .map(capitalize)
        .collect();
    if slug.is_empty() {
        "paper".to_string()
    } else {
        slug
    }
}

/// Surname of the first listed author.
///
/// `"Smith, John and …"` → `"Smith"`; `"John Smith and …"` → `"Smith"`.
/// Missing or unusable input yields `"Unknown"`.
pub fn first_author_surname(raw: Option<&str>) -> String {
    let first = raw
        .and_then(|r| r.split(AUTHOR_SEPARATOR).next())
        .map(str::trim)
        .unwrap_or_default();
    let surname = match first.split_once(',') {
        Some((last, _)) => last.trim(),
        None => first.split_whitespace().last().unwrap_or_default(),
    };
    let surname: String = surname
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-')
        .collect();
    if surname.is_empty() {
        "Unknown".to_string()
    } else {
        capitalize(&surname)
    }
}

/// Stable image filename: `<year>_<Surname>_<TitleSlug>.jpg`.
///
/// Only ASCII letters and digits of the year are kept, so values like
/// `2021/22` cannot introduce path separators.
pub fn filename_for(entry: &Entry, slug_words: usize) -> String {
    let year: String = entry
        .year()
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();
    let year = if year.is_empty() { "xxxx" } else { year.as_str() };
    let surname = first_author_surname(entry.authors());
    let slug = slugify(entry.title().unwrap_or_default(), slug_words);
    format!("{year}_{surname}_{slug}.jpg")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entry(fields: &[(&str, &str)]) -> Entry {
        Entry::new("key", fields.iter().copied())
    }

    fn no_search() -> LinksConfig {
        LinksConfig {
            search_fallback: false,
            ..LinksConfig::default()
        }
    }

    // =========================================================================
    // format_authors
    // =========================================================================

    #[test]
    fn authors_empty() {
        assert_eq!(format_authors("", 6), "");
        assert_eq!(format_authors("   ", 6), "");
    }

    #[test]
    fn authors_single() {
        assert_eq!(format_authors("Smith, John", 2), "Smith, John");
    }

    #[test]
    fn authors_at_threshold_not_truncated() {
        assert_eq!(
            format_authors("Smith, John and Doe, Jane", 2),
            "Smith, John, Doe, Jane"
        );
    }

    #[test]
    fn authors_over_threshold_truncated() {
        assert_eq!(
            format_authors("A, A and B, B and C, C", 2),
            "A, A, B, B, et al."
        );
    }

    #[test]
    fn authors_trims_names() {
        assert_eq!(format_authors(" Ann Lee  and  Bo Kim ", 6), "Ann Lee, Bo Kim");
    }

    proptest! {
        #[test]
        fn authors_truncation_property(
            names in proptest::collection::vec("[A-Z][a-z]{1,8}", 1..12),
            max in 1usize..8,
        ) {
            let raw = names.join(" and ");
            let formatted = format_authors(&raw, max);
            if names.len() <= max {
                prop_assert_eq!(formatted, names.join(", "));
            } else {
                let expected = format!("{}, et al.", names[..max].join(", "));
                prop_assert_eq!(formatted, expected);
            }
        }
    }

    // =========================================================================
    // resolve_url / resolve_link
    // =========================================================================

    #[test]
    fn url_beats_doi_and_title() {
        let e = entry(&[
            ("url", "https://example.org/paper"),
            ("doi", "10.1/x"),
            ("title", "T"),
        ]);
        let link = resolve_link(&e, &LinksConfig::default()).unwrap();
        assert_eq!(link.url, "https://example.org/paper");
        assert_eq!(link.kind, LinkKind::Explicit);
    }

    #[test]
    fn doi_beats_title() {
        let e = entry(&[("doi", "10.1000/xyz123"), ("title", "T")]);
        let link = resolve_link(&e, &LinksConfig::default()).unwrap();
        assert_eq!(link.url, "https://doi.org/10.1000/xyz123");
        assert_eq!(link.kind, LinkKind::Doi);
    }

    #[test]
    fn doi_with_existing_prefix_not_doubled() {
        let e = entry(&[("doi", "https://doi.org/10.1000/abc")]);
        assert_eq!(
            resolve_url(&e, &LinksConfig::default()).as_deref(),
            Some("https://doi.org/10.1000/abc")
        );
        let e = entry(&[("doi", "doi:10.1000/abc")]);
        assert_eq!(
            resolve_url(&e, &LinksConfig::default()).as_deref(),
            Some("https://doi.org/10.1000/abc")
        );
    }

    #[test]
    fn title_search_fallback() {
        let e = entry(&[("title", "Foo Bar")]);
        let link = resolve_link(&e, &LinksConfig::default()).unwrap();
        assert_eq!(link.kind, LinkKind::Search);
        assert_eq!(link.url, "https://scholar.google.com/scholar?q=Foo+Bar");
    }

    #[test]
    fn title_search_is_encoded() {
        let e = entry(&[("title", "Cats & Dogs?")]);
        let url = resolve_url(&e, &LinksConfig::default()).unwrap();
        assert_eq!(url, "https://scholar.google.com/scholar?q=Cats+%26+Dogs%3F");
    }

    #[test]
    fn search_fallback_disabled() {
        let e = entry(&[("title", "Foo Bar")]);
        assert_eq!(resolve_url(&e, &no_search()), None);
    }

    #[test]
    fn nothing_resolves_to_none() {
        let e = entry(&[("year", "2020")]);
        assert_eq!(resolve_url(&e, &LinksConfig::default()), None);
    }

    #[test]
    fn precedence_over_all_field_combinations() {
        for mask in 0u8..8 {
            let mut fields = Vec::new();
            if mask & 1 != 0 {
                fields.push(("url", "https://u.example"));
            }
            if mask & 2 != 0 {
                fields.push(("doi", "10.5/d"));
            }
            if mask & 4 != 0 {
                fields.push(("title", "T"));
            }
            let kind = resolve_link(&entry(&fields), &LinksConfig::default()).map(|l| l.kind);
            let expected = if mask & 1 != 0 {
                Some(LinkKind::Explicit)
            } else if mask & 2 != 0 {
                Some(LinkKind::Doi)
            } else if mask & 4 != 0 {
                Some(LinkKind::Search)
            } else {
                None
            };
            assert_eq!(kind, expected, "mask {mask:03b}");
        }
    }

    // =========================================================================
    // slugify
    // =========================================================================

    #[test]
    fn slugify_empty_is_paper() {
        assert_eq!(slugify("", 4), "paper");
        assert_eq!(slugify("   ", 4), "paper");
        assert_eq!(slugify("?!…", 4), "paper");
    }

    #[test]
    fn slugify_takes_first_words() {
        assert_eq!(slugify("A B C D E", 4), "ABCD");
    }

    #[test]
    fn slugify_drops_punctuation_and_capitalizes() {
        assert_eq!(slugify("Foo bar: a STUDY of things", 4), "FooBarAStudy");
        assert_eq!(slugify("Self-supervised learning", 4), "SelfsupervisedLearning");
    }

    proptest! {
        #[test]
        fn slugify_output_is_ascii_alphanumeric(title in ".{0,80}", words in 1usize..6) {
            let slug = slugify(&title, words);
            prop_assert!(!slug.is_empty());
            prop_assert!(slug.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    // =========================================================================
    // filenames
    // =========================================================================

    #[test]
    fn surname_comma_form() {
        assert_eq!(first_author_surname(Some("Smith, John and Doe, Jane")), "Smith");
    }

    #[test]
    fn surname_natural_form() {
        assert_eq!(first_author_surname(Some("john smith and Jane Doe")), "Smith");
    }

    #[test]
    fn surname_missing() {
        assert_eq!(first_author_surname(None), "Unknown");
        assert_eq!(first_author_surname(Some("")), "Unknown");
    }

    #[test]
    fn filename_full_entry() {
        let e = entry(&[
            ("year", "2021"),
            ("author", "Smith, John and Doe, Jane"),
            ("title", "Foo Bar"),
        ]);
        assert_eq!(filename_for(&e, 4), "2021_Smith_FooBar.jpg");
    }

    #[test]
    fn filename_missing_fields() {
        let e = entry(&[]);
        assert_eq!(filename_for(&e, 4), "xxxx_Unknown_paper.jpg");
    }

    #[test]
    fn filename_strips_separators_from_year() {
        let e = entry(&[("year", "2021/22"), ("author", "Smith, John"), ("title", "Foo")]);
        assert_eq!(filename_for(&e, 4), "202122_Smith_Foo.jpg");

        let e = entry(&[("year", ".."), ("author", "Smith, John"), ("title", "Foo")]);
        assert_eq!(filename_for(&e, 4), "xxxx_Smith_Foo.jpg");
    }

    proptest! {
        #[test]
        fn filename_is_a_single_path_component(year in "\\PC{0,12}", title in "\\PC{0,40}") {
            let e = entry(&[
                ("year", year.as_str()),
                ("author", "Smith, John"),
                ("title", title.as_str()),
            ]);
            let name = filename_for(&e, 4);
            prop_assert!(!name.contains('/'));
            prop_assert!(!name.contains('\\'));
            prop_assert!(!name.starts_with('.'));
        }
    }
}
