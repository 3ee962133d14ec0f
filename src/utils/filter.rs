// Query filtering over the catalog and over raw document text. Both
// filters are case-insensitive substring scans.

use crate::utils::catalog::{Catalog, Link};

/// Size of the fallback excerpt, counted in characters (not bytes). The
/// cut lands wherever character 500 falls, even mid-word.
pub const FALLBACK_EXCERPT_CHARS: usize = 500;

/// Returns every link whose title or owning category label contains
/// `query`, case-insensitively. Categories are walked in catalog order and
/// links in list order; no deduplication. An empty result is a valid
/// outcome, not an error.
///
/// `query` is assumed non-empty; callers enforce that at their boundary.
pub fn search_links<'a>(catalog: &'a Catalog, query: &str) -> Vec<&'a Link> {
    let needle = query.to_lowercase();
    let mut results = Vec::new();

    for category in catalog.categories() {
        let label_matches = category.label.to_lowercase().contains(&needle);
        for link in &category.links {
            if label_matches || link.title.to_lowercase().contains(&needle) {
                results.push(link);
            }
        }
    }

    results
}

/// Reduces raw document text to the lines containing `query`
/// (case-insensitive), rejoined with newlines in original order.
///
/// When no line matches, returns the first [`FALLBACK_EXCERPT_CHARS`]
/// characters of the text instead, so the downstream model call always
/// receives a bounded, non-empty excerpt.
pub fn filter_document_text(text: &str, query: &str) -> String {
    let needle = query.to_lowercase();
    let matching: Vec<&str> = text
        .lines()
        .filter(|line| line.to_lowercase().contains(&needle))
        .collect();

    if matching.is_empty() {
        text.chars().take(FALLBACK_EXCERPT_CHARS).collect()
    } else {
        matching.join("\n")
    }
}
