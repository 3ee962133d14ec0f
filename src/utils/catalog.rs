use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Leading glyphs that mark a line as a category header, in match order.
/// Adding a marker is a configuration change, not a parser change.
pub const CATEGORY_MARKERS: &[&str] = &["🛒", "🎓", "✈", "🎬", "💼", "🏥"];

// A captured link line: ordinal, period, single space, free-form title,
// space + en-dash (U+2013) + space, then an http(s) URL token. A hyphen
// instead of the en-dash, or a missing space, makes the line invisible.
static LINK_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\. (.+) – (https?://\S+)").expect("link pattern is valid"));

/// An immutable title/URL pair. Identity is structural.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub title: String,
    pub url: String,
}

/// A category header line together with the links captured under it,
/// in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub label: String,
    pub links: Vec<Link>,
}

/// The full mapping from category label to its ordered link list.
///
/// Built once per document load and read-only afterward; reloading the
/// document rebuilds it from scratch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    categories: Vec<Category>,
}

impl Catalog {
    /// Builds a catalog from extracted document text.
    ///
    /// The parse is line-oriented and never fails: lines that are neither
    /// a category header nor a well-formed link line are dropped, as are
    /// link lines that appear before the first header. A header whose
    /// label was already seen resumes that category instead of restarting
    /// it, so a header repeated across a page break keeps its links.
    pub fn build(text: &str) -> Self {
        let mut catalog = Catalog::default();
        let mut current: Option<usize> = None;

        for raw_line in text.split('\n') {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }

            if CATEGORY_MARKERS.iter().any(|marker| line.starts_with(marker)) {
                current = Some(catalog.open_category(line));
            } else if let Some(index) = current {
                if let Some(caps) = LINK_LINE.captures(line) {
                    catalog.categories[index].links.push(Link {
                        title: caps[2].trim().to_string(),
                        url: caps[3].trim().to_string(),
                    });
                }
            }
        }

        debug!(
            "Built catalog with {} categories and {} links",
            catalog.categories.len(),
            catalog.total_links()
        );

        catalog
    }

    // Returns the index of the category with this label, creating it at
    // the end when unseen. Never resets an existing link list.
    fn open_category(&mut self, label: &str) -> usize {
        if let Some(index) = self.categories.iter().position(|c| c.label == label) {
            return index;
        }
        self.categories.push(Category {
            label: label.to_string(),
            links: Vec::new(),
        });
        self.categories.len() - 1
    }

    /// Categories in the order their headers first appeared.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Links for one category label; empty when the label is unknown.
    pub fn links_for(&self, label: &str) -> &[Link] {
        self.categories
            .iter()
            .find(|c| c.label == label)
            .map(|c| c.links.as_slice())
            .unwrap_or(&[])
    }

    /// Every link across every category, catalog order.
    pub fn all_links(&self) -> impl Iterator<Item = &Link> {
        self.categories.iter().flat_map(|c| c.links.iter())
    }

    pub fn total_links(&self) -> usize {
        self.all_links().count()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(title: &str, url: &str) -> Link {
        Link {
            title: title.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn captures_links_under_most_recent_category() {
        let text = "🛒 Shopping\n\
                    1. Example Store – https://example.com/shop\n\
                    noise line\n\
                    🎓 Education\n\
                    1. Course – https://example.com/course\n";
        let catalog = Catalog::build(text);

        assert_eq!(catalog.categories().len(), 2);
        assert_eq!(catalog.categories()[0].label, "🛒 Shopping");
        assert_eq!(
            catalog.links_for("🛒 Shopping"),
            &[link("Example Store", "https://example.com/shop")]
        );
        assert_eq!(
            catalog.links_for("🎓 Education"),
            &[link("Course", "https://example.com/course")]
        );
        assert!(!catalog
            .all_links()
            .any(|l| l.title.contains("noise") || l.url.contains("noise")));
    }

    #[test]
    fn link_lines_before_any_header_are_dropped() {
        let text = "1. Orphan – https://example.com/orphan\n\
                    🛒 Shopping\n\
                    2. Kept – https://example.com/kept\n";
        let catalog = Catalog::build(text);

        assert_eq!(catalog.total_links(), 1);
        assert_eq!(
            catalog.links_for("🛒 Shopping"),
            &[link("Kept", "https://example.com/kept")]
        );
    }

    #[test]
    fn repeated_header_resumes_instead_of_restarting() {
        let text = "🏥 Health\n\
                    1. A – https://example.com/a\n\
                    2. B – https://example.com/b\n\
                    🏥 Health\n\
                    3. C – https://example.com/c\n";
        let catalog = Catalog::build(text);

        assert_eq!(catalog.categories().len(), 1);
        assert_eq!(
            catalog.links_for("🏥 Health"),
            &[
                link("A", "https://example.com/a"),
                link("B", "https://example.com/b"),
                link("C", "https://example.com/c"),
            ]
        );
    }

    #[test]
    fn interleaved_headers_keep_both_lists_in_order() {
        let text = "✈ Travel\n\
                    1. Flights – https://example.com/flights\n\
                    💼 Work\n\
                    1. Jobs – https://example.com/jobs\n\
                    ✈ Travel\n\
                    2. Hotels – https://example.com/hotels\n";
        let catalog = Catalog::build(text);

        assert_eq!(catalog.categories().len(), 2);
        assert_eq!(catalog.categories()[0].label, "✈ Travel");
        assert_eq!(
            catalog.links_for("✈ Travel"),
            &[
                link("Flights", "https://example.com/flights"),
                link("Hotels", "https://example.com/hotels"),
            ]
        );
        assert_eq!(
            catalog.links_for("💼 Work"),
            &[link("Jobs", "https://example.com/jobs")]
        );
    }

    #[test]
    fn grammar_deviations_are_silently_dropped() {
        let text = "🎬 Movies\n\
                    1. Hyphen Dash - https://example.com/hyphen\n\
                    2.Missing Space – https://example.com/nospace\n\
                    3. No URL – not-a-url\n\
                    4. Good – https://example.com/good\n";
        let catalog = Catalog::build(text);

        assert_eq!(
            catalog.links_for("🎬 Movies"),
            &[link("Good", "https://example.com/good")]
        );
    }

    #[test]
    fn title_and_url_are_trimmed_and_title_may_contain_dashes() {
        let text = "💼 Work\n\
                    12. Remote – friendly jobs – https://example.com/remote\n";
        let catalog = Catalog::build(text);

        assert_eq!(
            catalog.links_for("💼 Work"),
            &[link("Remote – friendly jobs", "https://example.com/remote")]
        );
    }

    #[test]
    fn surrounding_page_artifacts_are_tolerated() {
        let text = "Links Directory — 2024 Edition\n\
                    Page 1 of 3\n\
                    \n\
                    🛒 Shopping\n\
                    1. Store – https://example.com/store\n\
                    \n\
                    --- page break ---\n\
                    footer text\n";
        let catalog = Catalog::build(text);

        assert_eq!(catalog.categories().len(), 1);
        assert_eq!(catalog.total_links(), 1);
    }

    #[test]
    fn build_is_idempotent() {
        let text = "🛒 Shopping\n1. Store – https://example.com/store\n🎓 Education\n";
        assert_eq!(Catalog::build(text), Catalog::build(text));
    }

    #[test]
    fn empty_text_builds_empty_catalog() {
        let catalog = Catalog::build("");
        assert!(catalog.is_empty());
        assert_eq!(catalog.total_links(), 0);
        assert_eq!(catalog.links_for("🛒 Shopping"), &[] as &[Link]);
    }
}
