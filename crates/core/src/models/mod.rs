//! Domain models for the catalog browser.
//!
//! These models are transport-agnostic and represent the canonical form of
//! catalog data within the domain layer. Raw wire shapes live next to the
//! [`crate::ports::CatalogSource`] port; the types here are what consumers
//! render.

use serde::{Deserialize, Serialize};

// =============================================================================
// List Entries
// =============================================================================

/// Display-ready model of one catalog character.
///
/// Produced by an [`crate::ports::EntryMapper`]; every field is filled with a
/// deterministic fallback when the wire record is incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterModel {
    /// Stable identity for rendering-layer deduplication.
    pub model_id: String,
    /// Catalog identifier, when the record carried one.
    pub character_id: Option<u64>,
    /// Character name (never empty).
    pub name: String,
    /// Full thumbnail URL, when the record carried one.
    pub thumbnail: Option<String>,
}

/// Synthetic placeholder shown in place of a page that failed to load.
///
/// Distinct from [`CharacterModel`] so rendering layers cannot confuse it
/// with real catalog data. Its identity is derived from the page index,
/// which both deduplicates repeated failures of the same page and lets the
/// consumer re-request that exact page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorPlaceholderModel {
    /// Stable identity derived from the failing page index.
    pub error_id: String,
    /// Short text shown in the placeholder slot.
    pub name: String,
}

impl ErrorPlaceholderModel {
    /// Build the placeholder for a failed page fetch.
    pub fn for_page(page: u32) -> Self {
        Self {
            error_id: format!("page-error-{page}"),
            name: "Failed to load".to_string(),
        }
    }
}

/// One entry of the assembled display list.
///
/// Every entry carries the page index it came from, so the consumer can
/// retry or advance from the right page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisplayItem {
    /// A successfully loaded character.
    Loaded {
        model: CharacterModel,
        /// Origin page index.
        page: u32,
    },
    /// A placeholder for a page that failed to load.
    Error {
        model: ErrorPlaceholderModel,
        /// Origin page index.
        page: u32,
    },
}

impl DisplayItem {
    /// The page index this entry originates from.
    pub fn page(&self) -> u32 {
        match self {
            DisplayItem::Loaded { page, .. } => *page,
            DisplayItem::Error { page, .. } => *page,
        }
    }
}

/// The flattened, page-ordered list published to the consumer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayList {
    /// Entries in ascending page order, insertion order preserved per page.
    pub entries: Vec<DisplayItem>,
}

impl DisplayList {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Total Count State
// =============================================================================

/// Tri-state tracking of the catalog's reported total item count.
///
/// `TotalChanged` is terminal: once a fetch reports a total different from
/// an earlier fetch in the same session, no further page loads happen until
/// the session is reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TotalResults {
    /// No page has been fetched yet.
    #[default]
    NotFetched,
    /// A total was observed.
    Fetched(i64),
    /// A later fetch reported a different total than a prior fetch.
    TotalChanged,
}

// =============================================================================
// Character Details
// =============================================================================

/// One group of cross-referenced appearances (comics, series, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppearanceGroup {
    /// Link to the full collection, when available.
    pub link: Option<String>,
    /// Number of appearances the catalog knows about.
    pub count: i64,
    /// The subset of appearances inlined in the record.
    pub refs: Vec<AppearanceRef>,
}

/// A single named appearance reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppearanceRef {
    pub name: String,
    pub url: Option<String>,
}

/// Display-ready model of a character's details view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterDetails {
    pub name: String,
    /// Description text (never empty; a fallback is substituted).
    pub description: String,
    pub thumbnail: Option<String>,
    /// Last modification timestamp, when the record carried a parsable one.
    pub modified: Option<chrono::DateTime<chrono::Utc>>,
    pub comics: AppearanceGroup,
    pub series: AppearanceGroup,
    pub stories: AppearanceGroup,
    pub events: AppearanceGroup,
}

#[cfg(test)]
mod tests {
    use super::*;

    // L'identité du placeholder doit être stable: même page, même id
    #[test]
    fn error_placeholder_id_is_stable_per_page() {
        let a = ErrorPlaceholderModel::for_page(3);
        let b = ErrorPlaceholderModel::for_page(3);
        assert_eq!(a, b);
        assert_eq!(a.error_id, "page-error-3");

        let other = ErrorPlaceholderModel::for_page(4);
        assert_ne!(a.error_id, other.error_id);
    }

    #[test]
    fn display_item_reports_origin_page() {
        let loaded = DisplayItem::Loaded {
            model: CharacterModel {
                model_id: "char-1".into(),
                character_id: Some(1),
                name: "Spider-Man".into(),
                thumbnail: None,
            },
            page: 2,
        };
        let error = DisplayItem::Error {
            model: ErrorPlaceholderModel::for_page(5),
            page: 5,
        };
        assert_eq!(loaded.page(), 2);
        assert_eq!(error.page(), 5);
    }

    #[test]
    fn total_results_defaults_to_not_fetched() {
        assert_eq!(TotalResults::default(), TotalResults::NotFetched);
    }
}
