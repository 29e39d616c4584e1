//! Port traits for page validation and entry mapping.
//!
//! These are the two synchronous seams between a raw catalog page and the
//! display models: the processor decides whether a page is usable at all,
//! the mapper turns each raw record into something renderable. Both are
//! trait objects so pagination sessions can be tested without any gateway.

use crate::error::ProcessingResult;
use crate::models::CharacterModel;
use crate::ports::catalog::{PageEnvelope, RawCharacter};

/// A validated page: its entries plus the total count the gateway reported.
#[derive(Debug, Clone, Default)]
pub struct ProcessedPage {
    pub entries: Vec<RawCharacter>,
    /// Total size of the (possibly filtered) collection.
    pub total: i64,
}

/// Port trait for page validation.
///
/// Fails when the envelope lacks the result entries or the total count;
/// the pagination session treats that the same as a failed fetch.
pub trait PageProcessor: Send + Sync {
    fn process(&self, envelope: PageEnvelope) -> ProcessingResult<ProcessedPage>;
}

/// Port trait for mapping one raw record to a display model.
///
/// This is a total function: missing fields get deterministic fallbacks,
/// never an error.
pub trait EntryMapper: Send + Sync {
    fn map(&self, raw: &RawCharacter) -> CharacterModel;
}
