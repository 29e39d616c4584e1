//! Default page processor and entry mapper implementations.

use std::hash::{DefaultHasher, Hash, Hasher};

use crate::error::{ProcessingError, ProcessingResult};
use crate::models::CharacterModel;
use crate::ports::{EntryMapper, PageEnvelope, PageProcessor, ProcessedPage, RawCharacter};

/// Name substituted when a record has no usable name.
pub const FALLBACK_NAME: &str = "NO_NAME";

// =============================================================================
// Page processor
// =============================================================================

/// Default envelope validation: requires result entries and a total count.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPageProcessor;

impl PageProcessor for DefaultPageProcessor {
    fn process(&self, envelope: PageEnvelope) -> ProcessingResult<ProcessedPage> {
        let data = envelope.data.ok_or(ProcessingError::MissingEntries)?;
        let entries = data.results.ok_or(ProcessingError::MissingEntries)?;
        let total = data.total.ok_or(ProcessingError::MissingTotal)?;

        Ok(ProcessedPage { entries, total })
    }
}

// =============================================================================
// Entry mapper
// =============================================================================

/// Default raw-record mapping with deterministic fallbacks.
///
/// A record without an id gets a synthetic identity derived from its other
/// fields, so repeated mappings of the same record stay equal.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEntryMapper;

impl EntryMapper for DefaultEntryMapper {
    fn map(&self, raw: &RawCharacter) -> CharacterModel {
        let name = raw
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(FALLBACK_NAME)
            .to_string();

        let model_id = match raw.id {
            Some(id) => format!("char-{id}"),
            None => synthetic_id(raw),
        };

        CharacterModel {
            model_id,
            character_id: raw.id,
            name,
            thumbnail: thumbnail_url(raw),
        }
    }
}

/// Join the thumbnail path and extension into a full URL.
fn thumbnail_url(raw: &RawCharacter) -> Option<String> {
    let thumbnail = raw.thumbnail.as_ref()?;
    match (&thumbnail.path, &thumbnail.extension) {
        (Some(path), Some(ext)) => Some(format!("{path}.{ext}")),
        _ => None,
    }
}

/// Deterministic identity for a record without an id.
fn synthetic_id(raw: &RawCharacter) -> String {
    let mut hasher = DefaultHasher::new();
    raw.name.hash(&mut hasher);
    raw.resource_uri.hash(&mut hasher);
    raw.modified.hash(&mut hasher);
    format!("unidentified-{:016x}", hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{PageContainer, RawThumbnail};

    fn raw(id: Option<u64>, name: &str) -> RawCharacter {
        RawCharacter {
            id,
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    fn envelope(total: Option<i64>, results: Option<Vec<RawCharacter>>) -> PageEnvelope {
        PageEnvelope {
            data: Some(PageContainer {
                total,
                results,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn processor_extracts_entries_and_total() {
        let page = DefaultPageProcessor
            .process(envelope(Some(1559), Some(vec![raw(Some(1), "3-D Man")])))
            .unwrap();
        assert_eq!(page.total, 1559);
        assert_eq!(page.entries.len(), 1);
    }

    #[test]
    fn processor_rejects_missing_results() {
        let err = DefaultPageProcessor
            .process(envelope(Some(10), None))
            .unwrap_err();
        assert_eq!(err, ProcessingError::MissingEntries);

        let err = DefaultPageProcessor
            .process(PageEnvelope::default())
            .unwrap_err();
        assert_eq!(err, ProcessingError::MissingEntries);
    }

    #[test]
    fn processor_rejects_missing_total() {
        let err = DefaultPageProcessor
            .process(envelope(None, Some(vec![])))
            .unwrap_err();
        assert_eq!(err, ProcessingError::MissingTotal);
    }

    #[test]
    fn mapper_uses_catalog_id_when_present() {
        let model = DefaultEntryMapper.map(&raw(Some(1011334), "3-D Man"));
        assert_eq!(model.model_id, "char-1011334");
        assert_eq!(model.character_id, Some(1011334));
        assert_eq!(model.name, "3-D Man");
    }

    // Test critique: le mapper est une fonction totale et déterministe,
    // deux mappings du même enregistrement incomplet donnent le même modèle
    #[test]
    fn mapper_is_deterministic_without_id() {
        let record = RawCharacter {
            name: Some("Mystery".into()),
            resource_uri: Some("http://gateway.example/characters/x".into()),
            ..Default::default()
        };
        let a = DefaultEntryMapper.map(&record);
        let b = DefaultEntryMapper.map(&record);
        assert_eq!(a, b);
        assert!(a.model_id.starts_with("unidentified-"));
    }

    #[test]
    fn mapper_falls_back_on_blank_name() {
        let model = DefaultEntryMapper.map(&raw(Some(2), "   "));
        assert_eq!(model.name, FALLBACK_NAME);

        let model = DefaultEntryMapper.map(&RawCharacter {
            id: Some(3),
            ..Default::default()
        });
        assert_eq!(model.name, FALLBACK_NAME);
    }

    #[test]
    fn mapper_joins_thumbnail_path_and_extension() {
        let mut record = raw(Some(4), "Iron Man");
        record.thumbnail = Some(RawThumbnail {
            path: Some("http://i.annihil.us/u/prod/marvel/i/mg/9/c0/527bb7b37ff55".into()),
            extension: Some("jpg".into()),
        });
        let model = DefaultEntryMapper.map(&record);
        assert_eq!(
            model.thumbnail.as_deref(),
            Some("http://i.annihil.us/u/prod/marvel/i/mg/9/c0/527bb7b37ff55.jpg")
        );

        // Extension absente: pas d'URL partielle
        record.thumbnail = Some(RawThumbnail {
            path: Some("http://i.annihil.us/something".into()),
            extension: None,
        });
        assert!(DefaultEntryMapper.map(&record).thumbnail.is_none());
    }
}
