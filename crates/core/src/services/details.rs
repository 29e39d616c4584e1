//! Character details lookup.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, instrument, warn};

use crate::error::{DetailsError, DetailsResult};
use crate::models::{AppearanceGroup, AppearanceRef, CharacterDetails};
use crate::ports::{CatalogSource, RawAppearanceList, RawCharacter};

/// Fallback description for characters the catalog leaves undescribed.
pub const FALLBACK_DESCRIPTION: &str = "No description";

const FALLBACK_REF_NAME: &str = "Unknown";

/// Timestamp layout of the catalog's `modified` field.
const MODIFIED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Fetches and shapes the details view for a single character.
///
/// Unlike list entries, a details record with no usable name is rejected
/// rather than patched over: the view is about one specific character and
/// an anonymous record means the lookup went wrong.
pub struct DetailsService<S> {
    source: Arc<S>,
}

impl<S: CatalogSource> DetailsService<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    #[instrument(skip(self))]
    pub async fn character_details(&self, id: u64) -> DetailsResult<CharacterDetails> {
        let envelope = self.source.character_by_id(id).await?;
        let raw = extract_single(envelope.data.and_then(|data| data.results))?;
        let details = map_details(&raw)?;
        debug!(id, name = %details.name, "Character details resolved");
        Ok(details)
    }
}

/// A by-id lookup must return exactly one record.
fn extract_single(results: Option<Vec<RawCharacter>>) -> DetailsResult<RawCharacter> {
    let mut results = results.unwrap_or_default();
    match results.len() {
        0 => Err(DetailsError::NoCharacterReturned),
        1 => Ok(results.remove(0)),
        count => {
            warn!(count, "By-id lookup returned multiple records");
            Err(DetailsError::AmbiguousCharacter)
        }
    }
}

fn map_details(raw: &RawCharacter) -> DetailsResult<CharacterDetails> {
    let name = raw
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or(DetailsError::MissingName)?
        .to_string();

    let description = raw
        .description
        .as_deref()
        .map(str::trim)
        .filter(|description| !description.is_empty())
        .unwrap_or(FALLBACK_DESCRIPTION)
        .to_string();

    let thumbnail = raw.thumbnail.as_ref().and_then(|thumb| {
        match (thumb.path.as_deref(), thumb.extension.as_deref()) {
            (Some(path), Some(ext)) => Some(format!("{path}.{ext}")),
            _ => None,
        }
    });

    Ok(CharacterDetails {
        name,
        description,
        thumbnail,
        modified: raw.modified.as_deref().and_then(parse_modified),
        comics: map_appearances(raw.comics.as_ref()),
        series: map_appearances(raw.series.as_ref()),
        stories: map_appearances(raw.stories.as_ref()),
        events: map_appearances(raw.events.as_ref()),
    })
}

fn parse_modified(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(raw, MODIFIED_FORMAT)
        .map(|parsed| parsed.with_timezone(&Utc))
        .ok()
}

fn map_appearances(list: Option<&RawAppearanceList>) -> AppearanceGroup {
    let Some(list) = list else {
        return AppearanceGroup::default();
    };
    AppearanceGroup {
        link: list.collection_uri.clone(),
        count: list.available.unwrap_or(0),
        refs: list
            .items
            .iter()
            .flatten()
            .map(|item| AppearanceRef {
                name: item
                    .name
                    .as_deref()
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .unwrap_or(FALLBACK_REF_NAME)
                    .to_string(),
                url: item.resource_uri.clone(),
            })
            .collect(),
    }
}
