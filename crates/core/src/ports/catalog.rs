//! Port trait for the remote catalog source.
//!
//! This trait defines the interface for fetching raw character pages from
//! the paginated catalog gateway. Implementations live in the
//! infrastructure layer (`longbox-gateway`).
//!
//! The raw wire shapes are deliberately lenient: every field is optional,
//! because the gateway omits fields freely. Validation happens afterwards in
//! the [`crate::ports::PageProcessor`].

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::GatewayResult;

// =============================================================================
// Queries
// =============================================================================

/// Offset/limit query for one catalog page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageQuery {
    /// Item offset into the collection (`page * page_size`).
    pub offset: usize,
    /// Maximum number of items to return (the page size).
    pub limit: usize,
    /// Optional name-prefix filter (search mode).
    pub name_starts_with: Option<String>,
}

// =============================================================================
// Raw wire shapes
// =============================================================================

/// Top-level response envelope for every catalog endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope {
    /// HTTP-ish status code echoed in the body.
    pub code: Option<i64>,
    pub status: Option<String>,
    pub copyright: Option<String>,
    pub attribution_text: Option<String>,
    pub etag: Option<String>,
    /// The paged payload. Absent on some error responses.
    pub data: Option<PageContainer>,
}

/// The paged payload inside an envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageContainer {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    /// Total number of items in the (possibly filtered) collection.
    pub total: Option<i64>,
    /// Number of items actually returned in this page.
    pub count: Option<i64>,
    pub results: Option<Vec<RawCharacter>>,
}

/// Raw character record before domain mapping.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCharacter {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Modification timestamp as reported by the gateway
    /// (e.g. `2014-04-29T14:18:17-0400`).
    pub modified: Option<String>,
    #[serde(rename = "resourceURI")]
    pub resource_uri: Option<String>,
    pub urls: Option<Vec<RawUrlInfo>>,
    pub thumbnail: Option<RawThumbnail>,
    pub comics: Option<RawAppearanceList>,
    pub series: Option<RawAppearanceList>,
    pub stories: Option<RawAppearanceList>,
    pub events: Option<RawAppearanceList>,
}

/// A thumbnail split into path and extension, joined at mapping time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawThumbnail {
    pub path: Option<String>,
    pub extension: Option<String>,
}

/// A typed external link on a character record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawUrlInfo {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub url: Option<String>,
}

/// A cross-referenced appearance collection (comics, series, ...).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAppearanceList {
    /// Total appearances the catalog knows about.
    pub available: Option<i64>,
    /// Number of summaries inlined below.
    pub returned: Option<i64>,
    #[serde(rename = "collectionURI")]
    pub collection_uri: Option<String>,
    pub items: Option<Vec<RawAppearanceRef>>,
}

/// One inlined appearance summary.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAppearanceRef {
    #[serde(rename = "resourceURI")]
    pub resource_uri: Option<String>,
    pub name: Option<String>,
}

// =============================================================================
// Port trait
// =============================================================================

/// Port trait for the remote catalog gateway.
///
/// Both operations return the same envelope shape; the single-character
/// endpoint simply returns a one-element page.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch one page of the character collection.
    async fn character_page(&self, query: PageQuery) -> GatewayResult<PageEnvelope>;

    /// Fetch a single character by catalog id.
    async fn character_by_id(&self, id: u64) -> GatewayResult<PageEnvelope>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Payload réaliste du gateway, utilisé aussi par les tests de mapping
    const SAMPLE_PAGE: &str = r#"{
        "code": 200,
        "status": "Ok",
        "copyright": "© 2022 MARVEL",
        "attributionText": "Data provided by Marvel. © 2022 MARVEL",
        "etag": "07503b6670b51a2c2b46e696a06468d33bc72b42",
        "data": {
            "offset": 0,
            "limit": 50,
            "total": 1559,
            "count": 2,
            "results": [
                {
                    "id": 1011334,
                    "name": "3-D Man",
                    "description": "",
                    "modified": "2014-04-29T14:18:17-0400",
                    "thumbnail": {
                        "path": "http://i.annihil.us/u/prod/marvel/i/mg/c/e0/535fecbbb9784",
                        "extension": "jpg"
                    },
                    "resourceURI": "http://gateway.marvel.com/v1/public/characters/1011334",
                    "comics": {
                        "available": 12,
                        "collectionURI": "http://gateway.marvel.com/v1/public/characters/1011334/comics",
                        "items": [
                            {
                                "resourceURI": "http://gateway.marvel.com/v1/public/comics/21366",
                                "name": "Avengers: The Initiative (2007) #14"
                            }
                        ],
                        "returned": 1
                    },
                    "urls": [
                        {
                            "type": "detail",
                            "url": "http://marvel.com/characters/74/3-d_man"
                        }
                    ]
                },
                {
                    "name": "A.I.M.",
                    "description": "AIM is a terrorist organization bent on destroying the world."
                }
            ]
        }
    }"#;

    #[test]
    fn decodes_full_envelope() {
        let envelope: PageEnvelope = serde_json::from_str(SAMPLE_PAGE).unwrap();

        assert_eq!(envelope.code, Some(200));
        assert_eq!(envelope.status.as_deref(), Some("Ok"));
        assert!(
            envelope
                .attribution_text
                .as_deref()
                .unwrap()
                .contains("Marvel")
        );

        let data = envelope.data.unwrap();
        assert_eq!(data.total, Some(1559));
        assert_eq!(data.count, Some(2));

        let results = data.results.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, Some(1011334));
        assert_eq!(results[0].name.as_deref(), Some("3-D Man"));
        assert_eq!(
            results[0].thumbnail.as_ref().unwrap().extension.as_deref(),
            Some("jpg")
        );

        let comics = results[0].comics.as_ref().unwrap();
        assert_eq!(comics.available, Some(12));
        assert_eq!(comics.items.as_ref().unwrap().len(), 1);
        assert!(
            comics
                .collection_uri
                .as_deref()
                .unwrap()
                .ends_with("/comics")
        );
    }

    // Tous les champs sont optionnels: un enregistrement partiel doit décoder
    #[test]
    fn decodes_sparse_record() {
        let envelope: PageEnvelope = serde_json::from_str(SAMPLE_PAGE).unwrap();
        let results = envelope.data.unwrap().results.unwrap();

        let sparse = &results[1];
        assert_eq!(sparse.id, None);
        assert_eq!(sparse.name.as_deref(), Some("A.I.M."));
        assert!(sparse.thumbnail.is_none());
        assert!(sparse.comics.is_none());
    }

    #[test]
    fn decodes_empty_envelope() {
        let envelope: PageEnvelope = serde_json::from_str("{}").unwrap();
        assert!(envelope.data.is_none());
        assert!(envelope.code.is_none());
    }

    #[test]
    fn url_type_field_is_renamed() {
        let info: RawUrlInfo =
            serde_json::from_str(r#"{"type": "wiki", "url": "http://example.com"}"#).unwrap();
        assert_eq!(info.kind.as_deref(), Some("wiki"));
    }
}
