use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tracing::{debug, instrument, trace};

use longbox_core::error::{GatewayError, GatewayResult};
use longbox_core::ports::{CatalogSource, PageEnvelope, PageQuery};

pub const DEFAULT_BASE_URL: &str = "https://gateway.marvel.com";
const CHARACTERS_PATH: &str = "/v1/public/characters";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the catalog gateway.
#[derive(Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub public_key: String,
    pub private_key: String,
    pub timeout: Duration,
}

impl GatewayConfig {
    pub fn new(base_url: impl Into<String>, public_key: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            public_key: public_key.into(),
            private_key: private_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

// The private key must never reach the logs.
impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url)
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// HTTP client for the catalog gateway.
///
/// Every request carries the gateway's three signing parameters: a caller
/// chosen timestamp, the public key, and the md5 digest of
/// `timestamp + private key + public key`.
pub struct GatewayClient {
    http: reqwest::Client,
    config: GatewayConfig,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|error| GatewayError::RequestFailed(error.to_string()))?;
        debug!(base_url = %config.base_url, "Gateway client ready");
        Ok(Self { http, config })
    }

    fn auth_params(&self, timestamp: u64) -> [(&'static str, String); 3] {
        [
            ("ts", timestamp.to_string()),
            ("apikey", self.config.public_key.clone()),
            ("hash", sign(timestamp, &self.config.private_key, &self.config.public_key)),
        ]
    }

    async fn fetch_envelope(&self, path: &str, query: &[(&str, String)]) -> GatewayResult<PageEnvelope> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        let timestamp = unix_timestamp();
        trace!(%url, "Issuing gateway request");

        let response = self
            .http
            .get(&url)
            .query(&self.auth_params(timestamp))
            .query(query)
            .send()
            .await
            .map_err(|error| GatewayError::RequestFailed(error.to_string()))?
            .error_for_status()
            .map_err(|error| GatewayError::RequestFailed(error.to_string()))?;

        response
            .json::<PageEnvelope>()
            .await
            .map_err(|error| GatewayError::Decoding(error.to_string()))
    }
}

#[async_trait]
impl CatalogSource for GatewayClient {
    #[instrument(skip(self), fields(offset = query.offset, limit = query.limit))]
    async fn character_page(&self, query: PageQuery) -> GatewayResult<PageEnvelope> {
        let mut params = vec![
            ("offset", query.offset.to_string()),
            ("limit", query.limit.to_string()),
        ];
        if let Some(prefix) = &query.name_starts_with {
            params.push(("nameStartsWith", prefix.clone()));
        }
        self.fetch_envelope(CHARACTERS_PATH, &params).await
    }

    #[instrument(skip(self))]
    async fn character_by_id(&self, id: u64) -> GatewayResult<PageEnvelope> {
        self.fetch_envelope(&format!("{CHARACTERS_PATH}/{id}"), &[]).await
    }
}

/// Gateway request signature: `md5(ts + private_key + public_key)`.
fn sign(timestamp: u64, private_key: &str, public_key: &str) -> String {
    format!("{:x}", md5::compute(format!("{timestamp}{private_key}{public_key}")))
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Vecteur connu: md5("1" + "abcd" + "1234")
    #[test]
    fn signature_matches_known_vector() {
        assert_eq!(sign(1, "abcd", "1234"), "ffd275c5130566a2916217b101f26150");
    }

    #[test]
    fn auth_params_carry_timestamp_key_and_hash() {
        let client = GatewayClient::new(GatewayConfig::new(DEFAULT_BASE_URL, "1234", "abcd")).unwrap();
        let params = client.auth_params(1);
        assert_eq!(params[0], ("ts", "1".to_string()));
        assert_eq!(params[1], ("apikey", "1234".to_string()));
        assert_eq!(params[2], ("hash", "ffd275c5130566a2916217b101f26150".to_string()));
    }

    // Le binaire importe l'URL par défaut depuis la racine de la crate
    #[test]
    fn default_base_url_is_exported_at_crate_root() {
        assert_eq!(crate::DEFAULT_BASE_URL, "https://gateway.marvel.com");
    }

    #[test]
    fn debug_redacts_the_private_key() {
        let config = GatewayConfig::new(DEFAULT_BASE_URL, "public", "very-secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("very-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
