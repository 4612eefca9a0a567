use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::Config;
use crate::error::{AppError, Result};

/// Display metadata for one mint as served by the catalog.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NftMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub collection: Option<NftCollection>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NftCollection {
    #[serde(default)]
    pub name: Option<String>,
}

/// Lookup of per-mint display metadata. Behind a trait so the enumerator
/// can be exercised without the remote catalog.
#[async_trait]
pub trait TokenCatalog: Send + Sync {
    /// Metadata for `mint`, or `None` when the catalog has no entry.
    async fn metadata(&self, mint: &str) -> Result<Option<NftMetadata>>;
}

/// `TokenCatalog` backed by the remote metadata HTTP API.
pub struct MetadataCatalog {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl MetadataCatalog {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.metadata_api_url.trim_end_matches('/').to_string(),
            api_key: config.metadata_api_key.clone(),
        })
    }

    fn token_url(&self, mint: &str) -> String {
        format!("{}/token/{}", self.base_url, mint)
    }
}

#[async_trait]
impl TokenCatalog for MetadataCatalog {
    async fn metadata(&self, mint: &str) -> Result<Option<NftMetadata>> {
        let mut request = self.client.get(self.token_url(mint));
        if let Some(key) = self.api_key.as_deref().filter(|key| !key.trim().is_empty()) {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "catalog returned {} for mint {}",
                response.status(),
                mint
            )));
        }

        let metadata = response
            .json::<NftMetadata>()
            .await
            .map_err(|e| AppError::ExternalApi(e.to_string()))?;
        Ok(Some(metadata))
    }
}
