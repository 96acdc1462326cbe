use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::services::source::{extract_records, CatalogSource, SourceError, SourceKind};

/// Remote catalog API client
///
/// Fetches the full resource list from a JSON endpoint. The payload may be
/// a bare array or a wrapped document list; see [`extract_records`].
pub struct RemoteCatalogClient {
    url: String,
    api_key: Option<String>,
    client: Client,
}

impl RemoteCatalogClient {
    /// Create a new remote catalog client
    pub fn new(url: String, api_key: Option<String>, timeout_secs: u64) -> Result<Self, SourceError> {
        if url.trim().is_empty() {
            return Err(SourceError::NotConfigured("remote catalog URL is empty".into()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            url,
            api_key: api_key.filter(|k| !k.is_empty()),
            client,
        })
    }
}

#[async_trait]
impl CatalogSource for RemoteCatalogClient {
    fn kind(&self) -> SourceKind {
        SourceKind::Remote
    }

    async fn fetch(&self) -> Result<Vec<Value>, SourceError> {
        tracing::debug!("Fetching remote catalog from: {}", self.url);

        let mut request = self.client.get(&self.url).header("Accept", "application/json");
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Remote catalog fetch failed: {} - {}", status, body);
            return Err(SourceError::ApiError(format!(
                "Failed to fetch catalog: {}",
                status
            )));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| SourceError::InvalidResponse(format!("Body is not JSON: {}", e)))?;

        let records = extract_records(json)?;

        tracing::debug!("Fetched {} remote records", records.len());

        Ok(records)
    }
}
