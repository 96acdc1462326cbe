use serde::{Deserialize, Serialize};
use crate::models::domain::{MatchResult, Resource};

/// Response for the match endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResponse {
    pub results: Vec<MatchResult>,
    pub count: usize,
}

/// Response for the catalog refresh endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub success: bool,
    pub count: usize,
    pub source: String,
    #[serde(rename = "loadedAt")]
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

/// Response for the catalog listing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub resources: Vec<Resource>,
    pub count: usize,
}

/// Cache freshness as reported by the health endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheFreshness {
    pub fresh: bool,
    #[serde(rename = "loadedAt")]
    pub loaded_at: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "ageSecs")]
    pub age_secs: u64,
    #[serde(rename = "ttlSecs")]
    pub ttl_secs: u64,
    /// Snapshots currently held by the cache
    pub entries: u64,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "catalogSize")]
    pub catalog_size: usize,
    pub source: String,
    pub cache: CacheFreshness,
    #[serde(rename = "fellBack")]
    pub fell_back: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
