use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Keys under which catalogs commonly wrap their record array
const WRAPPER_KEYS: &[&str] = &["resources", "data", "results", "items", "documents"];

/// Errors that can occur while fetching raw catalog records
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read catalog file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Remote catalog returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Source not configured: {0}")]
    NotConfigured(String),
}

/// Which kind of catalog backend is in use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    File,
    Remote,
    #[serde(alias = "database")]
    Db,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::File => "file",
            SourceKind::Remote => "remote",
            SourceKind::Db => "db",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A backend that yields raw, not yet normalized, resource records
#[async_trait]
pub trait CatalogSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    async fn fetch(&self) -> Result<Vec<Value>, SourceError>;
}

/// Pull the record array out of a catalog payload
///
/// Accepts a bare array or an object wrapping the array under one of the
/// usual keys. Document-style entries that nest the record under `data`
/// are unwrapped.
pub fn extract_records(payload: Value) -> Result<Vec<Value>, SourceError> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut obj) => WRAPPER_KEYS
            .iter()
            .find_map(|k| match obj.remove(*k) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .ok_or_else(|| SourceError::InvalidResponse("Missing resource array".into()))?,
        other => {
            return Err(SourceError::InvalidResponse(format!(
                "Expected array or object, got {}",
                type_name(&other)
            )))
        }
    };

    Ok(items
        .into_iter()
        .map(|item| match item {
            Value::Object(mut doc) if matches!(doc.get("data"), Some(Value::Object(_))) => {
                doc.remove("data").unwrap_or(Value::Object(doc))
            }
            other => other,
        })
        .collect())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The static catalog file, used as seed data and universal fallback
#[derive(Debug, Clone)]
pub struct StaticFileSource {
    path: PathBuf,
}

impl StaticFileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl CatalogSource for StaticFileSource {
    fn kind(&self) -> SourceKind {
        SourceKind::File
    }

    async fn fetch(&self) -> Result<Vec<Value>, SourceError> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.display().to_string(),
                source,
            })?;

        let payload: Value = serde_json::from_str(&contents)?;
        let records = extract_records(payload)?;

        tracing::debug!("Read {} records from {}", records.len(), self.path.display());
        Ok(records)
    }
}

/// Stand-in for a configured source that could not be constructed
///
/// Every fetch fails with the construction error, which routes reads to
/// the static fallback while still reporting the configured kind.
#[derive(Debug, Clone)]
pub struct UnavailableSource {
    kind: SourceKind,
    reason: String,
}

impl UnavailableSource {
    pub fn new(kind: SourceKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl CatalogSource for UnavailableSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn fetch(&self) -> Result<Vec<Value>, SourceError> {
        Err(SourceError::NotConfigured(self.reason.clone()))
    }
}
