use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;

use crate::services::source::{CatalogSource, SourceError, SourceKind};

/// PostgreSQL-backed resource catalog
///
/// Each row of the `resources` table is read as a JSON object and handed to
/// the normalizer, so the table may use any of the column names the
/// normalizer understands.
pub struct PostgresCatalog {
    pool: PgPool,
}

impl PostgresCatalog {
    /// Create a catalog over a lazily connected pool
    ///
    /// No connection is attempted until the first fetch, so an unreachable
    /// database surfaces as a fetch error (and a static-file fallback)
    /// instead of a startup failure.
    pub fn new(database_url: &str, max_connections: u32, acquire_timeout_secs: u64) -> Result<Self, SourceError> {
        if database_url.trim().is_empty() {
            return Err(SourceError::NotConfigured("database URL is empty".into()));
        }

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(600))
            .connect_lazy(database_url)?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl CatalogSource for PostgresCatalog {
    fn kind(&self) -> SourceKind {
        SourceKind::Db
    }

    async fn fetch(&self) -> Result<Vec<Value>, SourceError> {
        let query = r#"
            SELECT row_to_json(r) AS record
            FROM resources r
        "#;

        let rows = sqlx::query(query).fetch_all(&self.pool).await?;

        let records = rows
            .iter()
            .map(|row| row.try_get::<Value, _>("record"))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Loaded {} records from PostgreSQL", records.len());

        Ok(records)
    }
}
