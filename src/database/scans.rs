//! Scan Repository - append-only scan history in PostgreSQL

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use tracing::{debug, info};

use crate::error::{ScanError, ScanResult};
use crate::scan::{ScanRecord, ScanSink};

#[derive(Debug, Clone)]
pub struct PgScanSink {
    pool: PgPool,
    table: String,
}

impl PgScanSink {
    /// `table` must already be validated with
    /// [`is_valid_table_name`](crate::database::is_valid_table_name)
    pub fn new(pool: PgPool, table: impl Into<String>) -> Self {
        Self {
            pool,
            table: table.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub async fn init_schema(&self) -> ScanResult<()> {
        info!("Initializing scans table {}...", self.table);

        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                device_id VARCHAR(128) NOT NULL,
                ts BIGINT NOT NULL,
                fingerprint VARCHAR(64) NOT NULL,
                score SMALLINT NOT NULL,
                risk_label VARCHAR(8) NOT NULL,
                network JSONB NOT NULL,
                checks JSONB NOT NULL,
                client JSONB NOT NULL,
                created_at TIMESTAMP WITH TIME ZONE DEFAULT NOW()
            )
            "#,
            self.table
        ))
        .execute(&self.pool)
        .await
        .map_err(|e| ScanError::StoreUnavailable(format!("Failed to create scans table: {}", e)))?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{}_device_ts ON {}(device_id, ts)",
            self.table.replace('.', "_"),
            self.table
        ))
        .execute(&self.pool)
        .await
        .map_err(|e| ScanError::StoreUnavailable(format!("Failed to create scans index: {}", e)))?;

        Ok(())
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> ScanResult<serde_json::Value> {
    serde_json::to_value(value)
        .map_err(|e| ScanError::StoreUnavailable(format!("Failed to encode scan record: {}", e)))
}

#[async_trait]
impl ScanSink for PgScanSink {
    async fn append(&self, record: &ScanRecord) -> ScanResult<()> {
        sqlx::query(&format!(
            r#"
            INSERT INTO {}
            (device_id, ts, fingerprint, score, risk_label, network, checks, client)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
            self.table
        ))
        .bind(&record.device_id)
        .bind(record.ts)
        .bind(record.fingerprint.as_str())
        .bind(i16::from(record.score))
        .bind(record.risk_label.as_str())
        .bind(to_json(&record.network)?)
        .bind(to_json(&record.checks)?)
        .bind(to_json(&record.client)?)
        .execute(&self.pool)
        .await
        .map_err(|e| ScanError::StoreUnavailable(format!("Failed to write scan record: {}", e)))?;

        debug!(fingerprint = %record.fingerprint, ts = record.ts, "Scan record written");
        Ok(())
    }
}
