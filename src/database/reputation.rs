//! Reputation Repository - PostgreSQL-backed reputation counters
//!
//! Increments are a single `INSERT ... ON CONFLICT DO UPDATE` statement that
//! adds to the stored columns, so PostgreSQL serializes concurrent updates to
//! the same row.

use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgPool;
use tracing::{debug, info};

use crate::crypto::Fingerprint;
use crate::error::{ScanError, ScanResult};
use crate::reputation::{ReputationCounter, ReputationStats, ReputationStore};

#[derive(Debug, Clone)]
pub struct PgReputationStore {
    pool: PgPool,
    table: String,
}

impl PgReputationStore {
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
        info!("Initializing reputation table {}...", self.table);

        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                fingerprint VARCHAR(64) PRIMARY KEY,
                seen BIGINT NOT NULL DEFAULT 0,
                high BIGINT NOT NULL DEFAULT 0,
                updated_at TIMESTAMP WITH TIME ZONE DEFAULT NOW(),
                CHECK (high >= 0 AND high <= seen)
            )
            "#,
            self.table
        ))
        .execute(&self.pool)
        .await
        .map_err(|e| ScanError::StoreUnavailable(format!("Failed to create reputation table: {}", e)))?;

        Ok(())
    }

    /// Stored counter row, if any
    pub async fn fetch_counter(&self, fingerprint: &Fingerprint) -> ScanResult<Option<ReputationCounter>> {
        let row = sqlx::query(&format!(
            "SELECT seen, high FROM {} WHERE fingerprint = $1",
            self.table
        ))
        .bind(fingerprint.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ScanError::StoreUnavailable(format!("Failed to get reputation: {}", e)))?;

        match row {
            Some(row) => {
                let seen: i64 = row.try_get("seen")?;
                let high: i64 = row.try_get("high")?;
                let (seen, high) = match (u64::try_from(seen), u64::try_from(high)) {
                    (Ok(seen), Ok(high)) if high <= seen => (seen, high),
                    _ => {
                        return Err(ScanError::StoreUnavailable(format!(
                            "corrupt reputation counter for {}: seen={}, high={}",
                            fingerprint, seen, high
                        )));
                    }
                };

                Ok(Some(ReputationCounter {
                    fingerprint: fingerprint.clone(),
                    seen,
                    high,
                }))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ReputationStore for PgReputationStore {
    async fn get(&self, fingerprint: &Fingerprint) -> ScanResult<ReputationStats> {
        Ok(self
            .fetch_counter(fingerprint)
            .await?
            .map(|counter| counter.stats())
            .unwrap_or(ReputationStats::UNSEEN))
    }

    async fn increment(&self, fingerprint: &Fingerprint, is_high: bool) -> ScanResult<()> {
        sqlx::query(&format!(
            r#"
            INSERT INTO {} AS r (fingerprint, seen, high, updated_at)
            VALUES ($1, 1, $2, NOW())
            ON CONFLICT (fingerprint) DO UPDATE SET
                seen = r.seen + 1,
                high = r.high + EXCLUDED.high,
                updated_at = NOW()
            "#,
            self.table
        ))
        .bind(fingerprint.as_str())
        .bind(i64::from(is_high))
        .execute(&self.pool)
        .await
        .map_err(|e| ScanError::StoreUnavailable(format!("Failed to increment reputation: {}", e)))?;

        debug!(fingerprint = %fingerprint, is_high, "Reputation incremented");
        Ok(())
    }
}
