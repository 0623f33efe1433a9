//! Database Connection Pool using sqlx

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::database::is_valid_table_name;
use crate::database::reputation::PgReputationStore;
use crate::database::scans::PgScanSink;
use crate::error::{ScanError, ScanResult};

pub struct DatabasePool {
    pool: PgPool,
    reputation: PgReputationStore,
    scans: PgScanSink,
}

impl DatabasePool {
    pub async fn new(
        connection_string: &str,
        max_connections: u32,
        reputation_table: &str,
        scans_table: &str,
    ) -> ScanResult<Self> {
        for table in [reputation_table, scans_table] {
            if !is_valid_table_name(table) {
                return Err(ScanError::StoreUnavailable(format!(
                    "invalid table name: {}",
                    table
                )));
            }
        }

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(connection_string)
            .await
            .map_err(|e| {
                ScanError::StoreUnavailable(format!("Failed to connect to PostgreSQL: {}", e))
            })?;

        info!("Connected to PostgreSQL");

        let reputation = PgReputationStore::new(pool.clone(), reputation_table);
        let scans = PgScanSink::new(pool.clone(), scans_table);

        Ok(Self {
            pool,
            reputation,
            scans,
        })
    }

    pub async fn init_schema(&self) -> ScanResult<()> {
        info!("Initializing database schema...");

        self.reputation.init_schema().await?;
        self.scans.init_schema().await?;

        info!("Database schema initialized");
        Ok(())
    }

    pub fn reputation(&self) -> &PgReputationStore {
        &self.reputation
    }

    pub fn scans(&self) -> &PgScanSink {
        &self.scans
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
