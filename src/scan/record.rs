//! Scan history records and the append-only sink they are written to

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::crypto::Fingerprint;
use crate::error::ScanResult;
use crate::models::{CheckSignals, ClientMeta, NetworkObservation, RiskLabel, ScanRequest};

/// Audit snapshot of one scan. Written once, never read back by the scan path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub device_id: String,
    /// Unix seconds (UTC)
    pub ts: i64,
    pub fingerprint: Fingerprint,
    pub score: u8,
    pub risk_label: RiskLabel,
    pub network: NetworkObservation,
    pub checks: CheckSignals,
    /// Empty object when the client sent no metadata
    pub client: ClientMeta,
}

impl ScanRecord {
    pub fn new(
        request: &ScanRequest,
        fingerprint: Fingerprint,
        score: u8,
        risk_label: RiskLabel,
        ts: i64,
    ) -> Self {
        Self {
            device_id: request.device_id.clone(),
            ts,
            fingerprint,
            score,
            risk_label,
            network: request.network.clone(),
            checks: request.checks,
            client: request.client.clone().unwrap_or_default(),
        }
    }
}

/// Write-only destination for scan records
#[async_trait]
pub trait ScanSink: Send + Sync {
    async fn append(&self, record: &ScanRecord) -> ScanResult<()>;
}

/// Keeps records in process memory
#[derive(Debug, Default)]
pub struct InMemoryScanSink {
    records: RwLock<Vec<ScanRecord>>,
}

impl InMemoryScanSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Copy of all records in append order
    pub async fn records(&self) -> Vec<ScanRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl ScanSink for InMemoryScanSink {
    async fn append(&self, record: &ScanRecord) -> ScanResult<()> {
        self.records.write().await.push(record.clone());
        Ok(())
    }
}
