//! Scan Orchestrator
//!
//! Runs one scan through a fixed pipeline:
//!
//! ```text
//! fingerprint ─► read reputation ─► score ─► append record ─► increment reputation
//! ```
//!
//! Scoring uses the reputation snapshot taken before this scan is counted, and
//! that same snapshot is returned to the caller.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::crypto::FingerprintGenerator;
use crate::error::ScanResult;
use crate::models::{ScanOutcome, ScanRequest};
use crate::reputation::{ReputationStats, ReputationStore};
use crate::scan::record::{ScanRecord, ScanSink};
use crate::scoring::RiskScorer;

/// Outcome of one scan plus the reputation it was scored against
#[derive(Debug, Clone, PartialEq)]
pub struct ScanReport {
    pub outcome: ScanOutcome,
    /// Stats as read before this scan was recorded
    pub prior_reputation: ReputationStats,
}

pub struct ScanOrchestrator {
    fingerprints: FingerprintGenerator,
    scorer: RiskScorer,
    reputation: Arc<dyn ReputationStore>,
    sink: Arc<dyn ScanSink>,
}

impl ScanOrchestrator {
    pub fn new(
        fingerprints: FingerprintGenerator,
        scorer: RiskScorer,
        reputation: Arc<dyn ReputationStore>,
        sink: Arc<dyn ScanSink>,
    ) -> Self {
        Self {
            fingerprints,
            scorer,
            reputation,
            sink,
        }
    }

    pub fn scorer(&self) -> &RiskScorer {
        &self.scorer
    }

    pub fn fingerprints(&self) -> &FingerprintGenerator {
        &self.fingerprints
    }

    /// Process a validated scan request.
    ///
    /// Any failure aborts the remaining steps. A failed record write therefore
    /// leaves the reputation counter untouched.
    pub async fn process(&self, request: &ScanRequest) -> ScanResult<ScanReport> {
        let fingerprint = self
            .fingerprints
            .fingerprint_network(&request.network)
            .await
            .inspect_err(|e| error!("Fingerprinting failed: {}", e))?;

        let prior = self
            .reputation
            .get(&fingerprint)
            .await
            .inspect_err(|e| error!(fingerprint = %fingerprint, "Reputation read failed: {}", e))?;
        debug!(
            fingerprint = %fingerprint,
            seen = prior.seen,
            high = prior.high,
            "Loaded prior reputation"
        );

        let assessment = self
            .scorer
            .score(&request.network, &request.checks, &prior);

        let record = ScanRecord::new(
            request,
            fingerprint.clone(),
            assessment.score,
            assessment.label,
            Utc::now().timestamp(),
        );
        self.sink
            .append(&record)
            .await
            .inspect_err(|e| error!(fingerprint = %fingerprint, "Scan record write failed: {}", e))?;

        self.reputation
            .increment(&fingerprint, assessment.label.is_high())
            .await
            .inspect_err(|e| error!(fingerprint = %fingerprint, "Reputation update failed: {}", e))?;

        info!(
            fingerprint = %fingerprint,
            score = assessment.score,
            label = %assessment.label,
            reasons = assessment.reasons.len(),
            "Scan scored"
        );

        Ok(ScanReport {
            outcome: ScanOutcome {
                fingerprint,
                score: assessment.score,
                risk_label: assessment.label,
                reasons: assessment.reasons,
                advice: assessment.advice,
            },
            prior_reputation: prior,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{SecretCache, StaticSecretProvider};
    use crate::error::ScanError;
    use crate::models::{CheckSignals, NetworkObservation, RiskLabel};
    use crate::reputation::InMemoryReputationStore;
    use crate::scan::record::InMemoryScanSink;
    use async_trait::async_trait;

    struct FailingSink;

    #[async_trait]
    impl ScanSink for FailingSink {
        async fn append(&self, _record: &ScanRecord) -> ScanResult<()> {
            Err(ScanError::StoreUnavailable("sink offline".to_string()))
        }
    }

    fn generator(secret: &str) -> FingerprintGenerator {
        let provider = Arc::new(StaticSecretProvider::new(secret.as_bytes().to_vec()));
        FingerprintGenerator::new(Arc::new(SecretCache::new(provider, "hmac")))
    }

    fn open_network_request() -> ScanRequest {
        ScanRequest {
            device_id: "device-0001".to_string(),
            network: NetworkObservation::new("Cafe").with_security("OPEN"),
            checks: CheckSignals::default(),
            client: None,
        }
    }

    #[tokio::test]
    async fn test_scan_uses_pre_update_reputation() {
        let store = Arc::new(InMemoryReputationStore::new());
        let sink = Arc::new(InMemoryScanSink::new());
        let orchestrator =
            ScanOrchestrator::new(generator("s3cret"), RiskScorer::default(), store.clone(), sink.clone());

        let first = orchestrator.process(&open_network_request()).await.unwrap();
        assert_eq!(first.prior_reputation, ReputationStats::UNSEEN);
        assert_eq!(first.outcome.score, 60);
        assert_eq!(first.outcome.risk_label, RiskLabel::Medium);

        let second = orchestrator.process(&open_network_request()).await.unwrap();
        assert_eq!(second.prior_reputation, ReputationStats::new(1, 0));
        assert_eq!(second.outcome.fingerprint, first.outcome.fingerprint);

        let stats = store.get(&first.outcome.fingerprint).await.unwrap();
        assert_eq!(stats, ReputationStats::new(2, 0));
        assert_eq!(sink.len().await, 2);
    }

    #[tokio::test]
    async fn test_sink_failure_skips_reputation_update() {
        let store = Arc::new(InMemoryReputationStore::new());
        let orchestrator = ScanOrchestrator::new(
            generator("s3cret"),
            RiskScorer::default(),
            store.clone(),
            Arc::new(FailingSink),
        );

        let err = orchestrator.process(&open_network_request()).await.unwrap_err();
        assert!(matches!(err, ScanError::StoreUnavailable(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_missing_secret_aborts_before_storage() {
        let store = Arc::new(InMemoryReputationStore::new());
        let sink = Arc::new(InMemoryScanSink::new());
        let orchestrator =
            ScanOrchestrator::new(generator(""), RiskScorer::default(), store.clone(), sink.clone());

        let err = orchestrator.process(&open_network_request()).await.unwrap_err();
        assert!(matches!(err, ScanError::SecretUnavailable(_)));
        assert!(store.is_empty());
        assert!(sink.is_empty().await);
    }
}
