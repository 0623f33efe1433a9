//! NetGuardian
//!
//! Wi-Fi risk scoring service. Clients submit the security signals they
//! collected for a network; the service returns a score, a risk label, ranked
//! reasons and advice, and folds the result into a per-network reputation
//! counter keyed by an HMAC fingerprint.
//!
//! ## Module Structure
//!
//! ```text
//! src/
//! ├── lib.rs          - Crate root with re-exports
//! ├── main.rs         - Server entrypoint
//! ├── config.rs       - Environment configuration
//! ├── error.rs        - ScanError taxonomy
//! ├── models/         - Requests, check signals, outcomes
//! ├── crypto/         - Keyed fingerprints and secret cache
//! ├── scoring/        - Rule-based risk scorer and advice
//! ├── reputation/     - Reputation stats, policy, store contract
//! ├── scan/           - Scan orchestrator and scan records
//! ├── database/       - PostgreSQL reputation store and scan sink
//! └── api/            - HTTP endpoints and security middleware
//! ```

pub mod api;
pub mod config;
pub mod crypto;
pub mod database;
pub mod error;
pub mod models;
pub mod reputation;
pub mod scan;
pub mod scoring;

// Re-export main types for convenience
pub use config::NetGuardConfig;
pub use crypto::{
    EnvSecretProvider, FileSecretProvider, Fingerprint, FingerprintGenerator, SecretCache,
    SecretProvider, StaticSecretProvider,
};
pub use database::{DatabasePool, PgReputationStore, PgScanSink};
pub use error::{ScanError, ScanResult};
pub use models::{
    CheckSignals, ClientMeta, NetworkObservation, Reason, ReasonCode, RiskLabel, ScanOutcome,
    ScanRequest,
};
pub use reputation::{
    InMemoryReputationStore, ReputationCounter, ReputationPolicy, ReputationStats,
    ReputationStore,
};
pub use scan::{InMemoryScanSink, ScanOrchestrator, ScanRecord, ScanReport, ScanSink};
pub use scoring::{RiskAssessment, RiskScorer};

// Re-export API types
pub use api::{ScanApiState, ScanResponse, SecurityMiddlewareConfig, SecurityState};
