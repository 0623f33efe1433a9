//! Community Reputation
//!
//! Aggregates, per network fingerprint, how often the network was scanned and
//! how often it scored HIGH risk. Only fingerprints are stored, never raw
//! network identifiers.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐  get (pre-scan)   ┌──────────────────────┐
//! │ ScanOrchestrator │──────────────────►│ ReputationStore      │
//! │                  │  increment        │ (in-memory / sqlx)   │
//! └──────────────────┘──────────────────►└──────────────────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │ ReputationPolicy │  seen >= 30 && high/seen >= 0.30
//! └──────────────────┘
//! ```

mod stats;
mod store;

pub use stats::{ReputationCounter, ReputationPolicy, ReputationStats};
pub use store::{InMemoryReputationStore, ReputationStore};
