//! Data models for scan requests and scan outcomes

pub mod network;
pub mod outcome;

pub use network::{CheckSignals, ClientMeta, NetworkObservation, ScanRequest};
pub use outcome::{Reason, ReasonCode, RiskLabel, ScanOutcome};
