//! Scan processing: orchestration and scan-history records

pub mod orchestrator;
pub mod record;

pub use orchestrator::{ScanOrchestrator, ScanReport};
pub use record::{InMemoryScanSink, ScanRecord, ScanSink};
