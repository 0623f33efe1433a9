//! Error taxonomy for scan processing
//!
//! Every failure the core can surface maps onto one of three variants. Store
//! and secret failures are propagated to the caller as-is; the core never
//! swaps them for defaults.

use thiserror::Error;

/// Errors raised while fingerprinting, scoring or recording a scan
#[derive(Debug, Error)]
pub enum ScanError {
    /// The fingerprint secret could not be obtained
    #[error("secret unavailable: {0}")]
    SecretUnavailable(String),

    /// A reputation read/increment or scan-record write failed
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Malformed request, rejected at the transport boundary
    #[error("validation failed: {0}")]
    Validation(String),
}

impl ScanError {
    /// Stable prefix used in HTTP error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            ScanError::SecretUnavailable(_) => "fingerprint_error",
            ScanError::StoreUnavailable(_) => "store_error",
            ScanError::Validation(_) => "validation_error",
        }
    }

    pub fn is_server_error(&self) -> bool {
        !matches!(self, ScanError::Validation(_))
    }
}

impl From<sqlx::Error> for ScanError {
    fn from(err: sqlx::Error) -> Self {
        ScanError::StoreUnavailable(err.to_string())
    }
}

pub type ScanResult<T> = Result<T, ScanError>;
