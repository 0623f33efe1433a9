//! Scan API endpoints
//!
//! Endpoints:
//!   POST /v1/scans -> Score a network and record the scan
//!   GET  /health   -> Liveness check

use axum::{
    Json, Router,
    extract::{FromRequest, Request, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::sync::Arc;
use tracing::warn;

use crate::error::{ScanError, ScanResult};
use crate::models::{Reason, RiskLabel, ScanRequest};
use crate::scan::{ScanOrchestrator, ScanReport};

// ============================================================================
// Request limits
// ============================================================================

pub const DEVICE_ID_MIN_LEN: usize = 8;
pub const DEVICE_ID_MAX_LEN: usize = 128;
pub const SSID_MAX_LEN: usize = 64;
pub const BSSID_MAX_LEN: usize = 32;
pub const COUNTRY_MAX_LEN: usize = 8;
pub const SECURITY_MAX_LEN: usize = 32;

// ============================================================================
// State
// ============================================================================

#[derive(Clone)]
pub struct ScanApiState {
    pub orchestrator: Arc<ScanOrchestrator>,
}

impl ScanApiState {
    pub fn new(orchestrator: Arc<ScanOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

// ============================================================================
// Response Types
// ============================================================================

/// Reputation as observed before this scan was counted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReputationSummary {
    pub seen_count: u64,
    /// Rounded to three decimals
    pub high_risk_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResponse {
    pub fingerprint: String,
    pub score: u8,
    pub risk_label: RiskLabel,
    pub top_reasons: Vec<Reason>,
    pub advice: Vec<String>,
    pub reputation: ReputationSummary,
}

impl From<ScanReport> for ScanResponse {
    fn from(report: ScanReport) -> Self {
        let ScanReport {
            outcome,
            prior_reputation,
        } = report;

        Self {
            fingerprint: outcome.fingerprint.into_inner(),
            score: outcome.score,
            risk_label: outcome.risk_label,
            top_reasons: outcome.reasons,
            advice: outcome.advice,
            reputation: ReputationSummary {
                seen_count: prior_reputation.seen,
                high_risk_rate: prior_reputation.rounded_high_rate(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl IntoResponse for ScanError {
    fn into_response(self) -> Response {
        let status = match &self {
            ScanError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ScanError::SecretUnavailable(_) | ScanError::StoreUnavailable(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let detail = match &self {
            ScanError::SecretUnavailable(msg)
            | ScanError::StoreUnavailable(msg)
            | ScanError::Validation(msg) => format!("{}: {}", self.kind(), msg),
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}

// ============================================================================
// Request Body
// ============================================================================

/// JSON body extractor whose rejections use the `{"detail": ...}` error shape.
///
/// Syntax, shape and content-type problems become [`ScanError::Validation`]
/// (422). Body buffering failures keep their own status, e.g. 413 when the
/// body exceeds the configured limit.
#[derive(Debug, Clone)]
pub struct ScanJson<T>(pub T);

impl<S, T> FromRequest<S> for ScanJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(json_rejection_response(rejection)),
        }
    }
}

fn json_rejection_response(rejection: JsonRejection) -> Response {
    match &rejection {
        JsonRejection::BytesRejection(_) => {
            warn!("Failed to read scan request body: {}", rejection.body_text());
            (
                rejection.status(),
                Json(ErrorResponse {
                    detail: rejection.body_text(),
                }),
            )
                .into_response()
        }
        _ => {
            warn!("Rejected malformed scan request: {}", rejection.body_text());
            ScanError::Validation(rejection.body_text()).into_response()
        }
    }
}

// ============================================================================
// Validation
// ============================================================================

fn check_len(field: &str, value: &str, min: usize, max: usize) -> ScanResult<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(ScanError::Validation(format!(
            "{} must be between {} and {} characters, got {}",
            field, min, max, len
        )));
    }
    Ok(())
}

/// Enforce field length limits on an incoming scan
pub fn validate_scan_request(request: &ScanRequest) -> ScanResult<()> {
    check_len(
        "device_id",
        &request.device_id,
        DEVICE_ID_MIN_LEN,
        DEVICE_ID_MAX_LEN,
    )?;

    let network = &request.network;
    check_len("network.ssid", &network.ssid, 1, SSID_MAX_LEN)?;
    if let Some(bssid) = &network.bssid {
        check_len("network.bssid", bssid, 0, BSSID_MAX_LEN)?;
    }
    if let Some(country) = &network.country {
        check_len("network.country", country, 0, COUNTRY_MAX_LEN)?;
    }
    if let Some(security) = &network.security {
        check_len("network.security", security, 0, SECURITY_MAX_LEN)?;
    }

    Ok(())
}

// ============================================================================
// API Handlers
// ============================================================================

/// Score a network and record the scan
pub async fn post_scan(
    State(state): State<ScanApiState>,
    ScanJson(request): ScanJson<ScanRequest>,
) -> Result<Json<ScanResponse>, ScanError> {
    if let Err(e) = validate_scan_request(&request) {
        warn!("Rejected scan request: {}", e);
        return Err(e);
    }

    let report = state.orchestrator.process(&request).await?;
    Ok(Json(report.into()))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

/// Create the scan API router
pub fn create_router(state: ScanApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/scans", post(post_scan))
        .with_state(state)
}
