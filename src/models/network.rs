//! Client-supplied network observations and security check signals

use serde::{Deserialize, Serialize};

/// Security modes penalized by the scorer
pub const SECURITY_OPEN: &str = "OPEN";
pub const SECURITY_WEP: &str = "WEP";

/// Network identity and advertised security as seen by the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkObservation {
    pub ssid: String,
    #[serde(default)]
    pub bssid: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    /// Free-form security mode (OPEN, WEP, WPA2, WPA3, ...)
    #[serde(default)]
    pub security: Option<String>,
}

impl NetworkObservation {
    pub fn new(ssid: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            bssid: None,
            country: None,
            security: None,
        }
    }

    pub fn with_bssid(mut self, bssid: impl Into<String>) -> Self {
        self.bssid = Some(bssid.into());
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_security(mut self, security: impl Into<String>) -> Self {
        self.security = Some(security.into());
        self
    }

    /// Upper-cased security mode, empty when not reported
    pub fn security_mode(&self) -> String {
        self.security.as_deref().unwrap_or_default().to_uppercase()
    }

    pub fn is_open(&self) -> bool {
        self.security_mode() == SECURITY_OPEN
    }

    pub fn is_wep(&self) -> bool {
        self.security_mode() == SECURITY_WEP
    }
}

/// Tri-state check results. `None` means the check was not evaluated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSignals {
    #[serde(default)]
    pub client_isolation: Option<bool>,
    #[serde(default)]
    pub arp_anomaly: Option<bool>,
    #[serde(default)]
    pub dns_anomaly: Option<bool>,
    #[serde(default)]
    pub tls_intercept: Option<bool>,
    #[serde(default)]
    pub captive_portal: Option<bool>,
}

impl CheckSignals {
    /// Client isolation was evaluated and found to be off
    pub fn isolation_disabled(&self) -> bool {
        self.client_isolation == Some(false)
    }

    pub fn arp_spoofing(&self) -> bool {
        self.arp_anomaly.unwrap_or(false)
    }

    pub fn dns_tampering(&self) -> bool {
        self.dns_anomaly.unwrap_or(false)
    }

    pub fn tls_interception(&self) -> bool {
        self.tls_intercept.unwrap_or(false)
    }

    pub fn behind_captive_portal(&self) -> bool {
        self.captive_portal.unwrap_or(false)
    }
}

/// Optional metadata about the reporting app
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientMeta {
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub app_version: Option<String>,
}

/// A single scan submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRequest {
    pub device_id: String,
    pub network: NetworkObservation,
    /// Required object; its individual checks may be omitted
    pub checks: CheckSignals,
    #[serde(default)]
    pub client: Option<ClientMeta>,
}
