//! Scoring results returned to the caller

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::Fingerprint;

/// Coarse risk bucket derived from the numeric score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLabel {
    Low,
    Medium,
    High,
}

impl RiskLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLabel::Low => "LOW",
            RiskLabel::Medium => "MEDIUM",
            RiskLabel::High => "HIGH",
        }
    }

    pub fn is_high(&self) -> bool {
        matches!(self, RiskLabel::High)
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule identifiers, declared in rule-table order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    OpenWifi,
    WepWifi,
    NoClientIsolation,
    ArpSpoofSignals,
    DnsAnomaly,
    TlsIntercept,
    CaptivePortalOnOpenWifi,
    BadReputation,
}

impl ReasonCode {
    /// Score penalty applied when the rule fires
    pub const fn impact(&self) -> i32 {
        match self {
            ReasonCode::OpenWifi => -40,
            ReasonCode::WepWifi => -40,
            ReasonCode::NoClientIsolation => -15,
            ReasonCode::ArpSpoofSignals => -25,
            ReasonCode::DnsAnomaly => -20,
            ReasonCode::TlsIntercept => -35,
            ReasonCode::CaptivePortalOnOpenWifi => -5,
            ReasonCode::BadReputation => -10,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::OpenWifi => "OPEN_WIFI",
            ReasonCode::WepWifi => "WEP_WIFI",
            ReasonCode::NoClientIsolation => "NO_CLIENT_ISOLATION",
            ReasonCode::ArpSpoofSignals => "ARP_SPOOF_SIGNALS",
            ReasonCode::DnsAnomaly => "DNS_ANOMALY",
            ReasonCode::TlsIntercept => "TLS_INTERCEPT",
            ReasonCode::CaptivePortalOnOpenWifi => "CAPTIVE_PORTAL_ON_OPEN_WIFI",
            ReasonCode::BadReputation => "BAD_REPUTATION",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fired rule and its (negative) score impact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reason {
    pub code: ReasonCode,
    pub impact: i32,
}

impl From<ReasonCode> for Reason {
    fn from(code: ReasonCode) -> Self {
        Self {
            code,
            impact: code.impact(),
        }
    }
}

/// Result of scoring one scan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanOutcome {
    pub fingerprint: Fingerprint,
    /// 0..=100, higher is safer
    pub score: u8,
    pub risk_label: RiskLabel,
    /// At most three, most severe first
    pub reasons: Vec<Reason>,
    pub advice: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_serialization() {
        assert_eq!(serde_json::to_string(&RiskLabel::Medium).unwrap(), "\"MEDIUM\"");
        let label: RiskLabel = serde_json::from_str("\"HIGH\"").unwrap();
        assert!(label.is_high());
    }

    #[test]
    fn test_reason_code_wire_names_match_as_str() {
        let codes = [
            ReasonCode::OpenWifi,
            ReasonCode::WepWifi,
            ReasonCode::NoClientIsolation,
            ReasonCode::ArpSpoofSignals,
            ReasonCode::DnsAnomaly,
            ReasonCode::TlsIntercept,
            ReasonCode::CaptivePortalOnOpenWifi,
            ReasonCode::BadReputation,
        ];
        for code in codes {
            let wire = serde_json::to_string(&code).unwrap();
            assert_eq!(wire, format!("\"{}\"", code.as_str()));
            assert!(code.impact() < 0);
        }
    }

    #[test]
    fn test_reason_serializes_code_and_impact() {
        let reason = Reason::from(ReasonCode::TlsIntercept);
        let json = serde_json::to_value(reason).unwrap();
        assert_eq!(json["code"], "TLS_INTERCEPT");
        assert_eq!(json["impact"], -35);
    }
}
