//! Rule-based Wi-Fi risk scorer
//!
//! Starts every network at 100 and subtracts a fixed penalty for each rule
//! that fires. Pure and deterministic: no I/O, no shared state.

use serde::Serialize;

use crate::models::{CheckSignals, NetworkObservation, Reason, ReasonCode, RiskLabel};
use crate::reputation::{ReputationPolicy, ReputationStats};
use crate::scoring::advice::advice_for;

pub const MAX_SCORE: i32 = 100;
pub const MIN_SCORE: i32 = 0;

/// Lowest score labeled LOW
pub const LOW_RISK_MIN_SCORE: u8 = 80;
/// Lowest score labeled MEDIUM
pub const MEDIUM_RISK_MIN_SCORE: u8 = 50;

/// Reasons returned to the client
pub const MAX_REASONS: usize = 3;

/// Bucket a clamped score into a label (lower bounds inclusive)
pub fn label_for_score(score: u8) -> RiskLabel {
    if score >= LOW_RISK_MIN_SCORE {
        RiskLabel::Low
    } else if score >= MEDIUM_RISK_MIN_SCORE {
        RiskLabel::Medium
    } else {
        RiskLabel::High
    }
}

/// Scorer output, before it is bound to a fingerprint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub score: u8,
    pub label: RiskLabel,
    pub reasons: Vec<Reason>,
    pub advice: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RiskScorer {
    reputation: ReputationPolicy,
}

impl RiskScorer {
    pub fn new(reputation: ReputationPolicy) -> Self {
        Self { reputation }
    }

    pub fn policy(&self) -> &ReputationPolicy {
        &self.reputation
    }

    /// Every rule that fires, in rule-table order
    pub fn triggered_rules(
        &self,
        network: &NetworkObservation,
        checks: &CheckSignals,
        reputation: &ReputationStats,
    ) -> Vec<ReasonCode> {
        let open = network.is_open();
        let mut fired = Vec::new();

        if open {
            fired.push(ReasonCode::OpenWifi);
        } else if network.is_wep() {
            fired.push(ReasonCode::WepWifi);
        }
        if checks.isolation_disabled() {
            fired.push(ReasonCode::NoClientIsolation);
        }
        if checks.arp_spoofing() {
            fired.push(ReasonCode::ArpSpoofSignals);
        }
        if checks.dns_tampering() {
            fired.push(ReasonCode::DnsAnomaly);
        }
        if checks.tls_interception() {
            fired.push(ReasonCode::TlsIntercept);
        }
        // Only penalized on OPEN networks, WEP excluded
        if checks.behind_captive_portal() && open {
            fired.push(ReasonCode::CaptivePortalOnOpenWifi);
        }
        if self.reputation.is_bad(reputation) {
            fired.push(ReasonCode::BadReputation);
        }

        fired
    }

    pub fn score(
        &self,
        network: &NetworkObservation,
        checks: &CheckSignals,
        reputation: &ReputationStats,
    ) -> RiskAssessment {
        let fired = self.triggered_rules(network, checks, reputation);

        let total = fired
            .iter()
            .fold(MAX_SCORE, |score, code| score + code.impact());
        let score = total.clamp(MIN_SCORE, MAX_SCORE) as u8;
        let label = label_for_score(score);

        let mut reasons: Vec<Reason> = fired.into_iter().map(Reason::from).collect();
        // Stable: equal impacts keep rule-table order
        reasons.sort_by_key(|reason| reason.impact);
        reasons.truncate(MAX_REASONS);

        RiskAssessment {
            score,
            label,
            reasons,
            advice: advice_for(label).iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network(security: &str) -> NetworkObservation {
        NetworkObservation::new("TestNet").with_security(security)
    }

    fn codes(assessment: &RiskAssessment) -> Vec<ReasonCode> {
        assessment.reasons.iter().map(|r| r.code).collect()
    }

    #[test]
    fn test_clean_network_is_low_risk() {
        let result = RiskScorer::default().score(
            &network("WPA3"),
            &CheckSignals::default(),
            &ReputationStats::UNSEEN,
        );
        assert_eq!(result.score, 100);
        assert_eq!(result.label, RiskLabel::Low);
        assert!(result.reasons.is_empty());
        assert_eq!(result.advice.len(), 1);
    }

    #[test]
    fn test_open_network() {
        let result = RiskScorer::default().score(
            &network("OPEN"),
            &CheckSignals::default(),
            &ReputationStats::UNSEEN,
        );
        assert_eq!(result.score, 60);
        assert_eq!(result.label, RiskLabel::Medium);
        assert_eq!(result.reasons, vec![Reason::from(ReasonCode::OpenWifi)]);
        assert_eq!(result.advice.len(), 2);
    }

    #[test]
    fn test_lowercase_wep_is_penalized() {
        let result = RiskScorer::default().score(
            &network("wep"),
            &CheckSignals::default(),
            &ReputationStats::UNSEEN,
        );
        assert_eq!(result.score, 60);
        assert_eq!(codes(&result), vec![ReasonCode::WepWifi]);
    }

    #[test]
    fn test_interception_signals_sorted_by_impact() {
        let checks = CheckSignals {
            tls_intercept: Some(true),
            arp_anomaly: Some(true),
            dns_anomaly: Some(true),
            ..Default::default()
        };
        let result = RiskScorer::default().score(&network("WPA2"), &checks, &ReputationStats::UNSEEN);

        assert_eq!(result.score, 20);
        assert_eq!(result.label, RiskLabel::High);
        assert_eq!(
            codes(&result),
            vec![
                ReasonCode::TlsIntercept,
                ReasonCode::ArpSpoofSignals,
                ReasonCode::DnsAnomaly
            ]
        );
        assert_eq!(result.advice.len(), 3);
    }

    #[test]
    fn test_captive_portal_only_counts_on_open() {
        let checks = CheckSignals {
            captive_portal: Some(true),
            ..Default::default()
        };

        let open = RiskScorer::default().score(&network("OPEN"), &checks, &ReputationStats::UNSEEN);
        assert_eq!(open.score, 55);
        assert_eq!(open.label, RiskLabel::Medium);
        assert_eq!(
            codes(&open),
            vec![ReasonCode::OpenWifi, ReasonCode::CaptivePortalOnOpenWifi]
        );

        let wep = RiskScorer::default().score(&network("WEP"), &checks, &ReputationStats::UNSEEN);
        assert_eq!(wep.score, 60);
        assert_eq!(codes(&wep), vec![ReasonCode::WepWifi]);
    }

    #[test]
    fn test_client_isolation_needs_explicit_false() {
        let scorer = RiskScorer::default();
        let unknown = scorer.score(&network("WPA2"), &CheckSignals::default(), &ReputationStats::UNSEEN);
        assert_eq!(unknown.score, 100);

        let enabled = CheckSignals {
            client_isolation: Some(true),
            ..Default::default()
        };
        assert_eq!(
            scorer.score(&network("WPA2"), &enabled, &ReputationStats::UNSEEN).score,
            100
        );

        let disabled = CheckSignals {
            client_isolation: Some(false),
            ..Default::default()
        };
        let result = scorer.score(&network("WPA2"), &disabled, &ReputationStats::UNSEEN);
        assert_eq!(result.score, 85);
        assert_eq!(codes(&result), vec![ReasonCode::NoClientIsolation]);
    }

    #[test]
    fn test_bad_reputation_threshold() {
        let scorer = RiskScorer::default();
        let checks = CheckSignals::default();

        let bad = scorer.score(&network("WPA2"), &checks, &ReputationStats::new(30, 9));
        assert_eq!(bad.score, 90);
        assert_eq!(codes(&bad), vec![ReasonCode::BadReputation]);

        let ok = scorer.score(&network("WPA2"), &checks, &ReputationStats::new(30, 8));
        assert_eq!(ok.score, 100);
        assert!(ok.reasons.is_empty());
    }

    #[test]
    fn test_score_clamped_and_reasons_capped() {
        let checks = CheckSignals {
            client_isolation: Some(false),
            arp_anomaly: Some(true),
            dns_anomaly: Some(true),
            tls_intercept: Some(true),
            captive_portal: Some(true),
        };
        let result = RiskScorer::default().score(&network("open"), &checks, &ReputationStats::new(50, 50));

        // 100 - 40 - 15 - 25 - 20 - 35 - 5 - 10 < 0
        assert_eq!(result.score, 0);
        assert_eq!(result.label, RiskLabel::High);
        assert_eq!(result.reasons.len(), MAX_REASONS);
        assert_eq!(
            codes(&result),
            vec![
                ReasonCode::OpenWifi,
                ReasonCode::TlsIntercept,
                ReasonCode::ArpSpoofSignals
            ]
        );
        assert!(
            result
                .reasons
                .windows(2)
                .all(|pair| pair[0].impact <= pair[1].impact)
        );
    }

    #[test]
    fn test_equal_impacts_keep_rule_order() {
        let checks = CheckSignals {
            tls_intercept: Some(true),
            ..Default::default()
        };
        // WEP (-40) then TLS (-35); both OPEN/WEP share -40 but never co-occur
        let result = RiskScorer::default().score(&network("WEP"), &checks, &ReputationStats::UNSEEN);
        assert_eq!(codes(&result), vec![ReasonCode::WepWifi, ReasonCode::TlsIntercept]);
    }

    #[test]
    fn test_label_boundaries() {
        assert_eq!(label_for_score(100), RiskLabel::Low);
        assert_eq!(label_for_score(80), RiskLabel::Low);
        assert_eq!(label_for_score(79), RiskLabel::Medium);
        assert_eq!(label_for_score(50), RiskLabel::Medium);
        assert_eq!(label_for_score(49), RiskLabel::High);
        assert_eq!(label_for_score(0), RiskLabel::High);
    }

    #[test]
    fn test_custom_reputation_policy() {
        let scorer = RiskScorer::new(ReputationPolicy {
            min_seen: 5,
            min_high_rate: 0.5,
        });
        let result = scorer.score(&network("WPA2"), &CheckSignals::default(), &ReputationStats::new(6, 3));
        assert_eq!(codes(&result), vec![ReasonCode::BadReputation]);
    }
}
