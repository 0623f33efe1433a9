//! Fixed user advice per risk label

use crate::models::RiskLabel;

const HIGH_RISK_ADVICE: &[&str] = &[
    "Avoid logging into banking/email/work accounts on this Wi-Fi.",
    "Use a VPN or switch to mobile hotspot if possible.",
    "Avoid entering passwords; prefer HTTPS-only browsing.",
];

const MEDIUM_RISK_ADVICE: &[&str] = &[
    "Use a VPN before sensitive logins.",
    "Avoid financial activity unless you trust the network.",
];

const LOW_RISK_ADVICE: &[&str] = &["Lower risk based on checks. Still prefer HTTPS; VPN is optional."];

pub fn advice_for(label: RiskLabel) -> &'static [&'static str] {
    match label {
        RiskLabel::High => HIGH_RISK_ADVICE,
        RiskLabel::Medium => MEDIUM_RISK_ADVICE,
        RiskLabel::Low => LOW_RISK_ADVICE,
    }
}
