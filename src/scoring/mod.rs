//! Risk scoring
//!
//! | condition                               | impact | code                        |
//! |-----------------------------------------|--------|-----------------------------|
//! | security == OPEN                        | -40    | OPEN_WIFI                   |
//! | security == WEP                         | -40    | WEP_WIFI                    |
//! | client_isolation == false               | -15    | NO_CLIENT_ISOLATION         |
//! | arp_anomaly                             | -25    | ARP_SPOOF_SIGNALS           |
//! | dns_anomaly                             | -20    | DNS_ANOMALY                 |
//! | tls_intercept                           | -35    | TLS_INTERCEPT               |
//! | captive_portal && security == OPEN      | -5     | CAPTIVE_PORTAL_ON_OPEN_WIFI |
//! | seen >= 30 && high/seen >= 0.30         | -10    | BAD_REPUTATION              |

mod advice;
mod scorer;

pub use advice::advice_for;
pub use scorer::{
    LOW_RISK_MIN_SCORE, MAX_REASONS, MEDIUM_RISK_MIN_SCORE, RiskAssessment, RiskScorer,
    label_for_score,
};
