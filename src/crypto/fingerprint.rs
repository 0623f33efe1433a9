//! Keyed network fingerprints
//!
//! A fingerprint is `base64url(HMAC-SHA256(secret, "ssid|bssid|COUNTRY"))`
//! without padding. It is stable for a given secret and normalized identity,
//! and cannot be mapped back to the identity without the secret.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use std::sync::Arc;

use crate::crypto::secret::SecretCache;
use crate::error::{ScanError, ScanResult};
use crate::models::NetworkObservation;

type HmacSha256 = Hmac<Sha256>;

/// Separator between normalized identity fields
const FIELD_DELIMITER: char = '|';

/// Opaque join key for a network identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for Fingerprint {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whitespace stripped from identity fields: Unicode White_Space plus the
/// information separators U+001C..=U+001F
fn is_identity_whitespace(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

fn trim_identity(value: &str) -> &str {
    value.trim_matches(is_identity_whitespace)
}

/// Canonical message: trimmed lower-case ssid and bssid, trimmed upper-case
/// country, missing fields as empty strings
pub fn canonical_identity(ssid: &str, bssid: Option<&str>, country: Option<&str>) -> String {
    format!(
        "{}{d}{}{d}{}",
        trim_identity(ssid).to_lowercase(),
        trim_identity(bssid.unwrap_or_default()).to_lowercase(),
        trim_identity(country.unwrap_or_default()).to_uppercase(),
        d = FIELD_DELIMITER,
    )
}

/// Compute a fingerprint with an explicit key
pub fn fingerprint_with_key(
    key: &[u8],
    ssid: &str,
    bssid: Option<&str>,
    country: Option<&str>,
) -> ScanResult<Fingerprint> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| ScanError::SecretUnavailable(format!("invalid HMAC key: {}", e)))?;
    mac.update(canonical_identity(ssid, bssid, country).as_bytes());
    let digest = mac.finalize().into_bytes();
    Ok(Fingerprint(URL_SAFE_NO_PAD.encode(digest)))
}

/// Fingerprints network observations with the process secret
#[derive(Debug, Clone)]
pub struct FingerprintGenerator {
    secret: Arc<SecretCache>,
}

impl FingerprintGenerator {
    pub fn new(secret: Arc<SecretCache>) -> Self {
        Self { secret }
    }

    pub async fn fingerprint(
        &self,
        ssid: &str,
        bssid: Option<&str>,
        country: Option<&str>,
    ) -> ScanResult<Fingerprint> {
        let key = self.secret.get().await?;
        fingerprint_with_key(&key, ssid, bssid, country)
    }

    pub async fn fingerprint_network(&self, network: &NetworkObservation) -> ScanResult<Fingerprint> {
        self.fingerprint(
            &network.ssid,
            network.bssid.as_deref(),
            network.country.as_deref(),
        )
        .await
    }

    pub fn secret_cache(&self) -> &Arc<SecretCache> {
        &self.secret
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::secret::StaticSecretProvider;

    const KEY: &[u8] = b"test-secret";

    fn generator(secret: &str) -> FingerprintGenerator {
        let provider = Arc::new(StaticSecretProvider::new(secret.as_bytes().to_vec()));
        FingerprintGenerator::new(Arc::new(SecretCache::new(provider, "hmac")))
    }

    #[test]
    fn test_canonical_identity() {
        assert_eq!(
            canonical_identity("  CafeWifi ", Some(" AA:BB:CC:DD:EE:FF"), Some("ca ")),
            "cafewifi|aa:bb:cc:dd:ee:ff|CA"
        );
        assert_eq!(canonical_identity("Home", None, None), "home||");
    }

    #[test]
    fn test_separator_controls_are_trimmed() {
        assert_eq!(
            canonical_identity(
                "\u{1f}CafeWifi\u{1c}",
                Some("\u{1d}AA:BB\u{1e}"),
                Some("\u{a0}ca")
            ),
            "cafewifi|aa:bb|CA"
        );
        // Interior characters are kept
        assert_eq!(canonical_identity("a\u{1f}b", None, None), "a\u{1f}b||");

        let padded = fingerprint_with_key(
            KEY,
            "\u{1c}CafeWifi\u{1f}",
            Some("AA:BB:CC:DD:EE:FF"),
            Some("ca"),
        )
        .unwrap();
        assert_eq!(padded.as_str(), "nJHT5MvXkBHSm83tz_TudP_-y1Ej4lD8jYXP5XnCBSw");
    }

    #[test]
    fn test_known_vectors() {
        let fp = fingerprint_with_key(KEY, "CafeWifi", Some("AA:BB:CC:DD:EE:FF"), Some("ca")).unwrap();
        assert_eq!(fp.as_str(), "nJHT5MvXkBHSm83tz_TudP_-y1Ej4lD8jYXP5XnCBSw");

        let fp = fingerprint_with_key(KEY, "Home", None, None).unwrap();
        assert_eq!(fp.as_str(), "ZOncNxrfUW-9GZcFwwRtpEywmfL7F18GtHz4TWcdh-c");
    }

    #[test]
    fn test_normalization_variants_collide() {
        let a = fingerprint_with_key(KEY, "CafeWifi", Some("AA:BB:CC:DD:EE:FF"), Some("ca")).unwrap();
        let b = fingerprint_with_key(KEY, " cafewifi\t", Some("aa:bb:cc:dd:ee:ff "), Some(" CA")).unwrap();
        assert_eq!(a, b);

        // Missing and empty optional fields normalize identically
        let c = fingerprint_with_key(KEY, "Home", None, None).unwrap();
        let d = fingerprint_with_key(KEY, "Home", Some("  "), Some("")).unwrap();
        assert_eq!(c, d);
    }

    #[test]
    fn test_output_shape_and_no_plaintext() {
        let fp = fingerprint_with_key(KEY, "airportfree", Some("de:ad:be:ef:00:01"), Some("US")).unwrap();
        assert_eq!(fp.as_str().len(), 43);
        assert!(!fp.as_str().contains('='));
        assert!(
            fp.as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        assert!(!fp.as_str().to_lowercase().contains("airportfree"));
        assert!(!fp.as_str().contains("de:ad"));
    }

    #[test]
    fn test_different_secrets_differ() {
        let a = fingerprint_with_key(b"deployment-a", "Cafe", None, None).unwrap();
        let b = fingerprint_with_key(b"deployment-b", "Cafe", None, None).unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_generator_is_deterministic() {
        let generator = generator("test-secret");
        let net = NetworkObservation::new("CafeWifi")
            .with_bssid("AA:BB:CC:DD:EE:FF")
            .with_country("ca");

        let first = generator.fingerprint_network(&net).await.unwrap();
        let second = generator.fingerprint_network(&net).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.as_str(), "nJHT5MvXkBHSm83tz_TudP_-y1Ej4lD8jYXP5XnCBSw");
    }

    #[tokio::test]
    async fn test_generator_fails_without_secret() {
        let err = generator("").fingerprint("Cafe", None, None).await.unwrap_err();
        assert!(matches!(err, ScanError::SecretUnavailable(_)));
    }

    #[test]
    fn test_fingerprint_serializes_as_string() {
        let fp = Fingerprint::from("abc".to_string());
        assert_eq!(serde_json::to_string(&fp).unwrap(), "\"abc\"");
    }
}
