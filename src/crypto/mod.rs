//! Cryptographic utilities
//!
//! - Keyed HMAC-SHA256 network fingerprints
//! - Lazy, explicitly constructed secret cache with pluggable providers

pub mod fingerprint;
pub mod secret;

pub use fingerprint::{Fingerprint, FingerprintGenerator, canonical_identity, fingerprint_with_key};
pub use secret::{
    EnvSecretProvider, FileSecretProvider, SecretCache, SecretProvider, StaticSecretProvider,
};
