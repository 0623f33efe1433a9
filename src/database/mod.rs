//! PostgreSQL Database Module
//!
//! Provides the sqlx-backed reputation store and scan-record sink.

pub mod pool;
pub mod reputation;
pub mod scans;

pub use pool::DatabasePool;
pub use reputation::PgReputationStore;
pub use scans::PgScanSink;

/// Accepts `table` or `schema.table`, each part `[A-Za-z_][A-Za-z0-9_]*`.
///
/// Table names are interpolated into SQL, so anything else is rejected.
pub fn is_valid_table_name(name: &str) -> bool {
    let parts: Vec<&str> = name.split('.').collect();
    if parts.is_empty() || parts.len() > 2 {
        return false;
    }

    parts.iter().all(|part| {
        let mut chars = part.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() || first == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_name_validation() {
        assert!(is_valid_table_name("scans"));
        assert!(is_valid_table_name("network_reputation"));
        assert!(is_valid_table_name("netguardian.scans_v2"));
        assert!(is_valid_table_name("_private"));

        assert!(!is_valid_table_name(""));
        assert!(!is_valid_table_name("1scans"));
        assert!(!is_valid_table_name("a.b.c"));
        assert!(!is_valid_table_name("scans; DROP TABLE x"));
        assert!(!is_valid_table_name("scans."));
        assert!(!is_valid_table_name("sc-ans"));
    }
}
