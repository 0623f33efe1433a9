use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use tracing::warn;

use crate::database::is_valid_table_name;
use crate::reputation::ReputationPolicy;

/// Environment variable prefix for every setting
pub const ENV_PREFIX: &str = "NETGUARDIAN_";

/// Configuration for the NetGuardian service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetGuardConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// HTTP security middleware configuration
    pub security: SecurityConfig,
    /// Reputation and scan-history storage
    pub storage: StorageConfig,
    /// Fingerprint secret source
    pub secrets: SecretConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Scoring policy
    pub scoring: ScoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Rate limit per minute per IP
    pub rate_limit_per_minute: u32,
    /// Maximum request body size in bytes
    pub max_request_size: usize,
    /// Read client IPs from forwarding headers (set only behind a trusted proxy)
    pub trust_proxy_headers: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Scan-record table identifier
    pub scans_table: String,
    /// Reputation table identifier
    pub reputation_table: String,
    /// PostgreSQL connection string
    pub postgres_url: String,
    /// Enable PostgreSQL (if false, uses in-memory fallback)
    pub postgres_enabled: bool,
    /// Pool size
    pub postgres_max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretSource {
    /// Environment variable named by the secret id
    Env,
    /// File named by the secret id inside `secret_dir`
    File,
}

impl FromStr for SecretSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "env" => Ok(SecretSource::Env),
            "file" => Ok(SecretSource::File),
            other => Err(anyhow::anyhow!(
                "Unknown secret source '{}' (expected 'env' or 'file')",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretConfig {
    /// Identifier of the HMAC fingerprint secret
    pub hmac_secret_id: String,
    pub source: SecretSource,
    /// Directory holding secret files (file source only)
    pub secret_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Mask client IPs in request logs
    pub sanitize_logs: bool,
    /// Enable request/response logging
    pub log_requests: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Observations needed before BAD_REPUTATION can fire
    pub bad_reputation_min_seen: u64,
    /// HIGH share at or above which BAD_REPUTATION fires
    pub bad_reputation_min_high_rate: f64,
}

impl ScoringConfig {
    pub fn to_policy(&self) -> ReputationPolicy {
        ReputationPolicy {
            min_seen: self.bad_reputation_min_seen,
            min_high_rate: self.bad_reputation_min_high_rate,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let policy = ReputationPolicy::default();
        Self {
            bad_reputation_min_seen: policy.min_seen,
            bad_reputation_min_high_rate: policy.min_high_rate,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            scans_table: "scans".to_string(),
            reputation_table: "network_reputation".to_string(),
            postgres_url: "postgresql://localhost:5432/netguardian".to_string(),
            postgres_enabled: false,
            postgres_max_connections: 10,
        }
    }
}

impl Default for NetGuardConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            security: SecurityConfig {
                rate_limit_per_minute: 120,
                max_request_size: 16 * 1024, // 16KB
                trust_proxy_headers: false,
            },
            storage: StorageConfig::default(),
            secrets: SecretConfig {
                hmac_secret_id: String::new(), // MUST be configured
                source: SecretSource::Env,
                secret_dir: None,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                sanitize_logs: true,
                log_requests: true,
            },
            scoring: ScoringConfig::default(),
        }
    }
}

/// Look up `NETGUARDIAN_<name>`
fn var(name: &str) -> Option<String> {
    env::var(format!("{}{}", ENV_PREFIX, name)).ok()
}

/// Parse `NETGUARDIAN_<name>` into `target` if it is set
fn parse_var<T>(name: &str, target: &mut T) -> Result<()>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(raw) = var(name) {
        *target = raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Invalid {}{} value", ENV_PREFIX, name))?;
    }
    Ok(())
}

impl NetGuardConfig {
    /// Load configuration from environment variables and validate it
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        // Server configuration
        if let Some(host) = var("HOST") {
            config.server.host = host;
        }
        parse_var("PORT", &mut config.server.port)?;

        // Security configuration
        parse_var(
            "RATE_LIMIT_PER_MINUTE",
            &mut config.security.rate_limit_per_minute,
        )?;
        parse_var("MAX_REQUEST_SIZE", &mut config.security.max_request_size)?;
        parse_var(
            "TRUST_PROXY_HEADERS",
            &mut config.security.trust_proxy_headers,
        )?;

        // Storage configuration
        if let Some(table) = var("SCANS_TABLE") {
            config.storage.scans_table = table;
        }
        if let Some(table) = var("REPUTATION_TABLE") {
            config.storage.reputation_table = table;
        }
        if let Some(url) = var("POSTGRES_URL") {
            config.storage.postgres_url = url;
        }
        parse_var("POSTGRES_ENABLED", &mut config.storage.postgres_enabled)?;
        parse_var(
            "POSTGRES_MAX_CONNECTIONS",
            &mut config.storage.postgres_max_connections,
        )?;

        // Secret configuration - the secret id is required
        config.secrets.hmac_secret_id = var("HMAC_SECRET_ID")
            .with_context(|| format!("{}HMAC_SECRET_ID environment variable is required", ENV_PREFIX))?;
        parse_var("SECRET_SOURCE", &mut config.secrets.source)?;
        config.secrets.secret_dir = var("SECRET_DIR");

        // Logging configuration
        if let Some(level) = var("LOG_LEVEL") {
            config.logging.level = level;
        }
        parse_var("SANITIZE_LOGS", &mut config.logging.sanitize_logs)?;
        parse_var("LOG_REQUESTS", &mut config.logging.log_requests)?;

        // Scoring configuration
        parse_var(
            "BAD_REPUTATION_MIN_SEEN",
            &mut config.scoring.bad_reputation_min_seen,
        )?;
        parse_var(
            "BAD_REPUTATION_MIN_HIGH_RATE",
            &mut config.scoring.bad_reputation_min_high_rate,
        )?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration for security and consistency
    pub fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            return Err(anyhow::anyhow!("Server host cannot be empty"));
        }

        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port must be non-zero"));
        }

        if self.security.rate_limit_per_minute == 0 {
            return Err(anyhow::anyhow!("Rate limit must be non-zero"));
        }

        if self.security.max_request_size == 0 {
            return Err(anyhow::anyhow!("Maximum request size must be non-zero"));
        }

        // Table names are interpolated into SQL
        for (label, table) in [
            ("scans", &self.storage.scans_table),
            ("reputation", &self.storage.reputation_table),
        ] {
            if !is_valid_table_name(table) {
                return Err(anyhow::anyhow!(
                    "Invalid {} table name '{}' (letters, digits and underscores, optional schema prefix)",
                    label,
                    table
                ));
            }
        }

        if self.storage.scans_table == self.storage.reputation_table {
            return Err(anyhow::anyhow!(
                "Scans and reputation tables must be different"
            ));
        }

        if self.storage.postgres_enabled {
            if self.storage.postgres_url.is_empty() {
                return Err(anyhow::anyhow!("PostgreSQL URL is required when PostgreSQL is enabled"));
            }
            if self.storage.postgres_max_connections == 0 {
                return Err(anyhow::anyhow!("PostgreSQL pool size must be non-zero"));
            }
        }

        if self.secrets.hmac_secret_id.trim().is_empty() {
            return Err(anyhow::anyhow!("HMAC secret id is required"));
        }

        if self.secrets.source == SecretSource::File && self.secrets.secret_dir.is_none() {
            return Err(anyhow::anyhow!(
                "{}SECRET_DIR is required when the secret source is 'file'",
                ENV_PREFIX
            ));
        }

        let rate = self.scoring.bad_reputation_min_high_rate;
        if !(0.0..=1.0).contains(&rate) {
            return Err(anyhow::anyhow!(
                "Bad reputation high-rate threshold must be within [0, 1], got {}",
                rate
            ));
        }

        if self.scoring.bad_reputation_min_seen == 0 {
            warn!("Bad reputation minimum sample size is 0 - a single HIGH scan can flag a network");
        }

        Ok(())
    }
}
