use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, info, warn};
use tracing_subscriber::fmt::format::FmtSpan;

use netguardian::{
    DatabasePool, EnvSecretProvider, FileSecretProvider, FingerprintGenerator,
    InMemoryReputationStore, InMemoryScanSink, NetGuardConfig, ReputationStore, RiskScorer,
    ScanApiState, ScanOrchestrator, ScanSink, SecretCache, SecretProvider,
    SecurityMiddlewareConfig, SecurityState,
    api::{build_app, middleware::sanitize_for_log},
    config::SecretSource,
};

/// How often stale rate-limiter windows are dropped
const RATE_LIMIT_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first - validation errors stop startup
    let config = NetGuardConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {:#}", e);
        eprintln!("Please check NETGUARDIAN_* environment variables.");
        e
    })?;

    init_logging(&config)?;

    info!("Starting NetGuardian Wi-Fi risk service");

    let secret_cache = Arc::new(SecretCache::new(
        create_secret_provider(&config)?,
        config.secrets.hmac_secret_id.clone(),
    ));
    info!(
        "Fingerprint secret '{}' will be loaded on first scan ({:?} source)",
        sanitize_for_log(&config.secrets.hmac_secret_id),
        config.secrets.source
    );

    let (reputation, sink) = create_stores(&config).await?;

    let orchestrator = Arc::new(ScanOrchestrator::new(
        FingerprintGenerator::new(secret_cache),
        RiskScorer::new(config.scoring.to_policy()),
        reputation,
        sink,
    ));
    info!(
        "Scoring policy: bad reputation at seen>={} and high rate>={}",
        config.scoring.bad_reputation_min_seen, config.scoring.bad_reputation_min_high_rate
    );

    let security_state = SecurityState::new(SecurityMiddlewareConfig {
        rate_limit_per_minute: config.security.rate_limit_per_minute,
        max_request_size: config.security.max_request_size,
        log_requests: config.logging.log_requests,
        sanitize_logs: config.logging.sanitize_logs,
        trust_proxy_headers: config.security.trust_proxy_headers,
        exempt_paths: vec!["/health".to_string()],
    });
    spawn_rate_limit_cleanup(&security_state);

    let app = build_app(ScanApiState::new(orchestrator), security_state);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;

    info!("NetGuardian listening on {}", bind_addr);
    info!(
        "Security middleware: Rate limit={}/min, Max body={}KB",
        config.security.rate_limit_per_minute,
        config.security.max_request_size / 1024
    );

    // Serve with connect info for client IP extraction
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn init_logging(config: &NetGuardConfig) -> Result<()> {
    let log_level = match config.logging.level.to_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(if config.logging.log_requests {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        })
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    if config.logging.sanitize_logs {
        info!("Logging initialized with client IP sanitization");
    }

    Ok(())
}

fn create_secret_provider(config: &NetGuardConfig) -> Result<Arc<dyn SecretProvider>> {
    match config.secrets.source {
        SecretSource::Env => Ok(Arc::new(EnvSecretProvider)),
        SecretSource::File => {
            let dir = config
                .secrets
                .secret_dir
                .as_deref()
                .context("Secret directory is required for the file secret source")?;
            Ok(Arc::new(FileSecretProvider::new(dir)))
        }
    }
}

/// PostgreSQL stores when enabled, otherwise process-local ones
async fn create_stores(
    config: &NetGuardConfig,
) -> Result<(Arc<dyn ReputationStore>, Arc<dyn ScanSink>)> {
    if !config.storage.postgres_enabled {
        warn!("PostgreSQL disabled - reputation and scan history are kept in memory only");
        return Ok((
            Arc::new(InMemoryReputationStore::new()),
            Arc::new(InMemoryScanSink::new()),
        ));
    }

    let db = DatabasePool::new(
        &config.storage.postgres_url,
        config.storage.postgres_max_connections,
        &config.storage.reputation_table,
        &config.storage.scans_table,
    )
    .await
    .context("Failed to initialize PostgreSQL")?;
    db.init_schema()
        .await
        .context("Failed to initialize database schema")?;

    info!(
        "Using PostgreSQL tables: reputation={}, scans={}",
        config.storage.reputation_table, config.storage.scans_table
    );

    Ok((Arc::new(db.reputation().clone()), Arc::new(db.scans().clone())))
}

fn spawn_rate_limit_cleanup(security_state: &SecurityState) {
    let limiter = security_state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(RATE_LIMIT_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            limiter.cleanup();
        }
    });
}
