//! Fingerprint secret retrieval and caching
//!
//! The HMAC secret is fetched lazily from a [`SecretProvider`] the first time a
//! fingerprint is requested, then held by a [`SecretCache`] for the life of the
//! process. The cache is constructed explicitly at startup and injected into
//! the fingerprint generator; rotation goes through [`SecretCache::invalidate`].

use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{ScanError, ScanResult};

/// Source of raw secret bytes, addressed by secret identifier
#[async_trait]
pub trait SecretProvider: Send + Sync {
    async fn fetch_secret(&self, secret_id: &str) -> ScanResult<Vec<u8>>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Reads the secret from the environment variable named by the secret id
#[derive(Debug, Default, Clone)]
pub struct EnvSecretProvider;

#[async_trait]
impl SecretProvider for EnvSecretProvider {
    async fn fetch_secret(&self, secret_id: &str) -> ScanResult<Vec<u8>> {
        std::env::var(secret_id)
            .map(String::into_bytes)
            .map_err(|e| ScanError::SecretUnavailable(format!("{}: {}", secret_id, e)))
    }

    fn name(&self) -> &'static str {
        "env"
    }
}

/// Reads the secret from `<dir>/<secret id>`, trailing newline stripped
#[derive(Debug, Clone)]
pub struct FileSecretProvider {
    dir: PathBuf,
}

impl FileSecretProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl SecretProvider for FileSecretProvider {
    async fn fetch_secret(&self, secret_id: &str) -> ScanResult<Vec<u8>> {
        let path = self.dir.join(secret_id);
        let mut bytes = tokio::fs::read(&path).await.map_err(|e| {
            ScanError::SecretUnavailable(format!("failed to read {}: {}", path.display(), e))
        })?;

        while matches!(bytes.last(), Some(b'\n' | b'\r')) {
            bytes.pop();
        }
        Ok(bytes)
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

/// Fixed in-process secret (tests and local development)
#[derive(Clone)]
pub struct StaticSecretProvider {
    secret: Vec<u8>,
}

impl StaticSecretProvider {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for StaticSecretProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticSecretProvider")
            .field("secret", &"[redacted]")
            .finish()
    }
}

#[async_trait]
impl SecretProvider for StaticSecretProvider {
    async fn fetch_secret(&self, _secret_id: &str) -> ScanResult<Vec<u8>> {
        Ok(self.secret.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Lazily populated, process-wide copy of the fingerprint secret
pub struct SecretCache {
    provider: Arc<dyn SecretProvider>,
    secret_id: String,
    cached: RwLock<Option<Arc<[u8]>>>,
}

impl SecretCache {
    pub fn new(provider: Arc<dyn SecretProvider>, secret_id: impl Into<String>) -> Self {
        Self {
            provider,
            secret_id: secret_id.into(),
            cached: RwLock::new(None),
        }
    }

    /// Return the cached secret, fetching it on first use.
    ///
    /// An empty secret is treated as unavailable. Failures are not cached, so
    /// the next call fetches again.
    pub async fn get(&self) -> ScanResult<Arc<[u8]>> {
        if let Some(secret) = self.cached.read().await.as_ref() {
            return Ok(secret.clone());
        }

        let mut slot = self.cached.write().await;
        // Another task may have filled the slot while we waited for the lock
        if let Some(secret) = slot.as_ref() {
            return Ok(secret.clone());
        }

        debug!(
            "Fetching fingerprint secret '{}' from {} provider",
            self.secret_id,
            self.provider.name()
        );
        let bytes = self.provider.fetch_secret(&self.secret_id).await?;
        if bytes.is_empty() {
            warn!("Fingerprint secret '{}' is empty", self.secret_id);
            return Err(ScanError::SecretUnavailable(format!(
                "secret '{}' is empty",
                self.secret_id
            )));
        }

        let secret: Arc<[u8]> = Arc::from(bytes);
        *slot = Some(secret.clone());
        info!("Fingerprint secret loaded ({} bytes)", secret.len());
        Ok(secret)
    }

    /// Drop the cached secret so the next [`get`](Self::get) refetches it
    pub async fn invalidate(&self) {
        let mut slot = self.cached.write().await;
        if slot.take().is_some() {
            info!("Fingerprint secret '{}' invalidated", self.secret_id);
        }
    }

    pub async fn is_loaded(&self) -> bool {
        self.cached.read().await.is_some()
    }

    pub fn secret_id(&self) -> &str {
        &self.secret_id
    }
}

impl fmt::Debug for SecretCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretCache")
            .field("provider", &self.provider.name())
            .field("secret_id", &self.secret_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts fetches and returns a different secret each time
    struct CountingProvider {
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl SecretProvider for CountingProvider {
        async fn fetch_secret(&self, _secret_id: &str) -> ScanResult<Vec<u8>> {
            let n = self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(format!("secret-{}", n).into_bytes())
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    #[tokio::test]
    async fn test_cache_fetches_once() {
        let provider = Arc::new(CountingProvider {
            fetches: AtomicUsize::new(0),
        });
        let cache = SecretCache::new(provider.clone(), "hmac");

        assert!(!cache.is_loaded().await);
        let first = cache.get().await.unwrap();
        let second = cache.get().await.unwrap();

        assert_eq!(&*first, b"secret-0");
        assert_eq!(first, second);
        assert_eq!(provider.fetches.load(Ordering::SeqCst), 1);
        assert!(cache.is_loaded().await);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let provider = Arc::new(CountingProvider {
            fetches: AtomicUsize::new(0),
        });
        let cache = SecretCache::new(provider.clone(), "hmac");

        cache.get().await.unwrap();
        cache.invalidate().await;
        let rotated = cache.get().await.unwrap();

        assert_eq!(&*rotated, b"secret-1");
        assert_eq!(provider.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_secret_is_unavailable() {
        let cache = SecretCache::new(Arc::new(StaticSecretProvider::new(Vec::new())), "hmac");
        let err = cache.get().await.unwrap_err();
        assert!(matches!(err, ScanError::SecretUnavailable(_)));
        assert!(!cache.is_loaded().await);
    }

    #[tokio::test]
    async fn test_missing_env_var_is_unavailable() {
        let err = EnvSecretProvider
            .fetch_secret("NETGUARDIAN_TEST_SECRET_THAT_IS_NEVER_SET")
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::SecretUnavailable(_)));
    }

    #[tokio::test]
    async fn test_file_provider_strips_newline() {
        let dir = std::env::temp_dir().join(format!("netguardian-secret-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join("hmac"), b"file-secret\n").await.unwrap();

        let provider = FileSecretProvider::new(&dir);
        assert_eq!(provider.fetch_secret("hmac").await.unwrap(), b"file-secret");

        let missing = provider.fetch_secret("absent").await.unwrap_err();
        assert!(matches!(missing, ScanError::SecretUnavailable(_)));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[test]
    fn test_static_provider_debug_is_redacted() {
        let rendered = format!("{:?}", StaticSecretProvider::new("hunter2"));
        assert!(!rendered.contains("hunter2"));
    }
}
