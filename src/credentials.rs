use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{Result, ThumbnailError};

/// Storage key for the persisted Google AI key.
pub const API_KEY_STORAGE_KEY: &str = "google-ai-api-key";

#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn get(&self) -> Option<String>;

    /// Replaces the stored key. Blank keys are rejected.
    async fn set(&self, key: &str) -> Result<()>;
}

fn validate_key(key: &str) -> Result<String> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(ThumbnailError::InvalidInput(
            "Please enter a valid API key.".into(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Hides all but the first four characters of a key for logging.
pub fn mask_key(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    format!("{}…({} chars)", visible, key.chars().count())
}

#[derive(Default)]
pub struct InMemoryCredentials {
    key: RwLock<Option<String>>,
}

impl InMemoryCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: RwLock::new(Some(key.into())),
        }
    }
}

#[async_trait]
impl CredentialProvider for InMemoryCredentials {
    async fn get(&self) -> Option<String> {
        self.key.read().await.clone()
    }

    async fn set(&self, key: &str) -> Result<()> {
        let key = validate_key(key)?;
        *self.key.write().await = Some(key);
        Ok(())
    }
}

/// Keeps the key in a small JSON file, read fresh on every `get`.
pub struct FileCredentialStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    async fn read_entries(&self) -> Result<HashMap<String, String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(HashMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(ThumbnailError::StorageError(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

#[async_trait]
impl CredentialProvider for FileCredentialStore {
    async fn get(&self) -> Option<String> {
        match self.read_entries().await {
            Ok(mut entries) => entries
                .remove(API_KEY_STORAGE_KEY)
                .filter(|key| !key.trim().is_empty()),
            Err(e) => {
                log::warn!("⚠️  Ignoring unreadable credential file: {}", e);
                None
            }
        }
    }

    async fn set(&self, key: &str) -> Result<()> {
        let key = validate_key(key)?;
        let _guard = self.write_lock.lock().await;

        // An unparseable file is left as-is rather than replaced.
        let mut entries = self.read_entries().await?;
        entries.insert(API_KEY_STORAGE_KEY.to_string(), key);
        let contents = serde_json::to_string_pretty(&entries)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ThumbnailError::StorageError(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        tokio::fs::write(&self.path, contents).await.map_err(|e| {
            ThumbnailError::StorageError(format!("Failed to write {}: {}", self.path.display(), e))
        })?;

        log::info!("🔑 API key saved to {}", self.path.display());
        Ok(())
    }
}

/// Falls back to a process-wide key when the inner provider has none.
pub struct EnvFallback {
    inner: Arc<dyn CredentialProvider>,
    fallback: Option<String>,
}

impl EnvFallback {
    pub fn new(inner: Arc<dyn CredentialProvider>, fallback: Option<String>) -> Self {
        Self { inner, fallback }
    }
}

#[async_trait]
impl CredentialProvider for EnvFallback {
    async fn get(&self) -> Option<String> {
        match self.inner.get().await {
            Some(key) => Some(key),
            None => self.fallback.clone(),
        }
    }

    async fn set(&self, key: &str) -> Result<()> {
        self.inner.set(key).await
    }
}
