use crate::traits::{PreviewError, PreviewResult, PreviewStore};
use async_trait::async_trait;
use bytes::Bytes;
use localshare_core::models::PreviewHandle;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Filesystem-backed preview store.
///
/// Spools preview bytes under a dedicated directory and hands out `file://`
/// URLs pointing at the spooled copies. Releasing a handle deletes its file.
pub struct LocalPreviewStore {
    spool_dir: PathBuf,
    live: Mutex<HashSet<String>>,
}

impl LocalPreviewStore {
    /// Create a new LocalPreviewStore instance
    ///
    /// # Arguments
    /// * `spool_dir` - Directory holding the spooled preview files
    pub async fn new(spool_dir: impl Into<PathBuf>) -> PreviewResult<Self> {
        let spool_dir = spool_dir.into();

        fs::create_dir_all(&spool_dir).await.map_err(|e| {
            PreviewError::AcquireFailed(format!(
                "Failed to create spool directory {}: {}",
                spool_dir.display(),
                e
            ))
        })?;

        Ok(LocalPreviewStore {
            spool_dir,
            live: Mutex::new(HashSet::new()),
        })
    }

    /// Convert a preview key to a spool path with security validation.
    ///
    /// Keys are generated internally, but handles flow through the UI; the
    /// key must not escape the spool directory.
    fn key_to_path(&self, key: &str) -> PreviewResult<PathBuf> {
        if key.contains("..") || key.contains('/') || key.contains('\\') {
            return Err(PreviewError::InvalidKey(
                "Preview key contains invalid characters".to_string(),
            ));
        }
        Ok(self.spool_dir.join(key))
    }

    /// Generate a unique spool key: a fresh UUID plus the file's base name.
    fn generate_key(name: &str) -> String {
        let base = Path::new(name)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|s| !s.is_empty() && *s != "." && *s != "..")
            .unwrap_or("preview");
        format!("{}-{}", Uuid::new_v4(), base)
    }

    fn generate_url(&self, key: &str) -> String {
        format!("file://{}", self.spool_dir.join(key).display())
    }
}

#[async_trait]
impl PreviewStore for LocalPreviewStore {
    async fn acquire(&self, name: &str, bytes: &Bytes) -> PreviewResult<PreviewHandle> {
        let key = Self::generate_key(name);
        let path = self.key_to_path(&key)?;
        let size = bytes.len();

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            PreviewError::AcquireFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(bytes).await.map_err(|e| {
            PreviewError::AcquireFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            PreviewError::AcquireFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        self.live.lock().await.insert(key.clone());

        let url = self.generate_url(&key);

        tracing::debug!(
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Preview spooled"
        );

        Ok(PreviewHandle { key, url })
    }

    async fn release(&self, handle: &PreviewHandle) -> PreviewResult<()> {
        let path = self.key_to_path(&handle.key)?;

        {
            let mut live = self.live.lock().await;
            if !live.remove(&handle.key) {
                return Err(PreviewError::NotFound(handle.key.clone()));
            }
        }

        fs::remove_file(&path).await.map_err(|e| {
            PreviewError::IoError(std::io::Error::new(
                e.kind(),
                format!("Failed to remove preview {}: {}", path.display(), e),
            ))
        })?;

        tracing::debug!(key = %handle.key, "Preview released");

        Ok(())
    }

    async fn live_count(&self) -> usize {
        self.live.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_acquire_spools_and_release_deletes() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalPreviewStore::new(dir.path()).await.unwrap();

        let bytes = Bytes::from_static(b"preview bytes");
        let handle = store.acquire("photo.png", &bytes).await.unwrap();

        assert!(handle.url.starts_with("file://"));
        assert!(handle.key.ends_with("photo.png"));
        assert_eq!(store.live_count().await, 1);

        let spooled = dir.path().join(&handle.key);
        assert_eq!(std::fs::read(&spooled).unwrap(), b"preview bytes");

        store.release(&handle).await.unwrap();
        assert_eq!(store.live_count().await, 0);
        assert!(!spooled.exists());
    }

    #[tokio::test]
    async fn test_double_release_is_a_caller_bug() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalPreviewStore::new(dir.path()).await.unwrap();

        let handle = store
            .acquire("a.txt", &Bytes::from_static(b"a"))
            .await
            .unwrap();
        store.release(&handle).await.unwrap();

        let err = store.release(&handle).await.unwrap_err();
        assert!(matches!(err, PreviewError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_same_name_gets_distinct_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalPreviewStore::new(dir.path()).await.unwrap();

        let a = store
            .acquire("dup.txt", &Bytes::from_static(b"one"))
            .await
            .unwrap();
        let b = store
            .acquire("dup.txt", &Bytes::from_static(b"two"))
            .await
            .unwrap();

        assert_ne!(a.key, b.key);
        assert_eq!(store.live_count().await, 2);
    }

    #[test]
    fn test_key_validation_rejects_traversal() {
        let store = LocalPreviewStore {
            spool_dir: PathBuf::from("/tmp/spool"),
            live: Mutex::new(HashSet::new()),
        };
        assert!(store.key_to_path("../escape").is_err());
        assert!(store.key_to_path("nested/key").is_err());
        assert!(store.key_to_path("plain-key").is_ok());
    }
}
