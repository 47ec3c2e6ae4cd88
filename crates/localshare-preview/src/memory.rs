use crate::traits::{PreviewError, PreviewResult, PreviewStore};
use async_trait::async_trait;
use bytes::Bytes;
use localshare_core::models::PreviewHandle;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

/// In-memory preview store.
///
/// Holds preview bytes in a map behind `memory://` URLs. Besides serving as
/// a lightweight backend, it counts acquires and releases so tests can check
/// the no-leak invariant: live previews must always equal staged entries.
#[derive(Debug, Default)]
pub struct MemoryPreviewStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    live: HashMap<String, Bytes>,
    acquired: usize,
    released: usize,
}

impl MemoryPreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total acquires since construction.
    pub async fn acquired_count(&self) -> usize {
        self.inner.lock().await.acquired
    }

    /// Total successful releases since construction.
    pub async fn released_count(&self) -> usize {
        self.inner.lock().await.released
    }

    /// Whether a key is currently live.
    pub async fn contains(&self, key: &str) -> bool {
        self.inner.lock().await.live.contains_key(key)
    }
}

#[async_trait]
impl PreviewStore for MemoryPreviewStore {
    async fn acquire(&self, _name: &str, bytes: &Bytes) -> PreviewResult<PreviewHandle> {
        let key = Uuid::new_v4().to_string();
        let url = format!("memory://{}", key);

        let mut inner = self.inner.lock().await;
        inner.live.insert(key.clone(), bytes.clone());
        inner.acquired += 1;

        Ok(PreviewHandle { key, url })
    }

    async fn release(&self, handle: &PreviewHandle) -> PreviewResult<()> {
        let mut inner = self.inner.lock().await;
        if inner.live.remove(&handle.key).is_none() {
            return Err(PreviewError::NotFound(handle.key.clone()));
        }
        inner.released += 1;
        Ok(())
    }

    async fn live_count(&self) -> usize {
        self.inner.lock().await.live.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_acquire_release_counts() {
        let store = MemoryPreviewStore::new();

        let a = store
            .acquire("a.txt", &Bytes::from_static(b"a"))
            .await
            .unwrap();
        let b = store
            .acquire("b.txt", &Bytes::from_static(b"b"))
            .await
            .unwrap();

        assert_eq!(store.acquired_count().await, 2);
        assert_eq!(store.live_count().await, 2);
        assert!(store.contains(&a.key).await);

        store.release(&a).await.unwrap();
        assert_eq!(store.released_count().await, 1);
        assert_eq!(store.live_count().await, 1);
        assert!(!store.contains(&a.key).await);
        assert!(store.contains(&b.key).await);
    }

    #[tokio::test]
    async fn test_release_unknown_handle() {
        let store = MemoryPreviewStore::new();
        let handle = PreviewHandle {
            key: "missing".to_string(),
            url: "memory://missing".to_string(),
        };
        assert!(matches!(
            store.release(&handle).await,
            Err(PreviewError::NotFound(_))
        ));
        assert_eq!(store.released_count().await, 0);
    }
}
