use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use localshare_core::models::{PickedFile, StagedFile};
use localshare_core::AppError;
use localshare_preview::PreviewStore;
use uuid::Uuid;

/// Shared handle to the staging store: a single source of truth passed by
/// reference to the components that need it. Mutation goes through the
/// store's own operations only.
pub type SharedStagingStore = Arc<tokio::sync::Mutex<StagingStore>>;

/// Source of truth for files the user has selected but not yet uploaded.
///
/// The store exclusively owns the staged list and its preview references: a
/// preview is acquired when a file enters staging and released exactly once
/// when the file is removed or the store is cleared. The upload pipeline
/// only reads the list and requests clearing through `clear`.
pub struct StagingStore {
    previews: Arc<dyn PreviewStore>,
    files: Vec<StagedFile>,
}

impl StagingStore {
    pub fn new(previews: Arc<dyn PreviewStore>) -> Self {
        StagingStore {
            previews,
            files: Vec::new(),
        }
    }

    pub fn shared(previews: Arc<dyn PreviewStore>) -> SharedStagingStore {
        Arc::new(tokio::sync::Mutex::new(Self::new(previews)))
    }

    /// Stage new files, silently skipping `(name, size)` duplicates.
    ///
    /// Existing entries keep their order; new entries append in input order.
    /// Returns the number of files actually staged.
    pub async fn stage(&mut self, picked: Vec<PickedFile>) -> Result<usize, AppError> {
        let mut added = 0;

        for file in picked {
            let size = file.size();
            if self.files.iter().any(|staged| staged.matches(&file.name, size)) {
                tracing::debug!(name = %file.name, size_bytes = size, "Skipping duplicate staged file");
                continue;
            }

            let preview = self.previews.acquire(&file.name, &file.bytes).await?;
            self.files.push(StagedFile {
                id: Uuid::new_v4(),
                name: file.name,
                size,
                content_type: file.content_type,
                relative_path: file.relative_path,
                preview,
                bytes: file.bytes,
                staged_at: Utc::now(),
            });
            added += 1;
        }

        if added > 0 {
            tracing::info!(added, total = self.files.len(), "Staged files");
        }
        Ok(added)
    }

    /// Archive a folder selection and stage the resulting single file.
    ///
    /// Archiver failures surface before any network activity, as the same
    /// error branch an upload failure uses.
    pub async fn stage_folder(&mut self, entries: Vec<PickedFile>) -> Result<usize, AppError> {
        let archive = crate::archive::archive_folder(entries).await?;
        self.stage(vec![archive]).await
    }

    /// Remove staged entries by id, releasing each removed entry's preview
    /// exactly once. Unknown ids are no-ops; remaining order is preserved.
    pub async fn remove(&mut self, ids: &HashSet<Uuid>) -> Result<usize, AppError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut kept = Vec::with_capacity(self.files.len());
        let mut removed = Vec::new();
        for file in self.files.drain(..) {
            if ids.contains(&file.id) {
                removed.push(file);
            } else {
                kept.push(file);
            }
        }
        self.files = kept;

        for file in &removed {
            self.previews.release(&file.preview).await?;
        }

        if !removed.is_empty() {
            tracing::info!(
                removed = removed.len(),
                total = self.files.len(),
                "Removed staged files"
            );
        }
        Ok(removed.len())
    }

    /// Equivalent to removing every staged entry.
    pub async fn clear(&mut self) -> Result<usize, AppError> {
        let ids = self.ids();
        self.remove(&ids).await
    }

    pub fn files(&self) -> &[StagedFile] {
        &self.files
    }

    pub fn ids(&self) -> HashSet<Uuid> {
        self.files.iter().map(|file| file.id).collect()
    }

    pub fn get(&self, id: Uuid) -> Option<&StagedFile> {
        self.files.iter().find(|file| file.id == id)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use localshare_preview::MemoryPreviewStore;

    fn picked(name: &str, data: &'static [u8]) -> PickedFile {
        PickedFile::new(name, "text/plain", data)
    }

    fn fixture() -> (Arc<MemoryPreviewStore>, StagingStore) {
        let previews = Arc::new(MemoryPreviewStore::new());
        let store = StagingStore::new(previews.clone());
        (previews, store)
    }

    #[tokio::test]
    async fn test_stage_deduplicates_on_name_and_size() {
        let (previews, mut store) = fixture();

        store
            .stage(vec![picked("a.png", b"aaaa"), picked("b.png", b"bb")])
            .await
            .unwrap();
        // Same name and size as a.png: silently dropped. Same name but
        // different size: a distinct entry.
        let added = store
            .stage(vec![picked("a.png", b"zzzz"), picked("a.png", b"z")])
            .await
            .unwrap();

        assert_eq!(added, 1);
        assert_eq!(store.len(), 3);
        for (i, file) in store.files().iter().enumerate() {
            for other in store.files().iter().skip(i + 1) {
                assert!(!(file.name == other.name && file.size == other.size));
            }
        }
        assert_eq!(previews.live_count().await, 3);
    }

    #[tokio::test]
    async fn test_stage_preserves_order() {
        let (_, mut store) = fixture();

        store.stage(vec![picked("first.txt", b"1")]).await.unwrap();
        store
            .stage(vec![picked("second.txt", b"2"), picked("third.txt", b"3")])
            .await
            .unwrap();

        let names: Vec<&str> = store.files().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["first.txt", "second.txt", "third.txt"]);
    }

    #[tokio::test]
    async fn test_remove_releases_exactly_the_removed_previews() {
        let (previews, mut store) = fixture();

        store
            .stage(vec![
                picked("a.txt", b"a"),
                picked("b.txt", b"b"),
                picked("c.txt", b"c"),
            ])
            .await
            .unwrap();

        let keep = store.files()[1].id;
        let ids: HashSet<Uuid> = store
            .files()
            .iter()
            .filter(|f| f.id != keep)
            .map(|f| f.id)
            .collect();

        let removed = store.remove(&ids).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.files()[0].id, keep);
        assert_eq!(previews.released_count().await, 2);
        assert_eq!(previews.live_count().await, 1);
        assert!(previews.contains(&store.files()[0].preview.key).await);
    }

    #[tokio::test]
    async fn test_remove_unknown_id_is_noop() {
        let (previews, mut store) = fixture();
        store.stage(vec![picked("a.txt", b"a")]).await.unwrap();

        let mut ids = HashSet::new();
        ids.insert(Uuid::new_v4());
        let removed = store.remove(&ids).await.unwrap();

        assert_eq!(removed, 0);
        assert_eq!(store.len(), 1);
        assert_eq!(previews.released_count().await, 0);
    }

    #[tokio::test]
    async fn test_clear_releases_everything() {
        let (previews, mut store) = fixture();
        store
            .stage(vec![picked("a.txt", b"a"), picked("b.txt", b"b")])
            .await
            .unwrap();

        store.clear().await.unwrap();

        assert!(store.is_empty());
        assert_eq!(previews.live_count().await, 0);
        assert_eq!(previews.acquired_count().await, 2);
        assert_eq!(previews.released_count().await, 2);

        // Clearing an empty store is a no-op
        store.clear().await.unwrap();
        assert_eq!(previews.released_count().await, 2);
    }

    #[tokio::test]
    async fn test_live_previews_track_staged_entries() {
        let (previews, mut store) = fixture();

        store
            .stage(vec![picked("a.txt", b"a"), picked("b.txt", b"bb")])
            .await
            .unwrap();
        assert_eq!(previews.live_count().await, store.len());

        let first = store.files()[0].id;
        let mut ids = HashSet::new();
        ids.insert(first);
        store.remove(&ids).await.unwrap();
        assert_eq!(previews.live_count().await, store.len());

        store
            .stage(vec![picked("c.txt", b"ccc"), picked("a.txt", b"a")])
            .await
            .unwrap();
        assert_eq!(previews.live_count().await, store.len());

        store.clear().await.unwrap();
        assert_eq!(previews.live_count().await, 0);
    }

    #[tokio::test]
    async fn test_stage_folder_stages_single_archive() {
        let (_, mut store) = fixture();

        let entries = vec![
            PickedFile::new("1.txt", "text/plain", &b"one"[..]).with_relative_path("album/1.txt"),
            PickedFile::new("2.txt", "text/plain", &b"two"[..])
                .with_relative_path("album/sub/2.txt"),
        ];
        store.stage_folder(entries).await.unwrap();

        assert_eq!(store.len(), 1);
        let staged = &store.files()[0];
        assert_eq!(staged.name, "album.zip");
        assert_eq!(staged.content_type, "application/zip");
    }

    #[tokio::test]
    async fn test_stage_folder_empty_is_invalid_and_stages_nothing() {
        let (previews, mut store) = fixture();

        let err = store.stage_folder(Vec::new()).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(store.is_empty());
        assert_eq!(previews.acquired_count().await, 0);
    }
}
