//! End-to-end staging flow: stage, select, batch-remove, and check the
//! preview lifecycle invariant along the way.

use std::sync::Arc;

use localshare_core::models::PickedFile;
use localshare_preview::{MemoryPreviewStore, PreviewStore};
use localshare_services::{Selection, StagingStore};

fn picked(name: &str, data: &'static [u8]) -> PickedFile {
    PickedFile::new(name, "image/png", data)
}

#[tokio::test]
async fn test_select_and_batch_remove() {
    let previews = Arc::new(MemoryPreviewStore::new());
    let mut store = StagingStore::new(previews.clone());
    let mut selection = Selection::new();

    store
        .stage(vec![
            picked("one.png", b"1"),
            picked("two.png", b"22"),
            picked("three.png", b"333"),
        ])
        .await
        .unwrap();

    let ids: Vec<_> = store.files().iter().map(|f| f.id).collect();
    let removed_keys: Vec<String> = [0, 2]
        .iter()
        .map(|&i| store.files()[i].preview.key.clone())
        .collect();

    // Select the first and third entries, then batch-remove
    selection.toggle(ids[0]);
    selection.toggle(ids[2]);
    let removed = selection.remove_selected(&mut store).await.unwrap();

    assert_eq!(removed, 2);
    assert_eq!(store.len(), 1);
    assert_eq!(store.files()[0].id, ids[1]);
    assert_eq!(store.files()[0].name, "two.png");

    // The removed previews are gone, the survivor's is live
    for key in &removed_keys {
        assert!(!previews.contains(key).await);
    }
    assert!(previews.contains(&store.files()[0].preview.key).await);
    assert_eq!(previews.released_count().await, 2);
    assert_eq!(previews.live_count().await, 1);

    // Selection was pruned in the same step
    assert!(selection.selected().is_empty());
}

#[tokio::test]
async fn test_repeated_staging_never_leaks_previews() {
    let previews = Arc::new(MemoryPreviewStore::new());
    let mut store = StagingStore::new(previews.clone());

    for round in 0..3 {
        store
            .stage(vec![
                picked("a.png", b"aa"),
                picked("b.png", b"bbb"),
                picked("a.png", b"aa"),
            ])
            .await
            .unwrap();
        assert_eq!(previews.live_count().await, store.len(), "round {}", round);

        store.clear().await.unwrap();
        assert_eq!(previews.live_count().await, 0, "round {}", round);
    }

    assert_eq!(previews.acquired_count().await, previews.released_count().await);
}
