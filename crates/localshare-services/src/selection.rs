//! Selection/preview controller
//!
//! Pure coordination over the staging store's current list: a multi-select
//! set for batch removal and the single id open for full-screen preview.
//! Selected ids are always a subset of currently staged ids; removal prunes
//! the selection in the same logical step.

use std::collections::HashSet;

use localshare_core::AppError;
use uuid::Uuid;

use crate::staging::StagingStore;

#[derive(Debug, Default)]
pub struct Selection {
    selected: HashSet<Uuid>,
    preview: Option<Uuid>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle an id in the multi-select set.
    pub fn toggle(&mut self, id: Uuid) {
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    pub fn is_selected(&self, id: Uuid) -> bool {
        self.selected.contains(&id)
    }

    pub fn selected(&self) -> &HashSet<Uuid> {
        &self.selected
    }

    pub fn clear_selected(&mut self) {
        self.selected.clear();
    }

    /// Open an entry for full-screen preview, replacing any previous one.
    pub fn open_preview(&mut self, id: Uuid) {
        self.preview = Some(id);
    }

    pub fn close_preview(&mut self) {
        self.preview = None;
    }

    pub fn preview(&self) -> Option<Uuid> {
        self.preview
    }

    /// Drop ids that are no longer staged.
    pub fn prune(&mut self, staged: &HashSet<Uuid>) {
        self.selected.retain(|id| staged.contains(id));
        if let Some(id) = self.preview {
            if !staged.contains(&id) {
                self.preview = None;
            }
        }
    }

    /// Batch-remove the selected entries through the store, pruning the
    /// selection in the same logical step.
    pub async fn remove_selected(&mut self, store: &mut StagingStore) -> Result<usize, AppError> {
        if self.selected.is_empty() {
            return Ok(0);
        }
        let ids = std::mem::take(&mut self.selected);
        let removed = store.remove(&ids).await?;
        self.prune(&store.ids());
        Ok(removed)
    }
}
