//! Upload pipeline
//!
//! Drives at most one upload at a time from a staging store. Session
//! snapshots are published over a watch channel: progress percentages in
//! non-decreasing order, then exactly one terminal state. Post-completion
//! resets run as scheduled continuations tied to a session epoch, so a new
//! upload started before a pending reset fires is never clobbered by it.

use std::sync::{Arc, Mutex};

use localshare_core::constants::UPLOAD_FIELD_NAME;
use localshare_core::models::{
    progress_percent, TransferProgress, UploadMode, UploadSession, UploadStatus,
};
use localshare_core::{AppError, ClientConfig};
use localshare_services::SharedStagingStore;
use tokio::sync::watch;

use crate::transport::{ProgressFn, Transport, UploadPart, UploadRequest};

struct PipelineState {
    session: UploadSession,
    /// UI busy latch; cleared on a shorter timer than the session reset so
    /// the controls re-enable ahead of the progress fade.
    busy: bool,
    /// Bumped on every upload start; scheduled continuations re-check it
    /// before touching state.
    epoch: u64,
}

/// Turns staged files into one multipart request against the mode-selected
/// endpoint.
///
/// The pipeline borrows the staging store read-only for the duration of an
/// upload and never mutates staged entries directly; after a success it
/// requests clearing through the store's own `clear`.
#[derive(Clone)]
pub struct UploadPipeline {
    transport: Arc<dyn Transport>,
    store: SharedStagingStore,
    config: ClientConfig,
    state: Arc<Mutex<PipelineState>>,
    tx: watch::Sender<UploadSession>,
}

impl UploadPipeline {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: SharedStagingStore,
        config: ClientConfig,
    ) -> Self {
        let (tx, _rx) = watch::channel(UploadSession::idle());
        UploadPipeline {
            transport,
            store,
            config,
            state: Arc::new(Mutex::new(PipelineState {
                session: UploadSession::idle(),
                busy: false,
                epoch: 0,
            })),
            tx,
        }
    }

    /// Subscribe to session snapshots. Each session's updates end with a
    /// terminal state; the later reset to idle belongs to no session.
    pub fn subscribe(&self) -> watch::Receiver<UploadSession> {
        self.tx.subscribe()
    }

    /// Current session snapshot.
    pub fn session(&self) -> UploadSession {
        self.state.lock().unwrap().session.clone()
    }

    /// Whether the upload controls should still be held disabled.
    pub fn is_busy(&self) -> bool {
        self.state.lock().unwrap().busy
    }

    /// Upload every staged file in one multipart request.
    ///
    /// A call while a session is already uploading is a no-op, as is a call
    /// with nothing staged. On success the staging store is cleared after
    /// the settle delay; on failure it is left untouched so the user can
    /// retry.
    pub async fn upload(&self, mode: UploadMode) -> Result<(), AppError> {
        let epoch;
        let parts: Vec<UploadPart>;
        {
            // Claim the session while holding the store lock so two racing
            // calls cannot both pass the refusal check.
            let store = self.store.lock().await;
            let mut state = self.state.lock().unwrap();
            if state.session.status == UploadStatus::Uploading {
                tracing::debug!("Upload already in flight; ignoring request");
                return Ok(());
            }
            if store.is_empty() {
                tracing::debug!("No staged files; nothing to upload");
                return Ok(());
            }

            state.epoch += 1;
            epoch = state.epoch;
            state.busy = true;
            state.session = UploadSession {
                status: UploadStatus::Uploading,
                progress_percent: 0,
                error: None,
            };
            let _ = self.tx.send(state.session.clone());

            parts = store
                .files()
                .iter()
                .map(|file| UploadPart {
                    field: UPLOAD_FIELD_NAME,
                    file_name: file.name.clone(),
                    content_type: file.content_type.clone(),
                    bytes: file.bytes.clone(),
                })
                .collect();
        }

        let url = self.config.endpoint_url(mode.endpoint_path());
        let request = UploadRequest { url, parts };
        tracing::info!(
            mode = %mode,
            files = request.parts.len(),
            size_bytes = request.total_bytes(),
            "Starting upload"
        );

        let result = self
            .transport
            .send(request, self.progress_fn(epoch))
            .await;

        let outcome = match result {
            Ok(response) => {
                tracing::info!(status = response.status, "Upload succeeded");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "Upload failed");
                Err(AppError::from(err))
            }
        };

        // Publish the terminal state; always the last update for this session.
        {
            let mut state = self.state.lock().unwrap();
            if state.epoch == epoch {
                match &outcome {
                    Ok(()) => {
                        state.session.status = UploadStatus::Succeeded;
                        state.session.progress_percent = 100;
                        state.session.error = None;
                    }
                    Err(err) => {
                        state.session.status = UploadStatus::Failed;
                        state.session.error = Some(err.to_string());
                    }
                }
                let _ = self.tx.send(state.session.clone());
            }
        }

        self.schedule_busy_clear(epoch);
        self.schedule_settle(epoch, outcome.is_ok());

        outcome
    }

    /// Progress callback for one session: ignores unknown totals, keeps the
    /// published percentage non-decreasing, and goes quiet once the session
    /// is superseded or terminal.
    fn progress_fn(&self, epoch: u64) -> ProgressFn {
        let state = self.state.clone();
        let tx = self.tx.clone();
        Arc::new(move |progress: TransferProgress| {
            let Some(percent) = progress_percent(progress) else {
                return;
            };
            let mut state = state.lock().unwrap();
            if state.epoch != epoch || state.session.status != UploadStatus::Uploading {
                return;
            }
            if percent > state.session.progress_percent {
                state.session.progress_percent = percent;
                let _ = tx.send(state.session.clone());
            }
        })
    }

    /// Re-enable the upload controls after the short busy delay.
    fn schedule_busy_clear(&self, epoch: u64) {
        let state = self.state.clone();
        let delay = self.config.busy_clear_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut state = state.lock().unwrap();
            if state.epoch != epoch {
                return;
            }
            state.busy = false;
        });
    }

    /// After the settle delay: clear the store (success only) and reset the
    /// session to idle. Skipped entirely if a newer session has started.
    fn schedule_settle(&self, epoch: u64, clear_store: bool) {
        let state = self.state.clone();
        let tx = self.tx.clone();
        let store = self.store.clone();
        let delay = self.config.settle_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            if state.lock().unwrap().epoch != epoch {
                return;
            }

            if clear_store {
                let mut store = store.lock().await;
                // Re-check under the store lock: a new upload may have
                // started while we waited for it.
                if state.lock().unwrap().epoch != epoch {
                    return;
                }
                if let Err(err) = store.clear().await {
                    tracing::warn!(error = %err, "Failed to clear staging store after upload");
                }
            }

            let mut state = state.lock().unwrap();
            if state.epoch != epoch {
                return;
            }
            state.session = UploadSession::idle();
            let _ = tx.send(state.session.clone());
        });
    }
}
