use serde::{Deserialize, Serialize};

/// Upload session status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Idle,
    Uploading,
    Succeeded,
    Failed,
}

impl UploadStatus {
    /// Terminal states are always the last update published for a session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadStatus::Succeeded | UploadStatus::Failed)
    }
}

/// Snapshot of the ephemeral upload session, published to consumers on every
/// change. Created when an upload starts and reset to idle after the settle
/// delay, whatever the outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSession {
    pub status: UploadStatus,
    pub progress_percent: u8,
    pub error: Option<String>,
}

impl UploadSession {
    pub fn idle() -> Self {
        UploadSession {
            status: UploadStatus::Idle,
            progress_percent: 0,
            error: None,
        }
    }
}

impl Default for UploadSession {
    fn default() -> Self {
        Self::idle()
    }
}

/// Cumulative transfer progress as reported by a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    /// Bytes transferred so far.
    pub loaded: u64,
    /// Total bytes, when the transport knows it.
    pub total: Option<u64>,
}

/// Percent complete, rounded to the nearest integer and capped at 100.
/// Reports with an unknown (or zero) total carry no percentage.
pub fn progress_percent(progress: TransferProgress) -> Option<u8> {
    let total = progress.total?;
    if total == 0 {
        return None;
    }
    let percent = (progress.loaded as f64 * 100.0 / total as f64).round();
    Some(percent.min(100.0) as u8)
}
