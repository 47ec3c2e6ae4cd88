use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Raw file handed over by a picker: a file dialog, a directory walk, or the
/// folder archiver's synthetic output.
#[derive(Debug, Clone)]
pub struct PickedFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Bytes,
    /// Path relative to the chosen directory; set only for folder selection.
    pub relative_path: Option<String>,
}

impl PickedFile {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        PickedFile {
            name: name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
            relative_path: None,
        }
    }

    pub fn with_relative_path(mut self, path: impl Into<String>) -> Self {
        self.relative_path = Some(path.into());
        self
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Preview reference handed out by a preview store: a locally resolvable URL
/// for a staged file's bytes, valid until released.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewHandle {
    /// Store-internal key, unique per acquire.
    pub key: String,
    /// Locally resolvable URL for rendering the file.
    pub url: String,
}

/// A file the user has selected but not yet uploaded.
///
/// Metadata is copied from the underlying file at staging time and is
/// immutable for the entry's lifetime. Each entry carries exactly one live
/// preview reference, released when the entry leaves staging.
#[derive(Debug, Clone)]
pub struct StagedFile {
    pub id: Uuid,
    pub name: String,
    pub size: u64,
    pub content_type: String,
    pub relative_path: Option<String>,
    pub preview: PreviewHandle,
    pub bytes: Bytes,
    pub staged_at: DateTime<Utc>,
}

impl StagedFile {
    /// Two files are the same staged entry iff name and size match.
    pub fn matches(&self, name: &str, size: u64) -> bool {
        self.name == name && self.size == size
    }
}
