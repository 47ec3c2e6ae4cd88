//! Preview store abstraction trait
//!
//! This module defines the PreviewStore trait that all preview backends must
//! implement.

use async_trait::async_trait;
use bytes::Bytes;
use localshare_core::models::PreviewHandle;
use localshare_core::AppError;
use thiserror::Error;

/// Preview store operation errors
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("Acquire failed: {0}")]
    AcquireFailed(String),

    #[error("Preview not found: {0}")]
    NotFound(String),

    #[error("Invalid preview key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<PreviewError> for AppError {
    fn from(err: PreviewError) -> Self {
        AppError::Preview(err.to_string())
    }
}

/// Result type for preview operations
pub type PreviewResult<T> = Result<T, PreviewError>;

/// Preview-reference lifecycle.
///
/// `acquire` hands out a `PreviewHandle` whose URL the UI may render until
/// the handle is released; `release` invalidates the URL and frees the
/// backing resource. The staging store guarantees exactly one release per
/// acquire: releasing a handle twice is a caller bug and surfaces as
/// `PreviewError::NotFound`.
#[async_trait]
pub trait PreviewStore: Send + Sync {
    /// Materialize `bytes` behind a locally resolvable URL.
    async fn acquire(&self, name: &str, bytes: &Bytes) -> PreviewResult<PreviewHandle>;

    /// Invalidate a handle obtained from `acquire`.
    async fn release(&self, handle: &PreviewHandle) -> PreviewResult<()>;

    /// Number of currently live (acquired, unreleased) previews.
    async fn live_count(&self) -> usize;
}
