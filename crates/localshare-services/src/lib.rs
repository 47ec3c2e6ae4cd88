//! Localshare Services Layer
//!
//! This crate is the **business service layer** of the client: the staging
//! store (source of truth for files the user has selected but not yet
//! uploaded), the folder archiver, and the selection/preview controller.
//! Keep coordination and staging semantics here; keep thin transport
//! handling in localshare-upload.

pub mod archive;
pub mod selection;
pub mod staging;

pub use archive::archive_folder;
pub use localshare_preview::{
    LocalPreviewStore, MemoryPreviewStore, PreviewError, PreviewStore,
};
pub use selection::Selection;
pub use staging::{SharedStagingStore, StagingStore};
