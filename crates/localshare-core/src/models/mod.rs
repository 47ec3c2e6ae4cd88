//! Domain models shared across the client core.

pub mod mode;
pub mod session;
pub mod staged_file;

pub use mode::UploadMode;
pub use session::{progress_percent, TransferProgress, UploadSession, UploadStatus};
pub use staged_file::{PickedFile, PreviewHandle, StagedFile};
