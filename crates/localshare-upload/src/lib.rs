//! Localshare upload pipeline.
//!
//! Turns staged files into a single multipart request against the
//! mode-selected endpoint, publishing fractional progress and exactly one
//! terminal result per session, then settling the UI state on a timer. The
//! transport sits behind a trait so tests can script transfers without a
//! server.

pub mod pipeline;
pub mod transport;

pub use pipeline::UploadPipeline;
pub use transport::{
    HttpTransport, ProgressFn, Transport, TransportError, TransportResponse, UploadPart,
    UploadRequest,
};
