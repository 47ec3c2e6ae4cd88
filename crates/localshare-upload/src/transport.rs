//! Upload transport abstraction
//!
//! This module defines the Transport trait the pipeline posts through, and
//! the reqwest-backed implementation used against a real server.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use localshare_core::models::TransferProgress;
use localshare_core::AppError;
use thiserror::Error;

/// Transport operation errors
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Upload rejected with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<TransportError> for AppError {
    fn from(err: TransportError) -> Self {
        AppError::Transport(err.to_string())
    }
}

/// Progress callback invoked with cumulative transfer progress. Reports may
/// carry an unknown total; the consumer decides what to do with those.
pub type ProgressFn = Arc<dyn Fn(TransferProgress) + Send + Sync>;

/// One part of the multipart body.
#[derive(Debug, Clone)]
pub struct UploadPart {
    pub field: &'static str,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// A single upload request against one endpoint.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub url: String,
    pub parts: Vec<UploadPart>,
}

impl UploadRequest {
    /// Sum of the part payload sizes; the total progress is reported against.
    pub fn total_bytes(&self) -> u64 {
        self.parts.iter().map(|part| part.bytes.len() as u64).sum()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TransportResponse {
    pub status: u16,
}

/// Posts one multipart request and reports cumulative bytes transferred.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: UploadRequest,
        progress: ProgressFn,
    ) -> Result<TransportResponse, TransportError>;
}

const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Slice a payload into fixed-size chunks without copying.
fn chunk_bytes(bytes: &Bytes, chunk_size: usize) -> Vec<Bytes> {
    let mut chunks = Vec::with_capacity(bytes.len() / chunk_size + 1);
    let mut offset = 0;
    while offset < bytes.len() {
        let end = usize::min(offset + chunk_size, bytes.len());
        chunks.push(bytes.slice(offset..end));
        offset = end;
    }
    chunks
}

/// Wrap a part's payload in a stream that bumps the shared byte counter as
/// the body is pulled, reporting cumulative progress against the known
/// total.
fn counting_body(
    bytes: Bytes,
    sent: Arc<AtomicU64>,
    total: u64,
    progress: ProgressFn,
) -> reqwest::Body {
    let chunks = chunk_bytes(&bytes, UPLOAD_CHUNK_SIZE);
    let stream = futures::stream::iter(chunks.into_iter().map(move |chunk| {
        let loaded = sent.fetch_add(chunk.len() as u64, Ordering::Relaxed) + chunk.len() as u64;
        progress(TransferProgress {
            loaded,
            total: Some(total),
        });
        Ok::<Bytes, std::io::Error>(chunk)
    }));
    reqwest::Body::wrap_stream(stream)
}

/// reqwest-backed transport.
///
/// Builds a multipart form with one part per staged file, each streamed
/// through a counting body so the caller sees cumulative progress against
/// the summed payload size.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(HttpTransport { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: UploadRequest,
        progress: ProgressFn,
    ) -> Result<TransportResponse, TransportError> {
        if request.parts.is_empty() {
            return Err(TransportError::InvalidRequest(
                "Upload request has no parts".to_string(),
            ));
        }

        let total = request.total_bytes();
        let sent = Arc::new(AtomicU64::new(0));

        let mut form = reqwest::multipart::Form::new();
        for part in &request.parts {
            let body = counting_body(part.bytes.clone(), sent.clone(), total, progress.clone());
            let form_part = reqwest::multipart::Part::stream_with_length(
                body,
                part.bytes.len() as u64,
            )
            .file_name(part.file_name.clone())
            .mime_str(&part.content_type)
            .map_err(|e| {
                TransportError::InvalidRequest(format!(
                    "Invalid content type {}: {}",
                    part.content_type, e
                ))
            })?;
            form = form.part(part.field, form_part);
        }

        let start = std::time::Instant::now();

        let response = self
            .client
            .post(&request.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(
            url = %request.url,
            status = status.as_u16(),
            size_bytes = total,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload request completed"
        );

        Ok(TransportResponse {
            status: status.as_u16(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_bytes_covers_payload() {
        let bytes = Bytes::from(vec![7u8; 150]);
        let chunks = chunk_bytes(&bytes, 64);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 64);
        assert_eq!(chunks[1].len(), 64);
        assert_eq!(chunks[2].len(), 22);
        let total: usize = chunks.iter().map(|c| c.len()).sum();
        assert_eq!(total, 150);
    }

    #[test]
    fn test_chunk_bytes_empty_payload() {
        let chunks = chunk_bytes(&Bytes::new(), 64);
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_total_bytes_sums_parts() {
        let request = UploadRequest {
            url: "http://localhost:3000/upload/files".to_string(),
            parts: vec![
                UploadPart {
                    field: "files",
                    file_name: "a.txt".to_string(),
                    content_type: "text/plain".to_string(),
                    bytes: Bytes::from_static(b"abcd"),
                },
                UploadPart {
                    field: "files",
                    file_name: "b.txt".to_string(),
                    content_type: "text/plain".to_string(),
                    bytes: Bytes::from_static(b"efg"),
                },
            ],
        };
        assert_eq!(request.total_bytes(), 7);
    }

    #[test]
    fn test_transport_error_to_app_error() {
        let err: AppError = TransportError::Status {
            status: 503,
            body: "unavailable".to_string(),
        }
        .into();
        assert!(err.is_retryable());
        assert!(err.to_string().contains("503"));
    }
}
