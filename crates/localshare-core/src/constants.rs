//! Shared constants for the upload protocol and picker configuration.

/// Multipart field name carrying each uploaded file.
pub const UPLOAD_FIELD_NAME: &str = "files";

/// Endpoint for media uploads (and archived folder uploads, which post as a
/// single file once packed).
pub const MEDIA_UPLOAD_PATH: &str = "/upload/media";

/// Endpoint for generic file uploads.
pub const FILES_UPLOAD_PATH: &str = "/upload/files";

/// Content-type prefixes admitted by the media picker filter.
pub const MEDIA_ACCEPT_PREFIXES: &[&str] = &["image/", "video/"];

/// Default server base URL when none is configured.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";
