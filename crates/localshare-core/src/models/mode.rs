use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{FILES_UPLOAD_PATH, MEDIA_ACCEPT_PREFIXES, MEDIA_UPLOAD_PATH};

/// Upload mode selected in the picker.
///
/// The mode drives both the picker filter and the endpoint the upload posts
/// to. Folder selections are archived client-side into a single file, so
/// from that point on they behave like a one-file media upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadMode {
    Media,
    #[serde(rename = "all")]
    AllFiles,
    Folder,
}

impl UploadMode {
    /// Endpoint path for this mode.
    pub fn endpoint_path(&self) -> &'static str {
        match self {
            UploadMode::Media | UploadMode::Folder => MEDIA_UPLOAD_PATH,
            UploadMode::AllFiles => FILES_UPLOAD_PATH,
        }
    }

    /// Picker filter: media mode admits images and video only.
    pub fn accepts(&self, content_type: &str) -> bool {
        match self {
            UploadMode::Media => MEDIA_ACCEPT_PREFIXES
                .iter()
                .any(|prefix| content_type.starts_with(prefix)),
            UploadMode::AllFiles | UploadMode::Folder => true,
        }
    }
}

impl FromStr for UploadMode {
    type Err = crate::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "media" => Ok(UploadMode::Media),
            "all" | "files" => Ok(UploadMode::AllFiles),
            "folder" => Ok(UploadMode::Folder),
            _ => Err(crate::AppError::InvalidInput(format!(
                "Unknown upload mode: {} (expected media, all, or folder)",
                s
            ))),
        }
    }
}

impl fmt::Display for UploadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadMode::Media => write!(f, "media"),
            UploadMode::AllFiles => write!(f, "all"),
            UploadMode::Folder => write!(f, "folder"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_selection() {
        assert_eq!(UploadMode::Media.endpoint_path(), "/upload/media");
        assert_eq!(UploadMode::Folder.endpoint_path(), "/upload/media");
        assert_eq!(UploadMode::AllFiles.endpoint_path(), "/upload/files");
    }

    #[test]
    fn test_media_filter() {
        assert!(UploadMode::Media.accepts("image/png"));
        assert!(UploadMode::Media.accepts("video/mp4"));
        assert!(!UploadMode::Media.accepts("application/pdf"));
        assert!(!UploadMode::Media.accepts("text/plain"));
    }

    #[test]
    fn test_other_modes_accept_everything() {
        assert!(UploadMode::AllFiles.accepts("application/pdf"));
        assert!(UploadMode::Folder.accepts("application/octet-stream"));
    }

    #[test]
    fn test_from_str_round_trip() {
        for mode in [UploadMode::Media, UploadMode::AllFiles, UploadMode::Folder] {
            assert_eq!(mode.to_string().parse::<UploadMode>().unwrap(), mode);
        }
        assert!("webdav".parse::<UploadMode>().is_err());
    }
}
