//! Configuration module
//!
//! Client configuration with environment overrides: server location, the
//! settle delays applied after an upload completes, the HTTP timeout, and
//! the filesystem locations for preview spooling and preferences.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::DEFAULT_SERVER_URL;

const SETTLE_DELAY_MS: u64 = 700;
const BUSY_CLEAR_DELAY_MS: u64 = 150;
const HTTP_TIMEOUT_SECS: u64 = 60;

/// Client configuration
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL of the local media share server.
    pub server_url: String,
    /// Pause between a finished upload and clearing the staged list /
    /// resetting the progress bar, so the user sees the completed bar.
    pub settle_delay: Duration,
    /// Shorter pause before the upload controls re-enable, staggered ahead
    /// of the progress-bar fade.
    pub busy_clear_delay: Duration,
    /// Timeout for the whole upload request.
    pub http_timeout: Duration,
    /// Spool directory for preview files.
    pub preview_dir: PathBuf,
    /// Location of the persisted user preferences.
    pub preferences_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            server_url: DEFAULT_SERVER_URL.to_string(),
            settle_delay: Duration::from_millis(SETTLE_DELAY_MS),
            busy_clear_delay: Duration::from_millis(BUSY_CLEAR_DELAY_MS),
            http_timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
            preview_dir: env::temp_dir().join("localshare").join("previews"),
            preferences_path: default_preferences_path(),
        }
    }
}

/// `$HOME/.config/localshare/preferences.json`, falling back to a
/// working-directory file when no home directory is available.
fn default_preferences_path() -> PathBuf {
    match env::var("HOME") {
        Ok(home) if !home.is_empty() => PathBuf::from(home)
            .join(".config")
            .join("localshare")
            .join("preferences.json"),
        _ => PathBuf::from(".localshare").join("preferences.json"),
    }
}

fn duration_ms_from_env(var: &str, default: Duration) -> Result<Duration, anyhow::Error> {
    match env::var(var) {
        Ok(raw) => {
            let ms: u64 = raw
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid {}: {}", var, e))?;
            Ok(Duration::from_millis(ms))
        }
        Err(_) => Ok(default),
    }
}

impl ClientConfig {
    /// Load configuration from the environment, falling back to defaults.
    ///
    /// Recognized variables: `LOCALSHARE_SERVER_URL`,
    /// `LOCALSHARE_SETTLE_DELAY_MS`, `LOCALSHARE_BUSY_CLEAR_DELAY_MS`,
    /// `LOCALSHARE_HTTP_TIMEOUT_SECS`, `LOCALSHARE_PREVIEW_DIR`,
    /// `LOCALSHARE_PREFERENCES_PATH`.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let defaults = ClientConfig::default();

        let server_url = env::var("LOCALSHARE_SERVER_URL")
            .unwrap_or(defaults.server_url)
            .trim_end_matches('/')
            .to_string();

        let settle_delay = duration_ms_from_env("LOCALSHARE_SETTLE_DELAY_MS", defaults.settle_delay)?;
        let busy_clear_delay =
            duration_ms_from_env("LOCALSHARE_BUSY_CLEAR_DELAY_MS", defaults.busy_clear_delay)?;

        let http_timeout = match env::var("LOCALSHARE_HTTP_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs: u64 = raw
                    .parse()
                    .map_err(|e| anyhow::anyhow!("Invalid LOCALSHARE_HTTP_TIMEOUT_SECS: {}", e))?;
                Duration::from_secs(secs)
            }
            Err(_) => defaults.http_timeout,
        };

        let preview_dir = env::var("LOCALSHARE_PREVIEW_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.preview_dir);

        let preferences_path = env::var("LOCALSHARE_PREFERENCES_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.preferences_path);

        Ok(ClientConfig {
            server_url,
            settle_delay,
            busy_clear_delay,
            http_timeout,
            preview_dir,
            preferences_path,
        })
    }

    /// Full URL for an endpoint path on the configured server.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}{}", self.server_url.trim_end_matches('/'), path)
    }
}
