//! User preferences
//!
//! A single durable value today: the UI theme. Read once at startup to decide
//! initial rendering, written on every explicit toggle. Stored as JSON in a
//! profile-scoped file.

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

impl FromStr for Theme {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            _ => Err(AppError::InvalidInput(format!(
                "Unknown theme: {} (expected dark or light)",
                s
            ))),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Dark => write!(f, "dark"),
            Theme::Light => write!(f, "light"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Persisted theme; `None` until the user toggles for the first time.
    pub theme: Option<Theme>,
}

impl Preferences {
    /// Initial theme: the stored value wins; otherwise the system preference.
    pub fn initial_theme(&self, system_prefers_dark: bool) -> Theme {
        self.theme.unwrap_or(if system_prefers_dark {
            Theme::Dark
        } else {
            Theme::Light
        })
    }
}

/// Loads and saves `Preferences` at a fixed path.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        PreferenceStore { path: path.into() }
    }

    /// Load preferences; a missing file yields the defaults.
    pub fn load(&self) -> Result<Preferences, AppError> {
        match fs::read(&self.path) {
            Ok(raw) => Ok(serde_json::from_slice(&raw)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Preferences::default()),
            Err(err) => Err(err.into()),
        }
    }

    /// Persist preferences, creating parent directories as needed.
    pub fn save(&self, prefs: &Preferences) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_vec_pretty(prefs)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    /// Store a new theme value and return the updated preferences.
    pub fn set_theme(&self, theme: Theme) -> Result<Preferences, AppError> {
        let mut prefs = self.load()?;
        prefs.theme = Some(theme);
        self.save(&prefs)?;
        Ok(prefs)
    }
}
