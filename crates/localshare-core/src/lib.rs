//! Localshare Core Library
//!
//! This crate provides the domain models, error types, configuration, and
//! user preferences shared across all localshare components.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod preferences;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::AppError;
pub use preferences::{PreferenceStore, Preferences, Theme};
