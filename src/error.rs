//! Error types for resolution, settings persistence and the player handle

use thiserror::Error;

/// Why a resolution ended without a playable result
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The backend found nothing (or an empty playlist), even after the fallback search
    #[error("no matches")]
    NoMatches,
    /// The backend reported an explicit load error; never retried
    #[error("load failed: {reason}")]
    LoadFailed { reason: String },
}

impl ResolveError {
    pub fn load_failed(reason: impl Into<String>) -> Self {
        ResolveError::LoadFailed { reason: reason.into() }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("music player task is not running")]
    Closed,
    #[error(transparent)]
    Settings(#[from] SettingsError),
}
