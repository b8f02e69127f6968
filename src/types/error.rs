use thiserror::Error;

use super::StoreWarning;

/// pomosync error types
#[derive(Error, Debug)]
pub enum PomosyncError {
    /// Local session data could not be read (treated as empty by the store)
    #[error("storage read error: {0}")]
    StorageRead(String),

    /// Local snapshot could not be written
    #[error("storage write error: {0}")]
    StorageWrite(String),

    /// Remote unreachable or timed out
    #[error("network error: {0}")]
    TransientNetwork(String),

    /// A single remote put/delete failed
    #[error("remote write error: {0}")]
    RemoteWrite(String),

    /// Preferences document could not be saved
    #[error("preference update error: {0}")]
    PreferenceUpdate(String),

    /// Rejected at session creation
    #[error("invalid session: {0}")]
    InvalidSession(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

impl PomosyncError {
    /// Whether a later sync pass may succeed where this one failed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientNetwork(_) | Self::RemoteWrite(_))
    }
}

impl From<StoreWarning> for PomosyncError {
    fn from(warning: StoreWarning) -> Self {
        match warning {
            StoreWarning::LoadFailed(msg) | StoreWarning::Corrupted(msg) => Self::StorageRead(msg),
        }
    }
}

/// Result type alias for pomosync
pub type Result<T> = std::result::Result<T, PomosyncError>;
