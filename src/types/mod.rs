//! Type definitions for pomosync

mod error;
mod preferences;
mod session;

pub use error::*;
pub use preferences::*;
pub use session::*;

/// Local store loading warning types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreWarning {
    /// Failed to open or read the session file
    LoadFailed(String),
    /// Session file was corrupted (invalid JSON)
    Corrupted(String),
}
