//! Error types for cytgm-vp
//!
//! Defines module-specific error types using thiserror for clear error propagation.

use thiserror::Error;

/// Main error type for cytgm-vp module
#[derive(Error, Debug)]
pub enum Error {
    /// Playlist empty or start index out of range; no session was created
    #[error("Invalid playlist: {0}")]
    InvalidPlaylist(String),

    /// Operation invoked before initialization or after teardown
    #[error("No active media")]
    NoActiveMedia,

    /// Media engine refused to create a handle
    #[error("Media error: {0}")]
    Media(String),

    /// Catalog or configuration errors bubbled up from cytgm-common
    #[error(transparent)]
    Common(#[from] cytgm_common::Error),
}

/// Convenience Result type using cytgm-vp Error
pub type Result<T> = std::result::Result<T, Error>;
