//! External launch error types.

use thiserror::Error;

/// Errors from the external playback launch path.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The media file to hand off does not exist.
    #[error("media file not found: {0}")]
    FileNotFound(String),

    /// Every launch strategy failed.
    #[error("every launch strategy failed for {0}")]
    AllStrategiesFailed(String),
}
