//! Audio system error types.
//!
//! This module defines the error types for alarm audio playback.
//! Playback errors are almost always recoverable: a failed ringtone file
//! falls back to a built tone, and a missing audio device falls back to
//! the external-launch path. Only a failed fallback tone is treated as a
//! fatal audio condition, and even that never stops the alarm engine.

use thiserror::Error;

/// Errors that can occur in the audio playback system.
#[derive(Debug, Error)]
pub enum AudioError {
    /// Audio output device is not available (e.g., no sound card, headless host).
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),

    /// Ringtone file was not found at the specified path.
    #[error("ringtone file not found: {0}")]
    FileNotFound(String),

    /// Failed to decode the ringtone file.
    #[error("failed to decode ringtone: {0}")]
    Decode(String),

    /// Failed to create the audio output sink.
    #[error("failed to open audio sink: {0}")]
    Stream(String),

    /// Generic playback error.
    #[error("playback error: {0}")]
    Playback(String),
}

impl AudioError {
    /// Returns true if this error is related to device availability.
    #[must_use]
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::DeviceUnavailable(_) | Self::Stream(_))
    }

    /// Returns true if this error is related to the ringtone file itself.
    #[must_use]
    pub fn is_file_error(&self) -> bool {
        matches!(self, Self::FileNotFound(_) | Self::Decode(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AudioError::DeviceUnavailable("no device".to_string());
        assert!(err.to_string().contains("no device"));
        assert!(err.to_string().contains("audio device unavailable"));

        let err = AudioError::FileNotFound("/path/to/ring.mp3".to_string());
        assert!(err.to_string().contains("/path/to/ring.mp3"));

        let err = AudioError::Decode("invalid format".to_string());
        assert!(err.to_string().contains("invalid format"));

        let err = AudioError::Stream("sink failed".to_string());
        assert!(err.to_string().contains("sink failed"));

        let err = AudioError::Playback("unknown error".to_string());
        assert!(err.to_string().contains("unknown error"));
    }

    #[test]
    fn test_is_device_error() {
        assert!(AudioError::DeviceUnavailable("x".into()).is_device_error());
        assert!(AudioError::Stream("x".into()).is_device_error());
        assert!(!AudioError::FileNotFound("x".into()).is_device_error());
        assert!(!AudioError::Decode("x".into()).is_device_error());
        assert!(!AudioError::Playback("x".into()).is_device_error());
    }

    #[test]
    fn test_is_file_error() {
        assert!(AudioError::FileNotFound("x".into()).is_file_error());
        assert!(AudioError::Decode("x".into()).is_file_error());
        assert!(!AudioError::DeviceUnavailable("x".into()).is_file_error());
        assert!(!AudioError::Stream("x".into()).is_file_error());
        assert!(!AudioError::Playback("x".into()).is_file_error());
    }
}
