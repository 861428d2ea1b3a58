//! Ringtone sources.
//!
//! A ringtone is either one of the built beep patterns or a user-supplied
//! audio file. File-backed ringtones are checked when selected, but a
//! suspicious file is accepted with a warning rather than rejected:
//! playback has its own fallback to a built tone, so a bad selection can
//! never silence an alarm.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::tone::ToneKind;

/// Audio file extensions the player is expected to decode.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac", "m4a", "aac"];

/// The sound an alarm rings with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Ringtone {
    /// A built beep pattern, synthesized in-process.
    Tone(ToneKind),
    /// A local audio file.
    File(PathBuf),
}

impl Ringtone {
    /// Creates a built-tone ringtone.
    #[must_use]
    pub fn tone(kind: ToneKind) -> Self {
        Self::Tone(kind)
    }

    /// Creates a file-backed ringtone, logging a warning if the file looks
    /// unusable (missing, or an extension the player is unlikely to decode).
    ///
    /// The selection is accepted either way; playback falls back to a built
    /// tone if the file turns out to be unplayable.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if let Err(reason) = check_ringtone_file(&path) {
            warn!(path = %path.display(), %reason, "ringtone file looks unusable, will fall back to a built tone if playback fails");
        }
        Self::File(path)
    }

    /// Returns true if this is a built tone.
    #[must_use]
    pub fn is_tone(&self) -> bool {
        matches!(self, Self::Tone(_))
    }

    /// Returns true if this is a file-backed ringtone.
    #[must_use]
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    /// Returns the file path if this ringtone is file-backed.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            Self::Tone(_) => None,
        }
    }

    /// A short human-readable description for status displays.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Tone(kind) => format!("tone:{kind}"),
            Self::File(path) => format!("file:{}", path.display()),
        }
    }
}

impl Default for Ringtone {
    fn default() -> Self {
        Self::Tone(ToneKind::default())
    }
}

/// Checks whether a ringtone file is likely to play.
///
/// # Errors
///
/// Returns a human-readable reason when the file is missing, is not a
/// regular file, or carries an extension outside [`SUPPORTED_EXTENSIONS`].
pub fn check_ringtone_file(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Err("file does not exist".to_string());
    }
    if !path.is_file() {
        return Err("not a regular file".to_string());
    }

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase());
    match ext {
        Some(ext) if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        Some(ext) => Err(format!("unrecognized audio extension '.{ext}'")),
        None => Err("no file extension".to_string()),
    }
}
