//! The ringing session: per-firing-event state.
//!
//! A session exists only while an alarm is actively sounding. It owns the
//! playback backend selected for the firing (in-process audio, one
//! external handle, or nothing at all when every audio path failed; the
//! status surface is the fallback channel) and resolves into exactly one
//! of stopped, snoozed, or dismissed. At most one session is active at a
//! time; the engine queues further firings behind it.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::audio::Ringtone;
use crate::launch::PlaybackHandle;
use crate::types::Alarm;

/// Lifecycle phase of a ringing session. The absence of a session is the
/// idle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingingPhase {
    /// Actively sounding (or trying to).
    Ringing,
    /// Stopped by the user.
    Stopped,
    /// Stopped and re-scheduled for `snooze_minutes` from now.
    Snoozed,
    /// Stopped with the defensive guarantee it cannot re-fire.
    Dismissed,
}

impl RingingPhase {
    /// Returns the string representation of the phase.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RingingPhase::Ringing => "ringing",
            RingingPhase::Stopped => "stopped",
            RingingPhase::Snoozed => "snoozed",
            RingingPhase::Dismissed => "dismissed",
        }
    }

    /// True for the phases a session can resolve into.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        !matches!(self, RingingPhase::Ringing)
    }
}

/// Which playback path a firing ended up on.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackBackend {
    /// The in-process player is sounding this ringtone (possibly the
    /// fallback tone rather than the alarm's own choice).
    InProcess {
        /// What is actually playing.
        ringtone: Ringtone,
    },
    /// An external media handler was launched for this file.
    External {
        /// The file handed to the handler.
        file: PathBuf,
    },
    /// Every audio path failed; the session rings visually only.
    Silent,
}

/// State for one firing event, from trigger until stop/snooze/dismiss.
#[derive(Debug)]
pub struct RingingSession {
    /// Monotonic id guarding against stale monitor tasks.
    pub session_id: u64,
    /// The alarm that fired (already removed from the registry).
    pub alarm: Alarm,
    /// Current phase.
    pub phase: RingingPhase,
    /// Playback path in use.
    pub backend: PlaybackBackend,
    /// Handle to externally-launched playback, if any.
    pub handle: Option<PlaybackHandle>,
    /// When the session started ringing.
    pub started_at: DateTime<Local>,
    /// Monitor ticks observed; throttles unsupervised checks.
    pub monitor_ticks: u64,
}

impl RingingSession {
    /// Creates a session in the `Ringing` phase with no playback yet.
    #[must_use]
    pub fn new(session_id: u64, alarm: Alarm, started_at: DateTime<Local>) -> Self {
        Self {
            session_id,
            alarm,
            phase: RingingPhase::Ringing,
            backend: PlaybackBackend::Silent,
            handle: None,
            started_at,
            monitor_ticks: 0,
        }
    }

    /// True while the session is actively ringing.
    #[must_use]
    pub fn is_ringing(&self) -> bool {
        self.phase == RingingPhase::Ringing
    }

    /// The ringing alarm's label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.alarm.label
    }

    /// The file involved in this session's playback, if any. This is the hint the
    /// termination cascade's command-line layer correlates on.
    #[must_use]
    pub fn file_hint(&self) -> Option<&Path> {
        match &self.backend {
            PlaybackBackend::External { file } => Some(file),
            _ => self.alarm.ringtone.path(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
