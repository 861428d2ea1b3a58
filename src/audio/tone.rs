//! Built alarm tones.
//!
//! Each tone is a fixed-frequency beep pattern: a sine burst followed by a
//! short gap, repeated for as long as the alarm rings. The patterns are
//! synthesized on the fly, so built tones work without any sound files on
//! disk and serve as the fallback when a ringtone file cannot be played.

use std::time::Duration;

use rodio::source::{SineWave, Source, TakeDuration, Zero};
use serde::{Deserialize, Serialize};

/// Silence between two beeps of a pattern, in milliseconds.
pub const BEEP_GAP_MS: u64 = 200;

/// Peak amplitude for synthesized beeps, before sink volume is applied.
const BEEP_AMPLITUDE: f32 = 0.8;

/// The built beep patterns available as alarm ringtones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToneKind {
    /// Standard alarm beep.
    Classic,
    /// Short, urgent pulse.
    Pulse,
    /// Mid-pitch notification chime.
    Chime,
    /// Low, long, soft tone.
    Gentle,
}

impl ToneKind {
    /// All built tones, in display order.
    pub const ALL: &'static [ToneKind] = &[
        ToneKind::Classic,
        ToneKind::Pulse,
        ToneKind::Chime,
        ToneKind::Gentle,
    ];

    /// Returns the string representation of the tone.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ToneKind::Classic => "classic",
            ToneKind::Pulse => "pulse",
            ToneKind::Chime => "chime",
            ToneKind::Gentle => "gentle",
        }
    }

    /// Sine frequency of the beep, in hertz.
    #[must_use]
    pub fn frequency_hz(&self) -> f32 {
        match self {
            ToneKind::Classic => 1000.0,
            ToneKind::Pulse => 1500.0,
            ToneKind::Chime => 800.0,
            ToneKind::Gentle => 600.0,
        }
    }

    /// Length of one beep, in milliseconds.
    #[must_use]
    pub fn beep_ms(&self) -> u64 {
        match self {
            ToneKind::Classic => 800,
            ToneKind::Pulse => 400,
            ToneKind::Chime => 600,
            ToneKind::Gentle => 1000,
        }
    }

    /// Length of one full beep-plus-gap cycle, in milliseconds.
    #[must_use]
    pub fn cycle_ms(&self) -> u64 {
        self.beep_ms() + BEEP_GAP_MS
    }

    /// Parses a tone name as produced by [`ToneKind::as_str`].
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
    }
}

impl Default for ToneKind {
    fn default() -> Self {
        ToneKind::Classic
    }
}

impl std::fmt::Display for ToneKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds one beep burst for the given tone.
#[must_use]
pub fn beep(kind: ToneKind) -> impl Source<Item = f32> + Send {
    SineWave::new(kind.frequency_hz())
        .take_duration(Duration::from_millis(kind.beep_ms()))
        .amplify(BEEP_AMPLITUDE)
}

/// Builds the silent gap that follows a beep burst.
#[must_use]
pub fn beep_gap() -> TakeDuration<Zero<f32>> {
    Zero::new(1, 44_100).take_duration(Duration::from_millis(BEEP_GAP_MS))
}
