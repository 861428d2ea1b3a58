//! Chime - desktop alarm clock engine
//!
//! This library provides the core functionality for the chime CLI.
//! It includes:
//! - The alarm engine: registry, trigger loop, and ringing sessions
//! - Audio playback with built-tone fallback (rodio)
//! - Best-effort external playback launch and the termination cascade
//! - A bounded ledger of externally-launched playback processes
//! - An injectable wall-clock source
//! - CLI command parsing and display utilities
//!
//! Alarm state is in-memory only and lost on process restart; the engine
//! is single-operator, single-process by design.

pub mod audio;
pub mod cli;
pub mod clock;
pub mod engine;
pub mod launch;
pub mod ledger;
pub mod registry;
pub mod ringing;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    Alarm, AlarmPreset, AlarmSpec, EngineConfig, EngineStatus, NextDue, ValidationError,
};

// Re-export the engine types
pub use engine::{AlarmEngine, EngineError};

// Re-export audio types
pub use audio::{
    check_ringtone_file, try_create_player, AudioError, AudioPlayer, MockAudioPlayer,
    NullAudioPlayer, Ringtone, RodioAudioPlayer, ToneKind,
};

// Re-export clock types
pub use clock::{Clock, ClockError, ManualClock, SystemClock};

// Re-export launch types
pub use launch::{
    LaunchError, MockLauncher, PlaybackHandle, ProcessLauncher, StrategyKind, SystemLauncher,
};

// Re-export ledger types
pub use ledger::{ProcessLedger, ProcessRecord, DEFAULT_LEDGER_CAPACITY};

// Re-export ringing session types
pub use ringing::{PlaybackBackend, RingingPhase, RingingSession};
