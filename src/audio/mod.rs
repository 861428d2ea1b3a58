//! Alarm audio playback.
//!
//! This module provides the player abstraction the alarm engine rings
//! through:
//!
//! - Built beep patterns synthesized in-process (`tone`)
//! - File-backed ringtones with a warn-but-accept selection check (`source`)
//! - A rodio-backed player implementation (`player`)
//! - Graceful degradation when no audio device exists
//!
//! The engine only ever talks to the [`AudioPlayer`] trait, so tests (and
//! audio-less hosts) substitute [`MockAudioPlayer`] / [`NullAudioPlayer`].
//! When the in-process player is unavailable, file ringtones are handed to
//! the external launch path instead (see `crate::launch`).

pub mod error;
pub mod player;
pub mod source;
pub mod tone;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::warn;

pub use error::AudioError;
pub use player::RodioAudioPlayer;
pub use source::{check_ringtone_file, Ringtone, SUPPORTED_EXTENSIONS};
pub use tone::ToneKind;

/// Trait for alarm audio playback implementations.
///
/// Playback is non-blocking. `stop` is unconditional and idempotent;
/// `pause`/`resume` are no-ops outside their applicable states.
pub trait AudioPlayer: Send + Sync {
    /// Starts playback of the given ringtone, replacing any current playback.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be loaded or playback cannot
    /// start; the caller is responsible for falling back to a built tone.
    fn play(&self, ringtone: &Ringtone, looped: bool, volume: f32) -> Result<(), AudioError>;

    /// Pauses playback; no-op if nothing is playing.
    fn pause(&self);

    /// Resumes paused playback; no-op if not paused.
    fn resume(&self);

    /// Stops playback and releases the source; idempotent.
    fn stop(&self);

    /// Sets the playback volume, clamped to `[0.0, 1.0]`.
    fn set_volume(&self, volume: f32);

    /// Returns the current playback volume.
    fn volume(&self) -> f32;

    /// Returns true if audio is currently playing.
    fn is_playing(&self) -> bool;

    /// Returns true if playback is paused.
    fn is_paused(&self) -> bool;

    /// Returns true if the audio backend can play at all.
    fn is_available(&self) -> bool;
}

impl AudioPlayer for RodioAudioPlayer {
    fn play(&self, ringtone: &Ringtone, looped: bool, volume: f32) -> Result<(), AudioError> {
        RodioAudioPlayer::play(self, ringtone, looped, volume)
    }

    fn pause(&self) {
        RodioAudioPlayer::pause(self);
    }

    fn resume(&self) {
        RodioAudioPlayer::resume(self);
    }

    fn stop(&self) {
        RodioAudioPlayer::stop(self);
    }

    fn set_volume(&self, volume: f32) {
        RodioAudioPlayer::set_volume(self, volume);
    }

    fn volume(&self) -> f32 {
        RodioAudioPlayer::volume(self)
    }

    fn is_playing(&self) -> bool {
        RodioAudioPlayer::is_playing(self)
    }

    fn is_paused(&self) -> bool {
        RodioAudioPlayer::is_paused(self)
    }

    fn is_available(&self) -> bool {
        RodioAudioPlayer::is_available(self)
    }
}

/// Creates the in-process player, returning `None` if audio is unavailable.
///
/// On hosts without an audio device a warning is logged and the engine
/// falls back to launching an external media handler for file ringtones.
#[must_use]
pub fn try_create_player() -> Option<Arc<RodioAudioPlayer>> {
    match RodioAudioPlayer::new() {
        Ok(player) => Some(Arc::new(player)),
        Err(e) => {
            warn!("audio device not available, falling back to external playback: {e}");
            None
        }
    }
}

/// A player stand-in for hosts without any audio device.
///
/// Reports itself unavailable and fails every `play`, which routes file
/// ringtones through the external launch path.
#[derive(Debug, Default)]
pub struct NullAudioPlayer;

impl AudioPlayer for NullAudioPlayer {
    fn play(&self, _ringtone: &Ringtone, _looped: bool, _volume: f32) -> Result<(), AudioError> {
        Err(AudioError::DeviceUnavailable("no audio backend".to_string()))
    }

    fn pause(&self) {}
    fn resume(&self) {}
    fn stop(&self) {}
    fn set_volume(&self, _volume: f32) {}

    fn volume(&self) -> f32 {
        0.0
    }

    fn is_playing(&self) -> bool {
        false
    }

    fn is_paused(&self) -> bool {
        false
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Mock audio player for testing.
#[derive(Debug, Default)]
pub struct MockAudioPlayer {
    play_calls: Mutex<Vec<(Ringtone, bool, f32)>>,
    available: AtomicBool,
    fail_files: AtomicBool,
    fail_all: AtomicBool,
    playing: AtomicBool,
    paused: AtomicBool,
    volume: Mutex<f32>,
}

impl MockAudioPlayer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            play_calls: Mutex::new(Vec::new()),
            available: AtomicBool::new(true),
            fail_files: AtomicBool::new(false),
            fail_all: AtomicBool::new(false),
            playing: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            volume: Mutex::new(1.0),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Makes file-backed playback fail while built tones still succeed,
    /// simulating a missing or undecodable ringtone file.
    pub fn set_fail_files(&self, fail: bool) {
        self.fail_files.store(fail, Ordering::SeqCst);
    }

    /// Makes every playback attempt fail, including built tones.
    pub fn set_fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    /// Simulates the queued source draining (playback ended on its own,
    /// without `stop` being called).
    pub fn mark_drained(&self) {
        self.playing.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn play_count(&self) -> usize {
        self.play_calls.lock().unwrap().len()
    }

    #[must_use]
    pub fn play_calls(&self) -> Vec<(Ringtone, bool, f32)> {
        self.play_calls.lock().unwrap().clone()
    }

    #[must_use]
    pub fn last_play(&self) -> Option<(Ringtone, bool, f32)> {
        self.play_calls.lock().unwrap().last().cloned()
    }

    pub fn clear_calls(&self) {
        self.play_calls.lock().unwrap().clear();
    }
}

impl AudioPlayer for MockAudioPlayer {
    fn play(&self, ringtone: &Ringtone, looped: bool, volume: f32) -> Result<(), AudioError> {
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(AudioError::Playback("mock failure".to_string()));
        }
        if ringtone.is_file() && self.fail_files.load(Ordering::SeqCst) {
            return Err(AudioError::FileNotFound(ringtone.describe()));
        }
        self.play_calls
            .lock()
            .unwrap()
            .push((ringtone.clone(), looped, volume.clamp(0.0, 1.0)));
        self.playing.store(true, Ordering::SeqCst);
        self.paused.store(false, Ordering::SeqCst);
        *self.volume.lock().unwrap() = volume.clamp(0.0, 1.0);
        Ok(())
    }

    fn pause(&self) {
        if self.playing.load(Ordering::SeqCst) {
            self.paused.store(true, Ordering::SeqCst);
        }
    }

    fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    fn stop(&self) {
        self.playing.store(false, Ordering::SeqCst);
        self.paused.store(false, Ordering::SeqCst);
    }

    fn set_volume(&self, volume: f32) {
        *self.volume.lock().unwrap() = volume.clamp(0.0, 1.0);
    }

    fn volume(&self) -> f32 {
        *self.volume.lock().unwrap()
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst) && !self.paused.load(Ordering::SeqCst)
    }

    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }
}
