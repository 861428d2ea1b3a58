//! In-process alarm audio player implementation using rodio.
//!
//! One `OutputStream` is held for the lifetime of the player; each
//! playback request gets a fresh `Sink`. Looped files repeat indefinitely;
//! looped tones are appended as a batch of beep/gap cycles, and the
//! engine's playback monitor re-plays when a batch drains.

use std::fs::File;
use std::io::BufReader;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rodio::source::Source;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tracing::debug;

use super::error::AudioError;
use super::source::Ringtone;
use super::tone;

/// Beep/gap cycles appended per looped tone playback. Roughly 30 seconds
/// of ringing for the slowest pattern; the monitor refills when the batch
/// runs dry.
const LOOP_BATCH_CYCLES: usize = 30;

/// Cycles appended for a non-looping (preview) tone playback.
const PREVIEW_CYCLES: usize = 3;

/// Keep-alive wrapper for the rodio `OutputStream`.
///
/// cpal's audio `Stream` is marked `!Send`/`!Sync` uniformly across all
/// platforms, which propagates to `rodio::OutputStream`. The stream here is
/// only ever held for its lifetime side effect (dropping it tears down the
/// output device) and is never touched after construction — it is never read,
/// moved off the owning thread's logical ownership, or mutated. Wrapping it so
/// the player can satisfy the `AudioPlayer: Send + Sync` contract is sound
/// because no stream method is invoked across threads; all playback goes
/// through the separately-held `OutputStreamHandle`.
struct KeepAliveStream(#[allow(dead_code)] OutputStream);

// SAFETY: the wrapped stream is inert after construction — only its `Drop`
// runs, and that happens once when the uniquely-owning player is dropped.
unsafe impl Send for KeepAliveStream {}
unsafe impl Sync for KeepAliveStream {}

struct PlayerInner {
    sink: Option<Sink>,
    volume: f32,
}

/// An alarm audio player backed by rodio.
///
/// The player is thread-safe and intended to be shared via `Arc`.
/// Playback is non-blocking; audio continues in the background until
/// stopped or the queued source drains.
pub struct RodioAudioPlayer {
    /// The audio output stream (must be kept alive for playback).
    _stream: KeepAliveStream,
    /// Handle to the output stream for creating sinks.
    stream_handle: OutputStreamHandle,
    inner: Mutex<PlayerInner>,
}

impl RodioAudioPlayer {
    /// Creates a new player bound to the default audio output device.
    ///
    /// # Errors
    ///
    /// Returns `AudioError::DeviceUnavailable` if no audio output device
    /// is available.
    pub fn new() -> Result<Self, AudioError> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| AudioError::DeviceUnavailable(e.to_string()))?;

        debug!("audio output stream initialized");

        Ok(Self {
            _stream: KeepAliveStream(stream),
            stream_handle,
            inner: Mutex::new(PlayerInner {
                sink: None,
                volume: 1.0,
            }),
        })
    }

    fn lock_inner(&self) -> MutexGuard<'_, PlayerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts playback of the given ringtone, replacing any current playback.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink cannot be created, the ringtone file
    /// cannot be opened, or its format cannot be decoded. On error the
    /// previous playback has already been stopped.
    pub fn play(&self, ringtone: &Ringtone, looped: bool, volume: f32) -> Result<(), AudioError> {
        let volume = volume.clamp(0.0, 1.0);
        let mut inner = self.lock_inner();

        if let Some(old) = inner.sink.take() {
            old.stop();
        }

        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| AudioError::Stream(e.to_string()))?;
        sink.set_volume(volume);

        match ringtone {
            Ringtone::File(path) => {
                let file = File::open(path).map_err(|e| {
                    AudioError::FileNotFound(format!("{}: {}", path.display(), e))
                })?;
                let decoder = Decoder::new(BufReader::new(file))
                    .map_err(|e| AudioError::Decode(e.to_string()))?;
                if looped {
                    sink.append(decoder.repeat_infinite());
                } else {
                    sink.append(decoder);
                }
            }
            Ringtone::Tone(kind) => {
                let cycles = if looped { LOOP_BATCH_CYCLES } else { PREVIEW_CYCLES };
                for _ in 0..cycles {
                    sink.append(tone::beep(*kind));
                    sink.append(tone::beep_gap());
                }
            }
        }

        sink.play();
        debug!(ringtone = %ringtone.describe(), looped, volume, "playback started");

        inner.sink = Some(sink);
        inner.volume = volume;
        Ok(())
    }

    /// Pauses playback. No-op if nothing is playing.
    pub fn pause(&self) {
        let inner = self.lock_inner();
        if let Some(sink) = &inner.sink {
            if !sink.is_paused() && !sink.empty() {
                sink.pause();
                debug!("playback paused");
            }
        }
    }

    /// Resumes paused playback. No-op if not paused.
    pub fn resume(&self) {
        let inner = self.lock_inner();
        if let Some(sink) = &inner.sink {
            if sink.is_paused() {
                sink.play();
                debug!("playback resumed");
            }
        }
    }

    /// Stops playback and releases the loaded source. Idempotent.
    pub fn stop(&self) {
        let mut inner = self.lock_inner();
        if let Some(sink) = inner.sink.take() {
            sink.stop();
            debug!("playback stopped");
        }
    }

    /// Sets the playback volume, clamped to `[0.0, 1.0]`.
    pub fn set_volume(&self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        let mut inner = self.lock_inner();
        inner.volume = volume;
        if let Some(sink) = &inner.sink {
            sink.set_volume(volume);
        }
    }

    /// Returns the current playback volume.
    #[must_use]
    pub fn volume(&self) -> f32 {
        self.lock_inner().volume
    }

    /// Returns true if audio is currently playing (not paused, not drained).
    #[must_use]
    pub fn is_playing(&self) -> bool {
        let inner = self.lock_inner();
        inner
            .sink
            .as_ref()
            .is_some_and(|sink| !sink.empty() && !sink.is_paused())
    }

    /// Returns true if playback is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        let inner = self.lock_inner();
        inner
            .sink
            .as_ref()
            .is_some_and(|sink| sink.is_paused() && !sink.empty())
    }

    /// Returns true if the audio system is available.
    ///
    /// Always true once the player was successfully created, since the
    /// output stream is opened during construction.
    #[must_use]
    pub fn is_available(&self) -> bool {
        true
    }
}

impl std::fmt::Debug for RodioAudioPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioAudioPlayer")
            .field("volume", &self.volume())
            .finish_non_exhaustive()
    }
}
