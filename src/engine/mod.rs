//! The alarm engine: scheduling, firing, and playback lifecycle.
//!
//! `AlarmEngine` is the explicit context object owning all shared state
//! (the alarm registry, the process ledger, the firing queue, and the
//! active ringing session) behind one mutex. The clock, player, and
//! external launcher are injected, so independent engines can be built
//! for tests.
//!
//! Two kinds of background task cooperate with it:
//!
//! - the **trigger loop**: polls the registry against the clock once per
//!   second, fires due alarms, and parks itself when nothing is pending
//!   (`add` lazily restarts it). A failed tick is logged and retried
//!   after a backoff; the loop never dies from a transient error.
//! - a **playback monitor** per ringing session: re-plays in-process
//!   audio that drained and relaunches a supervised external player that
//!   exited while the alarm is still ringing.
//!
//! Lock discipline: the state mutex is never held across an await, and no
//! call path re-locks it. Guards recover from poisoning so the alarm duty
//! survives a panicked peer task.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Local;
use thiserror::Error;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::audio::{AudioError, AudioPlayer, Ringtone};
use crate::clock::{Clock, ClockError, SystemClock};
use crate::launch::{terminate, PlaybackHandle, ProcessLauncher, SystemLauncher};
use crate::ledger::{ProcessLedger, ProcessRecord};
use crate::registry::AlarmRegistry;
use crate::ringing::{PlaybackBackend, RingingPhase, RingingSession};
use crate::types::{
    Alarm, AlarmPreset, AlarmSpec, EngineConfig, EngineStatus, NextDue, ValidationError,
};

/// Bounded wait for the trigger loop to observe shutdown before aborting it.
const SHUTDOWN_WAIT: Duration = Duration::from_secs(2);

/// Errors returned by engine entry points.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Rejected alarm input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The wall clock could not be read.
    #[error(transparent)]
    Clock(#[from] ClockError),
}

/// Everything the engine shares across tasks, behind one lock.
struct EngineState {
    registry: AlarmRegistry,
    ledger: ProcessLedger,
    fire_queue: VecDeque<Alarm>,
    session: Option<RingingSession>,
    session_counter: u64,
    trigger_handle: Option<JoinHandle<()>>,
}

enum MonitorAction {
    None,
    Replay(Ringtone, f32),
    Relaunch(std::path::PathBuf),
}

/// The alarm scheduling and playback-lifecycle engine.
pub struct AlarmEngine {
    state: Mutex<EngineState>,
    config: EngineConfig,
    player: Arc<dyn AudioPlayer>,
    launcher: Arc<dyn ProcessLauncher>,
    clock: Arc<dyn Clock>,
    shutting_down: AtomicBool,
    wake: Notify,
}

impl AlarmEngine {
    /// Creates an engine with injected collaborators.
    #[must_use]
    pub fn new(
        config: EngineConfig,
        player: Arc<dyn AudioPlayer>,
        launcher: Arc<dyn ProcessLauncher>,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(EngineState {
                registry: AlarmRegistry::new(),
                ledger: ProcessLedger::default(),
                fire_queue: VecDeque::new(),
                session: None,
                session_counter: 0,
                trigger_handle: None,
            }),
            config,
            player,
            launcher,
            clock,
            shutting_down: AtomicBool::new(false),
            wake: Notify::new(),
        })
    }

    /// Creates an engine with the production collaborators: the system
    /// clock, the layered external launcher, and the rodio player (or the
    /// unavailable stand-in when the host has no audio device).
    #[must_use]
    pub fn with_defaults(config: EngineConfig) -> Arc<Self> {
        let player: Arc<dyn AudioPlayer> = match crate::audio::try_create_player() {
            Some(player) => player,
            None => Arc::new(crate::audio::NullAudioPlayer),
        };
        Self::new(
            config,
            player,
            Arc::new(SystemLauncher),
            Arc::new(SystemClock),
        )
    }

    fn state(&self) -> MutexGuard<'_, EngineState> {
        // Keep ringing and ticking even if a panicked task poisoned the lock.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ------------------------------------------------------------------------
    // Registry entry points
    // ------------------------------------------------------------------------

    /// Validates and adds an alarm; restarts the trigger loop if it had
    /// parked.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] on out-of-range input or
    /// [`EngineError::Clock`] when the clock cannot be read; the registry
    /// is unchanged either way.
    pub fn add_alarm(self: &Arc<Self>, spec: &AlarmSpec) -> Result<u64, EngineError> {
        let now = self.clock.now()?;
        let id = self.state().registry.add(spec, now)?;
        self.ensure_trigger_loop();
        Ok(id)
    }

    /// Adds a quick-set preset alarm.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Clock`] when the clock cannot be read.
    pub fn add_preset(self: &Arc<Self>, preset: AlarmPreset) -> Result<u64, EngineError> {
        let now = self.clock.now()?;
        let trigger = preset.first_trigger(now);
        let id = self
            .state()
            .registry
            .add_with_trigger(&preset.spec(), trigger, now)?;
        self.ensure_trigger_loop();
        Ok(id)
    }

    /// Removes an alarm by id. Idempotent.
    pub fn remove_alarm(&self, id: u64) -> bool {
        self.state().registry.remove(id)
    }

    /// Cancels every pending alarm.
    pub fn cancel_all(&self) {
        self.state().registry.clear();
    }

    /// Edits an alarm's label and snooze duration.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the new snooze is out of range.
    pub fn update_alarm(
        &self,
        id: u64,
        label: impl Into<String>,
        snooze_minutes: u32,
    ) -> Result<bool, ValidationError> {
        self.state().registry.update(id, label, snooze_minutes)
    }

    /// Enables or disables an alarm without removing it.
    pub fn set_alarm_enabled(&self, id: u64, enabled: bool) -> bool {
        self.state().registry.set_enabled(id, enabled)
    }

    /// Snapshot of the pending alarms, in registry order.
    #[must_use]
    pub fn alarms(&self) -> Vec<Alarm> {
        self.state().registry.list()
    }

    /// Reorders the alarm list by trigger time.
    pub fn sort_by_time(&self) {
        self.state().registry.sort_by_time();
    }

    /// Reorders the alarm list by label.
    pub fn sort_by_label(&self) {
        self.state().registry.sort_by_label();
    }

    // ------------------------------------------------------------------------
    // Status surface
    // ------------------------------------------------------------------------

    /// True while a ringing session is active.
    #[must_use]
    pub fn is_ringing(&self) -> bool {
        self.state()
            .session
            .as_ref()
            .is_some_and(RingingSession::is_ringing)
    }

    /// Builds the polled status snapshot for front-ends.
    #[must_use]
    pub fn status(&self) -> EngineStatus {
        let now = self.clock.now().ok();
        let st = self.state();
        let next_due = match (st.registry.next_due(), now) {
            (Some(alarm), Some(now)) => Some(NextDue::from_alarm(alarm, now)),
            _ => None,
        };
        let (is_ringing, ringing_label) = match &st.session {
            Some(session) if session.is_ringing() => {
                (true, Some(session.label().to_string()))
            }
            _ => (false, None),
        };
        EngineStatus {
            alarms: st.registry.list(),
            next_due,
            is_ringing,
            ringing_label,
        }
    }

    // ------------------------------------------------------------------------
    // Ringing session entry points
    // ------------------------------------------------------------------------

    /// Stops the active ringing session through the full termination
    /// cascade, then surfaces the next queued firing if one is waiting.
    ///
    /// Safe to call at any time, including repeatedly or concurrently with
    /// the playback monitor; returns whether a session was actually
    /// active. To the user, stop always appears to work.
    pub fn stop_ringing(self: &Arc<Self>) -> bool {
        self.resolve_session(RingingPhase::Stopped).is_some()
    }

    /// Stops the active session and re-schedules its alarm for
    /// `snooze_minutes` from now. Returns the new alarm's id, or `None`
    /// when nothing is ringing or the clock cannot be read (in which case
    /// ringing continues, so the alarm is not lost).
    pub fn snooze(self: &Arc<Self>) -> Option<u64> {
        // Read the clock before tearing playback down.
        let now = match self.clock.now() {
            Ok(now) => now,
            Err(e) => {
                error!("snooze refused, clock unreadable: {e}");
                return None;
            }
        };

        let alarm = self.resolve_session(RingingPhase::Snoozed)?;
        let at = now + chrono::Duration::minutes(i64::from(alarm.snooze_minutes));
        let id = self.state().registry.add_snoozed(&alarm, at, now);
        self.ensure_trigger_loop();
        Some(id)
    }

    /// Stops the active session and defensively re-asserts that its alarm
    /// cannot re-fire.
    pub fn dismiss(self: &Arc<Self>) -> bool {
        match self.resolve_session(RingingPhase::Dismissed) {
            Some(alarm) => {
                // The trigger loop already removed it when firing; re-assert.
                self.state().registry.remove(alarm.id);
                true
            }
            None => false,
        }
    }

    /// Plays a ringtone once (non-looping) so the user can audition it.
    ///
    /// # Errors
    ///
    /// Refused with [`AudioError::Playback`] while an alarm is ringing;
    /// otherwise propagates player errors.
    pub fn preview(&self, ringtone: &Ringtone, volume: f32) -> Result<(), AudioError> {
        if self.state().session.is_some() {
            return Err(AudioError::Playback(
                "preview refused while an alarm is ringing".to_string(),
            ));
        }
        self.player.play(ringtone, false, volume)
    }

    /// Stops a running preview. Never touches an active ringing session.
    pub fn stop_preview(&self) {
        if self.state().session.is_none() {
            self.player.stop();
        }
    }

    /// Signals background tasks to exit, waits a bounded time for the
    /// trigger loop, and tears down any active session so no audio
    /// process survives the engine.
    pub async fn shutdown(self: &Arc<Self>) {
        info!("alarm engine shutting down");
        self.shutting_down.store(true, Ordering::SeqCst);
        self.wake.notify_waiters();

        let handle = self.state().trigger_handle.take();
        if let Some(handle) = handle {
            let abort = handle.abort_handle();
            if tokio::time::timeout(SHUTDOWN_WAIT, handle).await.is_err() {
                warn!("trigger loop did not observe shutdown in time; aborting");
                abort.abort();
            }
        }

        self.resolve_session(RingingPhase::Stopped);
        info!("alarm engine shut down");
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    /// Resolves the active session into a terminal phase, running the full
    /// termination cascade. Returns the alarm that had been ringing.
    fn resolve_session(self: &Arc<Self>, phase: RingingPhase) -> Option<Alarm> {
        let mut st = self.state();

        // Idempotent and unconditional; also silences a stray preview.
        self.player.stop();

        let mut session = st.session.take()?;
        session.phase = phase;
        let file_hint = session.file_hint().map(std::path::Path::to_path_buf);

        let report = terminate::run_cascade(
            session.handle.as_mut(),
            &mut st.ledger,
            file_hint.as_deref(),
            self.config.termination_grace(),
        );
        info!(
            id = session.alarm.id,
            label = %session.alarm.label,
            phase = session.phase.as_str(),
            handle_stopped = report.handle_stopped,
            "ringing resolved"
        );

        if !self.shutting_down.load(Ordering::SeqCst) {
            self.pump_fire_queue(&mut st);
        }
        Some(session.alarm)
    }

    /// One trigger pass: collect due alarms, queue them as firing events,
    /// and start a session if none is active. Returns whether anything is
    /// still pending (`false` lets the loop park).
    ///
    /// Normally driven by the background trigger loop; exposed for
    /// embedders and tests that drive time by hand.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Clock`] when the clock cannot be read; the
    /// loop treats that as transient.
    pub fn tick(self: &Arc<Self>) -> Result<bool, EngineError> {
        let now = self.clock.now()?;
        let mut st = self.state();

        for alarm in st.registry.take_due(now) {
            st.fire_queue.push_back(alarm);
        }
        self.pump_fire_queue(&mut st);

        let busy =
            !(st.registry.is_empty() && st.fire_queue.is_empty() && st.session.is_none());
        Ok(busy)
    }

    /// Starts a session for the next queued firing, if none is active.
    /// Firing events surface one at a time, in (trigger time, id) order.
    fn pump_fire_queue(self: &Arc<Self>, st: &mut EngineState) {
        if st.session.is_some() {
            return;
        }
        let Some(alarm) = st.fire_queue.pop_front() else {
            return;
        };

        st.session_counter += 1;
        let session_id = st.session_counter;
        let started_at = self.clock.now().unwrap_or(alarm.trigger_time);

        let mut session = RingingSession::new(session_id, alarm, started_at);
        let (backend, handle) = self.begin_playback(st, &session.alarm);
        session.backend = backend;
        session.handle = handle;
        info!(
            id = session.alarm.id,
            label = %session.alarm.label,
            "ringing started"
        );
        st.session = Some(session);

        // The monitor needs a runtime; without one (sync tests, embedders
        // driving ticks by hand) the session simply runs unmonitored.
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let engine = Arc::clone(self);
                runtime.spawn(run_monitor(engine, session_id));
            }
            Err(_) => debug!("no async runtime; playback monitor not started"),
        }
    }

    /// Selects a playback path for a firing alarm. Ringing state is set by
    /// the caller regardless of the outcome here: audible if technically
    /// possible, visible always.
    fn begin_playback(
        &self,
        st: &mut EngineState,
        alarm: &Alarm,
    ) -> (PlaybackBackend, Option<PlaybackHandle>) {
        match &alarm.ringtone {
            Ringtone::File(path) => {
                if self.player.is_available() {
                    match self.player.play(&alarm.ringtone, true, alarm.volume) {
                        Ok(()) => {
                            return (
                                PlaybackBackend::InProcess {
                                    ringtone: alarm.ringtone.clone(),
                                },
                                None,
                            )
                        }
                        Err(e) => warn!(
                            file = %path.display(),
                            "ringtone file unplayable ({e}); falling back to built tone"
                        ),
                    }
                    self.fall_back_to_tone(alarm)
                } else {
                    match self.launcher.launch(path) {
                        Ok(handle) => {
                            info!(
                                strategy = handle.strategy().as_str(),
                                file = %path.display(),
                                "external playback launched"
                            );
                            if let Some(pid) = handle.pid() {
                                let launched_at =
                                    self.clock.now().unwrap_or(alarm.trigger_time);
                                st.ledger.push(ProcessRecord {
                                    pid,
                                    launched_at,
                                    file: path.clone(),
                                    strategy: handle.strategy(),
                                });
                            }
                            (
                                PlaybackBackend::External { file: path.clone() },
                                Some(handle),
                            )
                        }
                        Err(e) => {
                            warn!("external launch failed: {e}; trying built tone");
                            self.fall_back_to_tone(alarm)
                        }
                    }
                }
            }
            Ringtone::Tone(_) => match self.player.play(&alarm.ringtone, true, alarm.volume) {
                Ok(()) => (
                    PlaybackBackend::InProcess {
                        ringtone: alarm.ringtone.clone(),
                    },
                    None,
                ),
                Err(e) => {
                    error!("fatal audio: built tone failed ({e}); ringing silently");
                    (PlaybackBackend::Silent, None)
                }
            },
        }
    }

    fn fall_back_to_tone(&self, alarm: &Alarm) -> (PlaybackBackend, Option<PlaybackHandle>) {
        let fallback = Ringtone::Tone(self.config.fallback_tone);
        match self.player.play(&fallback, true, alarm.volume) {
            Ok(()) => (PlaybackBackend::InProcess { ringtone: fallback }, None),
            Err(e) => {
                error!("fatal audio: fallback tone failed ({e}); ringing silently");
                (PlaybackBackend::Silent, None)
            }
        }
    }

    /// One monitor pass for the given session. Returns `false` when the
    /// session is gone (or superseded) and the monitor should exit.
    fn monitor_tick(self: &Arc<Self>, session_id: u64) -> bool {
        let mut st = self.state();

        let action = {
            let Some(session) = st.session.as_mut() else {
                return false;
            };
            if session.session_id != session_id || !session.is_ringing() {
                return false;
            }
            session.monitor_ticks += 1;
            let ticks = session.monitor_ticks;

            match &session.backend {
                PlaybackBackend::InProcess { ringtone } => {
                    if !self.player.is_playing() && !self.player.is_paused() {
                        MonitorAction::Replay(ringtone.clone(), session.alarm.volume)
                    } else {
                        MonitorAction::None
                    }
                }
                PlaybackBackend::External { file } => {
                    let file = file.clone();
                    match session.handle.as_mut() {
                        Some(handle) if handle.supervises_playback() => {
                            if handle.poll().is_some() {
                                MonitorAction::Relaunch(file)
                            } else {
                                MonitorAction::None
                            }
                        }
                        _ => {
                            // No liveness signal exists for launcher-style
                            // handles; just note the long-interval check.
                            if ticks % u64::from(self.config.unsupervised_check_ticks) == 0 {
                                debug!(
                                    session_id,
                                    "unsupervised external playback assumed alive"
                                );
                            }
                            MonitorAction::None
                        }
                    }
                }
                PlaybackBackend::Silent => MonitorAction::None,
            }
        };

        match action {
            MonitorAction::None => {}
            MonitorAction::Replay(ringtone, volume) => {
                debug!("in-process playback drained; replaying");
                if let Err(e) = self.player.play(&ringtone, true, volume) {
                    warn!("replay failed: {e}");
                }
            }
            MonitorAction::Relaunch(file) => {
                info!(file = %file.display(), "external playback ended early; relaunching");
                match self.launcher.launch(&file) {
                    Ok(handle) => {
                        if let Some(pid) = handle.pid() {
                            let launched_at =
                                self.clock.now().unwrap_or_else(|_| Local::now());
                            st.ledger.push(ProcessRecord {
                                pid,
                                launched_at,
                                file: file.clone(),
                                strategy: handle.strategy(),
                            });
                        }
                        if let Some(session) = st.session.as_mut() {
                            session.handle = Some(handle);
                        }
                    }
                    Err(e) => warn!("relaunch failed: {e}"),
                }
            }
        }
        true
    }

    /// Spawns the trigger loop if it is not already running. Called on
    /// every add, so the loop restarts lazily after parking.
    fn ensure_trigger_loop(self: &Arc<Self>) {
        if self.shutting_down.load(Ordering::SeqCst) {
            return;
        }
        let mut st = self.state();
        if st
            .trigger_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
        {
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let engine = Arc::clone(self);
                st.trigger_handle = Some(runtime.spawn(run_trigger_loop(engine)));
            }
            Err(_) => debug!("no async runtime; trigger loop not started"),
        }
    }

    #[cfg(any(test, feature = "test-utils"))]
    #[must_use]
    pub fn ledger_records(&self) -> Vec<ProcessRecord> {
        self.state().ledger.records().cloned().collect()
    }
}

/// The background trigger loop. Exits when nothing is pending; `add`
/// restarts it.
async fn run_trigger_loop(engine: Arc<AlarmEngine>) {
    let mut ticker = interval(engine.config.poll_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    info!("trigger loop started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = engine.wake.notified() => {}
        }
        if engine.shutting_down.load(Ordering::SeqCst) {
            break;
        }

        match engine.tick() {
            Ok(true) => {}
            Ok(false) => {
                debug!("no pending alarms; trigger loop parking");
                break;
            }
            Err(e) => {
                warn!("trigger tick failed: {e}; backing off");
                tokio::select! {
                    _ = tokio::time::sleep(engine.config.tick_backoff()) => {}
                    _ = engine.wake.notified() => {}
                }
            }
        }
    }
    info!("trigger loop exited");
}

/// The per-session playback monitor.
async fn run_monitor(engine: Arc<AlarmEngine>, session_id: u64) {
    let mut ticker = interval(engine.config.monitor_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    debug!(session_id, "playback monitor started");

    loop {
        ticker.tick().await;
        if engine.shutting_down.load(Ordering::SeqCst) {
            break;
        }
        if !engine.monitor_tick(session_id) {
            break;
        }
    }
    debug!(session_id, "playback monitor exited");
}

// ============================================================================
// Tests
// ============================================================================
