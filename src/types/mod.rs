//! Core data types for the alarm engine.
//!
//! This module defines:
//! - Alarm specifications with boundary validation
//! - The `Alarm` entity held by the registry
//! - Quick-set alarm presets
//! - Engine configuration with validation
//! - The polled status surface exposed to front-ends

use std::time::Duration as StdDuration;

use chrono::{DateTime, Datelike, Duration, Local, LocalResult, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audio::{Ringtone, ToneKind};

// ============================================================================
// Validation
// ============================================================================

/// Rejected alarm input. Validation errors never enter the registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Hour must be within 0-23.
    #[error("hour must be within 0-23, got {0}")]
    HourOutOfRange(u32),

    /// Minute must be within 0-59.
    #[error("minute must be within 0-59, got {0}")]
    MinuteOutOfRange(u32),

    /// Snooze must be within 1-60 minutes.
    #[error("snooze must be within 1-60 minutes, got {0}")]
    SnoozeOutOfRange(u32),
}

// ============================================================================
// AlarmSpec
// ============================================================================

/// A request to add an alarm, as received from a front-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmSpec {
    /// Target hour (0-23).
    pub hour: u32,
    /// Target minute (0-59).
    pub minute: u32,
    /// Free-text label; may be empty.
    #[serde(default)]
    pub label: String,
    /// Snooze duration in minutes (1-60).
    #[serde(rename = "snoozeMinutes")]
    pub snooze_minutes: u32,
    /// Ringtone to sound with.
    #[serde(default)]
    pub ringtone: Ringtone,
    /// Playback volume; clamped to [0.0, 1.0] on insertion.
    #[serde(default = "default_volume")]
    pub volume: f32,
}

fn default_volume() -> f32 {
    1.0
}

impl Default for AlarmSpec {
    fn default() -> Self {
        Self {
            hour: 7,
            minute: 0,
            label: String::new(),
            snooze_minutes: 5,
            ringtone: Ringtone::default(),
            volume: 1.0,
        }
    }
}

impl AlarmSpec {
    /// Creates a spec for the given wall-clock time with default options.
    #[must_use]
    pub fn at(hour: u32, minute: u32) -> Self {
        Self {
            hour,
            minute,
            ..Self::default()
        }
    }

    /// Sets the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the snooze duration in minutes.
    #[must_use]
    pub fn with_snooze_minutes(mut self, minutes: u32) -> Self {
        self.snooze_minutes = minutes;
        self
    }

    /// Sets the ringtone.
    #[must_use]
    pub fn with_ringtone(mut self, ringtone: Ringtone) -> Self {
        self.ringtone = ringtone;
        self
    }

    /// Sets the playback volume.
    #[must_use]
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    /// Validates the spec against the boundary ranges.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range field as a [`ValidationError`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.hour > 23 {
            return Err(ValidationError::HourOutOfRange(self.hour));
        }
        if self.minute > 59 {
            return Err(ValidationError::MinuteOutOfRange(self.minute));
        }
        validate_snooze(self.snooze_minutes)?;
        Ok(())
    }
}

/// Validates a snooze duration on its own (also used by alarm edits).
///
/// # Errors
///
/// Returns [`ValidationError::SnoozeOutOfRange`] outside 1-60 minutes.
pub fn validate_snooze(minutes: u32) -> Result<(), ValidationError> {
    if !(1..=60).contains(&minutes) {
        return Err(ValidationError::SnoozeOutOfRange(minutes));
    }
    Ok(())
}

// ============================================================================
// Alarm
// ============================================================================

/// One pending reminder, as held by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alarm {
    /// Unique id, monotonically assigned, never reused within a process.
    pub id: u64,
    /// Absolute trigger time, always in the future at insertion.
    #[serde(rename = "triggerTime")]
    pub trigger_time: DateTime<Local>,
    /// Free-text label; may be empty.
    pub label: String,
    /// Snooze duration in minutes.
    #[serde(rename = "snoozeMinutes")]
    pub snooze_minutes: u32,
    /// Ringtone to sound with.
    pub ringtone: Ringtone,
    /// Playback volume in [0.0, 1.0].
    pub volume: f32,
    /// Soft-disable without removal.
    pub enabled: bool,
    /// Creation timestamp, informational only.
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Local>,
}

// ============================================================================
// Scheduling helpers
// ============================================================================

/// Computes the next occurrence of a wall-clock time: today at
/// `hour:minute`, rolled forward one day if that is not strictly in the
/// future.
#[must_use]
pub fn next_occurrence(now: DateTime<Local>, hour: u32, minute: u32) -> DateTime<Local> {
    let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default();
    let mut candidate = now.date_naive().and_time(time);
    if candidate <= now.naive_local() {
        candidate += Duration::days(1);
    }
    resolve_local(candidate)
}

/// Resolves a naive local timestamp to a concrete local instant.
///
/// DST ambiguity takes the earlier instant; a time inside a spring-forward
/// gap shifts one hour later.
fn resolve_local(naive: NaiveDateTime) -> DateTime<Local> {
    match naive.and_local_timezone(Local) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => match (naive + Duration::hours(1)).and_local_timezone(Local) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
            LocalResult::None => Local::now(),
        },
    }
}

fn advance_one_day(trigger: DateTime<Local>) -> DateTime<Local> {
    resolve_local(trigger.naive_local() + Duration::days(1))
}

// ============================================================================
// Presets
// ============================================================================

/// Quick-set alarm presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmPreset {
    /// 07:30 on the next weekday.
    WeekdayWake,
    /// 09:00 on the next weekend day.
    WeekendWake,
    /// 12:00 daily.
    Lunch,
    /// 15:30 daily.
    AfternoonTea,
    /// 18:30 daily.
    Dinner,
    /// 22:30 daily.
    Bedtime,
}

impl AlarmPreset {
    /// All presets, in display order.
    pub const ALL: &'static [AlarmPreset] = &[
        AlarmPreset::WeekdayWake,
        AlarmPreset::WeekendWake,
        AlarmPreset::Lunch,
        AlarmPreset::AfternoonTea,
        AlarmPreset::Dinner,
        AlarmPreset::Bedtime,
    ];

    /// Target wall-clock time of the preset.
    #[must_use]
    pub fn time(&self) -> (u32, u32) {
        match self {
            AlarmPreset::WeekdayWake => (7, 30),
            AlarmPreset::WeekendWake => (9, 0),
            AlarmPreset::Lunch => (12, 0),
            AlarmPreset::AfternoonTea => (15, 30),
            AlarmPreset::Dinner => (18, 30),
            AlarmPreset::Bedtime => (22, 30),
        }
    }

    /// Display label used for the created alarm.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            AlarmPreset::WeekdayWake => "Weekday wake-up",
            AlarmPreset::WeekendWake => "Weekend wake-up",
            AlarmPreset::Lunch => "Lunch",
            AlarmPreset::AfternoonTea => "Afternoon tea",
            AlarmPreset::Dinner => "Dinner",
            AlarmPreset::Bedtime => "Bedtime",
        }
    }

    /// Resolves the preset to an alarm spec with default ringtone/volume.
    #[must_use]
    pub fn spec(&self) -> AlarmSpec {
        let (hour, minute) = self.time();
        AlarmSpec::at(hour, minute).with_label(self.label())
    }

    /// Computes the first trigger instant for this preset.
    ///
    /// Daily presets use the plain roll-forward rule; the wake presets
    /// additionally skip to the next weekday or weekend day.
    #[must_use]
    pub fn first_trigger(&self, now: DateTime<Local>) -> DateTime<Local> {
        let (hour, minute) = self.time();
        let mut trigger = next_occurrence(now, hour, minute);
        match self {
            AlarmPreset::WeekdayWake => {
                while is_weekend(trigger.weekday()) {
                    trigger = advance_one_day(trigger);
                }
            }
            AlarmPreset::WeekendWake => {
                while !is_weekend(trigger.weekday()) {
                    trigger = advance_one_day(trigger);
                }
            }
            _ => {}
        }
        trigger
    }
}

fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}

// ============================================================================
// EngineConfig
// ============================================================================

/// Tuning knobs for the alarm engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Trigger-loop polling period in milliseconds.
    #[serde(rename = "pollIntervalMs")]
    pub poll_interval_ms: u64,
    /// Backoff after a failed trigger-loop tick, in milliseconds.
    #[serde(rename = "tickBackoffMs")]
    pub tick_backoff_ms: u64,
    /// Playback-monitor polling period in milliseconds.
    #[serde(rename = "monitorIntervalMs")]
    pub monitor_interval_ms: u64,
    /// Unsupervised external playback is only inspected every this many
    /// monitor ticks (no better liveness signal exists for it).
    #[serde(rename = "unsupervisedCheckTicks")]
    pub unsupervised_check_ticks: u32,
    /// Grace window between asking a playback process to terminate and
    /// killing it, in milliseconds.
    #[serde(rename = "terminationGraceMs")]
    pub termination_grace_ms: u64,
    /// Built tone used when a ringtone file cannot be played.
    #[serde(rename = "fallbackTone")]
    pub fallback_tone: ToneKind,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1_000,
            tick_backoff_ms: 5_000,
            monitor_interval_ms: 500,
            unsupervised_check_ticks: 120,
            termination_grace_ms: 250,
            fallback_tone: ToneKind::Classic,
        }
    }
}

impl EngineConfig {
    /// Sets the trigger-loop polling period.
    #[must_use]
    pub fn with_poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Sets the failed-tick backoff.
    #[must_use]
    pub fn with_tick_backoff_ms(mut self, ms: u64) -> Self {
        self.tick_backoff_ms = ms;
        self
    }

    /// Sets the playback-monitor polling period.
    #[must_use]
    pub fn with_monitor_interval_ms(mut self, ms: u64) -> Self {
        self.monitor_interval_ms = ms;
        self
    }

    /// Sets the fallback tone.
    #[must_use]
    pub fn with_fallback_tone(mut self, tone: ToneKind) -> Self {
        self.fallback_tone = tone;
        self
    }

    /// Validates the configuration ranges.
    ///
    /// # Errors
    ///
    /// Returns a message naming the out-of-range field.
    pub fn validate(&self) -> Result<(), String> {
        if !(100..=60_000).contains(&self.poll_interval_ms) {
            return Err("poll interval must be within 100-60000 ms".to_string());
        }
        if !(100..=600_000).contains(&self.tick_backoff_ms) {
            return Err("tick backoff must be within 100-600000 ms".to_string());
        }
        if !(50..=10_000).contains(&self.monitor_interval_ms) {
            return Err("monitor interval must be within 50-10000 ms".to_string());
        }
        if self.unsupervised_check_ticks == 0 {
            return Err("unsupervised check ticks must be at least 1".to_string());
        }
        if self.termination_grace_ms > 5_000 {
            return Err("termination grace must be at most 5000 ms".to_string());
        }
        Ok(())
    }

    /// Trigger-loop polling period as a `Duration`.
    #[must_use]
    pub fn poll_interval(&self) -> StdDuration {
        StdDuration::from_millis(self.poll_interval_ms)
    }

    /// Failed-tick backoff as a `Duration`.
    #[must_use]
    pub fn tick_backoff(&self) -> StdDuration {
        StdDuration::from_millis(self.tick_backoff_ms)
    }

    /// Playback-monitor polling period as a `Duration`.
    #[must_use]
    pub fn monitor_interval(&self) -> StdDuration {
        StdDuration::from_millis(self.monitor_interval_ms)
    }

    /// Termination grace window as a `Duration`.
    #[must_use]
    pub fn termination_grace(&self) -> StdDuration {
        StdDuration::from_millis(self.termination_grace_ms)
    }
}

// ============================================================================
// Status surface
// ============================================================================

/// The next alarm scheduled to fire, with its countdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextDue {
    /// Alarm id.
    pub id: u64,
    /// Alarm label.
    pub label: String,
    /// Absolute trigger time.
    #[serde(rename = "triggerTime")]
    pub trigger_time: DateTime<Local>,
    /// Whole seconds until the trigger; zero once due.
    #[serde(rename = "remainingSeconds")]
    pub remaining_seconds: i64,
}

impl NextDue {
    /// Builds the countdown entry for an alarm at the given instant.
    #[must_use]
    pub fn from_alarm(alarm: &Alarm, now: DateTime<Local>) -> Self {
        Self {
            id: alarm.id,
            label: alarm.label.clone(),
            trigger_time: alarm.trigger_time,
            remaining_seconds: (alarm.trigger_time - now).num_seconds().max(0),
        }
    }
}

/// Snapshot of engine state for front-ends to poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineStatus {
    /// Pending alarms, in registry order.
    pub alarms: Vec<Alarm>,
    /// Next enabled alarm and its countdown, if known.
    #[serde(rename = "nextDue", skip_serializing_if = "Option::is_none", default)]
    pub next_due: Option<NextDue>,
    /// True while a ringing session is active.
    #[serde(rename = "isRinging")]
    pub is_ringing: bool,
    /// Label of the alarm currently ringing.
    #[serde(rename = "ringingLabel", skip_serializing_if = "Option::is_none", default)]
    pub ringing_label: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(y, mo, d, h, mi, s)
            .single()
            .expect("unambiguous test timestamp")
    }

    // ------------------------------------------------------------------------
    // AlarmSpec validation
    // ------------------------------------------------------------------------

    mod spec_tests {
        use super::*;

        #[test]
        fn test_default_spec_is_valid() {
            assert!(AlarmSpec::default().validate().is_ok());
        }

        #[test]
        fn test_builder() {
            let spec = AlarmSpec::at(6, 45)
                .with_label("gym")
                .with_snooze_minutes(10)
                .with_volume(0.5);
            assert_eq!(spec.hour, 6);
            assert_eq!(spec.minute, 45);
            assert_eq!(spec.label, "gym");
            assert_eq!(spec.snooze_minutes, 10);
            assert_eq!(spec.volume, 0.5);
        }

        #[test]
        fn test_boundary_values_valid() {
            assert!(AlarmSpec::at(0, 0).validate().is_ok());
            assert!(AlarmSpec::at(23, 59).validate().is_ok());
            assert!(AlarmSpec::at(7, 0).with_snooze_minutes(1).validate().is_ok());
            assert!(AlarmSpec::at(7, 0).with_snooze_minutes(60).validate().is_ok());
        }

        #[test]
        fn test_hour_out_of_range() {
            let err = AlarmSpec::at(24, 0).validate().unwrap_err();
            assert_eq!(err, ValidationError::HourOutOfRange(24));
        }

        #[test]
        fn test_minute_out_of_range() {
            let err = AlarmSpec::at(7, 60).validate().unwrap_err();
            assert_eq!(err, ValidationError::MinuteOutOfRange(60));
        }

        #[test]
        fn test_snooze_out_of_range() {
            let err = AlarmSpec::at(7, 0)
                .with_snooze_minutes(0)
                .validate()
                .unwrap_err();
            assert_eq!(err, ValidationError::SnoozeOutOfRange(0));
            let err = AlarmSpec::at(7, 0)
                .with_snooze_minutes(61)
                .validate()
                .unwrap_err();
            assert_eq!(err, ValidationError::SnoozeOutOfRange(61));
        }

        #[test]
        fn test_serialize_deserialize() {
            let spec = AlarmSpec::at(7, 30).with_label("wake");
            let json = serde_json::to_string(&spec).unwrap();
            assert!(json.contains("\"snoozeMinutes\":5"));
            let parsed: AlarmSpec = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, spec);
        }
    }

    // ------------------------------------------------------------------------
    // Scheduling
    // ------------------------------------------------------------------------

    mod scheduling_tests {
        use super::*;

        #[test]
        fn test_future_time_stays_today() {
            let now = local(2026, 3, 2, 6, 0, 0);
            let trigger = next_occurrence(now, 7, 30);
            assert_eq!(trigger, local(2026, 3, 2, 7, 30, 0));
        }

        #[test]
        fn test_past_time_rolls_forward() {
            let now = local(2026, 3, 2, 8, 0, 0);
            let trigger = next_occurrence(now, 7, 30);
            assert_eq!(trigger, local(2026, 3, 3, 7, 30, 0));
        }

        #[test]
        fn test_exact_current_minute_rolls_a_full_day() {
            let now = local(2026, 3, 2, 7, 30, 0);
            let trigger = next_occurrence(now, 7, 30);
            assert_eq!(trigger, local(2026, 3, 3, 7, 30, 0));
        }

        #[test]
        fn test_seconds_past_the_minute_roll_forward() {
            // 07:30:45 asking for 07:30 targets tomorrow, not 45 seconds ago.
            let now = local(2026, 3, 2, 7, 30, 45);
            let trigger = next_occurrence(now, 7, 30);
            assert_eq!(trigger, local(2026, 3, 3, 7, 30, 0));
        }

        #[test]
        fn test_trigger_is_always_future() {
            let now = local(2026, 3, 2, 12, 0, 0);
            for hour in [0, 6, 12, 18, 23] {
                for minute in [0, 30, 59] {
                    assert!(next_occurrence(now, hour, minute) > now);
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Presets
    // ------------------------------------------------------------------------

    mod preset_tests {
        use super::*;

        #[test]
        fn test_preset_times() {
            assert_eq!(AlarmPreset::WeekdayWake.time(), (7, 30));
            assert_eq!(AlarmPreset::WeekendWake.time(), (9, 0));
            assert_eq!(AlarmPreset::Lunch.time(), (12, 0));
            assert_eq!(AlarmPreset::AfternoonTea.time(), (15, 30));
            assert_eq!(AlarmPreset::Dinner.time(), (18, 30));
            assert_eq!(AlarmPreset::Bedtime.time(), (22, 30));
        }

        #[test]
        fn test_spec_carries_label() {
            let spec = AlarmPreset::Lunch.spec();
            assert_eq!(spec.label, "Lunch");
            assert_eq!((spec.hour, spec.minute), (12, 0));
            assert!(spec.validate().is_ok());
        }

        #[test]
        fn test_daily_preset_rolls_forward() {
            // 2026-03-02 is a Monday.
            let now = local(2026, 3, 2, 13, 0, 0);
            let trigger = AlarmPreset::Lunch.first_trigger(now);
            assert_eq!(trigger, local(2026, 3, 3, 12, 0, 0));
        }

        #[test]
        fn test_weekday_wake_skips_weekend() {
            // Friday 08:00: 07:30 already passed, Saturday/Sunday skipped.
            let friday = local(2026, 3, 6, 8, 0, 0);
            let trigger = AlarmPreset::WeekdayWake.first_trigger(friday);
            assert_eq!(trigger, local(2026, 3, 9, 7, 30, 0));
            assert_eq!(trigger.weekday(), Weekday::Mon);
        }

        #[test]
        fn test_weekend_wake_skips_weekdays() {
            // Monday: next weekend day is Saturday.
            let monday = local(2026, 3, 2, 10, 0, 0);
            let trigger = AlarmPreset::WeekendWake.first_trigger(monday);
            assert_eq!(trigger, local(2026, 3, 7, 9, 0, 0));
            assert_eq!(trigger.weekday(), Weekday::Sat);
        }

        #[test]
        fn test_weekend_wake_on_saturday_morning() {
            let saturday = local(2026, 3, 7, 8, 0, 0);
            let trigger = AlarmPreset::WeekendWake.first_trigger(saturday);
            assert_eq!(trigger, local(2026, 3, 7, 9, 0, 0));
        }

        #[test]
        fn test_all_presets_trigger_in_future() {
            let now = local(2026, 3, 4, 16, 0, 0);
            for preset in AlarmPreset::ALL {
                assert!(preset.first_trigger(now) > now, "{preset:?}");
            }
        }
    }

    // ------------------------------------------------------------------------
    // EngineConfig
    // ------------------------------------------------------------------------

    mod config_tests {
        use super::*;

        #[test]
        fn test_default_values() {
            let config = EngineConfig::default();
            assert_eq!(config.poll_interval_ms, 1_000);
            assert_eq!(config.tick_backoff_ms, 5_000);
            assert_eq!(config.monitor_interval_ms, 500);
            assert_eq!(config.unsupervised_check_ticks, 120);
            assert_eq!(config.termination_grace_ms, 250);
            assert_eq!(config.fallback_tone, ToneKind::Classic);
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_builder() {
            let config = EngineConfig::default()
                .with_poll_interval_ms(200)
                .with_tick_backoff_ms(1_000)
                .with_monitor_interval_ms(100)
                .with_fallback_tone(ToneKind::Gentle);
            assert_eq!(config.poll_interval_ms, 200);
            assert_eq!(config.tick_backoff_ms, 1_000);
            assert_eq!(config.monitor_interval_ms, 100);
            assert_eq!(config.fallback_tone, ToneKind::Gentle);
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_validate_rejects_out_of_range() {
            assert!(EngineConfig::default()
                .with_poll_interval_ms(0)
                .validate()
                .is_err());
            assert!(EngineConfig::default()
                .with_poll_interval_ms(61_000)
                .validate()
                .is_err());
            assert!(EngineConfig::default()
                .with_monitor_interval_ms(10)
                .validate()
                .is_err());
            assert!(EngineConfig::default()
                .with_tick_backoff_ms(0)
                .validate()
                .is_err());

            let mut config = EngineConfig::default();
            config.unsupervised_check_ticks = 0;
            assert!(config.validate().is_err());

            let mut config = EngineConfig::default();
            config.termination_grace_ms = 10_000;
            assert!(config.validate().is_err());
        }

        #[test]
        fn test_duration_helpers() {
            let config = EngineConfig::default();
            assert_eq!(config.poll_interval(), StdDuration::from_secs(1));
            assert_eq!(config.tick_backoff(), StdDuration::from_secs(5));
            assert_eq!(config.monitor_interval(), StdDuration::from_millis(500));
            assert_eq!(config.termination_grace(), StdDuration::from_millis(250));
        }
    }

    // ------------------------------------------------------------------------
    // Status surface
    // ------------------------------------------------------------------------

    mod status_tests {
        use super::*;

        fn sample_alarm(id: u64, trigger: DateTime<Local>) -> Alarm {
            Alarm {
                id,
                trigger_time: trigger,
                label: "wake".to_string(),
                snooze_minutes: 5,
                ringtone: Ringtone::default(),
                volume: 1.0,
                enabled: true,
                created_at: trigger - Duration::hours(1),
            }
        }

        #[test]
        fn test_next_due_countdown() {
            let now = local(2026, 3, 2, 7, 0, 0);
            let alarm = sample_alarm(1, local(2026, 3, 2, 7, 30, 0));
            let next = NextDue::from_alarm(&alarm, now);
            assert_eq!(next.id, 1);
            assert_eq!(next.remaining_seconds, 30 * 60);
        }

        #[test]
        fn test_next_due_never_negative() {
            let now = local(2026, 3, 2, 8, 0, 0);
            let alarm = sample_alarm(1, local(2026, 3, 2, 7, 30, 0));
            let next = NextDue::from_alarm(&alarm, now);
            assert_eq!(next.remaining_seconds, 0);
        }

        #[test]
        fn test_status_serialization_omits_empty_fields() {
            let status = EngineStatus {
                alarms: Vec::new(),
                next_due: None,
                is_ringing: false,
                ringing_label: None,
            };
            let json = serde_json::to_string(&status).unwrap();
            assert!(json.contains("\"isRinging\":false"));
            assert!(!json.contains("nextDue"));
            assert!(!json.contains("ringingLabel"));
        }

        #[test]
        fn test_status_round_trip() {
            let now = local(2026, 3, 2, 7, 0, 0);
            let alarm = sample_alarm(3, local(2026, 3, 2, 7, 30, 0));
            let status = EngineStatus {
                alarms: vec![alarm.clone()],
                next_due: Some(NextDue::from_alarm(&alarm, now)),
                is_ringing: true,
                ringing_label: Some("wake".to_string()),
            };
            let json = serde_json::to_string(&status).unwrap();
            let parsed: EngineStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, status);
        }
    }
}
