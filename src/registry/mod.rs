//! The alarm registry: the authoritative in-memory set of pending alarms.
//!
//! Ids are assigned monotonically and never reused within a process
//! lifetime. Insertion order is irrelevant to firing order: due alarms are
//! taken in (trigger time, id) order, so simultaneous alarms fire oldest-id
//! first. The registry itself is not synchronized; the engine wraps it in
//! its single state lock.

use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::types::{next_occurrence, validate_snooze, Alarm, AlarmSpec, ValidationError};

/// Suffix appended to the label of a snoozed alarm's re-insertion.
pub const SNOOZE_LABEL_SUFFIX: &str = " (snoozed)";

/// In-memory set of pending alarms.
#[derive(Debug, Default)]
pub struct AlarmRegistry {
    alarms: Vec<Alarm>,
    next_id: u64,
}

impl AlarmRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            alarms: Vec::new(),
            next_id: 1,
        }
    }

    fn assign_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Validates a spec and inserts the alarm it describes.
    ///
    /// The trigger time is `hour:minute` today, rolled forward one day if
    /// that is not strictly in the future.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] on out-of-range input; the registry is
    /// left unchanged.
    pub fn add(&mut self, spec: &AlarmSpec, now: DateTime<Local>) -> Result<u64, ValidationError> {
        let trigger = next_occurrence(now, spec.hour, spec.minute);
        self.add_with_trigger(spec, trigger, now)
    }

    /// Validates a spec and inserts it with a precomputed trigger instant
    /// (used by presets, whose schedule is richer than plain roll-forward).
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] on out-of-range input.
    pub fn add_with_trigger(
        &mut self,
        spec: &AlarmSpec,
        trigger_time: DateTime<Local>,
        now: DateTime<Local>,
    ) -> Result<u64, ValidationError> {
        spec.validate()?;

        let id = self.assign_id();
        let alarm = Alarm {
            id,
            trigger_time,
            label: spec.label.clone(),
            snooze_minutes: spec.snooze_minutes,
            ringtone: spec.ringtone.clone(),
            volume: spec.volume.clamp(0.0, 1.0),
            enabled: true,
            created_at: now,
        };
        info!(
            id,
            trigger = %alarm.trigger_time,
            label = %alarm.label,
            "alarm added"
        );
        self.alarms.push(alarm);
        Ok(id)
    }

    /// Re-inserts a fired alarm at an absolute time (the snooze path).
    ///
    /// The new alarm keeps the original's ringtone, volume, and snooze
    /// duration, gets a fresh id, and its label gains the snooze suffix.
    pub fn add_snoozed(&mut self, original: &Alarm, at: DateTime<Local>, now: DateTime<Local>) -> u64 {
        let id = self.assign_id();
        let alarm = Alarm {
            id,
            trigger_time: at,
            label: format!("{}{}", original.label, SNOOZE_LABEL_SUFFIX),
            snooze_minutes: original.snooze_minutes,
            ringtone: original.ringtone.clone(),
            volume: original.volume,
            enabled: true,
            created_at: now,
        };
        info!(id, original = original.id, trigger = %at, "alarm snoozed");
        self.alarms.push(alarm);
        id
    }

    /// Removes the alarm with the given id. Idempotent: removing a missing
    /// id is not an error.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.alarms.len();
        self.alarms.retain(|alarm| alarm.id != id);
        let removed = self.alarms.len() != before;
        if removed {
            info!(id, "alarm removed");
        }
        removed
    }

    /// Removes every alarm.
    pub fn clear(&mut self) {
        let count = self.alarms.len();
        self.alarms.clear();
        if count > 0 {
            info!(count, "all alarms cancelled");
        }
    }

    /// Edits an alarm's label and snooze duration in place.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the new snooze duration is out of
    /// range. `Ok(false)` means the id was not found.
    pub fn update(
        &mut self,
        id: u64,
        label: impl Into<String>,
        snooze_minutes: u32,
    ) -> Result<bool, ValidationError> {
        validate_snooze(snooze_minutes)?;
        match self.alarms.iter_mut().find(|alarm| alarm.id == id) {
            Some(alarm) => {
                alarm.label = label.into();
                alarm.snooze_minutes = snooze_minutes;
                info!(id, "alarm updated");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Enables or disables an alarm without removing it.
    pub fn set_enabled(&mut self, id: u64, enabled: bool) -> bool {
        match self.alarms.iter_mut().find(|alarm| alarm.id == id) {
            Some(alarm) => {
                alarm.enabled = enabled;
                debug!(id, enabled, "alarm enabled flag changed");
                true
            }
            None => false,
        }
    }

    /// Snapshot copy of the alarm list, in current registry order.
    #[must_use]
    pub fn list(&self) -> Vec<Alarm> {
        self.alarms.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.alarms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alarms.is_empty()
    }

    /// The enabled alarm with the smallest trigger time, if any.
    #[must_use]
    pub fn next_due(&self) -> Option<&Alarm> {
        self.alarms
            .iter()
            .filter(|alarm| alarm.enabled)
            .min_by_key(|alarm| (alarm.trigger_time, alarm.id))
    }

    /// Removes and returns every enabled alarm whose trigger time has
    /// arrived, in (trigger time, id) order. Disabled alarms stay put.
    pub fn take_due(&mut self, now: DateTime<Local>) -> Vec<Alarm> {
        let mut due: Vec<Alarm> = Vec::new();
        let mut remaining: Vec<Alarm> = Vec::with_capacity(self.alarms.len());
        for alarm in self.alarms.drain(..) {
            if alarm.enabled && alarm.trigger_time <= now {
                due.push(alarm);
            } else {
                remaining.push(alarm);
            }
        }
        self.alarms = remaining;
        due.sort_by_key(|alarm| (alarm.trigger_time, alarm.id));
        for alarm in &due {
            info!(id = alarm.id, label = %alarm.label, "alarm due");
        }
        due
    }

    /// Reorders the backing list by trigger time.
    pub fn sort_by_time(&mut self) {
        self.alarms
            .sort_by_key(|alarm| (alarm.trigger_time, alarm.id));
    }

    /// Reorders the backing list by label (empty labels last), then time.
    pub fn sort_by_label(&mut self) {
        self.alarms.sort_by(|a, b| {
            match (a.label.is_empty(), b.label.is_empty()) {
                (true, false) => std::cmp::Ordering::Greater,
                (false, true) => std::cmp::Ordering::Less,
                _ => a
                    .label
                    .cmp(&b.label)
                    .then(a.trigger_time.cmp(&b.trigger_time)),
            }
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
