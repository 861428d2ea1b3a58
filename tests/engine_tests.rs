//! Integration tests for the alarm engine through the public API.
//!
//! All scenarios use the injected test collaborators (mock player, mock
//! launcher, manual clock) so they run deterministically and without
//! audio hardware.

use std::sync::Arc;

use chrono::{DateTime, Duration, Local, TimeZone};

use chime::{
    AlarmEngine, AlarmPreset, AlarmSpec, AudioPlayer, Clock, EngineConfig, ManualClock,
    MockAudioPlayer, MockLauncher, ProcessLauncher, Ringtone, ToneKind,
};

fn monday_6am() -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2026, 3, 2, 6, 0, 0)
        .single()
        .expect("unambiguous test timestamp")
}

struct Harness {
    engine: Arc<AlarmEngine>,
    player: Arc<MockAudioPlayer>,
    launcher: Arc<MockLauncher>,
    clock: Arc<ManualClock>,
}

fn harness() -> Harness {
    let player = Arc::new(MockAudioPlayer::new());
    let launcher = Arc::new(MockLauncher::new());
    let clock = Arc::new(ManualClock::new(monday_6am()));
    let engine = AlarmEngine::new(
        EngineConfig::default()
            .with_poll_interval_ms(100)
            .with_monitor_interval_ms(100)
            .with_tick_backoff_ms(100),
        Arc::clone(&player) as Arc<dyn AudioPlayer>,
        Arc::clone(&launcher) as Arc<dyn ProcessLauncher>,
        Arc::clone(&clock) as Arc<dyn Clock>,
    );
    Harness {
        engine,
        player,
        launcher,
        clock,
    }
}

// ============================================================================
// Scheduling scenarios
// ============================================================================

#[test]
fn next_due_picks_earliest_of_todays_times() {
    let h = harness();
    h.engine.add_alarm(&AlarmSpec::at(8, 0)).unwrap();
    let expected = h.engine.add_alarm(&AlarmSpec::at(7, 30)).unwrap();
    h.engine.add_alarm(&AlarmSpec::at(9, 0)).unwrap();

    let status = h.engine.status();
    let next = status.next_due.expect("next due");
    assert_eq!(next.id, expected);
    assert_eq!(next.remaining_seconds, 90 * 60);
}

#[test]
fn roll_forward_lands_tomorrow_for_elapsed_times() {
    let h = harness();
    // 05:00 has already passed at 06:00.
    h.engine.add_alarm(&AlarmSpec::at(5, 0)).unwrap();
    let alarm = &h.engine.alarms()[0];
    assert!(alarm.trigger_time > monday_6am());
    assert_eq!(
        alarm.trigger_time.date_naive(),
        monday_6am().date_naive() + Duration::days(1)
    );
}

#[test]
fn preset_schedules_with_label() {
    let h = harness();
    h.engine.add_preset(AlarmPreset::Dinner).unwrap();
    let alarm = &h.engine.alarms()[0];
    assert_eq!(alarm.label, "Dinner");
    assert_eq!(
        alarm.trigger_time,
        Local
            .with_ymd_and_hms(2026, 3, 2, 18, 30, 0)
            .single()
            .unwrap()
    );
}

// ============================================================================
// Full ringing lifecycle
// ============================================================================

#[test]
fn fire_snooze_refire_dismiss_lifecycle() {
    let h = harness();
    h.engine
        .add_alarm(
            &AlarmSpec::at(7, 0)
                .with_label("wake")
                .with_snooze_minutes(5),
        )
        .unwrap();

    // Fire.
    h.clock.set(monday_6am() + Duration::hours(1));
    h.engine.tick().unwrap();
    assert!(h.engine.is_ringing());
    assert!(h.engine.alarms().is_empty());

    // Snooze: re-inserted five minutes out, suffixed label.
    let snooze_id = h.engine.snooze().expect("snooze while ringing");
    assert!(!h.engine.is_ringing());
    let snoozed = &h.engine.alarms()[0];
    assert_eq!(snoozed.id, snooze_id);
    assert_eq!(snoozed.label, "wake (snoozed)");
    assert_eq!(
        snoozed.trigger_time,
        monday_6am() + Duration::hours(1) + Duration::minutes(5)
    );

    // Re-fire after the snooze elapses.
    h.clock.advance(Duration::minutes(6));
    h.engine.tick().unwrap();
    assert!(h.engine.is_ringing());
    assert_eq!(
        h.engine.status().ringing_label.as_deref(),
        Some("wake (snoozed)")
    );

    // Dismiss: gone for good.
    assert!(h.engine.dismiss());
    assert!(!h.engine.is_ringing());
    assert!(h.engine.alarms().is_empty());
    assert!(!h.engine.tick().unwrap());
}

#[test]
fn stop_is_idempotent_and_audio_silent_after() {
    let h = harness();
    h.engine.add_alarm(&AlarmSpec::at(7, 0)).unwrap();
    h.clock.set(monday_6am() + Duration::hours(2));
    h.engine.tick().unwrap();

    assert!(h.engine.stop_ringing());
    assert!(!h.player.is_playing());
    assert!(!h.engine.stop_ringing());
    assert!(!h.player.is_playing());
}

#[test]
fn missing_ringtone_file_still_rings_audibly() {
    let h = harness();
    h.player.set_fail_files(true);
    h.engine
        .add_alarm(&AlarmSpec::at(7, 0).with_ringtone(Ringtone::file("/gone/missing.mp3")))
        .unwrap();

    h.clock.set(monday_6am() + Duration::hours(2));
    h.engine.tick().unwrap();

    assert!(h.engine.is_ringing());
    let (ringtone, looped, _) = h.player.last_play().expect("fallback played");
    assert_eq!(ringtone, Ringtone::Tone(ToneKind::Classic));
    assert!(looped);
}

#[test]
fn unavailable_player_routes_through_external_launcher() {
    let h = harness();
    h.player.set_available(false);
    h.engine
        .add_alarm(&AlarmSpec::at(7, 0).with_ringtone(Ringtone::file("/music/wake.mp3")))
        .unwrap();

    h.clock.set(monday_6am() + Duration::hours(2));
    h.engine.tick().unwrap();

    assert!(h.engine.is_ringing());
    assert_eq!(h.launcher.launch_count(), 1);
    assert_eq!(
        h.launcher.launches(),
        vec![std::path::PathBuf::from("/music/wake.mp3")]
    );

    assert!(h.engine.stop_ringing());
    assert!(!h.engine.is_ringing());
}

#[test]
fn simultaneous_alarms_surface_sequentially() {
    let h = harness();
    h.engine
        .add_alarm(&AlarmSpec::at(7, 0).with_label("first"))
        .unwrap();
    h.engine
        .add_alarm(&AlarmSpec::at(7, 0).with_label("second"))
        .unwrap();

    h.clock.set(monday_6am() + Duration::hours(2));
    h.engine.tick().unwrap();

    // One tick empties the registry; sessions surface one at a time in
    // ascending-id order.
    assert!(h.engine.alarms().is_empty());
    assert_eq!(h.engine.status().ringing_label.as_deref(), Some("first"));
    h.engine.stop_ringing();
    assert_eq!(h.engine.status().ringing_label.as_deref(), Some("second"));
    h.engine.stop_ringing();
    assert!(!h.engine.is_ringing());
}

// ============================================================================
// Registry management through the engine
// ============================================================================

#[test]
fn edit_disable_and_cancel() {
    let h = harness();
    let id = h.engine.add_alarm(&AlarmSpec::at(7, 0)).unwrap();

    assert!(h.engine.update_alarm(id, "standup", 12).unwrap());
    assert!(h.engine.update_alarm(id, "standup", 0).is_err());

    assert!(h.engine.set_alarm_enabled(id, false));
    h.clock.set(monday_6am() + Duration::hours(2));
    h.engine.tick().unwrap();
    assert!(!h.engine.is_ringing(), "disabled alarms must not fire");

    h.engine.cancel_all();
    assert!(h.engine.alarms().is_empty());
}

#[test]
fn sorting_reorders_list_without_breaking_countdown() {
    let h = harness();
    let later = h
        .engine
        .add_alarm(&AlarmSpec::at(9, 0).with_label("b"))
        .unwrap();
    let earliest = h
        .engine
        .add_alarm(&AlarmSpec::at(7, 30).with_label("a"))
        .unwrap();

    h.engine.sort_by_label();
    let ids: Vec<u64> = h.engine.alarms().iter().map(|alarm| alarm.id).collect();
    assert_eq!(ids, vec![earliest, later]);
    assert_eq!(h.engine.status().next_due.unwrap().id, earliest);

    h.engine.sort_by_time();
    let ids: Vec<u64> = h.engine.alarms().iter().map(|alarm| alarm.id).collect();
    assert_eq!(ids, vec![earliest, later]);
    assert_eq!(h.engine.status().next_due.unwrap().id, earliest);
}

// ============================================================================
// Background loop end-to-end
// ============================================================================

#[tokio::test]
async fn trigger_loop_fires_and_shutdown_cleans_up() {
    let h = harness();
    h.engine
        .add_alarm(&AlarmSpec::at(7, 0).with_label("wake"))
        .unwrap();
    h.clock.set(monday_6am() + Duration::hours(2));

    let mut fired = false;
    for _ in 0..80 {
        if h.engine.is_ringing() {
            fired = true;
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(25)).await;
    }
    assert!(fired, "trigger loop never fired the alarm");

    h.engine.shutdown().await;
    assert!(!h.engine.is_ringing());
    assert!(!h.player.is_playing());
}
