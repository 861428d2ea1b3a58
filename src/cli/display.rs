//! Terminal output helpers for the alarm clock CLI.

use std::io::Write;

use crate::types::{Alarm, EngineStatus};
use crate::audio::ToneKind;

/// Display formatting utilities.
pub struct Display;

impl Display {
    /// Shows an error message on stderr.
    pub fn show_error(message: &str) {
        eprintln!("error: {message}");
    }

    /// Shows the alarms that were just registered.
    pub fn show_alarms(alarms: &[Alarm]) {
        for alarm in alarms {
            let label = if alarm.label.is_empty() {
                "(no label)"
            } else {
                alarm.label.as_str()
            };
            println!(
                "alarm #{} set for {}: {} (snooze {} min, {})",
                alarm.id,
                alarm.trigger_time.format("%Y-%m-%d %H:%M"),
                label,
                alarm.snooze_minutes,
                alarm.ringtone.describe(),
            );
        }
    }

    /// Rewrites the single countdown status line.
    pub fn show_countdown(status: &EngineStatus) {
        let line = match &status.next_due {
            Some(next) => {
                let label = if next.label.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", next.label)
                };
                format!(
                    "next alarm {}{} in {}   ",
                    next.trigger_time.format("%H:%M"),
                    label,
                    Self::format_countdown(next.remaining_seconds),
                )
            }
            None if status.is_ringing => String::from("ringing...                      "),
            None => String::from("no pending alarms               "),
        };
        print!("\r{line}");
        let _ = std::io::stdout().flush();
    }

    /// Announces that an alarm started ringing.
    pub fn show_ringing(label: &str) {
        println!();
        if label.is_empty() {
            println!("*** ALARM *** (Ctrl-C to stop)");
        } else {
            println!("*** ALARM: {label} *** (Ctrl-C to stop)");
        }
    }

    /// Announces that ringing was stopped.
    pub fn show_stopped() {
        println!();
        println!("alarm stopped");
    }

    /// Lists the built tones.
    pub fn show_tones() {
        println!("built tones:");
        for kind in ToneKind::ALL {
            println!(
                "  {:<8} {:>6.0} Hz, {} ms beep",
                kind.as_str(),
                kind.frequency_hz(),
                kind.beep_ms(),
            );
        }
    }

    /// Lists the built tones as JSON.
    pub fn show_tones_json() {
        let tones: Vec<serde_json::Value> = ToneKind::ALL
            .iter()
            .map(|kind| {
                serde_json::json!({
                    "name": kind.as_str(),
                    "frequencyHz": kind.frequency_hz(),
                    "beepMs": kind.beep_ms(),
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&tones).unwrap_or_else(|_| "[]".to_string())
        );
    }

    /// Prints one status snapshot as a JSON line.
    pub fn show_status_json(status: &EngineStatus) {
        match serde_json::to_string(status) {
            Ok(json) => println!("{json}"),
            Err(e) => Self::show_error(&format!("status serialization failed: {e}")),
        }
    }

    /// Formats a countdown as `HH:MM:SS`, with a day prefix past 24 hours.
    #[must_use]
    pub fn format_countdown(total_seconds: i64) -> String {
        let total_seconds = total_seconds.max(0);
        let days = total_seconds / 86_400;
        let hours = (total_seconds % 86_400) / 3_600;
        let minutes = (total_seconds % 3_600) / 60;
        let seconds = total_seconds % 60;
        if days > 0 {
            format!("{days}d {hours:02}:{minutes:02}:{seconds:02}")
        } else {
            format!("{hours:02}:{minutes:02}:{seconds:02}")
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
