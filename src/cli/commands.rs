//! Command definitions for the alarm clock CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::audio::{Ringtone, ToneKind};
use crate::types::{AlarmPreset, AlarmSpec};

// ============================================================================
// CLI Structure
// ============================================================================

/// Chime - a desktop alarm clock for the terminal
#[derive(Parser, Debug)]
#[command(
    name = "chime",
    version,
    about = "Desktop alarm clock with snooze and ringtone fallback",
    long_about = "Set one or more wake/reminder times and wait: at the target time\n\
                  chime rings a built tone or plays a chosen audio file until stopped,\n\
                  with optional snooze.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Set one or more alarms and wait for them to ring
    Run(RunArgs),

    /// List the built ringtone patterns
    Tones {
        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Run Command Arguments
// ============================================================================

/// A wall-clock time parsed from `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    /// Hour (0-23).
    pub hour: u32,
    /// Minute (0-59).
    pub minute: u32,
}

/// Arguments for the run command
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Alarm time in 24-hour HH:MM form; repeatable
    #[arg(long = "at", value_name = "HH:MM", value_parser = parse_clock_time)]
    pub at: Vec<ClockTime>,

    /// Quick-set preset (weekday-wake, weekend-wake, lunch, afternoon-tea,
    /// dinner, bedtime); repeatable
    #[arg(long, value_parser = parse_preset)]
    pub preset: Vec<AlarmPreset>,

    /// Label attached to the alarms
    #[arg(short, long, default_value = "")]
    pub label: String,

    /// Snooze duration in minutes (1-60)
    #[arg(
        short,
        long,
        default_value = "5",
        value_parser = clap::value_parser!(u32).range(1..=60)
    )]
    pub snooze: u32,

    /// Ringtone audio file (falls back to a built tone if unplayable)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Built tone to ring with (classic, pulse, chime, gentle)
    #[arg(short, long, default_value = "classic", value_parser = parse_tone)]
    pub tone: ToneKind,

    /// Playback volume (0.0-1.0)
    #[arg(long, default_value = "1.0")]
    pub volume: f32,

    /// Print a JSON status snapshot per tick instead of the countdown line
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    /// Builds the alarm spec for one `--at` time.
    #[must_use]
    pub fn to_spec(&self, time: ClockTime) -> AlarmSpec {
        let ringtone = match &self.file {
            Some(path) => Ringtone::file(path.clone()),
            None => Ringtone::Tone(self.tone),
        };
        AlarmSpec::at(time.hour, time.minute)
            .with_label(self.label.clone())
            .with_snooze_minutes(self.snooze)
            .with_ringtone(ringtone)
            .with_volume(self.volume)
    }
}

// ============================================================================
// Value parsers
// ============================================================================

fn parse_clock_time(input: &str) -> Result<ClockTime, String> {
    let (hour, minute) = input
        .split_once(':')
        .ok_or_else(|| format!("expected HH:MM, got '{input}'"))?;
    let hour: u32 = hour
        .trim()
        .parse()
        .map_err(|_| format!("invalid hour in '{input}'"))?;
    let minute: u32 = minute
        .trim()
        .parse()
        .map_err(|_| format!("invalid minute in '{input}'"))?;
    if hour > 23 {
        return Err(format!("hour must be within 0-23, got {hour}"));
    }
    if minute > 59 {
        return Err(format!("minute must be within 0-59, got {minute}"));
    }
    Ok(ClockTime { hour, minute })
}

fn parse_tone(name: &str) -> Result<ToneKind, String> {
    ToneKind::parse(name)
        .ok_or_else(|| format!("unknown tone '{name}' (expected classic, pulse, chime, gentle)"))
}

fn parse_preset(name: &str) -> Result<AlarmPreset, String> {
    match name.to_ascii_lowercase().as_str() {
        "weekday-wake" => Ok(AlarmPreset::WeekdayWake),
        "weekend-wake" => Ok(AlarmPreset::WeekendWake),
        "lunch" => Ok(AlarmPreset::Lunch),
        "afternoon-tea" => Ok(AlarmPreset::AfternoonTea),
        "dinner" => Ok(AlarmPreset::Dinner),
        "bedtime" => Ok(AlarmPreset::Bedtime),
        _ => Err(format!(
            "unknown preset '{name}' (expected weekday-wake, weekend-wake, lunch, afternoon-tea, dinner, bedtime)"
        )),
    }
}

// ============================================================================
// Tests
// ============================================================================
