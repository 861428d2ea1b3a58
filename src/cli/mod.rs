//! CLI module for the alarm clock.
//!
//! This module contains:
//! - `commands`: Command definitions using clap
//! - `display`: Terminal output formatting

pub mod commands;
pub mod display;

pub use commands::{Cli, ClockTime, Commands, RunArgs};
pub use display::Display;
