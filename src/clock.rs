//! Wall-clock source for the alarm engine.
//!
//! The trigger loop compares alarm times against a [`Clock`] rather than
//! calling `Local::now()` directly, so tests drive time by hand and a
//! flaky clock read becomes a transient error the loop survives instead
//! of a crash.

use chrono::{DateTime, Duration, Local};
use thiserror::Error;

/// A wall-clock read failed.
#[derive(Debug, Error)]
#[error("clock read failed: {0}")]
pub struct ClockError(pub String);

/// Supplies the current wall-clock time on demand.
pub trait Clock: Send + Sync {
    /// Returns the current local time.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError`] if the time source cannot be read.
    fn now(&self) -> Result<DateTime<Local>, ClockError>;
}

/// The system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Result<DateTime<Local>, ClockError> {
        Ok(Local::now())
    }
}

/// A hand-driven clock for tests.
///
/// Starts at a fixed instant and only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: std::sync::Mutex<DateTime<Local>>,
    fail: std::sync::atomic::AtomicBool,
}

impl ManualClock {
    #[must_use]
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            now: std::sync::Mutex::new(start),
            fail: std::sync::atomic::AtomicBool::new(false),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }

    /// Jumps the clock to an absolute instant.
    pub fn set(&self, to: DateTime<Local>) {
        *self.now.lock().unwrap() = to;
    }

    /// Makes subsequent reads fail, simulating a broken time source.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, std::sync::atomic::Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Result<DateTime<Local>, ClockError> {
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(ClockError("simulated clock failure".to_string()));
        }
        Ok(*self.now.lock().unwrap())
    }
}
