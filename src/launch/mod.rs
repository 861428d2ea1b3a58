//! External playback launch and termination.
//!
//! When the in-process player cannot play a ringtone file, the engine
//! hands the file to an OS-level media handler instead. This module
//! provides:
//!
//! - The [`ProcessLauncher`] trait and the layered [`SystemLauncher`]
//! - Tagged [`PlaybackHandle`]s for whatever quality of process reference
//!   a launch yields
//! - The termination cascade that guarantees "stop always appears to work"
//!
//! Launches that yield a pid are recorded in the process ledger
//! (`crate::ledger`) so the cascade can find them later.

pub mod error;
pub mod handle;
pub mod launcher;
pub mod terminate;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

pub use error::LaunchError;
pub use handle::{PlaybackHandle, StrategyKind};
pub use launcher::{ProcessLauncher, SystemLauncher};
pub use terminate::{run_cascade, TerminationReport, KNOWN_PLAYER_NAMES};

/// Mock launcher for testing.
///
/// By default every launch succeeds with a `Tracked` handle carrying a
/// fresh fake pid (well above any real pid range), so ledger behavior can
/// be exercised without spawning processes.
#[derive(Debug)]
pub struct MockLauncher {
    launches: Mutex<Vec<PathBuf>>,
    should_fail: AtomicBool,
    unsupervised: AtomicBool,
    next_pid: AtomicU32,
}

impl Default for MockLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLauncher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            launches: Mutex::new(Vec::new()),
            should_fail: AtomicBool::new(false),
            unsupervised: AtomicBool::new(false),
            next_pid: AtomicU32::new(4_000_001),
        }
    }

    /// Makes every launch fail.
    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    /// Makes launches yield unsupervised handles (no pid) instead of
    /// tracked ones.
    pub fn set_unsupervised(&self, unsupervised: bool) {
        self.unsupervised.store(unsupervised, Ordering::SeqCst);
    }

    #[must_use]
    pub fn launch_count(&self) -> usize {
        self.launches.lock().unwrap().len()
    }

    #[must_use]
    pub fn launches(&self) -> Vec<PathBuf> {
        self.launches.lock().unwrap().clone()
    }

    pub fn clear_launches(&self) {
        self.launches.lock().unwrap().clear();
    }
}

impl ProcessLauncher for MockLauncher {
    fn launch(&self, file: &Path) -> Result<PlaybackHandle, LaunchError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(LaunchError::AllStrategiesFailed(file.display().to_string()));
        }
        self.launches.lock().unwrap().push(file.to_path_buf());
        if self.unsupervised.load(Ordering::SeqCst) {
            Ok(PlaybackHandle::Unsupervised {
                strategy: StrategyKind::DefaultHandler,
            })
        } else {
            let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
            Ok(PlaybackHandle::Tracked {
                pid,
                strategy: StrategyKind::ShellOpen,
            })
        }
    }
}
