//! Playback process handles.
//!
//! An external launch can yield three qualities of handle, and termination
//! dispatches on which one it got:
//!
//! - [`PlaybackHandle::Pollable`]: a directly-spawned child whose exit can
//!   be observed and whose lifetime tracks the playback (for the direct
//!   player strategy) or at least the launcher (for openers).
//! - [`PlaybackHandle::Tracked`]: a known pid without a child handle, as
//!   reported by an intermediary; signalable but not pollable.
//! - [`PlaybackHandle::Unsupervised`]: a fire-and-forget launch; only the
//!   approximate termination layers can reach whatever it started.

use std::process::Child;

use tracing::debug;

use super::terminate::signal_pid;

/// Which launch strategy produced a playback process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// A known media-player binary invoked with the file as argument.
    DirectPlayer,
    /// The platform opener (`open` / `xdg-open` / `cmd start`).
    Opener,
    /// A shell-level launch.
    ShellOpen,
    /// Last-resort launch via the default file handler, fire-and-forget.
    DefaultHandler,
}

impl StrategyKind {
    /// Returns the string representation of the strategy.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::DirectPlayer => "direct_player",
            StrategyKind::Opener => "opener",
            StrategyKind::ShellOpen => "shell_open",
            StrategyKind::DefaultHandler => "default_handler",
        }
    }
}

/// A handle to externally-launched playback.
#[derive(Debug)]
pub enum PlaybackHandle {
    /// Directly-spawned child process.
    Pollable {
        /// The spawned child.
        child: Child,
        /// The strategy that spawned it.
        strategy: StrategyKind,
    },
    /// A pid reported by an intermediary; no child handle exists.
    Tracked {
        /// The reported process id.
        pid: u32,
        /// The strategy that reported it.
        strategy: StrategyKind,
    },
    /// Launched with no way to address the resulting process directly.
    Unsupervised {
        /// The strategy used.
        strategy: StrategyKind,
    },
}

impl PlaybackHandle {
    /// The strategy that produced this handle.
    #[must_use]
    pub fn strategy(&self) -> StrategyKind {
        match self {
            Self::Pollable { strategy, .. }
            | Self::Tracked { strategy, .. }
            | Self::Unsupervised { strategy } => *strategy,
        }
    }

    /// The process id, when one is known.
    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        match self {
            Self::Pollable { child, .. } => Some(child.id()),
            Self::Tracked { pid, .. } => Some(*pid),
            Self::Unsupervised { .. } => None,
        }
    }

    /// True when the handle's own lifetime tracks the playback itself, so
    /// an observed exit means the audio stopped. Opener-style children exit
    /// as soon as they have handed the file off, so only the direct player
    /// strategy qualifies.
    #[must_use]
    pub fn supervises_playback(&self) -> bool {
        matches!(
            self,
            Self::Pollable {
                strategy: StrategyKind::DirectPlayer,
                ..
            }
        )
    }

    /// Checks whether the process has exited, without blocking.
    ///
    /// `Some(code)` when an exit was observed; `None` when still running or
    /// when the handle cannot be polled at all.
    pub fn poll(&mut self) -> Option<i32> {
        match self {
            Self::Pollable { child, .. } => match child.try_wait() {
                Ok(Some(status)) => Some(status.code().unwrap_or(-1)),
                Ok(None) => None,
                Err(e) => {
                    debug!("polling playback child failed: {e}");
                    None
                }
            },
            Self::Tracked { .. } | Self::Unsupervised { .. } => None,
        }
    }

    /// Requests graceful termination. Best-effort; returns whether the
    /// request was delivered.
    pub fn terminate(&mut self) -> bool {
        match self {
            Self::Pollable { child, .. } => signal_pid(child.id(), false),
            Self::Tracked { pid, .. } => signal_pid(*pid, false),
            Self::Unsupervised { .. } => false,
        }
    }

    /// Forcefully kills the process (and its tree, where the platform
    /// supports it). Best-effort; returns whether anything was delivered.
    pub fn kill(&mut self) -> bool {
        match self {
            Self::Pollable { child, .. } => {
                let direct = child.kill().is_ok();
                let _ = child.try_wait(); // reap if already gone
                signal_pid(child.id(), true) || direct
            }
            Self::Tracked { pid, .. } => signal_pid(*pid, true),
            Self::Unsupervised { .. } => false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
