//! Best-effort external playback launcher.
//!
//! Used when the in-process player is unavailable: hand the ringtone file
//! to something on the host that can play it. Strategies are tried in
//! order of how controllable the resulting process is: a directly-spawned
//! player can be polled and killed, an opener at least leaves a child to
//! reap, a shell or default-handler launch leaves nothing addressable and
//! relies on the approximate termination layers.

use std::path::Path;
use std::process::{Child, Command, Stdio};

use tracing::{debug, info};

use super::error::LaunchError;
use super::handle::{PlaybackHandle, StrategyKind};

/// Known player binaries to invoke directly, with the arguments that keep
/// them quiet and audio-only. First match wins.
#[cfg(target_os = "macos")]
const DIRECT_PLAYERS: &[(&str, &[&str])] = &[("afplay", &[])];

#[cfg(all(unix, not(target_os = "macos")))]
const DIRECT_PLAYERS: &[(&str, &[&str])] = &[
    ("mpv", &["--no-video", "--really-quiet"]),
    ("ffplay", &["-nodisp", "-autoexit", "-loglevel", "quiet"]),
    ("mplayer", &["-really-quiet"]),
    ("cvlc", &["--play-and-exit", "--quiet"]),
];

#[cfg(windows)]
const DIRECT_PLAYERS: &[(&str, &[&str])] = &[("wmplayer.exe", &["/play", "/close"])];

#[cfg(not(any(unix, windows)))]
const DIRECT_PLAYERS: &[(&str, &[&str])] = &[];

/// Launches an OS-level media handler for a file.
pub trait ProcessLauncher: Send + Sync {
    /// Attempts to start external playback of `file`.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError`] when the file is missing or every strategy
    /// failed.
    fn launch(&self, file: &Path) -> Result<PlaybackHandle, LaunchError>;
}

/// The production launcher: tries each strategy in order and returns the
/// first handle obtained.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl SystemLauncher {
    fn try_direct_player(file: &Path) -> Option<PlaybackHandle> {
        for (player, args) in DIRECT_PLAYERS {
            match spawn_quiet(player, args, file) {
                Ok(child) => {
                    info!(player, "external playback via direct player");
                    return Some(PlaybackHandle::Pollable {
                        child,
                        strategy: StrategyKind::DirectPlayer,
                    });
                }
                Err(e) => debug!(player, "direct player unavailable: {e}"),
            }
        }
        None
    }

    fn try_opener(file: &Path) -> Option<PlaybackHandle> {
        let (program, args): (&str, &[&str]) = if cfg!(target_os = "macos") {
            ("open", &[])
        } else if cfg!(windows) {
            ("cmd", &["/C", "start", ""])
        } else {
            ("xdg-open", &[])
        };

        match spawn_quiet(program, args, file) {
            Ok(child) => {
                info!(program, "external playback via opener");
                Some(PlaybackHandle::Pollable {
                    child,
                    strategy: StrategyKind::Opener,
                })
            }
            Err(e) => {
                debug!(program, "opener unavailable: {e}");
                None
            }
        }
    }

    #[cfg(unix)]
    fn try_shell_open(file: &Path) -> Option<PlaybackHandle> {
        let opener = if cfg!(target_os = "macos") {
            "open"
        } else {
            "xdg-open"
        };
        // Single-quote the path for the shell, escaping embedded quotes.
        let quoted = format!("'{}'", file.to_string_lossy().replace('\'', r"'\''"));
        let script = format!("{opener} {quoted} >/dev/null 2>&1");

        match Command::new("sh")
            .arg("-c")
            .arg(&script)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => {
                // The shell exits as soon as the opener returns; its exit
                // says nothing about the player, so drop the child.
                drop(child);
                info!("external playback via shell launch");
                Some(PlaybackHandle::Unsupervised {
                    strategy: StrategyKind::ShellOpen,
                })
            }
            Err(e) => {
                debug!("shell launch unavailable: {e}");
                None
            }
        }
    }

    #[cfg(windows)]
    fn try_shell_open(file: &Path) -> Option<PlaybackHandle> {
        match Command::new("powershell.exe")
            .args(["-NoProfile", "-Command", "Start-Process"])
            .arg(file)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => {
                drop(child);
                info!("external playback via shell launch");
                Some(PlaybackHandle::Unsupervised {
                    strategy: StrategyKind::ShellOpen,
                })
            }
            Err(e) => {
                debug!("shell launch unavailable: {e}");
                None
            }
        }
    }

    #[cfg(not(any(unix, windows)))]
    fn try_shell_open(_file: &Path) -> Option<PlaybackHandle> {
        None
    }

    fn try_default_handler(file: &Path) -> Option<PlaybackHandle> {
        let program = if cfg!(target_os = "macos") {
            "open"
        } else if cfg!(windows) {
            "explorer"
        } else {
            "xdg-open"
        };

        match spawn_quiet(program, &[], file) {
            Ok(child) => {
                // Fire-and-forget: nothing about this child is worth
                // tracking, the default handler re-parents the real player.
                drop(child);
                info!(program, "external playback via default handler");
                Some(PlaybackHandle::Unsupervised {
                    strategy: StrategyKind::DefaultHandler,
                })
            }
            Err(e) => {
                debug!(program, "default handler launch failed: {e}");
                None
            }
        }
    }
}

fn spawn_quiet(program: &str, args: &[&str], file: &Path) -> std::io::Result<Child> {
    Command::new(program)
        .args(args)
        .arg(file)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
}

impl ProcessLauncher for SystemLauncher {
    fn launch(&self, file: &Path) -> Result<PlaybackHandle, LaunchError> {
        if !file.exists() {
            return Err(LaunchError::FileNotFound(file.display().to_string()));
        }

        Self::try_direct_player(file)
            .or_else(|| Self::try_opener(file))
            .or_else(|| Self::try_shell_open(file))
            .or_else(|| Self::try_default_handler(file))
            .ok_or_else(|| LaunchError::AllStrategiesFailed(file.display().to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================
