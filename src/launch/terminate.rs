//! The playback termination cascade.
//!
//! A missed kill leaves audio playing indefinitely with no user-visible
//! process to close, so stopping is layered and maximally persistent:
//!
//! 1. the directly-held handle (graceful, then forceful after a grace
//!    window),
//! 2. a newest-first walk of the process ledger (graceful),
//! 3. a forceful second pass over those pids plus a scan of the system
//!    process list for known media-player names,
//! 4. a last-resort match on processes whose command line references the
//!    playing file's name.
//!
//! Layers 3 and 4 are approximate by design and may hit unrelated
//! processes bearing the same name; that inaccuracy is the accepted price
//! of never leaving an orphaned player running. A failed layer is logged
//! and never aborts the ones after it.

use std::path::Path;
use std::time::{Duration, Instant};

use sysinfo::{ProcessesToUpdate, System};
use tracing::{debug, info, warn};

use crate::ledger::ProcessLedger;

use super::handle::PlaybackHandle;

/// Media-player executable names the forced pass will kill on sight.
/// Deliberately a small, explicit list; matching is case-insensitive and
/// ignores a trailing `.exe`.
pub const KNOWN_PLAYER_NAMES: &[&str] = &[
    "mpv",
    "mplayer",
    "ffplay",
    "vlc",
    "cvlc",
    "afplay",
    "wmplayer",
    "totem",
    "rhythmbox",
    "audacious",
];

/// Interval between exit polls inside the grace window.
const GRACE_POLL: Duration = Duration::from_millis(25);

/// What each layer of a cascade run accomplished.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TerminationReport {
    /// The directly-held handle was terminated or killed.
    pub handle_stopped: bool,
    /// Ledger records walked (all are discarded regardless of outcome).
    pub ledger_walked: usize,
    /// Processes killed by the known-name scan.
    pub name_kills: usize,
    /// Processes killed by the command-line match.
    pub cmdline_kills: usize,
}

/// Runs the full termination cascade.
///
/// Post-condition: the ledger is empty, whatever the individual layers
/// reported. The report is informational; callers treat the stop as
/// successful regardless.
pub fn run_cascade(
    handle: Option<&mut PlaybackHandle>,
    ledger: &mut ProcessLedger,
    file_hint: Option<&Path>,
    grace: Duration,
) -> TerminationReport {
    let mut report = TerminationReport::default();

    // Layer 1: the handle we actually hold.
    if let Some(handle) = handle {
        report.handle_stopped = stop_handle(handle, grace);
    }

    // Layer 2: graceful pass over the ledger, newest first. Records are
    // stale after this walk whether or not the signal landed.
    let records = ledger.drain_newest_first();
    report.ledger_walked = records.len();
    for record in &records {
        if !signal_pid(record.pid, false) {
            debug!(pid = record.pid, "graceful ledger kill not delivered");
        }
    }

    // Layer 3: forceful second pass over the same pids...
    for record in &records {
        signal_pid(record.pid, true);
    }

    // ...then the approximate layers: known player names (layer 3) and
    // command-line file match (layer 4) in one process-table scan.
    let (name_kills, cmdline_kills) = kill_matching_processes(file_hint);
    report.name_kills = name_kills;
    report.cmdline_kills = cmdline_kills;

    info!(
        handle_stopped = report.handle_stopped,
        ledger_walked = report.ledger_walked,
        name_kills = report.name_kills,
        cmdline_kills = report.cmdline_kills,
        "termination cascade finished"
    );
    report
}

/// Stops a directly-held handle: graceful terminate, bounded wait for the
/// exit, then forceful kill.
fn stop_handle(handle: &mut PlaybackHandle, grace: Duration) -> bool {
    let asked = handle.terminate();

    if asked {
        let deadline = Instant::now() + grace;
        loop {
            if handle.poll().is_some() {
                debug!("playback handle exited within grace window");
                return true;
            }
            if Instant::now() >= deadline {
                break;
            }
            std::thread::sleep(GRACE_POLL);
        }
        debug!("grace window elapsed; escalating to kill");
    }

    let killed = handle.kill();
    if !asked && !killed {
        debug!(
            strategy = handle.strategy().as_str(),
            "handle offers no direct termination path"
        );
    }
    asked || killed
}

/// Sends a termination signal to a pid. Best-effort: a missing process, a
/// refused signal, or an unsupported platform all come back `false`.
pub(crate) fn signal_pid(pid: u32, force: bool) -> bool {
    if pid == 0 || pid > i32::MAX as u32 {
        warn!(pid, "skipping kill for invalid/out-of-range pid");
        return false;
    }
    signal_pid_impl(pid, force)
}

#[cfg(unix)]
fn signal_pid_impl(pid: u32, force: bool) -> bool {
    let signal = if force { "-KILL" } else { "-TERM" };
    std::process::Command::new("kill")
        .args([signal, &pid.to_string()])
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[cfg(windows)]
fn signal_pid_impl(pid: u32, force: bool) -> bool {
    let mut command = std::process::Command::new("taskkill");
    command.args(["/PID", &pid.to_string(), "/T"]);
    if force {
        command.arg("/F");
    }
    command
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[cfg(not(any(unix, windows)))]
fn signal_pid_impl(_pid: u32, _force: bool) -> bool {
    false
}

/// Scans the process table and kills known player names plus anything
/// whose command line mentions the ringing file's name. Returns
/// `(name_kills, cmdline_kills)`.
fn kill_matching_processes(file_hint: Option<&Path>) -> (usize, usize) {
    let mut sys = System::new();
    sys.refresh_processes(ProcessesToUpdate::All, true);

    let own_pid = std::process::id();
    let file_name = file_hint
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned());

    let mut name_kills = 0;
    let mut cmdline_kills = 0;

    for (pid, process) in sys.processes() {
        if pid.as_u32() == own_pid {
            continue;
        }

        let name = process.name().to_string_lossy().to_lowercase();
        let name = name.strip_suffix(".exe").unwrap_or(&name);
        if KNOWN_PLAYER_NAMES.contains(&name) {
            if process.kill() {
                info!(pid = pid.as_u32(), name, "killed known media player");
                name_kills += 1;
            } else {
                debug!(pid = pid.as_u32(), name, "known-name kill not delivered");
            }
            continue;
        }

        if let Some(file_name) = &file_name {
            let mentions_file = process
                .cmd()
                .iter()
                .any(|arg| arg.to_string_lossy().contains(file_name.as_str()));
            if mentions_file {
                if process.kill() {
                    info!(pid = pid.as_u32(), file = %file_name, "killed process referencing ringing file");
                    cmdline_kills += 1;
                } else {
                    debug!(pid = pid.as_u32(), "command-line kill not delivered");
                }
            }
        }
    }

    (name_kills, cmdline_kills)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launch::StrategyKind;
    use crate::ledger::ProcessRecord;
    use chrono::Local;
    use std::path::PathBuf;

    fn record(pid: u32) -> ProcessRecord {
        ProcessRecord {
            pid,
            launched_at: Local::now(),
            file: PathBuf::from("/music/wake.mp3"),
            strategy: StrategyKind::ShellOpen,
        }
    }

    #[test]
    fn test_signal_pid_rejects_invalid() {
        assert!(!signal_pid(0, false));
        assert!(!signal_pid(u32::MAX, true));
    }

    #[test]
    fn test_cascade_empties_ledger_even_when_kills_fail() {
        let mut ledger = ProcessLedger::default();
        // Large but valid pids that almost certainly do not exist.
        ledger.push(record(4_000_101));
        ledger.push(record(4_000_102));

        let report = run_cascade(None, &mut ledger, None, Duration::from_millis(10));

        assert!(ledger.is_empty());
        assert_eq!(report.ledger_walked, 2);
        assert!(!report.handle_stopped);
    }

    #[test]
    fn test_cascade_without_anything_to_do() {
        let mut ledger = ProcessLedger::default();
        let report = run_cascade(None, &mut ledger, None, Duration::from_millis(10));
        assert!(!report.handle_stopped);
        assert_eq!(report.ledger_walked, 0);
    }

    #[test]
    fn test_cascade_handles_unsupervised_handle() {
        let mut ledger = ProcessLedger::default();
        let mut handle = PlaybackHandle::Unsupervised {
            strategy: StrategyKind::DefaultHandler,
        };
        let report = run_cascade(
            Some(&mut handle),
            &mut ledger,
            Some(Path::new("/music/nonexistent-chime-fixture.mp3")),
            Duration::from_millis(10),
        );
        // Nothing addressable, nothing delivered; the cascade still runs
        // to completion.
        assert!(!report.handle_stopped);
    }

    #[cfg(unix)]
    #[test]
    fn test_cascade_kills_pollable_child() {
        use std::process::{Command, Stdio};

        let child = Command::new("sleep")
            .arg("30")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn sleep");
        let mut handle = PlaybackHandle::Pollable {
            child,
            strategy: StrategyKind::DirectPlayer,
        };
        let mut ledger = ProcessLedger::default();

        let report = run_cascade(
            Some(&mut handle),
            &mut ledger,
            None,
            Duration::from_millis(200),
        );

        assert!(report.handle_stopped);
        // After the cascade the child must be gone.
        let mut exited = false;
        for _ in 0..50 {
            if handle.poll().is_some() {
                exited = true;
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(exited, "cascade left the child running");
    }
}
