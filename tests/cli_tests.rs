//! CLI smoke tests for the chime binary.
//!
//! These only exercise commands that terminate on their own; the `run`
//! command is tested for its argument errors, never for an actual wait.

use assert_cmd::Command;
use predicates::prelude::*;

fn chime() -> Command {
    Command::cargo_bin("chime").expect("chime binary")
}

#[test]
fn help_mentions_alarm_and_subcommands() {
    chime()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("alarm"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("tones"));
}

#[test]
fn version_prints() {
    chime()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("chime"));
}

#[test]
fn tones_lists_builtin_patterns() {
    chime()
        .arg("tones")
        .assert()
        .success()
        .stdout(predicate::str::contains("classic"))
        .stdout(predicate::str::contains("pulse"))
        .stdout(predicate::str::contains("chime"))
        .stdout(predicate::str::contains("gentle"));
}

#[test]
fn tones_json_is_parseable() {
    let output = chime().args(["tones", "--json"]).assert().success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout).into_owned();
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    let tones = parsed.as_array().expect("array of tones");
    assert_eq!(tones.len(), 4);
    assert!(tones.iter().any(|t| t["name"] == "classic"));
    assert!(tones[0]["frequencyHz"].is_number());
}

#[test]
fn run_without_alarms_fails_with_hint() {
    chime()
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--at"));
}

#[test]
fn run_rejects_malformed_time() {
    chime()
        .args(["run", "--at", "25:00"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("hour"));

    chime()
        .args(["run", "--at", "0730"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("HH:MM"));
}

#[test]
fn run_rejects_out_of_range_snooze() {
    chime()
        .args(["run", "--at", "07:30", "--snooze", "0"])
        .assert()
        .failure();
}

#[test]
fn run_rejects_unknown_tone_and_preset() {
    chime()
        .args(["run", "--at", "07:30", "--tone", "klaxon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown tone"));

    chime()
        .args(["run", "--preset", "brunch"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown preset"));
}

#[test]
fn completions_generate_for_bash() {
    chime()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("chime"));
}
