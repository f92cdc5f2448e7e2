//! Integration tests for the `netlab` binary: argument parsing,
//! topology loading, and one-shot dispatch. No interactive session.
#![allow(clippy::unwrap_used)]

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command for the `netlab` binary with env isolation so tests
/// never pick up the user's config or environment.
fn netlab_cmd() -> Command {
    let mut cmd = Command::cargo_bin("netlab").unwrap();
    cmd.env("HOME", "/tmp/netlab-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/netlab-cli-test-nonexistent")
        .env_remove("NETLAB_TOPOLOGY")
        .env_remove("NETLAB_VENDOR");
    cmd
}

fn topology_file(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

const ONE_ROUTER: &str = r#"{
  "devices": [
    {
      "id": "r1",
      "hostname": "R1",
      "vendor": "huawei",
      "mac": "00:11:22:33:44:55",
      "ports": [
        {
          "id": "GigabitEthernet0/0/1",
          "name": "GE0/0/1",
          "kind": "gigabit-ethernet"
        }
      ]
    }
  ],
  "cables": []
}"#;

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn no_args_shows_help() {
    netlab_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_lists_subcommands() {
    netlab_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("exec")
            .and(predicate::str::contains("run"))
            .and(predicate::str::contains("topology")),
    );
}

// ── exec ────────────────────────────────────────────────────────────

#[test]
fn exec_dispatches_against_the_named_device() {
    let file = topology_file(ONE_ROUTER);
    netlab_cmd()
        .args(["--topology"])
        .arg(file.path())
        .args(["exec", "--device", "r1", "system-view"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("<R1>system-view")
                .and(predicate::str::contains("Enter system view")),
        );
}

#[test]
fn exec_resolves_device_by_hostname() {
    let file = topology_file(ONE_ROUTER);
    netlab_cmd()
        .args(["--topology"])
        .arg(file.path())
        .args(["exec", "--device", "R1", "display version"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Huawei Versatile Routing Platform"));
}

#[test]
fn exec_unknown_device_fails_with_usage_code() {
    let file = topology_file(ONE_ROUTER);
    netlab_cmd()
        .args(["--topology"])
        .arg(file.path())
        .args(["exec", "--device", "r9", "display version"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("r9"));
}

#[test]
fn exec_save_persists_the_mutated_topology() {
    let file = topology_file(ONE_ROUTER);
    netlab_cmd()
        .args(["--topology"])
        .arg(file.path())
        .args(["exec", "--device", "r1", "--save", "system-view", "sysname Core1"])
        .assert()
        .success();

    let saved = std::fs::read_to_string(file.path()).unwrap();
    assert!(saved.contains("Core1"), "expected saved hostname:\n{saved}");
}

#[test]
fn vendor_override_switches_dialect() {
    let file = topology_file(ONE_ROUTER);
    netlab_cmd()
        .args(["--topology"])
        .arg(file.path())
        .args(["--vendor", "cisco", "exec", "--device", "r1", "frobnicate"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "% Invalid input detected at '^' marker.",
        ));
}

// ── topology ────────────────────────────────────────────────────────

#[test]
fn topology_show_summarizes_devices() {
    let file = topology_file(ONE_ROUTER);
    netlab_cmd()
        .args(["--topology"])
        .arg(file.path())
        .args(["topology", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("1 device(s), 0 cable(s)")
                .and(predicate::str::contains("hostname=R1")),
        );
}

#[test]
fn topology_validate_flags_dangling_cable() {
    let broken = r#"{
      "devices": [],
      "cables": [
        { "a": { "device": "r1", "port": "GigabitEthernet0/0/1" },
          "b": { "device": "r2", "port": "GigabitEthernet0/0/1" } }
      ]
    }"#;
    let file = topology_file(broken);
    netlab_cmd()
        .args(["--topology"])
        .arg(file.path())
        .args(["topology", "validate"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("unknown device"));
}

#[test]
fn malformed_topology_exits_with_code_two() {
    let file = topology_file("not json at all");
    netlab_cmd()
        .args(["--topology"])
        .arg(file.path())
        .args(["topology", "show"])
        .assert()
        .code(2);
}
