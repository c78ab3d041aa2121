use assert_cmd::prelude::*;
use predicates::str::contains;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().expect("temp file");
    tmp.write_all(contents.as_bytes()).expect("write temp file");
    tmp
}

#[test]
fn cli_lists_builtin_scenarios() {
    let mut cmd = Command::cargo_bin("ski-tycoon").expect("binary exists");
    cmd.arg("--summary-only");
    cmd.assert()
        .success()
        .stdout(contains("Scenarios:"))
        .stdout(contains("  0: Droplet"))
        .stdout(contains("  1: Big Droplet"))
        .stdout(contains("  2: Many Droplets"));
}

#[test]
fn cli_simulates_named_scenario() {
    let mut cmd = Command::cargo_bin("ski-tycoon").expect("binary exists");
    cmd.args(["--scenario", "droplet", "--steps", "3"]);
    cmd.assert()
        .success()
        .stdout(contains("Scenario: Droplet"))
        .stdout(contains("Grid: 20x20"))
        .stdout(contains("Volume before: 405.000"))
        .stdout(contains("Steps: 3"))
        .stdout(contains("Height range: "));
}

#[test]
fn cli_loads_heightmap() {
    let pgm = write_temp("P2\n# bowl\n3 3\n8\n8 8 8\n8 0 8\n8 8 8\n");
    let mut cmd = Command::cargo_bin("ski-tycoon").expect("binary exists");
    cmd.arg("--pgm")
        .arg(pgm.path())
        .args(["--scaling", "2", "--steps", "0"]);
    cmd.assert()
        .success()
        .stdout(contains("Grid: 3x3"))
        .stdout(contains("Volume before: 16.000"))
        .stdout(contains("Height range: 0.000..2.000"));
}

#[test]
fn cli_reads_scenario_library() {
    let xml = write_temp(
        r#"<scenarios>
  <scenario name="Puddle">
    <flat width="4" depth="5" height="0.5"/>
  </scenario>
</scenarios>"#,
    );
    let mut cmd = Command::cargo_bin("ski-tycoon").expect("binary exists");
    cmd.arg("--library").arg(xml.path()).args(["--steps", "2"]);
    cmd.assert()
        .success()
        .stdout(contains("Scenario: Puddle"))
        .stdout(contains("Grid: 4x5"))
        .stdout(contains("Volume after: 10.000"));
}

#[test]
fn cli_rejects_unknown_scenario() {
    let mut cmd = Command::cargo_bin("ski-tycoon").expect("binary exists");
    cmd.args(["--scenario", "Avalanche"]);
    cmd.assert()
        .failure()
        .stderr(contains("unknown scenario \"Avalanche\""));
}
