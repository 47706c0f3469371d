//! Integration tests for the `relay` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn relay() -> Command {
    let mut cmd =
        Command::cargo_bin("relay").unwrap_or_else(|e| panic!("relay binary missing: {e}"));
    cmd.env("RUST_LOG", "off");
    cmd
}

#[test]
fn format_reads_stdin() {
    relay()
        .arg("format")
        .write_stdin(r#"{"eventType":"Grab","series":{"title":"Foo"},"episodes":[{"seasonNumber":1,"episodeNumber":2}]}"#)
        .assert()
        .success()
        .stdout("Sonarr: Foo 1x02 - \"Grab\"\n");
}

#[test]
fn format_reads_file() {
    let path = std::env::temp_dir().join(format!("relay_cli_test_{}.json", std::process::id()));
    fs::write(&path, r#"{"event":"media.scrobble","Metadata":{"grandparentTitle":"Show","parentIndex":1,"index":7}}"#)
        .unwrap_or_else(|e| panic!("Failed to write temp payload: {e}"));

    relay()
        .args(["format", "--path"])
        .arg(&path)
        .assert()
        .success()
        .stdout("Plex - \"media.scrobble\" : Show 1x7\n");

    let _ = fs::remove_file(&path);
}

#[test]
fn format_falls_back_to_sorted_fields() {
    relay()
        .arg("format")
        .write_stdin(r#"{"b":"2","a":"1"}"#)
        .assert()
        .success()
        .stdout("a: 1\nb: 2\n");
}

#[test]
fn format_empty_object_prints_nothing() {
    relay().arg("format").write_stdin("{}").assert().success().stdout("");
}

#[test]
fn format_fails_on_nested_unknown_payload() {
    relay()
        .arg("format")
        .write_stdin(r#"{"a":{"nested":1}}"#)
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("decoding json to map"));
}

#[test]
fn format_lines_handles_jsonl() {
    let input = r#"{"incident":{"incident_id":"1","summary":"CPU high"}}

{"eventType":"Download","artist":{"name":"Band"},"albums":[{"title":"LP"}]}"#;

    relay()
        .args(["format", "--lines"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout("GCP Alert - \"CPU high\"\nLidarr: Band - \"LP\" - Download\n");
}

#[test]
fn format_lines_names_failing_line() {
    relay()
        .args(["format", "--lines"])
        .write_stdin("{\"a\":\"1\"}\n[]\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}
