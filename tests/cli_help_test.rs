//! CLI smoke tests for the atelier binary.

use assert_cmd::Command;
use chrono::{Duration, Utc};
use predicates::prelude::*;
use serde_json::json;

fn snapshot_with_two_stale_prospects() -> serde_json::Value {
    let stale = |email: &str, days: i64| {
        json!({
            "id": uuid::Uuid::new_v4(),
            "name": "Prospect",
            "email": email,
            "role": "prospect",
            "prospect_status": "new",
            "created_at": (Utc::now() - Duration::days(days)).to_rfc3339(),
        })
    };
    json!([
        stale("one@example.com", 10),
        stale("two@example.com", 12),
        {
            "id": uuid::Uuid::new_v4(),
            "name": "Customer",
            "email": "won@example.com",
            "role": "client",
            "prospect_status": "won",
            "created_at": (Utc::now() - Duration::days(40)).to_rfc3339(),
        }
    ])
}

#[test]
fn help_describes_the_campaign_surface() {
    Command::cargo_bin("atelier")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("campaign"))
        .stdout(predicate::str::contains("init"));
}

#[test]
fn campaign_help_lists_preview_and_run() {
    Command::cargo_bin("atelier")
        .unwrap()
        .args(["campaign", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("preview"))
        .stdout(predicate::str::contains("run"));
}

#[test]
fn preview_counts_without_sending() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("contacts.json");
    std::fs::write(
        &snapshot,
        serde_json::to_string_pretty(&snapshot_with_two_stale_prospects()).unwrap(),
    )
    .unwrap();

    Command::cargo_bin("atelier")
        .unwrap()
        .current_dir(dir.path())
        .args(["campaign", "preview", "--contacts", "contacts.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 of 3"))
        .stdout(predicate::str::contains("No emails were sent"));
}

#[test]
fn init_writes_a_config_file_once() {
    let dir = tempfile::tempdir().unwrap();

    Command::cargo_bin("atelier")
        .unwrap()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();
    assert!(dir.path().join("atelier.toml").exists());

    // A second init without --force refuses to clobber.
    Command::cargo_bin("atelier")
        .unwrap()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .failure();
}
