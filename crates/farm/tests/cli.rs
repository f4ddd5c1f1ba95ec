//! End-to-end tests for the `farm` binary.
//!
//! Each test creates its own temporary directory, initializes a farm, and
//! runs the binary as a subprocess via `assert_cmd`.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn farm() -> Command {
    let mut cmd = Command::cargo_bin("farm").unwrap();
    cmd.env_remove("FARM_DIR").env_remove("RUST_LOG");
    cmd
}

fn init_farm() -> TempDir {
    let tmp = TempDir::new().unwrap();
    farm()
        .args(["init", "-q", "--name", "Shamba Hill", "--currency", "kes"])
        .current_dir(tmp.path())
        .assert()
        .success();
    tmp
}

/// Runs `farm --json <args>` in `tmp` and parses stdout.
fn json(tmp: &TempDir, args: &[&str]) -> serde_json::Value {
    let output = farm()
        .arg("--json")
        .args(args)
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "farm {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

const FINANCE: &str = r#"{"_id":"fin-1","referenceNumber":"FIN-0001","date":"2024-03-01","recordType":"expense","category":"Feed, bulk","amount":250.0}
{"_id":"fin-2","referenceNumber":"FIN-0002","date":"2024-03-04","recordType":"income","category":"Egg sales","amount":400.0}
"#;

const EGGS: &str = r#"{"_id":"egg-1","batchNumber":"BATCH-0001","date":"2024-03-01","house":"Coop A","totalEggs":120,"brokenEggs":2,"gradeA":100,"gradeB":18}
{"_id":"egg-2","batchNumber":"BATCH-0002","date":"2024-03-02","house":"Coop B","totalEggs":80,"brokenEggs":0,"gradeA":80}
"#;

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_the_farm_dir() {
    let tmp = init_farm();
    let dir = tmp.path().join(".farm");
    assert!(dir.join("config.yaml").is_file());
    assert!(dir.join("farm.db").is_file());
    let ignore = fs::read_to_string(dir.join(".gitignore")).unwrap();
    assert!(ignore.contains("*.db"));

    farm()
        .arg("init")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));

    farm()
        .args(["init", "--force", "-q"])
        .current_dir(tmp.path())
        .assert()
        .success();
}

#[test]
fn commands_outside_a_farm_fail() {
    let tmp = TempDir::new().unwrap();
    farm()
        .args(["--dir", tmp.path().to_str().unwrap(), "user", "list"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::starts_with("Error:"));

    let output = farm()
        .args(["--json", "--dir", tmp.path().to_str().unwrap(), "stats"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let err: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert!(err["error"].as_str().unwrap().contains("farm init"));
}

#[test]
fn dir_flag_finds_the_farm() {
    let tmp = init_farm();
    let elsewhere = TempDir::new().unwrap();
    let value = farm()
        .args(["--dir", tmp.path().join(".farm").to_str().unwrap()])
        .args(["config", "get", "server.bind"])
        .current_dir(elsewhere.path())
        .output()
        .unwrap();
    assert!(value.status.success());
    assert_eq!(String::from_utf8_lossy(&value.stdout).trim(), "127.0.0.1:5000");
}

// ---------------------------------------------------------------------------
// users
// ---------------------------------------------------------------------------

#[test]
fn user_lifecycle() {
    let tmp = init_farm();

    let user = json(
        &tmp,
        &[
            "user", "add", "Wanjiru", "--email", "w@example.com", "--password",
            "correct-horse", "--role", "manager",
        ],
    );
    assert_eq!(user["username"], "wanjiru");
    assert_eq!(user["role"], "manager");
    assert!(user.get("passwordHash").is_none());

    farm()
        .args(["user", "add", "wanjiru", "--email", "x@example.com", "--password", "battery-staple"])
        .current_dir(tmp.path())
        .assert()
        .failure();

    farm()
        .args(["user", "passwd", "wanjiru", "--password", "short"])
        .current_dir(tmp.path())
        .assert()
        .failure();

    let disabled = json(&tmp, &["user", "disable", "wanjiru"]);
    assert_eq!(disabled["active"], false);

    farm()
        .args(["user", "list"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("wanjiru").and(predicate::str::contains("manager")));

    json(&tmp, &["user", "remove", "wanjiru"]);
    let users = json(&tmp, &["user", "list"]);
    assert_eq!(users.as_array().unwrap().len(), 0);
}

// ---------------------------------------------------------------------------
// import / export / reports
// ---------------------------------------------------------------------------

#[test]
fn import_then_export() {
    let tmp = init_farm();
    let input = tmp.path().join("finance.jsonl");
    fs::write(&input, FINANCE).unwrap();

    let tally = json(&tmp, &["import", "finance", input.to_str().unwrap()]);
    assert_eq!(tally["imported"], 2);

    // The same file again collides on ids unless told to skip them.
    farm()
        .args(["import", "finance", input.to_str().unwrap()])
        .current_dir(tmp.path())
        .assert()
        .failure();
    let tally = json(
        &tmp,
        &["import", "finance", input.to_str().unwrap(), "--skip-existing"],
    );
    assert_eq!(tally["skipped"], 2);

    farm()
        .args(["export", "financial-records"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("FIN-0001")
                .and(predicate::str::contains("\"Feed, bulk\""))
                .and(predicate::str::contains("250.00")),
        );

    let out = tmp.path().join("backup.jsonl");
    farm()
        .args(["export", "finance", "--format", "jsonl", "--from", "2024-03-02"])
        .args(["-o", out.to_str().unwrap()])
        .current_dir(tmp.path())
        .assert()
        .success();
    let lines: Vec<serde_json::Value> = fs::read_to_string(&out)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["_id"], "fin-2");

    farm()
        .args(["export", "users"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("CSV"));

    let next = json(&tmp, &["next-number", "reference"]);
    assert_eq!(next["referenceNumber"], "FIN-0003");
}

#[test]
fn csv_export_counts_records_not_lines() {
    let tmp = init_farm();
    let input = tmp.path().join("finance.jsonl");
    fs::write(
        &input,
        r#"{"_id":"fin-1","referenceNumber":"FIN-0001","date":"2024-03-01","recordType":"expense","category":"Feed","amount":25.0,"description":"two sacks\nfrom the co-op\nlate"}
"#,
    )
    .unwrap();
    json(&tmp, &["import", "finance", input.to_str().unwrap()]);

    let out = tmp.path().join("finance.csv");
    farm()
        .args(["export", "finance", "-o", out.to_str().unwrap()])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote 1 record(s)"));
    assert!(fs::read_to_string(&out).unwrap().contains("\"two sacks\nfrom the co-op\nlate\""));
}

#[test]
fn stats_and_search() {
    let tmp = init_farm();
    let input = tmp.path().join("eggs.jsonl");
    fs::write(&input, EGGS).unwrap();
    json(&tmp, &["import", "eggs", input.to_str().unwrap()]);

    let board = json(&tmp, &["stats"]);
    assert_eq!(board["farmName"], "Shamba Hill");
    assert_eq!(board["currency"], "KES");
    assert_eq!(board["eggs"]["totalEggs"], 200);
    assert_eq!(board["eggs"]["brokenEggs"], 2);

    let board = json(&tmp, &["stats", "--from", "2024-03-02"]);
    assert_eq!(board["eggs"]["totalEggs"], 80);

    let hits = json(&tmp, &["search", "coop b"]);
    let hits = hits.as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["id"], "egg-2");

    farm()
        .args(["stats"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Shamba Hill").and(predicate::str::contains("Eggs")));

    let next = json(&tmp, &["next-number", "batch"]);
    assert_eq!(next["batchNumber"], "BATCH-0003");
}

// ---------------------------------------------------------------------------
// config / completion
// ---------------------------------------------------------------------------

#[test]
fn config_show_and_get() {
    let tmp = init_farm();
    let cfg = json(&tmp, &["config", "show"]);
    assert_eq!(cfg["auth"]["required"], true);

    farm()
        .args(["config", "get", "auth.session-ttl-hours"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout("24\n");

    farm()
        .args(["config", "get", "auth.nope"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown configuration key"));

    farm()
        .args(["config", "get", "server.bind"])
        .env("FARM_SERVER__BIND", "0.0.0.0:8080")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout("0.0.0.0:8080\n");
}

#[test]
fn completion_scripts() {
    farm()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("farm"));
}
