#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn rjp() -> Command {
    cargo_bin_cmd!("rjobplan")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rjobplan.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Fresh, initialized database
pub fn init_db(name: &str) -> String {
    let db_path = setup_test_db(name);
    rjp()
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success();
    db_path
}

/// Adds the reference job: 60 pieces, 4 min CNC + 1 min load/unload + 5 min deburr.
/// Whole part is 10 h, machine only 5 h, starting Monday 2025-06-02 08:00.
pub fn add_reference_plan(db_path: &str) {
    rjp()
        .args([
            "--db",
            db_path,
            "plan",
            "add",
            "--job-card",
            "JC-1",
            "--part-no",
            "P-1",
            "--part-name",
            "Bracket",
            "--type",
            "CNC",
            "--machine",
            "CNC-01",
            "--qty",
            "60",
            "--start",
            "2025-06-02T08:00",
            "--cnc",
            "4",
            "--load-unload",
            "1",
            "--deburr",
            "5",
        ])
        .assert()
        .success();
}
