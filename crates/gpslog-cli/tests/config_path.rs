use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_config_path_respects_home_override() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("gpslog")
        .env("GPSLOG_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(dir.path().to_str().unwrap()))
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_show_prints_defaults_when_file_absent() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("gpslog")
        .env("GPSLOG_HOME", dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[identity]"))
        .stdout(predicate::str::contains("[store]"));
}

#[test]
fn test_config_show_reflects_file_contents() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("config.toml"),
        "[store]\nbase_url = \"https://store.example\"\n",
    )
    .unwrap();

    cargo_bin_cmd!("gpslog")
        .env("GPSLOG_HOME", dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://store.example"));
}

#[test]
fn test_unparseable_config_fails() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "store = \"not a table").unwrap();

    cargo_bin_cmd!("gpslog")
        .env("GPSLOG_HOME", dir.path())
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config"));
}
