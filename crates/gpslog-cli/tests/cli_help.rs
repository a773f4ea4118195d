use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("gpslog")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("capture"))
        .stdout(predicate::str::contains("records"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_capture_help_shows_permission_flag() {
    cargo_bin_cmd!("gpslog")
        .args(["capture", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("allow-location"))
        .stdout(predicate::str::contains("email"))
        .stdout(predicate::str::contains("password"));
}

#[test]
fn test_config_help_shows_subcommands() {
    cargo_bin_cmd!("gpslog")
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("path"))
        .stdout(predicate::str::contains("show"));
}

#[test]
fn test_capture_requires_credentials() {
    cargo_bin_cmd!("gpslog")
        .arg("capture")
        .env_remove("GPSLOG_EMAIL")
        .env_remove("GPSLOG_PASSWORD")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--email"));
}

#[test]
fn test_version_flag() {
    cargo_bin_cmd!("gpslog")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("1.0"));
}
