//! Records listing tests against mock services.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_sign_in(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "localId": "u1",
            "idToken": "tok-1",
        })))
        .mount(server)
        .await;
}

async fn mount_snapshot(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/users/u1.json"))
        .and(query_param("auth", "tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn records_cmd(server: &MockServer, home: &std::path::Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("gpslog");
    cmd.env("GPSLOG_HOME", home)
        .env("GPSLOG_IDENTITY_BASE_URL", server.uri())
        .env("GPSLOG_IDENTITY_API_KEY", "test-key")
        .env("GPSLOG_STORE_BASE_URL", server.uri())
        .env("GPSLOG_EMAIL", "user@example.com")
        .env("GPSLOG_PASSWORD", "secret")
        .env("TZ", "UTC")
        .arg("records");
    cmd
}

#[tokio::test(flavor = "multi_thread")]
async fn test_records_prints_the_table() {
    let server = MockServer::start().await;
    mount_sign_in(&server).await;
    mount_snapshot(
        &server,
        serde_json::json!({
            "-Na": { "latitude": 40.4168, "longitude": -3.7038, "timestamp": 1_700_000_000_000_i64 },
            "-Nb": { "latitude": 51.5074, "longitude": -0.1278, "timestamp": 1_700_000_100_000_i64 },
        }),
    )
    .await;
    let home = tempdir().unwrap();

    records_cmd(&server, home.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Latitude"))
        .stdout(predicate::str::contains("40.4168"))
        .stdout(predicate::str::contains("51.5074"))
        // Epoch 1700000000000 in UTC, dd/MM/yyyy HH:mm:ss.
        .stdout(predicate::str::contains("14/11/2023 22:13:20"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_records_drops_partial_entries() {
    let server = MockServer::start().await;
    mount_sign_in(&server).await;
    mount_snapshot(
        &server,
        serde_json::json!({
            "-Na": { "latitude": 1.5, "longitude": 2.5, "timestamp": 1_700_000_000_000_i64 },
            "-Nb": { "latitude": 99.9 },
        }),
    )
    .await;
    let home = tempdir().unwrap();

    records_cmd(&server, home.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1.5"))
        .stdout(predicate::str::contains("99.9").not());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_records_empty_store() {
    let server = MockServer::start().await;
    mount_sign_in(&server).await;
    mount_snapshot(&server, serde_json::Value::Null).await;
    let home = tempdir().unwrap();

    records_cmd(&server, home.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Latitude"));
}
