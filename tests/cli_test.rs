mod common;

use axum::http::StatusCode;
use std::process::Output;
use tokio::process::Command;

use common::FakeServer;

/// Run the binary with a clean environment so no APP_* overrides leak in
async fn run_binary(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_webhook-submit"))
        .args(args)
        .env_remove("WEBHOOK_SUBMIT_CONFIG")
        .env_remove("APP_NAME")
        .env_remove("APP_REG_NO")
        .env_remove("APP_EMAIL")
        .env_remove("APP_ENDPOINTS_GENERATE")
        .env_remove("APP_ENDPOINTS_FALLBACK_SUBMIT")
        .env("RUST_LOG", "info")
        .output()
        .await
        .unwrap()
}

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[tokio::test]
async fn test_exit_zero_on_accepted_submission() {
    let server = FakeServer::start(
        (StatusCode::OK, r#"{"webhook":"{base}/submit","accessToken":"tok123"}"#),
        (StatusCode::OK, "accepted"),
    )
    .await;
    let generate_url = server.url("/generate");

    let output = run_binary(&[
        "--name",
        "John Doe",
        "--reg-no",
        "REG12347",
        "--email",
        "john@example.com",
        "--generate-url",
        &generate_url,
    ])
    .await;

    assert!(output.status.success(), "stderr: {}", text(&output.stderr));
    let stdout = text(&output.stdout);
    assert!(stdout.contains("[DONE] Submission status=200 OK"));
    assert!(stdout.contains("[RESP] Body=accepted"));
    assert!(!text(&output.stderr).contains("[ERROR]"));
}

#[tokio::test]
async fn test_exit_nonzero_on_rejected_submission() {
    let server = FakeServer::start(
        (StatusCode::OK, r#"{"webhook":"{base}/submit","accessToken":"tok123"}"#),
        (StatusCode::BAD_REQUEST, "wrong answer"),
    )
    .await;
    let generate_url = server.url("/generate");

    let output = run_binary(&["--reg-no", "REG12347", "--generate-url", &generate_url]).await;

    assert!(!output.status.success());
    let stderr = text(&output.stderr);
    assert!(stderr.contains("[ERROR] Submission failed: 400 Bad Request wrong answer"));
    // One report per failure on the error channel
    assert_eq!(stderr.matches("Submission failed").count(), 1, "stderr: {stderr}");
    assert!(!text(&output.stdout).contains("[DONE]"));
}

#[tokio::test]
async fn test_exit_nonzero_without_generate_url() {
    let output = run_binary(&["--name", "John Doe", "--reg-no", "REG12347"]).await;

    assert!(!output.status.success());
    let stderr = text(&output.stderr);
    assert!(
        stderr.contains("[ERROR] Failed to load configuration: Missing required endpoint: generate"),
        "stderr: {stderr}"
    );
    assert!(!text(&output.stdout).contains("[INIT]"));
}
