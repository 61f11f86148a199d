//! HttpSubmitter against a mock submission endpoint

use std::time::Duration;

use dogmail_core::api::http_client::ClientConfig;
use dogmail_core::api::{EmailSubmitter, HttpSubmitter};
use dogmail_core::TransportError;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn submitter_for(server: &MockServer, timeout: Duration) -> HttpSubmitter {
    HttpSubmitter::new(&server.uri(), ClientConfig::with_timeout(timeout)).unwrap()
}

#[tokio::test]
async fn test_accepted_submission_posts_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/submit-email"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "email": "user@example.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let submitter = submitter_for(&server, Duration::from_secs(5)).await;
    submitter.submit_email("user@example.com").await.unwrap();
}

#[tokio::test]
async fn test_server_error_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/submit-email"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "Failed to save email" })))
        .mount(&server)
        .await;

    let submitter = submitter_for(&server, Duration::from_secs(5)).await;
    let err = submitter.submit_email("user@example.com").await.unwrap_err();

    assert_eq!(
        err,
        TransportError::Status {
            status_code: 500,
            message: "Failed to save email".to_string(),
        }
    );
}

#[tokio::test]
async fn test_bad_request_without_body_falls_back_to_reason() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/submit-email"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let submitter = submitter_for(&server, Duration::from_secs(5)).await;
    let err = submitter.submit_email("user@example.com").await.unwrap_err();

    assert_eq!(
        err,
        TransportError::Status {
            status_code: 400,
            message: "Bad Request".to_string(),
        }
    );
}

#[tokio::test]
async fn test_slow_endpoint_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/submit-email"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let submitter = submitter_for(&server, Duration::from_millis(200)).await;
    let err = submitter.submit_email("user@example.com").await.unwrap_err();

    assert_eq!(err, TransportError::Timeout { timeout_ms: 200 });
}

#[tokio::test]
async fn test_unreachable_endpoint_is_network_error() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let submitter = HttpSubmitter::new(&uri, ClientConfig::with_timeout(Duration::from_secs(2))).unwrap();
    let err = submitter.submit_email("user@example.com").await.unwrap_err();

    assert!(matches!(err, TransportError::Network(_)), "unexpected error: {err:?}");
}
