// Integration tests for `TelemetryClient` using wiremock.
#![allow(clippy::unwrap_used)]

use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use edgenet_api::{Error, RetryPolicy, TelemetryClient, TransportConfig};

fn client_for(server: &MockServer) -> TelemetryClient {
    let transport = TransportConfig {
        timeout: Duration::from_millis(300),
        retry: RetryPolicy {
            max_attempts: 2,
            delay: Duration::from_millis(10),
        },
        ..TransportConfig::default()
    };
    let url = Url::parse(&format!("{}/api/telemetry", server.uri())).unwrap();
    TelemetryClient::new(url, &transport).unwrap()
}

#[tokio::test]
async fn test_post_batch_sends_json_body() {
    let server = MockServer::start().await;
    let batch = json!({
        "tenant_id": "acme",
        "timestamp": "2024-05-01T12:00:00Z",
        "devices": [{ "mac": "aa:bb:cc:dd:ee:ff" }]
    });

    Mock::given(method("POST"))
        .and(path("/api/telemetry"))
        .and(body_json(&batch))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).post_batch(&batch).await.unwrap();
}

#[tokio::test]
async fn test_post_batch_rejected_status_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/telemetry"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad batch"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server).post_batch(&json!({})).await.unwrap_err();
    assert!(matches!(err, Error::RpcProtocol { status: 400, .. }));
}

#[tokio::test]
async fn test_post_batch_retries_timeouts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/telemetry"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .expect(2)
        .mount(&server)
        .await;

    let err = client_for(&server).post_batch(&json!({})).await.unwrap_err();
    assert!(matches!(err, Error::Timeout { attempts: 2 }));
}

#[tokio::test]
async fn test_health_checks_origin() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).health().await.unwrap();
}
