// Drives the Notion sink against a local mock of the pages endpoint.
// The sink uses a blocking client, so it runs on tokio's blocking pool
// while wiremock serves from the async runtime.

use mmath::{
    quiz::{Operation, SessionRecord},
    sink::{NotionSink, ResultSink, SinkError},
};
use serde_json::json;
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn record() -> SessionRecord {
    SessionRecord {
        date: "2024-06-30".into(),
        operation: Operation::Sub,
        elapsed_secs: 42.17,
        correct: 14,
        total: 15,
        accuracy_percent: 93.33,
    }
}

async fn send_to(server: &MockServer, timeout_secs: u64) -> Result<(), SinkError> {
    let base = server.uri();
    tokio::task::spawn_blocking(move || {
        let mut sink = NotionSink::new("secret_token", "db-42", Some(base), timeout_secs)?;
        sink.send(&record())
    })
    .await
    .expect("blocking task panicked")
}

#[tokio::test(flavor = "multi_thread")]
async fn posts_page_with_record_properties() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/pages"))
        .and(header("authorization", "Bearer secret_token"))
        .and(header("notion-version", "2022-06-28"))
        .and(body_partial_json(json!({
            "parent": { "database_id": "db-42" },
            "properties": {
                "Date": { "date": { "start": "2024-06-30" } },
                "Operation": { "rich_text": [ { "text": { "content": "sub" } } ] },
                "Time Taken": { "number": 42.17 },
                "Correct Answers": { "number": 14 },
                "Total Questions": { "number": 15 },
                "Accuracy": { "number": 93.33 }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "object": "page", "id": "p1" })))
        .expect(1)
        .mount(&server)
        .await;

    send_to(&server, 5).await.expect("record should be saved");
}

#[tokio::test(flavor = "multi_thread")]
async fn unauthorized_maps_to_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/pages"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "object": "error",
            "status": 401,
            "code": "unauthorized",
            "message": "API token is invalid."
        })))
        .mount(&server)
        .await;

    match send_to(&server, 5).await {
        Err(SinkError::Unauthorized(msg)) => assert_eq!(msg, "API token is invalid."),
        other => panic!("expected Unauthorized, got {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn validation_error_maps_to_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/pages"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "object": "error",
            "status": 400,
            "code": "validation_error",
            "message": "Accuracy is not a property that exists."
        })))
        .mount(&server)
        .await;

    match send_to(&server, 5).await {
        Err(SinkError::Validation(msg)) => assert!(msg.contains("Accuracy")),
        other => panic!("expected Validation, got {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn server_error_keeps_plain_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/pages"))
        .respond_with(ResponseTemplate::new(503).set_body_string("service unavailable"))
        .mount(&server)
        .await;

    match send_to(&server, 5).await {
        Err(SinkError::Api { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "service unavailable");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn slow_server_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/pages"))
        .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(3)))
        .mount(&server)
        .await;

    match send_to(&server, 1).await {
        Err(SinkError::Timeout(secs)) => assert_eq!(secs, 1),
        other => panic!("expected Timeout, got {:?}", other),
    }
}

#[test]
fn unreachable_host_is_network_error() {
    // Nothing listens on port 9 of localhost in test environments
    let mut sink = NotionSink::new("t", "db", Some("http://127.0.0.1:9".into()), 2).unwrap();
    match sink.send(&record()) {
        Err(SinkError::Network(_)) | Err(SinkError::Timeout(_)) => {}
        other => panic!("expected a transport error, got {:?}", other),
    }
}
