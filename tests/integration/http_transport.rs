// tests/http_transport.rs

use runwatch::engine::WorkflowSession;
use runwatch::errors::RunnerError;
use runwatch::protocol::RunPayload;
use runwatch::transport::{HttpTransport, HttpTransportOptions, WorkflowTransport};
use runwatch::types::RunPhase;
use runwatch_test_utils::{init_tracing, with_timeout};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_confirmation_round_trip_over_http() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/run_workflow"))
        .and(body_json(json!({ "dsl": "MOVE home", "screwHoles": [1, 2] })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("hello\n▶️ NEED_CONFIRM Continue?\nafter\n"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/confirm_response"))
        .and(body_json(json!({ "ok": true })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new(server.uri()).unwrap();
    let mut session = WorkflowSession::new(transport);
    let payload = RunPayload::new("MOVE home").with_screw_holes(json!([1, 2]));

    with_timeout(async {
        session.start(payload).await.unwrap();
        assert_eq!(session.pump().await.unwrap(), RunPhase::AwaitingConfirmation);
        assert_eq!(session.log(), "hello\n");

        session.resolve_confirmation(true).await.unwrap();
        assert_eq!(session.pump().await.unwrap(), RunPhase::Completed);
    })
    .await;

    assert_eq!(session.log(), "hello\nafter\n");
}

#[tokio::test]
async fn test_screw_holes_omitted_when_absent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/run_workflow"))
        .and(body_json(json!({ "dsl": "D" })))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok\n"))
        .expect(1)
        .mount(&server)
        .await;

    // A trailing slash on the base URL must not produce "//run_workflow".
    let transport = HttpTransport::new(format!("{}/", server.uri())).unwrap();
    let mut session = WorkflowSession::new(transport);
    with_timeout(async {
        session.start(RunPayload::new("D")).await.unwrap();
        assert_eq!(session.pump().await.unwrap(), RunPhase::Completed);
    })
    .await;
    assert_eq!(session.log(), "ok\n");
}

#[tokio::test]
async fn test_error_status_fails_the_run() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/run_workflow"))
        .respond_with(ResponseTemplate::new(500).set_body_string("executor busy"))
        .mount(&server)
        .await;

    let mut session = WorkflowSession::new(HttpTransport::new(server.uri()).unwrap());
    let err = with_timeout(session.start(RunPayload::new("D")))
        .await
        .unwrap_err();

    match err {
        RunnerError::Transport(msg) => {
            assert!(msg.contains("500"), "message: {msg}");
            assert!(msg.contains("executor busy"), "message: {msg}");
        }
        other => panic!("Expected Transport error, got: {other:?}"),
    }
    assert_eq!(session.phase(), RunPhase::Failed);
    assert!(session.log().starts_with("❌ Transport error: no stream returned"));
}

#[tokio::test]
async fn test_confirm_error_status_is_tolerated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/run_workflow"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("▶️ NEED_CONFIRM go?\nwent\n"),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/confirm_response"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = WorkflowSession::new(HttpTransport::new(server.uri()).unwrap());
    with_timeout(async {
        session.start(RunPayload::new("D")).await.unwrap();
        session.pump().await.unwrap();
        session.resolve_confirmation(false).await.unwrap();
        assert_eq!(session.pump().await.unwrap(), RunPhase::Completed);
    })
    .await;
    assert_eq!(session.log(), "went\n");
}

#[tokio::test]
async fn test_unreachable_service_is_a_transport_error() {
    // Bind then drop a server so the port is closed.
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };

    let options = HttpTransportOptions {
        connect_timeout: Some(Duration::from_millis(500)),
    };
    let mut transport = HttpTransport::with_options(uri, options).unwrap();
    let result = with_timeout(transport.open_run(RunPayload::new("D"))).await;
    assert!(matches!(result, Err(RunnerError::Transport(_))));
}
