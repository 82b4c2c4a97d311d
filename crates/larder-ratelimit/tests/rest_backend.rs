//! Integration tests for the Redis REST limiter backend
//!
//! These tests use wiremock to stand in for the REST endpoint and verify how
//! its answers map to limiter responses and infra failures, both directly and
//! through the breaker.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use larder_ratelimit::{
    BackendError, BreakerConfig, LimiterBackend, ManualClock, RateLimitBreaker,
    RateLimitDecision, RestLimiterBackend, SlidingWindow,
};
use larder_types::SubjectId;
use serde_json::json;
use wiremock::matchers::{header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-token";

fn backend(server: &MockServer) -> RestLimiterBackend {
    RestLimiterBackend::with_timeout(
        server.uri(),
        TOKEN,
        SlidingWindow::new(10, Duration::from_secs(60)),
        Duration::from_millis(500),
    )
    .unwrap()
}

#[tokio::test]
async fn test_remaining_quota_is_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": 7 })))
        .expect(1)
        .mount(&server)
        .await;

    let now = Utc.timestamp_millis_opt(1_700_000_005_000).unwrap();
    let response = backend(&server).limit("subject-1", now).await.unwrap();

    assert!(response.success);
    // Window of 60s: 1_700_000_005_000 / 60_000 = 28_333_333, reset at the next boundary
    assert_eq!(response.reset_at.timestamp_millis(), 28_333_334 * 60_000);
}

#[tokio::test]
async fn test_sends_eval_with_window_keys() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": 9 })))
        .mount(&server)
        .await;

    let now = Utc.timestamp_millis_opt(120_000).unwrap();
    backend(&server).limit("abc", now).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body[0], "EVAL");
    assert_eq!(body[2], "2");
    assert_eq!(body[3], "larder:ratelimit:abc:2");
    assert_eq!(body[4], "larder:ratelimit:abc:1");
    assert_eq!(body[5], "10");
    assert_eq!(body[6], "120000");
    assert_eq!(body[7], "60000");
}

#[tokio::test]
async fn test_minus_one_is_denial() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": -1 })))
        .mount(&server)
        .await;

    let response = backend(&server).limit("subject-1", Utc::now()).await.unwrap();
    assert!(!response.success);
}

#[tokio::test]
async fn test_error_payload_is_infra_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "error": "ERR max requests limit exceeded" })),
        )
        .mount(&server)
        .await;

    let err = backend(&server).limit("subject-1", Utc::now()).await.unwrap_err();
    assert!(matches!(err, BackendError::Remote(_)));
}

#[tokio::test]
async fn test_server_error_is_infra_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let err = backend(&server).limit("subject-1", Utc::now()).await.unwrap_err();
    match err {
        BackendError::Status { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "upstream unavailable");
        }
        other => panic!("Expected Status error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_non_integer_result_is_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "OK" })))
        .mount(&server)
        .await;

    let err = backend(&server).limit("subject-1", Utc::now()).await.unwrap_err();
    assert!(matches!(err, BackendError::Protocol(_)));
}

#[tokio::test]
async fn test_timeout_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "result": 1 }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = backend(&server).limit("subject-1", Utc::now()).await.unwrap_err();
    assert!(matches!(err, BackendError::Transport(_)));
}

#[tokio::test]
async fn test_breaker_fails_open_then_closed_on_unreachable_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let clock = ManualClock::default();
    let breaker = RateLimitBreaker::new(
        Arc::new(backend(&server)),
        Arc::new(clock),
        BreakerConfig::default().with_fail_open_threshold(3),
    );
    let subject = SubjectId::new();

    assert_eq!(breaker.check(&subject).await, RateLimitDecision::FailedOpen);
    assert_eq!(breaker.check(&subject).await, RateLimitDecision::FailedOpen);
    assert_eq!(breaker.check(&subject).await, RateLimitDecision::FailClosed);
}

#[tokio::test]
async fn test_breaker_denial_carries_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": -1 })))
        .mount(&server)
        .await;

    // 15s into a 60s window leaves 45s until reset
    let clock = ManualClock::new(Utc.timestamp_millis_opt(60_000 * 1_000 + 15_000).unwrap());
    let breaker = RateLimitBreaker::new(
        Arc::new(backend(&server)),
        Arc::new(clock),
        BreakerConfig::default(),
    );

    let decision = breaker.check(&SubjectId::new()).await;
    assert_eq!(decision, RateLimitDecision::Denied { retry_after_secs: 45 });
}
