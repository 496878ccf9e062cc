//! Failure injection tests for the player-info proxy.

use std::sync::atomic::Ordering;
use std::time::Duration;
use axum::http::StatusCode;
use player_proxy::http::ErrorBody;
use serde_json::Value;

mod common;

#[tokio::test]
async fn test_upstream_timeout_returns_504_and_cancels_call() {
    let upstream = common::start_hanging_upstream(Duration::from_secs(5)).await;

    let mut config = common::proxy_config(upstream.addr);
    config.upstream.timeout_ms = 200;
    let (proxy, shutdown) = common::start_proxy(config).await;

    let res = common::lookup(proxy, "123").await;
    assert_eq!(res.status(), StatusCode::GATEWAY_TIMEOUT);
    let body: ErrorBody = res.json().await.unwrap();
    assert_eq!(body.error, "Upstream request timed out");
    assert!(body.details.is_none());

    // The upstream should see the connection dropped well before its 5s delay.
    let mut cancelled = false;
    for _ in 0..40 {
        if upstream.cancelled.load(Ordering::SeqCst) {
            cancelled = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert!(cancelled, "Upstream call should be cancelled on timeout");
    assert_eq!(upstream.calls.load(Ordering::SeqCst), 1);

    shutdown.trigger();
}

#[tokio::test]
async fn test_connection_refused_returns_502_with_details() {
    let upstream = common::refused_addr().await;
    let (proxy, shutdown) = common::start_proxy(common::proxy_config(upstream)).await;

    let res = common::lookup(proxy, "123").await;
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);

    let body: ErrorBody = res.json().await.unwrap();
    assert_eq!(body.error, "Failed to reach upstream API");
    let details = body.details.expect("details should be present");
    assert!(details.starts_with("Upstream transport error"), "got {}", details);

    shutdown.trigger();
}

#[tokio::test]
async fn test_upstream_error_status_is_bad_gateway() {
    let upstream = common::start_programmable_upstream(|_| async {
        (503, r#"{"AccountInfo":{"AccountName":"ignored"}}"#.to_string())
    })
    .await;
    let (proxy, shutdown) = common::start_proxy(common::proxy_config(upstream.addr)).await;

    let res = common::lookup(proxy, "123").await;
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);

    let body: ErrorBody = res.json().await.unwrap();
    assert_eq!(body.details.as_deref(), Some("Upstream HTTP 503"));
    assert_eq!(upstream.call_count(), 1, "Upstream errors must not be retried");

    shutdown.trigger();
}

#[tokio::test]
async fn test_undecodable_body_is_bad_gateway() {
    let upstream = common::start_programmable_upstream(|_| async {
        (200, "<html>not json</html>".to_string())
    })
    .await;
    let (proxy, shutdown) = common::start_proxy(common::proxy_config(upstream.addr)).await;

    let res = common::lookup(proxy, "123").await;
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);

    let body: ErrorBody = res.json().await.unwrap();
    let details = body.details.expect("details should be present");
    assert!(details.starts_with("Upstream returned an undecodable body"), "got {}", details);

    shutdown.trigger();
}

#[tokio::test]
async fn test_rate_limit_rejects_excess_requests() {
    let upstream = common::start_json_upstream(r#"{"AccountInfo":{"AccountName":"X"}}"#).await;

    let mut config = common::proxy_config(upstream.addr);
    config.rate_limit.max_requests = 2;
    config.rate_limit.window_secs = 60;
    let (proxy, shutdown) = common::start_proxy(config).await;

    assert_eq!(common::lookup(proxy, "1").await.status(), StatusCode::OK);
    assert_eq!(common::lookup(proxy, "2").await.status(), StatusCode::OK);

    let limited = common::lookup(proxy, "3").await;
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = limited.headers()["retry-after"].to_str().unwrap().parse().unwrap();
    assert!(retry_after > 0 && retry_after <= 60);

    assert_eq!(upstream.call_count(), 2, "Limited requests must not reach upstream");

    shutdown.trigger();
}

#[tokio::test]
async fn test_unauthorized_requests_do_not_consume_rate_limit() {
    let upstream = common::start_json_upstream(r#"{"AccountInfo":{"AccountName":"X"}}"#).await;

    let mut config = common::proxy_config(upstream.addr);
    config.rate_limit.max_requests = 1;
    let (proxy, shutdown) = common::start_proxy(config).await;

    let client = common::client();
    for _ in 0..3 {
        let res = client
            .get(format!("http://{}/player-info?uid=1", proxy))
            .header("x-api-key", "wrong")
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    assert_eq!(common::lookup(proxy, "1").await.status(), StatusCode::OK);

    shutdown.trigger();
}

#[tokio::test]
async fn test_health_independent_of_upstream() {
    let upstream = common::refused_addr().await;
    let (proxy, shutdown) = common::start_proxy(common::proxy_config(upstream)).await;

    let res = common::client()
        .get(format!("http://{}/health", proxy))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["ok"], true);
    assert_eq!(body["pid"], std::process::id());
    assert!(body["envPort"].is_null());

    shutdown.trigger();
}

#[tokio::test]
async fn test_config_reload_rotates_key() {
    let upstream = common::start_json_upstream(r#"{"AccountInfo":{"AccountName":"X"}}"#).await;
    let config = common::proxy_config(upstream.addr);
    let (proxy, shutdown, updates) = common::start_proxy_with_updates(config.clone()).await;

    assert_eq!(common::lookup(proxy, "1").await.status(), StatusCode::OK);

    let mut rotated = config;
    rotated.access.api_key = "rotated-key".into();
    updates.send(rotated).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(common::lookup(proxy, "1").await.status(), StatusCode::UNAUTHORIZED);

    let res = common::client()
        .get(format!("http://{}/player-info?uid=1", proxy))
        .header("x-api-key", "rotated-key")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    shutdown.trigger();
}

#[tokio::test]
async fn test_oversized_body_is_bad_gateway() {
    let upstream = common::start_programmable_upstream(|_| async {
        let padding = "x".repeat(4096);
        (200, format!(r#"{{"AccountInfo":{{"AccountName":"X"}},"pad":"{}"}}"#, padding))
    })
    .await;

    let mut config = common::proxy_config(upstream.addr);
    config.upstream.max_body_bytes = 1024;
    let (proxy, shutdown) = common::start_proxy(config).await;

    let res = common::lookup(proxy, "1").await;
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);

    let body: ErrorBody = res.json().await.unwrap();
    assert_eq!(body.details.as_deref(), Some("Upstream body exceeds 1024 bytes"));

    shutdown.trigger();
}
