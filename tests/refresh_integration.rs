//! End-to-end refresh against mocked provider APIs.

use chrono::Utc;
use std::sync::Arc;
use vitalsync::adapters::{
    AccessCredential, AdapterRegistry, AppleHealthAdapter, FitbitAdapter, GoogleFitAdapter,
};
use vitalsync::refresh::RefreshService;
use vitalsync::types::{FailureKind, Platform, TimeRange, UserProfile};
use vitalsync::MetricHistory;
use wiremock::matchers::{header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn apple_samples_body() -> serde_json::Value {
    serde_json::json!({
        "samples": [
            {"type": "stepCount", "value": 4000},
            {"type": "restingHeartRate", "value": 68},
            {"type": "bodyMass", "value": 74.5}
        ]
    })
}

fn fitbit_summary_body() -> serde_json::Value {
    serde_json::json!({
        "summary": {
            "steps": 3500,
            "caloriesOut": 2100,
            "restingHeartRate": 72,
            "distances": [{"activity": "total", "distance": 2.8}]
        },
        "sleep": {"totalMinutesAsleep": 420}
    })
}

#[tokio::test]
async fn refresh_merges_readings_from_multiple_providers() {
    let apple_server = MockServer::start().await;
    let fitbit_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/samples"))
        .and(header("authorization", "Bearer apple-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(apple_samples_body()))
        .expect(1)
        .mount(&apple_server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/1/user/-/daily-summary/\d{4}-\d{2}-\d{2}\.json$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fitbit_summary_body()))
        .expect(1)
        .mount(&fitbit_server)
        .await;

    let client = reqwest::Client::new();
    let mut registry = AdapterRegistry::new();
    registry.register(Arc::new(AppleHealthAdapter::new(&apple_server.uri(), client.clone())));
    registry.register(Arc::new(FitbitAdapter::new(&fitbit_server.uri(), client)));

    let service = RefreshService::new(registry);
    let now = Utc::now();
    let report = service
        .refresh(
            &[
                (Platform::AppleHealth, AccessCredential::new("apple-token")),
                (Platform::Fitbit, AccessCredential::new("fitbit-token")),
            ],
            &TimeRange::today(now),
            &UserProfile::default(),
            &MetricHistory::new(),
            now,
        )
        .await;

    assert_eq!(report.sync_summary(), "2 of 2 platforms synced");
    // Additive across platforms
    assert_eq!(report.snapshot.steps, Some(7500));
    // Representative mean of 68 and 72
    assert_eq!(report.snapshot.heart_rate_bpm, Some(70));
    // Point sample from the first platform that reports it
    assert_eq!(report.snapshot.weight_kg, Some(74.5));
    // Only Fitbit reports sleep
    assert_eq!(report.snapshot.sleep_hours, Some(7.0));
}

#[tokio::test]
async fn expired_token_reported_without_aborting_other_platforms() {
    let apple_server = MockServer::start().await;
    let fitbit_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/samples"))
        .respond_with(ResponseTemplate::new(200).set_body_json(apple_samples_body()))
        .mount(&apple_server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/1/user/-/daily-summary/.*$"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .mount(&fitbit_server)
        .await;

    let client = reqwest::Client::new();
    let mut registry = AdapterRegistry::new();
    registry.register(Arc::new(AppleHealthAdapter::new(&apple_server.uri(), client.clone())));
    registry.register(Arc::new(FitbitAdapter::new(&fitbit_server.uri(), client)));

    let service = RefreshService::new(registry);
    let now = Utc::now();
    let report = service
        .refresh(
            &[
                (Platform::AppleHealth, AccessCredential::new("apple-token")),
                (Platform::Fitbit, AccessCredential::new("stale-token")),
            ],
            &TimeRange::today(now),
            &UserProfile::default(),
            &MetricHistory::new(),
            now,
        )
        .await;

    assert_eq!(report.sync_summary(), "1 of 2 platforms synced");
    assert_eq!(report.snapshot.steps, Some(4000));
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].platform, Platform::Fitbit);
    assert_eq!(report.failed[0].kind, FailureKind::Unauthorized);
}

#[tokio::test]
async fn provider_outage_is_retryable_not_fatal() {
    let google_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/me/dataset:aggregate"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&google_server)
        .await;

    let mut registry = AdapterRegistry::new();
    registry.register(Arc::new(GoogleFitAdapter::new(
        &google_server.uri(),
        reqwest::Client::new(),
    )));

    let service = RefreshService::new(registry);
    let now = Utc::now();
    let report = service
        .refresh(
            &[(Platform::GoogleFit, AccessCredential::new("google-token"))],
            &TimeRange::today(now),
            &UserProfile::default(),
            &MetricHistory::new(),
            now,
        )
        .await;

    assert_eq!(report.sync_summary(), "0 of 1 platforms synced");
    assert_eq!(report.failed[0].kind, FailureKind::ProviderUnavailable);
    assert!(report.failed[0].detail.contains("503"));
}

#[tokio::test]
async fn malformed_payload_reported_as_provider_fault() {
    let fitbit_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/1/user/-/daily-summary/.*$"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway error</html>"))
        .mount(&fitbit_server)
        .await;

    let mut registry = AdapterRegistry::new();
    registry.register(Arc::new(FitbitAdapter::new(
        &fitbit_server.uri(),
        reqwest::Client::new(),
    )));

    let service = RefreshService::new(registry);
    let now = Utc::now();
    let report = service
        .refresh(
            &[(Platform::Fitbit, AccessCredential::new("fitbit-token"))],
            &TimeRange::today(now),
            &UserProfile::default(),
            &MetricHistory::new(),
            now,
        )
        .await;

    assert_eq!(report.sync_summary(), "0 of 1 platforms synced");
    assert_eq!(report.failed[0].kind, FailureKind::ProviderUnavailable);
    assert!(report.failed[0].detail.contains("malformed provider payload"));
}

#[tokio::test]
async fn authenticated_platform_with_no_samples_counts_as_synced() {
    let apple_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/samples"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"samples": []})))
        .mount(&apple_server)
        .await;

    let mut registry = AdapterRegistry::new();
    registry.register(Arc::new(AppleHealthAdapter::new(
        &apple_server.uri(),
        reqwest::Client::new(),
    )));

    let service = RefreshService::new(registry);
    let now = Utc::now();
    let report = service
        .refresh(
            &[(Platform::AppleHealth, AccessCredential::new("apple-token"))],
            &TimeRange::today(now),
            &UserProfile::default(),
            &MetricHistory::new(),
            now,
        )
        .await;

    // NoData is not an error
    assert_eq!(report.sync_summary(), "1 of 1 platforms synced");
    assert!(report.snapshot.steps.is_none());
    assert!(report.insights.is_empty());
}
