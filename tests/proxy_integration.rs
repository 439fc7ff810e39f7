//! Proxy Integration Tests
//!
//! Drive the axum router end to end:
//! 1. Routing, CORS and the 400 / 404 cases
//! 2. Alerts flow: dedupe, spot enrichment, peak cap, cache write-back
//! 3. Pacing: cache hits never sleep, cache misses sleep once
//! 4. A real `UpstreamClient` against an in-process stub backend
//!
//! Provider calls go through the recording mocks; only the stub backend
//! binds a local socket.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower::ServiceExt;

use solboy_api::adapters::http::build_router;
use solboy_api::adapters::peak_cache::InMemoryPeakCache;
use solboy_api::adapters::upstream::{UpstreamClient, UpstreamConfig};
use solboy_api::application::{EnrichmentConfig, EnrichmentEngine, ProxyService};
use solboy_api::domain::{compute_peak_multiple, PeakCacheEntry, PricePoint};
use solboy_api::ports::mocks::{MockPeakCache, MockPriceHistory, MockSpotPrice, MockUpstream};
use solboy_api::ports::{PeakCachePort, UpstreamPort};

// ============================================================================
// Test Fixtures
// ============================================================================

const MINT: &str = "7GCihgDB8fe6KNjn2MYtkzZcRjQy3t9GHdC8uHYmW2hr";
const MINT_PREFIX: &str = "7GCihgDB8fe6KNjn2MYtkzZcRjQy3t9GHdC8uHYmW2h";

/// Ten distinct valid mints
fn mints() -> Vec<String> {
    "ABCDEFGHJK"
        .chars()
        .map(|c| format!("{}{}", MINT_PREFIX, c))
        .collect()
}

/// Entry 1.0, peak 3.0
fn tripling_series() -> Vec<PricePoint> {
    vec![
        PricePoint::new(1_767_614_400, 1.0),
        PricePoint::new(1_767_615_300, 3.0),
        PricePoint::new(1_767_616_200, 2.0),
    ]
}

fn alert_json(contract: &str, tier: u8) -> Value {
    json!({
        "contract": contract,
        "tier": tier,
        "symbol": "TEST",
        "timestamp": "2026-01-05T12:00:00Z",
        "entry_mcap": 50000
    })
}

struct Harness {
    upstream: MockUpstream,
    history: MockPriceHistory,
    cache: MockPeakCache,
}

impl Harness {
    fn new(upstream: MockUpstream) -> Self {
        Self {
            upstream,
            history: MockPriceHistory::new().with_default_series(tripling_series()),
            cache: MockPeakCache::new(),
        }
    }

    fn with_cache(mut self, cache: MockPeakCache) -> Self {
        self.cache = cache;
        self
    }

    fn service(&self, delay_ms: u64) -> Arc<ProxyService> {
        let engine = EnrichmentEngine::new(
            Arc::new(MockSpotPrice::new().with_market_cap(MINT, 2_500_000.0)),
            Some(Arc::new(self.history.clone())),
            Arc::new(self.cache.clone()),
            EnrichmentConfig {
                history_call_delay: std::time::Duration::from_millis(delay_ms),
                ..Default::default()
            },
        );
        Arc::new(ProxyService::new(Arc::new(self.upstream.clone()), engine))
    }

    fn router(&self) -> Router {
        build_router(self.service(0))
    }
}

async fn get_json(router: Router, uri: &str) -> (StatusCode, HashMap<String, String>, Value) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::ORIGIN, "https://dashboard.example.com")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response
        .headers()
        .iter()
        .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or_default().to_string()))
        .collect();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}

/// Spawn a stub backend; returns its base URL
async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    format!("http://{}", addr)
}

// ============================================================================
// Routing and CORS
// ============================================================================

#[tokio::test]
async fn test_invalid_endpoint_is_400_with_cors() {
    let harness = Harness::new(MockUpstream::new());

    let (status, headers, body) = get_json(harness.router(), "/api/solboy?endpoint=bogus").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid endpoint" }));
    assert_eq!(headers.get("access-control-allow-origin").map(String::as_str), Some("*"));
    assert!(harness.upstream.get_calls().is_empty());
}

#[tokio::test]
async fn test_enrich_token_without_contract_is_400() {
    let harness = Harness::new(MockUpstream::new());

    let (status, _, body) = get_json(harness.router(), "/?endpoint=enrich-token").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Missing required parameter: contract" }));
}

#[tokio::test]
async fn test_options_preflight() {
    let harness = Harness::new(MockUpstream::new());

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/solboy?endpoint=alerts")
        .header(header::ORIGIN, "https://dashboard.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(Body::empty())
        .unwrap();

    let response = harness.router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.is_empty());
    assert!(harness.upstream.get_calls().is_empty());
}

#[tokio::test]
async fn test_plain_options_without_preflight_headers() {
    let harness = Harness::new(MockUpstream::new());

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/")
        .body(Body::empty())
        .unwrap();

    let response = harness.router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_path_is_404() {
    let harness = Harness::new(MockUpstream::new());

    let (status, _, body) = get_json(harness.router(), "/api/other?endpoint=health").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Not found" }));
}

#[tokio::test]
async fn test_health_passthrough() {
    let harness = Harness::new(MockUpstream::new().with_health(json!({ "status": "ok" })));

    let (status, _, body) = get_json(harness.router(), "/?endpoint=health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

// ============================================================================
// Alerts flow
// ============================================================================

#[tokio::test]
async fn test_alerts_dedupe_and_enrich() {
    let upstream = MockUpstream::new().with_alerts(json!({ "alerts": [
        alert_json(MINT, 1),
        alert_json(MINT, 1),
        alert_json(MINT, 2),
    ]}));
    let harness = Harness::new(upstream);

    let (status, _, body) = get_json(harness.router(), "/api/solboy?endpoint=alerts&limit=20").await;

    assert_eq!(status, StatusCode::OK);
    let alerts = body["alerts"].as_array().unwrap();
    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[0]["tier"], 1);
    assert_eq!(alerts[1]["tier"], 2);

    for alert in alerts {
        assert_eq!(alert["symbol"], "TEST");
        assert_eq!(alert["market_cap"], "$2.50M");
        assert_eq!(alert["peak_x"], "3.0x");
        assert_eq!(alert["ath_x"], "3.0x");
        assert_eq!(alert["peak_mcap"], "$150.0K");
        assert_eq!(alert["ath_mcap"], alert["peak_mcap"]);
        assert_eq!(alert["risk_score"], 0);
        assert_eq!(alert["risk_level"], "N/A");
        assert_eq!(alert["top10_holders"], 0);
    }

    // second (MINT, 2) alert is served from the entry written by the first
    assert_eq!(harness.history.call_count(), 1);
    assert_eq!(harness.cache.get_writes().len(), 1);
    assert_eq!(harness.cache.stored(MINT).unwrap().peak_x, "3.0x");
}

#[tokio::test]
async fn test_peak_lookups_capped_at_four() {
    let alerts: Vec<Value> = mints().iter().map(|m| alert_json(m, 1)).collect();
    let harness = Harness::new(MockUpstream::new().with_alerts(Value::Array(alerts)));

    let (status, _, body) = get_json(harness.router(), "/?endpoint=alerts").await;

    assert_eq!(status, StatusCode::OK);
    let alerts = body["alerts"].as_array().unwrap();
    assert_eq!(alerts.len(), 10);

    let with_peak = alerts.iter().filter(|a| a["peak_x"] != "—").count();
    assert_eq!(with_peak, 4);
    assert!(alerts[4..].iter().all(|a| a["peak_x"] == "—" && a["peak_mcap"] == "N/A"));
    assert_eq!(harness.history.call_count(), 4);
}

#[tokio::test]
async fn test_cache_hits_count_toward_cap() {
    let mints = mints();
    let peak = compute_peak_multiple(&[PricePoint::new(0, 1.0), PricePoint::new(900, 5.0)]).unwrap();
    let mut cache = MockPeakCache::new();
    for mint in &mints[..2] {
        cache = cache.with_entry(PeakCacheEntry::new(mint.as_str(), 10_000.0, &peak, "2026-01-05T12:00:00Z"));
    }

    let alerts: Vec<Value> = mints.iter().map(|m| alert_json(m, 1)).collect();
    let harness = Harness::new(MockUpstream::new().with_alerts(Value::Array(alerts))).with_cache(cache);

    let (_, _, body) = get_json(harness.router(), "/?endpoint=alerts").await;

    let alerts = body["alerts"].as_array().unwrap();
    assert_eq!(alerts[0]["peak_x"], "5.0x");
    assert_eq!(alerts[0]["peak_mcap"], "$50.0K");
    assert_eq!(alerts.iter().filter(|a| a["peak_x"] != "—").count(), 4);
    assert_eq!(harness.history.call_count(), 2);
}

#[tokio::test]
async fn test_alerts_upstream_down_degrades() {
    let harness = Harness::new(MockUpstream::new().with_status("alerts", 500));

    let (status, _, body) = get_json(harness.router(), "/?endpoint=alerts").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "alerts": [], "apiOffline": true }));
}

#[tokio::test]
async fn test_enrich_token_bypasses_cap_and_uses_cache() {
    let harness = Harness::new(MockUpstream::new());
    let uri = format!(
        "/?endpoint=enrich-token&contract={}&timestamp=2026-01-05T12:00:00Z&entry_mcap=50000",
        MINT
    );

    let (_, _, first) = get_json(harness.router(), &uri).await;
    let (_, _, second) = get_json(harness.router(), &uri).await;

    let expected = json!({
        "contract": MINT,
        "peak_x": "3.0x",
        "peak_mcap": "$150.0K",
        "market_cap": "$2.50M",
    });
    assert_eq!(first, expected);
    assert_eq!(second, expected);
    assert_eq!(harness.history.call_count(), 1);
}

#[tokio::test]
async fn test_enrich_token_invalid_contract_makes_no_calls() {
    let harness = Harness::new(MockUpstream::new());

    let (status, _, body) = get_json(
        harness.router(),
        "/?endpoint=enrich-token&contract=not-a-mint&entry_mcap=50000&timestamp=2026-01-05T12:00:00Z",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["peak_x"], "—");
    assert_eq!(body["market_cap"], "N/A");
    assert_eq!(harness.history.call_count(), 0);
    assert!(harness.cache.get_reads().is_empty());
}

// ============================================================================
// Pacing
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_cache_hit_does_not_sleep() {
    let peak = compute_peak_multiple(&tripling_series()).unwrap();
    let cache = MockPeakCache::new().with_entry(PeakCacheEntry::new(MINT, 50_000.0, &peak, "2026-01-05T12:00:00Z"));
    let harness = Harness::new(MockUpstream::new()).with_cache(cache);
    let service = harness.service(500);

    let start = tokio::time::Instant::now();
    let result = service
        .engine()
        .enrich_token(MINT, Some("2026-01-05T12:00:00Z"), Some("50000"))
        .await;
    assert_eq!(result.peak_x, "3.0x");

    let alerts = service
        .engine()
        .enrich_alerts(vec![solboy_api::domain::Alert::new(MINT, 1)
            .with_timestamp("2026-01-05T12:00:00Z")
            .with_entry_mcap("50000")])
        .await;

    assert_eq!(alerts[0].peak_x, "3.0x");
    assert_eq!(start.elapsed(), std::time::Duration::ZERO);
    assert_eq!(harness.history.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cache_miss_sleeps_after_history_call() {
    let mints = mints();
    let harness = Harness::new(MockUpstream::new());
    let service = harness.service(500);

    let alerts = mints[..3]
        .iter()
        .map(|m| {
            solboy_api::domain::Alert::new(m.as_str(), 1)
                .with_timestamp("2026-01-05T12:00:00Z")
                .with_entry_mcap("50000")
        })
        .collect();

    let start = tokio::time::Instant::now();
    service.engine().enrich_alerts(alerts).await;

    assert!(start.elapsed() >= std::time::Duration::from_millis(1_500));
    assert_eq!(harness.history.call_count(), 3);
}

// ============================================================================
// Real upstream client
// ============================================================================

fn service_over(upstream: UpstreamClient) -> Arc<ProxyService> {
    let engine = EnrichmentEngine::new(
        Arc::new(MockSpotPrice::new()),
        None,
        Arc::new(InMemoryPeakCache::new()),
        EnrichmentConfig::default(),
    );
    Arc::new(ProxyService::new(Arc::new(upstream), engine))
}

#[tokio::test]
async fn test_real_client_backend_503_degrades() {
    let backend = Router::new().fallback(|| async { StatusCode::SERVICE_UNAVAILABLE });
    let base_url = spawn_backend(backend).await;
    let client = UpstreamClient::with_config(UpstreamConfig::new(base_url)).unwrap();
    let router = build_router(service_over(client));

    let (status, _, alerts) = get_json(router.clone(), "/?endpoint=alerts").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(alerts, json!({ "alerts": [], "apiOffline": true }));

    let (_, _, daily) = get_json(router.clone(), "/?endpoint=daily").await;
    assert_eq!(daily, json!({ "data": [], "apiOffline": true }));

    let (_, _, stats) = get_json(router, "/?endpoint=stats").await;
    assert_eq!(stats["apiOffline"], true);
    assert_eq!(stats["totalAlerts"], 0);
    assert!(stats["lastUpdated"].is_string());
}

#[tokio::test]
async fn test_real_client_paths_and_trailing_slash() {
    let backend = Router::new()
        .route("/api/stats", get(|| async { Json(json!({ "totalAlerts": 42 })) }))
        .route(
            "/api/alerts/recent",
            get(|axum::extract::Query(q): axum::extract::Query<HashMap<String, String>>| async move {
                Json(json!([{ "contract": "x", "tier": 1, "limit_seen": q.get("limit") }]))
            }),
        );
    let base_url = spawn_backend(backend).await;
    let client = UpstreamClient::with_config(UpstreamConfig::new(format!("{}//", base_url))).unwrap();

    let stats = client.stats().await.unwrap();
    assert_eq!(stats["totalAlerts"], 42);

    let router = build_router(service_over(client));
    let (_, _, body) = get_json(router, "/?endpoint=alerts&limit=7").await;

    let alerts = body["alerts"].as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["limit_seen"], "7");
    assert_eq!(alerts[0]["market_cap"], "N/A");
}

#[tokio::test]
async fn test_real_client_unreachable_backend() {
    // bind then drop to get a closed port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = UpstreamClient::with_config(UpstreamConfig::new(format!("http://{}", addr))).unwrap();
    assert!(client.health().await.is_err());

    let (status, _, body) = get_json(build_router(service_over(client)), "/?endpoint=health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "data": [], "apiOffline": true }));
}

#[tokio::test]
async fn test_memory_cache_write_back_round() {
    let cache = InMemoryPeakCache::new();
    let peak = compute_peak_multiple(&tripling_series()).unwrap();
    cache
        .upsert(&PeakCacheEntry::new(MINT, 50_000.0, &peak, "2026-01-05T12:00:00Z"))
        .await
        .unwrap();

    let stored = cache.get(MINT).await.unwrap().unwrap();
    assert_eq!(stored.peak_mcap_display(), "$150.0K");
}
