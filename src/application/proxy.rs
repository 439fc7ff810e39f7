//! Proxy Service
//!
//! Resolves the `endpoint` query parameter, calls the upstream backend and
//! the enrichment engine, and shapes the JSON response. Dependency failures
//! degrade to a 200 with `apiOffline: true`; only bad caller input is a 400.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::{json, Value};
use thiserror::Error;

use super::enrichment::EnrichmentEngine;
use crate::domain::{dedupe_alerts, Alert, OfflineStats};
use crate::ports::{AlertsQuery, UpstreamError, UpstreamPort};

/// Default `limit` for recent alerts
pub const DEFAULT_ALERT_LIMIT: u32 = 50;
/// Largest `limit` forwarded upstream
pub const MAX_ALERT_LIMIT: u32 = 100;
/// Default `days` for daily stats
pub const DEFAULT_DAILY_DAYS: u32 = 7;
/// Largest `days` forwarded upstream
pub const MAX_DAILY_DAYS: u32 = 90;

/// Request handling errors
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Invalid endpoint")]
    InvalidEndpoint(String),

    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ProxyError {
    /// Caller mistakes answer 400; everything else degrades
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ProxyError::InvalidEndpoint(_) | ProxyError::MissingParameter(_)
        )
    }
}

/// Endpoints selectable through `?endpoint=`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Health,
    Stats,
    Alerts,
    Daily,
    EnrichToken,
}

impl FromStr for Endpoint {
    type Err = ProxyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "health" => Ok(Endpoint::Health),
            "stats" => Ok(Endpoint::Stats),
            "alerts" => Ok(Endpoint::Alerts),
            "daily" => Ok(Endpoint::Daily),
            "enrich-token" => Ok(Endpoint::EnrichToken),
            other => Err(ProxyError::InvalidEndpoint(other.to_string())),
        }
    }
}

/// Status plus JSON body, converted to an HTTP response by the http adapter
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    pub fn bad_request(message: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: json!({ "error": message.to_string() }),
        }
    }
}

/// Request dispatcher shared by every HTTP request
#[derive(Clone)]
pub struct ProxyService {
    upstream: Arc<dyn UpstreamPort>,
    engine: EnrichmentEngine,
}

impl ProxyService {
    pub fn new(upstream: Arc<dyn UpstreamPort>, engine: EnrichmentEngine) -> Self {
        Self { upstream, engine }
    }

    pub fn engine(&self) -> &EnrichmentEngine {
        &self.engine
    }

    /// Handle one request. Never fails: unexpected errors become a degraded
    /// alerts payload carrying the error message.
    pub async fn handle(&self, params: &HashMap<String, String>) -> ApiResponse {
        match self.dispatch(params).await {
            Ok(response) => response,
            Err(e) if e.is_client_error() => {
                tracing::info!(error = %e, "rejected request");
                ApiResponse::bad_request(e)
            }
            Err(e) => {
                tracing::error!(error = %e, "request handler failed");
                ApiResponse::ok(json!({
                    "alerts": [],
                    "apiOffline": true,
                    "error": e.to_string(),
                }))
            }
        }
    }

    async fn dispatch(&self, params: &HashMap<String, String>) -> Result<ApiResponse, ProxyError> {
        let endpoint: Endpoint = params.get("endpoint").map(String::as_str).unwrap_or("").parse()?;
        tracing::info!(?endpoint, "dispatching request");

        match endpoint {
            Endpoint::Health => Ok(passthrough("health", self.upstream.health().await)),
            Endpoint::Stats => self.stats().await,
            Endpoint::Alerts => self.alerts(params).await,
            Endpoint::Daily => {
                let days = parse_clamped(params.get("days"), DEFAULT_DAILY_DAYS, MAX_DAILY_DAYS);
                Ok(passthrough("daily", self.upstream.daily_stats(days).await))
            }
            Endpoint::EnrichToken => self.enrich_token(params).await,
        }
    }

    async fn stats(&self) -> Result<ApiResponse, ProxyError> {
        match self.upstream.stats().await {
            Ok(body) => Ok(ApiResponse::ok(body)),
            Err(e) => {
                tracing::warn!(error = %e, "upstream stats unavailable");
                Ok(ApiResponse::ok(serde_json::to_value(OfflineStats::now())?))
            }
        }
    }

    async fn alerts(&self, params: &HashMap<String, String>) -> Result<ApiResponse, ProxyError> {
        let query = AlertsQuery {
            limit: parse_clamped(params.get("limit"), DEFAULT_ALERT_LIMIT, MAX_ALERT_LIMIT),
            tier: params
                .get("tier")
                .and_then(|t| t.trim().parse::<u8>().ok())
                .filter(|t| (1..=3).contains(t)),
        };

        let alerts = match self.upstream.recent_alerts(query).await.and_then(extract_alerts) {
            Ok(alerts) => alerts,
            Err(e) => {
                tracing::warn!(error = %e, "upstream alerts unavailable");
                return Ok(ApiResponse::ok(json!({ "alerts": [], "apiOffline": true })));
            }
        };

        let received = alerts.len();
        let unique = dedupe_alerts(alerts);
        tracing::debug!(received, unique = unique.len(), "deduplicated alerts");

        let enriched = self.engine.enrich_alerts(unique).await;
        Ok(ApiResponse::ok(json!({ "alerts": serde_json::to_value(enriched)? })))
    }

    async fn enrich_token(&self, params: &HashMap<String, String>) -> Result<ApiResponse, ProxyError> {
        let contract = params
            .get("contract")
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .ok_or(ProxyError::MissingParameter("contract"))?;

        let result = self
            .engine
            .enrich_token(
                contract,
                params.get("timestamp").map(String::as_str),
                params.get("entry_mcap").map(String::as_str),
            )
            .await;

        Ok(ApiResponse::ok(serde_json::to_value(result)?))
    }
}

/// Upstream JSON as-is, or an empty degraded payload
fn passthrough(name: &str, result: Result<Value, UpstreamError>) -> ApiResponse {
    match result {
        Ok(body) => ApiResponse::ok(body),
        Err(e) => {
            tracing::warn!(endpoint = name, error = %e, "upstream passthrough unavailable");
            ApiResponse::ok(json!({ "data": [], "apiOffline": true }))
        }
    }
}

/// Accepts a bare array or `{ "alerts": [...] }`. Each element is decoded on
/// its own; only non-object elements are skipped.
fn extract_alerts(payload: Value) -> Result<Vec<Alert>, UpstreamError> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("alerts") {
            Some(Value::Array(items)) => items,
            _ => return Err(UpstreamError::Malformed("missing alerts array".to_string())),
        },
        _ => return Err(UpstreamError::Malformed("unexpected alerts payload".to_string())),
    };

    let mut alerts = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match item {
            Value::Object(fields) => alerts.push(Alert::from(fields)),
            other => tracing::warn!(index, value = %other, "skipping non-object alert entry"),
        }
    }
    Ok(alerts)
}

fn parse_clamped(raw: Option<&String>, default: u32, max: u32) -> u32 {
    raw.and_then(|v| v.trim().parse::<u32>().ok())
        .map(|v| v.clamp(1, max))
        .unwrap_or(default)
}
