//! Recording mocks for every port.
//!
//! Each mock records its calls and serves responses configured through
//! builder methods, so tests can assert both outputs and call counts.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use super::{
    AlertsQuery, CacheError, HistoryQuery, MarketDataError, PeakCachePort, PriceHistoryPort,
    SpotPricePort, UpstreamError, UpstreamPort,
};
use crate::domain::{PeakCacheEntry, PricePoint};

/// Mock upstream backend. Unconfigured endpoints answer with HTTP 503.
#[derive(Debug, Default, Clone)]
pub struct MockUpstream {
    calls: Arc<Mutex<Vec<String>>>,
    responses: Arc<Mutex<HashMap<&'static str, Result<Value, u16>>>>,
}

impl MockUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_health(self, body: Value) -> Self {
        self.set("health", Ok(body))
    }

    pub fn with_stats(self, body: Value) -> Self {
        self.set("stats", Ok(body))
    }

    pub fn with_alerts(self, body: Value) -> Self {
        self.set("alerts", Ok(body))
    }

    pub fn with_daily(self, body: Value) -> Self {
        self.set("daily", Ok(body))
    }

    /// Make one endpoint answer with a non-success status
    pub fn with_status(self, endpoint: &'static str, status: u16) -> Self {
        self.set(endpoint, Err(status))
    }

    /// Get all recorded calls
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn set(self, endpoint: &'static str, response: Result<Value, u16>) -> Self {
        self.responses.lock().unwrap().insert(endpoint, response);
        self
    }

    fn respond(&self, endpoint: &'static str, call: String) -> Result<Value, UpstreamError> {
        self.calls.lock().unwrap().push(call);
        match self.responses.lock().unwrap().get(endpoint) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(UpstreamError::Status(*status)),
            None => Err(UpstreamError::Status(503)),
        }
    }
}

#[async_trait]
impl UpstreamPort for MockUpstream {
    async fn health(&self) -> Result<Value, UpstreamError> {
        self.respond("health", "health".to_string())
    }

    async fn stats(&self) -> Result<Value, UpstreamError> {
        self.respond("stats", "stats".to_string())
    }

    async fn recent_alerts(&self, query: AlertsQuery) -> Result<Value, UpstreamError> {
        let call = match query.tier {
            Some(tier) => format!("alerts?limit={}&tier={}", query.limit, tier),
            None => format!("alerts?limit={}", query.limit),
        };
        self.respond("alerts", call)
    }

    async fn daily_stats(&self, days: u32) -> Result<Value, UpstreamError> {
        self.respond("daily", format!("daily?days={}", days))
    }
}

/// Mock spot-price provider keyed by contract
#[derive(Debug, Default, Clone)]
pub struct MockSpotPrice {
    calls: Arc<Mutex<Vec<String>>>,
    market_caps: Arc<Mutex<HashMap<String, f64>>>,
}

impl MockSpotPrice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_market_cap(self, contract: &str, market_cap: f64) -> Self {
        self.market_caps.lock().unwrap().insert(contract.to_string(), market_cap);
        self
    }

    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpotPricePort for MockSpotPrice {
    async fn market_cap(&self, contract: &str) -> Result<f64, MarketDataError> {
        self.calls.lock().unwrap().push(contract.to_string());
        self.market_caps
            .lock()
            .unwrap()
            .get(contract)
            .copied()
            .ok_or_else(|| MarketDataError::NoData(contract.to_string()))
    }
}

/// Mock historical-price provider
///
/// Serves a per-contract series, falling back to a default series when one
/// is configured; contracts marked as failing return an API error.
#[derive(Debug, Default, Clone)]
pub struct MockPriceHistory {
    calls: Arc<Mutex<Vec<HistoryQuery>>>,
    series: Arc<Mutex<HashMap<String, Vec<PricePoint>>>>,
    default_series: Arc<Mutex<Option<Vec<PricePoint>>>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl MockPriceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(self, contract: &str, series: Vec<PricePoint>) -> Self {
        self.series.lock().unwrap().insert(contract.to_string(), series);
        self
    }

    pub fn with_default_series(self, series: Vec<PricePoint>) -> Self {
        *self.default_series.lock().unwrap() = Some(series);
        self
    }

    pub fn failing_for(self, contract: &str) -> Self {
        self.failing.lock().unwrap().insert(contract.to_string());
        self
    }

    pub fn get_calls(&self) -> Vec<HistoryQuery> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl PriceHistoryPort for MockPriceHistory {
    async fn price_history(&self, query: &HistoryQuery) -> Result<Vec<PricePoint>, MarketDataError> {
        self.calls.lock().unwrap().push(query.clone());

        if self.failing.lock().unwrap().contains(&query.contract) {
            return Err(MarketDataError::ApiError {
                status: 500,
                message: "mock failure".to_string(),
            });
        }

        if let Some(series) = self.series.lock().unwrap().get(&query.contract) {
            return Ok(series.clone());
        }

        Ok(self.default_series.lock().unwrap().clone().unwrap_or_default())
    }
}

/// Mock peak cache with switchable read/write failures
#[derive(Debug, Default, Clone)]
pub struct MockPeakCache {
    entries: Arc<Mutex<HashMap<String, PeakCacheEntry>>>,
    reads: Arc<Mutex<Vec<String>>>,
    writes: Arc<Mutex<Vec<PeakCacheEntry>>>,
    fail_reads: bool,
    fail_writes: bool,
}

impl MockPeakCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, entry: PeakCacheEntry) -> Self {
        self.entries.lock().unwrap().insert(entry.contract.clone(), entry);
        self
    }

    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn get_reads(&self) -> Vec<String> {
        self.reads.lock().unwrap().clone()
    }

    pub fn get_writes(&self) -> Vec<PeakCacheEntry> {
        self.writes.lock().unwrap().clone()
    }

    pub fn stored(&self, contract: &str) -> Option<PeakCacheEntry> {
        self.entries.lock().unwrap().get(contract).cloned()
    }
}

#[async_trait]
impl PeakCachePort for MockPeakCache {
    async fn get(&self, contract: &str) -> Result<Option<PeakCacheEntry>, CacheError> {
        self.reads.lock().unwrap().push(contract.to_string());
        if self.fail_reads {
            return Err(CacheError::Unavailable("mock read failure".to_string()));
        }
        Ok(self.entries.lock().unwrap().get(contract).cloned())
    }

    async fn upsert(&self, entry: &PeakCacheEntry) -> Result<(), CacheError> {
        self.writes.lock().unwrap().push(entry.clone());
        if self.fail_writes {
            return Err(CacheError::Unavailable("mock write failure".to_string()));
        }
        self.entries
            .lock()
            .unwrap()
            .insert(entry.contract.clone(), entry.clone());
        Ok(())
    }
}
