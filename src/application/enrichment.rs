//! Enrichment Engine
//!
//! Adds live market cap and peak multiple to alerts:
//!
//! 1. Every alert with a valid contract gets a spot market-cap lookup.
//! 2. At most `max_peak_lookups` alerts per batch attempt a peak lookup. The
//!    counter is a running total of attempts; cache hits use a slot too.
//! 3. A peak lookup consults the cache first. On a miss it queries the
//!    history provider, sleeps `history_call_delay`, and writes the result
//!    back keyed by contract.
//!
//! Alerts are processed strictly one after another, so provider calls are
//! never issued in parallel within a request. Provider and cache failures
//! are logged and the alert keeps its placeholder values.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

use crate::domain::{
    compute_peak_multiple, format_market_cap, is_valid_contract, parse_market_cap, Alert,
    EnrichedAlert, PeakCacheEntry, DEFAULT_MARKET_CAP, DEFAULT_PEAK_MCAP, DEFAULT_PEAK_X,
};
use crate::ports::{HistoryQuery, PeakCachePort, PriceHistoryPort, SpotPricePort};

/// Enrichment limits
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentConfig {
    /// Peak lookups allowed per batch
    pub max_peak_lookups: usize,
    /// Pause after each history provider call
    pub history_call_delay: Duration,
    /// History bucket size
    pub history_interval: String,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            max_peak_lookups: 4,
            history_call_delay: Duration::from_millis(500),
            history_interval: "15m".to_string(),
        }
    }
}

/// Result of single-token enrichment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenEnrichment {
    pub contract: String,
    pub peak_x: String,
    pub peak_mcap: String,
    pub market_cap: String,
}

impl TokenEnrichment {
    fn placeholder(contract: &str) -> Self {
        Self {
            contract: contract.to_string(),
            peak_x: DEFAULT_PEAK_X.to_string(),
            peak_mcap: DEFAULT_PEAK_MCAP.to_string(),
            market_cap: DEFAULT_MARKET_CAP.to_string(),
        }
    }
}

/// Everything a peak lookup needs, validated up front
#[derive(Debug, Clone)]
struct PeakRequest {
    contract: String,
    entry_mcap: f64,
    alert_timestamp: String,
    alert_time: DateTime<Utc>,
}

impl PeakRequest {
    fn new(contract: &str, timestamp: Option<&str>, entry_mcap: Option<&str>) -> Option<Self> {
        if !is_valid_contract(contract) {
            return None;
        }
        let entry_mcap = entry_mcap.and_then(parse_market_cap)?;
        let alert_timestamp = timestamp?.trim();
        let alert_time = parse_timestamp(alert_timestamp)?;

        Some(Self {
            contract: contract.to_string(),
            entry_mcap,
            alert_timestamp: alert_timestamp.to_string(),
            alert_time,
        })
    }
}

/// Parse an ISO-8601 alert time. Offsetless values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

/// Market-data enrichment over the spot, history and cache ports
#[derive(Clone)]
pub struct EnrichmentEngine {
    spot: Arc<dyn SpotPricePort>,
    /// `None` when no history API key is configured
    history: Option<Arc<dyn PriceHistoryPort>>,
    cache: Arc<dyn PeakCachePort>,
    config: EnrichmentConfig,
}

impl EnrichmentEngine {
    pub fn new(
        spot: Arc<dyn SpotPricePort>,
        history: Option<Arc<dyn PriceHistoryPort>>,
        cache: Arc<dyn PeakCachePort>,
        config: EnrichmentConfig,
    ) -> Self {
        Self {
            spot,
            history,
            cache,
            config,
        }
    }

    pub fn config(&self) -> &EnrichmentConfig {
        &self.config
    }

    /// Whether peak multiples can be computed at all
    pub fn history_enabled(&self) -> bool {
        self.history.is_some()
    }

    /// Enrich a deduplicated batch, preserving order
    pub async fn enrich_alerts(&self, alerts: Vec<Alert>) -> Vec<EnrichedAlert> {
        let mut peak_attempts = 0usize;
        let mut enriched_alerts = Vec::with_capacity(alerts.len());

        for alert in alerts {
            let mut enriched = EnrichedAlert::from_alert(alert);

            if !is_valid_contract(&enriched.alert.contract) {
                enriched_alerts.push(enriched);
                continue;
            }

            if let Some(market_cap) = self.lookup_market_cap(&enriched.alert.contract).await {
                enriched.market_cap = market_cap;
            }

            if self.history_enabled() && peak_attempts < self.config.max_peak_lookups {
                let request = PeakRequest::new(
                    &enriched.alert.contract,
                    enriched.alert.timestamp.as_deref(),
                    enriched.alert.entry_mcap.as_deref(),
                );
                if let Some(request) = request {
                    peak_attempts += 1;
                    if let Some((peak_x, peak_mcap)) = self.lookup_peak(&request, true).await {
                        enriched.set_peak(peak_x, peak_mcap);
                    }
                }
            }

            enriched_alerts.push(enriched);
        }

        tracing::debug!(
            alerts = enriched_alerts.len(),
            peak_attempts,
            "batch enrichment complete"
        );
        enriched_alerts
    }

    /// Enrich one caller-supplied contract, outside the batch cap
    pub async fn enrich_token(
        &self,
        contract: &str,
        timestamp: Option<&str>,
        entry_mcap: Option<&str>,
    ) -> TokenEnrichment {
        let mut result = TokenEnrichment::placeholder(contract);
        if !is_valid_contract(contract) {
            tracing::debug!(contract, "invalid contract, skipping enrichment");
            return result;
        }

        if let Some(market_cap) = self.lookup_market_cap(contract).await {
            result.market_cap = market_cap;
        }

        if self.history_enabled() {
            if let Some(request) = PeakRequest::new(contract, timestamp, entry_mcap) {
                if let Some((peak_x, peak_mcap)) = self.lookup_peak(&request, false).await {
                    result.peak_x = peak_x;
                    result.peak_mcap = peak_mcap;
                }
            }
        }

        result
    }

    async fn lookup_market_cap(&self, contract: &str) -> Option<String> {
        match self.spot.market_cap(contract).await {
            Ok(market_cap) => Some(format_market_cap(market_cap)),
            Err(e) => {
                tracing::warn!(contract, error = %e, "spot market cap lookup failed");
                None
            }
        }
    }

    /// Cache first, then the history provider. Returns formatted
    /// `(peak_x, peak_mcap)` or `None` to keep placeholders.
    async fn lookup_peak(&self, request: &PeakRequest, pace: bool) -> Option<(String, String)> {
        match self.cache.get(&request.contract).await {
            Ok(Some(entry)) => {
                tracing::debug!(contract = %request.contract, peak_x = %entry.peak_x, "peak cache hit");
                return Some((entry.peak_x.clone(), entry.peak_mcap_display()));
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(contract = %request.contract, error = %e, "peak cache read failed, treating as miss");
            }
        }

        let history = self.history.as_ref()?;
        let query = HistoryQuery {
            contract: request.contract.clone(),
            time_from: request.alert_time,
            time_to: Utc::now(),
            interval: self.config.history_interval.clone(),
        };

        let result = history.price_history(&query).await;
        if pace && !self.config.history_call_delay.is_zero() {
            tokio::time::sleep(self.config.history_call_delay).await;
        }

        let series = match result {
            Ok(series) => series,
            Err(e) => {
                tracing::warn!(contract = %request.contract, error = %e, "price history lookup failed");
                return None;
            }
        };

        let Some(peak) = compute_peak_multiple(&series) else {
            tracing::debug!(contract = %request.contract, samples = series.len(), "no usable price history");
            return None;
        };

        let entry = PeakCacheEntry::new(
            request.contract.as_str(),
            request.entry_mcap,
            &peak,
            request.alert_timestamp.as_str(),
        );
        if let Err(e) = self.cache.upsert(&entry).await {
            tracing::warn!(contract = %request.contract, error = %e, "peak cache write failed");
        }

        Some((entry.peak_x.clone(), entry.peak_mcap_display()))
    }
}
