//! Peak Multiple
//!
//! Derives the peak multiplier from a sampled price series and defines the
//! cache record that persists it per contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::market::{format_market_cap, format_multiplier};

/// One sample from the historical-price provider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Bucket start, unix seconds
    pub unix_time: i64,
    /// Price in USD
    pub value: f64,
}

impl PricePoint {
    pub fn new(unix_time: i64, value: f64) -> Self {
        Self { unix_time, value }
    }
}

/// Peak multiple derived from a price series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakMultiple {
    /// Price of the first sample
    pub entry_price: f64,
    /// Highest sampled price
    pub peak_price: f64,
    /// `peak_price / entry_price`
    pub multiplier: f64,
}

impl PeakMultiple {
    /// Formatted multiplier, e.g. "3.2x"
    pub fn formatted(&self) -> String {
        format_multiplier(self.multiplier)
    }

    /// Peak market cap implied by an entry market cap
    pub fn peak_mcap(&self, entry_mcap: f64) -> f64 {
        entry_mcap * self.multiplier
    }
}

/// Compute the peak multiple of a series.
///
/// Entry is the first sample, not the sample closest to the alert time; with
/// 15-minute buckets the true intraday high may fall between samples. Returns
/// `None` for an empty series or a non-positive entry price.
pub fn compute_peak_multiple(series: &[PricePoint]) -> Option<PeakMultiple> {
    let entry_price = series.first()?.value;
    if !entry_price.is_finite() || entry_price <= 0.0 {
        return None;
    }

    let peak_price = series
        .iter()
        .map(|p| p.value)
        .filter(|v| v.is_finite())
        .fold(entry_price, f64::max);

    Some(PeakMultiple {
        entry_price,
        peak_price,
        multiplier: peak_price / entry_price,
    })
}

/// Persisted peak result, one row per contract (last write wins)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakCacheEntry {
    pub contract: String,
    /// Market cap at alert time
    pub entry_mcap: f64,
    /// Highest observed market cap since the alert
    pub peak_mcap: f64,
    /// Formatted multiplier
    pub peak_x: String,
    /// Alert time that bounded the history query
    pub alert_timestamp: String,
    pub last_updated: DateTime<Utc>,
}

impl PeakCacheEntry {
    pub fn new(
        contract: impl Into<String>,
        entry_mcap: f64,
        peak: &PeakMultiple,
        alert_timestamp: impl Into<String>,
    ) -> Self {
        Self {
            contract: contract.into(),
            entry_mcap,
            peak_mcap: peak.peak_mcap(entry_mcap),
            peak_x: peak.formatted(),
            alert_timestamp: alert_timestamp.into(),
            last_updated: Utc::now(),
        }
    }

    /// Formatted peak market cap
    pub fn peak_mcap_display(&self) -> String {
        format_market_cap(self.peak_mcap)
    }
}
