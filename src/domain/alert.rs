//! Alert Types
//!
//! Alerts arrive from the upstream backend as loosely-typed JSON. Only the
//! identity pair (contract, tier) plus the timestamp and entry market cap are
//! interpreted here; the object itself rides along untouched.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Placeholder shown when no market cap is known
pub const DEFAULT_MARKET_CAP: &str = "N/A";
/// Placeholder shown when no peak multiple has been computed
pub const DEFAULT_PEAK_X: &str = "—";
/// Placeholder shown when no peak market cap has been computed
pub const DEFAULT_PEAK_MCAP: &str = "N/A";
/// Risk level reported for every alert (risk scoring is not computed here)
pub const DEFAULT_RISK_LEVEL: &str = "N/A";

/// Output fields owned by enrichment. Any upstream copies are stripped from
/// the passthrough fields so the serialized alert never carries a key twice.
const ENRICHED_KEYS: &[&str] = &[
    "market_cap",
    "peak_x",
    "ath_x",
    "peak_mcap",
    "ath_mcap",
    "risk_score",
    "risk_level",
    "top10_holders",
];

/// A single trading alert as published by the upstream backend.
///
/// The upstream object is kept verbatim in `fields` and serialized back
/// unchanged. The interpreted views below are derived from it leniently:
/// a value of the wrong shape only blanks the view, never the alert.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    /// Token contract address (base58); empty when absent or unusable
    pub contract: String,
    /// Confidence tier (1 = highest conviction) when it is a whole number in range
    pub tier: Option<u8>,
    /// Alert time, ISO-8601 (numeric epochs are converted)
    pub timestamp: Option<String>,
    /// Market cap at alert time, possibly pre-formatted ("$45.6K")
    pub entry_mcap: Option<String>,
    /// The upstream object, passed through unchanged
    pub fields: Map<String, Value>,
}

impl Alert {
    /// Create a bare alert (mostly useful for tests and the CLI)
    pub fn new(contract: impl Into<String>, tier: u8) -> Self {
        let mut fields = Map::new();
        fields.insert("contract".to_string(), Value::String(contract.into()));
        fields.insert("tier".to_string(), Value::from(tier));
        Self::from(fields)
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.fields
            .insert("timestamp".to_string(), Value::String(timestamp.into()));
        self.timestamp = self.fields.get("timestamp").and_then(timestamp_view);
        self
    }

    pub fn with_entry_mcap(mut self, entry_mcap: impl Into<String>) -> Self {
        self.fields
            .insert("entry_mcap".to_string(), Value::String(entry_mcap.into()));
        self.entry_mcap = self.fields.get("entry_mcap").and_then(string_view);
        self
    }

    /// Deduplication identity.
    ///
    /// Built from the raw JSON so distinct upstream values never collide;
    /// tiers that read as the same whole number (`1`, `1.0`, `"1"`) match.
    pub fn identity(&self) -> (String, String) {
        let contract = match self.fields.get("contract") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };
        let tier = match (self.tier, self.fields.get("tier")) {
            (Some(tier), _) => tier.to_string(),
            (None, Some(raw)) => format!("raw:{}", raw),
            (None, None) => String::new(),
        };
        (contract, tier)
    }
}

impl From<Map<String, Value>> for Alert {
    fn from(fields: Map<String, Value>) -> Self {
        Self {
            contract: fields
                .get("contract")
                .and_then(string_view)
                .map(|c| c.trim().to_string())
                .unwrap_or_default(),
            tier: fields.get("tier").and_then(tier_view),
            timestamp: fields.get("timestamp").and_then(timestamp_view),
            entry_mcap: fields.get("entry_mcap").and_then(string_view),
            fields,
        }
    }
}

impl Serialize for Alert {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Alert {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::deserialize(deserializer).map(Alert::from)
    }
}

/// Remove alerts sharing a (contract, tier) pair, keeping the first occurrence
/// and the relative order of everything kept.
pub fn dedupe_alerts(alerts: Vec<Alert>) -> Vec<Alert> {
    let mut seen: HashSet<(String, String)> = HashSet::with_capacity(alerts.len());
    alerts
        .into_iter()
        .filter(|alert| seen.insert(alert.identity()))
        .collect()
}

/// An alert plus the market fields added by enrichment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedAlert {
    #[serde(flatten)]
    pub alert: Alert,
    pub market_cap: String,
    pub peak_x: String,
    pub ath_x: String,
    pub peak_mcap: String,
    pub ath_mcap: String,
    pub risk_score: u32,
    pub risk_level: String,
    pub top10_holders: u32,
}

impl EnrichedAlert {
    /// Wrap an alert with placeholder values.
    ///
    /// A `market_cap` string already present upstream is kept as the starting
    /// value so a failed spot lookup leaves it in place.
    pub fn from_alert(mut alert: Alert) -> Self {
        let existing_market_cap = alert
            .fields
            .get("market_cap")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        for key in ENRICHED_KEYS {
            alert.fields.remove(*key);
        }

        Self {
            alert,
            market_cap: existing_market_cap.unwrap_or_else(|| DEFAULT_MARKET_CAP.to_string()),
            peak_x: DEFAULT_PEAK_X.to_string(),
            ath_x: DEFAULT_PEAK_X.to_string(),
            peak_mcap: DEFAULT_PEAK_MCAP.to_string(),
            ath_mcap: DEFAULT_PEAK_MCAP.to_string(),
            risk_score: 0,
            risk_level: DEFAULT_RISK_LEVEL.to_string(),
            top10_holders: 0,
        }
    }

    /// Set the peak fields and keep the `ath_*` aliases in step
    pub fn set_peak(&mut self, peak_x: String, peak_mcap: String) {
        self.ath_x = peak_x.clone();
        self.ath_mcap = peak_mcap.clone();
        self.peak_x = peak_x;
        self.peak_mcap = peak_mcap;
    }

    pub fn has_peak(&self) -> bool {
        self.peak_x != DEFAULT_PEAK_X
    }
}

fn tier_view(value: &Value) -> Option<u8> {
    let whole = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    if whole.fract() != 0.0 || !(0.0..=f64::from(u8::MAX)).contains(&whole) {
        return None;
    }
    Some(whole as u8)
}

fn string_view(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Epochs above this are taken as milliseconds
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

fn timestamp_view(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => {
            let raw = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            let parsed = if raw.abs() >= EPOCH_MILLIS_THRESHOLD {
                DateTime::<Utc>::from_timestamp_millis(raw)
            } else {
                DateTime::<Utc>::from_timestamp(raw, 0)
            };
            parsed.map(|t| t.to_rfc3339())
        }
        other => string_view(other).map(|s| s.trim().to_string()),
    }
}
