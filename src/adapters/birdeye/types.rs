//! Birdeye response types

use serde::Deserialize;

use crate::domain::PricePoint;

/// `defi/history_price` response
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryPriceResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<HistoryData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryData {
    #[serde(default)]
    pub items: Vec<HistoryItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryItem {
    #[serde(rename = "unixTime")]
    pub unix_time: i64,
    pub value: f64,
}

impl HistoryPriceResponse {
    /// Samples in provider order (oldest first)
    pub fn into_points(self) -> Vec<PricePoint> {
        self.data
            .map(|d| d.items)
            .unwrap_or_default()
            .into_iter()
            .map(|item| PricePoint::new(item.unix_time, item.value))
            .collect()
    }
}
