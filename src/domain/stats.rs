//! Aggregate statistics payload returned when the upstream backend is down.

use chrono::Utc;
use serde::Serialize;

/// Zeroed stats in the public response shape
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineStats {
    pub total_subscribers: u64,
    pub total_alerts: u64,
    pub tier1_alerts: u64,
    pub tier2_alerts: u64,
    pub tier3_alerts: u64,
    pub win_rate: f64,
    pub last_updated: String,
    pub api_offline: bool,
}

impl OfflineStats {
    pub fn now() -> Self {
        Self {
            total_subscribers: 0,
            total_alerts: 0,
            tier1_alerts: 0,
            tier2_alerts: 0,
            tier3_alerts: 0,
            win_rate: 0.0,
            last_updated: Utc::now().to_rfc3339(),
            api_offline: true,
        }
    }
}
