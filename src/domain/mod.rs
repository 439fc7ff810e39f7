//! Domain Layer - Core types and pure logic for alert enrichment
//!
//! Nothing in here performs I/O. All external interactions happen through
//! the ports layer.
//!
//! - `alert`: upstream alerts, deduplication, enriched output shape
//! - `market`: market cap / multiplier formatting, contract validation
//! - `peak`: peak multiple from a price series, cache record
//! - `stats`: degraded statistics payload

pub mod alert;
pub mod market;
pub mod peak;
pub mod stats;

pub use alert::{
    dedupe_alerts, Alert, EnrichedAlert, DEFAULT_MARKET_CAP, DEFAULT_PEAK_MCAP, DEFAULT_PEAK_X,
};
pub use market::{format_market_cap, format_multiplier, is_valid_contract, parse_market_cap};
pub use peak::{compute_peak_multiple, PeakCacheEntry, PeakMultiple, PricePoint};
pub use stats::OfflineStats;
