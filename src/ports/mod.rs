//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement.
//! Following hexagonal architecture, these traits abstract:
//! - The upstream alerts/stats backend
//! - Spot market cap and historical price providers
//! - The durable peak cache

pub mod market_data;
#[cfg(any(test, feature = "test-util"))]
pub mod mocks;
pub mod peak_cache;
pub mod upstream;

pub use market_data::{HistoryQuery, MarketDataError, PriceHistoryPort, SpotPricePort};
pub use peak_cache::{CacheError, PeakCachePort};
pub use upstream::{AlertsQuery, UpstreamError, UpstreamPort};
