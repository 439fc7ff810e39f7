//! Configuration Module
//!
//! Loads and validates configuration from TOML files.

pub mod loader;

pub use loader::{
    load_config, load_or_default, CacheBackend, Config, ConfigError, EnrichmentSection,
    LoggingSection, PeakCacheSection, PriceHistorySection, ServerSection, SpotPriceSection,
    UpstreamSection,
};
