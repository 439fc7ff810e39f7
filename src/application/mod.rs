//! Application Layer
//!
//! Use cases: alert enrichment and the request proxy built on top of it.

pub mod enrichment;
pub mod proxy;

pub use enrichment::{parse_timestamp, EnrichmentConfig, EnrichmentEngine, TokenEnrichment};
pub use proxy::{ApiResponse, Endpoint, ProxyError, ProxyService};
