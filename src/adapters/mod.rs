//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - Upstream: alerts backend client
//! - DexScreener: spot market caps
//! - Birdeye: historical prices
//! - Peak cache: in-memory and Supabase stores
//! - HTTP: axum router serving the proxy
//! - CLI: Command-line interface handlers

pub mod birdeye;
pub mod cli;
pub mod dexscreener;
pub mod http;
pub mod peak_cache;
pub mod upstream;

pub use birdeye::BirdeyeClient;
pub use cli::CliApp;
pub use dexscreener::DexScreenerClient;
pub use peak_cache::{InMemoryPeakCache, SupabasePeakCache};
pub use upstream::UpstreamClient;
