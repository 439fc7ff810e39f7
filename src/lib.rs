//! solboy-api - Alert Enrichment Proxy Library
//!
//! Forwards dashboard requests to the alerts backend and decorates alerts with
//! live market caps and post-alert peak multiples.
//!
//! # Modules
//!
//! - `domain`: Core types and pure logic (Alert, dedupe, peak multiples, formatting)
//! - `ports`: Trait abstractions (UpstreamPort, SpotPricePort, PriceHistoryPort, PeakCachePort)
//! - `adapters`: External implementations (backend, DexScreener, Birdeye, caches, HTTP, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Enrichment engine and request proxy

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod config;
pub mod application;
