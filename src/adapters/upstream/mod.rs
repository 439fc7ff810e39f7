//! Upstream Alerts Backend Adapter
//!
//! Thin reqwest client over the alerts/stats backend:
//! - `GET {base}/api/health`
//! - `GET {base}/api/stats`
//! - `GET {base}/api/alerts/recent?limit=&tier=`
//! - `GET {base}/api/alerts/stats/daily?days=`
//!
//! Payloads are returned as raw JSON; any non-2xx status is an error so the
//! caller can degrade.

mod client;

pub use client::{UpstreamClient, UpstreamConfig};
