//! Birdeye Price History Adapter
//!
//! Time-bounded price history by token contract via Birdeye's
//! `defi/history_price` endpoint. Requires an API key; without one the
//! history provider is simply not constructed and peak enrichment is off.

mod client;
mod types;

pub use client::{BirdeyeClient, BirdeyeConfig};
pub use types::{HistoryItem, HistoryPriceResponse};
