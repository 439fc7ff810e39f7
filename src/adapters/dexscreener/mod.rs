//! DexScreener Spot Price Adapter
//!
//! Looks up current market capitalization by token contract using the
//! DexScreener token endpoint (`/latest/dex/tokens/{address}`). The response
//! lists every trading pair of the token; the first pair reporting a market
//! cap is used, with the first pair's FDV as fallback.

mod client;
mod types;

pub use client::{DexScreenerClient, DexScreenerConfig};
pub use types::{TokenPair, TokensResponse};
