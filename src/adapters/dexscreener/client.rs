//! DexScreener Client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use super::types::TokensResponse;
use crate::ports::{MarketDataError, SpotPricePort};

const DEXSCREENER_TOKENS_API: &str = "https://api.dexscreener.com/latest/dex/tokens";

/// DexScreener client configuration
#[derive(Debug, Clone)]
pub struct DexScreenerConfig {
    /// Token endpoint; the contract is appended as a path segment
    pub api_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for DexScreenerConfig {
    fn default() -> Self {
        Self {
            api_url: DEXSCREENER_TOKENS_API.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Spot market cap provider backed by DexScreener
#[derive(Debug, Clone)]
pub struct DexScreenerClient {
    config: DexScreenerConfig,
    http: Client,
}

impl DexScreenerClient {
    pub fn new() -> Result<Self, MarketDataError> {
        Self::with_config(DexScreenerConfig::default())
    }

    pub fn with_config(config: DexScreenerConfig) -> Result<Self, MarketDataError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    /// Fetch every pair DexScreener knows for a token
    pub async fn get_token_pairs(&self, contract: &str) -> Result<TokensResponse, MarketDataError> {
        let url = format!("{}/{}", self.config.api_url.trim_end_matches('/'), contract);
        let response = self.http.get(&url).send().await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MarketDataError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl SpotPricePort for DexScreenerClient {
    async fn market_cap(&self, contract: &str) -> Result<f64, MarketDataError> {
        self.get_token_pairs(contract)
            .await?
            .market_cap()
            .ok_or_else(|| MarketDataError::NoData(contract.to_string()))
    }
}
