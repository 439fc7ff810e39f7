//! Birdeye Client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use super::types::HistoryPriceResponse;
use crate::domain::PricePoint;
use crate::ports::{HistoryQuery, MarketDataError, PriceHistoryPort};

const BIRDEYE_HISTORY_API: &str = "https://public-api.birdeye.so/defi/history_price";

/// Birdeye client configuration
#[derive(Debug, Clone)]
pub struct BirdeyeConfig {
    /// History endpoint URL
    pub api_url: String,
    /// API key sent as `X-API-KEY`
    pub api_key: String,
    /// Chain header value
    pub chain: String,
    /// Request timeout
    pub timeout: Duration,
}

impl BirdeyeConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_url: BIRDEYE_HISTORY_API.to_string(),
            api_key: api_key.into(),
            chain: "solana".to_string(),
            timeout: Duration::from_secs(15),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Historical price provider backed by Birdeye
#[derive(Debug, Clone)]
pub struct BirdeyeClient {
    config: BirdeyeConfig,
    http: Client,
}

impl BirdeyeClient {
    pub fn with_config(config: BirdeyeConfig) -> Result<Self, MarketDataError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    /// Query parameters for a history request
    fn query_params(query: &HistoryQuery) -> Vec<(&'static str, String)> {
        vec![
            ("address", query.contract.clone()),
            ("address_type", "token".to_string()),
            ("type", query.interval.clone()),
            ("time_from", query.time_from.timestamp().to_string()),
            ("time_to", query.time_to.timestamp().to_string()),
        ]
    }
}

#[async_trait]
impl PriceHistoryPort for BirdeyeClient {
    async fn price_history(&self, query: &HistoryQuery) -> Result<Vec<PricePoint>, MarketDataError> {
        let response = self
            .http
            .get(&self.config.api_url)
            .query(&Self::query_params(query))
            .header("X-API-KEY", &self.config.api_key)
            .header("x-chain", &self.config.chain)
            .header("accept", "application/json")
            .send()
            .await?;

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

        let body: HistoryPriceResponse = response.json().await?;
        if !body.success {
            return Err(MarketDataError::ApiError {
                status: status.as_u16(),
                message: body.message.unwrap_or_else(|| "success=false".to_string()),
            });
        }

        Ok(body.into_points())
    }
}
