use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::PricePoint;

/// Market data error type
#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Provider returned status {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("No market data for contract: {0}")]
    NoData(String),

    #[error("Data parsing error: {0}")]
    ParseError(String),
}

impl From<reqwest::Error> for MarketDataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            MarketDataError::Timeout
        } else if err.is_decode() {
            MarketDataError::ParseError(err.to_string())
        } else {
            MarketDataError::HttpError(err.to_string())
        }
    }
}

/// Historical price query parameters
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryQuery {
    pub contract: String,
    pub time_from: DateTime<Utc>,
    pub time_to: DateTime<Utc>,
    /// Bucket granularity, e.g. "15m"
    pub interval: String,
}

/// Current market capitalization lookup
#[async_trait]
pub trait SpotPricePort: Send + Sync {
    /// Current market cap in USD for a token contract
    async fn market_cap(&self, contract: &str) -> Result<f64, MarketDataError>;
}

/// Time-bounded price history lookup
#[async_trait]
pub trait PriceHistoryPort: Send + Sync {
    /// Price samples between `time_from` and `time_to`, oldest first.
    /// An empty vec means the provider had no samples for the window.
    async fn price_history(&self, query: &HistoryQuery) -> Result<Vec<PricePoint>, MarketDataError>;
}
