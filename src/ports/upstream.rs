use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Upstream backend error type
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Upstream returned status {0}")]
    Status(u16),

    #[error("Upstream unreachable: {0}")]
    Network(String),

    #[error("Upstream request timed out")]
    Timeout,

    #[error("Upstream response malformed: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout
        } else if err.is_decode() {
            UpstreamError::Malformed(err.to_string())
        } else {
            UpstreamError::Network(err.to_string())
        }
    }
}

/// Recent-alerts query forwarded to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertsQuery {
    pub limit: u32,
    pub tier: Option<u8>,
}

/// The alerts/stats backend. Payloads are opaque JSON.
#[async_trait]
pub trait UpstreamPort: Send + Sync {
    async fn health(&self) -> Result<Value, UpstreamError>;

    async fn stats(&self) -> Result<Value, UpstreamError>;

    async fn recent_alerts(&self, query: AlertsQuery) -> Result<Value, UpstreamError>;

    async fn daily_stats(&self, days: u32) -> Result<Value, UpstreamError>;
}
