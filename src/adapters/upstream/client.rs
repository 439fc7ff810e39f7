//! Upstream Backend Client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::ports::{AlertsQuery, UpstreamError, UpstreamPort};

/// Upstream client configuration
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Backend base URL; trailing slashes are ignored
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl UpstreamConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP client for the alerts backend
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    base_url: String,
    http: Client,
}

impl UpstreamClient {
    pub fn with_config(config: UpstreamConfig) -> Result<Self, UpstreamError> {
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Base URL with trailing slashes stripped
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, UpstreamError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, ?query, "upstream request");

        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }

        response.json::<Value>().await.map_err(UpstreamError::from)
    }
}

#[async_trait]
impl UpstreamPort for UpstreamClient {
    async fn health(&self) -> Result<Value, UpstreamError> {
        self.get_json("/api/health", &[]).await
    }

    async fn stats(&self) -> Result<Value, UpstreamError> {
        self.get_json("/api/stats", &[]).await
    }

    async fn recent_alerts(&self, query: AlertsQuery) -> Result<Value, UpstreamError> {
        let mut params = vec![("limit", query.limit.to_string())];
        if let Some(tier) = query.tier {
            params.push(("tier", tier.to_string()));
        }
        self.get_json("/api/alerts/recent", &params).await
    }

    async fn daily_stats(&self, days: u32) -> Result<Value, UpstreamError> {
        self.get_json("/api/alerts/stats/daily", &[("days", days.to_string())]).await
    }
}
