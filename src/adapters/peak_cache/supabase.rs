//! Supabase (PostgREST) peak cache
//!
//! Table layout, one row per contract:
//!
//! ```sql
//! create table peak_cache (
//!     contract        text primary key,
//!     entry_mcap      double precision not null,
//!     peak_mcap       double precision not null,
//!     peak_x          text not null,
//!     alert_timestamp text not null,
//!     last_updated    timestamptz not null
//! );
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};

use crate::domain::PeakCacheEntry;
use crate::ports::{CacheError, PeakCachePort};

/// Supabase connection settings
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub url: String,
    /// Service role key (sent as `apikey` and bearer token)
    pub service_key: String,
    /// Table name
    pub table: String,
    /// Request timeout
    pub timeout: Duration,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            service_key: service_key.into(),
            table: "peak_cache".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }
}

/// Durable peak cache over the Supabase REST API
#[derive(Debug, Clone)]
pub struct SupabasePeakCache {
    config: SupabaseConfig,
    http: Client,
}

impl SupabasePeakCache {
    pub fn with_config(config: SupabaseConfig) -> Result<Self, CacheError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.config.url.trim_end_matches('/'),
            self.config.table
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.service_key)
            .bearer_auth(&self.config.service_key)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, CacheError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(CacheError::StoreError {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl PeakCachePort for SupabasePeakCache {
    async fn get(&self, contract: &str) -> Result<Option<PeakCacheEntry>, CacheError> {
        let request = self
            .http
            .get(self.table_url())
            .query(&[
                ("contract", format!("eq.{}", contract)),
                ("select", "*".to_string()),
                ("limit", "1".to_string()),
            ]);

        let response = Self::check_status(self.authorize(request).send().await?).await?;
        let mut rows: Vec<PeakCacheEntry> = response.json().await?;

        Ok(rows.pop())
    }

    async fn upsert(&self, entry: &PeakCacheEntry) -> Result<(), CacheError> {
        let request = self
            .http
            .post(self.table_url())
            .query(&[("on_conflict", "contract")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[entry]);

        Self::check_status(self.authorize(request).send().await?).await?;
        Ok(())
    }
}
