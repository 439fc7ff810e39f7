//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching config/solboy.toml.
//! Every section is optional; secrets usually arrive through the environment.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Main configuration structure matching config/solboy.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerSection,
    pub upstream: UpstreamSection,
    pub spot_price: SpotPriceSection,
    pub price_history: PriceHistorySection,
    pub enrichment: EnrichmentSection,
    pub peak_cache: PeakCacheSection,
    pub logging: LoggingSection,
}

/// HTTP listener section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Bind address
    pub host: String,
    /// Listen port
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ServerSection {
    /// Get port with environment variable override
    /// Checks PORT env var first, falls back to config value
    pub fn get_port(&self) -> u16 {
        std::env::var("PORT")
            .ok()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(self.port)
    }
}

/// Alerts backend section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamSection {
    /// Backend base URL
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for UpstreamSection {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 10,
        }
    }
}

impl UpstreamSection {
    /// Get base URL with environment variable override
    /// Checks UPSTREAM_API_URL env var first, falls back to config value
    pub fn get_base_url(&self) -> String {
        non_empty_env("UPSTREAM_API_URL").unwrap_or_else(|| self.base_url.clone())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Spot market-cap provider section (DexScreener)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpotPriceSection {
    /// Token pairs endpoint; the contract is appended as a path segment
    pub api_url: String,
    pub timeout_secs: u64,
}

impl Default for SpotPriceSection {
    fn default() -> Self {
        Self {
            api_url: "https://api.dexscreener.com/latest/dex/tokens".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Historical price provider section (Birdeye)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PriceHistorySection {
    /// History endpoint
    pub api_url: String,
    /// API key; peak enrichment is disabled without one
    pub api_key: Option<String>,
    /// Sample bucket size
    pub interval: String,
    pub timeout_secs: u64,
}

impl Default for PriceHistorySection {
    fn default() -> Self {
        Self {
            api_url: "https://public-api.birdeye.so/defi/history_price".to_string(),
            api_key: None,
            interval: "15m".to_string(),
            timeout_secs: 15,
        }
    }
}

impl PriceHistorySection {
    /// Get API key with environment variable fallback
    /// Checks BIRDEYE_API_KEY env var if config value is empty/None
    pub fn get_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }
        non_empty_env("BIRDEYE_API_KEY")
    }
}

/// Enrichment pacing section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnrichmentSection {
    /// Peak lookups attempted per alerts request
    pub max_peak_lookups: usize,
    /// Pause after each uncached history call
    pub history_call_delay_ms: u64,
}

impl Default for EnrichmentSection {
    fn default() -> Self {
        Self {
            max_peak_lookups: 4,
            history_call_delay_ms: 500,
        }
    }
}

/// Peak cache backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Memory,
    Supabase,
}

/// Peak cache section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PeakCacheSection {
    pub backend: CacheBackend,
    /// Supabase project URL
    pub url: Option<String>,
    /// Supabase service role key
    pub service_key: Option<String>,
    pub table: String,
    /// Memory backend TTL; 0 keeps entries forever
    pub ttl_secs: u64,
    /// Memory backend capacity
    pub max_entries: usize,
    pub timeout_secs: u64,
}

impl Default for PeakCacheSection {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            url: None,
            service_key: None,
            table: "peak_cache".to_string(),
            ttl_secs: 0,
            max_entries: 10_000,
            timeout_secs: 5,
        }
    }
}

impl PeakCacheSection {
    /// Get Supabase URL with environment variable fallback (SUPABASE_URL)
    pub fn get_url(&self) -> Option<String> {
        self.url
            .clone()
            .filter(|u| !u.is_empty())
            .or_else(|| non_empty_env("SUPABASE_URL"))
    }

    /// Get service key with environment variable fallback (SUPABASE_SERVICE_KEY)
    pub fn get_service_key(&self) -> Option<String> {
        self.service_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| non_empty_env("SUPABASE_SERVICE_KEY"))
    }

    pub fn ttl(&self) -> Option<Duration> {
        (self.ttl_secs > 0).then(|| Duration::from_secs(self.ttl_secs))
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let expanded = shellexpand::tilde(&path.as_ref().to_string_lossy()).to_string();
    let content = std::fs::read_to_string(expanded)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Load the file if it exists, otherwise run on defaults and the environment
pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let expanded = shellexpand::tilde(&path.as_ref().to_string_lossy()).to_string();
    if Path::new(&expanded).exists() {
        return load_config(expanded);
    }
    tracing::info!(path = %expanded, "config file not found, using defaults");
    let config = Config::default();
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters (after environment overrides)
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upstream.get_base_url().trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "upstream base_url cannot be empty".to_string(),
            ));
        }

        if self.spot_price.api_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "spot_price api_url cannot be empty".to_string(),
            ));
        }

        if self.price_history.api_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "price_history api_url cannot be empty".to_string(),
            ));
        }

        if self.price_history.interval.is_empty() {
            return Err(ConfigError::ValidationError(
                "price_history interval cannot be empty".to_string(),
            ));
        }

        if self.enrichment.max_peak_lookups == 0 {
            return Err(ConfigError::ValidationError(format!(
                "max_peak_lookups must be > 0, got {}",
                self.enrichment.max_peak_lookups
            )));
        }

        if self.peak_cache.max_entries == 0 {
            return Err(ConfigError::ValidationError(format!(
                "peak_cache max_entries must be > 0, got {}",
                self.peak_cache.max_entries
            )));
        }

        if self.peak_cache.backend == CacheBackend::Supabase
            && (self.peak_cache.get_url().is_none() || self.peak_cache.get_service_key().is_none())
        {
            return Err(ConfigError::ValidationError(
                "supabase peak cache requires url and service_key (or SUPABASE_URL / SUPABASE_SERVICE_KEY)"
                    .to_string(),
            ));
        }

        Ok(())
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
