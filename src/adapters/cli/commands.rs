//! CLI Command Handlers
//!
//! Implementation of all CLI commands for the solboy-api proxy.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::birdeye::{BirdeyeClient, BirdeyeConfig};
use crate::adapters::dexscreener::{DexScreenerClient, DexScreenerConfig};
use crate::adapters::http::run_server;
use crate::adapters::peak_cache::{InMemoryPeakCache, SupabaseConfig, SupabasePeakCache};
use crate::adapters::upstream::{UpstreamClient, UpstreamConfig};
use crate::application::{EnrichmentConfig, EnrichmentEngine, ProxyService};
use crate::config::{load_or_default, CacheBackend, Config};
use crate::ports::{PeakCachePort, PriceHistoryPort};

/// solboy-api - alert enrichment proxy for the Solboy dashboard
#[derive(Parser, Debug)]
#[command(
    name = "solboy-api",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Alert enrichment proxy for the Solboy dashboard",
    long_about = "solboy-api forwards dashboard requests to the alerts backend and decorates \
                  alerts with live market caps and post-alert peak multiples."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (missing file means defaults plus environment)
    #[arg(short, long, value_name = "FILE", default_value = "config/solboy.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP proxy
    Serve(ServeCmd),

    /// Enrich a single token and print the result as JSON
    Enrich(EnrichCmd),

    /// Load and validate the configuration
    CheckConfig,
}

/// Start the HTTP proxy
#[derive(Parser, Debug)]
pub struct ServeCmd {
    /// Override bind address
    #[arg(long, value_name = "ADDR")]
    pub host: Option<IpAddr>,

    /// Override listen port
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,
}

/// One-shot single-token enrichment
#[derive(Parser, Debug)]
pub struct EnrichCmd {
    /// Token mint address
    #[arg(value_name = "CONTRACT")]
    pub contract: String,

    /// Alert time (ISO-8601); required for a peak multiple
    #[arg(long, value_name = "TIME")]
    pub timestamp: Option<String>,

    /// Market cap at alert time, e.g. 45000 or "$45.6K"
    #[arg(long, value_name = "MCAP")]
    pub entry_mcap: Option<String>,
}

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    let config = load_or_default(&app.config)
        .with_context(|| format!("Failed to load configuration from {}", app.config.display()))?;

    init_logging(app.verbose, app.debug, &config.logging.level)?;

    match app.command {
        Command::Serve(cmd) => serve_command(cmd, &config).await,
        Command::Enrich(cmd) => enrich_command(cmd, &config).await,
        Command::CheckConfig => check_config_command(&app.config, &config),
    }
}

/// Initialize logging system
fn init_logging(verbose: bool, debug: bool, config_level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config_level))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Wire adapters into the proxy service
pub fn build_service(config: &Config) -> Result<ProxyService> {
    let upstream = UpstreamClient::with_config(
        UpstreamConfig::new(config.upstream.get_base_url()).with_timeout(config.upstream.timeout()),
    )
    .context("Failed to create upstream client")?;

    let spot = DexScreenerClient::with_config(DexScreenerConfig {
        api_url: config.spot_price.api_url.clone(),
        timeout: Duration::from_secs(config.spot_price.timeout_secs),
    })
    .context("Failed to create spot price client")?;

    let history: Option<Arc<dyn PriceHistoryPort>> = match config.price_history.get_api_key() {
        Some(key) => {
            let client = BirdeyeClient::with_config(
                BirdeyeConfig::new(key)
                    .with_api_url(config.price_history.api_url.clone())
                    .with_timeout(Duration::from_secs(config.price_history.timeout_secs)),
            )
            .context("Failed to create price history client")?;
            Some(Arc::new(client))
        }
        None => {
            tracing::info!("no BIRDEYE_API_KEY configured, peak enrichment disabled");
            None
        }
    };

    let cache = build_cache(config)?;

    let engine = EnrichmentEngine::new(
        Arc::new(spot),
        history,
        cache,
        EnrichmentConfig {
            max_peak_lookups: config.enrichment.max_peak_lookups,
            history_call_delay: Duration::from_millis(config.enrichment.history_call_delay_ms),
            history_interval: config.price_history.interval.clone(),
        },
    );

    Ok(ProxyService::new(Arc::new(upstream), engine))
}

fn build_cache(config: &Config) -> Result<Arc<dyn PeakCachePort>> {
    let section = &config.peak_cache;
    match section.backend {
        CacheBackend::Memory => Ok(Arc::new(InMemoryPeakCache::with_config(
            section.ttl(),
            section.max_entries,
        ))),
        CacheBackend::Supabase => {
            let url = section.get_url().context("SUPABASE_URL is not set")?;
            let key = section
                .get_service_key()
                .context("SUPABASE_SERVICE_KEY is not set")?;
            let mut supabase = SupabaseConfig::new(url, key).with_table(section.table.clone());
            supabase.timeout = Duration::from_secs(section.timeout_secs);
            let cache =
                SupabasePeakCache::with_config(supabase).context("Failed to create Supabase peak cache")?;
            Ok(Arc::new(cache))
        }
    }
}

/// Handle serve command
async fn serve_command(cmd: ServeCmd, config: &Config) -> Result<()> {
    let host: IpAddr = match cmd.host {
        Some(host) => host,
        None => config
            .server
            .host
            .parse()
            .with_context(|| format!("Invalid server host '{}'", config.server.host))?,
    };
    let port = cmd.port.unwrap_or_else(|| config.server.get_port());
    let addr = SocketAddr::new(host, port);

    let service = Arc::new(build_service(config)?);
    tracing::info!(
        upstream = %config.upstream.get_base_url(),
        peaks = service.engine().history_enabled(),
        cache = ?config.peak_cache.backend,
        "Starting solboy-api"
    );

    run_server(service, addr, async {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutdown signal received");
    })
    .await
}

/// Handle enrich command
async fn enrich_command(cmd: EnrichCmd, config: &Config) -> Result<()> {
    let service = build_service(config)?;

    let result = service
        .engine()
        .enrich_token(&cmd.contract, cmd.timestamp.as_deref(), cmd.entry_mcap.as_deref())
        .await;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Handle check-config command
fn check_config_command(path: &std::path::Path, config: &Config) -> Result<()> {
    println!("✓ Configuration valid ({})", path.display());
    println!("  Upstream: {}", config.upstream.get_base_url());
    println!("  Spot price: {}", config.spot_price.api_url);
    println!(
        "  Peak enrichment: {}",
        if config.price_history.get_api_key().is_some() {
            "enabled"
        } else {
            "disabled (no BIRDEYE_API_KEY)"
        }
    );
    println!("  Peak cache: {:?}", config.peak_cache.backend);
    println!(
        "  Listen: {}:{}",
        config.server.host,
        config.server.get_port()
    );
    Ok(())
}
