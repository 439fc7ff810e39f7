//! solboy-api - Alert Enrichment Proxy
//!
//! HTTP entry point for the Solboy dashboard.

use anyhow::Result;
use clap::Parser;

use solboy_api::adapters::cli::{execute, CliApp};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (secrets go here, not in solboy.toml)
    dotenvy::dotenv().ok();

    let app = CliApp::parse();
    execute(app).await
}
