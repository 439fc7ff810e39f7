//! DexScreener response types

use serde::Deserialize;

/// `/latest/dex/tokens/{address}` response
#[derive(Debug, Clone, Deserialize)]
pub struct TokensResponse {
    #[serde(rename = "schemaVersion", default)]
    pub schema_version: Option<String>,
    /// `null` when the token has no pairs
    #[serde(default)]
    pub pairs: Option<Vec<TokenPair>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    #[serde(rename = "chainId", default)]
    pub chain_id: Option<String>,
    #[serde(rename = "dexId", default)]
    pub dex_id: Option<String>,
    #[serde(rename = "pairAddress", default)]
    pub pair_address: Option<String>,
    #[serde(rename = "priceUsd", default)]
    pub price_usd: Option<String>,
    #[serde(default)]
    pub fdv: Option<f64>,
    #[serde(rename = "marketCap", default)]
    pub market_cap: Option<f64>,
}

impl TokensResponse {
    /// Market cap of the first pair reporting one, else the first pair's FDV
    pub fn market_cap(&self) -> Option<f64> {
        let pairs = self.pairs.as_deref().unwrap_or_default();

        pairs
            .iter()
            .find_map(|p| p.market_cap.filter(|m| m.is_finite() && *m > 0.0))
            .or_else(|| pairs.first().and_then(|p| p.fdv).filter(|f| f.is_finite() && *f > 0.0))
    }
}
