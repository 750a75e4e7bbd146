use serde::{Deserialize, Serialize};

/// Response of `GET /latest/dex/tokens/{address}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenPairsResponse {
    #[serde(rename = "schemaVersion", default)]
    pub schema_version: Option<String>,
    #[serde(default)]
    pub pairs: Option<Vec<TokenPair>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenPair {
    #[serde(rename = "chainId", default)]
    pub chain_id: String,
    #[serde(rename = "dexId", default)]
    pub dex_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(rename = "pairAddress", default)]
    pub pair_address: Option<String>,
    #[serde(rename = "baseToken", default)]
    pub base_token: PairToken,
    #[serde(rename = "quoteToken", default)]
    pub quote_token: PairToken,
    #[serde(rename = "priceNative", default)]
    pub price_native: Option<String>,
    #[serde(rename = "priceUsd", default)]
    pub price_usd: Option<String>,
    #[serde(default)]
    pub volume: Option<PeriodValues>,
    #[serde(rename = "priceChange", default)]
    pub price_change: Option<PeriodValues>,
    #[serde(default)]
    pub liquidity: Option<Liquidity>,
    #[serde(default)]
    pub fdv: Option<f64>,
    #[serde(rename = "marketCap", default)]
    pub market_cap: Option<f64>,
}

impl TokenPair {
    /// 24h volume, zero when absent
    pub fn volume_24h(&self) -> f64 {
        self.volume.as_ref().and_then(|v| v.h24).unwrap_or(0.0)
    }

    pub fn price_change_24h(&self) -> Option<f64> {
        self.price_change.as_ref().and_then(|p| p.h24).filter(|v| v.is_finite())
    }

    /// USD price of the base token; zero, negative or unparseable prices are dropped
    pub fn price_usd(&self) -> Option<f64> {
        self.price_usd
            .as_deref()
            .and_then(|p| p.trim().parse::<f64>().ok())
            .filter(|p| p.is_finite() && *p > 0.0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PairToken {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
}

/// Per-window figures (`m5`, `h1`, `h6`, `h24`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeriodValues {
    #[serde(default)]
    pub m5: Option<f64>,
    #[serde(default)]
    pub h1: Option<f64>,
    #[serde(default)]
    pub h6: Option<f64>,
    #[serde(default)]
    pub h24: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Liquidity {
    pub usd: Option<f64>,
    pub base: Option<f64>,
    pub quote: Option<f64>,
}
