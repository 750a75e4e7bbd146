use analyzer_core::{Address, SourceError};
use async_trait::async_trait;
use config_manager::DexScreenerConfig;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};

use crate::types::{TokenPair, TokenPairsResponse};

#[derive(Error, Debug)]
pub enum DexScreenerError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("Rate limit exceeded")]
    RateLimitExceeded,
    #[error("DexScreener is disabled")]
    Disabled,
}

impl From<DexScreenerError> for SourceError {
    fn from(err: DexScreenerError) -> Self {
        match err {
            DexScreenerError::HttpError(e) => SourceError::Http(e.to_string()),
            DexScreenerError::JsonError(e) => SourceError::Json(e.to_string()),
            DexScreenerError::ApiError { status, message } => {
                SourceError::Status { status, message }
            }
            DexScreenerError::RateLimitExceeded => SourceError::Status {
                status: 429,
                message: "Rate limit exceeded".to_string(),
            },
            DexScreenerError::Disabled => {
                SourceError::NoData("DexScreener is disabled".to_string())
            }
        }
    }
}

/// Source of liquidity pairs for a token
#[async_trait]
pub trait PairFetcher: Send + Sync {
    async fn get_token_pairs(&self, token: &Address) -> Result<Vec<TokenPair>, DexScreenerError>;
}

/// DexScreener public API client
pub struct DexScreenerClient {
    client: Client,
    config: DexScreenerConfig,
}

impl DexScreenerClient {
    pub fn new(config: DexScreenerConfig) -> Result<Self, DexScreenerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn token_pairs_url(&self, token: &Address) -> String {
        format!(
            "{}/latest/dex/tokens/{}",
            self.config.api_base_url.trim_end_matches('/'),
            token
        )
    }
}

#[async_trait]
impl PairFetcher for DexScreenerClient {
    /// Every pair on every chain that references `token`
    async fn get_token_pairs(&self, token: &Address) -> Result<Vec<TokenPair>, DexScreenerError> {
        if !self.config.enabled {
            return Err(DexScreenerError::Disabled);
        }

        let url = self.token_pairs_url(token);
        debug!("🎯 DexScreener API call: token pairs for {}", token.short());

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(DexScreenerError::RateLimitExceeded);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!("❌ DexScreener API error for {}: HTTP {}", token.short(), status);
            return Err(DexScreenerError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let response_text = response.text().await?;
        let parsed: TokenPairsResponse = serde_json::from_str(&response_text).map_err(|e| {
            error!("Failed to parse DexScreener pairs response for {}", token.short());
            DexScreenerError::JsonError(e)
        })?;

        let pairs = parsed.pairs.unwrap_or_default();
        debug!("✅ DexScreener returned {} pairs for {}", pairs.len(), token.short());
        Ok(pairs)
    }
}
