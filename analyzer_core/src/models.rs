use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::format::{calculate_usd_value, format_token_balance};
use crate::{Address, Network, SourceError};

/// Decimals assumed when a source does not report them
pub const DEFAULT_DECIMALS: u8 = 18;

/// Where a token's symbol/name/decimals came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetadataSource {
    Curated,
    PriceAggregator,
    OnChain,
    Fallback,
}

impl MetadataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataSource::Curated => "curated",
            MetadataSource::PriceAggregator => "price-aggregator",
            MetadataSource::OnChain => "on-chain",
            MetadataSource::Fallback => "fallback",
        }
    }
}

/// Price and naming data derived from a token's most liquid pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub address: Address,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub price_usd: Option<f64>,
    pub price_change_24h: Option<f64>,
    pub volume_24h: Option<f64>,
    pub dex_id: Option<String>,
    pub pair_address: Option<String>,
    pub network: Network,
    pub fetched_at: DateTime<Utc>,
}

impl PriceQuote {
    pub const SOURCE: &'static str = "price-aggregator";
}

/// Resolved token description, with pricing merged in when requested
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetadata {
    pub address: Address,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub decimals: u8,
    pub price_usd: Option<f64>,
    pub price_change_24h: Option<f64>,
    pub volume_24h: Option<f64>,
    pub dex_id: Option<String>,
    pub pair_address: Option<String>,
    pub price_source: Option<String>,
    pub price_error: Option<String>,
    pub source: MetadataSource,
    pub network: Network,
    pub network_name: String,
    /// Diagnostic from the tiers that failed, set on synthetic records
    pub error: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

impl TokenMetadata {
    pub const PRICE_UNAVAILABLE: &'static str = "Price data unavailable";

    pub fn apply_price(&mut self, quote: &PriceQuote) {
        self.price_usd = quote.price_usd;
        self.price_change_24h = quote.price_change_24h;
        self.volume_24h = quote.volume_24h;
        self.dex_id = quote.dex_id.clone();
        self.pair_address = quote.pair_address.clone();
        self.price_source = Some(PriceQuote::SOURCE.to_string());
        self.price_error = None;
    }

    pub fn mark_price_unavailable(&mut self) {
        self.price_usd = None;
        self.price_change_24h = None;
        self.price_source = None;
        self.price_error = Some(Self::PRICE_UNAVAILABLE.to_string());
    }
}

/// One wallet's balance of one token. Never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResult {
    pub raw_balance: String,
    pub formatted_balance: String,
    pub has_balance: bool,
    pub decimals: u8,
}

impl BalanceResult {
    /// Parse the explorer's raw integer string; anything that is not a base-10
    /// unsigned integer is rejected.
    pub fn parse(raw_balance: &str, decimals: u8) -> Result<Self, SourceError> {
        let raw = raw_balance.trim();
        let value = BigUint::from_str(raw)
            .map_err(|_| SourceError::Decode(format!("malformed balance '{}'", raw)))?;

        Ok(Self {
            raw_balance: raw.to_string(),
            formatted_balance: format_token_balance(raw, decimals),
            has_balance: value > BigUint::from(0u8),
            decimals,
        })
    }

    /// Re-render the same raw balance with the token's real decimals
    pub fn rescaled(&self, decimals: u8) -> Self {
        Self {
            raw_balance: self.raw_balance.clone(),
            formatted_balance: format_token_balance(&self.raw_balance, decimals),
            has_balance: self.has_balance,
            decimals,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenHolding {
    pub token_address: Address,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub balance: String,
    pub decimals: u8,
    pub price_usd: Option<f64>,
    pub price_change_24h: Option<f64>,
    pub usd_value: Option<f64>,
}

impl TokenHolding {
    /// Combine a positive balance with the token's metadata.
    ///
    /// `balance` must already be scaled with `metadata.decimals`.
    pub fn new(metadata: &TokenMetadata, balance: &BalanceResult) -> Self {
        let usd_value = metadata
            .price_usd
            .map(|price| calculate_usd_value(&balance.formatted_balance, price));

        Self {
            token_address: metadata.address.clone(),
            symbol: metadata.symbol.clone(),
            name: metadata.name.clone(),
            balance: balance.formatted_balance.clone(),
            decimals: metadata.decimals,
            price_usd: metadata.price_usd,
            price_change_24h: metadata.price_change_24h,
            usd_value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WalletCategory {
    AllTokens,
    SomeTokens,
    NoTokens,
}

impl WalletCategory {
    pub fn classify(found_tokens: usize, requested_tokens: usize) -> Self {
        if found_tokens == 0 {
            WalletCategory::NoTokens
        } else if found_tokens == requested_tokens {
            WalletCategory::AllTokens
        } else {
            WalletCategory::SomeTokens
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletOutcome {
    pub wallet_address: Address,
    pub found_tokens: Vec<TokenHolding>,
    pub total_usd_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WalletOutcome {
    pub fn new(wallet_address: Address, found_tokens: Vec<TokenHolding>) -> Self {
        let total_usd_value = found_tokens.iter().filter_map(|t| t.usd_value).sum();
        Self {
            wallet_address,
            found_tokens,
            total_usd_value,
            error: None,
        }
    }

    /// A wallet whose scan raised; whatever was found before the error is dropped
    pub fn failed(wallet_address: Address, error: impl Into<String>) -> Self {
        Self {
            wallet_address,
            found_tokens: Vec::new(),
            total_usd_value: 0.0,
            error: Some(error.into()),
        }
    }

    pub fn category(&self, requested_tokens: usize) -> WalletCategory {
        WalletCategory::classify(self.found_tokens.len(), requested_tokens)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisCounts {
    pub all_tokens: usize,
    pub some_tokens: usize,
    pub no_tokens: usize,
}

/// Every scanned wallet lands in exactly one of the three lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub network: Network,
    pub wallet_count: usize,
    pub token_count: usize,
    pub all_tokens: Vec<WalletOutcome>,
    pub some_tokens: Vec<WalletOutcome>,
    pub no_tokens: Vec<WalletOutcome>,
    pub counts: AnalysisCounts,
    pub completed_at: DateTime<Utc>,
}

impl AnalysisReport {
    pub fn new(network: Network, wallet_count: usize, token_count: usize) -> Self {
        Self {
            network,
            wallet_count,
            token_count,
            all_tokens: Vec::new(),
            some_tokens: Vec::new(),
            no_tokens: Vec::new(),
            counts: AnalysisCounts::default(),
            completed_at: Utc::now(),
        }
    }

    /// File an outcome under its category; failed wallets always go to no-tokens
    pub fn record(&mut self, outcome: WalletOutcome) -> WalletCategory {
        let category = if outcome.error.is_some() {
            WalletCategory::NoTokens
        } else {
            outcome.category(self.token_count)
        };

        match category {
            WalletCategory::AllTokens => {
                self.all_tokens.push(outcome);
                self.counts.all_tokens += 1;
            }
            WalletCategory::SomeTokens => {
                self.some_tokens.push(outcome);
                self.counts.some_tokens += 1;
            }
            WalletCategory::NoTokens => {
                self.no_tokens.push(outcome);
                self.counts.no_tokens += 1;
            }
        }

        category
    }

    pub fn finish(mut self) -> Self {
        self.completed_at = Utc::now();
        self
    }
}
