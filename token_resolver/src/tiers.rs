//! The ordered metadata sources. Each tier either answers for a token or
//! explains why it could not; the resolver walks them until one answers.

use analyzer_core::abi::{
    decode_abi_string, decode_uint8, DECIMALS_SELECTOR, NAME_SELECTOR, SYMBOL_SELECTOR,
};
use analyzer_core::models::DEFAULT_DECIMALS;
use analyzer_core::{
    Address, ContractReader, MetadataSource, Network, PriceProvider, PriceQuote, SourceError,
};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::curated;

/// What a tier learned about a token
#[derive(Debug, Clone, PartialEq)]
pub struct TierHit {
    pub source: MetadataSource,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub decimals: u8,
    /// Pricing that came along with the metadata, if any
    pub quote: Option<PriceQuote>,
}

#[async_trait]
pub trait MetadataTier: Send + Sync {
    /// Name used in the combined failure message
    fn label(&self) -> &'static str;

    async fn resolve(&self, token: &Address, network: Network) -> Result<TierHit, SourceError>;
}

/// `UNKNOWN_1A2B3C`
pub fn fallback_symbol(token: &Address) -> String {
    format!("UNKNOWN_{}", token.hex_digits()[..6].to_uppercase())
}

/// `Unknown Token (0x1a2b3c4d...9f8e)`
pub fn fallback_name(token: &Address) -> String {
    format!("Unknown Token ({})", token.short())
}

/// Stand-in symbol when the contract only answered `name()`
pub fn partial_symbol(token: &Address) -> String {
    format!("TOKEN_{}", token.hex_digits()[..6].to_uppercase())
}

/// Stand-in name when the contract only answered `symbol()`
pub fn partial_name(token: &Address) -> String {
    format!("Token: {}", token.short())
}

pub struct CuratedTier;

#[async_trait]
impl MetadataTier for CuratedTier {
    fn label(&self) -> &'static str {
        "Curated"
    }

    async fn resolve(&self, token: &Address, network: Network) -> Result<TierHit, SourceError> {
        let entry = curated::lookup(network, token)
            .ok_or_else(|| SourceError::NoData(format!("not in the {} token table", network)))?;

        Ok(TierHit {
            source: MetadataSource::Curated,
            symbol: Some(entry.symbol.to_string()),
            name: Some(entry.name.to_string()),
            decimals: entry.decimals,
            quote: None,
        })
    }
}

/// Uses the price aggregator's pair data as a naming source
pub struct PriceAggregatorTier {
    prices: Arc<dyn PriceProvider>,
}

impl PriceAggregatorTier {
    pub fn new(prices: Arc<dyn PriceProvider>) -> Self {
        Self { prices }
    }
}

#[async_trait]
impl MetadataTier for PriceAggregatorTier {
    fn label(&self) -> &'static str {
        "DexScreener"
    }

    async fn resolve(&self, token: &Address, network: Network) -> Result<TierHit, SourceError> {
        let quote = self.prices.resolve_price(token, network).await?;
        if quote.symbol.is_none() {
            return Err(SourceError::NoData("No DexScreener data".to_string()));
        }

        Ok(TierHit {
            source: MetadataSource::PriceAggregator,
            symbol: quote.symbol.clone(),
            name: quote.name.clone(),
            decimals: DEFAULT_DECIMALS,
            quote: Some(quote),
        })
    }
}

/// Raw outcome of the three ERC-20 getters
#[derive(Debug, Clone, PartialEq)]
pub struct OnChainReads {
    pub name: Result<String, SourceError>,
    pub symbol: Result<String, SourceError>,
    pub decimals: Result<u8, SourceError>,
}

/// Call `name()`, `symbol()` and `decimals()` concurrently; each may fail alone
pub async fn read_onchain(
    contracts: &dyn ContractReader,
    token: &Address,
    network: Network,
) -> OnChainReads {
    let (name, symbol, decimals) = futures::join!(
        contracts.call(token, NAME_SELECTOR, network),
        contracts.call(token, SYMBOL_SELECTOR, network),
        contracts.call(token, DECIMALS_SELECTOR, network),
    );

    OnChainReads {
        name: name.and_then(|hex| decode_abi_string(&hex)),
        symbol: symbol.and_then(|hex| decode_abi_string(&hex)),
        decimals: decimals.and_then(|hex| decode_uint8(&hex)),
    }
}

pub struct OnChainTier {
    contracts: Arc<dyn ContractReader>,
}

impl OnChainTier {
    pub fn new(contracts: Arc<dyn ContractReader>) -> Self {
        Self { contracts }
    }
}

#[async_trait]
impl MetadataTier for OnChainTier {
    fn label(&self) -> &'static str {
        "Blockchain"
    }

    async fn resolve(&self, token: &Address, network: Network) -> Result<TierHit, SourceError> {
        let reads = read_onchain(self.contracts.as_ref(), token, network).await;
        debug!(
            "📊 On-chain reads for {}: name={:?} symbol={:?} decimals={:?}",
            token.short(),
            reads.name,
            reads.symbol,
            reads.decimals
        );

        let decimals = reads.decimals.unwrap_or(DEFAULT_DECIMALS);
        match (reads.name.ok(), reads.symbol.ok()) {
            (None, None) => Err(SourceError::NoData("No blockchain data available".to_string())),
            (name, symbol) => Ok(TierHit {
                source: MetadataSource::OnChain,
                symbol: Some(symbol.unwrap_or_else(|| partial_symbol(token))),
                name: Some(name.unwrap_or_else(|| partial_name(token))),
                decimals,
                quote: None,
            }),
        }
    }
}

/// One probe's result, kept as data rather than an error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeOutcome<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> From<Result<T, SourceError>> for ProbeOutcome<T> {
    fn from(result: Result<T, SourceError>) -> Self {
        match result {
            Ok(value) => Self {
                value: Some(value),
                error: None,
            },
            Err(e) => Self {
                value: None,
                error: Some(e.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_names() {
        let token = Address::parse("0x1A2B3C4D5E6F7081928374655647382910abcdef").unwrap();
        assert_eq!(fallback_symbol(&token), "UNKNOWN_1A2B3C");
        assert_eq!(fallback_name(&token), "Unknown Token (0x1a2b3c4d...cdef)");
        assert_eq!(partial_symbol(&token), "TOKEN_1A2B3C");
        assert_eq!(partial_name(&token), "Token: 0x1a2b3c4d...cdef");
    }

    #[tokio::test]
    async fn test_curated_tier() {
        let usdt = Address::parse("0xdac17f958d2ee523a2206206994597c13d831ec7").unwrap();
        let hit = CuratedTier.resolve(&usdt, Network::Ethereum).await.unwrap();
        assert_eq!(hit.source, MetadataSource::Curated);
        assert_eq!(hit.decimals, 6);
        assert!(CuratedTier.resolve(&usdt, Network::Base).await.is_err());
    }

    #[test]
    fn test_probe_outcome_from_result() {
        let ok: ProbeOutcome<u8> = Ok(6).into();
        assert_eq!(ok.value, Some(6));
        let err: ProbeOutcome<u8> = Err(SourceError::NoData("nothing".to_string())).into();
        assert_eq!(err.error.as_deref(), Some("nothing"));
    }
}
