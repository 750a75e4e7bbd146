use async_trait::async_trait;

use crate::{Address, BalanceResult, CacheStats, Network, PriceQuote, SourceError};

/// Block-explorer token balance lookups.
///
/// The returned balance is formatted with 18 decimals; callers rescale once the
/// token's real decimals are known.
#[async_trait]
pub trait BalanceProvider: Send + Sync {
    async fn token_balance(
        &self,
        wallet: &Address,
        token: &Address,
        network: Network,
    ) -> Result<BalanceResult, SourceError>;
}

/// Read-only contract calls returning raw ABI-encoded hex
#[async_trait]
pub trait ContractReader: Send + Sync {
    async fn call(
        &self,
        contract: &Address,
        selector: &str,
        network: Network,
    ) -> Result<String, SourceError>;
}

/// Per-token USD pricing from a liquidity aggregator
#[async_trait]
pub trait PriceProvider: Send + Sync {
    async fn resolve_price(
        &self,
        token: &Address,
        network: Network,
    ) -> Result<PriceQuote, SourceError>;

    fn clear_cache(&self);

    fn cache_stats(&self) -> CacheStats;
}
