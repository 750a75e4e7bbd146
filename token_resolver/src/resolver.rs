use analyzer_core::{
    Address, CacheStats, Clock, ContractReader, MetadataSource, Network, PriceProvider, PriceQuote,
    SystemClock, TokenMetadata, TtlCache,
};
use chrono::Duration;
use config_manager::{NetworksConfig, SystemConfig};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::curated::{self, CuratedToken};
use crate::tiers::{
    fallback_name, fallback_symbol, read_onchain, CuratedTier, MetadataTier, OnChainTier,
    PriceAggregatorTier, ProbeOutcome, TierHit,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetadataCacheKey {
    pub network: Network,
    pub address: Address,
    pub include_pricing: bool,
}

impl fmt::Display for MetadataCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.network, self.address, self.include_pricing)
    }
}

/// Every tier's answer for one token, gathered without touching the cache
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDebugReport {
    pub address: Address,
    pub network: Network,
    pub network_name: String,
    pub curated: Option<CuratedToken>,
    pub price_aggregator: ProbeOutcome<PriceQuote>,
    pub on_chain: OnChainProbe,
}

#[derive(Debug, Clone, Serialize)]
pub struct OnChainProbe {
    pub name: ProbeOutcome<String>,
    pub symbol: ProbeOutcome<String>,
    pub decimals: ProbeOutcome<u8>,
}

/// Resolves token metadata through curated table, price aggregator, on-chain
/// calls and finally a synthetic record. Never fails.
pub struct MetadataResolver {
    tiers: Vec<Box<dyn MetadataTier>>,
    prices: Arc<dyn PriceProvider>,
    contracts: Arc<dyn ContractReader>,
    networks: NetworksConfig,
    cache: TtlCache<MetadataCacheKey, TokenMetadata>,
}

impl MetadataResolver {
    pub fn new(
        prices: Arc<dyn PriceProvider>,
        contracts: Arc<dyn ContractReader>,
        networks: NetworksConfig,
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let tiers: Vec<Box<dyn MetadataTier>> = vec![
            Box::new(CuratedTier),
            Box::new(PriceAggregatorTier::new(prices.clone())),
            Box::new(OnChainTier::new(contracts.clone())),
        ];

        Self {
            tiers,
            prices,
            contracts,
            networks,
            cache: TtlCache::new(ttl, clock),
        }
    }

    pub fn from_config(
        config: &SystemConfig,
        prices: Arc<dyn PriceProvider>,
        contracts: Arc<dyn ContractReader>,
    ) -> Self {
        Self::new(
            prices,
            contracts,
            config.networks.clone(),
            Duration::seconds(config.metadata.cache_ttl_seconds as i64),
            Arc::new(SystemClock),
        )
    }

    fn network_name(&self, network: Network) -> String {
        network.config(&self.networks).name.clone()
    }

    fn from_hit(&self, token: &Address, network: Network, hit: &TierHit) -> TokenMetadata {
        TokenMetadata {
            address: token.clone(),
            symbol: hit.symbol.clone(),
            name: hit.name.clone(),
            decimals: hit.decimals,
            price_usd: None,
            price_change_24h: None,
            volume_24h: None,
            dex_id: None,
            pair_address: None,
            price_source: None,
            price_error: None,
            source: hit.source,
            network,
            network_name: self.network_name(network),
            error: None,
            fetched_at: self.cache.now(),
        }
    }

    fn synthetic(&self, token: &Address, network: Network, failures: &[String]) -> TokenMetadata {
        let hit = TierHit {
            source: MetadataSource::Fallback,
            symbol: Some(fallback_symbol(token)),
            name: Some(fallback_name(token)),
            decimals: analyzer_core::models::DEFAULT_DECIMALS,
            quote: None,
        };
        let mut metadata = self.from_hit(token, network, &hit);
        metadata.error = Some(format!("All sources failed: {}", failures.join(", ")));
        metadata
    }

    /// Symbol, name, decimals and (optionally) pricing for `token`
    pub async fn resolve_metadata(
        &self,
        token: &Address,
        network: Network,
        include_pricing: bool,
    ) -> TokenMetadata {
        let key = MetadataCacheKey {
            network,
            address: token.clone(),
            include_pricing,
        };
        if let Some(cached) = self.cache.get(&key) {
            debug!("📋 Using cached token info for {}", token.short());
            return cached;
        }

        info!("🔍 Getting token info for {} on {}", token.short(), self.network_name(network));

        let total = self.tiers.len();
        let mut failures = Vec::new();
        let mut found = None;
        for (index, tier) in self.tiers.iter().enumerate() {
            match tier.resolve(token, network).await {
                Ok(hit) => {
                    info!(
                        "✅ [{}/{}] {} resolved {}: {}",
                        index + 1,
                        total,
                        tier.label(),
                        token.short(),
                        hit.symbol.as_deref().unwrap_or("?")
                    );
                    found = Some(hit);
                    break;
                }
                Err(e) => {
                    debug!(
                        "❌ [{}/{}] {} failed for {}: {}",
                        index + 1,
                        total,
                        tier.label(),
                        token.short(),
                        e
                    );
                    failures.push(format!("{}({})", tier.label(), e));
                }
            }
        }

        let (mut metadata, quote) = match found {
            Some(hit) => (self.from_hit(token, network, &hit), hit.quote),
            None => {
                warn!("⚠️ All metadata sources failed for {}, using fallback", token.short());
                (self.synthetic(token, network, &failures), None)
            }
        };

        if include_pricing {
            self.attach_price(&mut metadata, quote).await;
        }

        self.cache.insert(key, metadata.clone());
        metadata
    }

    async fn attach_price(&self, metadata: &mut TokenMetadata, quote: Option<PriceQuote>) {
        let priced = match quote.filter(|q| q.price_usd.is_some()) {
            Some(quote) => Some(quote),
            None => match self.prices.resolve_price(&metadata.address, metadata.network).await {
                Ok(quote) if quote.price_usd.is_some() => Some(quote),
                Ok(_) => None,
                Err(e) => {
                    debug!("Price lookup failed for {}: {}", metadata.address.short(), e);
                    None
                }
            },
        };

        match priced {
            Some(quote) => metadata.apply_price(&quote),
            None => metadata.mark_price_unavailable(),
        }
    }

    /// Ask every source about `token` independently, bypassing the metadata cache
    pub async fn debug_token(&self, token: &Address, network: Network) -> TokenDebugReport {
        info!("🔍 Debugging token info for {} on {}", token, network);

        let curated = curated::lookup(network, token).copied();
        let price_aggregator: ProbeOutcome<PriceQuote> =
            self.prices.resolve_price(token, network).await.into();
        let reads = read_onchain(self.contracts.as_ref(), token, network).await;

        TokenDebugReport {
            address: token.clone(),
            network,
            network_name: self.network_name(network),
            curated,
            price_aggregator,
            on_chain: OnChainProbe {
                name: reads.name.into(),
                symbol: reads.symbol.into(),
                decimals: reads.decimals.into(),
            },
        }
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("🗑️ Token info cache cleared");
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
