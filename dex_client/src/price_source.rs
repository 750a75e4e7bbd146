use analyzer_core::{
    Address, CacheStats, Clock, Network, PriceProvider, PriceQuote, SourceError, SystemClock,
    TtlCache,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use config_manager::{DexScreenerConfig, NetworksConfig};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::dexscreener_client::{DexScreenerClient, DexScreenerError, PairFetcher};
use crate::types::{PairToken, TokenPair};

/// Pair with the highest 24h volume on `chain_id`; the first one wins a tie
pub fn select_best_pair<'a>(pairs: &'a [TokenPair], chain_id: &str) -> Option<&'a TokenPair> {
    let mut best: Option<&TokenPair> = None;

    for pair in pairs.iter().filter(|p| p.chain_id == chain_id) {
        match best {
            Some(current) if pair.volume_24h() <= current.volume_24h() => {}
            _ => best = Some(pair),
        }
    }

    best
}

/// The side of `pair` that is `token`, or the base side when neither matches
pub fn token_side<'a>(pair: &'a TokenPair, token: &Address) -> &'a PairToken {
    if pair.base_token.address.eq_ignore_ascii_case(token.as_str()) {
        &pair.base_token
    } else if pair.quote_token.address.eq_ignore_ascii_case(token.as_str()) {
        &pair.quote_token
    } else {
        &pair.base_token
    }
}

pub fn build_quote(
    pair: &TokenPair,
    token: &Address,
    network: Network,
    fetched_at: DateTime<Utc>,
) -> PriceQuote {
    let side = token_side(pair, token);
    let volume = pair.volume_24h();

    PriceQuote {
        address: token.clone(),
        symbol: side.symbol.clone().filter(|s| !s.is_empty()),
        name: side.name.clone().filter(|s| !s.is_empty()),
        price_usd: pair.price_usd(),
        price_change_24h: pair.price_change_24h(),
        volume_24h: if volume > 0.0 { Some(volume) } else { None },
        dex_id: pair.dex_id.clone(),
        pair_address: pair.pair_address.clone(),
        network,
        fetched_at,
    }
}

/// Token prices from DexScreener, cached per (network, token).
///
/// Only successful lookups are cached; a token without pairs is asked again
/// on the next call.
pub struct PriceSource {
    fetcher: Arc<dyn PairFetcher>,
    networks: NetworksConfig,
    cache: TtlCache<String, PriceQuote>,
}

impl PriceSource {
    pub fn new(
        fetcher: Arc<dyn PairFetcher>,
        networks: NetworksConfig,
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            fetcher,
            networks,
            cache: TtlCache::new(ttl, clock),
        }
    }

    /// DexScreener-backed source using the wall clock
    pub fn from_config(
        config: &DexScreenerConfig,
        networks: &NetworksConfig,
    ) -> Result<Self, DexScreenerError> {
        let client = DexScreenerClient::new(config.clone())?;
        Ok(Self::new(
            Arc::new(client),
            networks.clone(),
            Duration::seconds(config.price_cache_ttl_seconds as i64),
            Arc::new(SystemClock),
        ))
    }

    fn cache_key(token: &Address, network: Network) -> String {
        format!("{}-{}", network, token)
    }
}

#[async_trait]
impl PriceProvider for PriceSource {
    async fn resolve_price(
        &self,
        token: &Address,
        network: Network,
    ) -> Result<PriceQuote, SourceError> {
        let key = Self::cache_key(token, network);
        if let Some(quote) = self.cache.get(&key) {
            debug!("📋 Using cached DexScreener data for {}", token.short());
            return Ok(quote);
        }

        let pairs = self.fetcher.get_token_pairs(token).await.map_err(|e| {
            warn!("⚠️ DexScreener lookup failed for {}: {}", token.short(), e);
            SourceError::from(e)
        })?;

        if pairs.is_empty() {
            debug!("No DexScreener pairs for {} on {}", token.short(), network);
            return Err(SourceError::NoData("No trading pairs found".to_string()));
        }

        let chain_id = &network.config(&self.networks).chain_id;
        let best_pair = select_best_pair(&pairs, chain_id)
            .ok_or_else(|| SourceError::NoData(format!("No pairs found for {}", network)))?;

        let quote = build_quote(best_pair, token, network, self.cache.now());
        self.cache.insert(key, quote.clone());

        info!(
            "✅ DexScreener price for {}: {} @ {:?} ({} pairs considered)",
            token.short(),
            quote.symbol.as_deref().unwrap_or("?"),
            quote.price_usd,
            pairs.len()
        );
        Ok(quote)
    }

    fn clear_cache(&self) {
        self.cache.clear();
        info!("🧹 Price cache cleared");
    }

    fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
