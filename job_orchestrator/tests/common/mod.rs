#![allow(dead_code)]

use analyzer_core::{
    Address, BalanceProvider, BalanceResult, CacheStats, ContractReader, ManualClock, Network,
    PriceProvider, PriceQuote, SourceError,
};
use async_trait::async_trait;
use chrono::Utc;
use config_manager::SystemConfig;
use job_orchestrator::{AnalysisOrchestrator, RateLimitScheduler};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

pub const USDT: &str = "0xdAC17F958D2ee523a2206206994597C13D831ec7";
pub const WETH: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";
pub const MYSTERY: &str = "0x9999999999999999999999999999999999999999";

pub const WALLET_A: &str = "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA1111";
pub const WALLET_B: &str = "0xBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB2222";
pub const WALLET_C: &str = "0xCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCC3333";

pub fn lower(s: &str) -> String {
    s.to_lowercase()
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// What the explorer answers for one (wallet, token) pair
#[derive(Clone)]
pub enum BalanceAnswer {
    Raw(&'static str),
    Fail,
    Panic,
}

/// Explorer stand-in; unknown pairs hold nothing
#[derive(Default)]
pub struct FakeBalances {
    answers: HashMap<(String, String), BalanceAnswer>,
    pub calls: AtomicUsize,
}

impl FakeBalances {
    pub fn with(mut self, wallet: &str, token: &str, answer: BalanceAnswer) -> Self {
        self.answers.insert((lower(wallet), lower(token)), answer);
        self
    }
}

#[async_trait]
impl BalanceProvider for FakeBalances {
    async fn token_balance(
        &self,
        wallet: &Address,
        token: &Address,
        _network: Network,
    ) -> Result<BalanceResult, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let key = (wallet.to_string(), token.to_string());
        match self.answers.get(&key).cloned() {
            Some(BalanceAnswer::Raw(raw)) => BalanceResult::parse(raw, 18),
            Some(BalanceAnswer::Fail) => {
                Err(SourceError::Api("Max rate limit reached".to_string()))
            }
            Some(BalanceAnswer::Panic) => panic!("balance decoder exploded"),
            None => BalanceResult::parse("0", 18),
        }
    }
}

/// Explorer stand-in that blocks each call until released
pub struct GatedBalances {
    pub started: Arc<Notify>,
    pub release: Arc<Notify>,
}

impl GatedBalances {
    pub fn new() -> Self {
        Self {
            started: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        }
    }
}

#[async_trait]
impl BalanceProvider for GatedBalances {
    async fn token_balance(
        &self,
        _wallet: &Address,
        _token: &Address,
        _network: Network,
    ) -> Result<BalanceResult, SourceError> {
        self.started.notify_one();
        self.release.notified().await;
        BalanceResult::parse("0", 18)
    }
}

#[derive(Default)]
pub struct FakePrices {
    prices: HashMap<String, f64>,
    pub calls: AtomicUsize,
}

impl FakePrices {
    pub fn with(mut self, token: &str, price: f64) -> Self {
        self.prices.insert(lower(token), price);
        self
    }
}

#[async_trait]
impl PriceProvider for FakePrices {
    async fn resolve_price(
        &self,
        token: &Address,
        network: Network,
    ) -> Result<PriceQuote, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let price = self
            .prices
            .get(token.as_str())
            .ok_or_else(|| SourceError::NoData("No trading pairs found".to_string()))?;
        Ok(PriceQuote {
            address: token.clone(),
            symbol: None,
            name: None,
            price_usd: Some(*price),
            price_change_24h: Some(0.01),
            volume_24h: None,
            dex_id: None,
            pair_address: None,
            network,
            fetched_at: Utc::now(),
        })
    }

    fn clear_cache(&self) {}

    fn cache_stats(&self) -> CacheStats {
        CacheStats {
            size: self.prices.len(),
            entries: Vec::new(),
        }
    }
}

/// Every contract call reverts
pub struct RevertingContracts;

#[async_trait]
impl ContractReader for RevertingContracts {
    async fn call(
        &self,
        _contract: &Address,
        _selector: &str,
        _network: Network,
    ) -> Result<String, SourceError> {
        Err(SourceError::Api("execution reverted".to_string()))
    }
}

/// Zero-delay scheduler that counts how often it was asked to wait
#[derive(Default)]
pub struct CountingScheduler {
    pub token_waits: AtomicUsize,
    pub wallet_waits: AtomicUsize,
}

#[async_trait]
impl RateLimitScheduler for CountingScheduler {
    async fn between_tokens(&self) {
        self.token_waits.fetch_add(1, Ordering::SeqCst);
    }

    async fn between_wallets(&self) {
        self.wallet_waits.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn orchestrator(
    balances: Arc<dyn BalanceProvider>,
    prices: Arc<dyn PriceProvider>,
    scheduler: Arc<dyn RateLimitScheduler>,
) -> AnalysisOrchestrator {
    AnalysisOrchestrator::with_components(
        SystemConfig::default(),
        balances,
        Arc::new(RevertingContracts),
        prices,
        scheduler,
        Arc::new(ManualClock::default()),
    )
}
