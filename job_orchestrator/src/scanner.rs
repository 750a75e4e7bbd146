use analyzer_core::{
    format_usd_value, Address, AnalysisReport, BalanceProvider, Network, TokenHolding,
    WalletCategory, WalletError, WalletOutcome,
};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use token_resolver::MetadataResolver;
use tracing::{debug, error, info, warn};

use crate::scheduler::RateLimitScheduler;
use crate::{OrchestratorError, Result};

/// Cooperative stop flag, checked before each wallet and each token
#[derive(Debug, Clone, Default)]
pub struct AbortSignal(Arc<AtomicBool>);

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Walks wallets × tokens one call at a time
pub struct WalletScanner {
    balances: Arc<dyn BalanceProvider>,
    resolver: Arc<MetadataResolver>,
    scheduler: Arc<dyn RateLimitScheduler>,
}

impl WalletScanner {
    pub fn new(
        balances: Arc<dyn BalanceProvider>,
        resolver: Arc<MetadataResolver>,
        scheduler: Arc<dyn RateLimitScheduler>,
    ) -> Self {
        Self {
            balances,
            resolver,
            scheduler,
        }
    }

    /// Scan every wallet for every token and file each wallet into its category.
    ///
    /// Wallet failures are recorded on the wallet; only an abort ends the run early.
    pub async fn scan(
        &self,
        wallets: &[Address],
        tokens: &[Address],
        network: Network,
        abort: &AbortSignal,
    ) -> Result<AnalysisReport> {
        let mut report = AnalysisReport::new(network, wallets.len(), tokens.len());

        for (index, wallet) in wallets.iter().enumerate() {
            if abort.is_aborted() {
                warn!("🛑 Scan aborted after {} of {} wallets", index, wallets.len());
                return Err(OrchestratorError::Aborted { processed: index });
            }

            info!("👛 [{}/{}] Scanning wallet {}", index + 1, wallets.len(), wallet.short());

            let outcome = match AssertUnwindSafe(self.scan_wallet(wallet, tokens, network, abort))
                .catch_unwind()
                .await
            {
                Ok(Some(outcome)) => outcome,
                Ok(None) => {
                    warn!("🛑 Scan aborted while scanning wallet {}", wallet.short());
                    return Err(OrchestratorError::Aborted { processed: index });
                }
                Err(payload) => {
                    let err = WalletError::Panicked(panic_message(payload));
                    error!("❌ Wallet {} failed: {}", wallet.short(), err);
                    WalletOutcome::failed(wallet.clone(), err.to_string())
                }
            };

            let found = outcome.found_tokens.len();
            let total_usd = format_usd_value(outcome.total_usd_value);
            let category = report.record(outcome);
            match category {
                WalletCategory::AllTokens => {
                    info!("✅ {} holds all {} tokens ({})", wallet.short(), found, total_usd)
                }
                WalletCategory::SomeTokens => info!(
                    "🟡 {} holds {}/{} tokens ({})",
                    wallet.short(),
                    found,
                    tokens.len(),
                    total_usd
                ),
                WalletCategory::NoTokens => {
                    info!("⚪ {} holds none of the tokens", wallet.short())
                }
            }

            if index + 1 < wallets.len() {
                self.scheduler.between_wallets().await;
            }
        }

        Ok(report.finish())
    }

    /// `None` when the abort signal fired mid-wallet
    async fn scan_wallet(
        &self,
        wallet: &Address,
        tokens: &[Address],
        network: Network,
        abort: &AbortSignal,
    ) -> Option<WalletOutcome> {
        let mut found = Vec::new();

        for (index, token) in tokens.iter().enumerate() {
            if abort.is_aborted() {
                return None;
            }

            match self.balances.token_balance(wallet, token, network).await {
                Ok(balance) if balance.has_balance => {
                    let metadata = self.resolver.resolve_metadata(token, network, true).await;
                    let balance = balance.rescaled(metadata.decimals);
                    debug!(
                        "💰 {} holds {} {}",
                        wallet.short(),
                        balance.formatted_balance,
                        metadata.symbol.as_deref().unwrap_or("?")
                    );
                    found.push(TokenHolding::new(&metadata, &balance));
                }
                Ok(_) => {
                    debug!("{} has no balance of {}", wallet.short(), token.short());
                }
                Err(e) => {
                    warn!(
                        "⚠️ Balance check of {} for {} failed: {}",
                        token.short(),
                        wallet.short(),
                        e
                    );
                }
            }

            if index + 1 < tokens.len() {
                self.scheduler.between_tokens().await;
            }
        }

        Some(WalletOutcome::new(wallet.clone(), found))
    }
}
