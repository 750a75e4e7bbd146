//! Runs wallet analyses: request checks, one run at a time, abort, and the
//! cache maintenance the API exposes.

pub mod scanner;
pub mod scheduler;

pub use scanner::{AbortSignal, WalletScanner};
pub use scheduler::{FixedIntervalScheduler, NoDelayScheduler, RateLimitScheduler};

use analyzer_core::{
    validate_addresses, Address, AddressValidation, AnalysisCounts, AnalysisReport, BalanceProvider,
    CacheStats, Clock, ContractReader, InputError, Network, PriceProvider, SystemClock,
    ValidationSummary,
};
use chrono::Utc;
use config_manager::{ConfigurationError, SystemConfig};
use dex_client::{DexScreenerError, PriceSource};
use explorer_client::{ExplorerClient, ExplorerError};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use token_resolver::{MetadataResolver, TokenDebugReport};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("{0}")]
    Input(#[from] InputError),
    #[error("An analysis is already running")]
    AnalysisInProgress,
    #[error("Analysis aborted after {processed} wallets")]
    Aborted { processed: usize },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Explorer client error: {0}")]
    Explorer(String),
    #[error("DexScreener client error: {0}")]
    DexScreener(String),
}

impl From<ConfigurationError> for OrchestratorError {
    fn from(err: ConfigurationError) -> Self {
        OrchestratorError::Config(err.to_string())
    }
}

impl From<ExplorerError> for OrchestratorError {
    fn from(err: ExplorerError) -> Self {
        match err {
            ExplorerError::MissingApiKey(_) => OrchestratorError::Config(err.to_string()),
            other => OrchestratorError::Explorer(other.to_string()),
        }
    }
}

impl From<DexScreenerError> for OrchestratorError {
    fn from(err: DexScreenerError) -> Self {
        OrchestratorError::DexScreener(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;

/// Status of an analysis run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum JobStatus {
    Running,
    Completed,
    /// Stopped by an abort before every wallet was scanned
    Cancelled,
}

/// Bookkeeping for one analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisJob {
    pub id: Uuid,
    pub network: Network,
    pub wallet_count: usize,
    pub token_count: usize,
    pub status: JobStatus,
    pub started_at: chrono::DateTime<Utc>,
    pub completed_at: Option<chrono::DateTime<Utc>>,
    pub error_message: Option<String>,
    pub counts: Option<AnalysisCounts>,
}

impl AnalysisJob {
    pub fn new(network: Network, wallet_count: usize, token_count: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            network,
            wallet_count,
            token_count,
            status: JobStatus::Running,
            started_at: Utc::now(),
            completed_at: None,
            error_message: None,
            counts: None,
        }
    }

    /// Request errors are raised before a job exists, so a run either
    /// completes or is aborted.
    fn finish(&mut self, result: &Result<AnalysisReport>) {
        self.completed_at = Some(Utc::now());
        match result {
            Ok(report) => {
                self.status = JobStatus::Completed;
                self.counts = Some(report.counts);
            }
            Err(e) => {
                self.status = JobStatus::Cancelled;
                self.error_message = Some(e.to_string());
            }
        }
    }
}

/// Answer to an address validation request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub valid: Vec<Address>,
    pub invalid: Vec<String>,
    pub summary: ValidationSummary,
}

impl ValidationReport {
    pub fn new(validation: AddressValidation, total: usize) -> Self {
        let summary = validation.summary(total);
        Self {
            valid: validation.valid,
            invalid: validation.invalid,
            summary,
        }
    }
}

/// Sizes and keys of both caches
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheReport {
    pub metadata: CacheStats,
    pub prices: CacheStats,
}

/// System status information
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestratorStatus {
    pub is_running: bool,
    pub last_job: Option<AnalysisJob>,
    pub metadata_cache_size: usize,
    pub price_cache_size: usize,
}

/// Clears the running flag even if the run future is dropped
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct AnalysisOrchestrator {
    config: SystemConfig,
    scanner: WalletScanner,
    resolver: Arc<MetadataResolver>,
    prices: Arc<dyn PriceProvider>,
    is_running: AtomicBool,
    abort: AbortSignal,
    last_job: Mutex<Option<AnalysisJob>>,
}

impl AnalysisOrchestrator {
    /// Production wiring: explorer, DexScreener and fixed delays from `config`
    pub fn new(config: SystemConfig) -> Result<Self> {
        config.validate()?;

        let explorer = Arc::new(ExplorerClient::new(&config)?);
        let prices = Arc::new(PriceSource::from_config(&config.dexscreener, &config.networks)?);
        let scheduler = Arc::new(FixedIntervalScheduler::from_config(&config.scanner));

        info!("Analysis orchestrator initialized");
        Ok(Self::with_components(
            config,
            explorer.clone(),
            explorer,
            prices,
            scheduler,
            Arc::new(SystemClock),
        ))
    }

    pub fn with_components(
        config: SystemConfig,
        balances: Arc<dyn BalanceProvider>,
        contracts: Arc<dyn ContractReader>,
        prices: Arc<dyn PriceProvider>,
        scheduler: Arc<dyn RateLimitScheduler>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let resolver = Arc::new(MetadataResolver::new(
            prices.clone(),
            contracts,
            config.networks.clone(),
            chrono::Duration::seconds(config.metadata.cache_ttl_seconds as i64),
            clock,
        ));
        let scanner = WalletScanner::new(balances, resolver.clone(), scheduler);

        Self {
            config,
            scanner,
            resolver,
            prices,
            is_running: AtomicBool::new(false),
            abort: AbortSignal::new(),
            last_job: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Split raw addresses into valid and invalid
    pub fn validate(&self, addresses: &[String]) -> ValidationReport {
        ValidationReport::new(validate_addresses(addresses), addresses.len())
    }

    /// Enforce the request limits and address rules before any upstream call
    pub fn check_request(
        &self,
        wallets: &[String],
        tokens: &[String],
    ) -> Result<(Vec<Address>, Vec<Address>)> {
        let limits = &self.config.scanner;
        if wallets.len() > limits.max_wallets || tokens.len() > limits.max_tokens {
            return Err(InputError::TooManyAddresses {
                wallets: wallets.len(),
                tokens: tokens.len(),
                max_wallets: limits.max_wallets,
                max_tokens: limits.max_tokens,
            }
            .into());
        }

        let wallet_validation = validate_addresses(wallets);
        let token_validation = validate_addresses(tokens);
        if wallet_validation.has_invalid() || token_validation.has_invalid() {
            return Err(InputError::InvalidAddresses {
                invalid_wallets: wallet_validation.invalid,
                invalid_tokens: token_validation.invalid,
            }
            .into());
        }

        Ok((wallet_validation.valid, token_validation.valid))
    }

    /// Run one analysis. A second call while one is running is rejected.
    pub async fn analyze(
        &self,
        wallets: &[String],
        tokens: &[String],
        network: Network,
    ) -> Result<AnalysisReport> {
        let (wallets, tokens) = self.check_request(wallets, tokens)?;

        if self
            .is_running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Rejected analysis request: another analysis is running");
            return Err(OrchestratorError::AnalysisInProgress);
        }
        let _guard = RunGuard(&self.is_running);
        self.abort.reset();

        let mut job = AnalysisJob::new(network, wallets.len(), tokens.len());
        *self.last_job.lock().await = Some(job.clone());

        info!(
            "🚀 Starting analysis {} on {}: {} wallets × {} tokens",
            job.id,
            network,
            wallets.len(),
            tokens.len()
        );

        let result = self.scanner.scan(&wallets, &tokens, network, &self.abort).await;

        job.finish(&result);
        if let Ok(report) = &result {
            info!(
                "🎉 Analysis {} done: {} all / {} some / {} none",
                job.id, report.counts.all_tokens, report.counts.some_tokens, report.counts.no_tokens
            );
        }
        *self.last_job.lock().await = Some(job);

        result
    }

    /// Ask the running analysis to stop; false when nothing is running
    pub fn abort(&self) -> bool {
        if self.is_running.load(Ordering::SeqCst) {
            self.abort.abort();
            info!("🛑 Abort requested for running analysis");
            true
        } else {
            false
        }
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    pub async fn debug_token(&self, token: &Address, network: Network) -> TokenDebugReport {
        self.resolver.debug_token(token, network).await
    }

    pub fn clear_caches(&self) {
        self.resolver.clear_cache();
        self.prices.clear_cache();
    }

    pub fn cache_stats(&self) -> CacheReport {
        CacheReport {
            metadata: self.resolver.cache_stats(),
            prices: self.prices.cache_stats(),
        }
    }

    /// Get system status
    pub async fn get_status(&self) -> OrchestratorStatus {
        OrchestratorStatus {
            is_running: self.is_running(),
            last_job: self.last_job.lock().await.clone(),
            metadata_cache_size: self.resolver.cache_stats().size,
            price_cache_size: self.prices.cache_stats().size,
        }
    }
}
