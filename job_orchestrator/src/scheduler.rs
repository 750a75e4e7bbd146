use async_trait::async_trait;
use config_manager::ScannerConfig;
use std::time::Duration;
use tracing::debug;

/// Pacing between upstream calls during a scan
#[async_trait]
pub trait RateLimitScheduler: Send + Sync {
    /// Called after a token check when another token follows
    async fn between_tokens(&self);

    /// Called after a wallet when another wallet follows
    async fn between_wallets(&self);
}

/// Sleeps a fixed interval at each step
#[derive(Debug, Clone)]
pub struct FixedIntervalScheduler {
    token_delay: Duration,
    wallet_delay: Duration,
}

impl FixedIntervalScheduler {
    pub fn new(token_delay: Duration, wallet_delay: Duration) -> Self {
        Self {
            token_delay,
            wallet_delay,
        }
    }

    pub fn from_config(config: &ScannerConfig) -> Self {
        Self::new(
            Duration::from_millis(config.token_delay_ms),
            Duration::from_millis(config.wallet_delay_ms),
        )
    }
}

#[async_trait]
impl RateLimitScheduler for FixedIntervalScheduler {
    async fn between_tokens(&self) {
        tokio::time::sleep(self.token_delay).await;
    }

    async fn between_wallets(&self) {
        debug!("⏳ Waiting {:?} before next wallet", self.wallet_delay);
        tokio::time::sleep(self.wallet_delay).await;
    }
}

/// Never waits
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelayScheduler;

#[async_trait]
impl RateLimitScheduler for NoDelayScheduler {
    async fn between_tokens(&self) {}

    async fn between_wallets(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fixed_interval_sleeps_configured_delays() {
        let scheduler = FixedIntervalScheduler::from_config(&ScannerConfig {
            token_delay_ms: 200,
            wallet_delay_ms: 500,
            max_wallets: 50,
            max_tokens: 20,
        });

        let start = tokio::time::Instant::now();
        scheduler.between_tokens().await;
        assert_eq!(start.elapsed(), Duration::from_millis(200));

        scheduler.between_wallets().await;
        assert_eq!(start.elapsed(), Duration::from_millis(700));
    }
}
