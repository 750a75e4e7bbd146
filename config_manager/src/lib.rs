use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Configuration loading error: {0}")]
    ConfigLoad(#[from] ConfigError),
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

pub type Result<T> = std::result::Result<T, ConfigurationError>;

/// Environment variable holding the primary explorer key
pub const ETHERSCAN_API_KEY_VAR: &str = "ETHERSCAN_API_KEY";
/// Environment variable holding the secondary explorer key (falls back to the primary key)
pub const BASESCAN_API_KEY_VAR: &str = "BASESCAN_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Block explorer endpoints, one per supported network
    pub networks: NetworksConfig,

    /// Shared explorer client settings
    pub explorer: ExplorerConfig,

    /// DexScreener API configuration
    pub dexscreener: DexScreenerConfig,

    /// Token metadata resolution settings
    pub metadata: MetadataConfig,

    /// Wallet scan pacing and request limits
    pub scanner: ScannerConfig,

    /// API server configuration
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworksConfig {
    pub ethereum: NetworkConfig,
    pub base: NetworkConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Human readable network name
    pub name: String,

    /// Etherscan-compatible API endpoint
    pub api_url: String,

    /// Explorer API key
    pub api_key: String,

    /// Chain identifier used by DexScreener pairs
    pub chain_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// Request timeout in seconds
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DexScreenerConfig {
    /// DexScreener API base URL
    pub api_base_url: String,

    /// Request timeout in seconds
    pub request_timeout_seconds: u64,

    /// How long a resolved price stays fresh
    pub price_cache_ttl_seconds: u64,

    /// Enable DexScreener as a metadata and price source
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// How long a resolved token record stays fresh
    pub cache_ttl_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Pause after each token balance check
    pub token_delay_ms: u64,

    /// Pause between wallets
    pub wallet_delay_ms: u64,

    /// Maximum wallets accepted per analysis request
    pub max_wallets: usize,

    /// Maximum tokens accepted per analysis request
    pub max_tokens: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API server host
    pub host: String,

    /// API server port
    pub port: u16,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            networks: NetworksConfig {
                ethereum: NetworkConfig {
                    name: "Ethereum Mainnet".to_string(),
                    api_url: "https://api.etherscan.io/api".to_string(),
                    api_key: "".to_string(), // Must be set in .env or config file
                    chain_id: "ethereum".to_string(),
                },
                base: NetworkConfig {
                    name: "Base Mainnet".to_string(),
                    api_url: "https://api.basescan.org/api".to_string(),
                    api_key: "".to_string(),
                    chain_id: "base".to_string(),
                },
            },
            explorer: ExplorerConfig {
                request_timeout_seconds: 30,
            },
            dexscreener: DexScreenerConfig {
                api_base_url: "https://api.dexscreener.com".to_string(),
                request_timeout_seconds: 30,
                price_cache_ttl_seconds: 300,
                enabled: true,
            },
            metadata: MetadataConfig {
                cache_ttl_seconds: 600,
            },
            scanner: ScannerConfig {
                token_delay_ms: 200,
                wallet_delay_ms: 500,
                max_wallets: 50,
                max_tokens: 20,
            },
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
        }
    }
}

impl NetworkConfig {
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl DexScreenerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_seconds == 0 {
            return Err(ConfigurationError::InvalidValue(
                "DexScreener request timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl ScannerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_wallets == 0 || self.max_tokens == 0 {
            return Err(ConfigurationError::InvalidValue(
                "Scanner wallet and token limits must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl SystemConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config.toml")
    }

    /// Load and validate configuration from a specific file path
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let system_config = Self::build_from_path(config_path)?;
        system_config.validate()?;
        Ok(system_config)
    }

    /// Layer defaults, file and environment without validating the result
    pub fn build_from_path<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let mut config_builder = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&SystemConfig::default())?);

        if config_path.as_ref().exists() {
            info!(
                "Loading configuration from: {}",
                config_path.as_ref().display()
            );
            config_builder = config_builder.add_source(File::from(config_path.as_ref()));
        } else {
            debug!("Config file not found, using defaults and environment variables");
        }

        config_builder = config_builder.add_source(
            Environment::with_prefix("WALLET_ANALYZER")
                .try_parsing(true)
                .separator("__"),
        );

        let mut system_config: SystemConfig = config_builder.build()?.try_deserialize()?;
        system_config.apply_api_key_env(
            std::env::var(ETHERSCAN_API_KEY_VAR).ok(),
            std::env::var(BASESCAN_API_KEY_VAR).ok(),
        );

        Ok(system_config)
    }

    /// Overlay the well-known explorer key variables.
    ///
    /// The secondary network reuses the primary key when it has none of its own.
    pub fn apply_api_key_env(
        &mut self,
        etherscan_key: Option<String>,
        basescan_key: Option<String>,
    ) {
        let etherscan_key = etherscan_key.filter(|k| !k.trim().is_empty());
        let basescan_key = basescan_key.filter(|k| !k.trim().is_empty());

        if let Some(key) = etherscan_key {
            self.networks.ethereum.api_key = key;
        }

        if let Some(key) = basescan_key {
            self.networks.base.api_key = key;
        }

        if !self.networks.base.has_api_key() && self.networks.ethereum.has_api_key() {
            debug!("No dedicated Basescan key, reusing the Etherscan key");
            self.networks.base.api_key = self.networks.ethereum.api_key.clone();
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.networks.ethereum.has_api_key() {
            return Err(ConfigurationError::InvalidValue(format!(
                "{} is required",
                ETHERSCAN_API_KEY_VAR
            )));
        }

        if !self.networks.base.has_api_key() {
            warn!("Base network has no explorer API key, Base scans will fail");
        }

        if self.explorer.request_timeout_seconds == 0 {
            return Err(ConfigurationError::InvalidValue(
                "Explorer request timeout must be greater than 0".to_string(),
            ));
        }

        self.dexscreener.validate()?;
        self.scanner.validate()?;

        if self.api.port == 0 {
            return Err(ConfigurationError::InvalidValue(
                "API port cannot be 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Get configuration as a JSON value with API keys redacted
    pub fn to_redacted_json(&self) -> serde_json::Value {
        let mut redacted = self.clone();
        for network in [&mut redacted.networks.ethereum, &mut redacted.networks.base] {
            if network.has_api_key() {
                network.api_key = "***".to_string();
            }
        }
        serde_json::to_value(redacted).unwrap_or(serde_json::Value::Null)
    }
}
