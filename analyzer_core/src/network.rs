use config_manager::{NetworkConfig, NetworksConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::InputError;

/// Supported chains. Ethereum is the primary network, Base the secondary one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    #[serde(alias = "primary", alias = "eth")]
    Ethereum,
    #[serde(alias = "secondary")]
    Base,
}

impl Network {
    pub const ALL: [Network; 2] = [Network::Ethereum, Network::Base];

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Ethereum => "ethereum",
            Network::Base => "base",
        }
    }

    /// Explorer settings for this network
    pub fn config<'a>(&self, networks: &'a NetworksConfig) -> &'a NetworkConfig {
        match self {
            Network::Ethereum => &networks.ethereum,
            Network::Base => &networks.base,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ethereum" | "eth" | "primary" => Ok(Network::Ethereum),
            "base" | "secondary" => Ok(Network::Base),
            other => Err(InputError::UnsupportedNetwork(other.to_string())),
        }
    }
}
