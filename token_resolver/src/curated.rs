use analyzer_core::{Address, Network};
use lazy_static::lazy_static;
use serde::Serialize;
use std::collections::HashMap;

/// Hand-maintained token facts, trusted over every remote source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CuratedToken {
    pub symbol: &'static str,
    pub name: &'static str,
    pub decimals: u8,
}

const fn token(symbol: &'static str, name: &'static str, decimals: u8) -> CuratedToken {
    CuratedToken { symbol, name, decimals }
}

const ETHEREUM_TOKENS: &[(&str, CuratedToken)] = &[
    // Stablecoins
    ("0xdac17f958d2ee523a2206206994597c13d831ec7", token("USDT", "Tether USD", 6)),
    ("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", token("USDC", "USD Coin", 6)),
    ("0x6b175474e89094c44da98b954eedeac495271d0f", token("DAI", "Dai Stablecoin", 18)),
    ("0x4fabb145d64652a948d72533023f6e7a623c7c53", token("BUSD", "Binance USD", 18)),
    // Majors
    ("0x95ad61b0a150d79219dcf64e1e6cc01f0b64c4ce", token("SHIB", "SHIBA INU", 18)),
    ("0x2260fac5e5542a773aa44fbcfedf7c193bc2c599", token("WBTC", "Wrapped BTC", 8)),
    ("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2", token("WETH", "Wrapped Ether", 18)),
    ("0x1f9840a85d5af5bf1d1762f925bdaddc4201f984", token("UNI", "Uniswap", 18)),
    ("0x514910771af9ca656af840dff83e8264ecf986ca", token("LINK", "Chainlink", 18)),
    ("0x7d1afa7b718fb893db30a3abc0cfc608aacfebb0", token("MATIC", "Polygon", 18)),
    // DeFi
    ("0x7fc66500c84a76ad7e9c93437bfc5ac33e2ddae9", token("AAVE", "Aave Token", 18)),
    ("0xc00e94cb662c3520282e6f5717214004a7f26888", token("COMP", "Compound", 18)),
    ("0x9f8f72aa9304c8b593d555f12ef6589cc3a579a2", token("MKR", "Maker", 18)),
];

const BASE_TOKENS: &[(&str, CuratedToken)] = &[
    ("0x833589fcd6edb6e08f4c7c32d4f71b54bda02913", token("USDC", "USD Coin", 6)),
    ("0x50c5725949a6f0c72e6c4a641f24049a917db0cb", token("DAI", "Dai Stablecoin", 18)),
    ("0x4200000000000000000000000000000000000006", token("WETH", "Wrapped Ether", 18)),
    ("0x940181a94a35a4569e4529a3cdfb74e38fd98631", token("AERO", "Aerodrome Finance", 18)),
];

lazy_static! {
    static ref CURATED: HashMap<Network, HashMap<&'static str, CuratedToken>> = Network::ALL
        .iter()
        .map(|network| (*network, tokens_for(*network).iter().copied().collect()))
        .collect();
}

pub fn lookup(network: Network, token: &Address) -> Option<&'static CuratedToken> {
    CURATED.get(&network)?.get(token.as_str())
}

/// Every curated entry for a network, in declaration order
pub fn tokens_for(network: Network) -> &'static [(&'static str, CuratedToken)] {
    match network {
        Network::Ethereum => ETHEREUM_TOKENS,
        Network::Base => BASE_TOKENS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_key_is_a_valid_lowercase_address() {
        for network in Network::ALL {
            for (address, _) in tokens_for(network) {
                let parsed = Address::parse(address).unwrap();
                assert_eq!(parsed.as_str(), *address);
            }
        }
    }

    #[test]
    fn test_lookup_is_per_network() {
        let usdt = Address::parse("0xdAC17F958D2ee523a2206206994597C13D831ec7").unwrap();
        let found = lookup(Network::Ethereum, &usdt).unwrap();
        assert_eq!(found.symbol, "USDT");
        assert_eq!(found.decimals, 6);
        assert!(lookup(Network::Base, &usdt).is_none());

        let weth = Address::parse("0x4200000000000000000000000000000000000006").unwrap();
        assert_eq!(lookup(Network::Base, &weth).unwrap().symbol, "WETH");
    }
}
