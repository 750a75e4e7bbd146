//! DexScreener access for token pricing.
//!
//! `DexScreenerClient` fetches the raw pairs for a token; `PriceSource` picks
//! the most liquid pair on the requested chain and caches the derived quote.

pub mod dexscreener_client;
pub mod price_source;
pub mod types;

pub use config_manager::DexScreenerConfig;

pub use dexscreener_client::{DexScreenerClient, DexScreenerError, PairFetcher};
pub use price_source::{build_quote, select_best_pair, token_side, PriceSource};
pub use types::{Liquidity, PairToken, PeriodValues, TokenPair, TokenPairsResponse};
