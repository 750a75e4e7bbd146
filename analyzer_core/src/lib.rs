//! Core types for the wallet token analyzer.
//!
//! Everything here is free of network access: the address rules, the domain
//! records passed between the explorer, DexScreener and the scanner, the TTL
//! cache shared by the resolvers, and the provider traits they plug into.

pub mod abi;
pub mod address;
pub mod cache;
pub mod format;
pub mod models;
pub mod network;
pub mod traits;

pub use address::{
    json_string_list, parse_address_input, validate_addresses, validate_json, Address,
    AddressValidation, ValidationSummary,
};
pub use cache::{CacheStats, Clock, ManualClock, SystemClock, TtlCache};
pub use format::{calculate_usd_value, format_token_balance, format_usd_value};
pub use models::{
    AnalysisCounts, AnalysisReport, BalanceResult, MetadataSource, PriceQuote, TokenHolding,
    TokenMetadata, WalletCategory, WalletOutcome,
};
pub use network::Network;
pub use traits::{BalanceProvider, ContractReader, PriceProvider};

use thiserror::Error;

/// A single upstream call failed or returned nothing usable.
///
/// Always recovered by the caller; it never reaches the analysis report.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("API error: {0}")]
    Api(String),
    #[error("JSON parsing failed: {0}")]
    Json(String),
    #[error("{0}")]
    NoData(String),
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Malformed or over-limit analysis request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("Max {max_wallets} wallets and {max_tokens} tokens allowed (got {wallets} wallets, {tokens} tokens)")]
    TooManyAddresses {
        wallets: usize,
        tokens: usize,
        max_wallets: usize,
        max_tokens: usize,
    },
    #[error("Invalid addresses found: {} wallets, {} tokens", invalid_wallets.len(), invalid_tokens.len())]
    InvalidAddresses {
        invalid_wallets: Vec<String>,
        invalid_tokens: Vec<String>,
    },
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Unsupported network: {0}")]
    UnsupportedNetwork(String),
}

/// A wallet's whole scan raised; recorded on its outcome.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WalletError {
    #[error("Wallet scan panicked: {0}")]
    Panicked(String),
}
