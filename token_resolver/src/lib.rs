//! Token metadata resolution.
//!
//! Sources are tried in a fixed order, first answer wins:
//!
//! 1. the curated token table
//! 2. the price aggregator's best pair
//! 3. `name()` / `symbol()` / `decimals()` read on-chain
//! 4. a synthetic `UNKNOWN_xxxxxx` record
//!
//! Results, pricing included, are cached per (network, address, pricing flag).

pub mod curated;
pub mod resolver;
pub mod tiers;

pub use curated::CuratedToken;
pub use resolver::{MetadataCacheKey, MetadataResolver, OnChainProbe, TokenDebugReport};
pub use tiers::{MetadataTier, OnChainReads, ProbeOutcome, TierHit};
