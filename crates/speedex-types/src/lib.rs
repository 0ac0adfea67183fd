//! # speedex-types
//!
//! Shared types, errors, and configuration for the **Speedex** batch-auction
//! exchange core.
//!
//! This crate is the leaf dependency of the workspace -- every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`PoolId`]
//! - **Assets**: [`Asset`], [`TrustlineAsset`], [`AssetPair`]
//! - **Prices**: [`Price`] -- an unnormalized rational compared by 128-bit
//!   cross-multiplication
//! - **Offers**: [`IocOffer`] with its deterministic total order
//! - **Pools**: [`PoolEntry`] -- a constant-product pool's reserves and fee
//! - **Clearing records**: [`PoolClearing`], [`OfferClearing`]
//! - **Configuration**: [`SpeedexConfig`]
//! - **Errors**: [`SpeedexError`] with `SPX_ERR_` prefix codes
//! - **Constants**: fee denominators, flags, and defaults

pub mod asset;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod offer;
pub mod pool;
pub mod price;
pub mod record;

// Re-export all primary types at crate root for ergonomic imports:
//   use speedex_types::{Asset, AssetPair, IocOffer, Price, ...};

pub use asset::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use offer::*;
pub use pool::*;
pub use price::*;
pub use record::*;

// Constants are accessed via `speedex_types::constants::FOO`
// (not re-exported to avoid name collisions).
