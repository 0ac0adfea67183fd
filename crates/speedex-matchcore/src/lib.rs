//! # speedex-matchcore
//!
//! **Pure compute plane for the Speedex batch auction.**
//!
//! MatchCore answers the price-indexed questions the clearing engine asks --
//! how much does each orderbook and each pool offer at a candidate price
//! vector, and do the aggregates balance. It has:
//!
//! - **Zero side effects**: no ledger access, no balance checks
//! - **Deterministic output**: same input -> same output on every node
//! - **Exact arithmetic**: all wide intermediates in 128-bit integers,
//!   rounding always against the quoted commitment
//!
//! Settlement application (reserve mutation, fills, record emission) lives in
//! `speedex-core`; this crate only validates and quotes.

pub mod clearing;
pub mod digest;
pub mod math;
pub mod orderbook;
pub mod pool;

pub use clearing::{
    active_pairs, evaluate_feasibility, pair_prices, pair_sell_values, AssetFlow,
    FeasibilityReport, PairValues, PriceVector,
};
pub use digest::{compute_clearing_digest, verify_clearing_digest};
pub use orderbook::{IocOrderbook, PriceCompStats};
pub use pool::PoolFrame;
