//! # speedex-ledger
//!
//! **The ledger contract the Speedex core consumes.**
//!
//! The exchange core never talks to a database: it loads pool entries, reads
//! account and trustline state, appends clearing records, and brackets
//! settlement in a nested transaction scope -- all through the narrow
//! [`LedgerAdaptor`] trait defined here.
//!
//! - [`entries`]: the ledger entry types the core reads ([`AccountEntry`],
//!   [`TrustlineEntry`]) and their flag helpers
//! - [`adaptor`]: the [`LedgerAdaptor`] contract
//! - [`memory`]: [`MemoryLedger`], a snapshot-stack implementation used by
//!   tests and reference settlement runs

pub mod adaptor;
pub mod entries;
pub mod memory;

pub use adaptor::LedgerAdaptor;
pub use entries::{AccountEntry, TrustlineEntry};
pub use memory::MemoryLedger;
