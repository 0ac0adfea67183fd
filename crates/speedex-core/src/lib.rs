//! # speedex-core
//!
//! **Batch plane for the Speedex batch-auction exchange.**
//!
//! One batch runs: admission -> seal -> clearing.
//!
//! - [`admission`]: the `createSpeedexIOCOffer` operation with its op-level
//!   result codes; malformed input never rejects the batch
//! - [`commutativity`]: pre-batch registration of each offer's maximum
//!   potential debit, so unordered execution stays safe
//! - [`batch`]: [`SpeedexBatch`] -- owns the per-pair orderbooks between
//!   admission and clearing
//! - [`settlement`]: applies a committed price vector -- pool transfers,
//!   offer fills, clearing records -- inside one ledger transaction scope
//!
//! The batch is single-threaded by construction: it owns its orderbooks
//! exclusively, and settlement holds the only live pool copies.

pub mod admission;
pub mod batch;
pub mod commutativity;
pub mod settlement;

pub use admission::{is_commutative_tx_enabled_asset, CreateIocOfferOp, OfferResultCode};
pub use batch::SpeedexBatch;
pub use commutativity::CommutativityRequirements;
pub use settlement::{clear_batch, BatchClearingOutcome};
