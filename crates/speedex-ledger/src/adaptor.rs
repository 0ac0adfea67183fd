//! The ledger adaptor contract.
//!
//! Everything the exchange core needs from the persistent ledger, and nothing
//! more. Entries are returned by value: the core works on its own copies and
//! writes pools back explicitly, so no ledger handle is ever retained across
//! a transaction boundary.

use speedex_types::{AccountId, Asset, PoolClearing, PoolEntry, PoolId, Result, TrustlineAsset};

use crate::entries::{AccountEntry, TrustlineEntry};

/// Narrow interface between the exchange core and the ledger store.
///
/// Transactional semantics: [`begin`](Self::begin) opens a nested scope;
/// [`commit`](Self::commit) folds it into the enclosing scope;
/// [`rollback`](Self::rollback) discards every mutation since the matching
/// `begin`. Settlement brackets all its mutations in one scope so a rejected
/// batch leaves the ledger untouched.
pub trait LedgerAdaptor {
    /// Load a pool entry by id, or `None` if absent.
    fn load_pool(&self, pool_id: &PoolId) -> Option<PoolEntry>;

    /// Write back a (mutated) pool entry.
    ///
    /// # Errors
    /// `PoolMissing` if the pool was never created.
    fn store_pool(&mut self, entry: PoolEntry) -> Result<()>;

    /// Load an account entry, or `None` if absent.
    fn load_account(&self, account: &AccountId) -> Option<AccountEntry>;

    /// Load a trustline, or `None` if absent.
    fn load_trustline(&self, account: &AccountId, asset: &TrustlineAsset)
        -> Option<TrustlineEntry>;

    /// Balance of `account` in `asset` available for new commitments,
    /// accounting for liabilities. Zero for missing entries.
    fn available_balance(&self, account: &AccountId, asset: &Asset) -> i64 {
        match asset {
            Asset::Native => self
                .load_account(account)
                .map_or(0, |entry| entry.available_balance()),
            issued => self
                .load_trustline(account, &TrustlineAsset::Asset(issued.clone()))
                .map_or(0, |entry| entry.available_balance()),
        }
    }

    /// Append a pool clearing record to the ledger's output stream.
    fn append_clearing_record(&mut self, record: PoolClearing);

    /// Open a nested transaction scope.
    fn begin(&mut self);

    /// Fold the innermost scope into its parent.
    ///
    /// # Errors
    /// `NoActiveTransaction` without a matching `begin`.
    fn commit(&mut self) -> Result<()>;

    /// Discard every mutation made in the innermost scope.
    ///
    /// # Errors
    /// `NoActiveTransaction` without a matching `begin`.
    fn rollback(&mut self) -> Result<()>;
}
