//! In-memory ledger with nested transaction scopes.
//!
//! [`MemoryLedger`] keeps all state in `BTreeMap`s (deterministic iteration)
//! and implements the transactional contract with a snapshot stack: `begin`
//! pushes a copy of the state, `rollback` restores it, `commit` discards it.
//! This is the test double for the whole workspace and the reference backend
//! for settlement runs.

use std::collections::BTreeMap;

use speedex_types::{
    AccountId, PoolClearing, PoolEntry, PoolId, Result, SpeedexError, TrustlineAsset,
};

use crate::adaptor::LedgerAdaptor;
use crate::entries::{AccountEntry, TrustlineEntry};

#[derive(Debug, Clone, Default)]
struct LedgerState {
    accounts: BTreeMap<AccountId, AccountEntry>,
    trustlines: BTreeMap<(AccountId, TrustlineAsset), TrustlineEntry>,
    pools: BTreeMap<PoolId, PoolEntry>,
    clearing_records: Vec<PoolClearing>,
}

/// Snapshot-stack ledger; see the module docs.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    state: LedgerState,
    snapshots: Vec<LedgerState>,
}

impl MemoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =================================================================
    // Setup helpers (genesis state for tests and tools)
    // =================================================================

    /// Create an account with the given native balance and flags.
    pub fn create_account(&mut self, account: AccountId, balance: i64, flags: u32) {
        let mut entry = AccountEntry::new(account);
        entry.balance = balance;
        entry.flags = flags;
        self.state.accounts.insert(account, entry);
    }

    /// Create a trustline with the given balance, limit and flags.
    pub fn create_trustline(
        &mut self,
        account: AccountId,
        asset: TrustlineAsset,
        balance: i64,
        limit: i64,
        flags: u32,
    ) {
        let mut entry = TrustlineEntry::new(account, asset.clone(), limit);
        entry.balance = balance;
        entry.flags = flags;
        self.state.trustlines.insert((account, asset), entry);
    }

    /// Create a pool; returns its derived id.
    pub fn create_pool(&mut self, entry: PoolEntry) -> PoolId {
        let id = entry.pool_id;
        self.state.pools.insert(id, entry);
        id
    }

    /// Clearing records appended so far, in append order.
    #[must_use]
    pub fn clearing_records(&self) -> &[PoolClearing] {
        &self.state.clearing_records
    }

    /// Depth of the open transaction-scope stack.
    #[must_use]
    pub fn scope_depth(&self) -> usize {
        self.snapshots.len()
    }
}

impl LedgerAdaptor for MemoryLedger {
    fn load_pool(&self, pool_id: &PoolId) -> Option<PoolEntry> {
        self.state.pools.get(pool_id).cloned()
    }

    fn store_pool(&mut self, entry: PoolEntry) -> Result<()> {
        match self.state.pools.get_mut(&entry.pool_id) {
            Some(existing) => {
                *existing = entry;
                Ok(())
            }
            None => Err(SpeedexError::PoolMissing(entry.pool_id)),
        }
    }

    fn load_account(&self, account: &AccountId) -> Option<AccountEntry> {
        self.state.accounts.get(account).cloned()
    }

    fn load_trustline(
        &self,
        account: &AccountId,
        asset: &TrustlineAsset,
    ) -> Option<TrustlineEntry> {
        self.state
            .trustlines
            .get(&(*account, asset.clone()))
            .cloned()
    }

    fn append_clearing_record(&mut self, record: PoolClearing) {
        self.state.clearing_records.push(record);
    }

    fn begin(&mut self) {
        self.snapshots.push(self.state.clone());
    }

    fn commit(&mut self) -> Result<()> {
        self.snapshots
            .pop()
            .map(|_| ())
            .ok_or(SpeedexError::NoActiveTransaction)
    }

    fn rollback(&mut self) -> Result<()> {
        match self.snapshots.pop() {
            Some(snapshot) => {
                self.state = snapshot;
                Ok(())
            }
            None => Err(SpeedexError::NoActiveTransaction),
        }
    }
}
