//! Commutativity requirements.
//!
//! Batch operations must be order-independent. Before clearing runs, every
//! offer-creating operation registers its maximum potential debit here; an
//! owner's registrations in one asset may never exceed that owner's available
//! balance at batch start. An operation that would breach the bound (or
//! overflow the running total) is aborted at admission -- the batch continues
//! without it.

use std::collections::BTreeMap;

use speedex_ledger::LedgerAdaptor;
use speedex_types::{AccountId, Asset, Result, SpeedexError, TrustlineAsset};

/// Running totals of maximum potential debits, keyed by (owner, asset).
#[derive(Debug, Default)]
pub struct CommutativityRequirements {
    totals: BTreeMap<(AccountId, Asset), i64>,
}

impl CommutativityRequirements {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `account` holds a batch-clearing-eligible position in `asset`:
    /// for issued assets a commutative-enabled trustline, for the native
    /// asset just an existing account.
    pub fn check_trustline<L: LedgerAdaptor>(
        &self,
        ledger: &L,
        account: &AccountId,
        asset: &Asset,
    ) -> bool {
        match asset {
            Asset::Native => ledger.load_account(account).is_some(),
            issued => ledger
                .load_trustline(account, &TrustlineAsset::Asset(issued.clone()))
                .is_some_and(|line| line.is_commutative_tx_enabled()),
        }
    }

    /// Register a maximum potential debit of `amount` in `asset`.
    ///
    /// # Errors
    /// `RequirementOverflow` if the running total overflows `i64`;
    /// `InsufficientBalance` if the total would exceed the owner's available
    /// balance at batch start. Either failure aborts only the registering
    /// operation.
    pub fn add_asset_requirement<L: LedgerAdaptor>(
        &mut self,
        ledger: &L,
        account: AccountId,
        asset: &Asset,
        amount: i64,
    ) -> Result<()> {
        let key = (account, asset.clone());
        let current = self.totals.get(&key).copied().unwrap_or(0);
        let total = current
            .checked_add(amount)
            .ok_or_else(|| SpeedexError::RequirementOverflow {
                account,
                asset: asset.clone(),
            })?;

        let available = ledger.available_balance(&account, asset);
        if total > available {
            return Err(SpeedexError::InsufficientBalance {
                account,
                asset: asset.clone(),
                required: total,
                available,
            });
        }

        self.totals.insert(key, total);
        Ok(())
    }

    /// The registered total for (owner, asset); zero if none.
    #[must_use]
    pub fn total_for(&self, account: &AccountId, asset: &Asset) -> i64 {
        self.totals
            .get(&(*account, asset.clone()))
            .copied()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Re-check every registered total against the ledger. Used as a
    /// seal-time assurance that admission-time balances still hold.
    pub fn validate<L: LedgerAdaptor>(&self, ledger: &L) -> Result<()> {
        for ((account, asset), total) in &self.totals {
            let available = ledger.available_balance(account, asset);
            if *total > available {
                return Err(SpeedexError::InsufficientBalance {
                    account: *account,
                    asset: asset.clone(),
                    required: *total,
                    available,
                });
            }
        }
        Ok(())
    }
}
