//! Ledger entry types the exchange core reads.
//!
//! These mirror the persistent ledger's account and trustline records just
//! closely enough for admission checks and balance queries; everything else
//! about them belongs to the outer ledger system.

use serde::{Deserialize, Serialize};

use speedex_types::{constants, AccountId, TrustlineAsset};

/// An account's ledger state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountEntry {
    pub account_id: AccountId,
    /// Native balance.
    pub balance: i64,
    pub flags: u32,
    /// Native amount committed to open offers.
    pub selling_liabilities: i64,
}

impl AccountEntry {
    #[must_use]
    pub fn new(account_id: AccountId) -> Self {
        Self {
            account_id,
            balance: 0,
            flags: 0,
            selling_liabilities: 0,
        }
    }

    /// Whether this issuer opted into issuance-limited (commutative)
    /// semantics for its assets.
    #[must_use]
    pub fn is_issuance_limited(&self) -> bool {
        self.flags & constants::ACCOUNT_FLAG_ISSUANCE_LIMIT != 0
    }

    /// Native balance available for new commitments.
    #[must_use]
    pub fn available_balance(&self) -> i64 {
        (self.balance - self.selling_liabilities).max(0)
    }
}

/// A trustline's ledger state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustlineEntry {
    pub account_id: AccountId,
    pub asset: TrustlineAsset,
    pub balance: i64,
    pub limit: i64,
    pub flags: u32,
    /// Amount committed to open offers.
    pub selling_liabilities: i64,
}

impl TrustlineEntry {
    #[must_use]
    pub fn new(account_id: AccountId, asset: TrustlineAsset, limit: i64) -> Self {
        Self {
            account_id,
            asset,
            balance: 0,
            limit,
            flags: constants::TRUSTLINE_FLAG_AUTHORIZED,
            selling_liabilities: 0,
        }
    }

    #[must_use]
    pub fn is_authorized_to_maintain_liabilities(&self) -> bool {
        // Pool-share trustlines are implicitly authorized.
        if matches!(self.asset, TrustlineAsset::PoolShare(_)) {
            return true;
        }
        self.flags
            & (constants::TRUSTLINE_FLAG_AUTHORIZED
                | constants::TRUSTLINE_FLAG_AUTHORIZED_TO_MAINTAIN_LIABILITIES)
            != 0
    }

    /// A trustline qualifies for batch clearing when it can hold liabilities
    /// and its limit can never bind.
    #[must_use]
    pub fn is_commutative_tx_enabled(&self) -> bool {
        self.is_authorized_to_maintain_liabilities() && self.limit == i64::MAX
    }

    /// Balance available for new commitments.
    #[must_use]
    pub fn available_balance(&self) -> i64 {
        (self.balance - self.selling_liabilities).max(0)
    }
}

#[cfg(test)]
mod tests {
    use speedex_types::{Asset, PoolId};

    use super::*;

    fn acct(byte: u8) -> AccountId {
        AccountId([byte; 32])
    }

    #[test]
    fn issuance_limit_flag() {
        let mut entry = AccountEntry::new(acct(1));
        assert!(!entry.is_issuance_limited());
        entry.flags |= constants::ACCOUNT_FLAG_ISSUANCE_LIMIT;
        assert!(entry.is_issuance_limited());
    }

    #[test]
    fn account_available_balance_nets_liabilities() {
        let mut entry = AccountEntry::new(acct(1));
        entry.balance = 100;
        entry.selling_liabilities = 30;
        assert_eq!(entry.available_balance(), 70);

        entry.selling_liabilities = 200;
        assert_eq!(entry.available_balance(), 0);
    }

    #[test]
    fn commutative_trustline_needs_unbounded_limit() {
        let asset: TrustlineAsset = Asset::issued("USD", acct(9)).into();
        let capped = TrustlineEntry::new(acct(1), asset.clone(), 1_000_000);
        assert!(capped.is_authorized_to_maintain_liabilities());
        assert!(!capped.is_commutative_tx_enabled());

        let unbounded = TrustlineEntry::new(acct(1), asset, i64::MAX);
        assert!(unbounded.is_commutative_tx_enabled());
    }

    #[test]
    fn unauthorized_trustline_is_not_commutative() {
        let asset: TrustlineAsset = Asset::issued("USD", acct(9)).into();
        let mut entry = TrustlineEntry::new(acct(1), asset, i64::MAX);
        entry.flags = 0;
        assert!(!entry.is_commutative_tx_enabled());
    }

    #[test]
    fn pool_share_trustline_is_implicitly_authorized() {
        let mut entry = TrustlineEntry::new(
            acct(1),
            TrustlineAsset::PoolShare(PoolId([0; 32])),
            i64::MAX,
        );
        entry.flags = 0;
        assert!(entry.is_authorized_to_maintain_liabilities());
    }

    #[test]
    fn trustline_available_balance_nets_liabilities() {
        let asset: TrustlineAsset = Asset::issued("USD", acct(9)).into();
        let mut entry = TrustlineEntry::new(acct(1), asset, i64::MAX);
        entry.balance = 500;
        entry.selling_liabilities = 120;
        assert_eq!(entry.available_balance(), 380);
    }
}
