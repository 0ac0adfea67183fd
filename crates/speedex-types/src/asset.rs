//! Asset identifiers and trading pairs.
//!
//! Assets carry a derived total order; a trading pair is canonical when its
//! selling asset sorts before its buying asset. All cross-pair containers key
//! on these orderings, never on hash iteration order.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{AccountId, PoolId};

// ---------------------------------------------------------------------------
// Asset
// ---------------------------------------------------------------------------

/// A tradable asset: either the native asset or one issued by an account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Asset {
    Native,
    Issued { code: String, issuer: AccountId },
}

impl Asset {
    #[must_use]
    pub fn issued(code: impl Into<String>, issuer: AccountId) -> Self {
        Self::Issued {
            code: code.into(),
            issuer,
        }
    }

    /// The issuer account, or `None` for the native asset.
    #[must_use]
    pub fn issuer(&self) -> Option<&AccountId> {
        match self {
            Self::Native => None,
            Self::Issued { issuer, .. } => Some(issuer),
        }
    }

    /// Stable byte encoding used for pool-id derivation and clearing digests.
    #[must_use]
    pub fn canonical_bytes(&self) -> Vec<u8> {
        match self {
            Self::Native => vec![0u8],
            Self::Issued { code, issuer } => {
                let mut out = Vec::with_capacity(1 + 8 + code.len() + 32);
                out.push(1u8);
                out.extend_from_slice(&(code.len() as u64).to_le_bytes());
                out.extend_from_slice(code.as_bytes());
                out.extend_from_slice(issuer.as_bytes());
                out
            }
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "native"),
            Self::Issued { code, issuer } => write!(f, "{}:{}", code, issuer.short()),
        }
    }
}

// ---------------------------------------------------------------------------
// TrustlineAsset
// ---------------------------------------------------------------------------

/// An asset as referenced by a trustline.
///
/// Trustlines can additionally hold pool shares; pool shares are never
/// commutative and therefore never tradable on Speedex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum TrustlineAsset {
    Asset(Asset),
    PoolShare(PoolId),
}

impl TrustlineAsset {
    /// The plain asset behind this trustline, or `None` for a pool share.
    #[must_use]
    pub fn as_asset(&self) -> Option<&Asset> {
        match self {
            Self::Asset(asset) => Some(asset),
            Self::PoolShare(_) => None,
        }
    }
}

impl From<Asset> for TrustlineAsset {
    fn from(asset: Asset) -> Self {
        Self::Asset(asset)
    }
}

// ---------------------------------------------------------------------------
// AssetPair
// ---------------------------------------------------------------------------

/// A directed trading pair: `selling` is exchanged for `buying`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AssetPair {
    pub selling: Asset,
    pub buying: Asset,
}

impl AssetPair {
    #[must_use]
    pub fn new(selling: Asset, buying: Asset) -> Self {
        Self { selling, buying }
    }

    /// Whether the pair is in canonical orientation (`selling < buying`).
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        self.selling < self.buying
    }

    /// The same two assets in canonical order, direction forgotten.
    #[must_use]
    pub fn canonical_assets(&self) -> (&Asset, &Asset) {
        if self.is_canonical() {
            (&self.selling, &self.buying)
        } else {
            (&self.buying, &self.selling)
        }
    }

    /// The reverse direction of this pair.
    #[must_use]
    pub fn flipped(&self) -> Self {
        Self {
            selling: self.buying.clone(),
            buying: self.selling.clone(),
        }
    }
}

impl fmt::Display for AssetPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.selling, self.buying)
    }
}
