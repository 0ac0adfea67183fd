//! System-wide constants for the Speedex exchange core.

/// Denominator of all fee rates: fees are expressed in basis points.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Maximum representable fee (100%).
pub const MAX_FEE_BPS: u32 = 10_000;

/// Fee tier of constant-product pools in the canonical deployment (30 bps).
pub const LIQUIDITY_POOL_FEE_BPS: u32 = 30;

/// Shift applied when weighting sell amounts by their own price, so that
/// weighted sums accumulate losslessly in 128-bit integers.
pub const PRICE_Q32_SHIFT: u32 = 32;

/// Account flag: the issuer has opted into issuance-limited (commutative)
/// semantics for its assets.
pub const ACCOUNT_FLAG_ISSUANCE_LIMIT: u32 = 0x10;

/// Trustline flag: fully authorized.
pub const TRUSTLINE_FLAG_AUTHORIZED: u32 = 0x1;

/// Trustline flag: authorized to maintain liabilities.
pub const TRUSTLINE_FLAG_AUTHORIZED_TO_MAINTAIN_LIABILITIES: u32 = 0x2;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Speedex";
