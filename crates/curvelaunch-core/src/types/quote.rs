//! # Quote Types
//!
//! Ledger snapshot a quote is computed against, and the quote itself.

use crate::types::fees::{FeeBreakdown, TradeDirection, VolatilityTracker};

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

/// Snapshot of a pool's ledger at quote time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct PoolState {
    pub sqrt_price: u128,
    pub base_reserve: u64,
    pub quote_reserve: u64,
    /// Slot or timestamp the pool opened at (see `ActivationType`)
    pub activation_point: u64,
    pub volatility_tracker: VolatilityTracker,
}

/// Quote for a single swap
///
/// For exact-in quotes `amount_in` is the request and `maximum_amount_in`
/// equals it. For exact-out quotes `amount_out` is the request and
/// `minimum_amount_out` equals it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct SwapQuote {
    pub direction: TradeDirection,
    pub amount_in: u64,
    pub amount_out: u64,
    pub minimum_amount_out: u64,
    pub maximum_amount_in: u64,
    /// Total fee numerator applied (of 1e9)
    pub fee_numerator: u64,
    pub fee: FeeBreakdown,
    pub sqrt_price_before: u128,
    pub sqrt_price_after: u128,
}
