//! # Fee Engine
//!
//! Base fee (scheduler or rate limiter), volatility surcharge, the capped total
//! and its application to trade amounts.
//!
//! All numerators are fractions of `FEE_DENOMINATOR` (1e9). The total charged
//! on a trade never exceeds `MAX_FEE_NUMERATOR` (50%).

pub mod dynamic;
pub mod params;
pub mod rate_limiter;
pub mod scheduler;

pub use dynamic::*;
pub use params::*;
pub use scheduler::fee_in_period;

use crate::constants::{
    BASIS_POINT_MAX, FEE_DENOMINATOR, HOST_FEE_PERCENT, MAX_FEE_NUMERATOR, PROTOCOL_FEE_PERCENT,
};
use crate::errors::{ConfigViolation, CoreResult, CurveLaunchError};
use crate::math::big_int::{mul_div_u64, Rounding};
use crate::math::safe_math::{safe_percentage_u64, SafeMath};
use crate::types::config::ActivationType;
use crate::types::fees::{
    BaseFeeMode, BaseFeeSchedule, CollectFeeMode, FeeBreakdown, PoolFees, TradeDirection,
    VolatilityTracker,
};

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

/// Behaviour shared by the fee scheduler and the rate limiter
pub trait BaseFeeHandler {
    /// Check the schedule's factors and fee bounds
    fn validate(
        &self,
        collect_fee_mode: CollectFeeMode,
        activation_type: ActivationType,
    ) -> Result<(), ConfigViolation>;

    /// Lowest numerator the schedule can charge
    fn min_base_fee_numerator(&self) -> CoreResult<u64>;

    /// Numerator for a trade whose fee-inclusive input is known
    fn numerator_from_included_amount(
        &self,
        current_point: u64,
        activation_point: u64,
        direction: TradeDirection,
        included_amount: u64,
    ) -> CoreResult<u64>;

    /// Numerator for a trade whose post-fee amount is known
    fn numerator_from_excluded_amount(
        &self,
        current_point: u64,
        activation_point: u64,
        direction: TradeDirection,
        excluded_amount: u64,
    ) -> CoreResult<u64>;
}

/// Pick the handler matching the schedule's mode
pub fn base_fee_handler(schedule: &BaseFeeSchedule) -> Box<dyn BaseFeeHandler> {
    match schedule.base_fee_mode {
        BaseFeeMode::FeeSchedulerLinear | BaseFeeMode::FeeSchedulerExponential => {
            Box::new(schedule.as_scheduler())
        }
        BaseFeeMode::RateLimiter => Box::new(schedule.as_rate_limiter()),
    }
}

/// Convert basis points to a fee numerator
pub fn bps_to_fee_numerator(bps: u64) -> CoreResult<u64> {
    mul_div_u64(bps, FEE_DENOMINATOR, BASIS_POINT_MAX, Rounding::Down)
}

// ============================================================================
// Applying Fees
// ============================================================================

/// An amount with its fee removed and the fee split
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct FeeOnAmountResult {
    /// Amount left after the fee
    pub amount: u64,
    pub fee: FeeBreakdown,
}

/// Split a charged fee between pool, protocol and referrer
///
/// The protocol takes 20% of the fee; a referrer takes 20% of the protocol share.
pub fn split_fees(total_fee: u64, has_referral: bool) -> CoreResult<FeeBreakdown> {
    let protocol_share = safe_percentage_u64(total_fee, PROTOCOL_FEE_PERCENT)?;
    let trading_fee = total_fee.safe_sub(protocol_share)?;
    let referral_fee = if has_referral {
        safe_percentage_u64(protocol_share, HOST_FEE_PERCENT)?
    } else {
        0
    };
    let protocol_fee = protocol_share.safe_sub(referral_fee)?;
    Ok(FeeBreakdown {
        trading_fee,
        protocol_fee,
        referral_fee,
    })
}

/// Post-fee amount and fee for a fee-inclusive amount
pub fn excluded_fee_amount(included_amount: u64, fee_numerator: u64) -> CoreResult<(u64, u64)> {
    let fee = mul_div_u64(included_amount, fee_numerator, FEE_DENOMINATOR, Rounding::Up)?;
    Ok((included_amount.safe_sub(fee)?, fee))
}

/// Fee-inclusive amount and fee needed to leave `excluded_amount` after the fee
///
/// Fails with `UndeterminedFee` when charging the result forward does not give
/// back at least `excluded_amount`.
pub fn included_fee_amount(excluded_amount: u64, fee_numerator: u64) -> CoreResult<(u64, u64)> {
    let denominator = FEE_DENOMINATOR.safe_sub(fee_numerator)?;
    let included = mul_div_u64(excluded_amount, FEE_DENOMINATOR, denominator, Rounding::Up)?;
    let fee = included.safe_sub(excluded_amount)?;

    let (forward, _) = excluded_fee_amount(included, fee_numerator)?;
    if forward < excluded_amount {
        return Err(CurveLaunchError::UndeterminedFee);
    }
    Ok((included, fee))
}

/// Charge `fee_numerator` on `amount` and split the fee
pub fn fee_on_amount(amount: u64, fee_numerator: u64, has_referral: bool) -> CoreResult<FeeOnAmountResult> {
    let (amount, total_fee) = excluded_fee_amount(amount, fee_numerator)?;
    Ok(FeeOnAmountResult {
        amount,
        fee: split_fees(total_fee, has_referral)?,
    })
}

// ============================================================================
// Total Fee
// ============================================================================

/// Cap a base + surcharge sum at the maximum fee
pub fn total_fee_numerator(base_fee_numerator: u64, dynamic_fee_numerator: u64) -> u64 {
    base_fee_numerator
        .saturating_add(dynamic_fee_numerator)
        .min(MAX_FEE_NUMERATOR)
}

impl PoolFees {
    /// Total numerator for a trade with a known fee-inclusive input
    pub fn total_numerator_from_included_amount(
        &self,
        tracker: &VolatilityTracker,
        current_point: u64,
        activation_point: u64,
        direction: TradeDirection,
        included_amount: u64,
    ) -> CoreResult<u64> {
        let base = base_fee_handler(&self.base_fee).numerator_from_included_amount(
            current_point,
            activation_point,
            direction,
            included_amount,
        )?;
        let dynamic = dynamic_fee_numerator(&self.dynamic_fee, tracker)?;
        Ok(total_fee_numerator(base, dynamic))
    }

    /// Total numerator for a trade with a known post-fee amount
    pub fn total_numerator_from_excluded_amount(
        &self,
        tracker: &VolatilityTracker,
        current_point: u64,
        activation_point: u64,
        direction: TradeDirection,
        excluded_amount: u64,
    ) -> CoreResult<u64> {
        let base = base_fee_handler(&self.base_fee).numerator_from_excluded_amount(
            current_point,
            activation_point,
            direction,
            excluded_amount,
        )?;
        let dynamic = dynamic_fee_numerator(&self.dynamic_fee, tracker)?;
        Ok(total_fee_numerator(base, dynamic))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_rounds_up() {
        // 1% of 101 is 1.01, charged as 2
        let result = fee_on_amount(101, 10_000_000, false).unwrap();
        assert_eq!(result.fee.total(), 2);
        assert_eq!(result.amount, 99);
    }

    #[test]
    fn test_fee_split() {
        let split = split_fees(1_000, false).unwrap();
        assert_eq!(split, FeeBreakdown { trading_fee: 800, protocol_fee: 200, referral_fee: 0 });

        let split = split_fees(1_000, true).unwrap();
        assert_eq!(split, FeeBreakdown { trading_fee: 800, protocol_fee: 160, referral_fee: 40 });
        assert_eq!(split.total(), 1_000);

        // Shares round down in favour of the pool
        let split = split_fees(9, true).unwrap();
        assert_eq!(split, FeeBreakdown { trading_fee: 8, protocol_fee: 1, referral_fee: 0 });
    }

    #[test]
    fn test_included_excluded_inverse() {
        for (excluded, numerator) in [(1_000_000u64, 10_000_000u64), (999, 250_000_000), (1, 500_000_000)] {
            let (included, fee) = included_fee_amount(excluded, numerator).unwrap();
            assert_eq!(included - fee, excluded);
            let (forward, _) = excluded_fee_amount(included, numerator).unwrap();
            assert!(forward >= excluded);
        }
        assert_eq!(included_fee_amount(100, 0).unwrap(), (100, 0));
    }

    #[test]
    fn test_total_fee_capped() {
        assert_eq!(total_fee_numerator(10_000_000, 2_000_000), 12_000_000);
        assert_eq!(total_fee_numerator(450_000_000, 100_000_000), MAX_FEE_NUMERATOR);
        assert_eq!(total_fee_numerator(u64::MAX, u64::MAX), MAX_FEE_NUMERATOR);
    }

    #[test]
    fn test_pool_fees_dispatch() {
        let fees = PoolFees {
            base_fee: BaseFeeSchedule {
                cliff_fee_numerator: 10_000_000,
                base_fee_mode: BaseFeeMode::RateLimiter,
                first_factor: 10,
                second_factor: 100,
                third_factor: 1_000_000_000,
            },
            ..Default::default()
        };
        let tracker = VolatilityTracker::default();
        let limited = fees
            .total_numerator_from_included_amount(&tracker, 0, 0, TradeDirection::QuoteToBase, 2_000_000_000)
            .unwrap();
        assert_eq!(limited, 10_500_000);
        let selling = fees
            .total_numerator_from_included_amount(&tracker, 0, 0, TradeDirection::BaseToQuote, 2_000_000_000)
            .unwrap();
        assert_eq!(selling, 10_000_000);
    }
}
