//! # Quote Engine
//!
//! Answers swap queries against a validated pool: curve traversal plus the fee
//! charged on whichever side of the trade the fee mode selects.
//!
//! ## Fee placement
//!
//! Fees sit on the input only for quote-to-base trades under quote-token
//! collection. Every other combination charges the output.
//!
//! - Exact in, fee on input: fee first, then traverse the remainder
//! - Exact in, fee on output: traverse, then take the fee from the output
//! - Exact out, fee on input: inverse traversal, then gross the input up
//! - Exact out, fee on output: gross the output up, then inverse traversal

use crate::constants::BASIS_POINT_MAX;
use crate::curve::swap::{
    traverse_from_base, traverse_from_base_for_output, traverse_from_quote,
    traverse_from_quote_for_output, TraversalResult,
};
use crate::errors::{CoreResult, CurveLaunchError};
use crate::fee::{fee_on_amount, included_fee_amount, split_fees};
use crate::math::big_int::{mul_div_u64, Rounding};
use crate::types::fees::{FeeMode, TradeDirection};
use crate::types::quote::{PoolState, SwapQuote};
use crate::validation::ValidatedPoolConfig;

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

/// A swap to quote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct SwapRequest {
    pub direction: TradeDirection,
    /// Input for exact-in requests, output for exact-out requests
    pub amount: u64,
    pub has_referral: bool,
    /// Slot or timestamp the trade happens at
    pub current_point: u64,
    /// Tolerance applied to the minimum output or maximum input
    pub slippage_bps: Option<u16>,
}

/// Reserve the pool pays `direction`'s output from
fn output_reserve(state: &PoolState, direction: TradeDirection) -> u64 {
    if direction.is_base_for_quote() {
        state.quote_reserve
    } else {
        state.base_reserve
    }
}

/// Reject completed pools, then zero amounts
fn check_tradable(config: &ValidatedPoolConfig, state: &PoolState, amount: u64) -> CoreResult<()> {
    if state.quote_reserve >= config.migration_quote_threshold {
        return Err(CurveLaunchError::PoolCompleted);
    }
    if amount == 0 {
        return Err(CurveLaunchError::AmountIsZero);
    }
    Ok(())
}

fn traverse_exact_in(
    config: &ValidatedPoolConfig,
    state: &PoolState,
    direction: TradeDirection,
    amount_in: u64,
) -> CoreResult<TraversalResult> {
    match direction {
        TradeDirection::BaseToQuote => traverse_from_base(&config.curve, state.sqrt_price, amount_in),
        TradeDirection::QuoteToBase => traverse_from_quote(&config.curve, state.sqrt_price, amount_in),
    }
}

fn traverse_exact_out(
    config: &ValidatedPoolConfig,
    state: &PoolState,
    direction: TradeDirection,
    amount_out: u64,
) -> CoreResult<TraversalResult> {
    match direction {
        TradeDirection::BaseToQuote => {
            traverse_from_base_for_output(&config.curve, state.sqrt_price, amount_out)
        }
        TradeDirection::QuoteToBase => {
            traverse_from_quote_for_output(&config.curve, state.sqrt_price, amount_out)
        }
    }
}

/// Apply a slippage tolerance to a minimum output
pub fn minimum_amount_out(amount_out: u64, slippage_bps: Option<u16>) -> CoreResult<u64> {
    match slippage_bps {
        None => Ok(amount_out),
        Some(bps) => {
            let keep = BASIS_POINT_MAX.saturating_sub(bps as u64);
            mul_div_u64(amount_out, keep, BASIS_POINT_MAX, Rounding::Down)
        }
    }
}

/// Apply a slippage tolerance to a maximum input
pub fn maximum_amount_in(amount_in: u64, slippage_bps: Option<u16>) -> CoreResult<u64> {
    match slippage_bps {
        None => Ok(amount_in),
        Some(bps) => {
            mul_div_u64(amount_in, BASIS_POINT_MAX + bps as u64, BASIS_POINT_MAX, Rounding::Up)
        }
    }
}

/// Quote a swap of exactly `request.amount` in
pub fn quote_exact_in(
    config: &ValidatedPoolConfig,
    state: &PoolState,
    request: &SwapRequest,
) -> CoreResult<SwapQuote> {
    let amount_in = request.amount;
    check_tradable(config, state, amount_in)?;

    let fee_mode = FeeMode::new(config.collect_fee_mode, request.direction, request.has_referral);
    let fee_numerator = config.pool_fees.total_numerator_from_included_amount(
        &state.volatility_tracker,
        request.current_point,
        state.activation_point,
        request.direction,
        amount_in,
    )?;

    let (traversal, amount_out, fee) = if fee_mode.fees_on_input {
        let charged = fee_on_amount(amount_in, fee_numerator, fee_mode.has_referral)?;
        let traversal = traverse_exact_in(config, state, request.direction, charged.amount)?;
        (traversal, traversal.amount, charged.fee)
    } else {
        let traversal = traverse_exact_in(config, state, request.direction, amount_in)?;
        let charged = fee_on_amount(traversal.amount, fee_numerator, fee_mode.has_referral)?;
        (traversal, charged.amount, charged.fee)
    };

    if traversal.amount > output_reserve(state, request.direction) {
        return Err(CurveLaunchError::InsufficientLiquidity);
    }

    log::debug!(
        "Exact-in {:?}: {} in, {} out, fee {} (numerator {}), price {} -> {}",
        request.direction,
        amount_in,
        amount_out,
        fee.total(),
        fee_numerator,
        state.sqrt_price,
        traversal.next_sqrt_price
    );

    Ok(SwapQuote {
        direction: request.direction,
        amount_in,
        amount_out,
        minimum_amount_out: minimum_amount_out(amount_out, request.slippage_bps)?,
        maximum_amount_in: amount_in,
        fee_numerator,
        fee,
        sqrt_price_before: state.sqrt_price,
        sqrt_price_after: traversal.next_sqrt_price,
    })
}

/// Quote the input needed to receive exactly `request.amount` out
pub fn quote_exact_out(
    config: &ValidatedPoolConfig,
    state: &PoolState,
    request: &SwapRequest,
) -> CoreResult<SwapQuote> {
    let amount_out = request.amount;
    check_tradable(config, state, amount_out)?;

    let fee_mode = FeeMode::new(config.collect_fee_mode, request.direction, request.has_referral);
    let reserve = output_reserve(state, request.direction);

    let (traversal, amount_in, fee_numerator, total_fee) = if fee_mode.fees_on_input {
        if amount_out > reserve {
            return Err(CurveLaunchError::InsufficientLiquidity);
        }
        let traversal = traverse_exact_out(config, state, request.direction, amount_out)?;
        let fee_numerator = config.pool_fees.total_numerator_from_excluded_amount(
            &state.volatility_tracker,
            request.current_point,
            state.activation_point,
            request.direction,
            traversal.amount,
        )?;
        let (amount_in, fee) = included_fee_amount(traversal.amount, fee_numerator)?;
        (traversal, amount_in, fee_numerator, fee)
    } else {
        let fee_numerator = config.pool_fees.total_numerator_from_excluded_amount(
            &state.volatility_tracker,
            request.current_point,
            state.activation_point,
            request.direction,
            amount_out,
        )?;
        let (gross_out, fee) = included_fee_amount(amount_out, fee_numerator)?;
        if gross_out > reserve {
            return Err(CurveLaunchError::InsufficientLiquidity);
        }
        let traversal = traverse_exact_out(config, state, request.direction, gross_out)?;
        (traversal, traversal.amount, fee_numerator, fee)
    };

    let fee = split_fees(total_fee, fee_mode.has_referral)?;
    log::debug!(
        "Exact-out {:?}: {} out, {} in, fee {} (numerator {}), price {} -> {}",
        request.direction,
        amount_out,
        amount_in,
        total_fee,
        fee_numerator,
        state.sqrt_price,
        traversal.next_sqrt_price
    );

    Ok(SwapQuote {
        direction: request.direction,
        amount_in,
        amount_out,
        minimum_amount_out: amount_out,
        maximum_amount_in: maximum_amount_in(amount_in, request.slippage_bps)?,
        fee_numerator,
        fee,
        sqrt_price_before: state.sqrt_price,
        sqrt_price_after: traversal.next_sqrt_price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Q64;
    use crate::types::config::PoolConfig;
    use crate::types::curve::{Curve, CurvePoint};
    use crate::types::fees::{BaseFeeMode, BaseFeeSchedule, CollectFeeMode, PoolFees};
    use crate::validation::validate;

    fn config(collect_fee_mode: CollectFeeMode, base_fee: BaseFeeSchedule) -> ValidatedPoolConfig {
        validate(PoolConfig {
            sqrt_start_price: Q64,
            curve: Curve::new(vec![
                CurvePoint::new(2 * Q64, 1u128 << 100),
                CurvePoint::new(4 * Q64, 1u128 << 99),
            ])
            .unwrap(),
            pool_fees: PoolFees {
                base_fee,
                ..Default::default()
            },
            collect_fee_mode,
            migration_quote_threshold: 1_000_000_000,
            ..Default::default()
        })
        .unwrap()
    }

    fn flat_fee() -> BaseFeeSchedule {
        BaseFeeSchedule {
            cliff_fee_numerator: 10_000_000,
            ..Default::default()
        }
    }

    fn state() -> PoolState {
        PoolState {
            sqrt_price: Q64,
            base_reserve: 1_000_000_000_000,
            quote_reserve: 0,
            ..Default::default()
        }
    }

    fn request(direction: TradeDirection, amount: u64) -> SwapRequest {
        SwapRequest {
            direction,
            amount,
            has_referral: false,
            current_point: 0,
            slippage_bps: None,
        }
    }

    #[test]
    fn test_buy_charges_fee_on_input() {
        let config = config(CollectFeeMode::QuoteToken, flat_fee());
        let quote = quote_exact_in(&config, &state(), &request(TradeDirection::QuoteToBase, 1_000_000)).unwrap();

        assert_eq!(quote.fee.total(), 10_000);
        assert_eq!(quote.fee.protocol_fee, 2_000);
        // 990_000 quote at price 1 with L = 2^100
        let expected = traverse_from_quote(&config.curve, Q64, 990_000).unwrap();
        assert_eq!(quote.amount_out, expected.amount);
        assert_eq!(quote.sqrt_price_after, expected.next_sqrt_price);
        assert_eq!(quote.minimum_amount_out, quote.amount_out);
        assert_eq!(quote.maximum_amount_in, 1_000_000);
    }

    #[test]
    fn test_output_collection_charges_base() {
        let config = config(CollectFeeMode::OutputToken, flat_fee());
        let quote = quote_exact_in(&config, &state(), &request(TradeDirection::QuoteToBase, 1_000_000)).unwrap();

        let gross = traverse_from_quote(&config.curve, Q64, 1_000_000).unwrap();
        assert_eq!(quote.amount_out + quote.fee.total(), gross.amount);
        assert_eq!(quote.sqrt_price_after, gross.next_sqrt_price);
    }

    #[test]
    fn test_sell_charges_fee_on_output() {
        let config = config(CollectFeeMode::QuoteToken, flat_fee());
        let mut pool = state();
        pool.sqrt_price = 3 * Q64 / 2;
        pool.quote_reserve = 500_000_000;

        let quote = quote_exact_in(&config, &pool, &request(TradeDirection::BaseToQuote, 1_000_000)).unwrap();
        let gross = traverse_from_base(&config.curve, pool.sqrt_price, 1_000_000).unwrap();
        assert_eq!(quote.amount_out + quote.fee.total(), gross.amount);
        assert!(quote.sqrt_price_after < quote.sqrt_price_before);
    }

    #[test]
    fn test_slippage_bounds() {
        let config = config(CollectFeeMode::QuoteToken, flat_fee());
        let mut req = request(TradeDirection::QuoteToBase, 1_000_000);
        req.slippage_bps = Some(100);
        let quote = quote_exact_in(&config, &state(), &req).unwrap();
        assert_eq!(
            quote.minimum_amount_out,
            mul_div_u64(quote.amount_out, 9_900, 10_000, Rounding::Down).unwrap()
        );

        assert_eq!(maximum_amount_in(1_000, Some(50)).unwrap(), 1_005);
        assert_eq!(maximum_amount_in(1_001, Some(1)).unwrap(), 1_002);
        assert_eq!(minimum_amount_out(1_000, Some(10_000)).unwrap(), 0);
    }

    #[test]
    fn test_exact_out_buys_at_least_requested() {
        for collect in [CollectFeeMode::QuoteToken, CollectFeeMode::OutputToken] {
            let config = config(collect, flat_fee());
            let want = 5_000_000;
            let quote = quote_exact_out(&config, &state(), &request(TradeDirection::QuoteToBase, want)).unwrap();
            assert_eq!(quote.amount_out, want);

            // Paying the quoted input forward delivers the requested output
            let forward =
                quote_exact_in(&config, &state(), &request(TradeDirection::QuoteToBase, quote.amount_in)).unwrap();
            assert!(forward.amount_out >= want);
        }
    }

    #[test]
    fn test_exact_out_sell() {
        let config = config(CollectFeeMode::QuoteToken, flat_fee());
        let mut pool = state();
        pool.sqrt_price = 3 * Q64 / 2;
        pool.quote_reserve = 500_000_000;

        let quote = quote_exact_out(&config, &pool, &request(TradeDirection::BaseToQuote, 1_000_000)).unwrap();
        let forward =
            quote_exact_in(&config, &pool, &request(TradeDirection::BaseToQuote, quote.amount_in)).unwrap();
        assert!(forward.amount_out >= 1_000_000);
    }

    #[test]
    fn test_rate_limited_exact_out() {
        let limiter = BaseFeeSchedule {
            cliff_fee_numerator: 10_000_000,
            base_fee_mode: BaseFeeMode::RateLimiter,
            first_factor: 10,
            second_factor: 100,
            third_factor: 1_000_000,
        };
        let config = config(CollectFeeMode::QuoteToken, limiter);

        let small = quote_exact_in(&config, &state(), &request(TradeDirection::QuoteToBase, 500_000)).unwrap();
        assert_eq!(small.fee_numerator, 10_000_000);
        let large = quote_exact_in(&config, &state(), &request(TradeDirection::QuoteToBase, 20_000_000)).unwrap();
        assert!(large.fee_numerator > 10_000_000);

        let quote = quote_exact_out(&config, &state(), &request(TradeDirection::QuoteToBase, large.amount_out)).unwrap();
        let forward =
            quote_exact_in(&config, &state(), &request(TradeDirection::QuoteToBase, quote.amount_in)).unwrap();
        assert!(forward.amount_out >= large.amount_out);
    }

    #[test]
    fn test_rejections() {
        let config = config(CollectFeeMode::QuoteToken, flat_fee());
        assert_eq!(
            quote_exact_in(&config, &state(), &request(TradeDirection::QuoteToBase, 0)),
            Err(CurveLaunchError::AmountIsZero)
        );

        let mut completed = state();
        completed.quote_reserve = 1_000_000_000;
        assert_eq!(
            quote_exact_in(&config, &completed, &request(TradeDirection::QuoteToBase, 1)),
            Err(CurveLaunchError::PoolCompleted)
        );
        assert_eq!(
            quote_exact_out(&config, &completed, &request(TradeDirection::QuoteToBase, 1)),
            Err(CurveLaunchError::PoolCompleted)
        );

        // Output above what the pool holds
        let mut thin = state();
        thin.base_reserve = 10;
        assert_eq!(
            quote_exact_in(&config, &thin, &request(TradeDirection::QuoteToBase, 1_000_000)),
            Err(CurveLaunchError::InsufficientLiquidity)
        );
        assert_eq!(
            quote_exact_out(&config, &thin, &request(TradeDirection::QuoteToBase, 11)),
            Err(CurveLaunchError::InsufficientLiquidity)
        );
    }

    #[test]
    fn test_sells_pay_out_of_quote_reserve() {
        let config = config(CollectFeeMode::QuoteToken, flat_fee());
        let mut pool = state();
        pool.sqrt_price = 3 * Q64 / 2;
        pool.quote_reserve = 1_000;

        // Plenty of base in the pool does not help a sell
        assert_eq!(
            quote_exact_in(&config, &pool, &request(TradeDirection::BaseToQuote, 1_000_000)),
            Err(CurveLaunchError::InsufficientLiquidity)
        );
        // 1_000 out grosses up to 1_011 before the 1% fee
        assert_eq!(
            quote_exact_out(&config, &pool, &request(TradeDirection::BaseToQuote, 1_000)),
            Err(CurveLaunchError::InsufficientLiquidity)
        );
        assert!(quote_exact_out(&config, &pool, &request(TradeDirection::BaseToQuote, 990)).is_ok());
    }
}
