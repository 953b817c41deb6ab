//! # Migration Threshold
//!
//! Where a curve ends up once the migration quote threshold has been paid in,
//! and how much base it releases on the way.

use crate::constants::{MAX_SQRT_PRICE, SWAP_BUFFER_PERCENTAGE};
use crate::errors::{CoreResult, CurveLaunchError};
use crate::math::big_int::{u256_to_u64, Rounding, U256};
use crate::math::liquidity_math::{
    amount_base_between_256, amount_quote_between_256, next_sqrt_price_from_quote_input,
};
use crate::math::safe_math::SafeMath;
use crate::types::curve::Curve;

/// Sqrt price reached after buying with exactly `quote_threshold` from the start price
pub fn price_at_quote_threshold(
    curve: &Curve,
    sqrt_start_price: u128,
    quote_threshold: u64,
) -> CoreResult<u128> {
    let points = curve.points();
    let first = points.first().ok_or(CurveLaunchError::InsufficientLiquidity)?;

    let first_segment =
        amount_quote_between_256(sqrt_start_price, first.sqrt_price, first.liquidity, Rounding::Up)?;
    if first_segment > U256::from(quote_threshold) {
        return next_sqrt_price_from_quote_input(sqrt_start_price, first.liquidity, quote_threshold);
    }

    let mut amount_left = U256::from(quote_threshold).safe_sub(first_segment)?;
    let mut sqrt_price = first.sqrt_price;
    for window in points.windows(2) {
        let (lower, upper) = (window[0], window[1]);
        let max_amount =
            amount_quote_between_256(lower.sqrt_price, upper.sqrt_price, upper.liquidity, Rounding::Up)?;
        if max_amount > amount_left {
            sqrt_price =
                next_sqrt_price_from_quote_input(sqrt_price, upper.liquidity, u256_to_u64(amount_left)?)?;
            amount_left = U256::ZERO;
            break;
        }
        amount_left = amount_left.safe_sub(max_amount)?;
        sqrt_price = upper.sqrt_price;
    }

    if !amount_left.is_zero() {
        return Err(CurveLaunchError::InsufficientLiquidity);
    }
    Ok(sqrt_price)
}

fn base_token_for_swap_256(
    sqrt_start_price: u128,
    sqrt_migration_price: u128,
    curve: &Curve,
) -> CoreResult<U256> {
    let mut total = U256::ZERO;
    let mut lower = sqrt_start_price;
    for point in curve.iter() {
        if lower >= sqrt_migration_price {
            break;
        }
        if point.sqrt_price > sqrt_migration_price {
            let delta =
                amount_base_between_256(lower, sqrt_migration_price, point.liquidity, Rounding::Up)?;
            total = total.safe_add(delta)?;
            break;
        }
        let delta = amount_base_between_256(lower, point.sqrt_price, point.liquidity, Rounding::Up)?;
        total = total.safe_add(delta)?;
        lower = point.sqrt_price;
    }
    Ok(total)
}

/// Base released between the start and the migration price, rounded up per segment
pub fn base_token_for_swap(
    sqrt_start_price: u128,
    sqrt_migration_price: u128,
    curve: &Curve,
) -> CoreResult<u64> {
    u256_to_u64(base_token_for_swap_256(sqrt_start_price, sqrt_migration_price, curve)?)
}

/// Swap supply including the safety buffer, capped at what the whole curve can release
pub fn swap_amount_with_buffer(
    swap_base_amount: u64,
    sqrt_start_price: u128,
    curve: &Curve,
) -> CoreResult<u64> {
    let buffer = U256::from(swap_base_amount)
        .safe_mul(U256::from(SWAP_BUFFER_PERCENTAGE))?
        .safe_div(U256::from(100u8))?;
    let buffered = U256::from(swap_base_amount).safe_add(buffer)?;
    let max_on_curve = base_token_for_swap_256(sqrt_start_price, MAX_SQRT_PRICE, curve)?;
    if max_on_curve < buffered {
        log::warn!(
            "Swap buffer capped by curve capacity: wanted {}, curve releases {}",
            buffered,
            max_on_curve
        );
    }
    u256_to_u64(buffered.min(max_on_curve))
}
