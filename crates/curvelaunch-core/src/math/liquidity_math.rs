//! # Liquidity Math
//!
//! Token amounts held by a liquidity segment and the sqrt price reached after
//! moving a given amount through it.
//!
//! Liquidity carries an implicit 2^128 scale relative to token amounts, and
//! sqrt prices are Q64.64, so:
//!
//! - base  = L · (upper − lower) / (lower · upper)
//! - quote = L · (upper − lower) / 2^128

use crate::errors::{CoreResult, CurveLaunchError};
use crate::math::big_int::{div_u256, mul_div_u256, u256_to_u128, u256_to_u64, Rounding, U256};
use crate::math::safe_math::SafeMath;

fn q128() -> U256 {
    U256::from(1u8) << 128usize
}

// ============================================================================
// Amount Deltas
// ============================================================================

/// Base token amount held by `liquidity` between two sqrt prices (256-bit)
pub fn amount_base_between_256(
    lower_sqrt_price: u128,
    upper_sqrt_price: u128,
    liquidity: u128,
    rounding: Rounding,
) -> CoreResult<U256> {
    if lower_sqrt_price == 0 || upper_sqrt_price == 0 {
        return Err(CurveLaunchError::DivisionByZero);
    }
    if liquidity == 0 {
        return Ok(U256::ZERO);
    }

    let numerator = U256::from(liquidity)
        .safe_mul(U256::from(upper_sqrt_price.safe_sub(lower_sqrt_price)?))?;
    let denominator = U256::from(lower_sqrt_price).safe_mul(U256::from(upper_sqrt_price))?;
    div_u256(numerator, denominator, rounding)
}

/// Base token amount held by `liquidity` between two sqrt prices
pub fn amount_base_between(
    lower_sqrt_price: u128,
    upper_sqrt_price: u128,
    liquidity: u128,
    rounding: Rounding,
) -> CoreResult<u64> {
    let amount = amount_base_between_256(lower_sqrt_price, upper_sqrt_price, liquidity, rounding)?;
    u256_to_u64(amount)
}

/// Quote token amount held by `liquidity` between two sqrt prices (256-bit)
pub fn amount_quote_between_256(
    lower_sqrt_price: u128,
    upper_sqrt_price: u128,
    liquidity: u128,
    rounding: Rounding,
) -> CoreResult<U256> {
    let delta = upper_sqrt_price.safe_sub(lower_sqrt_price)?;
    let product = U256::from(liquidity).safe_mul(U256::from(delta))?;
    div_u256(product, q128(), rounding)
}

/// Quote token amount held by `liquidity` between two sqrt prices
pub fn amount_quote_between(
    lower_sqrt_price: u128,
    upper_sqrt_price: u128,
    liquidity: u128,
    rounding: Rounding,
) -> CoreResult<u64> {
    let amount = amount_quote_between_256(lower_sqrt_price, upper_sqrt_price, liquidity, rounding)?;
    u256_to_u64(amount)
}

// ============================================================================
// Liquidity From Amounts
// ============================================================================

/// Liquidity that holds exactly `base_amount` between two sqrt prices (floor)
pub fn liquidity_from_base(
    lower_sqrt_price: u128,
    upper_sqrt_price: u128,
    base_amount: u64,
) -> CoreResult<u128> {
    let delta = upper_sqrt_price.safe_sub(lower_sqrt_price)?;
    let price_product = U256::from(lower_sqrt_price).safe_mul(U256::from(upper_sqrt_price))?;
    let liquidity = mul_div_u256(
        U256::from(base_amount),
        price_product,
        U256::from(delta),
        Rounding::Down,
    )?;
    u256_to_u128(liquidity)
}

/// Liquidity that holds exactly `quote_amount` between two sqrt prices (floor)
pub fn liquidity_from_quote(
    lower_sqrt_price: u128,
    upper_sqrt_price: u128,
    quote_amount: u64,
) -> CoreResult<u128> {
    let delta = upper_sqrt_price.safe_sub(lower_sqrt_price)?;
    let scaled = U256::from(quote_amount).safe_shl(128)?;
    let liquidity = div_u256(scaled, U256::from(delta), Rounding::Down)?;
    u256_to_u128(liquidity)
}

// ============================================================================
// Next Sqrt Price
// ============================================================================

/// Sqrt price after selling `amount` base into `liquidity` (price falls)
///
/// Rounds up so the pool never gives away more quote than it received value for.
pub fn next_sqrt_price_from_base_input(
    sqrt_price: u128,
    liquidity: u128,
    amount: u64,
) -> CoreResult<u128> {
    if amount == 0 {
        return Ok(sqrt_price);
    }
    let price = U256::from(sqrt_price);
    let liquidity = U256::from(liquidity);
    let product = U256::from(amount).safe_mul(price)?;
    let denominator = liquidity.safe_add(product)?;
    let next = mul_div_u256(liquidity, price, denominator, Rounding::Up)?;
    u256_to_u128(next)
}

/// Sqrt price after buying with `amount` quote into `liquidity` (price rises)
pub fn next_sqrt_price_from_quote_input(
    sqrt_price: u128,
    liquidity: u128,
    amount: u64,
) -> CoreResult<u128> {
    let shifted = U256::from(amount).safe_shl(128)?;
    let quotient = div_u256(shifted, U256::from(liquidity), Rounding::Down)?;
    let next = U256::from(sqrt_price).safe_add(quotient)?;
    u256_to_u128(next)
}

/// Sqrt price after sending in either token
pub fn next_sqrt_price_from_input(
    sqrt_price: u128,
    liquidity: u128,
    amount_in: u64,
    base_for_quote: bool,
) -> CoreResult<u128> {
    if base_for_quote {
        next_sqrt_price_from_base_input(sqrt_price, liquidity, amount_in)
    } else {
        next_sqrt_price_from_quote_input(sqrt_price, liquidity, amount_in)
    }
}

/// Sqrt price after taking `amount` base out of `liquidity` (price rises)
pub fn next_sqrt_price_from_base_output(
    sqrt_price: u128,
    liquidity: u128,
    amount: u64,
) -> CoreResult<u128> {
    if amount == 0 {
        return Ok(sqrt_price);
    }
    let price = U256::from(sqrt_price);
    let liquidity = U256::from(liquidity);
    let product = U256::from(amount).safe_mul(price)?;
    if product >= liquidity {
        return Err(CurveLaunchError::InsufficientLiquidity);
    }
    let denominator = liquidity.safe_sub(product)?;
    let next = mul_div_u256(liquidity, price, denominator, Rounding::Up)?;
    u256_to_u128(next)
}

/// Sqrt price after taking `amount` quote out of `liquidity` (price falls)
pub fn next_sqrt_price_from_quote_output(
    sqrt_price: u128,
    liquidity: u128,
    amount: u64,
) -> CoreResult<u128> {
    let shifted = U256::from(amount).safe_shl(128)?;
    let quotient = div_u256(shifted, U256::from(liquidity), Rounding::Up)?;
    let price = U256::from(sqrt_price);
    if quotient > price {
        return Err(CurveLaunchError::InsufficientLiquidity);
    }
    u256_to_u128(price.safe_sub(quotient)?)
}

/// Sqrt price after taking either token out
pub fn next_sqrt_price_from_output(
    sqrt_price: u128,
    liquidity: u128,
    amount_out: u64,
    base_for_quote: bool,
) -> CoreResult<u128> {
    if base_for_quote {
        next_sqrt_price_from_quote_output(sqrt_price, liquidity, amount_out)
    } else {
        next_sqrt_price_from_base_output(sqrt_price, liquidity, amount_out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Q64;

    #[test]
    fn test_base_between_known_value() {
        let lower = Q64;
        let upper = Q64 + Q64 / 10_000;
        let liquidity = 1_293_129_312_931_923_921_293_912u128;
        let amount = amount_base_between(lower, upper, liquidity, Rounding::Down).unwrap();
        assert_eq!(amount, 7);
        let rounded_up = amount_base_between(lower, upper, liquidity, Rounding::Up).unwrap();
        assert_eq!(rounded_up, 8);
    }

    #[test]
    fn test_zero_liquidity_and_flat_range() {
        assert_eq!(amount_base_between(Q64, 2 * Q64, 0, Rounding::Up).unwrap(), 0);
        assert_eq!(amount_quote_between(Q64, Q64, 1u128 << 100, Rounding::Up).unwrap(), 0);
        assert_eq!(
            amount_base_between(0, Q64, 1, Rounding::Down),
            Err(CurveLaunchError::DivisionByZero)
        );
    }

    #[test]
    fn test_quote_between_unit_price() {
        // One unit of real liquidity over [1, 2] in sqrt space holds exactly 1 quote
        let liquidity = 1u128 << 64;
        let amount = amount_quote_between(Q64, 2 * Q64, liquidity, Rounding::Down).unwrap();
        assert_eq!(amount, 1);
    }

    #[test]
    fn test_amount_overflowing_u64() {
        let liquidity = u128::MAX;
        assert_eq!(
            amount_quote_between(Q64, 4 * Q64, liquidity, Rounding::Down),
            Err(CurveLaunchError::TypeCastFailed)
        );
        assert!(amount_quote_between_256(Q64, 4 * Q64, liquidity, Rounding::Down).is_ok());
    }

    #[test]
    fn test_next_price_directions() {
        let liquidity = 1u128 << 100;
        let down = next_sqrt_price_from_base_input(Q64, liquidity, 1_000_000).unwrap();
        assert!(down < Q64);
        let up = next_sqrt_price_from_quote_input(Q64, liquidity, 1_000_000).unwrap();
        assert!(up > Q64);
        assert_eq!(next_sqrt_price_from_input(Q64, liquidity, 0, true).unwrap(), Q64);
    }

    #[test]
    fn test_output_prices_bracket_input_prices() {
        let liquidity = 1u128 << 100;
        let up = next_sqrt_price_from_output(Q64, liquidity, 1_000_000, false).unwrap();
        assert!(up > Q64);
        let down = next_sqrt_price_from_output(Q64, liquidity, 1_000_000, true).unwrap();
        assert!(down < Q64);
        assert_eq!(
            next_sqrt_price_from_base_output(Q64, 1u128 << 64, 1),
            Err(CurveLaunchError::InsufficientLiquidity)
        );
    }

    #[test]
    fn test_liquidity_from_amounts_recovers_amounts() {
        let lower = Q64;
        let upper = 2 * Q64;
        let liquidity = liquidity_from_quote(lower, upper, 1_000_000).unwrap();
        let quote = amount_quote_between(lower, upper, liquidity, Rounding::Down).unwrap();
        assert!(quote <= 1_000_000 && quote >= 999_999);

        let liquidity = liquidity_from_base(lower, upper, 1_000_000).unwrap();
        let base = amount_base_between(lower, upper, liquidity, Rounding::Down).unwrap();
        assert!(base <= 1_000_000 && base >= 999_999);
    }
}
