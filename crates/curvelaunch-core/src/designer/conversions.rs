//! Crossing between human decimal amounts and on-chain integers
//!
//! Everything leaving this module toward the integer side is floored.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, MathematicalOps};

use crate::constants::Q64;
use crate::errors::{CoreResult, CurveLaunchError};
use crate::math::big_int::{mul_div_u256, u256_to_u128, Rounding, U256};

/// Largest decimal count a token can declare here
pub const MAX_TOKEN_DECIMALS: u8 = 18;

fn ten_pow(exponent: u8) -> CoreResult<Decimal> {
    if exponent > MAX_TOKEN_DECIMALS {
        return Err(CurveLaunchError::invalid_parameter(
            "decimals",
            format!("{} exceeds {}", exponent, MAX_TOKEN_DECIMALS),
        ));
    }
    10u64
        .checked_pow(exponent as u32)
        .map(Decimal::from)
        .ok_or(CurveLaunchError::MathOverflow)
}

/// Price of one whole base token in whole quote tokens, as a price per smallest unit
fn price_per_unit(price: Decimal, token_base_decimal: u8, token_quote_decimal: u8) -> CoreResult<Decimal> {
    let quote_scale = ten_pow(token_quote_decimal)?;
    let base_scale = ten_pow(token_base_decimal)?;
    price
        .checked_mul(quote_scale)
        .and_then(|scaled| scaled.checked_div(base_scale))
        .ok_or(CurveLaunchError::MathOverflow)
}

/// Q64.64 sqrt price of a human price, floored
pub fn sqrt_price_from_price(
    price: Decimal,
    token_base_decimal: u8,
    token_quote_decimal: u8,
) -> CoreResult<u128> {
    if price.is_sign_negative() || price.is_zero() {
        return Err(CurveLaunchError::invalid_parameter("price", "must be positive"));
    }
    let unit_price = price_per_unit(price, token_base_decimal, token_quote_decimal)?;
    let sqrt = unit_price.sqrt().ok_or(CurveLaunchError::NonFiniteResult)?;

    let mantissa = u128::try_from(sqrt.mantissa()).map_err(|_| CurveLaunchError::TypeCastFailed)?;
    let scale = 10u128
        .checked_pow(sqrt.scale())
        .ok_or(CurveLaunchError::MathOverflow)?;
    let sqrt_price = mul_div_u256(U256::from(mantissa), U256::from(Q64), U256::from(scale), Rounding::Down)?;
    u256_to_u128(sqrt_price)
}

/// Human price of a Q64.64 sqrt price
pub fn price_from_sqrt_price(
    sqrt_price: u128,
    token_base_decimal: u8,
    token_quote_decimal: u8,
) -> CoreResult<Decimal> {
    let base_scale = ten_pow(token_base_decimal)?;
    let quote_scale = ten_pow(token_quote_decimal)?;
    let sqrt = Decimal::from_u128(sqrt_price)
        .and_then(|value| value.checked_div(Decimal::from_u128(Q64)?))
        .ok_or(CurveLaunchError::TypeCastFailed)?;
    sqrt.checked_mul(sqrt)
        .and_then(|price| price.checked_mul(base_scale))
        .and_then(|price| price.checked_div(quote_scale))
        .ok_or(CurveLaunchError::MathOverflow)
}

/// Human amount in smallest units, floored
pub fn to_lamports(amount: Decimal, decimals: u8) -> CoreResult<u64> {
    if amount.is_sign_negative() {
        return Err(CurveLaunchError::invalid_parameter("amount", "must not be negative"));
    }
    amount
        .checked_mul(ten_pow(decimals)?)
        .ok_or(CurveLaunchError::MathOverflow)?
        .floor()
        .to_u64()
        .ok_or(CurveLaunchError::TypeCastFailed)
}

/// Whole tokens in smallest units
pub fn whole_tokens_to_lamports(amount: u64, decimals: u8) -> CoreResult<u64> {
    to_lamports(Decimal::from(amount), decimals)
}
