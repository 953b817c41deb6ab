//! Closed-form buffered curves
//!
//! One segment up to the migration price plus a buffer segment up to
//! `MAX_SQRT_PRICE`. The buffer's liquidity is
//! liquidity · (max − migration) / (max · migration), which keeps marginal
//! slippage continuous across the migration boundary.

use rust_decimal::Decimal;

use crate::constants::{MAX_SQRT_PRICE, SWAP_BUFFER_PERCENTAGE};
use crate::designer::{
    sqrt_price_from_price, to_lamports, CurveDesign, CurveDesignParams, SupplyAllocation,
};
use crate::errors::{CoreResult, CurveLaunchError};
use crate::math::big_int::{div_u256, mul_div_u256, mul_div_u64, u256_to_u128, Rounding, U256};
use crate::math::liquidity_math::{amount_base_between, liquidity_from_quote};
use crate::math::safe_math::SafeMath;
use crate::types::curve::{Curve, CurvePoint};

/// Liquidity of the buffer point above `sqrt_migration_price`
pub fn buffer_liquidity(liquidity: u128, sqrt_migration_price: u128) -> CoreResult<u128> {
    let span = MAX_SQRT_PRICE.safe_sub(sqrt_migration_price)?;
    let denominator = U256::from(MAX_SQRT_PRICE).safe_mul(U256::from(sqrt_migration_price))?;
    u256_to_u128(mul_div_u256(
        U256::from(liquidity),
        U256::from(span),
        denominator,
        Rounding::Down,
    )?)
}

/// Start price, curve and buffer base for a swap supply
///
/// sqrt_start = (threshold ≪ 128) / (swap · sqrt_migration) and
/// liquidity = (threshold ≪ 128) / (sqrt_migration − sqrt_start). The third
/// value is the base the buffer segment holds.
pub fn buffered_curve(
    sqrt_migration_price: u128,
    swap_base_amount: u64,
    migration_quote_threshold: u64,
) -> CoreResult<(u128, Curve, u64)> {
    let quote_scaled = U256::from(migration_quote_threshold).safe_shl(128)?;
    let swap_value = U256::from(swap_base_amount).safe_mul(U256::from(sqrt_migration_price))?;
    let sqrt_start_price = u256_to_u128(div_u256(quote_scaled, swap_value, Rounding::Down)?)?;
    if sqrt_start_price >= sqrt_migration_price {
        return Err(CurveLaunchError::invalid_parameter(
            "migration_quote_threshold",
            "threshold is worth more than the swap supply at the migration price",
        ));
    }

    let liquidity = liquidity_from_quote(sqrt_start_price, sqrt_migration_price, migration_quote_threshold)?;
    let buffer = buffer_liquidity(liquidity, sqrt_migration_price)?;
    if buffer == 0 {
        return Err(CurveLaunchError::invalid_parameter(
            "migration_quote_threshold",
            "threshold too small to leave any buffer liquidity",
        ));
    }
    let buffer_base_amount =
        amount_base_between(sqrt_migration_price, MAX_SQRT_PRICE, buffer, Rounding::Down)?;
    let curve = Curve::new(vec![
        CurvePoint::new(sqrt_migration_price, liquidity),
        CurvePoint::new(MAX_SQRT_PRICE, buffer),
    ])?;
    Ok((sqrt_start_price, curve, buffer_base_amount))
}

/// Buffered curve migrating at `migration_price` (whole quote tokens per whole
/// base token) once `migration_quote_threshold` whole quote tokens are paid in
///
/// The swap supply is sized so that it plus the 25% swap buffer fits the
/// supply left after migration, vesting and leftover.
pub fn build_curve_with_buffer(
    params: &CurveDesignParams,
    migration_price: Decimal,
    migration_quote_threshold: Decimal,
) -> CoreResult<CurveDesign> {
    let sqrt_migration_price =
        sqrt_price_from_price(migration_price, params.token_base_decimal, params.token_quote_decimal)?;
    let threshold = to_lamports(migration_quote_threshold, params.token_quote_decimal)?;
    let mut allocation = SupplyAllocation::new(params, sqrt_migration_price, threshold)?;

    let available = allocation.swap_base_amount;
    // One unit below the exact share covers the rounded-up amount the curve releases
    allocation.swap_base_amount =
        mul_div_u64(available, 100, 100 + SWAP_BUFFER_PERCENTAGE as u64, Rounding::Down)?
            .saturating_sub(1);
    log::debug!(
        "Buffered design: {} of {} available base sold before migration",
        allocation.swap_base_amount,
        available
    );

    let (sqrt_start_price, curve, buffer_base_amount) =
        buffered_curve(sqrt_migration_price, allocation.swap_base_amount, threshold)?;
    allocation.assemble(params, sqrt_start_price, curve, buffer_base_amount)
}
