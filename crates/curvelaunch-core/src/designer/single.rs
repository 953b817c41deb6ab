//! Single-segment curves
//!
//! One constant-liquidity segment from the start price to the migration price,
//! sized so the swap supply sells out exactly as the quote threshold is paid in.

use rust_decimal::{Decimal, MathematicalOps};

use crate::designer::{sqrt_price_from_price, to_lamports, CurveDesign, CurveDesignParams, SupplyAllocation};
use crate::errors::{CoreResult, CurveLaunchError};
use crate::math::big_int::{mul_div_u256, u256_to_u128, Rounding, U256};
use crate::math::liquidity_math::{liquidity_from_base, liquidity_from_quote};
use crate::math::safe_math::SafeMath;
use crate::types::curve::{Curve, CurvePoint};

/// Start price and the single curve point for a swap supply
///
/// sqrt_start = sqrt_migration · migration_base · 100 / (swap · (100 − fee%)),
/// with the liquidity the smaller of the base- and quote-implied values.
pub fn first_curve(
    sqrt_migration_price: u128,
    migration_base_amount: u64,
    swap_base_amount: u64,
    migration_quote_threshold: u64,
    migration_fee_percentage: u8,
) -> CoreResult<(u128, Curve)> {
    let keep = 100u64.safe_sub(migration_fee_percentage as u64)?;
    let numerator = U256::from(migration_base_amount).safe_mul(U256::from(100u8))?;
    let denominator = U256::from(swap_base_amount).safe_mul(U256::from(keep))?;
    let sqrt_start_price = u256_to_u128(mul_div_u256(
        U256::from(sqrt_migration_price),
        numerator,
        denominator,
        Rounding::Down,
    )?)?;
    if sqrt_start_price >= sqrt_migration_price {
        return Err(CurveLaunchError::invalid_parameter(
            "percentage_supply_on_migration",
            "start price would not be below the migration price",
        ));
    }

    let base_liquidity = liquidity_from_base(sqrt_start_price, sqrt_migration_price, swap_base_amount)?;
    let quote_liquidity =
        liquidity_from_quote(sqrt_start_price, sqrt_migration_price, migration_quote_threshold)?;
    let liquidity = base_liquidity.min(quote_liquidity);
    log::debug!(
        "Single segment: start={} migration={} liquidity={} (base {}, quote {})",
        sqrt_start_price,
        sqrt_migration_price,
        liquidity,
        base_liquidity,
        quote_liquidity
    );

    let curve = Curve::new(vec![CurvePoint::new(sqrt_migration_price, liquidity)])?;
    Ok((sqrt_start_price, curve))
}

/// Curve selling out once `percentage_supply_on_migration` of the supply remains
/// for migration and `migration_quote_threshold` whole quote tokens are paid in
pub fn build_curve(
    params: &CurveDesignParams,
    percentage_supply_on_migration: Decimal,
    migration_quote_threshold: Decimal,
) -> CoreResult<CurveDesign> {
    if percentage_supply_on_migration <= Decimal::ZERO
        || percentage_supply_on_migration >= Decimal::ONE_HUNDRED
    {
        return Err(CurveLaunchError::invalid_parameter(
            "percentage_supply_on_migration",
            "must be strictly between 0 and 100",
        ));
    }

    let migration_base_supply = Decimal::from(params.total_token_supply)
        .checked_mul(percentage_supply_on_migration)
        .and_then(|supply| supply.checked_div(Decimal::ONE_HUNDRED))
        .ok_or(CurveLaunchError::MathOverflow)?;
    let migration_quote_amount = params.migration_quote_amount_after_fee(migration_quote_threshold)?;
    let migration_price = migration_quote_amount
        .checked_div(migration_base_supply)
        .ok_or(CurveLaunchError::DivisionByZero)?;
    let sqrt_migration_price = sqrt_price_from_price(
        migration_price,
        params.token_base_decimal,
        params.token_quote_decimal,
    )?;

    let threshold = to_lamports(migration_quote_threshold, params.token_quote_decimal)?;
    let allocation = SupplyAllocation::new(params, sqrt_migration_price, threshold)?;
    log::debug!(
        "Designing single segment: migration price {} swap {} migration base {}",
        migration_price,
        allocation.swap_base_amount,
        allocation.migration_base_amount
    );

    let (sqrt_start_price, mut curve) = first_curve(
        sqrt_migration_price,
        allocation.migration_base_amount,
        allocation.swap_base_amount,
        threshold,
        params.migration_fee.fee_percentage,
    )?;
    let buffer_base_amount = allocation.append_remaining(sqrt_start_price, &mut curve)?;
    allocation.assemble(params, sqrt_start_price, curve, buffer_base_amount)
}

/// Share of the supply left for migration when the price moves from the
/// initial to the migration market cap
///
/// With r = initial / migration:
/// (100·√r − (vesting% + leftover%)·√r) / (1 + √r).
pub fn percentage_supply_on_migration(
    params: &CurveDesignParams,
    initial_market_cap: Decimal,
    migration_market_cap: Decimal,
) -> CoreResult<Decimal> {
    let ratio = initial_market_cap
        .checked_div(migration_market_cap)
        .ok_or(CurveLaunchError::DivisionByZero)?;
    let sqrt_ratio = ratio.sqrt().ok_or(CurveLaunchError::NonFiniteResult)?;

    let total_supply = Decimal::from(params.total_supply()?);
    let reserved = Decimal::from(
        params
            .vesting_schedule()?
            .total_amount()
            .ok_or(CurveLaunchError::MathOverflow)?,
    ) + Decimal::from(params.leftover_amount()?);
    let reserved_percentage = reserved
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|value| value.checked_div(total_supply))
        .ok_or(CurveLaunchError::DivisionByZero)?;

    let numerator = (Decimal::ONE_HUNDRED - reserved_percentage)
        .checked_mul(sqrt_ratio)
        .ok_or(CurveLaunchError::MathOverflow)?;
    numerator
        .checked_div(Decimal::ONE + sqrt_ratio)
        .ok_or(CurveLaunchError::DivisionByZero)
}

/// Curve starting at `initial_market_cap` and migrating at `migration_market_cap`,
/// both in whole quote tokens
pub fn build_curve_with_market_cap(
    params: &CurveDesignParams,
    initial_market_cap: Decimal,
    migration_market_cap: Decimal,
) -> CoreResult<CurveDesign> {
    if initial_market_cap <= Decimal::ZERO || initial_market_cap >= migration_market_cap {
        return Err(CurveLaunchError::invalid_parameter(
            "initial_market_cap",
            "must be positive and below the migration market cap",
        ));
    }
    let percentage = percentage_supply_on_migration(params, initial_market_cap, migration_market_cap)?;
    let migration_quote_amount = migration_market_cap
        .checked_mul(percentage)
        .and_then(|amount| amount.checked_div(Decimal::ONE_HUNDRED))
        .ok_or(CurveLaunchError::MathOverflow)?;
    let migration_quote_threshold = params.migration_quote_threshold_for(migration_quote_amount)?;
    log::debug!(
        "Market caps {} -> {}: {}% of supply at migration, threshold {}",
        initial_market_cap,
        migration_market_cap,
        percentage,
        migration_quote_threshold
    );
    build_curve(params, percentage, migration_quote_threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Q64;
    use crate::designer::tests::params;
    use crate::types::config::MigrationOption;

    #[test]
    fn test_first_curve_shape() {
        // Migration at price 4, twice as much swapped as migrated, no fee
        let (start, curve) =
            first_curve(2 * Q64, 1_000, 2_000, 4_000, 0).unwrap();
        assert_eq!(start, Q64);
        assert_eq!(curve.len(), 1);
        let point = curve.points()[0];
        assert_eq!(point.sqrt_price, 2 * Q64);
        assert!(point.liquidity > 0);

        assert!(first_curve(2 * Q64, 3_000, 2_000, 4_000, 0).is_err());
    }

    #[test]
    fn test_build_curve() {
        let design = build_curve(&params(), Decimal::from(20), Decimal::from(85)).unwrap();
        let config = &design.config;
        assert_eq!(config.migration_quote_threshold, 85_000_000_000);
        assert!(config.sqrt_start_price < design.sqrt_migration_price);
        assert_eq!(config.curve.points()[0].sqrt_price, design.sqrt_migration_price);
        assert_eq!(
            design.swap_base_amount + design.migration_base_amount,
            1_000_000_000_000_000
        );
        // Paying the threshold lands on the migration price
        assert_eq!(config.sqrt_migration_price().unwrap(), design.sqrt_migration_price);
    }

    #[test]
    fn test_build_curve_full_range_with_fee() {
        let mut p = params();
        p.migration_option = MigrationOption::ConcentratedFullRange;
        p.migration_fee.fee_percentage = 10;
        p.leftover = 10_000_000;
        let design = build_curve(&p, Decimal::from(25), Decimal::from(100)).unwrap();
        assert_eq!(design.leftover_amount, 10_000_000_000_000);
        assert!(design.config.curve.len() <= 2);
    }

    #[test]
    fn test_build_curve_rejects_bad_percentages() {
        assert!(build_curve(&params(), Decimal::ZERO, Decimal::from(85)).is_err());
        assert!(build_curve(&params(), Decimal::ONE_HUNDRED, Decimal::from(85)).is_err());
    }

    #[test]
    fn test_percentage_from_market_caps() {
        // Ratio 1/4: 100 · 0.5 / 1.5
        let pct = percentage_supply_on_migration(&params(), Decimal::from(100), Decimal::from(400)).unwrap();
        assert!((pct - Decimal::new(333_333, 4)).abs() < Decimal::new(1, 3));
    }

    #[test]
    fn test_build_curve_with_market_cap() {
        let design =
            build_curve_with_market_cap(&params(), Decimal::from(30), Decimal::from(300)).unwrap();
        assert!(design.config.sqrt_start_price < design.sqrt_migration_price);
        assert!(build_curve_with_market_cap(&params(), Decimal::from(300), Decimal::from(30)).is_err());
    }
}
