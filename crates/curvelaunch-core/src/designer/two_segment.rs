//! Two-segment curves
//!
//! Liquidity l0 over [p0, p1] and l1 over [p1, p2] chosen so the curve sells
//! exactly the swap supply for exactly the quote threshold. Writing
//! x = l0·(p1 − p0) and y = l1·(p2 − p1) turns the system linear:
//!
//! ```text
//! x + y         = threshold · 2^128
//! x·p2 + y·p0   = swap · p0·p1·p2
//! ```
//!
//! Solved in 512-bit integers; a negative x or y means no such curve exists.
//! The second segment then takes exactly the quote the first leaves over, so
//! the threshold lands on the migration price despite rounding. The base side
//! absorbs the rounding instead: the curve sells slightly less than the swap
//! supply, short by at most the base one quote unit buys at the mid price
//! plus the withheld margin.

use rust_decimal::Decimal;

use crate::designer::{to_lamports, CurveDesign, CurveDesignParams, SupplyAllocation};
use crate::errors::{CoreResult, CurveLaunchError};
use crate::math::big_int::{root_u512, Rounding, U512};
use crate::math::liquidity_math::{amount_quote_between, liquidity_from_quote};
use crate::types::curve::{Curve, CurvePoint};

#[cfg(feature = "client")]
use serde::Serialize;

/// Base withheld from the solved swap supply to absorb per-segment rounding
pub const TWO_SEGMENT_ROUNDING_MARGIN: u64 = 3;

/// Outcome of solving for a mid price
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize))]
pub enum TwoSegmentSolution {
    Solved { sqrt_start_price: u128, curve: Curve },
    /// One of the implied liquidities is negative
    NotSolvable,
}

impl TwoSegmentSolution {
    pub fn is_solved(&self) -> bool {
        matches!(self, Self::Solved { .. })
    }
}

fn narrow(value: U512) -> CoreResult<u128> {
    u128::try_from(value).map_err(|_| CurveLaunchError::MathOverflow)
}

/// Solve for l0 on [p0, p1] and l1 on [p1, p2]
pub fn solve_two_segment(
    sqrt_start_price: u128,
    sqrt_mid_price: u128,
    sqrt_migration_price: u128,
    swap_base_amount: u64,
    migration_quote_threshold: u64,
) -> CoreResult<TwoSegmentSolution> {
    if !(sqrt_start_price < sqrt_mid_price && sqrt_mid_price < sqrt_migration_price) {
        return Err(CurveLaunchError::invalid_parameter(
            "sqrt_mid_price",
            "prices must satisfy start < mid < migration",
        ));
    }
    let p0 = U512::from(sqrt_start_price);
    let p1 = U512::from(sqrt_mid_price);
    let p2 = U512::from(sqrt_migration_price);
    let quote_scaled = U512::from(migration_quote_threshold) << 128usize;
    let base_scaled = U512::from(swap_base_amount) * p1 * p2;

    // x = p0·(swap·p1·p2 − threshold·2^128) / (p2 − p0)
    if base_scaled < quote_scaled {
        log::warn!(
            "Mid price {} not solvable: first segment liquidity negative",
            sqrt_mid_price
        );
        return Ok(TwoSegmentSolution::NotSolvable);
    }
    let x = p0 * (base_scaled - quote_scaled) / (p2 - p0);
    if x > quote_scaled {
        log::warn!(
            "Mid price {} not solvable: second segment liquidity negative",
            sqrt_mid_price
        );
        return Ok(TwoSegmentSolution::NotSolvable);
    }

    let l0 = narrow(x / (p1 - p0))?;
    let first_quote = amount_quote_between(sqrt_start_price, sqrt_mid_price, l0, Rounding::Up)?;
    if first_quote > migration_quote_threshold {
        return Ok(TwoSegmentSolution::NotSolvable);
    }
    let l1 = liquidity_from_quote(
        sqrt_mid_price,
        sqrt_migration_price,
        migration_quote_threshold - first_quote,
    )?;
    let curve = Curve::new(vec![
        CurvePoint::new(sqrt_mid_price, l0),
        CurvePoint::new(sqrt_migration_price, l1),
    ])?;
    Ok(TwoSegmentSolution::Solved {
        sqrt_start_price,
        curve,
    })
}

/// Mid prices tried in order: √(p0·p2), (p0·p2³)^¼, (p0³·p2)^¼
pub fn mid_price_candidates(sqrt_start_price: u128, sqrt_migration_price: u128) -> CoreResult<[u128; 3]> {
    let p0 = U512::from(sqrt_start_price);
    let p2 = U512::from(sqrt_migration_price);
    Ok([
        narrow(root_u512(p0 * p2, 2))?,
        narrow(root_u512(p0 * p2 * p2 * p2, 4))?,
        narrow(root_u512(p0 * p0 * p0 * p2, 4))?,
    ])
}

/// Two-segment curve from the initial to the migration market cap, keeping
/// `percentage_supply_on_migration` of the supply for migration
pub fn build_curve_with_two_segments(
    params: &CurveDesignParams,
    initial_market_cap: Decimal,
    migration_market_cap: Decimal,
    percentage_supply_on_migration: Decimal,
) -> CoreResult<CurveDesign> {
    if initial_market_cap <= Decimal::ZERO || initial_market_cap >= migration_market_cap {
        return Err(CurveLaunchError::invalid_parameter(
            "initial_market_cap",
            "must be positive and below the migration market cap",
        ));
    }
    if percentage_supply_on_migration <= Decimal::ZERO
        || percentage_supply_on_migration >= Decimal::ONE_HUNDRED
    {
        return Err(CurveLaunchError::invalid_parameter(
            "percentage_supply_on_migration",
            "must be strictly between 0 and 100",
        ));
    }

    let migration_quote_amount = migration_market_cap
        .checked_mul(percentage_supply_on_migration)
        .and_then(|amount| amount.checked_div(Decimal::ONE_HUNDRED))
        .ok_or(CurveLaunchError::MathOverflow)?;
    let migration_quote_threshold = params.migration_quote_threshold_for(migration_quote_amount)?;
    let threshold = to_lamports(migration_quote_threshold, params.token_quote_decimal)?;

    let sqrt_start_price = params.sqrt_price_at_market_cap(initial_market_cap)?;
    let sqrt_migration_price = params.sqrt_price_at_market_cap(migration_market_cap)?;
    let allocation = SupplyAllocation::new(params, sqrt_migration_price, threshold)?;

    let mut solved = None;
    for sqrt_mid_price in mid_price_candidates(sqrt_start_price, sqrt_migration_price)? {
        if sqrt_mid_price <= sqrt_start_price || sqrt_mid_price >= sqrt_migration_price {
            continue;
        }
        let solution = solve_two_segment(
            sqrt_start_price,
            sqrt_mid_price,
            sqrt_migration_price,
            allocation
                .swap_base_amount
                .saturating_sub(TWO_SEGMENT_ROUNDING_MARGIN),
            threshold,
        )?;
        if let TwoSegmentSolution::Solved { curve, .. } = solution {
            log::debug!("Two segments solved with mid price {}", sqrt_mid_price);
            solved = Some(curve);
            break;
        }
    }
    let mut curve = solved.ok_or(CurveLaunchError::CurveNotSolvable)?;

    let buffer_base_amount = allocation.append_remaining(sqrt_start_price, &mut curve)?;
    allocation.assemble(params, sqrt_start_price, curve, buffer_base_amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Q64;
    use crate::designer::tests::params;
    use crate::curve::threshold::base_token_for_swap;
    use crate::math::big_int::{div_u256, u256_to_u64, U256};
    use crate::math::liquidity_math::amount_base_between;

    #[test]
    fn test_negative_liquidity_is_not_solvable() {
        // Swap supply far too small for the threshold
        assert_eq!(
            solve_two_segment(Q64, 2 * Q64, 4 * Q64, 1, 1_000_000_000).unwrap(),
            TwoSegmentSolution::NotSolvable
        );
        // Swap supply far too large for the threshold
        assert_eq!(
            solve_two_segment(Q64, 2 * Q64, 4 * Q64, 1_000_000_000_000_000_000, 1).unwrap(),
            TwoSegmentSolution::NotSolvable
        );
    }

    #[test]
    fn test_solved_segments_hit_both_targets() {
        let solution = solve_two_segment(Q64, 2 * Q64, 4 * Q64, 2_000_000_000, 8_000_000_000).unwrap();
        let TwoSegmentSolution::Solved { sqrt_start_price, curve } = solution else {
            panic!("expected a solution");
        };
        assert_eq!(sqrt_start_price, Q64);
        let [first, second] = [curve.points()[0], curve.points()[1]];
        assert_eq!(first.liquidity, 49_191_317_529_892_137_642_666_666_666);

        let base = amount_base_between(Q64, 2 * Q64, first.liquidity, Rounding::Down).unwrap()
            + amount_base_between(2 * Q64, 4 * Q64, second.liquidity, Rounding::Down).unwrap();
        let quote = amount_quote_between(Q64, 2 * Q64, first.liquidity, Rounding::Down).unwrap()
            + amount_quote_between(2 * Q64, 4 * Q64, second.liquidity, Rounding::Down).unwrap();
        assert!(2_000_000_000 - base <= 2);
        assert!(8_000_000_000 - quote <= 2);
    }

    #[test]
    fn test_mid_candidates_between_bounds() {
        let [geometric, upper, lower] = mid_price_candidates(Q64, 16 * Q64).unwrap();
        assert_eq!(geometric, 4 * Q64);
        assert_eq!(upper, 8 * Q64);
        assert_eq!(lower, 2 * Q64);
    }

    #[test]
    fn test_rejects_unordered_prices() {
        assert!(solve_two_segment(2 * Q64, Q64, 4 * Q64, 1, 1).is_err());
    }

    #[test]
    fn test_build_curve_with_two_segments() {
        let design = build_curve_with_two_segments(
            &params(),
            Decimal::from(30),
            Decimal::from(300),
            Decimal::from(20),
        )
        .unwrap();
        let points = design.config.curve.points();
        assert!(points.len() >= 2);
        assert!(points[0].sqrt_price < design.sqrt_migration_price);
        assert_eq!(points[1].sqrt_price, design.sqrt_migration_price);
    }

    /// Base one quote unit buys at the mid price, plus the withheld margin and
    /// one unit of upward rounding
    fn shortfall_bound(sqrt_mid_price: u128, sqrt_migration_price: u128) -> u64 {
        let one_quote = div_u256(
            U256::from(1u8) << 128usize,
            U256::from(sqrt_mid_price) * U256::from(sqrt_migration_price),
            Rounding::Up,
        )
        .unwrap();
        u256_to_u64(one_quote).unwrap() + TWO_SEGMENT_ROUNDING_MARGIN + 1
    }

    #[test]
    fn test_swap_supply_shortfall_is_bounded() {
        let mut with_fee = params();
        with_fee.migration_fee.fee_percentage = 10;
        let cases = [
            (params(), 30, 300, 20),
            (with_fee, 30, 300, 20),
            (params(), 10, 500, 25),
        ];

        for (launch, initial, migration, percentage) in cases {
            let design = build_curve_with_two_segments(
                &launch,
                Decimal::from(initial),
                Decimal::from(migration),
                Decimal::from(percentage),
            )
            .unwrap();
            let points = design.config.curve.points();
            let consumed = base_token_for_swap(
                design.config.sqrt_start_price,
                design.sqrt_migration_price,
                &design.config.curve,
            )
            .unwrap();

            assert!(consumed <= design.swap_base_amount);
            let shortfall = design.swap_base_amount - consumed;
            assert!(
                shortfall <= shortfall_bound(points[0].sqrt_price, design.sqrt_migration_price),
                "shortfall {} for caps {}..{}",
                shortfall,
                initial,
                migration
            );
        }
    }
}
