//! # Curve Traversal
//!
//! Walks the liquidity segments of a curve from the current sqrt price,
//! consuming a trade amount segment by segment.
//!
//! Selling base moves the price down through the segments in reverse; the part
//! of the trade left once the lowest defined boundary is crossed is absorbed by
//! the first segment's liquidity, bounded only by `MIN_SQRT_PRICE`. Selling
//! quote moves the price up and must be fully absorbed by defined segments.
//!
//! Amounts the pool receives round up; amounts the pool pays out round down.

use crate::constants::MIN_SQRT_PRICE;
use crate::errors::{CoreResult, CurveLaunchError};
use crate::math::big_int::{u256_to_u64, Rounding, U256};
use crate::math::liquidity_math::{
    amount_base_between, amount_base_between_256, amount_quote_between,
    amount_quote_between_256, next_sqrt_price_from_input, next_sqrt_price_from_output,
};
use crate::math::safe_math::SafeMath;
use crate::types::curve::{Curve, CurvePoint};

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

/// Outcome of walking a curve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct TraversalResult {
    /// Output for exact-in traversals, required input for exact-out traversals
    pub amount: u64,
    pub next_sqrt_price: u128,
}

fn is_unset(point: &CurvePoint) -> bool {
    point.sqrt_price == 0 || point.liquidity == 0
}

// ============================================================================
// Exact Input
// ============================================================================

/// Sell `amount_in` base, returning the quote paid out
pub fn traverse_from_base(
    curve: &Curve,
    current_sqrt_price: u128,
    amount_in: u64,
) -> CoreResult<TraversalResult> {
    let points = curve.points();
    let first = points.first().ok_or(CurveLaunchError::InsufficientLiquidity)?;

    let mut total_output = U256::ZERO;
    let mut sqrt_price = current_sqrt_price;
    let mut amount_left = amount_in;

    for i in (0..points.len().saturating_sub(1)).rev() {
        if is_unset(&points[i]) || points[i].sqrt_price >= sqrt_price {
            continue;
        }
        let liquidity = points[i + 1].liquidity;
        let max_amount_in =
            amount_base_between_256(points[i].sqrt_price, sqrt_price, liquidity, Rounding::Up)?;

        if U256::from(amount_left) < max_amount_in {
            let next_sqrt_price = next_sqrt_price_from_input(sqrt_price, liquidity, amount_left, true)?;
            let output =
                amount_quote_between_256(next_sqrt_price, sqrt_price, liquidity, Rounding::Down)?;
            total_output = total_output.safe_add(output)?;
            sqrt_price = next_sqrt_price;
            amount_left = 0;
            break;
        }

        let next_sqrt_price = points[i].sqrt_price;
        let output = amount_quote_between_256(next_sqrt_price, sqrt_price, liquidity, Rounding::Down)?;
        total_output = total_output.safe_add(output)?;
        sqrt_price = next_sqrt_price;
        amount_left = amount_left.safe_sub(u256_to_u64(max_amount_in)?)?;
    }

    if amount_left != 0 {
        let next_sqrt_price = next_sqrt_price_from_input(sqrt_price, first.liquidity, amount_left, true)?;
        if next_sqrt_price < MIN_SQRT_PRICE {
            return Err(CurveLaunchError::InsufficientLiquidity);
        }
        let output =
            amount_quote_between_256(next_sqrt_price, sqrt_price, first.liquidity, Rounding::Down)?;
        total_output = total_output.safe_add(output)?;
        sqrt_price = next_sqrt_price;
    }

    Ok(TraversalResult {
        amount: u256_to_u64(total_output)?,
        next_sqrt_price: sqrt_price,
    })
}

/// Sell `amount_in` quote, returning the base paid out
pub fn traverse_from_quote(
    curve: &Curve,
    current_sqrt_price: u128,
    amount_in: u64,
) -> CoreResult<TraversalResult> {
    let mut total_output = U256::ZERO;
    let mut sqrt_price = current_sqrt_price;
    let mut amount_left = amount_in;

    for point in curve.iter() {
        if is_unset(point) {
            break;
        }
        if point.sqrt_price <= sqrt_price {
            continue;
        }
        let max_amount_in =
            amount_quote_between_256(sqrt_price, point.sqrt_price, point.liquidity, Rounding::Up)?;

        if U256::from(amount_left) < max_amount_in {
            let next_sqrt_price =
                next_sqrt_price_from_input(sqrt_price, point.liquidity, amount_left, false)?;
            let output =
                amount_base_between_256(sqrt_price, next_sqrt_price, point.liquidity, Rounding::Down)?;
            total_output = total_output.safe_add(output)?;
            sqrt_price = next_sqrt_price;
            amount_left = 0;
            break;
        }

        let next_sqrt_price = point.sqrt_price;
        let output =
            amount_base_between_256(sqrt_price, next_sqrt_price, point.liquidity, Rounding::Down)?;
        total_output = total_output.safe_add(output)?;
        sqrt_price = next_sqrt_price;
        amount_left = amount_left.safe_sub(u256_to_u64(max_amount_in)?)?;
    }

    if amount_left != 0 {
        return Err(CurveLaunchError::InsufficientLiquidity);
    }

    Ok(TraversalResult {
        amount: u256_to_u64(total_output)?,
        next_sqrt_price: sqrt_price,
    })
}

// ============================================================================
// Exact Output
// ============================================================================

/// Base required to receive exactly `amount_out` quote
pub fn traverse_from_base_for_output(
    curve: &Curve,
    current_sqrt_price: u128,
    amount_out: u64,
) -> CoreResult<TraversalResult> {
    let points = curve.points();
    let first = points.first().ok_or(CurveLaunchError::InsufficientLiquidity)?;

    let mut total_input: u64 = 0;
    let mut sqrt_price = current_sqrt_price;
    let mut amount_left = amount_out;

    for i in (0..points.len().saturating_sub(1)).rev() {
        if is_unset(&points[i]) || points[i].sqrt_price >= sqrt_price {
            continue;
        }
        let liquidity = points[i + 1].liquidity;
        let max_amount_out =
            amount_quote_between_256(points[i].sqrt_price, sqrt_price, liquidity, Rounding::Down)?;

        if U256::from(amount_left) < max_amount_out {
            let next_sqrt_price = next_sqrt_price_from_output(sqrt_price, liquidity, amount_left, true)?;
            let input = amount_base_between(next_sqrt_price, sqrt_price, liquidity, Rounding::Up)?;
            total_input = total_input.safe_add(input)?;
            sqrt_price = next_sqrt_price;
            amount_left = 0;
            break;
        }

        let next_sqrt_price = points[i].sqrt_price;
        let input = amount_base_between(next_sqrt_price, sqrt_price, liquidity, Rounding::Up)?;
        total_input = total_input.safe_add(input)?;
        sqrt_price = next_sqrt_price;
        amount_left = amount_left.safe_sub(u256_to_u64(max_amount_out)?)?;
    }

    if amount_left != 0 {
        let next_sqrt_price =
            next_sqrt_price_from_output(sqrt_price, first.liquidity, amount_left, true)?;
        if next_sqrt_price < MIN_SQRT_PRICE {
            return Err(CurveLaunchError::InsufficientLiquidity);
        }
        let input = amount_base_between(next_sqrt_price, sqrt_price, first.liquidity, Rounding::Up)?;
        total_input = total_input.safe_add(input)?;
        sqrt_price = next_sqrt_price;
    }

    Ok(TraversalResult {
        amount: total_input,
        next_sqrt_price: sqrt_price,
    })
}

/// Quote required to receive exactly `amount_out` base
pub fn traverse_from_quote_for_output(
    curve: &Curve,
    current_sqrt_price: u128,
    amount_out: u64,
) -> CoreResult<TraversalResult> {
    let mut total_input: u64 = 0;
    let mut sqrt_price = current_sqrt_price;
    let mut amount_left = amount_out;

    for point in curve.iter() {
        if is_unset(point) {
            break;
        }
        if point.sqrt_price <= sqrt_price {
            continue;
        }
        let max_amount_out =
            amount_base_between_256(sqrt_price, point.sqrt_price, point.liquidity, Rounding::Down)?;

        if U256::from(amount_left) < max_amount_out {
            let next_sqrt_price =
                next_sqrt_price_from_output(sqrt_price, point.liquidity, amount_left, false)?;
            let input =
                amount_quote_between(sqrt_price, next_sqrt_price, point.liquidity, Rounding::Up)?;
            total_input = total_input.safe_add(input)?;
            sqrt_price = next_sqrt_price;
            amount_left = 0;
            break;
        }

        let next_sqrt_price = point.sqrt_price;
        let input = amount_quote_between(sqrt_price, next_sqrt_price, point.liquidity, Rounding::Up)?;
        total_input = total_input.safe_add(input)?;
        sqrt_price = next_sqrt_price;
        amount_left = amount_left.safe_sub(u256_to_u64(max_amount_out)?)?;
    }

    if amount_left != 0 {
        return Err(CurveLaunchError::InsufficientLiquidity);
    }

    Ok(TraversalResult {
        amount: total_input,
        next_sqrt_price: sqrt_price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Q64;

    fn two_segment_curve() -> Curve {
        Curve::new(vec![
            CurvePoint::new(2 * Q64, 1u128 << 100),
            CurvePoint::new(4 * Q64, 1u128 << 99),
        ])
        .unwrap()
    }

    #[test]
    fn test_quote_in_within_first_segment() {
        let curve = two_segment_curve();
        let result = traverse_from_quote(&curve, Q64, 1_000).unwrap();
        assert!(result.amount > 0);
        assert!(result.next_sqrt_price > Q64 && result.next_sqrt_price < 2 * Q64);
    }

    #[test]
    fn test_quote_in_crosses_segments() {
        let curve = two_segment_curve();
        let first_segment = amount_quote_between(Q64, 2 * Q64, 1u128 << 100, Rounding::Up).unwrap();
        let result = traverse_from_quote(&curve, Q64, first_segment + 10).unwrap();
        assert!(result.next_sqrt_price > 2 * Q64);
    }

    #[test]
    fn test_quote_in_beyond_curve_fails() {
        let curve = two_segment_curve();
        let first = amount_quote_between(Q64, 2 * Q64, 1u128 << 100, Rounding::Up).unwrap();
        let second = amount_quote_between(2 * Q64, 4 * Q64, 1u128 << 99, Rounding::Up).unwrap();
        assert_eq!(
            traverse_from_quote(&curve, Q64, first + second + 1),
            Err(CurveLaunchError::InsufficientLiquidity)
        );
        // Exactly the full curve is absorbed and lands on the last point
        let full = traverse_from_quote(&curve, Q64, first + second).unwrap();
        assert_eq!(full.next_sqrt_price, 4 * Q64);
    }

    #[test]
    fn test_base_in_uses_upper_segment_liquidity() {
        let curve = two_segment_curve();
        // From 3.0 the price sits in the second segment
        let current = 3 * Q64;
        let result = traverse_from_base(&curve, current, 1_000).unwrap();
        assert!(result.next_sqrt_price < current);
        assert!(result.next_sqrt_price > 2 * Q64);
        let expected_price = crate::math::next_sqrt_price_from_base_input(current, 1u128 << 99, 1_000).unwrap();
        assert_eq!(result.next_sqrt_price, expected_price);
    }

    #[test]
    fn test_base_in_below_curve_uses_first_liquidity() {
        let curve = two_segment_curve();
        let result = traverse_from_base(&curve, Q64, 1_000).unwrap();
        let expected_price = crate::math::next_sqrt_price_from_base_input(Q64, 1u128 << 100, 1_000).unwrap();
        assert_eq!(result.next_sqrt_price, expected_price);
    }

    #[test]
    fn test_base_in_hits_price_floor() {
        let curve = Curve::new(vec![CurvePoint::new(2 * Q64, 1u128 << 64)]).unwrap();
        assert_eq!(
            traverse_from_base(&curve, Q64, u64::MAX),
            Err(CurveLaunchError::InsufficientLiquidity)
        );
    }

    #[test]
    fn test_exact_out_covers_exact_in() {
        let curve = two_segment_curve();
        let forward = traverse_from_quote(&curve, Q64, 5_000_000).unwrap();
        let inverse = traverse_from_quote_for_output(&curve, Q64, forward.amount).unwrap();
        assert!(inverse.amount <= 5_000_000);
        assert!(inverse.next_sqrt_price <= forward.next_sqrt_price);

        let forward = traverse_from_base(&curve, 3 * Q64, 5_000_000).unwrap();
        let inverse = traverse_from_base_for_output(&curve, 3 * Q64, forward.amount).unwrap();
        assert!(inverse.amount <= 5_000_000);
        assert!(inverse.next_sqrt_price >= forward.next_sqrt_price);
    }

    #[test]
    fn test_exact_out_beyond_curve_fails() {
        let curve = two_segment_curve();
        let all_base = amount_base_between(Q64, 2 * Q64, 1u128 << 100, Rounding::Down).unwrap()
            + amount_base_between(2 * Q64, 4 * Q64, 1u128 << 99, Rounding::Down).unwrap();
        assert_eq!(
            traverse_from_quote_for_output(&curve, Q64, all_base + 1),
            Err(CurveLaunchError::InsufficientLiquidity)
        );
    }

    #[test]
    fn test_empty_curve() {
        let curve = Curve::default();
        assert!(traverse_from_base(&curve, Q64, 1).is_err());
        assert!(traverse_from_quote(&curve, Q64, 1).is_err());
    }
}
