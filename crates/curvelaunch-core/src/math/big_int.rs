//! Big integer operations for high-precision math
//!
//! Wide unsigned integers come from `ruint`. Every division takes an explicit
//! [`Rounding`] and every narrowing conversion is checked, so intermediate
//! products of two 128-bit operands never overflow and results never wrap.

use crate::errors::{CoreResult, CurveLaunchError};

pub use ruint::aliases::{U256, U512};

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

/// Rounding mode for division operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub enum Rounding {
    /// Round down (towards zero)
    Down,
    /// Round up (away from zero)
    Up,
}

/// Multiply two U256 values and divide by a third with specified rounding
/// result = (a * b) / denominator
pub fn mul_div_u256(a: U256, b: U256, denominator: U256, rounding: Rounding) -> CoreResult<U256> {
    if denominator.is_zero() {
        return Err(CurveLaunchError::DivisionByZero);
    }

    // U512 holds the full product of two U256 values
    let product = U512::from(a) * U512::from(b);
    let (quotient, remainder) = product.div_rem(U512::from(denominator));

    let quotient = U256::checked_from_uint(quotient).ok_or(CurveLaunchError::MathOverflow)?;

    match rounding {
        Rounding::Up if !remainder.is_zero() => quotient
            .checked_add(U256::from(1u8))
            .ok_or(CurveLaunchError::MathOverflow),
        _ => Ok(quotient),
    }
}

/// Multiply two u128 values and divide by a third with specified rounding
pub fn mul_div_u128(a: u128, b: u128, denominator: u128, rounding: Rounding) -> CoreResult<u128> {
    let result = mul_div_u256(
        U256::from(a),
        U256::from(b),
        U256::from(denominator),
        rounding,
    )?;
    u256_to_u128(result)
}

/// floor(x * y / denominator)
pub fn mul_div_floor(x: u128, y: u128, denominator: u128) -> CoreResult<u128> {
    mul_div_u128(x, y, denominator, Rounding::Down)
}

/// ceil(x * y / denominator)
pub fn mul_div_ceil(x: u128, y: u128, denominator: u128) -> CoreResult<u128> {
    mul_div_u128(x, y, denominator, Rounding::Up)
}

/// Multiply two u64 values and divide by a third with specified rounding
pub fn mul_div_u64(a: u64, b: u64, denominator: u64, rounding: Rounding) -> CoreResult<u64> {
    if denominator == 0 {
        return Err(CurveLaunchError::DivisionByZero);
    }

    let product = (a as u128) * (b as u128);
    let quotient = product / (denominator as u128);
    let remainder = product % (denominator as u128);

    let result = if rounding == Rounding::Up && remainder > 0 {
        quotient + 1
    } else {
        quotient
    };

    u64::try_from(result).map_err(|_| CurveLaunchError::TypeCastFailed)
}

/// Divide a U256 by another with specified rounding
pub fn div_u256(numerator: U256, denominator: U256, rounding: Rounding) -> CoreResult<U256> {
    if denominator.is_zero() {
        return Err(CurveLaunchError::DivisionByZero);
    }
    let (quotient, remainder) = numerator.div_rem(denominator);
    match rounding {
        Rounding::Up if !remainder.is_zero() => quotient
            .checked_add(U256::from(1u8))
            .ok_or(CurveLaunchError::MathOverflow),
        _ => Ok(quotient),
    }
}

/// Narrow a U256 to u128
pub fn u256_to_u128(value: U256) -> CoreResult<u128> {
    u128::try_from(value).map_err(|_| CurveLaunchError::TypeCastFailed)
}

/// Narrow a U256 to u64
pub fn u256_to_u64(value: U256) -> CoreResult<u64> {
    u64::try_from(value).map_err(|_| CurveLaunchError::TypeCastFailed)
}

/// Floor of the n-th root of a U512
pub fn root_u512(value: U512, degree: usize) -> U512 {
    if value.is_zero() {
        return value;
    }
    value.root(degree)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_rounding() {
        // 30 / 4 = 7.5
        assert_eq!(mul_div_u64(10, 3, 4, Rounding::Down).unwrap(), 7);
        assert_eq!(mul_div_u64(10, 3, 4, Rounding::Up).unwrap(), 8);

        // Exact division never rounds
        assert_eq!(mul_div_u64(10, 4, 5, Rounding::Up).unwrap(), 8);
        assert_eq!(mul_div_ceil(10, 4, 5).unwrap(), 8);
    }

    #[test]
    fn test_mul_div_large_numbers() {
        let a = u128::MAX / 2;
        assert_eq!(mul_div_floor(a, 2, 2).unwrap(), a);

        // Intermediate product far beyond u128
        let result = mul_div_floor(u128::MAX, u128::MAX, u128::MAX).unwrap();
        assert_eq!(result, u128::MAX);
    }

    #[test]
    fn test_mul_div_errors() {
        assert_eq!(
            mul_div_floor(1, 1, 0),
            Err(CurveLaunchError::DivisionByZero)
        );
        assert_eq!(
            mul_div_u64(1, 1, 0, Rounding::Up),
            Err(CurveLaunchError::DivisionByZero)
        );
        assert_eq!(
            mul_div_floor(u128::MAX, 2, 1),
            Err(CurveLaunchError::TypeCastFailed)
        );
        assert_eq!(
            mul_div_u256(U256::MAX, U256::MAX, U256::from(1u8), Rounding::Down),
            Err(CurveLaunchError::MathOverflow)
        );
    }

    #[test]
    fn test_mul_div_u256_narrows_wide_quotient() {
        // Product needs 257 bits, quotient fits exactly
        let two = U256::from(2u8);
        assert_eq!(mul_div_u256(U256::MAX, two, two, Rounding::Down).unwrap(), U256::MAX);
        assert_eq!(mul_div_u256(U256::MAX, two, two, Rounding::Up).unwrap(), U256::MAX);
        assert_eq!(
            mul_div_u256(U256::MAX, U256::from(3u8), two, Rounding::Down),
            Err(CurveLaunchError::MathOverflow)
        );
    }

    #[test]
    fn test_div_u256_rounding() {
        let seven = U256::from(7u8);
        let two = U256::from(2u8);
        assert_eq!(div_u256(seven, two, Rounding::Down).unwrap(), U256::from(3u8));
        assert_eq!(div_u256(seven, two, Rounding::Up).unwrap(), U256::from(4u8));
    }

    #[test]
    fn test_integer_roots() {
        assert_eq!(root_u512(U512::from(1u128 << 100), 2), U512::from(1u128 << 50));
        assert_eq!(root_u512(U512::from(81u8), 4), U512::from(3u8));
        assert_eq!(root_u512(U512::from(80u8), 4), U512::from(2u8));
        assert_eq!(root_u512(U512::ZERO, 2), U512::ZERO);
    }
}
