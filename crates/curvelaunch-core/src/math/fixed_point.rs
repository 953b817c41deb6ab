//! # Fixed-Point Arithmetic
//!
//! Q64.64 helpers used by the fee scheduler and the curve designer: binary
//! exponentiation of a Q64 fraction and integer square roots of wide values.

use crate::constants::{BASIS_POINT_MAX, Q64, RESOLUTION};
use crate::errors::{CoreResult, CurveLaunchError};
use crate::math::big_int::U256;
use crate::math::safe_math::SafeMath;

// ============================================================================
// Conversions
// ============================================================================

/// Convert u64 integer to Q64.64 fixed-point
pub fn u64_to_q64(value: u64) -> u128 {
    (value as u128) << RESOLUTION
}

/// Convert a basis-point value to a Q64 fraction, rounding down
pub fn bps_to_q64(bps: u64) -> CoreResult<u128> {
    (bps as u128)
        .safe_shl(RESOLUTION as u32)?
        .safe_div(BASIS_POINT_MAX as u128)
}

// ============================================================================
// Powers and Roots
// ============================================================================

/// Raise a Q64 fraction in `[0, 1]` to an integer power
///
/// Binary exponentiation with a floor after every multiply, so the result
/// never exceeds the exact value. `exponent` 0 returns one (Q64).
pub fn pow_q64(base: u128, exponent: u32) -> CoreResult<u128> {
    if base > Q64 {
        return Err(CurveLaunchError::MathOverflow);
    }
    match exponent {
        0 => return Ok(Q64),
        1 => return Ok(base),
        _ => {}
    }
    if base == Q64 || base == 0 {
        return Ok(base);
    }

    let mut result = Q64;
    let mut squared = base;
    let mut remaining = exponent;
    while remaining > 0 {
        if remaining & 1 == 1 {
            result = result.safe_mul(squared)? >> RESOLUTION;
        }
        remaining >>= 1;
        if remaining > 0 {
            squared = squared.safe_mul(squared)? >> RESOLUTION;
        }
    }
    Ok(result)
}

/// Floor square root of a U256
pub fn sqrt_u256(value: U256) -> U256 {
    if value.is_zero() {
        return value;
    }
    value.root(2)
}

/// Floor square root of a u128
pub fn sqrt_u128(value: u128) -> u128 {
    // Root of a u128 always fits back into u64
    let root = sqrt_u256(U256::from(value));
    u128::try_from(root).unwrap_or(u64::MAX as u128)
}
