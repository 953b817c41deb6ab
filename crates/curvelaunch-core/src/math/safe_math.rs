//! # Safe Math Operations
//!
//! Overflow-checked arithmetic shared by every component. One trait covers the
//! primitive widths and `U256`, so call sites read the same regardless of the
//! operand type and never wrap silently.

use crate::errors::{CoreResult, CurveLaunchError};
use crate::math::big_int::U256;

/// Checked arithmetic returning [`CurveLaunchError`] instead of wrapping
pub trait SafeMath: Sized {
    fn safe_add(self, rhs: Self) -> CoreResult<Self>;
    fn safe_sub(self, rhs: Self) -> CoreResult<Self>;
    fn safe_mul(self, rhs: Self) -> CoreResult<Self>;
    fn safe_div(self, rhs: Self) -> CoreResult<Self>;
    fn safe_shl(self, offset: u32) -> CoreResult<Self>;
    fn safe_shr(self, offset: u32) -> CoreResult<Self>;
}

/// Macro to generate safe arithmetic for primitive unsigned integers
macro_rules! safe_math_primitive {
    ($($type:ty),*) => {$(
        impl SafeMath for $type {
            fn safe_add(self, rhs: Self) -> CoreResult<Self> {
                self.checked_add(rhs).ok_or(CurveLaunchError::MathOverflow)
            }

            fn safe_sub(self, rhs: Self) -> CoreResult<Self> {
                self.checked_sub(rhs).ok_or(CurveLaunchError::MathUnderflow)
            }

            fn safe_mul(self, rhs: Self) -> CoreResult<Self> {
                self.checked_mul(rhs).ok_or(CurveLaunchError::MathOverflow)
            }

            fn safe_div(self, rhs: Self) -> CoreResult<Self> {
                if rhs == 0 {
                    return Err(CurveLaunchError::DivisionByZero);
                }
                Ok(self / rhs)
            }

            fn safe_shl(self, offset: u32) -> CoreResult<Self> {
                if offset >= <$type>::BITS || self.leading_zeros() < offset {
                    return Err(CurveLaunchError::MathOverflow);
                }
                Ok(self << offset)
            }

            fn safe_shr(self, offset: u32) -> CoreResult<Self> {
                self.checked_shr(offset).ok_or(CurveLaunchError::MathOverflow)
            }
        }
    )*};
}

safe_math_primitive!(u8, u16, u32, u64, u128);

impl SafeMath for U256 {
    fn safe_add(self, rhs: Self) -> CoreResult<Self> {
        self.checked_add(rhs).ok_or(CurveLaunchError::MathOverflow)
    }

    fn safe_sub(self, rhs: Self) -> CoreResult<Self> {
        self.checked_sub(rhs).ok_or(CurveLaunchError::MathUnderflow)
    }

    fn safe_mul(self, rhs: Self) -> CoreResult<Self> {
        self.checked_mul(rhs).ok_or(CurveLaunchError::MathOverflow)
    }

    fn safe_div(self, rhs: Self) -> CoreResult<Self> {
        self.checked_div(rhs).ok_or(CurveLaunchError::DivisionByZero)
    }

    fn safe_shl(self, offset: u32) -> CoreResult<Self> {
        if offset as usize >= Self::BITS || (self.leading_zeros() as u32) < offset {
            return Err(CurveLaunchError::MathOverflow);
        }
        Ok(self << offset as usize)
    }

    fn safe_shr(self, offset: u32) -> CoreResult<Self> {
        if offset as usize >= Self::BITS {
            return Err(CurveLaunchError::MathOverflow);
        }
        Ok(self >> offset as usize)
    }
}

/// Exact left shift
pub fn shift_left(value: u128, offset: u32) -> CoreResult<u128> {
    value.safe_shl(offset)
}

/// Right shift (floor)
pub fn shift_right(value: u128, offset: u32) -> CoreResult<u128> {
    value.safe_shr(offset)
}

/// Subtraction that fails instead of wrapping
pub fn sub(a: u128, b: u128) -> CoreResult<u128> {
    a.safe_sub(b)
}

/// Apply a percentage (0..=100) to an amount, rounding down
pub fn safe_percentage_u64(amount: u64, percentage: u8) -> CoreResult<u64> {
    if percentage > 100 {
        return Err(CurveLaunchError::MathOverflow);
    }
    let result = (amount as u128) * (percentage as u128) / 100;
    u64::try_from(result).map_err(|_| CurveLaunchError::TypeCastFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_sub_underflow() {
        assert_eq!(sub(5, 3).unwrap(), 2);
        assert_eq!(sub(3, 5), Err(CurveLaunchError::MathUnderflow));
        assert_eq!(1u64.safe_sub(2), Err(CurveLaunchError::MathUnderflow));
        assert_eq!(
            U256::from(1u8).safe_sub(U256::from(2u8)),
            Err(CurveLaunchError::MathUnderflow)
        );
    }

    #[test]
    fn test_safe_shifts() {
        assert_eq!(shift_left(1, 127).unwrap(), 1u128 << 127);
        assert_eq!(shift_left(2, 127), Err(CurveLaunchError::MathOverflow));
        assert_eq!(shift_left(1, 128), Err(CurveLaunchError::MathOverflow));
        assert_eq!(shift_right(1u128 << 100, 36).unwrap(), 1u128 << 64);

        let wide = U256::from(u64::MAX).safe_shl(128).unwrap();
        assert_eq!(wide >> 128usize, U256::from(u64::MAX));
        assert!(U256::MAX.safe_shl(1).is_err());
    }

    #[test]
    fn test_safe_div_zero() {
        assert_eq!(10u64.safe_div(0), Err(CurveLaunchError::DivisionByZero));
        assert_eq!(
            U256::from(10u8).safe_div(U256::ZERO),
            Err(CurveLaunchError::DivisionByZero)
        );
    }

    #[test]
    fn test_percentage() {
        assert_eq!(safe_percentage_u64(1_000, 20).unwrap(), 200);
        assert_eq!(safe_percentage_u64(999, 20).unwrap(), 199);
        assert!(safe_percentage_u64(1, 101).is_err());
    }
}
