//! # Migration Amounts
//!
//! Token amounts handed to the destination pool once the curve completes.

use crate::constants::{MAX_SQRT_PRICE, MIN_SQRT_PRICE};
use crate::errors::{CoreResult, CurveLaunchError};
use crate::math::big_int::{div_u256, mul_div_u64, u256_to_u64, Rounding, U256};
use crate::math::liquidity_math::{amount_base_between, liquidity_from_quote};
use crate::math::safe_math::SafeMath;
use crate::types::config::{LockedVestingSchedule, MigrationOption};

/// Quote deposited into the destination pool after the migration fee
pub fn migration_quote_amount(migration_quote_threshold: u64, migration_fee_percentage: u8) -> CoreResult<u64> {
    let keep = 100u64.safe_sub(migration_fee_percentage as u64)?;
    mul_div_u64(migration_quote_threshold, keep, 100, Rounding::Down)
}

/// Base paired with `quote_amount` in the destination pool at the migration price
pub fn migration_base_amount(
    quote_amount: u64,
    sqrt_migration_price: u128,
    migration_option: MigrationOption,
) -> CoreResult<u64> {
    match migration_option {
        MigrationOption::ConstantProduct => {
            let price = U256::from(sqrt_migration_price).safe_mul(U256::from(sqrt_migration_price))?;
            let quote = U256::from(quote_amount).safe_shl(128)?;
            u256_to_u64(div_u256(quote, price, Rounding::Up)?)
        }
        MigrationOption::ConcentratedFullRange => {
            let liquidity = liquidity_from_quote(MIN_SQRT_PRICE, sqrt_migration_price, quote_amount)?;
            amount_base_between(sqrt_migration_price, MAX_SQRT_PRICE, liquidity, Rounding::Up)
        }
    }
}

/// Base supply a configuration needs: swap supply, migration base and vesting
pub fn minimum_base_supply(
    swap_base_amount: u64,
    migration_base_amount: u64,
    locked_vesting: &LockedVestingSchedule,
) -> CoreResult<u64> {
    let vesting = locked_vesting
        .total_amount()
        .ok_or(CurveLaunchError::MathOverflow)?;
    swap_base_amount
        .safe_add(migration_base_amount)?
        .safe_add(vesting)
}
