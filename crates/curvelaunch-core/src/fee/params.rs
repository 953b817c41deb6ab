//! # Fee Parameter Derivation
//!
//! Turns business-level fee inputs (basis points, durations, reference sizes)
//! into the factor encoding stored in a pool configuration.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};

use crate::constants::{
    BASIS_POINT_MAX, BIN_STEP_BPS_DEFAULT, BIN_STEP_BPS_U128_DEFAULT, DEFAULT_MAX_PRICE_CHANGE_BPS,
    DYNAMIC_FEE_DECAY_PERIOD_DEFAULT, DYNAMIC_FEE_FILTER_PERIOD_DEFAULT,
    DYNAMIC_FEE_REDUCTION_FACTOR_DEFAULT, DYNAMIC_FEE_ROUNDING_OFFSET, DYNAMIC_FEE_SCALING_FACTOR,
    FEE_DENOMINATOR, MAX_DYNAMIC_FEE_PERCENT, MAX_FEE_BPS, MAX_FEE_NUMERATOR,
    MAX_RATE_LIMITER_DURATION_IN_SECONDS, MAX_RATE_LIMITER_DURATION_IN_SLOTS, MIN_FEE_BPS, Q64,
};
use crate::errors::{CoreResult, CurveLaunchError};
use crate::fee::bps_to_fee_numerator;
use crate::math::big_int::{u256_to_u128, U256};
use crate::math::fixed_point::sqrt_u256;
use crate::math::safe_math::SafeMath;
use crate::types::config::ActivationType;
use crate::types::fees::{BaseFeeMode, BaseFeeSchedule, DynamicFeeConfig};

fn check_fee_bps(name: &'static str, bps: u64) -> CoreResult<()> {
    if !(MIN_FEE_BPS..=MAX_FEE_BPS).contains(&bps) {
        return Err(CurveLaunchError::invalid_parameter(
            name,
            format!("{} bps outside [{}, {}]", bps, MIN_FEE_BPS, MAX_FEE_BPS),
        ));
    }
    Ok(())
}

/// Fee scheduler decaying from `starting_fee_bps` to `ending_fee_bps`
///
/// Equal start and end fees produce a flat fee and require zero periods and
/// duration.
pub fn derive_base_fee_params(
    starting_fee_bps: u64,
    ending_fee_bps: u64,
    base_fee_mode: BaseFeeMode,
    number_of_period: u16,
    total_duration: u64,
) -> CoreResult<BaseFeeSchedule> {
    check_fee_bps("starting_fee_bps", starting_fee_bps)?;
    check_fee_bps("ending_fee_bps", ending_fee_bps)?;
    let cliff_fee_numerator = bps_to_fee_numerator(starting_fee_bps)?;

    if starting_fee_bps == ending_fee_bps {
        if number_of_period != 0 || total_duration != 0 {
            return Err(CurveLaunchError::invalid_parameter(
                "number_of_period",
                "a flat fee takes no periods and no duration",
            ));
        }
        return Ok(BaseFeeSchedule {
            cliff_fee_numerator,
            base_fee_mode: BaseFeeMode::FeeSchedulerLinear,
            first_factor: 0,
            second_factor: 0,
            third_factor: 0,
        });
    }

    if number_of_period == 0 {
        return Err(CurveLaunchError::invalid_parameter(
            "number_of_period",
            "a decaying fee needs at least one period",
        ));
    }
    if ending_fee_bps > starting_fee_bps {
        return Err(CurveLaunchError::invalid_parameter(
            "ending_fee_bps",
            "ending fee must not exceed starting fee",
        ));
    }
    let period_frequency = total_duration / number_of_period as u64;
    if period_frequency == 0 {
        return Err(CurveLaunchError::invalid_parameter(
            "total_duration",
            "duration must cover at least one point per period",
        ));
    }

    let reduction_factor = match base_fee_mode {
        BaseFeeMode::FeeSchedulerLinear => {
            let ending_fee_numerator = bps_to_fee_numerator(ending_fee_bps)?;
            (cliff_fee_numerator - ending_fee_numerator) / number_of_period as u64
        }
        BaseFeeMode::FeeSchedulerExponential => {
            exponential_reduction_factor(starting_fee_bps, ending_fee_bps, number_of_period)?
        }
        BaseFeeMode::RateLimiter => {
            return Err(CurveLaunchError::invalid_parameter(
                "base_fee_mode",
                "use derive_rate_limiter_params for a rate limiter",
            ))
        }
    };

    log::debug!(
        "Derived {:?} schedule: cliff={} periods={} frequency={} reduction={}",
        base_fee_mode,
        cliff_fee_numerator,
        number_of_period,
        period_frequency,
        reduction_factor
    );

    Ok(BaseFeeSchedule {
        cliff_fee_numerator,
        base_fee_mode,
        first_factor: number_of_period,
        second_factor: period_frequency,
        third_factor: reduction_factor,
    })
}

/// Reduction factor (bps) with end / start = (1 − rf / 10_000) ^ periods
fn exponential_reduction_factor(starting_fee_bps: u64, ending_fee_bps: u64, periods: u16) -> CoreResult<u64> {
    let ratio = Decimal::from(ending_fee_bps)
        .checked_div(Decimal::from(starting_fee_bps))
        .ok_or(CurveLaunchError::DivisionByZero)?;
    let exponent = Decimal::ONE
        .checked_div(Decimal::from(periods))
        .ok_or(CurveLaunchError::DivisionByZero)?;
    let decay_per_period = ratio
        .checked_powd(exponent)
        .ok_or(CurveLaunchError::NonFiniteResult)?;
    let reduction = (Decimal::ONE - decay_per_period) * Decimal::from(BASIS_POINT_MAX);
    reduction
        .floor()
        .to_u64()
        .ok_or(CurveLaunchError::TypeCastFailed)
}

/// Rate limiter charging `fee_increment_bps` more per `reference_amount` of input
///
/// `reference_amount` is in the quote token's smallest unit.
pub fn derive_rate_limiter_params(
    base_fee_bps: u64,
    fee_increment_bps: u16,
    reference_amount: u64,
    max_limiter_duration: u64,
    activation_type: ActivationType,
) -> CoreResult<BaseFeeSchedule> {
    check_fee_bps("base_fee_bps", base_fee_bps)?;
    if fee_increment_bps == 0 || reference_amount == 0 || max_limiter_duration == 0 {
        return Err(CurveLaunchError::invalid_parameter(
            "rate_limiter",
            "increment, reference amount and duration must all be positive",
        ));
    }
    let max_duration = match activation_type {
        ActivationType::Slot => MAX_RATE_LIMITER_DURATION_IN_SLOTS,
        ActivationType::Timestamp => MAX_RATE_LIMITER_DURATION_IN_SECONDS,
    };
    if max_limiter_duration > max_duration {
        return Err(CurveLaunchError::invalid_parameter(
            "max_limiter_duration",
            format!("{} exceeds {}", max_limiter_duration, max_duration),
        ));
    }

    let cliff_fee_numerator = bps_to_fee_numerator(base_fee_bps)?;
    let increment_numerator = bps_to_fee_numerator(fee_increment_bps as u64)?;
    if increment_numerator >= FEE_DENOMINATOR {
        return Err(CurveLaunchError::invalid_parameter(
            "fee_increment_bps",
            "increment must be below 100%",
        ));
    }
    if cliff_fee_numerator.safe_add(increment_numerator)? > MAX_FEE_NUMERATOR {
        return Err(CurveLaunchError::invalid_parameter(
            "fee_increment_bps",
            "first increment already exceeds the maximum fee",
        ));
    }

    Ok(BaseFeeSchedule {
        cliff_fee_numerator,
        base_fee_mode: BaseFeeMode::RateLimiter,
        first_factor: fee_increment_bps,
        second_factor: max_limiter_duration,
        third_factor: reference_amount,
    })
}

/// Dynamic fee whose surcharge at a `max_price_change_bps` move is 20% of the base fee
pub fn derive_dynamic_fee_params(base_fee_bps: u64, max_price_change_bps: u16) -> CoreResult<DynamicFeeConfig> {
    check_fee_bps("base_fee_bps", base_fee_bps)?;
    if max_price_change_bps == 0 || max_price_change_bps > DEFAULT_MAX_PRICE_CHANGE_BPS {
        return Err(CurveLaunchError::invalid_parameter(
            "max_price_change_bps",
            format!("must be in [1, {}]", DEFAULT_MAX_PRICE_CHANGE_BPS),
        ));
    }

    // sqrt(1 + change) in Q64
    let ratio_q128 = (U256::from(BASIS_POINT_MAX + max_price_change_bps as u64) << 128usize)
        .safe_div(U256::from(BASIS_POINT_MAX))?;
    let sqrt_ratio_q64 = u256_to_u128(sqrt_u256(ratio_q128))?;

    let delta_bin_id = sqrt_ratio_q64
        .safe_sub(Q64)?
        .safe_div(BIN_STEP_BPS_U128_DEFAULT)?
        .safe_mul(2)?;
    let max_volatility_accumulator = delta_bin_id.safe_mul(BASIS_POINT_MAX as u128)?;

    let scaled = max_volatility_accumulator.safe_mul(BIN_STEP_BPS_DEFAULT as u128)?;
    let squared = scaled.safe_mul(scaled)?;

    let base_fee_numerator = bps_to_fee_numerator(base_fee_bps)? as u128;
    let max_dynamic_fee_numerator = base_fee_numerator
        .safe_mul(MAX_DYNAMIC_FEE_PERCENT as u128)?
        .safe_div(100)?;
    let variable_fee = max_dynamic_fee_numerator
        .safe_mul(DYNAMIC_FEE_SCALING_FACTOR)?
        .safe_sub(DYNAMIC_FEE_ROUNDING_OFFSET)?;
    let variable_fee_control = variable_fee.safe_div(squared)?;

    Ok(DynamicFeeConfig {
        initialized: true,
        bin_step: BIN_STEP_BPS_DEFAULT,
        bin_step_u128: BIN_STEP_BPS_U128_DEFAULT,
        variable_fee_control: u32::try_from(variable_fee_control)
            .map_err(|_| CurveLaunchError::TypeCastFailed)?,
        max_volatility_accumulator: u32::try_from(max_volatility_accumulator)
            .map_err(|_| CurveLaunchError::TypeCastFailed)?,
        filter_period: DYNAMIC_FEE_FILTER_PERIOD_DEFAULT,
        decay_period: DYNAMIC_FEE_DECAY_PERIOD_DEFAULT,
        reduction_factor: DYNAMIC_FEE_REDUCTION_FACTOR_DEFAULT,
    })
}
