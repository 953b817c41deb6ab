//! # Dynamic Fee
//!
//! Volatility surcharge added on top of the base fee:
//! ceil((volatility_accumulator · bin_step)² · variable_fee_control / 1e11).

use crate::constants::{
    BASIS_POINT_MAX, BIN_STEP_BPS_DEFAULT, BIN_STEP_BPS_U128_DEFAULT, DYNAMIC_FEE_ROUNDING_OFFSET,
    DYNAMIC_FEE_SCALING_FACTOR, MAX_DYNAMIC_FEE_PERCENT, U24_MAX,
};
use crate::errors::{ConfigViolation, CoreResult};
use crate::math::big_int::{u256_to_u64, U256};
use crate::math::safe_math::SafeMath;
use crate::types::fees::{DynamicFeeConfig, VolatilityTracker};

/// Surcharge numerator for a given accumulator value
pub fn variable_fee_numerator(config: &DynamicFeeConfig, volatility_accumulator: u128) -> CoreResult<u64> {
    if !config.initialized || volatility_accumulator == 0 {
        return Ok(0);
    }
    let scaled = U256::from(volatility_accumulator).safe_mul(U256::from(config.bin_step))?;
    let squared = scaled.safe_mul(scaled)?;
    let fee = squared
        .safe_mul(U256::from(config.variable_fee_control))?
        .safe_add(U256::from(DYNAMIC_FEE_ROUNDING_OFFSET))?
        .safe_div(U256::from(DYNAMIC_FEE_SCALING_FACTOR))?;
    u256_to_u64(fee)
}

/// Surcharge numerator for the pool's current volatility
pub fn dynamic_fee_numerator(config: &DynamicFeeConfig, tracker: &VolatilityTracker) -> CoreResult<u64> {
    variable_fee_numerator(config, tracker.volatility_accumulator)
}

/// Check an initialized dynamic fee against the minimum base fee it rides on
pub fn validate_dynamic_fee(
    config: &DynamicFeeConfig,
    min_base_fee_numerator: u64,
) -> Result<(), ConfigViolation> {
    if !config.initialized {
        return Ok(());
    }
    if config.bin_step != BIN_STEP_BPS_DEFAULT {
        return Err(ConfigViolation::InvalidDynamicFee("bin step must be the default"));
    }
    if config.bin_step_u128 != BIN_STEP_BPS_U128_DEFAULT {
        return Err(ConfigViolation::InvalidDynamicFee("bin step fraction must be the default"));
    }
    if config.filter_period >= config.decay_period {
        return Err(ConfigViolation::InvalidDynamicFee("filter period must be below decay period"));
    }
    if config.reduction_factor as u64 > BASIS_POINT_MAX {
        return Err(ConfigViolation::InvalidDynamicFee("reduction factor above 10000 bps"));
    }
    if config.variable_fee_control > U24_MAX {
        return Err(ConfigViolation::InvalidDynamicFee("variable fee control exceeds 24 bits"));
    }
    if config.max_volatility_accumulator > U24_MAX {
        return Err(ConfigViolation::InvalidDynamicFee("max volatility accumulator exceeds 24 bits"));
    }

    let max_dynamic_fee = variable_fee_numerator(config, config.max_volatility_accumulator as u128)
        .map_err(|_| ConfigViolation::InvalidDynamicFee("dynamic fee overflows"))?;
    let allowed = (min_base_fee_numerator as u128) * (MAX_DYNAMIC_FEE_PERCENT as u128) / 100;
    if max_dynamic_fee as u128 > allowed {
        return Err(ConfigViolation::InvalidDynamicFee("exceeds 20% of the minimum base fee"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{
        DYNAMIC_FEE_DECAY_PERIOD_DEFAULT, DYNAMIC_FEE_FILTER_PERIOD_DEFAULT,
        DYNAMIC_FEE_REDUCTION_FACTOR_DEFAULT,
    };

    fn config(variable_fee_control: u32, max_volatility_accumulator: u32) -> DynamicFeeConfig {
        DynamicFeeConfig {
            initialized: true,
            bin_step: BIN_STEP_BPS_DEFAULT,
            bin_step_u128: BIN_STEP_BPS_U128_DEFAULT,
            variable_fee_control,
            max_volatility_accumulator,
            filter_period: DYNAMIC_FEE_FILTER_PERIOD_DEFAULT,
            decay_period: DYNAMIC_FEE_DECAY_PERIOD_DEFAULT,
            reduction_factor: DYNAMIC_FEE_REDUCTION_FACTOR_DEFAULT,
        }
    }

    #[test]
    fn test_uninitialized_or_calm_is_zero() {
        let tracker = VolatilityTracker {
            volatility_accumulator: 1_000_000,
            ..Default::default()
        };
        assert_eq!(dynamic_fee_numerator(&DynamicFeeConfig::default(), &tracker).unwrap(), 0);
        assert_eq!(
            dynamic_fee_numerator(&config(956, 14_460_000), &VolatilityTracker::default()).unwrap(),
            0
        );
    }

    #[test]
    fn test_surcharge_rounds_up() {
        // (10 · 1)² · 1 = 100, far below the scale, still charges 1
        assert_eq!(variable_fee_numerator(&config(1, 100), 10).unwrap(), 1);
        // (1e6)² · 100 / 1e11 = 1e3 exactly
        assert_eq!(variable_fee_numerator(&config(100, 100), 1_000_000).unwrap(), 1_000);
    }

    #[test]
    fn test_validation() {
        let ok = config(956, 14_460_000);
        // 1% minimum base fee allows a 0.2% surcharge
        assert!(validate_dynamic_fee(&ok, 10_000_000).is_ok());
        assert!(validate_dynamic_fee(&ok, 1_000_000).is_err());

        let bad_periods = DynamicFeeConfig {
            filter_period: 200,
            ..ok
        };
        assert!(validate_dynamic_fee(&bad_periods, 10_000_000).is_err());

        let wide = DynamicFeeConfig {
            max_volatility_accumulator: U24_MAX + 1,
            ..ok
        };
        assert!(validate_dynamic_fee(&wide, 10_000_000).is_err());
        assert!(validate_dynamic_fee(&DynamicFeeConfig::default(), 0).is_ok());
    }
}
