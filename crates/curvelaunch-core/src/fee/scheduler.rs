//! # Fee Scheduler
//!
//! Time-decaying base fee: the cliff fee applies at activation and decays every
//! `period_frequency` points (slots or seconds) for `number_of_period` periods,
//! either by a constant step or by a constant ratio.

use crate::constants::{BASIS_POINT_MAX, MAX_FEE_NUMERATOR, MIN_FEE_NUMERATOR, Q64, RESOLUTION};
use crate::errors::{ConfigViolation, CoreResult, CurveLaunchError};
use crate::fee::BaseFeeHandler;
use crate::math::fixed_point::{bps_to_q64, pow_q64};
use crate::math::safe_math::SafeMath;
use crate::types::config::ActivationType;
use crate::types::fees::{CollectFeeMode, FeeScheduler, TradeDirection};

/// Exponentially decayed fee after `periods` periods
///
/// cliff · (1 − reduction_factor / 10_000) ^ periods, in Q64 fixed point.
pub fn fee_in_period(cliff_fee_numerator: u64, reduction_factor: u64, periods: u16) -> CoreResult<u64> {
    if periods == 0 || reduction_factor == 0 {
        return Ok(cliff_fee_numerator);
    }
    let base = Q64.safe_sub(bps_to_q64(reduction_factor)?)?;
    let factor = pow_q64(base, periods as u32)?;
    let fee = factor.safe_mul(cliff_fee_numerator as u128)? >> RESOLUTION;
    u64::try_from(fee).map_err(|_| CurveLaunchError::TypeCastFailed)
}

impl FeeScheduler {
    /// Periods elapsed since activation, clamped to the schedule length
    ///
    /// Before activation the schedule reports the full length, which prices
    /// pre-activation trades at the minimum fee.
    pub fn elapsed_periods(&self, current_point: u64, activation_point: u64) -> u16 {
        if current_point < activation_point || self.period_frequency == 0 {
            return self.number_of_period;
        }
        let elapsed = (current_point - activation_point) / self.period_frequency;
        elapsed.min(self.number_of_period as u64) as u16
    }

    /// Fee after a given number of periods
    pub fn fee_after_periods(&self, periods: u16) -> CoreResult<u64> {
        if self.exponential {
            fee_in_period(self.cliff_fee_numerator, self.reduction_factor, periods)
        } else {
            let reduction = (periods as u64).safe_mul(self.reduction_factor)?;
            Ok(self.cliff_fee_numerator.saturating_sub(reduction))
        }
    }

    /// Base fee numerator at `current_point`
    pub fn current_numerator(&self, current_point: u64, activation_point: u64) -> CoreResult<u64> {
        if self.period_frequency == 0 {
            return Ok(self.cliff_fee_numerator);
        }
        let periods = self.elapsed_periods(current_point, activation_point);
        self.fee_after_periods(periods)
    }

    /// Fee once the schedule has fully decayed
    pub fn min_numerator(&self) -> CoreResult<u64> {
        self.fee_after_periods(self.number_of_period)
    }

    fn is_flat(&self) -> bool {
        self.number_of_period == 0 && self.period_frequency == 0 && self.reduction_factor == 0
    }
}

impl BaseFeeHandler for FeeScheduler {
    fn validate(
        &self,
        _collect_fee_mode: CollectFeeMode,
        _activation_type: ActivationType,
    ) -> Result<(), ConfigViolation> {
        if !self.is_flat()
            && (self.number_of_period == 0 || self.period_frequency == 0 || self.reduction_factor == 0)
        {
            return Err(ConfigViolation::InvalidFeeScheduler);
        }
        if self.exponential && self.reduction_factor >= BASIS_POINT_MAX {
            return Err(ConfigViolation::InvalidFeeScheduler);
        }

        let min = self
            .min_numerator()
            .map_err(|_| ConfigViolation::InvalidFeeScheduler)?;
        let max = self.cliff_fee_numerator;
        if min < MIN_FEE_NUMERATOR || max > MAX_FEE_NUMERATOR {
            return Err(ConfigViolation::FeeOutOfRange { min, max });
        }
        Ok(())
    }

    fn min_base_fee_numerator(&self) -> CoreResult<u64> {
        self.min_numerator()
    }

    fn numerator_from_included_amount(
        &self,
        current_point: u64,
        activation_point: u64,
        _direction: TradeDirection,
        _included_amount: u64,
    ) -> CoreResult<u64> {
        self.current_numerator(current_point, activation_point)
    }

    fn numerator_from_excluded_amount(
        &self,
        current_point: u64,
        activation_point: u64,
        _direction: TradeDirection,
        _excluded_amount: u64,
    ) -> CoreResult<u64> {
        self.current_numerator(current_point, activation_point)
    }
}
