//! # Rate Limiter
//!
//! Size-based base fee for the launch window. Every `reference_amount` of input
//! beyond the first is charged `fee_increment_bps` more than the previous
//! slice, up to `MAX_FEE_NUMERATOR`. The effective numerator is the average over
//! the whole input.
//!
//! Only quote-to-base trades inside `[activation, activation + max_limiter_duration]`
//! are limited; everything else pays the cliff fee.

use crate::constants::{
    BASIS_POINT_MAX, FEE_DENOMINATOR, MAX_FEE_NUMERATOR, MAX_RATE_LIMITER_DURATION_IN_SECONDS,
    MAX_RATE_LIMITER_DURATION_IN_SLOTS, MIN_FEE_NUMERATOR,
};
use crate::errors::{ConfigViolation, CoreResult, CurveLaunchError};
use crate::fee::{excluded_fee_amount, included_fee_amount, BaseFeeHandler};
use crate::math::big_int::{mul_div_u256, u256_to_u64, Rounding, U256};
use crate::math::safe_math::SafeMath;
use crate::types::config::ActivationType;
use crate::types::fees::{CollectFeeMode, FeeRateLimiter, TradeDirection};

/// Closed-form evaluations allowed when inverting from an excluded amount
const MAX_INVERSION_STEPS: u32 = 64;

impl FeeRateLimiter {
    /// Fee increment per reference slice as a numerator of 1e9
    pub fn fee_increment_numerator(&self) -> CoreResult<u64> {
        (self.fee_increment_bps as u64)
            .safe_mul(FEE_DENOMINATOR)?
            .safe_div(BASIS_POINT_MAX)
    }

    /// All factors zero: behaves as a flat cliff fee
    pub fn is_zero(&self) -> bool {
        self.fee_increment_bps == 0 && self.max_limiter_duration == 0 && self.reference_amount == 0
    }

    /// Whether a trade at `current_point` is size-limited
    pub fn is_applied(
        &self,
        current_point: u64,
        activation_point: u64,
        direction: TradeDirection,
    ) -> CoreResult<bool> {
        if self.is_zero() || direction == TradeDirection::BaseToQuote {
            return Ok(false);
        }
        let last_limited_point = activation_point.safe_add(self.max_limiter_duration)?;
        Ok(current_point <= last_limited_point)
    }

    /// Effective fee numerator for an input of `input_amount`
    pub fn numerator_for_input(&self, input_amount: u64) -> CoreResult<u64> {
        if input_amount <= self.reference_amount {
            return Ok(self.cliff_fee_numerator);
        }
        if self.reference_amount == 0 {
            return Err(CurveLaunchError::DivisionByZero);
        }

        let cliff = U256::from(self.cliff_fee_numerator);
        let reference = U256::from(self.reference_amount);
        let increment_numerator = self.fee_increment_numerator()?;
        let increment = U256::from(increment_numerator);
        let one = U256::from(1u8);
        let two = U256::from(2u8);

        let (slices, remainder) =
            U256::from(input_amount - self.reference_amount).div_rem(reference);
        let max_index = U256::from(
            MAX_FEE_NUMERATOR
                .safe_sub(self.cliff_fee_numerator)?
                .safe_div(increment_numerator)?,
        );

        // Sum of cliff + i·j over the full slices j = 0..=k
        let full_slices = |k: U256| -> CoreResult<U256> {
            let triangular = increment
                .safe_mul(k)?
                .safe_mul(k.safe_add(one)?)?
                .safe_div(two)?;
            cliff.safe_add(cliff.safe_mul(k)?)?.safe_add(triangular)
        };

        let fee = if slices < max_index {
            let first = reference.safe_mul(full_slices(slices)?)?;
            let marginal = cliff.safe_add(increment.safe_mul(slices.safe_add(one)?)?)?;
            first.safe_add(remainder.safe_mul(marginal)?)?
        } else {
            let first = reference.safe_mul(full_slices(max_index)?)?;
            let capped_amount = slices
                .safe_sub(max_index)?
                .safe_mul(reference)?
                .safe_add(remainder)?;
            first.safe_add(capped_amount.safe_mul(U256::from(MAX_FEE_NUMERATOR))?)?
        };

        let trading_fee = fee.safe_div(U256::from(FEE_DENOMINATOR))?;
        let numerator = mul_div_u256(
            trading_fee,
            U256::from(FEE_DENOMINATOR),
            U256::from(input_amount),
            Rounding::Up,
        )?;
        Ok(u256_to_u64(numerator)?.min(MAX_FEE_NUMERATOR))
    }

    /// Fee-inclusive input whose post-fee amount reaches `excluded_amount`
    ///
    /// Binary search over the closed form. The post-fee amount grows with the
    /// input because the marginal fee never exceeds 50%, up to the quantization
    /// of the numerator, so the result is minimal to within that quantization.
    pub fn included_amount_for_excluded(&self, excluded_amount: u64) -> CoreResult<u64> {
        let cliff_included = included_fee_amount(excluded_amount, self.cliff_fee_numerator)?.0;
        if cliff_included <= self.reference_amount {
            return Ok(cliff_included);
        }

        let excluded_of = |amount: u64| -> CoreResult<u64> {
            let numerator = self.numerator_for_input(amount)?;
            Ok(excluded_fee_amount(amount, numerator)?.0)
        };

        let mut low = excluded_amount;
        let mut high = excluded_amount.saturating_mul(2).saturating_add(2);
        if excluded_of(high)? < excluded_amount {
            return Err(CurveLaunchError::UndeterminedFee);
        }

        let mut steps = 0;
        while low < high && steps < MAX_INVERSION_STEPS {
            let mid = low + (high - low) / 2;
            if excluded_of(mid)? >= excluded_amount {
                high = mid;
            } else {
                low = mid + 1;
            }
            steps += 1;
        }
        Ok(high)
    }

    fn max_duration(activation_type: ActivationType) -> u64 {
        match activation_type {
            ActivationType::Slot => MAX_RATE_LIMITER_DURATION_IN_SLOTS,
            ActivationType::Timestamp => MAX_RATE_LIMITER_DURATION_IN_SECONDS,
        }
    }
}

impl BaseFeeHandler for FeeRateLimiter {
    fn validate(
        &self,
        collect_fee_mode: CollectFeeMode,
        activation_type: ActivationType,
    ) -> Result<(), ConfigViolation> {
        if collect_fee_mode != CollectFeeMode::QuoteToken {
            return Err(ConfigViolation::RateLimiterRequiresQuoteCollection);
        }

        if self.is_zero() {
            return Ok(());
        }
        if self.fee_increment_bps == 0 || self.reference_amount == 0 || self.max_limiter_duration == 0 {
            return Err(ConfigViolation::InvalidRateLimiter);
        }
        if self.max_limiter_duration > Self::max_duration(activation_type) {
            return Err(ConfigViolation::InvalidRateLimiter);
        }

        let increment = self
            .fee_increment_numerator()
            .map_err(|_| ConfigViolation::InvalidRateLimiter)?;
        if increment >= FEE_DENOMINATOR {
            return Err(ConfigViolation::InvalidRateLimiter);
        }
        if self.cliff_fee_numerator < MIN_FEE_NUMERATOR || self.cliff_fee_numerator > MAX_FEE_NUMERATOR {
            return Err(ConfigViolation::FeeOutOfRange {
                min: self.cliff_fee_numerator,
                max: self.cliff_fee_numerator,
            });
        }

        let min = self
            .numerator_for_input(0)
            .map_err(|_| ConfigViolation::InvalidRateLimiter)?;
        let max = self
            .numerator_for_input(u64::MAX)
            .map_err(|_| ConfigViolation::InvalidRateLimiter)?;
        if min < MIN_FEE_NUMERATOR || max > MAX_FEE_NUMERATOR {
            return Err(ConfigViolation::FeeOutOfRange { min, max });
        }
        Ok(())
    }

    fn min_base_fee_numerator(&self) -> CoreResult<u64> {
        Ok(self.cliff_fee_numerator)
    }

    fn numerator_from_included_amount(
        &self,
        current_point: u64,
        activation_point: u64,
        direction: TradeDirection,
        included_amount: u64,
    ) -> CoreResult<u64> {
        if self.is_applied(current_point, activation_point, direction)? {
            self.numerator_for_input(included_amount)
        } else {
            Ok(self.cliff_fee_numerator)
        }
    }

    fn numerator_from_excluded_amount(
        &self,
        current_point: u64,
        activation_point: u64,
        direction: TradeDirection,
        excluded_amount: u64,
    ) -> CoreResult<u64> {
        if !self.is_applied(current_point, activation_point, direction)? {
            return Ok(self.cliff_fee_numerator);
        }
        let included = self.included_amount_for_excluded(excluded_amount)?;
        self.numerator_for_input(included)
    }
}
