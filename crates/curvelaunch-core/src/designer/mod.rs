//! # Curve Designer
//!
//! Derives a starting price and a curve from business-level launch
//! parameters: total supply, migration target, vesting and leftover.
//!
//! Every strategy follows the same shape:
//! 1. Human inputs (whole tokens, market caps, prices) are `Decimal` and cross
//!    into integers once, floored, through [`conversions`].
//! 2. The swap supply is what remains of the total after the migration base,
//!    locked vesting and leftover.
//! 3. The strategy lays out liquidity between the start and migration prices.
//! 4. Any base still unallocated is placed on a final segment ending at
//!    `MAX_SQRT_PRICE`.
//! 5. The assembled configuration must pass the validator.

pub mod buffered;
pub mod conversions;
pub mod single;
pub mod two_segment;
pub mod vesting;

pub use buffered::*;
pub use conversions::*;
pub use single::*;
pub use two_segment::*;
pub use vesting::LockedVestingParams;

use rust_decimal::Decimal;

use crate::constants::{DEFAULT_MAX_PRICE_CHANGE_BPS, MAX_SQRT_PRICE};
use crate::curve::migration::{migration_base_amount, migration_quote_amount};
use crate::curve::threshold::{base_token_for_swap, swap_amount_with_buffer};
use crate::errors::{CoreResult, CurveLaunchError};
use crate::fee::{derive_base_fee_params, derive_dynamic_fee_params, derive_rate_limiter_params};
use crate::math::big_int::Rounding;
use crate::math::liquidity_math::{amount_base_between, liquidity_from_base};
use crate::math::safe_math::SafeMath;
use crate::types::config::{
    ActivationType, LockedVestingSchedule, MigrationFee, MigrationOption, PoolConfig, TokenSupply,
};
use crate::types::curve::{Curve, CurvePoint};
use crate::types::fees::{BaseFeeMode, BaseFeeSchedule, CollectFeeMode, DynamicFeeConfig, PoolFees};
use crate::validation::{validate, ValidatedPoolConfig};

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Parameters
// ============================================================================

/// Base fee inputs in basis points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "client",
    derive(Serialize, Deserialize),
    serde(tag = "mode", rename_all = "snake_case")
)]
pub enum BaseFeeParams {
    FeeScheduler {
        starting_fee_bps: u64,
        ending_fee_bps: u64,
        base_fee_mode: BaseFeeMode,
        number_of_period: u16,
        total_duration: u64,
    },
    RateLimiter {
        base_fee_bps: u64,
        fee_increment_bps: u16,
        /// Whole quote tokens per fee step
        reference_amount: Decimal,
        max_limiter_duration: u64,
    },
}

impl Default for BaseFeeParams {
    fn default() -> Self {
        Self::FeeScheduler {
            starting_fee_bps: 100,
            ending_fee_bps: 100,
            base_fee_mode: BaseFeeMode::FeeSchedulerLinear,
            number_of_period: 0,
            total_duration: 0,
        }
    }
}

impl BaseFeeParams {
    /// Fee the schedule settles at, which the dynamic fee is sized against
    pub fn settled_fee_bps(&self) -> u64 {
        match *self {
            Self::FeeScheduler { ending_fee_bps, .. } => ending_fee_bps,
            Self::RateLimiter { base_fee_bps, .. } => base_fee_bps,
        }
    }

    pub fn to_schedule(
        &self,
        activation_type: ActivationType,
        token_quote_decimal: u8,
    ) -> CoreResult<BaseFeeSchedule> {
        match *self {
            Self::FeeScheduler {
                starting_fee_bps,
                ending_fee_bps,
                base_fee_mode,
                number_of_period,
                total_duration,
            } => derive_base_fee_params(
                starting_fee_bps,
                ending_fee_bps,
                base_fee_mode,
                number_of_period,
                total_duration,
            ),
            Self::RateLimiter {
                base_fee_bps,
                fee_increment_bps,
                reference_amount,
                max_limiter_duration,
            } => derive_rate_limiter_params(
                base_fee_bps,
                fee_increment_bps,
                to_lamports(reference_amount, token_quote_decimal)?,
                max_limiter_duration,
                activation_type,
            ),
        }
    }
}

/// Launch parameters shared by every design strategy
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct CurveDesignParams {
    /// Whole base tokens
    pub total_token_supply: u64,
    pub token_base_decimal: u8,
    pub token_quote_decimal: u8,
    #[cfg_attr(feature = "client", serde(default))]
    pub migration_option: MigrationOption,
    #[cfg_attr(feature = "client", serde(default))]
    pub locked_vesting: LockedVestingParams,
    #[cfg_attr(feature = "client", serde(default))]
    pub base_fee: BaseFeeParams,
    #[cfg_attr(feature = "client", serde(default))]
    pub dynamic_fee_enabled: bool,
    #[cfg_attr(feature = "client", serde(default))]
    pub activation_type: ActivationType,
    #[cfg_attr(feature = "client", serde(default))]
    pub collect_fee_mode: CollectFeeMode,
    #[cfg_attr(feature = "client", serde(default))]
    pub migration_fee: MigrationFee,
    #[cfg_attr(feature = "client", serde(default))]
    pub creator_trading_fee_percentage: u8,
    /// Whole base tokens kept out of the curve and migration
    #[cfg_attr(feature = "client", serde(default))]
    pub leftover: u64,
}

impl CurveDesignParams {
    pub fn total_supply(&self) -> CoreResult<u64> {
        whole_tokens_to_lamports(self.total_token_supply, self.token_base_decimal)
    }

    pub fn leftover_amount(&self) -> CoreResult<u64> {
        whole_tokens_to_lamports(self.leftover, self.token_base_decimal)
    }

    pub fn vesting_schedule(&self) -> CoreResult<LockedVestingSchedule> {
        self.locked_vesting.to_schedule(self.token_base_decimal)
    }

    pub fn pool_fees(&self) -> CoreResult<PoolFees> {
        let base_fee = self
            .base_fee
            .to_schedule(self.activation_type, self.token_quote_decimal)?;
        let dynamic_fee = if self.dynamic_fee_enabled {
            derive_dynamic_fee_params(self.base_fee.settled_fee_bps(), DEFAULT_MAX_PRICE_CHANGE_BPS)?
        } else {
            DynamicFeeConfig::default()
        };
        Ok(PoolFees {
            base_fee,
            dynamic_fee,
        })
    }

    /// Human price of one base token at a given market cap
    pub fn price_at_market_cap(&self, market_cap: Decimal) -> CoreResult<Decimal> {
        market_cap
            .checked_div(Decimal::from(self.total_token_supply))
            .ok_or(CurveLaunchError::DivisionByZero)
    }

    pub fn sqrt_price_at_market_cap(&self, market_cap: Decimal) -> CoreResult<u128> {
        sqrt_price_from_price(
            self.price_at_market_cap(market_cap)?,
            self.token_base_decimal,
            self.token_quote_decimal,
        )
    }

    /// Whole quote tokens paid into the curve before migration, minus the migration fee
    pub fn migration_quote_amount_after_fee(&self, migration_quote_threshold: Decimal) -> CoreResult<Decimal> {
        let keep = Decimal::from(100u8.safe_sub(self.migration_fee.fee_percentage)?);
        migration_quote_threshold
            .checked_mul(keep)
            .and_then(|amount| amount.checked_div(Decimal::ONE_HUNDRED))
            .ok_or(CurveLaunchError::MathOverflow)
    }

    /// Migration threshold that leaves `migration_quote_amount` after the migration fee
    pub fn migration_quote_threshold_for(&self, migration_quote_amount: Decimal) -> CoreResult<Decimal> {
        let keep = Decimal::from(100u8.safe_sub(self.migration_fee.fee_percentage)?);
        migration_quote_amount
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|amount| amount.checked_div(keep))
            .ok_or(CurveLaunchError::DivisionByZero)
    }
}

// ============================================================================
// Result
// ============================================================================

/// A validated configuration with the allocation it was designed around
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize))]
pub struct CurveDesign {
    pub config: ValidatedPoolConfig,
    /// Target sqrt price at the migration threshold
    pub sqrt_migration_price: u128,
    pub swap_base_amount: u64,
    pub migration_base_amount: u64,
    pub locked_vesting_amount: u64,
    pub leftover_amount: u64,
    /// Base held on the segment above the migration price
    pub buffer_base_amount: u64,
}

// ============================================================================
// Shared Allocation
// ============================================================================

/// Supply split shared by the strategies, all in smallest units
#[derive(Debug, Clone, Copy)]
pub(crate) struct SupplyAllocation {
    pub total_supply: u64,
    pub sqrt_migration_price: u128,
    pub migration_quote_threshold: u64,
    pub migration_base_amount: u64,
    pub locked_vesting: LockedVestingSchedule,
    pub locked_vesting_amount: u64,
    pub leftover_amount: u64,
    pub swap_base_amount: u64,
}

impl SupplyAllocation {
    /// Split the total supply around a migration price and threshold
    pub fn new(
        params: &CurveDesignParams,
        sqrt_migration_price: u128,
        migration_quote_threshold: u64,
    ) -> CoreResult<Self> {
        let total_supply = params.total_supply()?;
        let quote_amount =
            migration_quote_amount(migration_quote_threshold, params.migration_fee.fee_percentage)?;
        let migration_base =
            migration_base_amount(quote_amount, sqrt_migration_price, params.migration_option)?;
        let locked_vesting = params.vesting_schedule()?;
        let locked_vesting_amount = locked_vesting
            .total_amount()
            .ok_or(CurveLaunchError::MathOverflow)?;
        let leftover_amount = params.leftover_amount()?;

        let reserved = migration_base
            .safe_add(locked_vesting_amount)?
            .safe_add(leftover_amount)?;
        if reserved >= total_supply {
            return Err(CurveLaunchError::invalid_parameter(
                "total_token_supply",
                format!(
                    "migration base {}, vesting {} and leftover {} leave nothing to swap out of {}",
                    migration_base, locked_vesting_amount, leftover_amount, total_supply
                ),
            ));
        }

        Ok(Self {
            total_supply,
            sqrt_migration_price,
            migration_quote_threshold,
            migration_base_amount: migration_base,
            locked_vesting,
            locked_vesting_amount,
            leftover_amount,
            swap_base_amount: total_supply - reserved,
        })
    }

    /// Base the configuration must hold besides the final segment
    fn allocated_supply(&self, sqrt_start_price: u128, curve: &Curve) -> CoreResult<u64> {
        let swap_on_curve = base_token_for_swap(sqrt_start_price, self.sqrt_migration_price, curve)?;
        let buffered = swap_amount_with_buffer(swap_on_curve, sqrt_start_price, curve)?;
        buffered
            .safe_add(self.migration_base_amount)?
            .safe_add(self.locked_vesting_amount)?
            .safe_add(self.leftover_amount)
    }

    /// Append a final segment up to `MAX_SQRT_PRICE` holding the unallocated base
    ///
    /// Returns the base placed on that segment.
    pub fn append_remaining(&self, sqrt_start_price: u128, curve: &mut Curve) -> CoreResult<u64> {
        let allocated = self.allocated_supply(sqrt_start_price, curve)?;
        let remaining = self.total_supply.checked_sub(allocated).ok_or_else(|| {
            CurveLaunchError::invalid_parameter(
                "total_token_supply",
                format!("curve needs {} but the supply is {}", allocated, self.total_supply),
            )
        })?;

        let last_sqrt_price = curve
            .last()
            .map(|point| point.sqrt_price)
            .unwrap_or(self.sqrt_migration_price);
        let last_liquidity = liquidity_from_base(last_sqrt_price, MAX_SQRT_PRICE, remaining)?;
        if last_liquidity == 0 {
            return Ok(0);
        }
        curve.push(CurvePoint::new(MAX_SQRT_PRICE, last_liquidity))?;
        let held = amount_base_between(last_sqrt_price, MAX_SQRT_PRICE, last_liquidity, Rounding::Down)?;
        log::debug!(
            "Final segment holds {} of {} remaining base (liquidity {})",
            held,
            remaining,
            last_liquidity
        );
        Ok(held)
    }

    /// Build and validate the pool configuration
    pub fn assemble(
        &self,
        params: &CurveDesignParams,
        sqrt_start_price: u128,
        curve: Curve,
        buffer_base_amount: u64,
    ) -> CoreResult<CurveDesign> {
        let config = PoolConfig {
            sqrt_start_price,
            curve,
            pool_fees: params.pool_fees()?,
            collect_fee_mode: params.collect_fee_mode,
            activation_type: params.activation_type,
            migration_option: params.migration_option,
            migration_quote_threshold: self.migration_quote_threshold,
            migration_fee: params.migration_fee,
            creator_trading_fee_percentage: params.creator_trading_fee_percentage,
            locked_vesting: self.locked_vesting,
            token_supply: Some(TokenSupply {
                pre_migration_token_supply: self.total_supply,
                post_migration_token_supply: self.total_supply,
            }),
        };

        Ok(CurveDesign {
            config: validate(config)?,
            sqrt_migration_price: self.sqrt_migration_price,
            swap_base_amount: self.swap_base_amount,
            migration_base_amount: self.migration_base_amount,
            locked_vesting_amount: self.locked_vesting_amount,
            leftover_amount: self.leftover_amount,
            buffer_base_amount,
        })
    }
}
