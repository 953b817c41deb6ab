//! # Fee Types
//!
//! Fee configuration carried by a pool and the per-trade fee mode derived from
//! it. Numerators are expressed against `FEE_DENOMINATOR` (1e9).

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

/// How the base fee evolves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub enum BaseFeeMode {
    /// Cliff fee minus a constant step per elapsed period
    #[default]
    FeeSchedulerLinear,
    /// Cliff fee multiplied by a constant ratio per elapsed period
    FeeSchedulerExponential,
    /// Fee grows with trade size during a launch window
    RateLimiter,
}

/// Base fee schedule
///
/// The three factors are read according to `base_fee_mode`: as
/// `(number_of_period, period_frequency, reduction_factor)` for the schedulers
/// and as `(fee_increment_bps, max_limiter_duration, reference_amount)` for
/// the rate limiter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct BaseFeeSchedule {
    pub cliff_fee_numerator: u64,
    pub base_fee_mode: BaseFeeMode,
    pub first_factor: u16,
    pub second_factor: u64,
    pub third_factor: u64,
}

/// Scheduler reading of a [`BaseFeeSchedule`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeScheduler {
    pub cliff_fee_numerator: u64,
    pub number_of_period: u16,
    pub period_frequency: u64,
    pub reduction_factor: u64,
    pub exponential: bool,
}

/// Rate-limiter reading of a [`BaseFeeSchedule`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeRateLimiter {
    pub cliff_fee_numerator: u64,
    pub fee_increment_bps: u16,
    pub max_limiter_duration: u64,
    pub reference_amount: u64,
}

impl BaseFeeSchedule {
    pub fn is_rate_limiter(&self) -> bool {
        self.base_fee_mode == BaseFeeMode::RateLimiter
    }

    /// Read the factors as a fee scheduler
    pub fn as_scheduler(&self) -> FeeScheduler {
        FeeScheduler {
            cliff_fee_numerator: self.cliff_fee_numerator,
            number_of_period: self.first_factor,
            period_frequency: self.second_factor,
            reduction_factor: self.third_factor,
            exponential: self.base_fee_mode == BaseFeeMode::FeeSchedulerExponential,
        }
    }

    /// Read the factors as a rate limiter
    pub fn as_rate_limiter(&self) -> FeeRateLimiter {
        FeeRateLimiter {
            cliff_fee_numerator: self.cliff_fee_numerator,
            fee_increment_bps: self.first_factor,
            max_limiter_duration: self.second_factor,
            reference_amount: self.third_factor,
        }
    }
}

/// Volatility surcharge parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct DynamicFeeConfig {
    pub initialized: bool,
    pub bin_step: u16,
    /// Bin step as a Q64 fraction
    pub bin_step_u128: u128,
    pub variable_fee_control: u32,
    pub max_volatility_accumulator: u32,
    pub filter_period: u16,
    pub decay_period: u16,
    /// Basis points
    pub reduction_factor: u16,
}

/// Volatility state maintained per pool by the settlement side
///
/// Read-only here: it is updated by whoever settles trades.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct VolatilityTracker {
    pub volatility_accumulator: u128,
    pub volatility_reference: u128,
    pub sqrt_price_reference: u128,
    pub last_update_timestamp: u64,
}

/// Complete fee configuration of a pool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct PoolFees {
    pub base_fee: BaseFeeSchedule,
    pub dynamic_fee: DynamicFeeConfig,
}

/// Which token fees are collected in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub enum CollectFeeMode {
    /// Always collect in the quote token
    #[default]
    QuoteToken,
    /// Collect in whichever token leaves the pool
    OutputToken,
}

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub enum TradeDirection {
    /// Sell base, receive quote (price falls)
    BaseToQuote,
    /// Sell quote, receive base (price rises)
    QuoteToBase,
}

impl TradeDirection {
    pub fn is_base_for_quote(&self) -> bool {
        matches!(self, TradeDirection::BaseToQuote)
    }
}

/// Where fees land for one trade
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct FeeMode {
    pub fees_on_input: bool,
    pub fees_on_base_token: bool,
    pub has_referral: bool,
}

impl FeeMode {
    /// Resolve the fee mode from the collect mode and trade direction
    ///
    /// | collect      | direction   | fees on | token |
    /// |--------------|-------------|---------|-------|
    /// | QuoteToken   | QuoteToBase | input   | quote |
    /// | QuoteToken   | BaseToQuote | output  | quote |
    /// | OutputToken  | QuoteToBase | output  | base  |
    /// | OutputToken  | BaseToQuote | output  | quote |
    pub fn new(collect_fee_mode: CollectFeeMode, direction: TradeDirection, has_referral: bool) -> Self {
        let (fees_on_input, fees_on_base_token) = match (collect_fee_mode, direction) {
            (CollectFeeMode::QuoteToken, TradeDirection::QuoteToBase) => (true, false),
            (CollectFeeMode::QuoteToken, TradeDirection::BaseToQuote) => (false, false),
            (CollectFeeMode::OutputToken, TradeDirection::QuoteToBase) => (false, true),
            (CollectFeeMode::OutputToken, TradeDirection::BaseToQuote) => (false, false),
        };
        Self {
            fees_on_input,
            fees_on_base_token,
            has_referral,
        }
    }
}

/// Split of a charged fee
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct FeeBreakdown {
    /// Fee kept by the pool (after protocol and referral shares)
    pub trading_fee: u64,
    pub protocol_fee: u64,
    pub referral_fee: u64,
}

impl FeeBreakdown {
    /// Everything charged to the trader
    pub fn total(&self) -> u64 {
        self.trading_fee
            .saturating_add(self.protocol_fee)
            .saturating_add(self.referral_fee)
    }
}
