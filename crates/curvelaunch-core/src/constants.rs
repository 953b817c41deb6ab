//! # Protocol Constants
//!
//! Fundamental constants for the launch curve including:
//! - Mathematical constants (Q64, resolution)
//! - Price bounds and curve capacity
//! - Fee structure parameters
//! - Dynamic fee defaults
//! - Migration and supply parameters

// ============================================================================
// Mathematical Constants
// ============================================================================

/// Number of fractional bits in a Q64.64 sqrt price
pub const RESOLUTION: u8 = 64;

/// Q64 fixed-point scale factor: 2^64
pub const Q64: u128 = 1u128 << RESOLUTION;

/// Basis points denominator (10,000 = 100%)
pub const BASIS_POINT_MAX: u64 = 10_000;

/// Largest value representable in 24 bits
pub const U24_MAX: u32 = 0x00FF_FFFF;

// ============================================================================
// Price Bounds
// ============================================================================

/// Minimum sqrt price in Q64 format
pub const MIN_SQRT_PRICE: u128 = 4_295_048_016;

/// Maximum sqrt price in Q64 format
pub const MAX_SQRT_PRICE: u128 = 79_226_673_521_066_979_257_578_248_091;

/// Maximum number of points a curve can hold
pub const MAX_CURVE_POINT: usize = 16;

// ============================================================================
// Fee Structure Constants
// ============================================================================

/// Denominator every fee numerator is expressed against
pub const FEE_DENOMINATOR: u64 = 1_000_000_000;

/// Maximum total fee numerator (50%)
pub const MAX_FEE_NUMERATOR: u64 = 500_000_000;

/// Minimum base fee numerator (0.01%)
pub const MIN_FEE_NUMERATOR: u64 = 100_000;

/// Maximum fee in basis points (50%)
pub const MAX_FEE_BPS: u64 = 5_000;

/// Minimum fee in basis points (0.01%)
pub const MIN_FEE_BPS: u64 = 1;

/// Share of the trading fee routed to the protocol (percent)
pub const PROTOCOL_FEE_PERCENT: u8 = 20;

/// Share of the protocol fee routed to a referrer (percent)
pub const HOST_FEE_PERCENT: u8 = 20;

/// Longest rate limiter window for timestamp-activated pools (12 hours)
pub const MAX_RATE_LIMITER_DURATION_IN_SECONDS: u64 = 43_200;

/// Longest rate limiter window for slot-activated pools (12 hours of 400ms slots)
pub const MAX_RATE_LIMITER_DURATION_IN_SLOTS: u64 = 108_000;

// ============================================================================
// Dynamic Fee Constants
// ============================================================================

/// Scale applied to the squared volatility term
pub const DYNAMIC_FEE_SCALING_FACTOR: u128 = 100_000_000_000;

/// Added before scaling so the variable fee rounds up
pub const DYNAMIC_FEE_ROUNDING_OFFSET: u128 = 99_999_999_999;

/// Default bin step (1 bps)
pub const BIN_STEP_BPS_DEFAULT: u16 = 1;

/// Default bin step as a Q64 fraction: floor(2^64 / 10_000)
pub const BIN_STEP_BPS_U128_DEFAULT: u128 = 1_844_674_407_370_955;

/// Default filter period
pub const DYNAMIC_FEE_FILTER_PERIOD_DEFAULT: u16 = 10;

/// Default decay period
pub const DYNAMIC_FEE_DECAY_PERIOD_DEFAULT: u16 = 120;

/// Default reduction factor (50%)
pub const DYNAMIC_FEE_REDUCTION_FACTOR_DEFAULT: u16 = 5_000;

/// Dynamic fee ceiling as a percentage of the minimum base fee
pub const MAX_DYNAMIC_FEE_PERCENT: u8 = 20;

/// Price move (bps) that saturates the volatility accumulator by default
pub const DEFAULT_MAX_PRICE_CHANGE_BPS: u16 = 1_500;

// ============================================================================
// Migration and Supply Constants
// ============================================================================

/// Extra swap supply reserved above the curve requirement (percent)
pub const SWAP_BUFFER_PERCENTAGE: u8 = 25;

/// Maximum migration fee taken from the quote reserve (percent)
pub const MAX_MIGRATION_FEE_PERCENTAGE: u8 = 50;

/// Maximum creator share of the migration fee (percent)
pub const MAX_CREATOR_MIGRATION_FEE_PERCENTAGE: u8 = 100;
