//! # Core Error Types
//!
//! Every fallible operation in the crate returns [`CoreResult`]. Arithmetic
//! failures are fatal and signal a defect or an invalid configuration;
//! liquidity and completion errors are ordinary quote rejections; configuration
//! failures carry a structured [`ConfigViolation`].

use thiserror::Error;

#[cfg(feature = "client")]
use serde::Serialize;

/// Core errors shared by every component
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize))]
pub enum CurveLaunchError {
    // ========================================================================
    // Math Errors
    // ========================================================================
    #[error("Math overflow")]
    MathOverflow,

    #[error("Math underflow")]
    MathUnderflow,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Type cast failed")]
    TypeCastFailed,

    #[error("Decimal result is not finite")]
    NonFiniteResult,

    // ========================================================================
    // Liquidity and Quote Errors
    // ========================================================================
    #[error("Insufficient liquidity")]
    InsufficientLiquidity,

    #[error("Pool completed: quote reserve reached the migration threshold")]
    PoolCompleted,

    #[error("Amount is zero")]
    AmountIsZero,

    #[error("Fee inversion could not reproduce the requested amount")]
    UndeterminedFee,

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigViolation),

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("No curve candidate could be solved")]
    CurveNotSolvable,
}

impl CurveLaunchError {
    /// Build an invalid parameter error
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Whether the error is an arithmetic failure (never retried)
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            Self::MathOverflow
                | Self::MathUnderflow
                | Self::DivisionByZero
                | Self::TypeCastFailed
                | Self::NonFiniteResult
        )
    }

    /// Whether the error is raised at design or validation time
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfiguration(_) | Self::InvalidParameter { .. } | Self::CurveNotSolvable
        )
    }
}

/// Structured reason a pool configuration was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize))]
pub enum ConfigViolation {
    // ------------------------------------------------------------------------
    // Curve shape
    // ------------------------------------------------------------------------
    #[error("curve is empty")]
    EmptyCurve,

    #[error("curve has {len} points (max {max})")]
    CurveTooLong { len: usize, max: usize },

    #[error("curve point {index} is not above the previous price")]
    CurveNotAscending { index: usize },

    #[error("curve point {index} has zero liquidity")]
    ZeroLiquidity { index: usize },

    #[error("curve point {index} is above the maximum sqrt price")]
    CurvePriceOutOfRange { index: usize },

    #[error("start sqrt price is outside the global bounds")]
    StartPriceOutOfRange,

    #[error("start sqrt price is not below the first curve point")]
    StartPriceNotBelowCurve,

    // ------------------------------------------------------------------------
    // Fees
    // ------------------------------------------------------------------------
    #[error("rate limiter requires quote token fee collection")]
    RateLimiterRequiresQuoteCollection,

    #[error("invalid fee scheduler factors")]
    InvalidFeeScheduler,

    #[error("invalid rate limiter factors")]
    InvalidRateLimiter,

    #[error("fee numerator range [{min}, {max}] outside the allowed bounds")]
    FeeOutOfRange { min: u64, max: u64 },

    #[error("invalid dynamic fee: {0}")]
    InvalidDynamicFee(&'static str),

    #[error("creator trading fee percentage {0} exceeds 100")]
    InvalidCreatorTradingFee(u8),

    // ------------------------------------------------------------------------
    // Migration, vesting and supply
    // ------------------------------------------------------------------------
    #[error("migration quote threshold must be positive")]
    ZeroMigrationThreshold,

    #[error("invalid migration fee")]
    InvalidMigrationFee,

    #[error("invalid locked vesting schedule")]
    InvalidVesting,

    #[error("curve cannot absorb the migration quote threshold below the maximum sqrt price")]
    MigrationThresholdUnreachable,

    #[error("minimum base supply {required} exceeds the {phase}-migration cap {cap}")]
    InsufficientSupply {
        phase: &'static str,
        required: u64,
        cap: u64,
    },

    #[error("pre-migration supply is below post-migration supply")]
    SupplyCapsInverted,
}

/// Result type for core operations
pub type CoreResult<T> = Result<T, CurveLaunchError>;
