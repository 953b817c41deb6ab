//! # Pool Configuration Types
//!
//! The immutable configuration a launch pool trades under, plus the migration
//! and vesting terms that apply once the quote threshold is reached.

use crate::types::curve::Curve;
use crate::types::fees::{CollectFeeMode, PoolFees};

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

/// Unit of the activation point and every fee schedule duration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub enum ActivationType {
    #[default]
    Slot,
    Timestamp,
}

/// Destination pool type once the curve completes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub enum MigrationOption {
    /// Constant-product pool priced at the migration price
    #[default]
    ConstantProduct,
    /// Concentrated pool spanning the full price range
    ConcentratedFullRange,
}

/// Fee taken from the quote reserve at migration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct MigrationFee {
    /// Percent of the quote threshold (at most 50)
    pub fee_percentage: u8,
    /// Creator share of the migration fee in percent; the partner keeps the rest
    pub creator_fee_percentage: u8,
}

/// Tokens locked at migration and released on a schedule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct LockedVestingSchedule {
    pub amount_per_period: u64,
    pub cliff_duration_from_migration_time: u64,
    pub frequency: u64,
    pub number_of_period: u64,
    pub cliff_unlock_amount: u64,
}

impl LockedVestingSchedule {
    /// No vesting configured
    pub fn is_none(&self) -> bool {
        *self == Self::default()
    }

    /// Tokens locked over the whole schedule
    pub fn total_amount(&self) -> Option<u64> {
        self.amount_per_period
            .checked_mul(self.number_of_period)?
            .checked_add(self.cliff_unlock_amount)
    }
}

/// Declared base token supply before and after migration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct TokenSupply {
    pub pre_migration_token_supply: u64,
    pub post_migration_token_supply: u64,
}

/// Everything a pool trades and migrates under
///
/// Produced by the designer or supplied directly, and never mutated once
/// validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct PoolConfig {
    pub sqrt_start_price: u128,
    pub curve: Curve,
    pub pool_fees: PoolFees,
    pub collect_fee_mode: CollectFeeMode,
    pub activation_type: ActivationType,
    pub migration_option: MigrationOption,
    pub migration_quote_threshold: u64,
    pub migration_fee: MigrationFee,
    /// Creator share of trading fees in percent; the partner keeps the rest
    pub creator_trading_fee_percentage: u8,
    pub locked_vesting: LockedVestingSchedule,
    pub token_supply: Option<TokenSupply>,
}
