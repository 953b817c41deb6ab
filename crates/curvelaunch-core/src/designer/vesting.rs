//! Locked vesting from whole-token inputs

use crate::designer::conversions::whole_tokens_to_lamports;
use crate::errors::{CoreResult, CurveLaunchError};
use crate::types::config::LockedVestingSchedule;

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

/// Vesting terms in whole tokens and schedule points
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize), serde(default))]
pub struct LockedVestingParams {
    pub total_locked_vesting_amount: u64,
    pub number_of_vesting_period: u64,
    pub cliff_unlock_amount: u64,
    pub total_vesting_duration: u64,
    pub cliff_duration_from_migration_time: u64,
}

impl LockedVestingParams {
    /// Schedule in smallest units
    ///
    /// Per-period amounts are floored and the remainder joins the cliff unlock,
    /// so the schedule always locks exactly the requested total.
    pub fn to_schedule(&self, token_base_decimal: u8) -> CoreResult<LockedVestingSchedule> {
        if self.total_locked_vesting_amount == 0 {
            return Ok(LockedVestingSchedule::default());
        }

        if self.total_locked_vesting_amount == self.cliff_unlock_amount {
            // Everything unlocks at the cliff; one token rides a single period
            return Ok(LockedVestingSchedule {
                amount_per_period: whole_tokens_to_lamports(1, token_base_decimal)?,
                cliff_duration_from_migration_time: self.cliff_duration_from_migration_time,
                frequency: 1,
                number_of_period: 1,
                cliff_unlock_amount: whole_tokens_to_lamports(
                    self.total_locked_vesting_amount - 1,
                    token_base_decimal,
                )?,
            });
        }

        if self.number_of_vesting_period == 0 {
            return Err(CurveLaunchError::invalid_parameter(
                "number_of_vesting_period",
                "must be positive when tokens vest over periods",
            ));
        }
        if self.cliff_unlock_amount > self.total_locked_vesting_amount {
            return Err(CurveLaunchError::invalid_parameter(
                "cliff_unlock_amount",
                "exceeds the total locked amount",
            ));
        }
        let frequency = self.total_vesting_duration / self.number_of_vesting_period;
        if frequency == 0 {
            return Err(CurveLaunchError::invalid_parameter(
                "total_vesting_duration",
                "must cover at least one point per period",
            ));
        }

        let periodic_total = self.total_locked_vesting_amount - self.cliff_unlock_amount;
        let amount_per_period = periodic_total / self.number_of_vesting_period;
        let remainder = periodic_total % self.number_of_vesting_period;

        Ok(LockedVestingSchedule {
            amount_per_period: whole_tokens_to_lamports(amount_per_period, token_base_decimal)?,
            cliff_duration_from_migration_time: self.cliff_duration_from_migration_time,
            frequency,
            number_of_period: self.number_of_vesting_period,
            cliff_unlock_amount: whole_tokens_to_lamports(
                self.cliff_unlock_amount + remainder,
                token_base_decimal,
            )?,
        })
    }
}
