//! # Configuration Validation
//!
//! A [`PoolConfig`] is only traded against once it has passed every check here.
//! Checks run in a fixed order (fees, creator fee, vesting, migration, start
//! price, curve shape, migration price, supply) and the first failure aborts with a structured
//! [`ConfigViolation`]. Success yields a [`ValidatedPoolConfig`], the only
//! configuration type the quote engine accepts.

use std::ops::Deref;

use crate::constants::{
    MAX_CREATOR_MIGRATION_FEE_PERCENTAGE, MAX_CURVE_POINT, MAX_MIGRATION_FEE_PERCENTAGE,
    MAX_SQRT_PRICE, MIN_SQRT_PRICE,
};
use crate::curve::migration::{migration_base_amount, migration_quote_amount, minimum_base_supply};
use crate::curve::threshold::{base_token_for_swap, price_at_quote_threshold, swap_amount_with_buffer};
use crate::errors::{ConfigViolation, CoreResult, CurveLaunchError};
use crate::fee::{base_fee_handler, validate_dynamic_fee};
use crate::types::config::{
    ActivationType, LockedVestingSchedule, MigrationFee, PoolConfig, TokenSupply,
};
use crate::types::curve::CurvePoint;
use crate::types::fees::{CollectFeeMode, PoolFees};

#[cfg(feature = "client")]
use serde::Serialize;

/// A pool configuration that passed [`validate`]
///
/// Immutable: the inner configuration is reachable by reference only, or
/// given back with [`ValidatedPoolConfig::into_inner`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize), serde(transparent))]
pub struct ValidatedPoolConfig(PoolConfig);

impl ValidatedPoolConfig {
    pub fn into_inner(self) -> PoolConfig {
        self.0
    }

    /// Sqrt price at which the curve reaches the migration threshold
    pub fn sqrt_migration_price(&self) -> CoreResult<u128> {
        price_at_quote_threshold(
            &self.0.curve,
            self.0.sqrt_start_price,
            self.0.migration_quote_threshold,
        )
    }
}

impl Deref for ValidatedPoolConfig {
    type Target = PoolConfig;

    fn deref(&self) -> &PoolConfig {
        &self.0
    }
}

impl AsRef<PoolConfig> for ValidatedPoolConfig {
    fn as_ref(&self) -> &PoolConfig {
        &self.0
    }
}

impl TryFrom<PoolConfig> for ValidatedPoolConfig {
    type Error = CurveLaunchError;

    fn try_from(config: PoolConfig) -> CoreResult<Self> {
        validate(config)
    }
}

/// Run every check against `config`
pub fn validate(config: PoolConfig) -> CoreResult<ValidatedPoolConfig> {
    validate_fees(&config.pool_fees, config.collect_fee_mode, config.activation_type)?;
    if config.creator_trading_fee_percentage > 100 {
        return Err(ConfigViolation::InvalidCreatorTradingFee(config.creator_trading_fee_percentage).into());
    }
    validate_vesting(&config.locked_vesting)?;
    validate_migration(config.migration_quote_threshold, &config.migration_fee)?;
    validate_curve(config.sqrt_start_price, config.curve.points())?;
    let sqrt_migration_price = validate_migration_price(&config)?;
    if let Some(token_supply) = &config.token_supply {
        validate_token_supply(&config, token_supply, sqrt_migration_price)?;
    }

    log::debug!(
        "Validated pool config: start={} points={} threshold={}",
        config.sqrt_start_price,
        config.curve.len(),
        config.migration_quote_threshold
    );
    Ok(ValidatedPoolConfig(config))
}

// ============================================================================
// Individual Checks
// ============================================================================

/// Base fee bounds and the dynamic fee riding on its minimum
pub fn validate_fees(
    pool_fees: &PoolFees,
    collect_fee_mode: CollectFeeMode,
    activation_type: ActivationType,
) -> Result<(), ConfigViolation> {
    let handler = base_fee_handler(&pool_fees.base_fee);
    handler.validate(collect_fee_mode, activation_type)?;
    let min_base_fee_numerator = handler
        .min_base_fee_numerator()
        .map_err(|_| ConfigViolation::FeeOutOfRange {
            min: 0,
            max: pool_fees.base_fee.cliff_fee_numerator,
        })?;
    validate_dynamic_fee(&pool_fees.dynamic_fee, min_base_fee_numerator)
}

/// A configured vesting schedule must release something on a nonzero frequency
pub fn validate_vesting(vesting: &LockedVestingSchedule) -> Result<(), ConfigViolation> {
    if vesting.is_none() {
        return Ok(());
    }
    if vesting.frequency == 0 {
        return Err(ConfigViolation::InvalidVesting);
    }
    match vesting.total_amount() {
        Some(total) if total > 0 => Ok(()),
        _ => Err(ConfigViolation::InvalidVesting),
    }
}

pub fn validate_migration(
    migration_quote_threshold: u64,
    migration_fee: &MigrationFee,
) -> Result<(), ConfigViolation> {
    if migration_quote_threshold == 0 {
        return Err(ConfigViolation::ZeroMigrationThreshold);
    }
    if migration_fee.fee_percentage > MAX_MIGRATION_FEE_PERCENTAGE
        || migration_fee.creator_fee_percentage > MAX_CREATOR_MIGRATION_FEE_PERCENTAGE
    {
        return Err(ConfigViolation::InvalidMigrationFee);
    }
    Ok(())
}

/// Start price bounds and curve shape
///
/// Takes a raw slice so over-long point lists can be checked before they are
/// turned into a [`Curve`](crate::types::curve::Curve).
pub fn validate_curve(sqrt_start_price: u128, points: &[CurvePoint]) -> Result<(), ConfigViolation> {
    if !(MIN_SQRT_PRICE..MAX_SQRT_PRICE).contains(&sqrt_start_price) {
        return Err(ConfigViolation::StartPriceOutOfRange);
    }
    let first = points.first().ok_or(ConfigViolation::EmptyCurve)?;
    if points.len() > MAX_CURVE_POINT {
        return Err(ConfigViolation::CurveTooLong {
            len: points.len(),
            max: MAX_CURVE_POINT,
        });
    }
    if first.sqrt_price <= sqrt_start_price {
        return Err(ConfigViolation::StartPriceNotBelowCurve);
    }

    let mut previous = sqrt_start_price;
    for (index, point) in points.iter().enumerate() {
        if point.sqrt_price <= previous {
            return Err(ConfigViolation::CurveNotAscending { index });
        }
        if point.sqrt_price > MAX_SQRT_PRICE {
            return Err(ConfigViolation::CurvePriceOutOfRange { index });
        }
        if point.liquidity == 0 {
            return Err(ConfigViolation::ZeroLiquidity { index });
        }
        previous = point.sqrt_price;
    }
    Ok(())
}

/// The curve reaches the migration threshold strictly below `MAX_SQRT_PRICE`
///
/// Returns the migration sqrt price.
pub fn validate_migration_price(config: &PoolConfig) -> Result<u128, ConfigViolation> {
    match price_at_quote_threshold(
        &config.curve,
        config.sqrt_start_price,
        config.migration_quote_threshold,
    ) {
        Ok(sqrt_migration_price) if sqrt_migration_price < MAX_SQRT_PRICE => Ok(sqrt_migration_price),
        _ => Err(ConfigViolation::MigrationThresholdUnreachable),
    }
}

/// Declared supply caps cover what the curve, migration and vesting need
///
/// The pre-migration cap must cover the buffered swap supply, the
/// post-migration cap the unbuffered one.
pub fn validate_token_supply(
    config: &PoolConfig,
    token_supply: &TokenSupply,
    sqrt_migration_price: u128,
) -> CoreResult<()> {
    if token_supply.pre_migration_token_supply < token_supply.post_migration_token_supply {
        return Err(ConfigViolation::SupplyCapsInverted.into());
    }
    let swap_base_amount =
        base_token_for_swap(config.sqrt_start_price, sqrt_migration_price, &config.curve)?;
    let buffered_swap_amount =
        swap_amount_with_buffer(swap_base_amount, config.sqrt_start_price, &config.curve)?;
    let quote_amount = migration_quote_amount(
        config.migration_quote_threshold,
        config.migration_fee.fee_percentage,
    )?;
    let migration_base =
        migration_base_amount(quote_amount, sqrt_migration_price, config.migration_option)?;

    let without_buffer = minimum_base_supply(swap_base_amount, migration_base, &config.locked_vesting)?;
    if without_buffer > token_supply.post_migration_token_supply {
        return Err(ConfigViolation::InsufficientSupply {
            phase: "post",
            required: without_buffer,
            cap: token_supply.post_migration_token_supply,
        }
        .into());
    }
    let with_buffer = minimum_base_supply(buffered_swap_amount, migration_base, &config.locked_vesting)?;
    if with_buffer > token_supply.pre_migration_token_supply {
        return Err(ConfigViolation::InsufficientSupply {
            phase: "pre",
            required: with_buffer,
            cap: token_supply.pre_migration_token_supply,
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Q64;
    use crate::types::curve::Curve;
    use crate::types::fees::{BaseFeeMode, BaseFeeSchedule};

    fn config() -> PoolConfig {
        PoolConfig {
            sqrt_start_price: Q64,
            curve: Curve::new(vec![
                CurvePoint::new(2 * Q64, 1u128 << 100),
                CurvePoint::new(4 * Q64, 1u128 << 99),
            ])
            .unwrap(),
            pool_fees: PoolFees {
                base_fee: BaseFeeSchedule {
                    cliff_fee_numerator: 10_000_000,
                    ..Default::default()
                },
                ..Default::default()
            },
            migration_quote_threshold: 1_000_000,
            ..Default::default()
        }
    }

    fn violation(config: PoolConfig) -> ConfigViolation {
        match validate(config) {
            Err(CurveLaunchError::InvalidConfiguration(violation)) => violation,
            other => panic!("expected a violation, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_config() {
        let validated = validate(config()).unwrap();
        assert_eq!(validated.sqrt_start_price, Q64);
        assert_eq!(validated.into_inner(), config());
    }

    #[test]
    fn test_curve_shape() {
        let ascending = [
            CurvePoint::new(2 * Q64, 1),
            CurvePoint::new(3 * Q64, 1),
        ];
        assert!(validate_curve(Q64, &ascending).is_ok());

        let flat = [CurvePoint::new(2 * Q64, 1), CurvePoint::new(2 * Q64, 1)];
        assert_eq!(
            validate_curve(Q64, &flat),
            Err(ConfigViolation::CurveNotAscending { index: 1 })
        );

        let long: Vec<CurvePoint> = (0..17u128).map(|i| CurvePoint::new((i + 2) * Q64, 1)).collect();
        assert_eq!(
            validate_curve(Q64, &long),
            Err(ConfigViolation::CurveTooLong { len: 17, max: 16 })
        );

        assert_eq!(validate_curve(Q64, &[]), Err(ConfigViolation::EmptyCurve));
        assert_eq!(
            validate_curve(2 * Q64, &ascending),
            Err(ConfigViolation::StartPriceNotBelowCurve)
        );
        assert_eq!(
            validate_curve(MIN_SQRT_PRICE - 1, &ascending),
            Err(ConfigViolation::StartPriceOutOfRange)
        );
        assert_eq!(
            validate_curve(Q64, &[CurvePoint::new(2 * Q64, 0)]),
            Err(ConfigViolation::ZeroLiquidity { index: 0 })
        );
        assert_eq!(
            validate_curve(Q64, &[CurvePoint::new(MAX_SQRT_PRICE + 1, 1)]),
            Err(ConfigViolation::CurvePriceOutOfRange { index: 0 })
        );
    }

    #[test]
    fn test_fee_checks_come_first() {
        let mut bad = config();
        bad.curve = Curve::default();
        bad.pool_fees.base_fee.cliff_fee_numerator = 600_000_000;
        assert!(matches!(violation(bad), ConfigViolation::FeeOutOfRange { .. }));

        let mut limiter = config();
        limiter.collect_fee_mode = CollectFeeMode::OutputToken;
        limiter.pool_fees.base_fee = BaseFeeSchedule {
            cliff_fee_numerator: 10_000_000,
            base_fee_mode: BaseFeeMode::RateLimiter,
            first_factor: 10,
            second_factor: 100,
            third_factor: 1_000_000_000,
        };
        assert_eq!(violation(limiter), ConfigViolation::RateLimiterRequiresQuoteCollection);
    }

    #[test]
    fn test_migration_and_vesting() {
        let mut zero = config();
        zero.migration_quote_threshold = 0;
        assert_eq!(violation(zero), ConfigViolation::ZeroMigrationThreshold);

        let mut fee = config();
        fee.migration_fee.fee_percentage = 51;
        assert_eq!(violation(fee), ConfigViolation::InvalidMigrationFee);

        let mut creator = config();
        creator.creator_trading_fee_percentage = 101;
        assert_eq!(violation(creator), ConfigViolation::InvalidCreatorTradingFee(101));

        let mut vesting = config();
        vesting.locked_vesting.amount_per_period = 10;
        vesting.locked_vesting.number_of_period = 2;
        assert_eq!(violation(vesting.clone()), ConfigViolation::InvalidVesting);
        vesting.locked_vesting.frequency = 1;
        assert!(validate(vesting).is_ok());
    }

    #[test]
    fn test_unreachable_threshold_without_supply_caps() {
        // 64 quote units fill the whole curve
        let mut shallow = config();
        shallow.curve = Curve::new(vec![CurvePoint::new(2 * Q64, 1u128 << 70)]).unwrap();
        shallow.migration_quote_threshold = 1_000_000_000_000;
        assert!(shallow.token_supply.is_none());
        assert_eq!(violation(shallow.clone()), ConfigViolation::MigrationThresholdUnreachable);

        shallow.migration_quote_threshold = 64;
        let validated = validate(shallow).unwrap();
        assert_eq!(validated.sqrt_migration_price().unwrap(), 2 * Q64);
    }

    #[test]
    fn test_supply_caps() {
        // Threshold 1e6 stays inside the first segment of the test curve
        let sqrt_migration_price = validate(config()).unwrap().sqrt_migration_price().unwrap();
        let swap = base_token_for_swap(Q64, sqrt_migration_price, &config().curve).unwrap();
        let migration_base =
            migration_base_amount(1_000_000, sqrt_migration_price, Default::default()).unwrap();
        let buffered = swap_amount_with_buffer(swap, Q64, &config().curve).unwrap();

        let exact = TokenSupply {
            pre_migration_token_supply: buffered + migration_base,
            post_migration_token_supply: swap + migration_base,
        };
        let mut capped = config();
        capped.token_supply = Some(exact);
        assert!(validate(capped.clone()).is_ok());

        capped.token_supply = Some(TokenSupply {
            pre_migration_token_supply: buffered + migration_base - 1,
            ..exact
        });
        assert!(matches!(
            violation(capped.clone()),
            ConfigViolation::InsufficientSupply { phase: "pre", .. }
        ));

        capped.token_supply = Some(TokenSupply {
            pre_migration_token_supply: 1,
            post_migration_token_supply: 2,
        });
        assert_eq!(violation(capped), ConfigViolation::SupplyCapsInverted);
    }
}
