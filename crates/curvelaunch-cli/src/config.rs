use std::fs;

use anyhow::{bail, Context, Result};
use curvelaunch_core::designer::{
    build_curve, build_curve_with_buffer, build_curve_with_market_cap, build_curve_with_two_segments,
    CurveDesign, CurveDesignParams, MAX_TOKEN_DECIMALS,
};
use curvelaunch_core::CoreResult;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Launch design loaded from a TOML file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DesignFile {
    /// Supply, decimals, fees, vesting and migration terms
    pub launch: CurveDesignParams,

    /// How the curve is laid out
    pub strategy: DesignStrategy,
}

/// Curve layout and its strategy-specific inputs, in whole tokens
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DesignStrategy {
    /// Single segment from a share of supply kept for migration
    Percentage {
        percentage_supply_on_migration: Decimal,
        migration_quote_threshold: Decimal,
    },
    /// Single segment between two market caps
    MarketCap {
        initial_market_cap: Decimal,
        migration_market_cap: Decimal,
    },
    /// Two segments between two market caps
    TwoSegment {
        initial_market_cap: Decimal,
        migration_market_cap: Decimal,
        percentage_supply_on_migration: Decimal,
    },
    /// Single segment plus a liquidity buffer above the migration price
    Buffered {
        migration_price: Decimal,
        migration_quote_threshold: Decimal,
    },
}

impl DesignStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Percentage { .. } => "percentage",
            Self::MarketCap { .. } => "market_cap",
            Self::TwoSegment { .. } => "two_segment",
            Self::Buffered { .. } => "buffered",
        }
    }

    /// Run the designer for this strategy
    pub fn build(&self, params: &CurveDesignParams) -> CoreResult<CurveDesign> {
        match *self {
            Self::Percentage {
                percentage_supply_on_migration,
                migration_quote_threshold,
            } => build_curve(params, percentage_supply_on_migration, migration_quote_threshold),
            Self::MarketCap {
                initial_market_cap,
                migration_market_cap,
            } => build_curve_with_market_cap(params, initial_market_cap, migration_market_cap),
            Self::TwoSegment {
                initial_market_cap,
                migration_market_cap,
                percentage_supply_on_migration,
            } => build_curve_with_two_segments(
                params,
                initial_market_cap,
                migration_market_cap,
                percentage_supply_on_migration,
            ),
            Self::Buffered {
                migration_price,
                migration_quote_threshold,
            } => build_curve_with_buffer(params, migration_price, migration_quote_threshold),
        }
    }
}

impl DesignFile {
    /// Load a design from a TOML file
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read design file {}", path))?;
        Self::parse(&content).with_context(|| format!("Failed to parse design file {}", path))
    }

    /// Parse and sanity-check a design
    pub fn parse(content: &str) -> Result<Self> {
        let design: DesignFile = toml::from_str(content)?;
        design.validate()?;
        Ok(design)
    }

    fn validate(&self) -> Result<()> {
        if self.launch.total_token_supply == 0 {
            bail!("launch.total_token_supply must be greater than 0");
        }
        if self.launch.token_base_decimal > MAX_TOKEN_DECIMALS
            || self.launch.token_quote_decimal > MAX_TOKEN_DECIMALS
        {
            bail!("token decimals must be at most {}", MAX_TOKEN_DECIMALS);
        }
        Ok(())
    }

    /// Design the pool described by this file
    pub fn design(&self) -> Result<CurveDesign> {
        log::info!("Designing {} curve", self.strategy.name());
        self.strategy
            .build(&self.launch)
            .with_context(|| format!("{} strategy failed", self.strategy.name()))
    }
}
