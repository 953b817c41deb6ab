//! JSON reports printed by the CLI

use anyhow::Result;
use curvelaunch_core::designer::{price_from_sqrt_price, CurveDesign, CurveDesignParams};
use curvelaunch_core::{PoolState, SwapQuote, SwapRequest};
use rust_decimal::Decimal;
use serde::Serialize;

/// A designed pool with its human-readable prices
#[derive(Debug, Serialize)]
pub struct DesignReport {
    pub strategy: &'static str,
    /// Whole quote tokens per whole base token
    pub start_price: Decimal,
    pub migration_price: Decimal,
    pub design: CurveDesign,
}

impl DesignReport {
    pub fn new(strategy: &'static str, params: &CurveDesignParams, design: CurveDesign) -> Result<Self> {
        let start_price = price_from_sqrt_price(
            design.config.sqrt_start_price,
            params.token_base_decimal,
            params.token_quote_decimal,
        )?;
        let migration_price = price_from_sqrt_price(
            design.sqrt_migration_price,
            params.token_base_decimal,
            params.token_quote_decimal,
        )?;
        Ok(Self {
            strategy,
            start_price,
            migration_price,
            design,
        })
    }
}

/// A quote together with the request and pool state it was computed for
#[derive(Debug, Serialize)]
pub struct QuoteReport {
    pub exact_out: bool,
    pub request: SwapRequest,
    pub state: PoolState,
    pub quote: SwapQuote,
    /// Price after the trade, whole quote tokens per whole base token
    pub price_after: Decimal,
}
