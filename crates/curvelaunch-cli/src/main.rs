use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use curvelaunch_core::designer::price_from_sqrt_price;
use curvelaunch_core::{quote_exact_in, quote_exact_out, PoolState, SwapRequest, TradeDirection};
use serde::Serialize;

use curvelaunch_cli::{DesignFile, DesignReport, QuoteReport};

#[derive(Parser, Debug)]
#[command(name = "curvelaunch")]
#[command(about = "Design bonding-curve launch pools and quote trades against them")]
struct Args {
    /// Path to the launch design file
    #[arg(short, long, default_value = "launch.toml")]
    config: String,

    /// Compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Design and validate the pool configuration
    Design,

    /// Quote a trade against the designed pool
    Quote(QuoteArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Side {
    /// Pay quote, receive base
    Buy,
    /// Pay base, receive quote
    Sell,
}

impl From<Side> for TradeDirection {
    fn from(side: Side) -> Self {
        match side {
            Side::Buy => TradeDirection::QuoteToBase,
            Side::Sell => TradeDirection::BaseToQuote,
        }
    }
}

#[derive(clap::Args, Debug)]
struct QuoteArgs {
    #[arg(value_enum)]
    side: Side,

    /// Amount in smallest units: paid in, or received with --exact-out
    amount: u64,

    /// Treat the amount as the exact output wanted
    #[arg(long)]
    exact_out: bool,

    /// Slippage tolerance in basis points
    #[arg(long)]
    slippage_bps: Option<u16>,

    /// Trade carries a referral
    #[arg(long)]
    referral: bool,

    /// Slot or timestamp of the trade (the pool activates at 0)
    #[arg(long, default_value = "0")]
    current_point: u64,

    /// Pool sqrt price (Q64.64); defaults to the start price
    #[arg(long)]
    sqrt_price: Option<u128>,

    /// Quote already paid into the pool
    #[arg(long, default_value = "0")]
    quote_reserve: u64,

    /// Base held by the pool; defaults to the swap supply plus the buffer
    #[arg(long)]
    base_reserve: Option<u64>,
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let output = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
    .context("Failed to serialize output")?;
    println!("{}", output);
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "info" }),
    )
    .init();

    let file = DesignFile::load(&args.config)?;
    log::info!(
        "Loaded design: {} tokens, {}/{} decimals",
        file.launch.total_token_supply,
        file.launch.token_base_decimal,
        file.launch.token_quote_decimal
    );

    let design = file.design()?;
    log::info!(
        "Designed {} curve points, start sqrt price {}, migration sqrt price {}",
        design.config.curve.len(),
        design.config.sqrt_start_price,
        design.sqrt_migration_price
    );

    match args.command {
        Command::Design => {
            let report = DesignReport::new(file.strategy.name(), &file.launch, design)?;
            print_json(&report, args.compact)
        }
        Command::Quote(quote) => {
            let state = PoolState {
                sqrt_price: quote.sqrt_price.unwrap_or(design.config.sqrt_start_price),
                base_reserve: quote
                    .base_reserve
                    .unwrap_or(design.swap_base_amount.saturating_add(design.buffer_base_amount)),
                quote_reserve: quote.quote_reserve,
                ..Default::default()
            };
            let request = SwapRequest {
                direction: quote.side.into(),
                amount: quote.amount,
                has_referral: quote.referral,
                current_point: quote.current_point,
                slippage_bps: quote.slippage_bps,
            };

            let swap = if quote.exact_out {
                quote_exact_out(&design.config, &state, &request)
            } else {
                quote_exact_in(&design.config, &state, &request)
            }
            .context("Quote rejected")?;

            let price_after = price_from_sqrt_price(
                swap.sqrt_price_after,
                file.launch.token_base_decimal,
                file.launch.token_quote_decimal,
            )?;
            print_json(
                &QuoteReport {
                    exact_out: quote.exact_out,
                    request,
                    state,
                    quote: swap,
                    price_after,
                },
                args.compact,
            )
        }
    }
}
