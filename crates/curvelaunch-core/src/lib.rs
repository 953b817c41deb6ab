//! # CurveLaunch Core - Bonding Curve Launch Math
//!
//! This crate contains the pricing and configuration logic for token launch
//! pools that sell a base token along a piecewise liquidity curve until a quote
//! threshold is reached. It provides:
//!
//! - Overflow-checked fixed-point and wide-integer arithmetic
//! - Curve traversal in both directions, exact-in and exact-out
//! - Base fee schedules, the rate limiter and the volatility surcharge
//! - Curve design strategies from human launch parameters
//! - Swap quotes against a validated pool
//! - Configuration validation
//!
//! ## Feature Flags
//!
//! - `client`: Enables serde serialization for off-chain use

// Re-export all modules
pub mod constants;
pub mod curve;
pub mod designer;
pub mod errors;
pub mod fee;
pub mod math;
pub mod quote;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use constants::*;
pub use errors::{ConfigViolation, CoreResult, CurveLaunchError};
pub use quote::{quote_exact_in, quote_exact_out, SwapRequest};
pub use types::*;
pub use validation::{validate, ValidatedPoolConfig};
