//! # Curve Model
//!
//! Price discovery over a piecewise liquidity curve: trade traversal in both
//! directions and for both exact-in and exact-out requests, the price reached
//! at the migration threshold, and the amounts handed over at migration.

pub mod migration;
pub mod swap;
pub mod threshold;

pub use migration::*;
pub use swap::*;
pub use threshold::*;
