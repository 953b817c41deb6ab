//! # Mathematical Functions
//!
//! Integer primitives for sqrt-price and liquidity arithmetic. Every division
//! names its rounding and every failure is an error, never a wrapped value.

pub mod big_int;
pub mod fixed_point;
pub mod liquidity_math;
pub mod safe_math;

// Re-export commonly used functions
pub use big_int::*;
pub use fixed_point::*;
pub use liquidity_math::*;
pub use safe_math::*;
