//! # Core Type Definitions
//!
//! Plain data shared by every component. Serde derives are enabled with the
//! `client` feature.

pub mod config;
pub mod curve;
pub mod fees;
pub mod quote;

// Re-export all types
pub use config::*;
pub use curve::*;
pub use fees::*;
pub use quote::*;
