pub mod config;
pub mod report;

pub use config::{DesignFile, DesignStrategy};
pub use report::{DesignReport, QuoteReport};
