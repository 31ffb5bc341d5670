pub mod calendar;
pub mod clock;
pub mod config;
pub mod error;
pub mod rounding;
pub mod time_value;
pub mod types;

#[cfg(feature = "fixed_income")]
pub mod fixed_income;

pub use config::CalculationConfig;
pub use error::BondYieldError;
pub use types::*;

/// Standard result type for all bond-yield operations
pub type BondYieldResult<T> = Result<T, BondYieldError>;
