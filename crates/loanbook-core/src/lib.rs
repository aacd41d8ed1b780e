pub mod config;
pub mod error;
pub mod session;
pub mod time_value;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "dashboard")]
pub mod dashboard;

pub use config::PricingConfig;
pub use error::LoanbookError;
pub use types::*;

/// Standard result type for all loanbook operations
pub type LoanbookResult<T> = Result<T, LoanbookError>;
