use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LoanbookError;
use crate::types::{Money, Percent};
use crate::LoanbookResult;

/// Presentation constants shared by the calculators.
///
/// Every field has a default so partial config files are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Markup added to the nominal rate to produce the displayed DAE.
    pub dae_markup_percent: Percent,
    /// Largest end-of-term residual settled without a warning.
    pub settlement_tolerance: Money,
}

impl Default for PricingConfig {
    fn default() -> Self {
        PricingConfig {
            dae_markup_percent: dec!(0.7),
            settlement_tolerance: dec!(0.01),
        }
    }
}

impl PricingConfig {
    pub fn validate(&self) -> LoanbookResult<()> {
        if self.dae_markup_percent < Decimal::ZERO {
            return Err(LoanbookError::invalid(
                "dae_markup_percent",
                "DAE markup cannot be negative",
            ));
        }
        if self.settlement_tolerance < Decimal::ZERO {
            return Err(LoanbookError::invalid(
                "settlement_tolerance",
                "Settlement tolerance cannot be negative",
            ));
        }
        Ok(())
    }
}
