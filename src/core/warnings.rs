use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Observations on a computed result that do not stop it being reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum Warning {
    /// Sell date is before the purchase date; the holding period is negative.
    SellBeforePurchase { days: i64 },
    /// Short term loss is not floored, so the tax amount is negative.
    NegativeShortTermTax,
}

impl Warning {
    pub fn name(&self) -> &'static str {
        match self {
            Warning::SellBeforePurchase { .. } => "SellBeforePurchase",
            Warning::NegativeShortTermTax => "NegativeShortTermTax",
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::SellBeforePurchase { days } => {
                write!(f, "sell date is {} day(s) before purchase date", days.abs())
            }
            Warning::NegativeShortTermTax => {
                write!(f, "short term loss gives a negative tax amount")
            }
        }
    }
}
