//! Deal assessment against a target price.

use super::{DealError, PriceQuote};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest overshoot (major units) still counted as a green deal.
pub const GREEN_MAX_DIFF: Decimal = dec!(3);

/// Largest overshoot (major units) still counted as a yellow deal.
pub const YELLOW_MAX_DIFF: Decimal = dec!(5);

/// How close the best price is to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Green,
    Yellow,
    Red,
}

impl Tier {
    pub fn from_diff(diff: Decimal) -> Self {
        if diff <= GREEN_MAX_DIFF {
            Tier::Green
        } else if diff <= YELLOW_MAX_DIFF {
            Tier::Yellow
        } else {
            Tier::Red
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Green => write!(f, "green"),
            Tier::Yellow => write!(f, "yellow"),
            Tier::Red => write!(f, "red"),
        }
    }
}

/// Outcome of comparing the market against what the user wants to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealEvaluation {
    pub target: Decimal,
    pub new: Option<Decimal>,
    pub used: Option<Decimal>,
    /// Cheapest available offer
    pub min: Decimal,
    /// `min - target`; negative means cheaper than the target
    pub diff: Decimal,
    /// `diff` as a percentage of the target
    pub percentage: Decimal,
    pub tier: Tier,
}

impl DealEvaluation {
    /// Evaluates a quote. Fails when there is no offer at all.
    pub fn evaluate(target: Decimal, quote: PriceQuote) -> Result<Self, DealError> {
        if target <= Decimal::ZERO {
            return Err(DealError::InvalidTarget(target));
        }

        let min = match (quote.new, quote.used) {
            (Some(new), Some(used)) => new.min(used),
            (Some(price), None) | (None, Some(price)) => price,
            (None, None) => return Err(DealError::NoPriceAvailable),
        };

        let overflow = || DealError::Overflow { min, target };
        let diff = min.checked_sub(target).ok_or_else(overflow)?;
        let percentage = diff
            .checked_div(target)
            .and_then(|ratio| ratio.checked_mul(dec!(100)))
            .ok_or_else(overflow)?;

        Ok(Self {
            target,
            new: quote.new,
            used: quote.used,
            min,
            diff,
            percentage,
            tier: Tier::from_diff(diff),
        })
    }

    /// Whether the new price adds information beyond `min`.
    pub fn new_differs_from_min(&self) -> bool {
        self.new.is_some_and(|new| new != self.min)
    }
}
