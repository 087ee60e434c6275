//! Deal evaluation: price normalization, tiering and per-book records.

pub mod evaluate;
pub mod quote;
pub mod record;

use crate::amazon::LookupError;
use crate::wishlist::IdentifierError;
use rust_decimal::Decimal;
use thiserror::Error;

pub use evaluate::{DealEvaluation, Tier, GREEN_MAX_DIFF, YELLOW_MAX_DIFF};
pub use quote::PriceQuote;
pub use record::{BookOutcome, BookRecord, TITLE_MAX_LEN};

/// Why a wishlist entry could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DealError {
    #[error("malformed price '{raw}' returned by the marketplace")]
    MalformedPrice { raw: String },

    #[error("no price found")]
    NoPriceAvailable,

    #[error("target price must be positive, got {0}")]
    InvalidTarget(Decimal),

    #[error("price {min} against target {target} is out of range")]
    Overflow { min: Decimal, target: Decimal },

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    InvalidIdentifier(#[from] IdentifierError),
}
