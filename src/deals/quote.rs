//! Normalized new/used prices for one item.

use super::DealError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lowest new and used prices in major currency units.
///
/// A missing offer stays `None`; it is never read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub new: Option<Decimal>,
    pub used: Option<Decimal>,
}

impl PriceQuote {
    pub fn new(new: Option<Decimal>, used: Option<Decimal>) -> Self {
        Self { new, used }
    }

    /// Converts raw minor-unit strings (cents) into a quote.
    ///
    /// `None` and blank strings mean "no offer". Anything else must be
    /// decimal digits, otherwise the marketplace broke its contract and
    /// [`DealError::MalformedPrice`] is returned.
    pub fn normalize(raw_new: Option<&str>, raw_used: Option<&str>) -> Result<Self, DealError> {
        Ok(Self { new: minor_to_major(raw_new)?, used: minor_to_major(raw_used)? })
    }

    /// True when neither a new nor a used offer exists.
    pub fn is_empty(&self) -> bool {
        self.new.is_none() && self.used.is_none()
    }
}

fn minor_to_major(raw: Option<&str>) -> Result<Option<Decimal>, DealError> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let digits = raw.trim();
    if digits.is_empty() {
        return Ok(None);
    }

    let malformed = || DealError::MalformedPrice { raw: raw.to_string() };
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }

    let minor: i64 = digits.parse().map_err(|_| malformed())?;
    Ok(Some(Decimal::new(minor, 2)))
}
