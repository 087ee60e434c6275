//! Lookup requests, responses and transport errors.

use crate::wishlist::{IdentifierError, IdentifierKind, WishlistEntry};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single item lookup. Built fresh from each wishlist entry and never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    /// Marketplace key (ASIN or ISBN-10, separators removed)
    pub item_id: String,
    pub id_kind: IdentifierKind,
}

impl LookupRequest {
    pub fn new(item_id: impl Into<String>, id_kind: IdentifierKind) -> Self {
        Self { item_id: item_id.into(), id_kind }
    }

    /// Builds the request for a wishlist entry, validating its identifier.
    pub fn from_entry(entry: &WishlistEntry) -> Result<Self, IdentifierError> {
        Ok(Self::new(entry.lookup_key()?, entry.identifier_kind))
    }
}

/// What the marketplace told us about an item. Every node may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupResponse {
    pub item: Option<Item>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub attributes: Option<ItemAttributes>,
    pub offer_summary: Option<OfferSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAttributes {
    pub title: Option<String>,
    pub author: Option<String>,
}

/// Lowest offers currently listed for the item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferSummary {
    pub lowest_new_price: Option<Amount>,
    pub lowest_used_price: Option<Amount>,
}

/// A price as the marketplace reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    /// Price in minor units (cents), decimal digits only
    pub amount: String,
    /// Price as displayed on the page
    pub formatted: String,
}

impl Amount {
    pub fn new(amount: impl Into<String>, formatted: impl Into<String>) -> Self {
        Self { amount: amount.into(), formatted: formatted.into() }
    }
}

// Field access never fails: a missing node reads as None.
impl LookupResponse {
    fn attributes(&self) -> Option<&ItemAttributes> {
        self.item.as_ref()?.attributes.as_ref()
    }

    fn offers(&self) -> Option<&OfferSummary> {
        self.item.as_ref()?.offer_summary.as_ref()
    }

    pub fn title(&self) -> Option<&str> {
        self.attributes()?.title.as_deref()
    }

    pub fn author(&self) -> Option<&str> {
        self.attributes()?.author.as_deref()
    }

    pub fn lowest_new_amount(&self) -> Option<&str> {
        self.offers()?.lowest_new_price.as_ref().map(|a| a.amount.as_str())
    }

    pub fn lowest_used_amount(&self) -> Option<&str> {
        self.offers()?.lowest_used_price.as_ref().map(|a| a.amount.as_str())
    }
}

/// Failure reported by the lookup transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("rate limited by the marketplace (HTTP {0})")]
    RateLimited(u16),

    #[error("marketplace unavailable (HTTP {0})")]
    Unavailable(u16),

    #[error("request failed: {0}")]
    Network(String),

    #[error("CAPTCHA detected, the marketplace is blocking requests")]
    Captcha,

    #[error("item {0} not found")]
    NotFound(String),

    #[error("request rejected (HTTP {0})")]
    Rejected(u16),

    #[error("unreadable response: {0}")]
    InvalidResponse(String),
}

impl LookupError {
    /// Maps a non-success HTTP status to an error.
    pub fn from_status(status: u16, item_id: &str) -> Self {
        match status {
            429 => LookupError::RateLimited(status),
            404 => LookupError::NotFound(item_id.to_string()),
            500..=599 => LookupError::Unavailable(status),
            _ => LookupError::Rejected(status),
        }
    }

    /// Whether trying again later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LookupError::RateLimited(_)
                | LookupError::Unavailable(_)
                | LookupError::Network(_)
                | LookupError::Captcha
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn full_response() -> LookupResponse {
        LookupResponse {
            item: Some(Item {
                attributes: Some(ItemAttributes {
                    title: Some("Le Traquet kurde".to_string()),
                    author: Some("Jean Rolin".to_string()),
                }),
                offer_summary: Some(OfferSummary {
                    lowest_new_price: Some(Amount::new("1900", "19,00 €")),
                    lowest_used_price: Some(Amount::new("1250", "12,50 €")),
                }),
            }),
        }
    }

    #[test]
    fn test_request_from_entry() {
        let entry = WishlistEntry::isbn("978-0-306-40615-7", dec!(15));
        let request = LookupRequest::from_entry(&entry).unwrap();
        assert_eq!(request.item_id, "0306406152");
        assert_eq!(request.id_kind, IdentifierKind::Isbn);
    }

    #[test]
    fn test_request_from_invalid_entry() {
        let entry = WishlistEntry::asin("nope", dec!(15));
        assert!(LookupRequest::from_entry(&entry).is_err());
    }

    #[test]
    fn test_accessors_full() {
        let response = full_response();
        assert_eq!(response.title(), Some("Le Traquet kurde"));
        assert_eq!(response.author(), Some("Jean Rolin"));
        assert_eq!(response.lowest_new_amount(), Some("1900"));
        assert_eq!(response.lowest_used_amount(), Some("1250"));
    }

    #[test]
    fn test_accessors_tolerate_missing_nodes() {
        let empty = LookupResponse::default();
        assert!(empty.title().is_none());
        assert!(empty.lowest_new_amount().is_none());

        let mut no_offers = full_response();
        no_offers.item.as_mut().unwrap().offer_summary = None;
        assert_eq!(no_offers.title(), Some("Le Traquet kurde"));
        assert!(no_offers.lowest_used_amount().is_none());

        let mut no_used = full_response();
        no_used.item.as_mut().unwrap().offer_summary.as_mut().unwrap().lowest_used_price = None;
        assert_eq!(no_used.lowest_new_amount(), Some("1900"));
        assert!(no_used.lowest_used_amount().is_none());
    }

    #[test]
    fn test_from_status() {
        assert_eq!(LookupError::from_status(429, "X"), LookupError::RateLimited(429));
        assert_eq!(LookupError::from_status(503, "X"), LookupError::Unavailable(503));
        assert_eq!(LookupError::from_status(500, "X"), LookupError::Unavailable(500));
        assert_eq!(LookupError::from_status(404, "X"), LookupError::NotFound("X".to_string()));
        assert_eq!(LookupError::from_status(400, "X"), LookupError::Rejected(400));
    }

    #[test]
    fn test_transient_classification() {
        assert!(LookupError::RateLimited(429).is_transient());
        assert!(LookupError::Unavailable(503).is_transient());
        assert!(LookupError::Network("timed out".to_string()).is_transient());
        assert!(LookupError::Captcha.is_transient());

        assert!(!LookupError::NotFound("X".to_string()).is_transient());
        assert!(!LookupError::Rejected(400).is_transient());
        assert!(!LookupError::InvalidResponse("empty".to_string()).is_transient());
    }

    #[test]
    fn test_response_serde() {
        let response = full_response();
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("lowest_used_price"));
        let parsed: LookupResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, response);
    }
}
