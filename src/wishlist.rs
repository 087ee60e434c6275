//! Wishlist entries and the identifiers they carry (ASIN or ISBN).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How a wishlist entry identifies its item on the marketplace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierKind {
    #[default]
    Asin,
    Isbn,
}

impl FromStr for IdentifierKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asin" => Ok(IdentifierKind::Asin),
            "isbn" => Ok(IdentifierKind::Isbn),
            _ => Err(format!("Unknown identifier kind: {}. Use: asin, isbn", s)),
        }
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentifierKind::Asin => write!(f, "ASIN"),
            IdentifierKind::Isbn => write!(f, "ISBN"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("invalid ASIN '{0}': expected 10 alphanumeric characters")]
    InvalidAsin(String),

    #[error("invalid ISBN '{0}': expected 10 or 13 digits")]
    InvalidIsbn(String),

    #[error("ISBN '{0}' has a bad check digit")]
    IsbnChecksum(String),
}

/// One tracked book and the most the user is willing to pay for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistEntry {
    pub identifier: String,
    #[serde(default)]
    pub identifier_kind: IdentifierKind,
    pub target_price: Decimal,
}

impl WishlistEntry {
    pub fn new(identifier: impl Into<String>, identifier_kind: IdentifierKind, target_price: Decimal) -> Self {
        Self { identifier: identifier.into(), identifier_kind, target_price }
    }

    pub fn asin(identifier: impl Into<String>, target_price: Decimal) -> Self {
        Self::new(identifier, IdentifierKind::Asin, target_price)
    }

    pub fn isbn(identifier: impl Into<String>, target_price: Decimal) -> Self {
        Self::new(identifier, IdentifierKind::Isbn, target_price)
    }

    /// Returns the key the marketplace stores this item under.
    ///
    /// Hyphens and spaces are dropped. A `978` ISBN-13 maps to its ISBN-10,
    /// which is how the store keys printed books.
    pub fn lookup_key(&self) -> Result<String, IdentifierError> {
        let cleaned = clean_identifier(&self.identifier);
        match self.identifier_kind {
            IdentifierKind::Asin => {
                if cleaned.len() == 10 && cleaned.chars().all(|c| c.is_ascii_alphanumeric()) {
                    Ok(cleaned)
                } else {
                    Err(IdentifierError::InvalidAsin(self.identifier.clone()))
                }
            }
            IdentifierKind::Isbn => isbn_lookup_key(&cleaned)
                .map_err(|e| match e {
                    IdentifierError::IsbnChecksum(_) => {
                        IdentifierError::IsbnChecksum(self.identifier.clone())
                    }
                    _ => IdentifierError::InvalidIsbn(self.identifier.clone()),
                }),
        }
    }
}

/// Strips separators and upper-cases an identifier as typed by a human.
pub fn clean_identifier(raw: &str) -> String {
    raw.chars().filter(|c| *c != '-' && !c.is_whitespace()).collect::<String>().to_uppercase()
}

fn isbn_lookup_key(isbn: &str) -> Result<String, IdentifierError> {
    match isbn.len() {
        10 => {
            if !is_isbn10_shaped(isbn) {
                return Err(IdentifierError::InvalidIsbn(isbn.to_string()));
            }
            if isbn10_check_digit(&isbn[..9]) != isbn.as_bytes()[9] as char {
                return Err(IdentifierError::IsbnChecksum(isbn.to_string()));
            }
            Ok(isbn.to_string())
        }
        13 => {
            if !isbn.chars().all(|c| c.is_ascii_digit())
                || !(isbn.starts_with("978") || isbn.starts_with("979"))
            {
                return Err(IdentifierError::InvalidIsbn(isbn.to_string()));
            }
            if !isbn13_checksum_ok(isbn) {
                return Err(IdentifierError::IsbnChecksum(isbn.to_string()));
            }
            // 979 ranges have no ISBN-10 form
            if isbn.starts_with("978") {
                let body = &isbn[3..12];
                Ok(format!("{}{}", body, isbn10_check_digit(body)))
            } else {
                Ok(isbn.to_string())
            }
        }
        _ => Err(IdentifierError::InvalidIsbn(isbn.to_string())),
    }
}

fn is_isbn10_shaped(isbn: &str) -> bool {
    let bytes = isbn.as_bytes();
    bytes[..9].iter().all(u8::is_ascii_digit) && (bytes[9].is_ascii_digit() || bytes[9] == b'X')
}

/// Check digit for the nine leading digits of an ISBN-10.
fn isbn10_check_digit(body: &str) -> char {
    let sum: u32 = body
        .bytes()
        .zip((2..=10).rev())
        .map(|(b, weight)| u32::from(b - b'0') * weight)
        .sum();

    match (11 - sum % 11) % 11 {
        10 => 'X',
        d => char::from(b'0' + d as u8),
    }
}

fn isbn13_checksum_ok(isbn: &str) -> bool {
    let sum: u32 = isbn
        .bytes()
        .enumerate()
        .map(|(i, b)| u32::from(b - b'0') * if i % 2 == 0 { 1 } else { 3 })
        .sum();
    sum % 10 == 0
}
