//! bookiniste - Amazon book wishlist deal checker
//!
//! Looks up each wishlisted book with TLS fingerprint emulation, compares the
//! lowest new and used offers with a target price, and ranks the deals.

pub mod amazon;
pub mod commands;
pub mod config;
pub mod deals;
pub mod format;
pub mod retry;
pub mod wishlist;

pub use amazon::regions::Region;
pub use config::Config;
pub use deals::{BookOutcome, BookRecord, DealError, DealEvaluation, PriceQuote, Tier};
pub use retry::{ResilientLookup, RetryPolicy};
pub use wishlist::{IdentifierKind, WishlistEntry};
