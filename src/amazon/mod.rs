//! Amazon marketplace transport: HTTP client, page parsing and lookup types.

pub mod client;
pub mod models;
pub mod parser;
pub mod regions;
pub mod selectors;

pub use client::{AmazonClient, ItemLookup};
pub use models::{Amount, Item, ItemAttributes, LookupError, LookupRequest, LookupResponse, OfferSummary};
pub use parser::Parser;
pub use regions::Region;
