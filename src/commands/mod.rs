//! CLI command implementations.

pub mod check;
pub mod deals;

pub use check::CheckCommand;
pub use deals::{process, DealsCommand};
