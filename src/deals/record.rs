//! Evaluated wishlist books and per-entry outcomes.

use super::{DealError, DealEvaluation};
use serde::Serialize;

/// Titles longer than this are shortened in reports.
pub const TITLE_MAX_LEN: usize = 25;

/// A wishlist book with its current deal assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookRecord {
    /// Identifier as written in the wishlist
    pub identifier: String,
    /// Full title; falls back to the identifier when the page has none
    pub title: String,
    pub author: Option<String>,
    pub evaluation: DealEvaluation,
}

impl BookRecord {
    /// Title cut to [`TITLE_MAX_LEN`] characters, with `..` when shortened.
    pub fn display_title(&self) -> String {
        if self.title.chars().count() > TITLE_MAX_LEN {
            let short: String = self.title.chars().take(TITLE_MAX_LEN).collect();
            format!("{}..", short)
        } else {
            self.title.clone()
        }
    }
}

/// Result of processing one wishlist entry.
#[derive(Debug, Clone, PartialEq)]
pub enum BookOutcome {
    Evaluated(BookRecord),
    Failed { identifier: String, error: DealError },
}

impl BookOutcome {
    pub fn identifier(&self) -> &str {
        match self {
            BookOutcome::Evaluated(record) => &record.identifier,
            BookOutcome::Failed { identifier, .. } => identifier,
        }
    }

    pub fn record(&self) -> Option<&BookRecord> {
        match self {
            BookOutcome::Evaluated(record) => Some(record),
            BookOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&DealError> {
        match self {
            BookOutcome::Evaluated(_) => None,
            BookOutcome::Failed { error, .. } => Some(error),
        }
    }
}
