//! Wishlist processing: look up every entry, evaluate it, report the deals.

use crate::amazon::{AmazonClient, ItemLookup, LookupRequest, Region};
use crate::config::Config;
use crate::deals::{BookOutcome, BookRecord, DealError, DealEvaluation, PriceQuote};
use crate::format::Report;
use crate::retry::{ResilientLookup, RetryPolicy};
use crate::wishlist::WishlistEntry;
use anyhow::{Context, Result};
use tracing::{info, warn};

/// Checks the configured wishlist for deals.
pub struct DealsCommand {
    config: Config,
    color: bool,
}

impl DealsCommand {
    /// Creates a new deals command.
    pub fn new(config: Config) -> Self {
        Self { config, color: false }
    }

    /// Enables ANSI tier colours in table output.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Processes the wishlist against Amazon and returns the formatted report.
    pub async fn execute(&self) -> Result<String> {
        if self.config.wishlist.is_empty() {
            warn!("No [[wishlist]] entries configured, nothing to check");
            return Ok(self.report(self.config.region).render_outcomes(&[]));
        }

        let client =
            AmazonClient::new(&self.config).await.context("Failed to create HTTP client")?;

        self.execute_with_client(&client).await
    }

    /// Processes the wishlist with a provided client (for testing).
    pub async fn execute_with_client(&self, client: &impl ItemLookup) -> Result<String> {
        let outcomes = process(client, self.config.retry, &self.config.wishlist).await;

        let failed = outcomes.iter().filter(|o| o.error().is_some()).count();
        info!("Checked {} books, {} failed", outcomes.len(), failed);

        Ok(self.report(client.region()).render_outcomes(&outcomes))
    }

    fn report(&self, region: Region) -> Report {
        Report::new(self.config.ranking)
            .with_format(self.config.format)
            .with_color(self.color)
            .with_symbol(region.symbol())
    }
}

/// Evaluates each entry in order, one request at a time.
///
/// A failing entry is recorded and logged; it never stops the run.
pub async fn process<L: ItemLookup + ?Sized>(
    client: &L,
    policy: RetryPolicy,
    entries: &[WishlistEntry],
) -> Vec<BookOutcome> {
    let lookup = ResilientLookup::new(client, policy);
    let mut outcomes = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        info!("[{}/{}] {} {}", index + 1, entries.len(), entry.identifier_kind, entry.identifier);

        let outcome = match evaluate_entry(&lookup, entry).await {
            Ok(record) => BookOutcome::Evaluated(record),
            Err(error) => {
                warn!("Cannot retrieve price for {}: {}", entry.identifier, error);
                BookOutcome::Failed { identifier: entry.identifier.clone(), error }
            }
        };
        outcomes.push(outcome);
    }

    outcomes
}

async fn evaluate_entry<L: ItemLookup + ?Sized>(
    lookup: &ResilientLookup<'_, L>,
    entry: &WishlistEntry,
) -> Result<BookRecord, DealError> {
    let request = LookupRequest::from_entry(entry)?;
    let response = lookup.lookup(&request).await?;

    let quote = PriceQuote::normalize(response.lowest_new_amount(), response.lowest_used_amount())?;
    let evaluation = DealEvaluation::evaluate(entry.target_price, quote)?;

    Ok(BookRecord {
        identifier: entry.identifier.clone(),
        title: response.title().unwrap_or(&entry.identifier).to_string(),
        author: response.author().map(str::to_string),
        evaluation,
    })
}
