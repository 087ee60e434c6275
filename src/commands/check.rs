//! One-off deal check for a single identifier.

use crate::amazon::{AmazonClient, ItemLookup};
use crate::commands::deals::process;
use crate::config::Config;
use crate::deals::BookOutcome;
use crate::format::Report;
use crate::wishlist::WishlistEntry;
use anyhow::{Context, Result};

/// Checks one book against a target price without touching the wishlist.
pub struct CheckCommand {
    config: Config,
    color: bool,
}

impl CheckCommand {
    /// Creates a new check command.
    pub fn new(config: Config) -> Self {
        Self { config, color: false }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Looks up the entry and returns its report line.
    pub async fn execute(&self, entry: &WishlistEntry) -> Result<String> {
        let client =
            AmazonClient::new(&self.config).await.context("Failed to create HTTP client")?;
        self.execute_with_client(&client, entry).await
    }

    /// Looks up the entry with a provided client (for testing).
    ///
    /// Unlike a wishlist run, a failed lookup is an error here.
    pub async fn execute_with_client(
        &self,
        client: &impl ItemLookup,
        entry: &WishlistEntry,
    ) -> Result<String> {
        if entry.target_price <= rust_decimal::Decimal::ZERO {
            anyhow::bail!("Target price must be positive, got {}", entry.target_price);
        }

        let outcomes = process(client, self.config.retry, std::slice::from_ref(entry)).await;

        if let Some(BookOutcome::Failed { identifier, error }) = outcomes.first() {
            anyhow::bail!("Cannot retrieve price for {}: {}", identifier, error);
        }

        let report = Report::new(self.config.ranking)
            .with_format(self.config.format)
            .with_color(self.color)
            .with_symbol(client.region().symbol());

        Ok(report.render_outcomes(&outcomes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amazon::{
        Amount, Item, ItemAttributes, LookupError, LookupRequest, LookupResponse, OfferSummary,
        Region,
    };
    use crate::format::Ranking;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    struct MockLookup {
        response: Result<LookupResponse, LookupError>,
        requested: Mutex<Vec<String>>,
    }

    impl MockLookup {
        fn new(response: Result<LookupResponse, LookupError>) -> Self {
            Self { response, requested: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl ItemLookup for MockLookup {
        async fn lookup(&self, request: &LookupRequest) -> Result<LookupResponse, LookupError> {
            self.requested.lock().unwrap().push(request.item_id.clone());
            self.response.clone()
        }

        fn region(&self) -> Region {
            Region::Uk
        }
    }

    fn priced(new: &str) -> LookupResponse {
        LookupResponse {
            item: Some(Item {
                attributes: Some(ItemAttributes {
                    title: Some("A Brief History of Time".to_string()),
                    author: Some("Stephen Hawking".to_string()),
                }),
                offer_summary: Some(OfferSummary {
                    lowest_new_price: Some(Amount::new(new, new)),
                    lowest_used_price: None,
                }),
            }),
        }
    }

    #[tokio::test]
    async fn test_check_isbn13_uses_isbn10_key() {
        let client = MockLookup::new(Ok(priced("1400")));
        let entry = WishlistEntry::isbn("978-0-306-40615-7", dec!(10));

        let output = CheckCommand::new(Config::default())
            .execute_with_client(&client, &entry)
            .await
            .unwrap();

        assert_eq!(*client.requested.lock().unwrap(), vec!["0306406152"]);
        assert!(output.starts_with("- A Brief History of Time"));
        // region symbol comes from the client
        assert!(output.contains("14.0£"));
        assert!(output.contains("+4.0£"));
    }

    #[tokio::test]
    async fn test_check_percentage_ranking() {
        let client = MockLookup::new(Ok(priced("1200")));
        let config = Config { ranking: Ranking::Percentage, ..Config::default() };
        let entry = WishlistEntry::asin("B005LS9VXW", dec!(10));

        let output = CheckCommand::new(config).execute_with_client(&client, &entry).await.unwrap();
        assert!(output.contains("+20.0%"));
    }

    #[tokio::test]
    async fn test_check_failure_is_error() {
        let client = MockLookup::new(Err(LookupError::NotFound("B005LS9VXW".to_string())));
        let entry = WishlistEntry::asin("B005LS9VXW", dec!(10));

        let err = CheckCommand::new(Config::default())
            .execute_with_client(&client, &entry)
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Cannot retrieve price for B005LS9VXW"));
    }

    #[tokio::test]
    async fn test_check_rejects_non_positive_target() {
        let client = MockLookup::new(Ok(priced("1200")));
        let entry = WishlistEntry::asin("B005LS9VXW", dec!(0));

        let result = CheckCommand::new(Config::default()).execute_with_client(&client, &entry).await;
        tokio_test::assert_err!(result);
        assert!(client.requested.lock().unwrap().is_empty());
    }
}
