//! Configuration management with TOML, environment variables, and CLI overrides.
//!
//! The config file also carries the wishlist:
//!
//! ```toml
//! region = "fr"
//! ranking = "diff"
//!
//! [[wishlist]]
//! identifier = "978-0-306-40615-7"
//! identifier_kind = "isbn"
//! target_price = 8.50
//! ```

use crate::amazon::regions::Region;
use crate::format::Ranking;
use crate::retry::RetryPolicy;
use crate::wishlist::WishlistEntry;
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Amazon storefront
    #[serde(default)]
    pub region: Region,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Base delay between requests in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Random jitter added to delay (0 to this value)
    #[serde(default = "default_delay_jitter_ms")]
    pub delay_jitter_ms: u64,

    /// Sort key for the deal report
    #[serde(default)]
    pub ranking: Ranking,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Backoff for transient lookup failures
    #[serde(default)]
    pub retry: RetryPolicy,

    /// Books to watch, in report tie-break order
    #[serde(default)]
    pub wishlist: Vec<WishlistEntry>,
}

// At most one request every two seconds.
fn default_delay_ms() -> u64 {
    2000
}

fn default_delay_jitter_ms() -> u64 {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: Region::default(),
            proxy: None,
            delay_ms: default_delay_ms(),
            delay_jitter_ms: default_delay_jitter_ms(),
            ranking: Ranking::default(),
            format: OutputFormat::Table,
            retry: RetryPolicy::default(),
            wishlist: Vec::new(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("bookiniste.toml");
        if local_config.exists() {
            debug!("Found bookiniste.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("bookiniste").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(region) = std::env::var("BOOKINISTE_REGION") {
            if let Ok(r) = region.parse() {
                self.region = r;
            }
        }

        if let Ok(proxy) = std::env::var("BOOKINISTE_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(delay) = std::env::var("BOOKINISTE_DELAY") {
            if let Ok(d) = delay.parse() {
                self.delay_ms = d;
            }
        }

        if let Ok(ranking) = std::env::var("BOOKINISTE_RANKING") {
            if let Ok(r) = ranking.parse() {
                self.ranking = r;
            }
        }

        self
    }

    /// Rejects target prices and retry settings that cannot work.
    ///
    /// Malformed identifiers only warn; the run records them as failures.
    pub fn validate(&self) -> Result<()> {
        for entry in &self.wishlist {
            if entry.target_price <= Decimal::ZERO {
                anyhow::bail!(
                    "Wishlist entry {}: target_price must be positive, got {}",
                    entry.identifier,
                    entry.target_price
                );
            }
            // reported per entry by the wishlist run
            if let Err(e) = entry.lookup_key() {
                warn!("Wishlist entry {} is invalid: {}", entry.identifier, e);
            }
        }

        if self.retry.multiplier < 1.0 {
            anyhow::bail!("retry.multiplier must be at least 1.0, got {}", self.retry.multiplier);
        }

        if self.retry.initial_delay_ms > self.retry.max_delay_ms {
            anyhow::bail!(
                "retry.initial_delay_ms ({}) exceeds retry.max_delay_ms ({})",
                self.retry.initial_delay_ms,
                self.retry.max_delay_ms
            );
        }

        Ok(())
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wishlist::IdentifierKind;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.region, Region::Fr);
        assert_eq!(config.delay_ms, 2000);
        assert_eq!(config.delay_jitter_ms, 1000);
        assert_eq!(config.ranking, Ranking::Diff);
        assert_eq!(config.format, OutputFormat::Table);
        assert_eq!(config.retry, RetryPolicy::default());
        assert!(config.proxy.is_none());
        assert!(config.wishlist.is_empty());
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);

        let err = "invalid".parse::<OutputFormat>().unwrap_err();
        assert!(err.contains("Unknown format"));
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Table.to_string(), "table");
        assert_eq!(OutputFormat::Markdown.to_string(), "markdown");
    }

    #[test]
    fn test_config_from_toml_with_wishlist() {
        let toml = r#"
            region = "uk"
            ranking = "percentage"
            delay_ms = 3000

            [retry]
            max_elapsed_ms = 10000

            [[wishlist]]
            identifier = "B005LS9VXW"
            target_price = 12.5

            [[wishlist]]
            identifier = "978-0-306-40615-7"
            identifier_kind = "isbn"
            target_price = "8.90"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.region, Region::Uk);
        assert_eq!(config.ranking, Ranking::Percentage);
        assert_eq!(config.delay_ms, 3000);
        assert_eq!(config.retry.max_elapsed_ms, 10000);
        assert_eq!(config.retry.initial_delay_ms, 1000);

        assert_eq!(config.wishlist.len(), 2);
        assert_eq!(config.wishlist[0].identifier_kind, IdentifierKind::Asin);
        assert_eq!(config.wishlist[0].target_price, dec!(12.5));
        assert_eq!(config.wishlist[1].identifier_kind, IdentifierKind::Isbn);
        assert_eq!(config.wishlist[1].target_price, dec!(8.90));

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            region = "de"
            [[wishlist]]
            identifier = "B005LS9VXW"
            target_price = 10
            "#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.region, Region::De);
        assert_eq!(config.wishlist[0].target_price, dec!(10));
    }

    #[test]
    fn test_config_from_file_not_found() {
        let result = Config::from_file("/nonexistent/path/bookiniste.toml");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_config_from_file_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml {{{{").unwrap();

        let err = Config::from_file(file.path()).unwrap_err().to_string();
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_config_missing_target_price() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[[wishlist]]\nidentifier = \"B005LS9VXW\"").unwrap();
        assert!(Config::from_file(file.path()).is_err());
    }

    #[test]
    fn test_config_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "region = \"jp\"").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.region, Region::Jp);
    }

    #[test]
    fn test_validate_rejects_non_positive_target() {
        let mut config = Config::default();
        config.wishlist.push(WishlistEntry::asin("B005LS9VXW", dec!(0)));

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("target_price must be positive"));
    }

    #[test]
    fn test_validate_allows_bad_identifier() {
        let mut config = Config::default();
        config.wishlist.push(WishlistEntry::asin("B005LS9VXW", dec!(10)));
        config.wishlist.push(WishlistEntry::isbn("0-306-40615-3", dec!(10)));
        config.wishlist.push(WishlistEntry::asin("SHORT", dec!(10)));

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_retry() {
        let mut config = Config::default();
        config.retry.multiplier = 0.5;
        assert!(config.validate().unwrap_err().to_string().contains("multiplier"));

        let mut config = Config::default();
        config.retry.initial_delay_ms = 5000;
        assert!(config.validate().unwrap_err().to_string().contains("initial_delay_ms"));
    }

    #[test]
    fn test_config_with_env() {
        let orig_region = std::env::var("BOOKINISTE_REGION").ok();
        let orig_ranking = std::env::var("BOOKINISTE_RANKING").ok();

        std::env::set_var("BOOKINISTE_REGION", "it");
        std::env::set_var("BOOKINISTE_RANKING", "percentage");

        let config = Config::new().with_env();
        assert_eq!(config.region, Region::It);
        assert_eq!(config.ranking, Ranking::Percentage);

        match orig_region {
            Some(v) => std::env::set_var("BOOKINISTE_REGION", v),
            None => std::env::remove_var("BOOKINISTE_REGION"),
        }
        match orig_ranking {
            Some(v) => std::env::set_var("BOOKINISTE_RANKING", v),
            None => std::env::remove_var("BOOKINISTE_RANKING"),
        }
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let mut config = Config::default();
        config.wishlist.push(WishlistEntry::isbn("0306406152", dec!(7.5)));

        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.region, config.region);
        assert_eq!(parsed.wishlist, config.wishlist);
        assert_eq!(parsed.retry, config.retry);
    }
}
