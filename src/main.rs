//! bookiniste - Amazon book wishlist deal checker
//!
//! Checks every wishlisted book against its target price and prints the deals.

use anyhow::Result;
use bookiniste::amazon::regions::Region;
use bookiniste::commands::{CheckCommand, DealsCommand};
use bookiniste::config::{Config, OutputFormat};
use bookiniste::format::Ranking;
use bookiniste::wishlist::{IdentifierKind, WishlistEntry};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "bookiniste",
    version,
    about = "Watch a book wishlist on Amazon and flag the deals",
    long_about = "Looks up each wishlisted book, compares the lowest new and used offers with your target price, and ranks the results."
)]
struct Cli {
    /// Amazon region to query (overrides config)
    #[arg(short, long, global = true, env = "BOOKINISTE_REGION")]
    region: Option<Region>,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "BOOKINISTE_PROXY")]
    proxy: Option<String>,

    /// Delay between requests in milliseconds
    #[arg(long, global = true, env = "BOOKINISTE_DELAY")]
    delay: Option<u64>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check every wishlist entry and print the ranked deals
    #[command(alias = "d")]
    Deals {
        /// Sort by absolute difference (diff) or relative difference (percentage)
        #[arg(long)]
        ranking: Option<Ranking>,

        /// Disable coloured tiers
        #[arg(long)]
        no_color: bool,
    },

    /// Check a single book against a target price
    #[command(alias = "c")]
    Check {
        /// ASIN or ISBN of the book
        identifier: String,

        /// Target price in major currency units (e.g. 12.50)
        #[arg(short, long)]
        target: Decimal,

        /// Identifier kind: asin or isbn
        #[arg(short, long, default_value = "asin")]
        kind: IdentifierKind,

        /// Disable coloured tiers
        #[arg(long)]
        no_color: bool,
    },

    /// List supported regions
    Regions,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(region) = cli.region {
        config.region = region;
    }
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(delay) = cli.delay {
        config.delay_ms = delay;
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }

    match cli.command {
        Commands::Deals { ranking, no_color } => {
            if let Some(ranking) = ranking {
                config.ranking = ranking;
            }
            config.validate()?;

            let cmd = DealsCommand::new(config).with_color(use_color(no_color));
            let output = cmd.execute().await?;
            println!("{}", output);
        }

        Commands::Check { identifier, target, kind, no_color } => {
            let entry = WishlistEntry::new(identifier, kind, target);
            entry.lookup_key()?;

            let cmd = CheckCommand::new(config).with_color(use_color(no_color));
            let output = cmd.execute(&entry).await?;
            println!("{}", output);
        }

        Commands::Regions => {
            println!("Supported Amazon regions:\n");
            println!("{:<6} {:<20} {:<10} {:<6}", "Code", "Domain", "Currency", "Symbol");
            println!("{:-<6} {:-<20} {:-<10} {:-<6}", "", "", "", "");

            for region in Region::all() {
                println!(
                    "{:<6} {:<20} {:<10} {:<6}",
                    region.to_string(),
                    region.domain(),
                    region.currency(),
                    region.symbol()
                );
            }
        }
    }

    Ok(())
}

fn use_color(no_color: bool) -> bool {
    !no_color && std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}
