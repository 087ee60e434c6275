//! Deal report rendering (table, JSON, markdown, CSV).

use crate::config::OutputFormat;
use crate::deals::{BookOutcome, BookRecord, DealError, Tier};
use owo_colors::{AnsiColors, OwoColorize};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::str::FromStr;

/// Key the report is sorted on, ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ranking {
    /// Absolute difference to the target
    #[default]
    Diff,
    /// Difference as a percentage of the target
    Percentage,
}

impl Ranking {
    fn key(&self, record: &BookRecord) -> Decimal {
        match self {
            Ranking::Diff => record.evaluation.diff,
            Ranking::Percentage => record.evaluation.percentage,
        }
    }
}

impl FromStr for Ranking {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "diff" | "by_diff" | "difference" => Ok(Ranking::Diff),
            "percentage" | "by_percentage" | "pct" | "percent" => Ok(Ranking::Percentage),
            _ => Err(format!("Unknown ranking: {}. Use: diff, percentage", s)),
        }
    }
}

impl fmt::Display for Ranking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ranking::Diff => write!(f, "diff"),
            Ranking::Percentage => write!(f, "percentage"),
        }
    }
}

const TITLE_WIDTH: usize = 27;
const PRICE_WIDTH: usize = 6;

/// Sorts evaluated books and renders them.
pub struct Report {
    ranking: Ranking,
    format: OutputFormat,
    color: bool,
    symbol: String,
}

impl Report {
    /// Creates a plain-text table report with the given ranking.
    pub fn new(ranking: Ranking) -> Self {
        Self { ranking, format: OutputFormat::Table, color: false, symbol: "€".to_string() }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Enables ANSI colours in table output.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Currency symbol appended to prices in table output.
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = symbol.into();
        self
    }

    /// Records in ascending ranking order. Equal keys keep their input order.
    pub fn sorted<'a>(&self, records: &[&'a BookRecord]) -> Vec<&'a BookRecord> {
        let mut sorted = records.to_vec();
        sorted.sort_by_key(|record| self.ranking.key(record));
        sorted
    }

    /// Renders one line per record, best deals first.
    pub fn render(&self, records: &[BookRecord]) -> Vec<String> {
        let refs: Vec<&BookRecord> = records.iter().collect();
        self.sorted(&refs).into_iter().map(|record| self.deal_line(record)).collect()
    }

    /// Renders a whole run: evaluated books, then failures in wishlist order.
    pub fn render_outcomes(&self, outcomes: &[BookOutcome]) -> String {
        let records: Vec<&BookRecord> = outcomes.iter().filter_map(BookOutcome::record).collect();
        let records = self.sorted(&records);
        let failures: Vec<(&str, &DealError)> = outcomes
            .iter()
            .filter_map(|o| o.error().map(|e| (o.identifier(), e)))
            .collect();

        match self.format {
            OutputFormat::Table => self.table(&records, &failures),
            OutputFormat::Json => self.json(&records, &failures),
            OutputFormat::Markdown => self.markdown(&records, &failures),
            OutputFormat::Csv => self.csv(&records, &failures),
        }
    }

    // Table formatting

    fn table(&self, records: &[&BookRecord], failures: &[(&str, &DealError)]) -> String {
        if records.is_empty() && failures.is_empty() {
            return "Wishlist is empty.".to_string();
        }

        let mut lines: Vec<String> = records.iter().map(|r| self.deal_line(r)).collect();
        lines.extend(failures.iter().map(|(id, error)| self.failure_line(id, error)));
        lines.join("\n")
    }

    fn deal_line(&self, record: &BookRecord) -> String {
        let eval = &record.evaluation;
        let tier = tier_color(eval.tier);

        let target = self.price(eval.target, AnsiColors::Cyan, "");
        let min = self.price(eval.min, tier, "");
        let prices = match eval.new {
            Some(new) if eval.new_differs_from_min() => {
                format!("{} / {}", min, self.price(new, AnsiColors::White, ""))
            }
            // same width as "min / new"
            _ => format!("{}{}", min, " ".repeat(PRICE_WIDTH + 3)),
        };
        let diff = self.price(eval.diff, tier, "+");

        let mut line = format!(
            "- {:<width$}: {} -> {} ({})",
            record.display_title(),
            target,
            prices,
            diff,
            width = TITLE_WIDTH
        );

        if self.ranking == Ranking::Percentage {
            let pct = format!("{}%", signed(eval.percentage));
            line.push_str(&format!(" [{}]", self.paint(format!("{:>7}", pct), tier)));
        }

        line
    }

    fn failure_line(&self, identifier: &str, error: &DealError) -> String {
        let message = self.paint(error.to_string(), AnsiColors::Red);
        format!("- {:<width$}: {}", identifier, message, width = TITLE_WIDTH)
    }

    /// One price column: one decimal, currency symbol, padded, coloured.
    fn price(&self, value: Decimal, color: AnsiColors, sign: &str) -> String {
        let number = if sign == "+" { signed(value) } else { format!("{:.1}", value.round_dp(1)) };
        let text = format!("{:<width$}", format!("{}{}", number, self.symbol), width = PRICE_WIDTH);
        self.paint(text, color)
    }

    fn paint(&self, text: String, color: AnsiColors) -> String {
        if self.color {
            text.color(color).to_string()
        } else {
            text
        }
    }

    // JSON formatting

    fn json(&self, records: &[&BookRecord], failures: &[(&str, &DealError)]) -> String {
        let failures: Vec<_> = failures
            .iter()
            .map(|(id, error)| json!({ "identifier": id, "error": error.to_string() }))
            .collect();

        let value = json!({
            "ranking": self.ranking,
            "deals": records,
            "failures": failures,
        });

        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    // Markdown formatting

    fn markdown(&self, records: &[&BookRecord], failures: &[(&str, &DealError)]) -> String {
        let mut lines = Vec::new();

        lines.push("| Title | Author | Target | Best | New | Used | Diff | % | Tier |".to_string());
        lines.push("|-------|--------|--------|------|-----|------|------|---|------|".to_string());

        for record in records {
            let eval = &record.evaluation;
            lines.push(format!(
                "| {} | {} | {:.2} | {:.2} | {} | {} | {} | {}% | {} |",
                record.display_title(),
                record.author.as_deref().unwrap_or(""),
                eval.target,
                eval.min,
                optional(eval.new),
                optional(eval.used),
                signed(eval.diff),
                signed(eval.percentage),
                eval.tier
            ));
        }

        if !failures.is_empty() {
            lines.push(String::new());
            for (id, error) in failures {
                lines.push(format!("- **{}**: {}", id, error));
            }
        }

        lines.push(String::new());
        lines.push(format!("*{} books checked, {} failed*", records.len() + failures.len(), failures.len()));

        lines.join("\n")
    }

    // CSV formatting

    fn csv_header(&self) -> String {
        "identifier,title,author,target,new,used,min,diff,percentage,tier,error".to_string()
    }

    fn csv(&self, records: &[&BookRecord], failures: &[(&str, &DealError)]) -> String {
        let mut lines = vec![self.csv_header()];

        for record in records {
            let eval = &record.evaluation;
            lines.push(format!(
                "{},{},{},{},{},{},{},{},{},{},",
                Self::csv_escape(&record.identifier),
                Self::csv_escape(&record.title),
                record.author.as_deref().map(Self::csv_escape).unwrap_or_default(),
                eval.target,
                eval.new.map(|p| p.to_string()).unwrap_or_default(),
                eval.used.map(|p| p.to_string()).unwrap_or_default(),
                eval.min,
                eval.diff,
                eval.percentage.round_dp(2),
                eval.tier
            ));
        }

        for (id, error) in failures {
            lines.push(format!(
                "{},,,,,,,,,,{}",
                Self::csv_escape(id),
                Self::csv_escape(&error.to_string())
            ));
        }

        lines.join("\n")
    }

    fn csv_escape(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}

fn tier_color(tier: Tier) -> AnsiColors {
    match tier {
        Tier::Green => AnsiColors::Green,
        Tier::Yellow => AnsiColors::Yellow,
        Tier::Red => AnsiColors::Red,
    }
}

/// One decimal with an explicit sign: `+2.5`, `-1.0`, `+0.0`.
fn signed(value: Decimal) -> String {
    let rounded = value.round_dp(1);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("{:.1}", rounded)
    } else {
        format!("+{:.1}", rounded.abs())
    }
}

fn optional(value: Option<Decimal>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
}
