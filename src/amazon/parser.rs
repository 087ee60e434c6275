//! HTML parser turning Amazon item pages into lookup responses.

use crate::amazon::models::{Amount, Item, ItemAttributes, LookupError, LookupResponse, OfferSummary};
use crate::amazon::regions::Region;
use crate::amazon::selectors::{errors, item};
use scraper::{Html, Selector};
use tracing::{debug, trace};

/// Parser for Amazon item pages.
pub struct Parser {
    region: Region,
}

impl Parser {
    /// Creates a new parser for the given region.
    pub fn new(region: Region) -> Self {
        Self { region }
    }

    /// Parses an item page. Missing fields are left as `None`; only blocked
    /// or error pages fail.
    pub fn parse_item(&self, html: &str, item_id: &str) -> Result<LookupResponse, LookupError> {
        let document = Html::parse_document(html);

        self.check_for_errors(&document)?;

        let title = first_text(&document, &item::TITLE);
        let author = first_text(&document, &item::AUTHOR);
        let lowest_new_price = self.amount(&document, &item::NEW_PRICE);
        let lowest_used_price = self.amount(&document, &item::USED_PRICE);

        trace!(
            "{}: title={:?} author={:?} new={:?} used={:?}",
            item_id,
            title,
            author,
            lowest_new_price,
            lowest_used_price
        );

        if title.is_none() && lowest_new_price.is_none() && lowest_used_price.is_none() {
            debug!("No item data found on page for {}", item_id);
            return Ok(LookupResponse { item: None });
        }

        let attributes =
            (title.is_some() || author.is_some()).then_some(ItemAttributes { title, author });
        let offer_summary = (lowest_new_price.is_some() || lowest_used_price.is_some())
            .then_some(OfferSummary { lowest_new_price, lowest_used_price });

        Ok(LookupResponse { item: Some(Item { attributes, offer_summary }) })
    }

    /// Checks for CAPTCHA or the 503 error page.
    fn check_for_errors(&self, document: &Html) -> Result<(), LookupError> {
        if document.select(&errors::CAPTCHA).next().is_some() {
            return Err(LookupError::Captcha);
        }

        if document.select(&errors::DOG_PAGE).next().is_some() {
            return Err(LookupError::Unavailable(503));
        }

        Ok(())
    }

    fn amount(&self, document: &Html, selector: &Selector) -> Option<Amount> {
        let formatted = first_text(document, selector)?;
        let minor = self.parse_minor_units(&formatted)?;
        Some(Amount::new(minor, formatted))
    }

    /// Converts a displayed price ("1.234,56 €", "$10") into minor units
    /// ("123456", "1000"). Ranges keep their lower bound.
    fn parse_minor_units(&self, text: &str) -> Option<String> {
        let cleaned: String = text
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',' || *c == '-')
            .collect();

        let first = cleaned.split('-').find(|part| !part.is_empty())?;

        let normalized = if self.region.uses_comma_decimal() {
            first.replace('.', "").replace(',', ".")
        } else {
            first.replace(',', "")
        };

        let (whole, fraction) = normalized.split_once('.').unwrap_or((normalized.as_str(), ""));
        if whole.is_empty() && fraction.is_empty() {
            return None;
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
            || fraction.len() > 2
        {
            return None;
        }

        let whole: u64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
        let cents: u64 = format!("{:0<2}", fraction).parse().ok()?;

        Some((whole.checked_mul(100)? + cents).to_string())
    }
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .map(|e| e.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" "))
        .find(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minor_units_us() {
        let parser = Parser::new(Region::Us);
        assert_eq!(parser.parse_minor_units("$29.99").as_deref(), Some("2999"));
        assert_eq!(parser.parse_minor_units("$1,234.56").as_deref(), Some("123456"));
        assert_eq!(parser.parse_minor_units("$10").as_deref(), Some("1000"));
        assert_eq!(parser.parse_minor_units("$0.99").as_deref(), Some("99"));
        assert_eq!(parser.parse_minor_units("$7.5").as_deref(), Some("750"));
    }

    #[test]
    fn test_minor_units_eu() {
        let parser = Parser::new(Region::Fr);
        assert_eq!(parser.parse_minor_units("29,99 €").as_deref(), Some("2999"));
        assert_eq!(parser.parse_minor_units("1.234,56 €").as_deref(), Some("123456"));
        assert_eq!(parser.parse_minor_units("EUR 18,00").as_deref(), Some("1800"));
        assert_eq!(parser.parse_minor_units("0,99€").as_deref(), Some("99"));
    }

    #[test]
    fn test_minor_units_yen() {
        let parser = Parser::new(Region::Jp);
        assert_eq!(parser.parse_minor_units("¥2,999").as_deref(), Some("299900"));
    }

    #[test]
    fn test_minor_units_range_takes_lower_bound() {
        let parser = Parser::new(Region::Us);
        assert_eq!(parser.parse_minor_units("$10 - $20").as_deref(), Some("1000"));
    }

    #[test]
    fn test_minor_units_unparseable() {
        let parser = Parser::new(Region::Us);
        assert_eq!(parser.parse_minor_units(""), None);
        assert_eq!(parser.parse_minor_units("N/A"), None);
        assert_eq!(parser.parse_minor_units("Currently unavailable"), None);
        assert_eq!(parser.parse_minor_units("$1.234"), None);
    }

    #[test]
    fn test_parse_item_full_page() {
        let parser = Parser::new(Region::Fr);
        let html = r#"
            <html><body>
                <span id="productTitle">  Le Traquet kurde  </span>
                <div id="bylineInfo"><span class="author"><a class="a-link-normal">Jean Rolin</a></span></div>
                <span id="newBuyBoxPrice">19,00 €</span>
                <div id="usedBuySection"><span class="offer-price">12,50 €</span></div>
            </body></html>
        "#;

        let response = parser.parse_item(html, "2070368223").unwrap();
        assert_eq!(response.title(), Some("Le Traquet kurde"));
        assert_eq!(response.author(), Some("Jean Rolin"));
        assert_eq!(response.lowest_new_amount(), Some("1900"));
        assert_eq!(response.lowest_used_amount(), Some("1250"));

        let offers = response.item.unwrap().offer_summary.unwrap();
        assert_eq!(offers.lowest_new_price.unwrap().formatted, "19,00 €");
    }

    #[test]
    fn test_parse_item_without_used_offer() {
        let parser = Parser::new(Region::Us);
        let html = r#"
            <html><body>
                <span id="productTitle">Programming Rust</span>
                <div id="corePrice_feature_div">
                    <span class="a-price"><span class="a-offscreen">$45.20</span></span>
                </div>
            </body></html>
        "#;

        let response = parser.parse_item(html, "1492052590").unwrap();
        assert_eq!(response.title(), Some("Programming Rust"));
        assert!(response.author().is_none());
        assert_eq!(response.lowest_new_amount(), Some("4520"));
        assert!(response.lowest_used_amount().is_none());
    }

    #[test]
    fn test_parse_item_empty_page() {
        let parser = Parser::new(Region::Us);
        let response = parser.parse_item("<html><body></body></html>", "B000000000").unwrap();
        assert!(response.item.is_none());
    }

    #[test]
    fn test_parse_item_captcha() {
        let parser = Parser::new(Region::Us);
        let html =
            r#"<html><body><form action="/errors/validateCaptcha">CAPTCHA</form></body></html>"#;
        assert_eq!(parser.parse_item(html, "B000000000"), Err(LookupError::Captcha));
    }

    #[test]
    fn test_parse_item_dog_page() {
        let parser = Parser::new(Region::Us);
        let html = r#"<html><body><img alt="Sorry, the dog ate this page"></body></html>"#;
        let err = parser.parse_item(html, "B000000000").unwrap_err();
        assert_eq!(err, LookupError::Unavailable(503));
        assert!(err.is_transient());
    }
}
