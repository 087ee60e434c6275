//! Amazon storefronts a wishlist can be checked against.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Static description of one storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Storefront {
    pub code: &'static str,
    pub domain: &'static str,
    pub currency: &'static str,
    pub symbol: &'static str,
    pub accept_language: &'static str,
    pub comma_decimal: bool,
}

const US: Storefront = Storefront {
    code: "us",
    domain: "amazon.com",
    currency: "USD",
    symbol: "$",
    accept_language: "en-US,en;q=0.9",
    comma_decimal: false,
};

const UK: Storefront = Storefront {
    code: "uk",
    domain: "amazon.co.uk",
    currency: "GBP",
    symbol: "£",
    accept_language: "en-GB,en;q=0.9",
    comma_decimal: false,
};

const DE: Storefront = Storefront {
    code: "de",
    domain: "amazon.de",
    currency: "EUR",
    symbol: "€",
    accept_language: "de-DE,de;q=0.9,en;q=0.8",
    comma_decimal: true,
};

const FR: Storefront = Storefront {
    code: "fr",
    domain: "amazon.fr",
    currency: "EUR",
    symbol: "€",
    accept_language: "fr-FR,fr;q=0.9,en;q=0.8",
    comma_decimal: true,
};

const ES: Storefront = Storefront {
    code: "es",
    domain: "amazon.es",
    currency: "EUR",
    symbol: "€",
    accept_language: "es-ES,es;q=0.9,en;q=0.8",
    comma_decimal: true,
};

const IT: Storefront = Storefront {
    code: "it",
    domain: "amazon.it",
    currency: "EUR",
    symbol: "€",
    accept_language: "it-IT,it;q=0.9,en;q=0.8",
    comma_decimal: true,
};

const CA: Storefront = Storefront {
    code: "ca",
    domain: "amazon.ca",
    currency: "CAD",
    symbol: "$",
    accept_language: "en-CA,en;q=0.9,fr;q=0.8",
    comma_decimal: false,
};

const JP: Storefront = Storefront {
    code: "jp",
    domain: "amazon.co.jp",
    currency: "JPY",
    symbol: "¥",
    accept_language: "ja-JP,ja;q=0.9,en;q=0.8",
    comma_decimal: false,
};

/// Supported Amazon storefronts. Defaults to amazon.fr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Us,
    Uk,
    De,
    #[default]
    Fr,
    Es,
    It,
    Ca,
    Jp,
}

impl Region {
    /// Returns the storefront details for this region.
    pub fn storefront(&self) -> &'static Storefront {
        match self {
            Region::Us => &US,
            Region::Uk => &UK,
            Region::De => &DE,
            Region::Fr => &FR,
            Region::Es => &ES,
            Region::It => &IT,
            Region::Ca => &CA,
            Region::Jp => &JP,
        }
    }

    pub fn domain(&self) -> &'static str {
        self.storefront().domain
    }

    pub fn base_url(&self) -> String {
        format!("https://www.{}", self.domain())
    }

    pub fn currency(&self) -> &'static str {
        self.storefront().currency
    }

    /// Currency symbol used in the deal report.
    pub fn symbol(&self) -> &'static str {
        self.storefront().symbol
    }

    pub fn accept_language(&self) -> &'static str {
        self.storefront().accept_language
    }

    /// Whether prices on this storefront are written `1.234,56`.
    pub fn uses_comma_decimal(&self) -> bool {
        self.storefront().comma_decimal
    }

    pub fn all() -> &'static [Region] {
        &[
            Region::Us,
            Region::Uk,
            Region::De,
            Region::Fr,
            Region::Es,
            Region::It,
            Region::Ca,
            Region::Jp,
        ]
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.storefront().code)
    }
}

impl FromStr for Region {
    type Err = RegionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        match wanted.as_str() {
            "gb" | "united kingdom" => return Ok(Region::Uk),
            "usa" | "united states" => return Ok(Region::Us),
            _ => {}
        }

        Region::all()
            .iter()
            .copied()
            .find(|r| r.storefront().code == wanted || r.domain() == wanted)
            .ok_or_else(|| RegionParseError(s.to_string()))
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown region '{0}'. Valid regions: us, uk, de, fr, es, it, ca, jp")]
pub struct RegionParseError(String);
