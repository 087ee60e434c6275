//! CSS selectors for Amazon item pages.
//!
//! Update this file when Amazon changes their HTML structure.
//! Each selector lists fallbacks from most to least specific.

use scraper::Selector;
use std::sync::LazyLock;

/// Selectors for the item detail page (`/dp/{id}`).
pub mod item {
    use super::*;

    /// Item title.
    pub static TITLE: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "#productTitle, \
             #ebooksProductTitle, \
             #title span",
        )
        .unwrap()
    });

    /// Author(s) in the byline.
    pub static AUTHOR: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "#bylineInfo .author a.a-link-normal, \
             #bylineInfo .contributorNameID, \
             #bylineInfo .author a",
        )
        .unwrap()
    });

    /// Lowest price for a new copy.
    pub static NEW_PRICE: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "#newBuyBoxPrice, \
             #newOfferAccordionRow .a-price .a-offscreen, \
             #corePrice_feature_div .a-price .a-offscreen, \
             #price",
        )
        .unwrap()
    });

    /// Lowest price for a used copy.
    pub static USED_PRICE: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "#usedBuySection .offer-price, \
             #usedOfferAccordionRow .a-price .a-offscreen, \
             #used_buybox_desktop .a-price .a-offscreen, \
             #olpLinkWidget_feature_div .a-color-price",
        )
        .unwrap()
    });
}

/// Selectors for detecting error/captcha pages.
pub mod errors {
    use super::*;

    /// CAPTCHA form.
    pub static CAPTCHA: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "form[action*='validateCaptcha'], \
             img[src*='captcha']",
        )
        .unwrap()
    });

    /// Dog page (Amazon's 503 page).
    pub static DOG_PAGE: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "img[alt*='dog'], \
             .a-box-inner a[href='/ref=cs_503_link']",
        )
        .unwrap()
    });
}
