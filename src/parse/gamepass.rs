//! Gamepass card extraction.
//!
//! Turns the storefront fragment (one `<li class="list-item real-game-pass">`
//! per gamepass) into [`GamepassRecord`]s. Every field has an explicit default,
//! so a card with missing or odd markup still yields a record and the output
//! keeps the order of the cards in the fragment.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::config::{DEFAULT_ICON_URL, UNKNOWN_NAME};
use crate::models::GamepassRecord;
use crate::utils::parse_selector_with_fallback;

static ITEM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("li.real-game-pass", "gamepass card"));

static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("a[href]", "gamepass link"));

static NAME_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback(".store-card-name", "gamepass name"));

static PRICE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    parse_selector_with_fallback(".store-card-price .text-robux", "gamepass price")
});

static IMAGE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("img[src]", "gamepass icon"));

static PURCHASE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    parse_selector_with_fallback(".PurchaseButton, .btn-buy-md", "purchase button")
});

static FOOTER_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback(".store-card-footer", "gamepass status"));

static PASS_ID_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"/game-pass/(\d+)")
        .map_err(|e| log::error!("Failed to compile pass id pattern: {}", e))
        .ok()
});

static DIGITS_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\d+")
        .map_err(|e| log::error!("Failed to compile digits pattern: {}", e))
        .ok()
});

/// Extracts every gamepass card from a storefront fragment.
///
/// Pure and deterministic: the same input always yields the same records,
/// and malformed markup never fails (see the module docs for defaults).
pub fn extract_gamepasses(html: &str) -> Vec<GamepassRecord> {
    let document = Html::parse_fragment(html);
    let records: Vec<GamepassRecord> = document
        .select(&ITEM_SELECTOR)
        .map(|card| extract_card(&card))
        .collect();
    log::debug!("Extracted {} gamepass cards", records.len());
    records
}

fn extract_card(card: &ElementRef<'_>) -> GamepassRecord {
    let purchase_button = card.select(&PURCHASE_SELECTOR).next();
    let button_attr = |name: &str| purchase_button.and_then(|b| b.value().attr(name));

    let price = card
        .select(&PRICE_SELECTOR)
        .next()
        .and_then(|span| parse_price(&element_text(&span)))
        .or_else(|| button_attr("data-expected-price").and_then(parse_price))
        .unwrap_or(0);

    GamepassRecord {
        pass_id: extract_pass_id(card).unwrap_or(0),
        name: extract_name(card).unwrap_or_else(|| UNKNOWN_NAME.to_string()),
        price,
        expected_price: price,
        icon: card
            .select(&IMAGE_SELECTOR)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(str::trim)
            .filter(|src| !src.is_empty())
            .map_or_else(|| DEFAULT_ICON_URL.to_string(), str::to_string),
        product_id: button_attr("data-product-id")
            .and_then(parse_id)
            .unwrap_or(0),
        seller_id: button_attr("data-expected-seller-id")
            .and_then(parse_id)
            .unwrap_or(0),
        status: card
            .select(&FOOTER_SELECTOR)
            .next()
            .map(|footer| element_text(&footer))
            .unwrap_or_default(),
    }
}

fn extract_pass_id(card: &ElementRef<'_>) -> Option<i64> {
    let pattern = PASS_ID_RE.as_ref()?;
    card.select(&LINK_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .find_map(|href| pattern.captures(href))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Prefers the `title` attribute, which holds the untruncated name.
fn extract_name(card: &ElementRef<'_>) -> Option<String> {
    let element = card.select(&NAME_SELECTOR).next()?;
    element
        .value()
        .attr("title")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| Some(element_text(&element)).filter(|t| !t.is_empty()))
}

/// Joins the trimmed text nodes of an element with single spaces.
fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reads a price such as `"1,250"` or `"R$ 75"`.
fn parse_price(text: &str) -> Option<i64> {
    let cleaned = text.trim().replace(',', "");
    if let Ok(value) = cleaned.parse::<i64>() {
        return (value >= 0).then_some(value);
    }
    DIGITS_RE
        .as_ref()?
        .find(&cleaned)
        .and_then(|m| m.as_str().parse().ok())
}

fn parse_id(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok().filter(|id| *id >= 0)
}
