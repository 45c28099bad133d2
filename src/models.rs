//! Shared data types.

use serde::{Deserialize, Serialize};

/// Canonical identifier of a place in the upstream catalog.
pub type PlaceId = i64;

/// Identifier of a universe (a group of places with one root place).
pub type UniverseId = i64;

/// One purchasable gamepass as scraped from a storefront fragment.
///
/// Built only by [`extract_gamepasses`](crate::parse::extract_gamepasses) and
/// never modified afterwards. Missing fields carry the documented defaults
/// (`0`, `"Unknown"`, the default icon, `""`) rather than being optional, so
/// every consumer sees the same shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamepassRecord {
    /// Gamepass id, parsed from the card link.
    pub pass_id: i64,
    /// Display name.
    pub name: String,
    /// Price in Robux, `0` when not for sale.
    pub price: i64,
    /// Always equal to `price`; the fragment carries no separate market price.
    pub expected_price: i64,
    /// Icon image URL.
    pub icon: String,
    /// Product id from the purchase button.
    pub product_id: i64,
    /// Expected seller id from the purchase button.
    pub seller_id: i64,
    /// Purchase button label, e.g. `Buy`.
    pub status: String,
}
