//! CSS selector parsing utilities.

use scraper::Selector;

/// Selector that is valid but can never match an element.
const MATCH_NOTHING: &str = "*:not(*)";

/// Parses a CSS selector, falling back to one that matches nothing.
///
/// Selectors are static strings, so a parse failure is a programming error;
/// it is logged and the affected field simply degrades to its default
/// instead of taking the request down.
///
/// # Arguments
///
/// * `selector_str` - The CSS selector string to parse
/// * `context` - What the selector is for, used in the error log
pub fn parse_selector_with_fallback(selector_str: &str, context: &str) -> Selector {
    match Selector::parse(selector_str) {
        Ok(selector) => selector,
        Err(e) => {
            log::error!(
                "Failed to parse CSS selector '{}' for {}: {}. Matching nothing instead.",
                selector_str,
                context,
                e
            );
            match Selector::parse(MATCH_NOTHING) {
                Ok(selector) => selector,
                Err(_) => unreachable!("'{}' is a valid selector", MATCH_NOTHING),
            }
        }
    }
}
