//! Small helpers shared across modules.
//!
//! - CSS selector parsing with a safe fallback

mod selector;

pub use selector::parse_selector_with_fallback;
