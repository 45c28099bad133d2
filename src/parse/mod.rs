//! HTML parsing.
//!
//! This module turns upstream storefront fragments into records. It does no
//! I/O and keeps no state, so it can be called from any task.

mod gamepass;

pub use gamepass::extract_gamepasses;
