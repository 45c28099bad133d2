//! Configuration constants.
//!
//! This module defines the defaults used by [`Config`](super::Config) and the
//! fixed values the scraper depends on (upstream URL shapes, markers, limits).

use std::time::Duration;

/// Default listen address for the HTTP server
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

/// Default cache time-to-live in seconds
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Per-request upstream timeout in seconds
/// Mirrors slower than this are usually overloaded; the next mirror gets a turn.
pub const DEFAULT_TIMEOUT_SECS: u64 = 8;

// Retry strategy
/// Maximum number of attempts per mirror (including the initial attempt)
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Base delay in milliseconds used by both backoff curves
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 500;

/// Minimum spacing between two outbound upstream requests, in milliseconds
pub const DEFAULT_RATE_LIMIT_INTERVAL_MS: u64 = 250;

/// Number of universe -> place mappings kept in memory
pub const DEFAULT_RESOLVER_CAPACITY: usize = 1000;

/// Keep-alive ping interval in seconds (only used when a keep-alive URL is set)
pub const DEFAULT_KEEPALIVE_INTERVAL_SECS: u64 = 600;

/// Default User-Agent string for upstream requests.
///
/// Mirrors sit behind bot protection that rejects obviously non-browser
/// clients, so we present a Chrome-like identity.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Placeholder substituted with the place id in mirror URL templates
pub const PLACE_ID_PLACEHOLDER: &str = "{place_id}";

/// Fragment mirrors, tried in order.
pub const DEFAULT_MIRRORS: &[&str] = &[
    "https://www.roproxy.com/games/getgamepassesinnerpartial?startIndex=0&maxRows=50&placeId={place_id}",
    "https://roblox.com.proxy.robloxapi.dev/games/getgamepassesinnerpartial?startIndex=0&maxRows=50&placeId={place_id}",
    "https://games.roproxy.com/games/getgamepassesinnerpartial?startIndex=0&maxRows=50&placeId={place_id}",
];

/// Base URL of the JSON catalog used to resolve universes to root places
pub const DEFAULT_CATALOG_BASE_URL: &str = "https://games.roproxy.com";

/// Marker present in a fragment that actually lists gamepasses
pub const GAMEPASS_MARKER: &str = "real-game-pass";

/// Icon used when a gamepass card carries no image
pub const DEFAULT_ICON_URL: &str = "https://tr.rbxcdn.com/default-gamepass-icon/150/150/Image/Png";

/// Name used when a gamepass card carries no readable name
pub const UNKNOWN_NAME: &str = "Unknown";

// Status server timing
/// Interval between periodic summary log lines in seconds
pub const SUMMARY_LOGGING_INTERVAL: Duration = Duration::from_secs(60);

// HTTP status codes (for clarity and consistency)
/// Status a mirror uses to signal rate limiting
pub const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;
