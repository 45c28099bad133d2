//! Error type definitions.
//!
//! This module defines the typed errors raised while starting up and while
//! talking to the upstream mirrors, plus the counter categories tracked by
//! [`ProcessingStats`](super::ProcessingStats).

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// A configuration value was rejected by validation.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Failure of a single upstream attempt.
///
/// This is what the retry loop sees; the variant decides which backoff curve
/// applies before the next attempt.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// The mirror answered 429.
    #[error("upstream rate limited the request (429)")]
    TooManyRequests,

    /// The mirror answered with a non-2xx status other than 429.
    #[error("upstream returned HTTP {0}")]
    Status(u16),

    /// The request never produced a usable response (timeout, connect, body read).
    #[error("upstream transport error: {0}")]
    Transport(#[from] ReqwestError),
}

/// Reasons a universe could not be resolved to a place.
///
/// Never surfaced to callers: the resolver logs it and reports "not found".
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The catalog request failed or its body could not be read.
    #[error("catalog request failed: {0}")]
    Request(#[from] ReqwestError),

    /// The catalog answered with a non-2xx status.
    #[error("catalog returned HTTP {0}")]
    Status(u16),

    /// The catalog body was not the expected JSON.
    #[error("catalog payload could not be parsed: {0}")]
    Payload(#[from] serde_json::Error),

    /// The catalog knows no positive root place for the universe.
    #[error("catalog listed no root place for universe {0}")]
    NoRootPlace(i64),
}

/// Types of errors that can occur while serving a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    // Per-attempt upstream failures
    /// The request timed out.
    UpstreamTimeout,
    /// The connection could not be established.
    UpstreamConnect,
    /// The mirror answered 429.
    UpstreamTooManyRequests,
    /// The mirror answered another non-2xx status.
    UpstreamStatus,
    /// The response body could not be read.
    UpstreamBody,
    /// Any other transport failure.
    UpstreamOther,
    // Whole-lookup failures
    /// No mirror produced a page, so the lookup was unavailable.
    FetchExhausted,
    /// A universe id could not be resolved to its root place.
    ResolverFailure,
}

/// Types of informational events recorded while serving lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    /// The lookup was served from the cache.
    CacheHit,
    /// The lookup had to go upstream.
    CacheMiss,
    /// A mirror answered 200 but the place lists no gamepasses
    EmptyPage,
    /// The universe fallback path was taken
    UniverseFallback,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    /// Human-readable label used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::UpstreamTimeout => "Upstream timeout",
            ErrorType::UpstreamConnect => "Upstream connect error",
            ErrorType::UpstreamTooManyRequests => "Upstream too many requests (429)",
            ErrorType::UpstreamStatus => "Upstream error status",
            ErrorType::UpstreamBody => "Upstream body read error",
            ErrorType::UpstreamOther => "Upstream other error",
            ErrorType::FetchExhausted => "All mirrors failed",
            ErrorType::ResolverFailure => "Universe resolution failed",
        }
    }
}

impl InfoType {
    /// Human-readable label used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::CacheHit => "Cache hit",
            InfoType::CacheMiss => "Cache miss",
            InfoType::EmptyPage => "Empty gamepass page",
            InfoType::UniverseFallback => "Universe fallback",
        }
    }
}
