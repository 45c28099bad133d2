//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line and environment
//! parsing, plus the validation applied before any component is built.

use std::net::SocketAddr;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::*;
use crate::error_handling::InitializationError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: One JSON object per line for log shippers
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Service configuration.
///
/// Every option can be given as a flag or through its `GAMEPASS_*` environment
/// variable (a `.env` file is honoured by the binary). `Config::default()`
/// yields the same values as an empty command line, which is what tests and
/// library users start from.
///
/// # Examples
///
/// ```bash
/// # Defaults: listen on 0.0.0.0:5000, 5 minute cache
/// gamepass_proxy
///
/// # Shorter cache, gentler on the mirrors
/// GAMEPASS_CACHE_TTL_SECS=60 gamepass_proxy --rate-limit-interval-ms 1000
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "gamepass_proxy",
    about = "Serves scraped storefront gamepasses as JSON, with caching and upstream rate limiting."
)]
pub struct Config {
    /// Address the HTTP server listens on
    #[arg(long, env = "GAMEPASS_BIND", default_value = DEFAULT_BIND_ADDR)]
    pub bind: SocketAddr,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, env = "GAMEPASS_LOG_LEVEL", value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, env = "GAMEPASS_LOG_FORMAT", value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// How long a scraped result is served from memory, in seconds
    #[arg(long, env = "GAMEPASS_CACHE_TTL_SECS", default_value_t = DEFAULT_CACHE_TTL_SECS)]
    pub cache_ttl_secs: u64,

    /// Attempts per mirror (initial attempt included)
    #[arg(long, env = "GAMEPASS_MAX_RETRIES", default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,

    /// Base delay for retry backoff, in milliseconds
    ///
    /// 429 responses wait `base * 2^attempt`, transport failures and other
    /// statuses wait `base * (attempt + 1)`.
    #[arg(long, env = "GAMEPASS_RETRY_BASE_DELAY_MS", default_value_t = DEFAULT_RETRY_BASE_DELAY_MS)]
    pub retry_base_delay_ms: u64,

    /// Minimum spacing between outbound upstream requests, in milliseconds (0 disables)
    #[arg(long, env = "GAMEPASS_RATE_LIMIT_INTERVAL_MS", default_value_t = DEFAULT_RATE_LIMIT_INTERVAL_MS)]
    pub rate_limit_interval_ms: u64,

    /// Per-request upstream timeout in seconds
    #[arg(long, env = "GAMEPASS_TIMEOUT_SECONDS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// HTTP User-Agent header sent upstream
    #[arg(long, env = "GAMEPASS_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Fragment mirror URL template, tried in the given order.
    /// Must contain `{place_id}`. Repeat the flag or pass a comma separated list.
    #[arg(
        long = "mirror",
        env = "GAMEPASS_MIRRORS",
        value_delimiter = ',',
        default_values_t = DEFAULT_MIRRORS.iter().map(|m| m.to_string()).collect::<Vec<_>>()
    )]
    pub mirrors: Vec<String>,

    /// Base URL of the catalog API used to resolve universe ids
    #[arg(long, env = "GAMEPASS_CATALOG_BASE_URL", default_value = DEFAULT_CATALOG_BASE_URL)]
    pub catalog_base_url: String,

    /// Number of universe -> place mappings remembered
    #[arg(long, env = "GAMEPASS_RESOLVER_CAPACITY", default_value_t = DEFAULT_RESOLVER_CAPACITY)]
    pub resolver_capacity: usize,

    /// URL pinged periodically to keep a sleeping host awake (disabled when unset)
    #[arg(long, env = "GAMEPASS_KEEPALIVE_URL")]
    pub keepalive_url: Option<String>,

    /// Keep-alive ping interval in seconds
    #[arg(long, env = "GAMEPASS_KEEPALIVE_INTERVAL_SECS", default_value_t = DEFAULT_KEEPALIVE_INTERVAL_SECS)]
    pub keepalive_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 5000))),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            rate_limit_interval_ms: DEFAULT_RATE_LIMIT_INTERVAL_MS,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            mirrors: DEFAULT_MIRRORS.iter().map(|m| m.to_string()).collect(),
            catalog_base_url: DEFAULT_CATALOG_BASE_URL.to_string(),
            resolver_capacity: DEFAULT_RESOLVER_CAPACITY,
            keepalive_url: None,
            keepalive_interval_secs: DEFAULT_KEEPALIVE_INTERVAL_SECS,
        }
    }
}

impl Config {
    /// `cache_ttl_secs` as a `Duration`.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// `timeout_seconds` as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// `retry_base_delay_ms` as a `Duration`.
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    /// `rate_limit_interval_ms` as a `Duration`.
    pub fn rate_limit_interval(&self) -> Duration {
        Duration::from_millis(self.rate_limit_interval_ms)
    }

    /// `keepalive_interval_secs` as a `Duration`.
    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_secs(self.keepalive_interval_secs)
    }

    /// Checks the values clap cannot check on its own.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::ConfigError` describing the first invalid
    /// option found.
    pub fn validate(&self) -> Result<(), InitializationError> {
        if self.max_retries == 0 {
            return Err(InitializationError::ConfigError(
                "max_retries must be at least 1".into(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(InitializationError::ConfigError(
                "timeout_seconds must be at least 1".into(),
            ));
        }
        if self.resolver_capacity == 0 {
            return Err(InitializationError::ConfigError(
                "resolver_capacity must be at least 1".into(),
            ));
        }
        if self.mirrors.is_empty() {
            return Err(InitializationError::ConfigError(
                "at least one mirror is required".into(),
            ));
        }
        for mirror in &self.mirrors {
            if !mirror.contains(PLACE_ID_PLACEHOLDER) {
                return Err(InitializationError::ConfigError(format!(
                    "mirror '{}' has no {} placeholder",
                    mirror, PLACE_ID_PLACEHOLDER
                )));
            }
            let sample = mirror.replace(PLACE_ID_PLACEHOLDER, "1");
            url::Url::parse(&sample).map_err(|e| {
                InitializationError::ConfigError(format!("invalid mirror '{}': {}", mirror, e))
            })?;
        }
        url::Url::parse(&self.catalog_base_url).map_err(|e| {
            InitializationError::ConfigError(format!(
                "invalid catalog base URL '{}': {}",
                self.catalog_base_url, e
            ))
        })?;
        if let Some(keepalive) = &self.keepalive_url {
            url::Url::parse(keepalive).map_err(|e| {
                InitializationError::ConfigError(format!(
                    "invalid keep-alive URL '{}': {}",
                    keepalive, e
                ))
            })?;
            if self.keepalive_interval_secs == 0 {
                return Err(InitializationError::ConfigError(
                    "keepalive_interval_secs must be at least 1 when a keep-alive URL is set"
                        .into(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.request_timeout(), Duration::from_secs(8));
        assert_eq!(config.retry_base_delay(), Duration::from_millis(500));
        assert_eq!(config.rate_limit_interval(), Duration::from_millis(250));
        assert_eq!(config.resolver_capacity, 1000);
        assert_eq!(config.mirrors.len(), 3);
        assert!(config.keepalive_url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_parse_matches_default() {
        // An empty command line must produce the same values as Default
        let parsed = Config::try_parse_from(["gamepass_proxy"]).expect("empty args should parse");
        let default = Config::default();
        assert_eq!(parsed.bind, default.bind);
        assert_eq!(parsed.cache_ttl_secs, default.cache_ttl_secs);
        assert_eq!(parsed.mirrors, default.mirrors);
        assert_eq!(parsed.user_agent, default.user_agent);
    }

    #[test]
    fn test_config_parse_mirror_list() {
        let parsed = Config::try_parse_from([
            "gamepass_proxy",
            "--mirror",
            "http://a.test/p?id={place_id},http://b.test/p?id={place_id}",
        ])
        .expect("mirror list should parse");
        assert_eq!(
            parsed.mirrors,
            vec![
                "http://a.test/p?id={place_id}".to_string(),
                "http://b.test/p?id={place_id}".to_string()
            ]
        );
    }

    #[test]
    fn test_validate_rejects_zero_retries() {
        let config = Config {
            max_retries: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(InitializationError::ConfigError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_mirror_without_placeholder() {
        let config = Config {
            mirrors: vec!["https://example.com/fragment".into()],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("placeholder"));
    }

    #[test]
    fn test_validate_rejects_bad_catalog_url() {
        let config = Config {
            catalog_base_url: "not a url".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_keepalive_interval() {
        let config = Config {
            keepalive_url: Some("https://example.com/ping".into()),
            keepalive_interval_secs: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(InitializationError::ConfigError(_))
        ));

        // Without a URL the interval is never used
        let idle = Config {
            keepalive_interval_secs: 0,
            ..Default::default()
        };
        assert!(idle.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_mirrors() {
        let config = Config {
            mirrors: Vec::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
