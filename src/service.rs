//! Lookup orchestration.
//!
//! [`GamepassService`] ties the cache, the fragment fetcher, the universe
//! resolver and the extractor together:
//!
//! 1. A fresh cache entry is returned as is.
//! 2. Otherwise the place is fetched. A page listing gamepasses is extracted,
//!    cached and returned.
//! 3. If that page was empty or could not be fetched and a universe id was
//!    given, the universe's root place is fetched instead. Its records are
//!    cached under the requested place id.
//! 4. A lookup that obtained a page on some path is cached, even when empty.
//!    A lookup that obtained no page at all is reported as
//!    [`LookupStatus::UpstreamUnavailable`] and never cached, so the next
//!    request tries upstream again.

use std::sync::Arc;

use crate::cache::GamepassCache;
use crate::config::Config;
use crate::error_handling::{ErrorType, InfoType, ProcessingStats};
use crate::fetch::{FetchOutcome, FetchResult, Fetcher, RetryPolicy};
use crate::initialization::{init_rate_limiter, RateLimiter};
use crate::models::{GamepassRecord, PlaceId, UniverseId};
use crate::parse::extract_gamepasses;
use crate::resolver::UniverseResolver;

/// How a lookup was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStatus {
    /// Served from the cache without touching upstream.
    Cached,
    /// Fetched for the requested place (possibly an empty list).
    Fetched,
    /// Fetched for the root place of the supplied universe.
    FetchedViaUniverse {
        /// Root place the records were scraped from
        resolved: PlaceId,
    },
    /// No page could be obtained on any path. Not cached.
    UpstreamUnavailable,
}

/// Records returned for a place together with how they were obtained.
#[derive(Debug, Clone)]
pub struct Lookup {
    /// Gamepasses in storefront order
    pub records: Arc<Vec<GamepassRecord>>,
    /// Path the lookup took
    pub status: LookupStatus,
}

impl Lookup {
    fn unavailable() -> Self {
        Lookup {
            records: Arc::new(Vec::new()),
            status: LookupStatus::UpstreamUnavailable,
        }
    }

    /// Whether the lookup failed to reach upstream on every path.
    pub fn is_unavailable(&self) -> bool {
        self.status == LookupStatus::UpstreamUnavailable
    }
}

/// The gamepass lookup pipeline.
pub struct GamepassService {
    cache: GamepassCache,
    fetcher: Fetcher,
    resolver: UniverseResolver,
    stats: Arc<ProcessingStats>,
}

impl GamepassService {
    /// Assembles a service from already built parts.
    pub fn new(
        cache: GamepassCache,
        fetcher: Fetcher,
        resolver: UniverseResolver,
        stats: Arc<ProcessingStats>,
    ) -> Self {
        GamepassService {
            cache,
            fetcher,
            resolver,
            stats,
        }
    }

    /// Builds the whole pipeline from configuration.
    ///
    /// The fetcher and the resolver share one rate limiter, so the configured
    /// spacing holds for all upstream traffic together.
    pub fn from_config(
        config: &Config,
        client: Arc<reqwest::Client>,
        stats: Arc<ProcessingStats>,
    ) -> Self {
        let limiter: Arc<RateLimiter> = init_rate_limiter(config.rate_limit_interval());
        let fetcher = Fetcher::new(
            Arc::clone(&client),
            Arc::clone(&limiter),
            config.mirrors.clone(),
            RetryPolicy::new(config.max_retries, config.retry_base_delay()),
            Arc::clone(&stats),
        );
        let resolver = UniverseResolver::new(
            client,
            limiter,
            &config.catalog_base_url,
            config.resolver_capacity,
            Arc::clone(&stats),
        );
        Self::new(GamepassCache::new(config.cache_ttl()), fetcher, resolver, stats)
    }

    /// The result cache, for the stats and clear endpoints.
    pub fn cache(&self) -> &GamepassCache {
        &self.cache
    }

    /// Shared lookup counters.
    pub fn stats(&self) -> &Arc<ProcessingStats> {
        &self.stats
    }

    /// Returns the gamepasses of a place.
    ///
    /// Never fails: upstream problems degrade to an empty list with
    /// [`LookupStatus::UpstreamUnavailable`]. An uncached lookup runs in its
    /// own task, so it finishes (and fills the cache) even if the caller
    /// stops waiting for it.
    pub async fn get_gamepasses(
        self: &Arc<Self>,
        place_id: PlaceId,
        universe_id: Option<UniverseId>,
    ) -> Lookup {
        self.stats.increment_lookups();

        if let Some(records) = self.cache.get(place_id) {
            self.stats.increment_info(InfoType::CacheHit);
            log::debug!("Cache hit for place {} ({} records)", place_id, records.len());
            return Lookup {
                records,
                status: LookupStatus::Cached,
            };
        }
        self.stats.increment_info(InfoType::CacheMiss);

        let service = Arc::clone(self);
        let task = tokio::spawn(async move { service.lookup_uncached(place_id, universe_id).await });
        match task.await {
            Ok(lookup) => lookup,
            Err(e) => {
                log::error!("Lookup task for place {} failed: {}", place_id, e);
                Lookup::unavailable()
            }
        }
    }

    async fn lookup_uncached(&self, place_id: PlaceId, universe_id: Option<UniverseId>) -> Lookup {
        let primary = self.fetcher.fetch(place_id).await;
        let primary_records = primary.outcome.html().map(extract_gamepasses);

        if let Some(records) = primary_records.as_ref().filter(|r| !r.is_empty()) {
            log::debug!("Place {}: {} gamepasses", place_id, records.len());
            return self.store(place_id, records.clone(), LookupStatus::Fetched);
        }

        // The primary page was empty or missing from here on
        let Some(universe_id) = universe_id else {
            return self.settle(place_id, primary_records, &primary);
        };

        self.stats.increment_info(InfoType::UniverseFallback);
        let Some(resolved) = self.resolver.resolve(universe_id).await else {
            return self.settle(place_id, primary_records, &primary);
        };

        if resolved == place_id && primary.outcome.is_completed() {
            log::debug!(
                "Universe {} resolves to place {} itself, keeping its empty page",
                universe_id,
                place_id
            );
            return self.settle(place_id, primary_records, &primary);
        }

        log::info!(
            "Place {} empty or unreachable, trying root place {} of universe {}",
            place_id,
            resolved,
            universe_id
        );
        let secondary = self.fetcher.fetch(resolved).await;
        match secondary.outcome.html() {
            Some(html) => {
                let records = extract_gamepasses(html);
                self.store(place_id, records, LookupStatus::FetchedViaUniverse { resolved })
            }
            None => {
                log::warn!(
                    "Root place {} of universe {} unreachable after {} attempts ({})",
                    resolved,
                    universe_id,
                    secondary.attempts,
                    describe(&secondary.outcome)
                );
                self.settle(place_id, primary_records, &primary)
            }
        }
    }

    /// Final step when no better page is available: cache the primary page's
    /// (empty) records if it was obtained, otherwise report unavailability.
    fn settle(
        &self,
        place_id: PlaceId,
        primary_records: Option<Vec<GamepassRecord>>,
        primary: &FetchResult,
    ) -> Lookup {
        match primary_records {
            Some(records) => self.store(place_id, records, LookupStatus::Fetched),
            None => {
                self.stats.increment_error(ErrorType::FetchExhausted);
                log::warn!(
                    "No page obtained for place {} after {} attempts ({}), not caching",
                    place_id,
                    primary.attempts,
                    describe(&primary.outcome)
                );
                Lookup::unavailable()
            }
        }
    }

    fn store(&self, place_id: PlaceId, records: Vec<GamepassRecord>, status: LookupStatus) -> Lookup {
        let records = self.cache.put(place_id, records);
        Lookup { records, status }
    }
}

fn describe(outcome: &FetchOutcome) -> String {
    match outcome {
        FetchOutcome::Success(_) => "success".to_string(),
        FetchOutcome::EmptyButValid(_) => "empty page".to_string(),
        FetchOutcome::TransientFailure { status } => format!("last status {}", status),
        FetchOutcome::PermanentFailure => "rate limited or unreachable".to_string(),
    }
}
