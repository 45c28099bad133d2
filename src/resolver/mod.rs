//! Universe to root place resolution.
//!
//! A universe groups several places under one root place. When a place lists
//! no gamepasses (or cannot be fetched), the caller may supply the universe id
//! and the passes are looked up on the universe's root place instead.
//!
//! The mapping is effectively static, so successful lookups are memoized in a
//! bounded LRU. Failures are not memoized: a later call retries upstream.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};

use lru::LruCache;
use serde::Deserialize;

use crate::error_handling::{ErrorType, ProcessingStats, ResolveError};
use crate::initialization::RateLimiter;
use crate::models::{PlaceId, UniverseId};

/// `GET /v1/games?universeIds=N` response body.
#[derive(Debug, Deserialize)]
struct GamesResponse {
    #[serde(default)]
    data: Vec<GameEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GameEntry {
    root_place_id: Option<i64>,
}

/// Resolves universe ids to their root place id through the catalog API.
pub struct UniverseResolver {
    client: Arc<reqwest::Client>,
    limiter: Arc<RateLimiter>,
    catalog_base_url: String,
    memo: Mutex<LruCache<UniverseId, PlaceId>>,
    stats: Arc<ProcessingStats>,
}

impl UniverseResolver {
    /// Creates a resolver remembering up to `capacity` mappings (at least one).
    pub fn new(
        client: Arc<reqwest::Client>,
        limiter: Arc<RateLimiter>,
        catalog_base_url: &str,
        capacity: usize,
        stats: Arc<ProcessingStats>,
    ) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        UniverseResolver {
            client,
            limiter,
            catalog_base_url: catalog_base_url.trim_end_matches('/').to_string(),
            memo: Mutex::new(LruCache::new(capacity)),
            stats,
        }
    }

    /// Returns the root place of a universe, or `None` when it cannot be
    /// determined right now.
    pub async fn resolve(&self, universe_id: UniverseId) -> Option<PlaceId> {
        if let Some(place_id) = self.cached(universe_id) {
            log::debug!("Universe {} -> place {} (memoized)", universe_id, place_id);
            return Some(place_id);
        }

        match self.lookup(universe_id).await {
            Ok(place_id) => {
                log::debug!("Universe {} -> place {}", universe_id, place_id);
                self.memo
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .put(universe_id, place_id);
                Some(place_id)
            }
            Err(e) => {
                self.stats.increment_error(ErrorType::ResolverFailure);
                log::warn!("Could not resolve universe {}: {}", universe_id, e);
                None
            }
        }
    }

    /// Number of memoized mappings.
    pub fn len(&self) -> usize {
        self.memo.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing has been memoized yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cached(&self, universe_id: UniverseId) -> Option<PlaceId> {
        self.memo
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&universe_id)
            .copied()
    }

    async fn lookup(&self, universe_id: UniverseId) -> Result<PlaceId, ResolveError> {
        self.limiter.acquire().await;

        let url = format!("{}/v1/games", self.catalog_base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("universeIds", universe_id)])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let games: GamesResponse = serde_json::from_str(&body)?;
        games
            .data
            .first()
            .and_then(|game| game.root_place_id)
            .filter(|place_id| *place_id > 0)
            .ok_or(ResolveError::NoRootPlace(universe_id))
    }
}
