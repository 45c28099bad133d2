//! In-memory gamepass cache.
//!
//! Maps a place id to the records of the last completed scrape. Entries expire
//! lazily: a lookup that finds an entry at or past its TTL evicts it and
//! reports a miss, so there is no background sweeper. The lock is only held
//! for the map operation itself.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;

use crate::models::{GamepassRecord, PlaceId};

/// One cached scrape result. Replaced wholesale, never edited in place.
struct CacheEntry {
    records: Arc<Vec<GamepassRecord>>,
    created_at: Instant,
    cached_at: DateTime<Utc>,
}

impl CacheEntry {
    fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }
}

/// Snapshot of one live entry, for `/cache/stats`.
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntryStats {
    /// Place the entry is stored under.
    pub place_id: PlaceId,
    /// Number of gamepass records held.
    pub records: usize,
    /// Seconds since the entry was stored.
    pub age_seconds: f64,
    /// Seconds until the entry expires.
    pub ttl_remaining_seconds: f64,
    /// Wall-clock time the entry was stored.
    pub cached_at: DateTime<Utc>,
}

/// Snapshot of the whole cache, for `/cache/stats`.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    /// Stored entries, expired ones not yet evicted included.
    pub entries: usize,
    /// Configured TTL.
    pub ttl_seconds: u64,
    /// Live entries ordered by place id.
    pub items: Vec<CacheEntryStats>,
}

/// Thread-safe place id -> records map with per-entry expiry.
pub struct GamepassCache {
    ttl: Duration,
    entries: Mutex<HashMap<PlaceId, CacheEntry>>,
}

impl GamepassCache {
    /// Creates an empty cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        GamepassCache {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    // A panic while holding the lock cannot leave a half-written entry
    // (entries are inserted whole), so a poisoned map is still usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<PlaceId, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached records if the entry is younger than the TTL.
    ///
    /// An expired entry is removed and reported as a miss.
    pub fn get(&self, place_id: PlaceId) -> Option<Arc<Vec<GamepassRecord>>> {
        let now = Instant::now();
        let mut entries = self.lock();
        let entry = entries.get(&place_id)?;
        if entry.age(now) < self.ttl {
            return Some(Arc::clone(&entry.records));
        }
        entries.remove(&place_id);
        log::debug!("Cache entry for place {} expired", place_id);
        None
    }

    /// Stores records for a place, replacing any previous entry and
    /// restarting its TTL.
    pub fn put(&self, place_id: PlaceId, records: Vec<GamepassRecord>) -> Arc<Vec<GamepassRecord>> {
        let records = Arc::new(records);
        let entry = CacheEntry {
            records: Arc::clone(&records),
            created_at: Instant::now(),
            cached_at: Utc::now(),
        };
        self.lock().insert(place_id, entry);
        records
    }

    /// Removes every entry and returns how many there were.
    pub fn clear(&self) -> usize {
        let mut entries = self.lock();
        let removed = entries.len();
        entries.clear();
        removed
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no entry is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lifetime of an entry.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Age and remaining TTL of every live entry, ordered by place id.
    ///
    /// Expired entries are left out (they would be evicted by the next `get`).
    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let mut items: Vec<CacheEntryStats> = self
            .lock()
            .iter()
            .filter(|(_, entry)| entry.age(now) < self.ttl)
            .map(|(place_id, entry)| {
                let age = entry.age(now);
                CacheEntryStats {
                    place_id: *place_id,
                    records: entry.records.len(),
                    age_seconds: age.as_secs_f64(),
                    ttl_remaining_seconds: self.ttl.saturating_sub(age).as_secs_f64(),
                    cached_at: entry.cached_at,
                }
            })
            .collect();
        items.sort_by_key(|item| item.place_id);

        CacheStats {
            entries: items.len(),
            ttl_seconds: self.ttl.as_secs(),
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pass_id: i64) -> GamepassRecord {
        GamepassRecord {
            pass_id,
            name: format!("Pass {}", pass_id),
            price: 10,
            expected_price: 10,
            icon: String::new(),
            product_id: 0,
            seller_id: 0,
            status: String::new(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hit_within_ttl() {
        let cache = GamepassCache::new(Duration::from_secs(60));
        cache.put(100, vec![record(1), record(2)]);

        tokio::time::advance(Duration::from_secs(59)).await;
        let hit = cache.get(100).expect("entry should still be live");
        assert_eq!(hit.len(), 2);
        assert_eq!(hit[0].pass_id, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_miss_at_ttl_evicts_entry() {
        let cache = GamepassCache::new(Duration::from_secs(60));
        cache.put(100, vec![record(1)]);

        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(cache.get(100).is_none());
        assert!(cache.is_empty(), "expired entry should be evicted on read");
    }

    #[tokio::test(start_paused = true)]
    async fn test_put_overwrites_and_resets_ttl() {
        let cache = GamepassCache::new(Duration::from_secs(60));
        cache.put(100, vec![record(1)]);
        tokio::time::advance(Duration::from_secs(45)).await;
        cache.put(100, vec![record(7), record(8)]);
        tokio::time::advance(Duration::from_secs(45)).await;

        let hit = cache.get(100).expect("overwrite should restart the TTL");
        assert_eq!(hit.iter().map(|r| r.pass_id).collect::<Vec<_>>(), vec![7, 8]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_result_is_cached() {
        let cache = GamepassCache::new(Duration::from_secs(60));
        cache.put(200, Vec::new());
        let hit = cache.get(200).expect("empty results are valid entries");
        assert!(hit.is_empty());
    }

    #[test]
    fn test_clear_reports_count() {
        let cache = GamepassCache::new(Duration::from_secs(60));
        cache.put(1, vec![record(1)]);
        cache.put(2, Vec::new());
        assert_eq!(cache.clear(), 2);
        assert_eq!(cache.clear(), 0);
        assert!(cache.get(1).is_none());
    }

    #[test]
    fn test_zero_ttl_never_hits() {
        let cache = GamepassCache::new(Duration::ZERO);
        cache.put(1, vec![record(1)]);
        assert!(cache.get(1).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stats_snapshot() {
        let cache = GamepassCache::new(Duration::from_secs(100));
        cache.put(20, vec![record(1)]);
        tokio::time::advance(Duration::from_secs(30)).await;
        cache.put(10, vec![record(1), record(2), record(3)]);
        tokio::time::advance(Duration::from_secs(10)).await;

        let stats = cache.stats();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.ttl_seconds, 100);
        assert_eq!(stats.items[0].place_id, 10);
        assert_eq!(stats.items[0].records, 3);
        assert_eq!(stats.items[0].age_seconds, 10.0);
        assert_eq!(stats.items[0].ttl_remaining_seconds, 90.0);
        assert_eq!(stats.items[1].place_id, 20);
        assert_eq!(stats.items[1].age_seconds, 40.0);
        assert_eq!(stats.items[1].ttl_remaining_seconds, 60.0);

        tokio::time::advance(Duration::from_secs(60)).await;
        let stats = cache.stats();
        assert_eq!(stats.entries, 1, "expired entry should not be reported");
        assert_eq!(stats.items[0].place_id, 10);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_put_and_get() {
        let cache = Arc::new(GamepassCache::new(Duration::from_secs(60)));
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move {
                    let place_id = i % 4;
                    cache.put(place_id, vec![record(i)]);
                    cache.get(place_id).map(|r| r.len())
                })
            })
            .collect();
        for handle in handles {
            let len = handle.await.expect("cache task panicked");
            // Whichever write won, a reader sees one whole entry
            assert_eq!(len, Some(1));
        }
        assert_eq!(cache.len(), 4);
    }
}
