//! Local cache: time-bounded memoization of the full entry set.
//!
//! The entries and their fetch time are written together as one record under
//! one key, so a reader never sees fresh entries paired with a stale
//! timestamp (or the reverse). Only whole sets are cached; a refresh replaces
//! the record wholesale.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::entry::LedgerEntry;
use crate::store::KeyValueStore;

pub const CACHE_KEY: &str = "debt_cache";

/// Default freshness window (5 minutes)
pub const DEFAULT_TTL_SECS: i64 = 300;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheRecord {
    pub entries: Vec<LedgerEntry>,
    pub fetched_at: DateTime<Utc>,
}

impl CacheRecord {
    /// Fresh means fetched less than `ttl` ago. A fetch time in the future
    /// (clock moved backwards, or a hand-edited record) counts as expired.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.fetched_at <= now && now - self.fetched_at < ttl
    }
}

#[derive(Debug, Clone)]
pub struct LedgerCache<S: KeyValueStore> {
    store: S,
    ttl: Duration,
}

impl<S: KeyValueStore> LedgerCache<S> {
    pub fn new(store: S, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn with_default_ttl(store: S) -> Self {
        Self::new(store, Duration::seconds(DEFAULT_TTL_SECS))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached entries if they were fetched less than one TTL ago, else `None`.
    pub fn load(&self, now: DateTime<Utc>) -> Option<Vec<LedgerEntry>> {
        let record = self.peek()?;
        if record.is_fresh(now, self.ttl) {
            debug!(entries = record.entries.len(), fetched_at = %record.fetched_at, "cache hit");
            Some(record.entries)
        } else {
            debug!(fetched_at = %record.fetched_at, "cache expired");
            None
        }
    }

    /// Last stored record regardless of age.
    ///
    /// Unreadable or corrupt state counts as absent.
    pub fn peek(&self) -> Option<CacheRecord> {
        let raw = match self.store.get(CACHE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("reading cached entries failed: {e:#}");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("discarding corrupt cache record: {e}");
                None
            }
        }
    }

    /// Replace the cached set with `entries`, stamped with `now`.
    pub fn store(&self, entries: &[LedgerEntry], now: DateTime<Utc>) {
        let record = CacheRecord {
            entries: entries.to_vec(),
            fetched_at: now,
        };
        let json = match serde_json::to_string(&record) {
            Ok(json) => json,
            Err(e) => {
                warn!("serializing cache record failed: {e}");
                return;
            }
        };
        if let Err(e) = self.store.set(CACHE_KEY, &json) {
            warn!("writing cache record failed: {e:#}");
        }
    }

    /// Drop the cached set so the next `load` misses.
    pub fn invalidate(&self) {
        if let Err(e) = self.store.clear(CACHE_KEY) {
            warn!("clearing cache record failed: {e:#}");
        }
    }
}
