//! Caching subsystem.
//!
//! Two small, single-owner structures, both held behind the controller's
//! mutex and never locked across an await point:
//!
//! - [`SnapshotCache`]: per-date availability snapshots with an explicit
//!   `fetched_at` stamp and expiry-check-on-read. A plain map rather than a
//!   TTL-managed store: the optimistic-cancellation path overwrites a
//!   snapshot *without* re-stamping it, and expiry must stay a pure function
//!   of the recorded stamp.
//!
//! - [`PendingRanges`]: the set of range fetches currently in flight,
//!   keyed by `(start, days)`. Membership is transient: inserted before a
//!   request is issued, removed unconditionally when it completes.
//!
//! Timestamps use `tokio::time::Instant` so expiry is controllable from
//! tests with a paused clock.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use tokio::time::Instant;

use crate::telemetry;
use crate::types::{AvailabilitySnapshot, DateKey, RangeKey};

/// How long a snapshot may serve reads after it was fetched.
pub const DEFAULT_SNAPSHOT_TTL: Duration = Duration::from_secs(300);

/// A cached snapshot plus the moment it was stored.
#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub snapshot: AvailabilitySnapshot,
    pub fetched_at: Instant,
}

impl CacheEntry {
    /// An entry is expired iff strictly more than the TTL has elapsed.
    fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.duration_since(self.fetched_at) > ttl
    }
}

/// Per-date store of availability snapshots with lazy expiry.
///
/// Unbounded for the process lifetime; cleared wholesale on logout or
/// memory pressure via [`clear`](Self::clear). Lookups are by exact
/// [`DateKey`]; there is no ordering invariant among entries.
pub struct SnapshotCache {
    entries: HashMap<DateKey, CacheEntry>,
    ttl: Duration,
}

impl SnapshotCache {
    /// Create an empty cache with the given entry TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    /// Look up the snapshot for a date.
    ///
    /// Returns `None` on miss. An expired entry is evicted on the spot and
    /// reported as a miss; expired data is never returned. Emits cache
    /// hit/miss metrics.
    pub fn get(&mut self, date: DateKey) -> Option<&AvailabilitySnapshot> {
        let now = Instant::now();
        let expired = self
            .entries
            .get(&date)
            .is_some_and(|entry| entry.is_expired(self.ttl, now));
        if expired {
            self.entries.remove(&date);
        }
        match self.entries.get(&date) {
            Some(entry) => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
                Some(&entry.snapshot)
            }
            None => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                None
            }
        }
    }

    /// Whether a usable (present and unexpired) entry exists for a date.
    ///
    /// Drives the prefetch trigger. Does not evict and does not count as a
    /// read for metrics.
    pub fn contains_usable(&self, date: DateKey) -> bool {
        self.entries
            .get(&date)
            .is_some_and(|e| !e.is_expired(self.ttl, Instant::now()))
    }

    /// Store a freshly fetched snapshot, stamped now.
    ///
    /// Overwrites any previous entry for the date: last completed fetch
    /// wins, with no freshness comparison between single-day and
    /// range-sourced data.
    pub fn insert(&mut self, date: DateKey, snapshot: AvailabilitySnapshot) {
        self.entries.insert(
            date,
            CacheEntry {
                snapshot,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Overwrite the snapshot for a date while keeping its original stamp.
    ///
    /// The optimistic-update write: a local mutation, not a fresh fetch, so
    /// the entry must not gain lifetime. Inserts with the current time if no
    /// entry exists.
    pub fn patch(&mut self, date: DateKey, snapshot: AvailabilitySnapshot) {
        match self.entries.get_mut(&date) {
            Some(entry) => entry.snapshot = snapshot,
            None => self.insert(date, snapshot),
        }
    }

    /// Clone the raw entry for a date, expired or not.
    ///
    /// Rollback capture for the optimistic path; bypasses expiry and
    /// metrics.
    pub fn entry(&self, date: DateKey) -> Option<CacheEntry> {
        self.entries.get(&date).cloned()
    }

    /// Put back a previously captured entry, or remove the slot if there
    /// was none to restore.
    pub fn restore(&mut self, date: DateKey, entry: Option<CacheEntry>) {
        match entry {
            Some(entry) => {
                self.entries.insert(date, entry);
            }
            None => {
                self.entries.remove(&date);
            }
        }
    }

    /// Drop the entry for a date.
    pub fn remove(&mut self, date: DateKey) -> Option<CacheEntry> {
        self.entries.remove(&date)
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of entries currently stored, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Set of range fetches currently in flight.
#[derive(Debug, Default)]
pub struct PendingRanges {
    in_flight: HashSet<RangeKey>,
}

impl PendingRanges {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a range for fetching.
    ///
    /// Returns `false` if a fetch with the identical key is already
    /// pending; the caller must then skip issuing a duplicate request.
    pub fn try_begin(&mut self, key: RangeKey) -> bool {
        self.in_flight.insert(key)
    }

    /// Release a range after its fetch completed, successfully or not.
    pub fn finish(&mut self, key: &RangeKey) {
        self.in_flight.remove(key);
    }

    /// Whether a fetch for this exact key is in flight.
    pub fn is_pending(&self, key: &RangeKey) -> bool {
        self.in_flight.contains(key)
    }
}
