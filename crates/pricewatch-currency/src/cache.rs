//! Owned TTL cache for exchange rates.
//!
//! One instance lives inside the converter; nothing else mutates it.
//! Eviction is explicit: entries expire after the TTL, and when the size
//! cap is reached the oldest entry is dropped.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tokio::time::{Duration, Instant};

/// `(from, to, day)` — `None` day means "latest".
pub type RateKey = (String, String, Option<NaiveDate>);

#[derive(Debug, Clone, Copy)]
struct CachedRate {
    rate: Decimal,
    inserted_at: Instant,
}

#[derive(Debug)]
pub struct RateCache {
    entries: HashMap<RateKey, CachedRate>,
    ttl: Duration,
    max_entries: usize,
}

impl RateCache {
    /// Default TTL: rates refresh daily, so cached values older than a day
    /// must be re-read.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);
    pub const DEFAULT_MAX_ENTRIES: usize = 512;

    #[must_use]
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// The rate for the key if present and not expired. Expired entries
    /// are removed on access.
    pub fn get(&mut self, key: &RateKey) -> Option<Decimal> {
        let entry = *self.entries.get(key)?;
        if entry.inserted_at.elapsed() >= self.ttl {
            self.entries.remove(key);
            return None;
        }
        Some(entry.rate)
    }

    pub fn insert(&mut self, key: RateKey, rate: Decimal) {
        if self.entries.len() >= self.max_entries && !self.entries.contains_key(&key) {
            self.evict_one();
        }
        self.entries.insert(
            key,
            CachedRate {
                rate,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drops every cached rate; called after a rate-update batch so stale
    /// values cannot outlive fresher store records.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes expired entries first; if none were expired, removes the
    /// oldest entry.
    fn evict_one(&mut self) {
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, v| v.inserted_at.elapsed() < ttl);
        if self.entries.len() < before {
            return;
        }

        if let Some(oldest_key) = self
            .entries
            .iter()
            .min_by_key(|(_, v)| v.inserted_at)
            .map(|(k, _)| k.clone())
        {
            self.entries.remove(&oldest_key);
        }
    }
}

impl Default for RateCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TTL, Self::DEFAULT_MAX_ENTRIES)
    }
}
