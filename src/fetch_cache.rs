//! TTL-bounded key/value cache for registry fetch results.
//!
//! Key properties:
//! - One entry per key; `set` overwrites (last write wins)
//! - A read is valid only while `now < expires_at`; an expired entry is
//!   dropped by the read that finds it
//! - Expired entries are swept in bulk at most once per sweep interval,
//!   piggybacked on `get` rather than driven by a timer
//! - A miss is a normal return value, never an error

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

/// Minimum spacing between two bulk sweeps.
pub const SWEEP_INTERVAL_SECS: i64 = 60;

// ═══════════════════════════════════════════════════════════
// CacheEntry
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    pub key: String,
    pub value: V,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

// ═══════════════════════════════════════════════════════════
// TtlCache
// ═══════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct TtlCache<V> {
    entries: HashMap<String, CacheEntry<V>>,
    sweep_interval: Duration,
    /// When the last bulk sweep ran. `None` until the first read.
    last_sweep: Option<DateTime<Utc>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new() -> Self {
        Self::with_sweep_interval(Duration::seconds(SWEEP_INTERVAL_SECS))
    }

    pub fn with_sweep_interval(sweep_interval: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            sweep_interval,
            last_sweep: None,
        }
    }

    // ── Reads ────────────────────────────────────────────

    pub fn get(&mut self, key: &str) -> Option<V> {
        self.get_at(key, Utc::now())
    }

    /// Read `key` as of `now`, sweeping first if the interval has elapsed.
    pub fn get_at(&mut self, key: &str, now: DateTime<Utc>) -> Option<V> {
        let sweep_due = match self.last_sweep {
            Some(last) => now - last >= self.sweep_interval,
            None => true,
        };
        if sweep_due {
            let removed = self.sweep_at(now);
            if removed > 0 {
                tracing::debug!(removed, "Fetch cache sweep");
            }
            self.last_sweep = Some(now);
        }

        let live = self.entries.get(key)?.is_live_at(now);
        if live {
            self.entries.get(key).map(|e| e.value.clone())
        } else {
            self.entries.remove(key);
            None
        }
    }

    /// Inspect an entry without touching expiry bookkeeping.
    pub fn entry(&self, key: &str) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }

    // ── Writes ───────────────────────────────────────────

    pub fn set(&mut self, key: &str, value: V, ttl_minutes: u32) {
        self.set_at(key, value, ttl_minutes, Utc::now());
    }

    pub fn set_at(&mut self, key: &str, value: V, ttl_minutes: u32, now: DateTime<Utc>) {
        let entry = CacheEntry {
            key: key.to_string(),
            value,
            expires_at: now + Duration::minutes(i64::from(ttl_minutes)),
            created_at: now,
        };
        self.entries.insert(key.to_string(), entry);
    }

    /// Remove every entry expired at `now`. Returns how many were dropped.
    pub fn sweep_at(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| e.is_live_at(now));
        before - self.entries.len()
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.entries.remove(key).map(|e| e.value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
