use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::config::RegistryConfig;
use crate::fetch_cache::TtlCache;

use super::client::RegistryClient;
use super::types::{RawRecord, ResourceKind};
use super::RegistryError;

/// Registry access through the TTL fetch cache.
///
/// Concurrent misses for the same cache key are coalesced: the first caller
/// fetches while the others wait on a per-key lock, then read the cached
/// result instead of issuing their own network walk.
pub struct CachedRegistry {
    client: RegistryClient,
    config: RegistryConfig,
    /// Never held across an await.
    cache: Mutex<TtlCache<Vec<RawRecord>>>,
    inflight: tokio::sync::Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl CachedRegistry {
    pub fn new(config: RegistryConfig) -> Result<Self, RegistryError> {
        let client = RegistryClient::new(&config)?;
        Ok(Self {
            client,
            config,
            cache: Mutex::new(TtlCache::new()),
            inflight: tokio::sync::Mutex::new(HashMap::new()),
        })
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Cache slot for a fetch. Query parameters are not part of the key, so
    /// two fetches of one kind with the same cap share a slot.
    pub fn cache_key(kind: ResourceKind, cap: usize) -> String {
        format!("{}:{}", kind.collection_key(), cap)
    }

    // ── Per-kind entry points ────────────────────────────

    pub async fn get_patients(&self, limit: Option<usize>) -> Vec<RawRecord> {
        self.get(ResourceKind::Patient, limit).await
    }

    pub async fn get_observations(&self, limit: Option<usize>) -> Vec<RawRecord> {
        self.get(ResourceKind::Observation, limit).await
    }

    pub async fn get_conditions(&self, limit: Option<usize>) -> Vec<RawRecord> {
        self.get(ResourceKind::Condition, limit).await
    }

    /// Fetch `kind` with the configured default query and an effective cap
    /// of `min(limit or default, max)`.
    pub async fn get(&self, kind: ResourceKind, limit: Option<usize>) -> Vec<RawRecord> {
        let cap = self.config.limit_for(kind).effective(limit);
        let params = default_params(kind);
        self.fetch(kind, &params, cap).await
    }

    /// Cached, coalesced paginated fetch.
    pub async fn fetch(
        &self,
        kind: ResourceKind,
        params: &[(String, String)],
        cap: usize,
    ) -> Vec<RawRecord> {
        let key = Self::cache_key(kind, cap);

        if let Some(hit) = self.cached(&key) {
            tracing::debug!(key = %key, "Fetch cache hit");
            return hit;
        }

        let slot = {
            let mut map = self.inflight.lock().await;
            Arc::clone(
                map.entry(key.clone())
                    .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
            )
        };

        let records = {
            let _guard = slot.lock().await;

            // A caller holding the slot before us may have filled the cache.
            if let Some(hit) = self.cached(&key) {
                tracing::debug!(key = %key, "Fetch cache hit after waiting on in-flight fetch");
                hit
            } else {
                tracing::debug!(key = %key, "Fetch cache miss, fetching from registry");
                let records = self.client.fetch_paginated(kind, params, cap).await;
                self.store(&key, &records);
                records
            }
        };

        {
            let mut map = self.inflight.lock().await;
            // Only the map and this caller still hold the slot: nobody is waiting.
            if map.get(&key).is_some_and(|s| Arc::strong_count(s) <= 2) {
                map.remove(&key);
            }
        }

        records
    }

    /// Single-page search, uncached.
    pub async fn search(&self, kind: ResourceKind, params: &[(String, String)]) -> Vec<RawRecord> {
        self.client.search(kind, params).await
    }

    /// Drop every cached fetch.
    pub fn invalidate(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }

    fn cached(&self, key: &str) -> Option<Vec<RawRecord>> {
        // Poisoned lock: behave as a miss.
        self.cache.lock().ok()?.get(key)
    }

    fn store(&self, key: &str, records: &[RawRecord]) {
        // An empty result is usually an outage; don't pin it for the TTL.
        if records.is_empty() {
            return;
        }
        if let Ok(mut cache) = self.cache.lock() {
            cache.set(key, records.to_vec(), self.config.cache_ttl_minutes);
        }
    }
}

/// Query sent with the first page of a default fetch.
fn default_params(kind: ResourceKind) -> Vec<(String, String)> {
    match kind {
        ResourceKind::Observation => vec![("_sort".to_string(), "-date".to_string())],
        ResourceKind::Patient | ResourceKind::Condition => Vec::new(),
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
