use crate::error::Result;
use crate::metrics::PipelineMetrics;
use crate::types::{GeoResolver, Geolocation};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::debug;

/// Memoises successful lookups of an inner resolver by identifier.
/// Failed lookups are not cached, so they are retried on the next occurrence.
pub struct CachedResolver<R> {
    inner: R,
    entries: Mutex<HashMap<String, Geolocation>>,
    hits: AtomicU64,
}

impl<R: GeoResolver> CachedResolver<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            entries: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cached(&self, identifier: &str) -> Option<Geolocation> {
        self.entries.lock().ok()?.get(identifier).cloned()
    }
}

impl<R: GeoResolver> GeoResolver for CachedResolver<R> {
    fn resolve(&self, identifier: &str) -> Result<Geolocation> {
        if let Some(geo) = self.cached(identifier) {
            debug!(identifier, "Cache hit");
            self.hits.fetch_add(1, Ordering::Relaxed);
            PipelineMetrics::record_cache_hit();
            return Ok(geo);
        }

        debug!(identifier, "Cache miss");
        let geo = self.inner.resolve(identifier)?;
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(identifier.to_string(), geo.clone());
        }
        Ok(geo)
    }

    fn cache_hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed) + self.inner.cache_hits()
    }
}
