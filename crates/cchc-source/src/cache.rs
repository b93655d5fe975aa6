//! Explicit dataset cache with an injected clock.
//!
//! The hosting application owns one [`DatasetCache`]. An entry stays valid
//! until [`DatasetCache::invalidate`] is called or, when a TTL is configured,
//! until the clock says it has expired. Loads are serialized behind the cache
//! lock, so concurrent callers share a single fetch.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use cchc_core::Dataset;
use tokio::sync::Mutex;

use crate::error::SourceError;

/// Time source for cache expiry.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock [`Clock`] backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug)]
struct CacheEntry {
    dataset: Arc<Dataset>,
    loaded_at: Instant,
}

#[derive(Debug)]
pub struct DatasetCache<C = SystemClock> {
    ttl: Option<Duration>,
    clock: C,
    slot: Mutex<Option<CacheEntry>>,
}

impl DatasetCache<SystemClock> {
    /// Creates an empty cache on the system clock. `ttl = None` keeps the
    /// entry until it is invalidated.
    #[must_use]
    pub fn new(ttl: Option<Duration>) -> Self {
        Self::with_clock(ttl, SystemClock)
    }
}

impl<C: Clock> DatasetCache<C> {
    #[must_use]
    pub fn with_clock(ttl: Option<Duration>, clock: C) -> Self {
        Self {
            ttl,
            clock,
            slot: Mutex::new(None),
        }
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        match self.ttl {
            Some(ttl) => self.clock.now().saturating_duration_since(entry.loaded_at) < ttl,
            None => true,
        }
    }

    /// Returns the cached dataset, running `load` when the cache is empty or
    /// the entry has expired.
    ///
    /// # Errors
    ///
    /// Propagates the error from `load`. An expired entry is discarded
    /// before loading, so a failed refresh never hands back stale data.
    pub async fn get_or_load<F, Fut>(&self, load: F) -> Result<Arc<Dataset>, SourceError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Dataset, SourceError>>,
    {
        let mut slot = self.slot.lock().await;
        if let Some(entry) = slot.as_ref() {
            if self.is_fresh(entry) {
                tracing::debug!(rows = entry.dataset.len(), "dataset cache hit");
                return Ok(Arc::clone(&entry.dataset));
            }
            tracing::info!("cached dataset expired");
            *slot = None;
        }

        tracing::debug!("dataset cache miss");
        let dataset = Arc::new(load().await?);
        *slot = Some(CacheEntry {
            dataset: Arc::clone(&dataset),
            loaded_at: self.clock.now(),
        });
        Ok(dataset)
    }

    /// Drops the cached entry and loads a fresh one.
    ///
    /// # Errors
    ///
    /// Propagates the error from `load`; the cache is left empty.
    pub async fn reload<F, Fut>(&self, load: F) -> Result<Arc<Dataset>, SourceError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Dataset, SourceError>>,
    {
        self.invalidate().await;
        self.get_or_load(load).await
    }

    pub async fn invalidate(&self) {
        let mut slot = self.slot.lock().await;
        if slot.take().is_some() {
            tracing::info!("dataset cache invalidated");
        }
    }

    /// The cached dataset if one is present and fresh.
    pub async fn cached(&self) -> Option<Arc<Dataset>> {
        let slot = self.slot.lock().await;
        slot.as_ref()
            .filter(|entry| self.is_fresh(entry))
            .map(|entry| Arc::clone(&entry.dataset))
    }
}
