// ── Dispatch deduplicator ──
//
// Collapses concurrent lookups for the same CacheKey into one fetch.
// Each fetch runs in its own task so it settles even if every awaiter
// has gone away; awaiters hold a cloneable `Shared` handle to it.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tracing::{debug, warn};

use super::cache::CacheStore;
use crate::error::CoreError;
use crate::model::{CacheKey, ReferenceNode};

/// Handle to an in-progress fetch, cloned by every caller that joins it.
pub type PendingFetch = Shared<BoxFuture<'static, Settlement>>;

/// How a lookup was satisfied.
#[derive(Debug, Clone)]
pub enum Settlement {
    /// Served from the cache without suspending.
    Cached(Arc<[ReferenceNode]>),
    /// Fetched from the source and written to the cache.
    Fetched(Arc<[ReferenceNode]>),
    /// The source failed. Nothing was cached.
    Failed(Arc<CoreError>),
}

impl Settlement {
    /// The listing, empty on failure.
    pub fn nodes(&self) -> Arc<[ReferenceNode]> {
        match self {
            Self::Cached(nodes) | Self::Fetched(nodes) => Arc::clone(nodes),
            Self::Failed(_) => Arc::from(Vec::new()),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Why the lookup failed, if it did.
    pub fn error(&self) -> Option<&CoreError> {
        match self {
            Self::Failed(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// Result of the synchronous half of a lookup.
pub enum Lookup {
    Ready(Settlement),
    Pending(PendingFetch),
}

/// Counters describing how lookups were served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupStats {
    pub cache_hits: u64,
    pub joined: u64,
    pub fetches: u64,
    pub failures: u64,
}

#[derive(Default)]
struct Counters {
    cache_hits: AtomicU64,
    joined: AtomicU64,
    fetches: AtomicU64,
    failures: AtomicU64,
}

/// Tracks in-flight fetches by key in front of a [`CacheStore`].
///
/// Cheaply cloneable; clones share the cache, the pending map and the
/// counters.
#[derive(Clone)]
pub struct Deduplicator {
    cache: Arc<CacheStore>,
    pending: Arc<DashMap<CacheKey, PendingFetch>>,
    counters: Arc<Counters>,
}

impl Deduplicator {
    pub fn new(cache: Arc<CacheStore>) -> Self {
        Self {
            cache,
            pending: Arc::new(DashMap::new()),
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    /// Number of fetches currently outstanding.
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    pub fn stats(&self) -> DedupStats {
        DedupStats {
            cache_hits: self.counters.cache_hits.load(Ordering::Relaxed),
            joined: self.counters.joined.load(Ordering::Relaxed),
            fetches: self.counters.fetches.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
        }
    }

    /// Resolve the listing for `key`, degrading failures to an empty list.
    pub async fn resolve<F, Fut, E>(&self, key: &CacheKey, fetcher: F) -> Arc<[ReferenceNode]>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<ReferenceNode>, E>> + Send + 'static,
        E: Into<CoreError> + fmt::Display + Send + 'static,
    {
        self.resolve_detailed(key, fetcher).await.nodes()
    }

    /// Like [`resolve`](Self::resolve) but reports how the lookup settled.
    pub async fn resolve_detailed<F, Fut, E>(&self, key: &CacheKey, fetcher: F) -> Settlement
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<ReferenceNode>, E>> + Send + 'static,
        E: Into<CoreError> + fmt::Display + Send + 'static,
    {
        match self.lookup(key, fetcher) {
            Lookup::Ready(settlement) => settlement,
            Lookup::Pending(fetch) => fetch.await,
        }
    }

    /// The non-suspending half of a lookup.
    ///
    /// Cache hit → `Ready`. Otherwise joins the pending fetch for `key`,
    /// or spawns one with `fetcher` and registers it. The pending check
    /// and the registration happen under one shard lock, so two callers
    /// can never both start a fetch for the same key. `fetcher` is invoked
    /// while that lock is held and must not call back into this
    /// deduplicator.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn lookup<F, Fut, E>(&self, key: &CacheKey, fetcher: F) -> Lookup
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<ReferenceNode>, E>> + Send + 'static,
        E: Into<CoreError> + fmt::Display + Send + 'static,
    {
        if let Some(nodes) = self.cache.get(key) {
            return self.cache_hit(key, nodes);
        }

        match self.pending.entry(key.clone()) {
            Entry::Occupied(slot) => {
                debug!(key = %key, "joining in-flight fetch");
                self.counters.joined.fetch_add(1, Ordering::Relaxed);
                Lookup::Pending(slot.get().clone())
            }
            Entry::Vacant(slot) => {
                // A fetch may have settled between the cache check and the lock.
                if let Some(nodes) = self.cache.get(key) {
                    return self.cache_hit(key, nodes);
                }

                debug!(key = %key, "starting reference fetch");
                self.counters.fetches.fetch_add(1, Ordering::Relaxed);

                let task = tokio::spawn(settle(
                    key.clone(),
                    fetcher(),
                    Arc::clone(&self.cache),
                    Arc::clone(&self.pending),
                    Arc::clone(&self.counters),
                ));
                let task_key = key.clone();
                let fetch: PendingFetch = async move {
                    task.await.unwrap_or_else(|e| {
                        warn!(key = %task_key, error = %e, "reference fetch task aborted");
                        Settlement::Failed(Arc::new(CoreError::Internal(format!(
                            "fetch task for {task_key} aborted"
                        ))))
                    })
                }
                .boxed()
                .shared();

                slot.insert(fetch.clone());
                Lookup::Pending(fetch)
            }
        }
    }

    fn cache_hit(&self, key: &CacheKey, nodes: Arc<[ReferenceNode]>) -> Lookup {
        debug!(key = %key, "cache hit");
        self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
        Lookup::Ready(Settlement::Cached(nodes))
    }
}

/// Removes the pending entry when the fetch task finishes, panics included.
struct PendingGuard {
    key: CacheKey,
    pending: Arc<DashMap<CacheKey, PendingFetch>>,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.pending.remove(&self.key);
    }
}

/// Run one fetch to completion: cache on success, then clear the pending entry.
async fn settle<Fut, E>(
    key: CacheKey,
    fetch: Fut,
    cache: Arc<CacheStore>,
    pending: Arc<DashMap<CacheKey, PendingFetch>>,
    counters: Arc<Counters>,
) -> Settlement
where
    Fut: Future<Output = Result<Vec<ReferenceNode>, E>> + Send + 'static,
    E: Into<CoreError> + fmt::Display + Send + 'static,
{
    let _guard = PendingGuard {
        key: key.clone(),
        pending,
    };

    match fetch.await {
        Ok(nodes) => {
            let nodes: Arc<[ReferenceNode]> = nodes.into();
            debug!(key = %key, count = nodes.len(), "reference fetch settled");
            match cache.put(key.clone(), Arc::clone(&nodes)) {
                Ok(()) => Settlement::Fetched(nodes),
                Err(_) => Settlement::Fetched(cache.get(&key).unwrap_or(nodes)),
            }
        }
        Err(e) => {
            counters.failures.fetch_add(1, Ordering::Relaxed);
            warn!(key = %key, error = %e, "reference fetch failed; resolving to empty list");
            Settlement::Failed(Arc::new(e.into()))
        }
    }
}
