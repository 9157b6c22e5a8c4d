//! Time-to-live cache with single-flight fetch coalescing.
//!
//! Each key owns one slot holding the last successful value and, while a
//! fetch is running, the list of callers waiting on it. All transitions of a
//! slot happen under that slot's map shard lock, and the lock is never held
//! across an await point.
//!
//! The fetch itself runs as a detached task: callers that go away (a dropped
//! HTTP request, say) do not cancel it, and its outcome is still written to
//! the cache for everyone else.

use std::any::Any;
use std::fmt::{Debug, Display};
use std::future::Future;
use std::hash::Hash;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use foundation::{Clock, Millis, SystemClock};
use futures_util::FutureExt;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::residency::Residency;

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    pub value: V,
    /// Clock time at which the fetch that produced `value` completed.
    pub stored_at_ms: Millis,
}

impl<V> CacheEntry<V> {
    pub fn is_fresh(&self, now_ms: Millis, ttl_ms: Millis) -> bool {
        now_ms.saturating_sub(self.stored_at_ms) < ttl_ms
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoalesceError<E> {
    #[error("{0}")]
    Fetch(E),
    /// The shared fetch ended without producing an outcome (it panicked or
    /// its task was torn down).
    #[error("in-flight fetch was abandoned before it settled")]
    Abandoned,
}

type Outcome<V, E> = Result<V, CoalesceError<E>>;
type Waiter<V, E> = oneshot::Sender<Outcome<V, E>>;

struct Slot<V, E> {
    entry: Option<CacheEntry<V>>,
    pending: Option<Vec<Waiter<V, E>>>,
}

impl<V, E> Default for Slot<V, E> {
    fn default() -> Self {
        Self {
            entry: None,
            pending: None,
        }
    }
}

struct Inner<K, V, E> {
    slots: DashMap<K, Slot<V, E>>,
    ttl_ms: Millis,
    clock: Arc<dyn Clock>,
}

/// Keyed cache in which at most one fetch per key is ever in flight.
///
/// Cloning is cheap; clones share the same slots.
pub struct Coalescer<K, V, E> {
    inner: Arc<Inner<K, V, E>>,
}

impl<K, V, E> Clone for Coalescer<K, V, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V, E> Coalescer<K, V, E>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + Display + Send + Sync + 'static,
{
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let ttl_ms = Millis::try_from(ttl.as_millis()).unwrap_or(Millis::MAX);
        Self {
            inner: Arc::new(Inner {
                slots: DashMap::new(),
                ttl_ms,
                clock,
            }),
        }
    }

    pub fn ttl_ms(&self) -> Millis {
        self.inner.ttl_ms
    }

    /// Return the cached value for `key` if it is fresh, otherwise the result
    /// of the one shared fetch for `key`.
    ///
    /// `fetch` is only invoked when this call starts a new fetch; callers
    /// that attach to a running fetch drop theirs unused.
    pub async fn get<F, Fut>(&self, key: K, fetch: F) -> Outcome<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let now = self.inner.clock.now_ms();
        let (tx, rx) = oneshot::channel();

        let leader = {
            let mut slot = self.inner.slots.entry(key.clone()).or_default();
            if let Some(entry) = &slot.entry
                && entry.is_fresh(now, self.inner.ttl_ms)
            {
                debug!(key = ?key, "presence cache hit");
                return Ok(entry.value.clone());
            }
            match slot.pending.as_mut() {
                Some(waiters) => {
                    waiters.push(tx);
                    debug!(key = ?key, waiters = waiters.len(), "joined in-flight fetch");
                    false
                }
                None => {
                    slot.pending = Some(vec![tx]);
                    true
                }
            }
        };

        if leader {
            debug!(key = ?key, "presence cache miss; fetching");
            let inner = Arc::clone(&self.inner);
            // A panic while building the future must still settle the slot,
            // or the key would stay pending forever.
            match panic::catch_unwind(AssertUnwindSafe(fetch)) {
                Ok(fut) => {
                    tokio::spawn(async move {
                        let outcome = AssertUnwindSafe(fut).catch_unwind().await;
                        inner.settle(key, outcome);
                    });
                }
                Err(payload) => inner.settle(key, Err(payload)),
            }
        }

        rx.await.unwrap_or(Err(CoalesceError::Abandoned))
    }

    /// Current lifecycle state of `key`. A running fetch takes precedence
    /// over any value still held.
    pub fn state(&self, key: &K) -> Residency {
        let Some(slot) = self.inner.slots.get(key) else {
            return Residency::Empty;
        };
        if slot.pending.is_some() {
            return Residency::Pending;
        }
        match &slot.entry {
            None => Residency::Empty,
            Some(entry) if entry.is_fresh(self.inner.clock.now_ms(), self.inner.ttl_ms) => {
                Residency::Fresh
            }
            Some(_) => Residency::Stale,
        }
    }

    /// The stored entry for `key`, fresh or not.
    pub fn peek(&self, key: &K) -> Option<CacheEntry<V>> {
        self.inner.slots.get(key).and_then(|slot| slot.entry.clone())
    }

    pub fn len(&self) -> usize {
        self.inner
            .slots
            .iter()
            .filter(|slot| slot.entry.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V, E> Inner<K, V, E>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
    E: Clone + Display,
{
    fn settle(&self, key: K, outcome: Result<Result<V, E>, Box<dyn Any + Send>>) {
        let result = match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(CoalesceError::Fetch(err)),
            Err(_) => Err(CoalesceError::Abandoned),
        };

        let waiters = {
            let mut slot = self.slots.entry(key.clone()).or_default();
            if let Ok(value) = &result {
                slot.entry = Some(CacheEntry {
                    value: value.clone(),
                    stored_at_ms: self.clock.now_ms(),
                });
            }
            slot.pending.take().unwrap_or_default()
        };

        match &result {
            Ok(_) => debug!(key = ?key, waiters = waiters.len(), "presence fetch stored"),
            Err(err) => warn!(
                key = ?key,
                waiters = waiters.len(),
                error = %err,
                "presence fetch failed; nothing cached"
            ),
        }

        for waiter in waiters {
            // A waiter that went away has nobody left to tell.
            let _ = waiter.send(result.clone());
        }
    }
}
