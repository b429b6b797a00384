use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::{self, BoxFuture, Either, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::api::ApiError;

type SharedFetch<V> = Shared<BoxFuture<'static, Result<Arc<V>, ApiError>>>;

/// Lifecycle of one cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Idle,
    Pending,
    Success,
    Error,
}

/// Point-in-time view of an entry. `data` is set iff `status` is
/// `Success`, `error` iff it is `Error`.
#[derive(Debug, Clone)]
pub struct QuerySnapshot<V> {
    pub status: QueryStatus,
    pub data: Option<Arc<V>>,
    pub error: Option<ApiError>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl<V> QuerySnapshot<V> {
    fn idle() -> Self {
        Self {
            status: QueryStatus::Idle,
            data: None,
            error: None,
            fetched_at: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Pending
    }
}

enum Slot<V> {
    Pending(SharedFetch<V>),
    Success {
        data: Arc<V>,
        fetched_at: DateTime<Utc>,
    },
    Failed {
        error: ApiError,
        fetched_at: DateTime<Utc>,
    },
}

struct Entry<V> {
    /// Bumped every time a producer is started, so a completion can tell
    /// whether the entry it belongs to is still the live one.
    generation: u64,
    slot: Slot<V>,
}

struct Inner<K, V> {
    entries: HashMap<K, Entry<V>>,
    next_generation: u64,
}

/// Keyed cache of fetch results with request deduplication.
///
/// Clone is cheap and clones share entries. The lock is only held for map
/// access, never across an await.
pub struct QueryCache<K, V> {
    inner: Arc<Mutex<Inner<K, V>>>,
}

impl<K, V> Clone for QueryCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> Default for QueryCache<K, V> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                entries: HashMap::new(),
                next_generation: 0,
            })),
        }
    }
}

impl<K, V> QueryCache<K, V>
where
    K: Hash + Eq + Clone + Debug + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of `key`. Never blocks on a pending fetch.
    pub fn get(&self, key: &K) -> QuerySnapshot<V> {
        let inner = self.inner.lock();
        match inner.entries.get(key).map(|e| &e.slot) {
            None => QuerySnapshot::idle(),
            Some(Slot::Pending(_)) => QuerySnapshot {
                status: QueryStatus::Pending,
                ..QuerySnapshot::idle()
            },
            Some(Slot::Success { data, fetched_at }) => QuerySnapshot {
                status: QueryStatus::Success,
                data: Some(Arc::clone(data)),
                error: None,
                fetched_at: Some(*fetched_at),
            },
            Some(Slot::Failed { error, fetched_at }) => QuerySnapshot {
                status: QueryStatus::Error,
                data: None,
                error: Some(error.clone()),
                fetched_at: Some(*fetched_at),
            },
        }
    }

    /// Drop the entry for `key`. A fetch still in flight for it completes
    /// for its waiters but is not stored.
    pub fn invalidate(&self, key: &K) -> bool {
        let removed = self.inner.lock().entries.remove(key).is_some();
        if removed {
            debug!(key = ?key, "Cache entry invalidated");
        }
        removed
    }

    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store `value` as a successful result without running a producer.
    pub fn insert(&self, key: K, value: V) {
        let mut inner = self.inner.lock();
        inner.next_generation += 1;
        let generation = inner.next_generation;
        inner.entries.insert(
            key,
            Entry {
                generation,
                slot: Slot::Success {
                    data: Arc::new(value),
                    fetched_at: Utc::now(),
                },
            },
        );
    }

    /// Resolve `key`, starting `producer` only when needed.
    ///
    /// - success entry: resolves to the cached value, producer not called
    /// - pending entry: joins the in-flight fetch, producer not called
    /// - no entry or error entry: calls `producer` and marks the entry
    ///   pending before this function returns
    ///
    /// Every caller joined to one fetch gets the same value or error.
    /// `producer` must only build its future; it must not call back into
    /// this cache.
    pub fn run<F, Fut>(
        &self,
        key: K,
        producer: F,
    ) -> impl Future<Output = Result<Arc<V>, ApiError>> + Send + 'static
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, ApiError>> + Send + 'static,
    {
        self.start(key, producer, false)
    }

    /// Like `run`, but replaces a successful entry with a fresh fetch.
    /// Joins the fetch instead if one is already in flight.
    pub fn refetch<F, Fut>(
        &self,
        key: K,
        producer: F,
    ) -> impl Future<Output = Result<Arc<V>, ApiError>> + Send + 'static
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, ApiError>> + Send + 'static,
    {
        self.start(key, producer, true)
    }

    fn start<F, Fut>(
        &self,
        key: K,
        producer: F,
        force: bool,
    ) -> impl Future<Output = Result<Arc<V>, ApiError>> + Send + 'static
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, ApiError>> + Send + 'static,
    {
        let (generation, fetch) = {
            let mut inner = self.inner.lock();
            match inner.entries.get(&key) {
                Some(Entry {
                    slot: Slot::Success { data, .. },
                    ..
                }) if !force => {
                    return Either::Left(future::ready(Ok(Arc::clone(data))));
                }
                Some(Entry {
                    generation,
                    slot: Slot::Pending(fetch),
                }) => {
                    debug!(key = ?key, "Joining in-flight fetch");
                    (*generation, fetch.clone())
                }
                _ => {
                    inner.next_generation += 1;
                    let generation = inner.next_generation;
                    let fetch = producer().map(|r| r.map(Arc::new)).boxed().shared();
                    inner.entries.insert(
                        key.clone(),
                        Entry {
                            generation,
                            slot: Slot::Pending(fetch.clone()),
                        },
                    );
                    debug!(key = ?key, generation, "Fetch started");
                    (generation, fetch)
                }
            }
        };

        let inner = Arc::clone(&self.inner);
        Either::Right(async move {
            let result = fetch.await;
            Self::settle(&inner, &key, generation, &result);
            result
        })
    }

    /// Move a pending entry to success or error. Only the first waiter to
    /// finish does the transition; results for an entry that has since
    /// been invalidated or restarted are dropped.
    fn settle(inner: &Mutex<Inner<K, V>>, key: &K, generation: u64, result: &Result<Arc<V>, ApiError>) {
        let mut inner = inner.lock();
        let Some(entry) = inner.entries.get_mut(key) else {
            debug!(key = ?key, "Discarding result for invalidated entry");
            return;
        };
        if entry.generation != generation {
            debug!(key = ?key, generation, current = entry.generation, "Discarding superseded result");
            return;
        }
        if !matches!(entry.slot, Slot::Pending(_)) {
            return;
        }

        let fetched_at = Utc::now();
        entry.slot = match result {
            Ok(data) => Slot::Success {
                data: Arc::clone(data),
                fetched_at,
            },
            Err(error) => {
                warn!(key = ?key, error = %error, "Fetch failed");
                Slot::Failed {
                    error: error.clone(),
                    fetched_at,
                }
            }
        };
    }
}

// ============================================================================
// Tests
// ============================================================================
