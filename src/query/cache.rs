//! Request cache with in-flight deduplication
//!
//! Concurrent callers asking for the same key share one shared future.
//! Successful results are served from cache until `stale_time` elapses or
//! the key is invalidated; failures are kept as the key's error state until
//! the next fetch.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::keys::QueryKey;
use crate::error::{QueryError, Result};

type SharedFetch<V> = Shared<BoxFuture<'static, std::result::Result<V, QueryError>>>;

/// Observable state of a query
#[derive(Debug, Clone)]
pub enum QueryState<V> {
    Idle,
    Loading,
    Success(V),
    Error(QueryError),
}

impl<V> QueryState<V> {
    pub fn is_success(&self) -> bool {
        matches!(self, QueryState::Success(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }

    pub fn data(&self) -> Option<&V> {
        match self {
            QueryState::Success(v) => Some(v),
            _ => None,
        }
    }
}

enum Slot<V: Clone> {
    InFlight {
        fetch: SharedFetch<V>,
        generation: u64,
        previous: Option<V>,
    },
    Ready {
        value: V,
        fetched_at: Instant,
        stale: bool,
    },
    Failed(QueryError),
}

/// Typed query cache keyed by [`QueryKey`]
pub struct QueryCache<V: Clone + Send + Sync + 'static> {
    entries: DashMap<QueryKey, Slot<V>>,
    stale_time: Duration,
    generation: AtomicU64,
}

impl<V: Clone + Send + Sync + 'static> QueryCache<V> {
    pub fn new(stale_time: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            stale_time,
            generation: AtomicU64::new(0),
        }
    }

    /// Return the cached value, join an in-flight fetch, or start a new one
    pub async fn fetch<F, Fut>(&self, key: QueryKey, fetcher: F) -> std::result::Result<V, QueryError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        let (fetch, generation) = match self.entries.entry(key.clone()) {
            Entry::Occupied(mut occupied) => match occupied.get() {
                Slot::Ready {
                    value,
                    fetched_at,
                    stale,
                } if !*stale && fetched_at.elapsed() < self.stale_time => {
                    return Ok(value.clone());
                }
                Slot::InFlight {
                    fetch, generation, ..
                } => {
                    debug!("joining in-flight query {}", key);
                    (fetch.clone(), *generation)
                }
                Slot::Ready { value, .. } => {
                    let previous = Some(value.clone());
                    let (fetch, generation) = self.start(fetcher);
                    occupied.insert(Slot::InFlight {
                        fetch: fetch.clone(),
                        generation,
                        previous,
                    });
                    (fetch, generation)
                }
                Slot::Failed(_) => {
                    let (fetch, generation) = self.start(fetcher);
                    occupied.insert(Slot::InFlight {
                        fetch: fetch.clone(),
                        generation,
                        previous: None,
                    });
                    (fetch, generation)
                }
            },
            Entry::Vacant(vacant) => {
                let (fetch, generation) = self.start(fetcher);
                vacant.insert(Slot::InFlight {
                    fetch: fetch.clone(),
                    generation,
                    previous: None,
                });
                (fetch, generation)
            }
        };

        let result = fetch.await;
        self.settle(&key, generation, &result);
        result
    }

    /// Mark the key stale and fetch it again
    pub async fn refetch<F, Fut>(&self, key: QueryKey, fetcher: F) -> std::result::Result<V, QueryError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        self.invalidate(&key);
        self.fetch(key, fetcher).await
    }

    fn start<F, Fut>(&self, fetcher: F) -> (SharedFetch<V>, u64)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let fut = fetcher();
        let fetch = async move { fut.await.map_err(QueryError::from) }
            .boxed()
            .shared();
        (fetch, generation)
    }

    fn settle(&self, key: &QueryKey, generation: u64, result: &std::result::Result<V, QueryError>) {
        if let Some(mut slot) = self.entries.get_mut(key) {
            let current = matches!(
                &*slot,
                Slot::InFlight { generation: g, .. } if *g == generation
            );
            if !current {
                return;
            }
            *slot = match result {
                Ok(value) => Slot::Ready {
                    value: value.clone(),
                    fetched_at: Instant::now(),
                    stale: false,
                },
                Err(error) => {
                    warn!("query {} failed: {}", key, error);
                    Slot::Failed(error.clone())
                }
            };
        }
    }

    /// Mark a cached value stale so the next fetch goes to the network
    pub fn invalidate(&self, key: &QueryKey) {
        if let Some(mut slot) = self.entries.get_mut(key) {
            match &mut *slot {
                Slot::Ready { stale, .. } => *stale = true,
                Slot::Failed(_) | Slot::InFlight { .. } => {}
            }
        }
    }

    /// Invalidate every key matching the predicate
    pub fn invalidate_matching(&self, pred: impl Fn(&QueryKey) -> bool) {
        for mut entry in self.entries.iter_mut() {
            if pred(entry.key()) {
                if let Slot::Ready { stale, .. } = entry.value_mut() {
                    *stale = true;
                }
            }
        }
    }

    /// Seed the cache with a known value
    pub fn set(&self, key: QueryKey, value: V) {
        self.entries.insert(
            key,
            Slot::Ready {
                value,
                fetched_at: Instant::now(),
                stale: false,
            },
        );
    }

    pub fn state(&self, key: &QueryKey) -> QueryState<V> {
        match self.entries.get(key).as_deref() {
            None => QueryState::Idle,
            Some(Slot::InFlight { previous: Some(v), .. }) => QueryState::Success(v.clone()),
            Some(Slot::InFlight { previous: None, .. }) => QueryState::Loading,
            Some(Slot::Ready { value, .. }) => QueryState::Success(value.clone()),
            Some(Slot::Failed(error)) => QueryState::Error(error.clone()),
        }
    }

    /// Cached value, fresh or stale
    pub fn data(&self, key: &QueryKey) -> Option<V> {
        match self.state(key) {
            QueryState::Success(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeskError;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    fn counting_fetch(
        calls: &Arc<AtomicUsize>,
        value: u64,
    ) -> impl FnOnce() -> BoxFuture<'static, Result<u64>> {
        let calls = calls.clone();
        move || {
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(value)
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn test_concurrent_fetches_share_one_call() {
        let cache = QueryCache::<u64>::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        let (a, b) = tokio::join!(
            cache.fetch(QueryKey::PlatformDay, counting_fetch(&calls, 7)),
            cache.fetch(QueryKey::PlatformDay, counting_fetch(&calls, 8)),
        );

        assert_eq!(a.unwrap(), 7);
        assert_eq!(b.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.data(&QueryKey::PlatformDay), Some(7));
    }

    #[tokio::test]
    async fn test_fresh_value_served_from_cache() {
        let cache = QueryCache::<u64>::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        cache
            .fetch(QueryKey::PlatformDay, counting_fetch(&calls, 1))
            .await
            .unwrap();
        let second = cache
            .fetch(QueryKey::PlatformDay, counting_fetch(&calls, 2))
            .await
            .unwrap();

        assert_eq!(second, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refetch_after_invalidate() {
        let cache = QueryCache::<u64>::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        cache
            .fetch(QueryKey::PlatformDay, counting_fetch(&calls, 1))
            .await
            .unwrap();
        let refreshed = cache
            .refetch(QueryKey::PlatformDay, counting_fetch(&calls, 2))
            .await
            .unwrap();

        assert_eq!(refreshed, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_is_error_state() {
        let cache = QueryCache::<u64>::new(Duration::from_secs(60));
        let result = cache
            .fetch(QueryKey::Rates, || async {
                Err(DeskError::InvalidResponse("boom".to_string()))
            })
            .await;

        assert!(result.is_err());
        assert!(matches!(cache.state(&QueryKey::Rates), QueryState::Error(_)));

        let retried = cache.fetch(QueryKey::Rates, || async { Ok(3) }).await;
        assert_eq!(retried.unwrap(), 3);
        assert!(cache.state(&QueryKey::Rates).is_success());
    }

    #[tokio::test]
    async fn test_invalidate_matching_by_account() {
        let cache = QueryCache::<u64>::new(Duration::from_secs(60));
        let mine = QueryKey::UserReward("hx1".to_string());
        let theirs = QueryKey::UserReward("hx2".to_string());
        cache.set(mine.clone(), 1);
        cache.set(theirs.clone(), 2);

        cache.invalidate_matching(|k| k.account() == Some("hx1"));

        let mine_value = cache.fetch(mine, || async { Ok(10) }).await.unwrap();
        let theirs_value = cache.fetch(theirs, || async { Ok(20) }).await.unwrap();
        assert_eq!(mine_value, 10);
        assert_eq!(theirs_value, 2);
    }

    #[test]
    fn test_idle_state() {
        let cache = QueryCache::<u64>::new(Duration::from_secs(1));
        assert!(matches!(cache.state(&QueryKey::Emission), QueryState::Idle));
    }
}
