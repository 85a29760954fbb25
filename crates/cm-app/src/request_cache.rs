//! Memoized single-shot requests.
//!
//! A [`RequestCache`] runs at most one request per distinct key. Callers that
//! ask for a key already in flight await the same call, and a caller that
//! goes away does not cancel it: the request runs on its own task and its
//! result stays cached for the next caller. Failures are cached too, until
//! [`RequestCache::retry`] clears them.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("{0}")]
    Failed(String),

    #[error("request task ended unexpectedly: {0}")]
    Aborted(String),
}

impl FetchError {
    pub fn failed(err: impl std::fmt::Display) -> Self {
        Self::Failed(err.to_string())
    }
}

/// Observable state of one keyed request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestState<V> {
    /// Never requested (or cleared by a retry).
    Idle,
    Pending,
    Succeeded(V),
    Failed(FetchError),
}

impl<V> RequestState<V> {
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestState::Pending)
    }
}

type SharedFetch<V> = Shared<BoxFuture<'static, Result<V, FetchError>>>;

pub struct RequestCache<K, V>
where
    V: Clone,
{
    name: &'static str,
    entries: Mutex<HashMap<K, SharedFetch<V>>>,
}

impl<K, V> RequestCache<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<K, SharedFetch<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolve `key`, calling `fetch` only if the key has no entry yet.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn get_or_fetch<F, Fut>(&self, key: K, fetch: F) -> Result<V, FetchError>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<V, FetchError>> + Send + 'static,
    {
        let shared = {
            let mut entries = self.entries();
            entries
                .entry(key)
                .or_insert_with(|| {
                    debug!(cache = self.name, "starting request");
                    let handle = tokio::spawn(fetch());
                    async move {
                        match handle.await {
                            Ok(result) => result,
                            Err(join_err) => Err(FetchError::Aborted(join_err.to_string())),
                        }
                    }
                    .boxed()
                    .shared()
                })
                .clone()
        };
        shared.await
    }

    /// Current state of `key`.
    ///
    /// A request whose caller went away reports `Pending` until the next
    /// caller picks up its result.
    pub fn state(&self, key: &K) -> RequestState<V> {
        match self.entries().get(key) {
            None => RequestState::Idle,
            Some(shared) => match shared.peek() {
                None => RequestState::Pending,
                Some(Ok(value)) => RequestState::Succeeded(value.clone()),
                Some(Err(err)) => RequestState::Failed(err.clone()),
            },
        }
    }

    /// Forget a failed result so the next call fetches again.
    ///
    /// Returns `true` when an entry was cleared. Pending and successful
    /// entries are kept.
    pub fn retry(&self, key: &K) -> bool {
        let mut entries = self.entries();
        let failed = matches!(entries.get(key).and_then(|s| s.peek()), Some(Err(_)));
        if failed {
            entries.remove(key);
            debug!(cache = self.name, "cleared failed request for retry");
        }
        failed
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn counting_fetch(
        calls: &Arc<AtomicUsize>,
        value: u32,
    ) -> impl FnOnce() -> BoxFuture<'static, Result<u32, FetchError>> {
        let calls = calls.clone();
        move || {
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(value)
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn same_key_fetches_once() {
        let cache = RequestCache::<&'static str, u32>::new("test");
        let calls = Arc::new(AtomicUsize::new(0));

        assert_eq!(cache.get_or_fetch("a", counting_fetch(&calls, 1)).await, Ok(1));
        assert_eq!(cache.get_or_fetch("a", counting_fetch(&calls, 2)).await, Ok(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.state(&"a"), RequestState::Succeeded(1));
    }

    #[tokio::test]
    async fn changed_key_fetches_again() {
        let cache = RequestCache::<&'static str, u32>::new("test");
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get_or_fetch("a", counting_fetch(&calls, 1)).await.unwrap();
        assert_eq!(cache.get_or_fetch("b", counting_fetch(&calls, 2)).await, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_call() {
        let cache = Arc::new(RequestCache::<u8, u32>::new("test"));
        let calls = Arc::new(AtomicUsize::new(0));

        let slow = |calls: Arc<AtomicUsize>| {
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok::<u32, FetchError>(7)
            }
        };

        let (a, b) = tokio::join!(
            cache.get_or_fetch(1, slow(calls.clone())),
            cache.get_or_fetch(1, slow(calls.clone())),
        );
        assert_eq!((a, b), (Ok(7), Ok(7)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn abandoned_call_is_not_repeated() {
        let cache = Arc::new(RequestCache::<u8, u32>::new("test"));
        let calls = Arc::new(AtomicUsize::new(0));

        let first = {
            let calls = calls.clone();
            cache.get_or_fetch(1, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok::<u32, FetchError>(3)
            })
        };
        // Give up on the first caller before the request finishes.
        let _ = tokio::time::timeout(Duration::from_millis(1), first).await;
        assert_eq!(cache.state(&1), RequestState::Pending);

        let again = cache.get_or_fetch(1, counting_fetch(&calls, 99)).await;
        assert_eq!(again, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failure_is_cached_until_retry() {
        let cache = RequestCache::<u8, u32>::new("test");
        let calls = Arc::new(AtomicUsize::new(0));

        let failing = {
            let calls = calls.clone();
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<u32, FetchError>(FetchError::failed("backend down"))
            }
        };
        assert!(cache.get_or_fetch(1, failing).await.is_err());
        assert_eq!(
            cache.state(&1),
            RequestState::Failed(FetchError::Failed("backend down".into()))
        );

        // Still failed, no second call.
        assert!(cache.get_or_fetch(1, counting_fetch(&calls, 5)).await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert!(cache.retry(&1));
        assert_eq!(cache.state(&1), RequestState::Idle);
        assert_eq!(cache.get_or_fetch(1, counting_fetch(&calls, 5)).await, Ok(5));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn retry_keeps_successful_entries() {
        let cache = RequestCache::<u8, u32>::new("test");
        let calls = Arc::new(AtomicUsize::new(0));
        cache.get_or_fetch(1, counting_fetch(&calls, 5)).await.unwrap();
        assert!(!cache.retry(&1));
        assert!(!cache.retry(&2));
        assert_eq!(cache.state(&1), RequestState::Succeeded(5));
    }
}
