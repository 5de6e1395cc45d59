//! In-memory list memoization with single-flight population.

use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::traits::CacheResult;

#[derive(Debug)]
struct CachedList<T> {
  entries: Vec<T>,
  cached_at: Option<DateTime<Utc>>,
}

/// Process-lifetime cache for a list that rarely changes.
///
/// The list is fetched on first use and kept until the process exits.
/// An empty list counts as a miss, so a failed or empty fetch is retried
/// by the next caller. The lock is held across the fetch: concurrent callers
/// on a cold cache wait for the first fetch instead of issuing their own.
/// The fetch has no timeout of its own, so a hung upstream call blocks every
/// caller until the transport gives up.
pub struct CacheLayer<T> {
  inner: Arc<Mutex<CachedList<T>>>,
}

impl<T: Clone> CacheLayer<T> {
  pub fn new() -> Self {
    Self {
      inner: Arc::new(Mutex::new(CachedList {
        entries: Vec::new(),
        cached_at: None,
      })),
    }
  }

  /// Return the memoized list, fetching it first if the cache is empty.
  ///
  /// Fetched entries are appended to the cache. A fetch error is returned
  /// as-is and leaves the cache untouched.
  pub async fn fetch_list<E, F, Fut>(&self, fetcher: F) -> Result<CacheResult<Vec<T>>, E>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
  {
    let mut cached = self.inner.lock().await;

    if !cached.entries.is_empty() {
      return Ok(CacheResult::from_cache(
        cached.entries.clone(),
        cached.cached_at,
      ));
    }

    let fetched = fetcher().await?;
    if !fetched.is_empty() {
      cached.entries.extend(fetched);
      cached.cached_at = Some(Utc::now());
    }

    Ok(CacheResult::from_network(
      cached.entries.clone(),
      cached.cached_at,
    ))
  }

  /// Current contents, without fetching.
  #[cfg(test)]
  async fn snapshot(&self) -> Vec<T> {
    self.inner.lock().await.entries.clone()
  }
}

impl<T: Clone> Default for CacheLayer<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> Clone for CacheLayer<T> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::CacheSource;
  use std::sync::atomic::{AtomicU32, Ordering};
  use std::time::Duration;

  fn counting_fetcher(
    calls: &Arc<AtomicU32>,
    result: Result<Vec<&'static str>, String>,
  ) -> impl FnOnce() -> std::future::Ready<Result<Vec<&'static str>, String>> {
    let calls = Arc::clone(calls);
    move || {
      calls.fetch_add(1, Ordering::SeqCst);
      std::future::ready(result)
    }
  }

  #[tokio::test]
  async fn test_cold_cache_fetches_once() {
    let cache: CacheLayer<&str> = CacheLayer::new();
    let calls = Arc::new(AtomicU32::new(0));

    let first = cache
      .fetch_list(counting_fetcher(&calls, Ok(vec!["days", "years"])))
      .await
      .unwrap();
    assert_eq!(first.source, CacheSource::Network);
    assert_eq!(first.data, vec!["days", "years"]);
    assert!(first.cached_at.is_some());

    let second = cache
      .fetch_list(counting_fetcher(&calls, Ok(vec!["ignored"])))
      .await
      .unwrap();
    assert_eq!(second.source, CacheSource::Memory);
    assert_eq!(second.data, vec!["days", "years"]);
    assert_eq!(second.cached_at, first.cached_at);

    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_empty_fetch_is_retried() {
    let cache: CacheLayer<&str> = CacheLayer::new();
    let calls = Arc::new(AtomicU32::new(0));

    let empty = cache
      .fetch_list(counting_fetcher(&calls, Ok(vec![])))
      .await
      .unwrap();
    assert!(empty.data.is_empty());
    assert!(empty.cached_at.is_none());

    let filled = cache
      .fetch_list(counting_fetcher(&calls, Ok(vec!["weeks"])))
      .await
      .unwrap();
    assert_eq!(filled.data, vec!["weeks"]);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_failed_fetch_leaves_cache_empty() {
    let cache: CacheLayer<&str> = CacheLayer::new();
    let calls = Arc::new(AtomicU32::new(0));

    let err = cache
      .fetch_list(counting_fetcher(&calls, Err("upstream down".to_string())))
      .await
      .unwrap_err();
    assert_eq!(err, "upstream down");
    assert!(cache.snapshot().await.is_empty());

    let retried = cache
      .fetch_list(counting_fetcher(&calls, Ok(vec!["months"])))
      .await
      .unwrap();
    assert_eq!(retried.source, CacheSource::Network);
    assert_eq!(retried.data, vec!["months"]);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_concurrent_cold_callers_share_one_fetch() {
    let cache: CacheLayer<&str> = CacheLayer::new();
    let calls = Arc::new(AtomicU32::new(0));

    let callers = (0..8).map(|_| {
      let cache = cache.clone();
      let calls = Arc::clone(&calls);
      tokio::spawn(async move {
        cache
          .fetch_list(|| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok::<_, String>(vec!["days", "years"])
          })
          .await
          .map(|result| result.data)
      })
    });

    for result in futures::future::join_all(callers).await {
      assert_eq!(result.unwrap().unwrap(), vec!["days", "years"]);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.snapshot().await, vec!["days", "years"]);
  }
}
