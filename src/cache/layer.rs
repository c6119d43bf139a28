//! Cache layer that orchestrates cache lookups with network fetching.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use color_eyre::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::store::CacheStore;
use super::traits::{CacheResult, QueryKey};

/// Fetch-through cache over a [`CacheStore`].
///
/// Lookups within the stale window are served from the store without
/// touching the network. Stale or missing entries run the fetcher; if the
/// fetcher fails and a stale entry exists, the stale data is served
/// instead of the error.
pub struct CacheLayer<S: CacheStore> {
  store: Arc<S>,
  stale_time: Duration,
}

impl<S: CacheStore> CacheLayer<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self {
      store,
      stale_time: Duration::minutes(5),
    }
  }

  pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
    self.stale_time = stale_time;
    self
  }

  /// The shared store, for collaborators that evict entries directly.
  pub fn store(&self) -> Arc<S> {
    Arc::clone(&self.store)
  }

  fn is_stale(&self, cached_at: DateTime<Utc>) -> bool {
    Utc::now() - cached_at > self.stale_time
  }

  /// Decode a stored entry, treating undecodable values as a miss.
  fn lookup<T: DeserializeOwned>(&self, hash: &str) -> Option<(T, DateTime<Utc>)> {
    let entry = self.store.get(hash)?;
    match serde_json::from_value(entry.value) {
      Ok(value) => Some((value, entry.cached_at)),
      Err(err) => {
        warn!(%err, "discarding undecodable cache entry");
        self.store.remove(hash);
        None
      }
    }
  }

  /// Run a query through the cache.
  pub async fn fetch<K, T, F, Fut>(&self, key: &K, fetcher: F) -> Result<CacheResult<T>>
  where
    K: QueryKey,
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
  {
    let hash = key.cache_hash();

    if let Some((cached, cached_at)) = self.lookup::<T>(&hash) {
      if !self.is_stale(cached_at) {
        debug!(query = %key.description(), "cache hit");
        return Ok(CacheResult::from_cache(cached, cached_at));
      }

      // Stale entry: refresh, falling back to the stale data on failure
      match fetcher().await {
        Ok(data) => {
          self.put(&hash, key, &data);
          Ok(CacheResult::from_network(data))
        }
        Err(err) => {
          warn!(query = %key.description(), %err, "fetch failed, serving stale data");
          Ok(CacheResult::offline(cached, cached_at))
        }
      }
    } else {
      debug!(query = %key.description(), "cache miss");
      let data = fetcher().await?;
      self.put(&hash, key, &data);
      Ok(CacheResult::from_network(data))
    }
  }

  fn put<K: QueryKey, T: Serialize>(&self, hash: &str, key: &K, data: &T) {
    match serde_json::to_value(data) {
      Ok(value) => self.store.put(hash, value, key.tags()),
      Err(err) => warn!(query = %key.description(), %err, "failed to serialize for cache"),
    }
  }
}

impl<S: CacheStore> Clone for CacheLayer<S> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
      stale_time: self.stale_time,
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicU32, Ordering};

  use color_eyre::eyre::eyre;

  use super::*;
  use crate::cache::store::MemoryStore;
  use crate::cache::traits::{CacheSource, Tag};

  struct TestKey(&'static str);

  impl QueryKey for TestKey {
    fn encode(&self) -> String {
      format!("test:{}", self.0)
    }

    fn description(&self) -> String {
      self.0.to_string()
    }

    fn tags(&self) -> Vec<Tag> {
      vec![Tag::of_kind("test")]
    }
  }

  fn layer() -> (CacheLayer<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (CacheLayer::new(Arc::clone(&store)), store)
  }

  #[tokio::test]
  async fn fresh_hit_skips_the_fetcher() {
    let (cache, _) = layer();
    let calls = AtomicU32::new(0);

    for _ in 0..2 {
      let result = cache
        .fetch(&TestKey("a"), || {
          calls.fetch_add(1, Ordering::SeqCst);
          async { Ok(7u32) }
        })
        .await
        .unwrap();
      assert_eq!(result.data, 7);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn eviction_forces_a_refetch() {
    let (cache, store) = layer();
    let calls = AtomicU32::new(0);
    let fetch = || async {
      cache
        .fetch(&TestKey("a"), || {
          calls.fetch_add(1, Ordering::SeqCst);
          async { Ok(7u32) }
        })
        .await
        .unwrap()
    };

    assert_eq!(fetch().await.source, CacheSource::Network);
    assert_eq!(fetch().await.source, CacheSource::Cache);

    store.invalidate(&[Tag::of_kind("test")]);

    assert_eq!(fetch().await.source, CacheSource::Network);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn stale_entry_survives_a_failed_refresh() {
    let store = Arc::new(MemoryStore::new());
    let cache = CacheLayer::new(Arc::clone(&store)).with_stale_time(Duration::zero());

    cache
      .fetch(&TestKey("a"), || async { Ok(7u32) })
      .await
      .unwrap();

    // Zero stale time: the entry is immediately stale, so this refetches;
    // the failing fetcher falls back to the cached value.
    let result = cache
      .fetch(&TestKey("a"), || async { Err::<u32, _>(eyre!("network down")) })
      .await
      .unwrap();

    assert_eq!(result.data, 7);
    assert_eq!(result.source, CacheSource::Offline);
  }

  #[tokio::test]
  async fn miss_with_failing_fetcher_propagates_the_error() {
    let (cache, _) = layer();

    let result = cache
      .fetch(&TestKey("a"), || async { Err::<u32, _>(eyre!("network down")) })
      .await;

    assert!(result.is_err());
  }

  #[tokio::test]
  async fn undecodable_entry_is_a_miss() {
    let (cache, store) = layer();
    store.put(
      &TestKey("a").cache_hash(),
      serde_json::json!("not a number list"),
      vec![Tag::of_kind("test")],
    );

    let result = cache
      .fetch(&TestKey("a"), || async { Ok(vec![1u32, 2]) })
      .await
      .unwrap();

    assert_eq!(result.data, vec![1, 2]);
    assert_eq!(result.source, CacheSource::Network);
  }
}
