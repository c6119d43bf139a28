//! Cache store trait and the in-memory implementation.
//!
//! Entries are stored as serialized JSON values so one store can hold
//! payloads of different query types. The store itself knows nothing
//! about the directory API; keys, tags and freshness policy come from the
//! callers.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tracing::debug;

use super::traits::Tag;

/// One stored query result.
#[derive(Debug, Clone)]
pub struct Entry {
  pub value: serde_json::Value,
  pub tags: Vec<Tag>,
  pub cached_at: DateTime<Utc>,
}

/// Storage backend for the query cache.
pub trait CacheStore: Send + Sync {
  /// Store a query result under its hash, replacing any previous entry.
  fn put(&self, hash: &str, value: serde_json::Value, tags: Vec<Tag>);

  /// Look up a query result by hash.
  fn get(&self, hash: &str) -> Option<Entry>;

  /// Remove one entry. Returns whether an entry existed.
  fn remove(&self, hash: &str) -> bool;

  /// Evict every entry covered by any of the given tags.
  /// Returns the number of entries evicted.
  fn invalidate(&self, tags: &[Tag]) -> usize;

  /// Number of live entries.
  fn len(&self) -> usize;

  fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// In-memory store; entries live for the session, like the remote data
/// cache of a browser tab.
#[derive(Default)]
pub struct MemoryStore {
  entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl CacheStore for MemoryStore {
  fn put(&self, hash: &str, value: serde_json::Value, tags: Vec<Tag>) {
    let entry = Entry {
      value,
      tags,
      cached_at: Utc::now(),
    };
    self.entries().insert(hash.to_string(), entry);
  }

  fn get(&self, hash: &str) -> Option<Entry> {
    self.entries().get(hash).cloned()
  }

  fn remove(&self, hash: &str) -> bool {
    self.entries().remove(hash).is_some()
  }

  fn invalidate(&self, tags: &[Tag]) -> usize {
    let mut entries = self.entries();
    let before = entries.len();
    entries.retain(|_, entry| {
      !tags
        .iter()
        .any(|tag| entry.tags.iter().any(|provided| tag.covers(provided)))
    });
    let evicted = before - entries.len();
    if evicted > 0 {
      debug!(evicted, ?tags, "evicted cache entries");
    }
    evicted
  }

  fn len(&self) -> usize {
    self.entries().len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn put(store: &MemoryStore, hash: &str, tags: Vec<Tag>) {
    store.put(hash, serde_json::json!({"k": hash}), tags);
  }

  #[test]
  fn put_get_remove_roundtrip() {
    let store = MemoryStore::new();
    put(&store, "a", vec![Tag::of_kind("character-list")]);

    assert_eq!(store.get("a").unwrap().value["k"], "a");
    assert!(store.remove("a"));
    assert!(store.get("a").is_none());
    assert!(!store.remove("a"));
  }

  #[test]
  fn invalidation_targets_matching_tags_only() {
    let store = MemoryStore::new();
    put(&store, "list-1", vec![Tag::of_kind("character-list")]);
    put(&store, "list-2", vec![Tag::of_kind("character-list")]);
    put(&store, "luke", vec![Tag::with_id("character", "1")]);
    put(&store, "leia", vec![Tag::with_id("character", "5")]);
    put(&store, "tatooine", vec![Tag::with_id("planet", "1")]);

    let evicted = store.invalidate(&[
      Tag::of_kind("character-list"),
      Tag::with_id("character", "1"),
    ]);

    assert_eq!(evicted, 3);
    assert!(store.get("list-1").is_none());
    assert!(store.get("list-2").is_none());
    assert!(store.get("luke").is_none());
    // Unrelated entries survive
    assert!(store.get("leia").is_some());
    assert!(store.get("tatooine").is_some());
  }

  #[test]
  fn invalidating_nothing_matching_is_a_noop() {
    let store = MemoryStore::new();
    put(&store, "tatooine", vec![Tag::with_id("planet", "1")]);

    assert_eq!(store.invalidate(&[Tag::of_kind("character-list")]), 0);
    assert_eq!(store.len(), 1);
  }

}
