//! Core traits and types for the query cache.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Identity of one logical query against the remote directory.
///
/// The cache is keyed by a deterministic encoding of (operation kind,
/// operation parameters); `cache_hash` turns that encoding into a stable,
/// fixed-length key.
pub trait QueryKey {
  /// Deterministic encoding of the query's kind and parameters.
  fn encode(&self) -> String;

  /// Human-readable form for log lines.
  fn description(&self) -> String;

  /// Tags this query's cache entry provides, for targeted invalidation.
  fn tags(&self) -> Vec<Tag>;

  /// SHA256 hash of the encoding, for stable fixed-length keys.
  fn cache_hash(&self) -> String {
    let mut hasher = Sha256::new();
    hasher.update(self.encode().as_bytes());
    hex::encode(hasher.finalize())
  }
}

/// An invalidation tag carried by cache entries.
///
/// A tag names a kind of data and optionally one specific resource of that
/// kind. Invalidating a kind-level tag (`id: None`) evicts every entry
/// tagged with that kind; invalidating an id-level tag evicts exact
/// matches only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
  pub kind: &'static str,
  pub id: Option<String>,
}

impl Tag {
  /// Tag covering every entry of a kind.
  pub fn of_kind(kind: &'static str) -> Self {
    Self { kind, id: None }
  }

  /// Tag covering one specific resource.
  pub fn with_id(kind: &'static str, id: impl Into<String>) -> Self {
    Self {
      kind,
      id: Some(id.into()),
    }
  }

  /// Whether `self`, used as an invalidation tag, covers `provided`.
  pub fn covers(&self, provided: &Tag) -> bool {
    self.kind == provided.kind && (self.id.is_none() || self.id == provided.id)
  }
}

impl std::fmt::Display for Tag {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match &self.id {
      Some(id) => write!(f, "{}({})", self.kind, id),
      None => f.write_str(self.kind),
    }
  }
}

/// Result of a cache-layer fetch, with metadata about where it came from.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  pub data: T,
  pub source: CacheSource,
  /// When the data was cached, if it came from the cache.
  pub cached_at: Option<DateTime<Utc>>,
}

impl<T> CacheResult<T> {
  pub fn from_network(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Network,
      cached_at: None,
    }
  }

  pub fn from_cache(data: T, cached_at: DateTime<Utc>) -> Self {
    Self {
      data,
      source: CacheSource::Cache,
      cached_at: Some(cached_at),
    }
  }

  /// Stale data served because the network fetch failed.
  pub fn offline(data: T, cached_at: DateTime<Utc>) -> Self {
    Self {
      data,
      source: CacheSource::Offline,
      cached_at: Some(cached_at),
    }
  }
}

/// Indicates where fetched data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fresh data from the network.
  Network,
  /// Data from the cache, within the stale window.
  Cache,
  /// Stale cached data, served because the network fetch failed.
  Offline,
}
