//! Cached directory client that wraps [`SwapiClient`] with transparent
//! caching.

use color_eyre::Result;

use crate::cache::{CacheLayer, MemoryStore};
use crate::config::Config;

use super::cache::SwapiQuery;
use super::client::SwapiClient;
use super::types::{Character, CharacterPage, Film, Planet, Starship};

/// Directory client with transparent caching support.
///
/// Same surface as the underlying client; results are cached per query
/// and served from the cache within the freshness window. Eviction (after
/// a favorite edit) happens directly on the shared store, so the next
/// call here re-fetches.
#[derive(Clone)]
pub struct CachedSwapiClient {
  inner: SwapiClient,
  cache: CacheLayer<MemoryStore>,
}

impl CachedSwapiClient {
  pub fn new(config: &Config, cache: CacheLayer<MemoryStore>) -> Result<Self> {
    Ok(Self {
      inner: SwapiClient::new(config)?,
      cache,
    })
  }

  pub async fn get_characters(&self, page: u32, search: &str) -> Result<CharacterPage> {
    let key = SwapiQuery::CharacterList {
      page,
      search: search.to_string(),
    };

    let result = self
      .cache
      .fetch(&key, || {
        let inner = self.inner.clone();
        let search = search.to_string();
        async move { inner.get_characters(page, &search).await }
      })
      .await?;

    Ok(result.data)
  }

  pub async fn get_character(&self, id: &str) -> Result<Character> {
    let key = SwapiQuery::CharacterDetail { id: id.to_string() };

    let result = self
      .cache
      .fetch(&key, || {
        let inner = self.inner.clone();
        let id = id.to_string();
        async move { inner.get_character(&id).await }
      })
      .await?;

    Ok(result.data)
  }

  pub async fn get_planet(&self, id: &str) -> Result<Planet> {
    let key = SwapiQuery::Planet { id: id.to_string() };

    let result = self
      .cache
      .fetch(&key, || {
        let inner = self.inner.clone();
        let id = id.to_string();
        async move { inner.get_planet(&id).await }
      })
      .await?;

    Ok(result.data)
  }

  pub async fn get_films(&self, refs: &[String]) -> Result<Vec<Film>> {
    let key = SwapiQuery::Films { refs: refs.to_vec() };

    let result = self
      .cache
      .fetch(&key, || {
        let inner = self.inner.clone();
        let refs = refs.to_vec();
        async move { inner.get_films(&refs).await }
      })
      .await?;

    Ok(result.data)
  }

  pub async fn get_starships(&self, refs: &[String]) -> Result<Vec<Starship>> {
    let key = SwapiQuery::Starships { refs: refs.to_vec() };

    let result = self
      .cache
      .fetch(&key, || {
        let inner = self.inner.clone();
        let refs = refs.to_vec();
        async move { inner.get_starships(&refs).await }
      })
      .await?;

    Ok(result.data)
  }
}
