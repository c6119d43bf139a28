use color_eyre::{eyre::eyre, Result};
use futures::future;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::Config;

use super::api_types::ApiPage;
use super::types::{Character, CharacterPage, Film, Planet, Starship};

/// Plain HTTP client for the directory API.
#[derive(Clone)]
pub struct SwapiClient {
  http: reqwest::Client,
  base: Url,
}

impl SwapiClient {
  pub fn new(config: &Config) -> Result<Self> {
    let base = Url::parse(&config.api.base_url)
      .map_err(|e| eyre!("Invalid API base url {}: {}", config.api.base_url, e))?;

    let http = reqwest::Client::builder()
      .user_agent(concat!("galdex/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;

    Ok(Self { http, base })
  }

  /// One page of the character listing, optionally filtered by search.
  pub async fn get_characters(&self, page: u32, search: &str) -> Result<CharacterPage> {
    let mut url = self.base.join("people/")?;
    url.query_pairs_mut().append_pair("page", &page.to_string());
    if !search.is_empty() {
      url.query_pairs_mut().append_pair("search", search);
    }

    let api: ApiPage<Character> = self.get_json(url).await?;
    Ok(api.into_page(page))
  }

  /// One character by resource reference (the canonical URL that
  /// identifies it everywhere in the app).
  pub async fn get_character(&self, reference: &str) -> Result<Character> {
    self.get_json(self.resource_url(reference)?).await
  }

  /// One planet by resource reference.
  pub async fn get_planet(&self, reference: &str) -> Result<Planet> {
    self.get_json(self.resource_url(reference)?).await
  }

  /// Fetch a batch of films by resource URL. Fail-fast: any failing
  /// sub-fetch fails the whole batch.
  pub async fn get_films(&self, refs: &[String]) -> Result<Vec<Film>> {
    self.get_batch(refs).await
  }

  /// Fetch a batch of starships by resource URL. Fail-fast like films.
  pub async fn get_starships(&self, refs: &[String]) -> Result<Vec<Starship>> {
    self.get_batch(refs).await
  }

  async fn get_batch<T: DeserializeOwned>(&self, refs: &[String]) -> Result<Vec<T>> {
    let requests = refs
      .iter()
      .map(|reference| Ok(self.get_json(self.resource_url(reference)?)))
      .collect::<Result<Vec<_>>>()?;

    future::try_join_all(requests).await
  }

  /// Resolve a resource reference as served by the API. References are
  /// absolute URLs; relative ones are resolved against the base.
  fn resource_url(&self, reference: &str) -> Result<Url> {
    self
      .base
      .join(reference)
      .map_err(|e| eyre!("Invalid resource reference {}: {}", reference, e))
  }

  async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
    debug!(%url, "GET");
    let response = self
      .http
      .get(url.clone())
      .send()
      .await
      .map_err(|e| eyre!("Request to {} failed: {}", url, e))?;

    let status = response.status();
    if !status.is_success() {
      return Err(eyre!("Request to {} failed with status {}", url, status));
    }

    response
      .json()
      .await
      .map_err(|e| eyre!("Invalid response from {}: {}", url, e))
  }
}
