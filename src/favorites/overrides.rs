//! The override-and-invalidate pipeline stage.
//!
//! Every event the app receives passes through here before it reaches
//! `App::handle_event`. The pipeline keeps the remote cache's view of the
//! two overridable character fields consistent with the favorites store:
//! fulfilled fetch payloads are rewritten from the live store on the way
//! in, and an edit to a favorite evicts exactly the cache entries that
//! could now disagree with it.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::cache::CacheStore;
use crate::event::{ApiEvent, Event, FavoriteAction};
use crate::favorites::store::FavoritesStore;
use crate::swapi::cache::SwapiQuery;
use crate::swapi::types::{Character, CharacterPage};

/// Ordered interception chain over the app's event stream.
///
/// Handlers are pure rewrites except for two permitted collaborator
/// calls: reads of the favorites store (fresh on every event, never a
/// startup snapshot) and the eviction call into the cache store. The
/// pipeline performs no I/O and never fetches.
pub struct OverridePipeline<S: CacheStore> {
  favorites: Arc<FavoritesStore>,
  cache: Arc<S>,
}

impl<S: CacheStore> OverridePipeline<S> {
  pub fn new(favorites: Arc<FavoritesStore>, cache: Arc<S>) -> Self {
    Self { favorites, cache }
  }

  /// Run one event through the chain.
  ///
  /// `follow_up` is the app's own event queue. A field-update is
  /// forwarded unchanged — the store commit happens when it reaches the
  /// handler later this same turn — while its invalidation is enqueued
  /// and therefore runs on a later turn of the loop, strictly after the
  /// commit. Re-fetching is left to the read side.
  pub fn intercept(&self, event: Event, follow_up: &UnboundedSender<Event>) -> Event {
    match event {
      Event::Api(ApiEvent::Characters {
        page,
        search,
        result: Ok(payload),
      }) => Event::Api(ApiEvent::Characters {
        page,
        search,
        result: Ok(self.override_page(payload)),
      }),

      Event::Api(ApiEvent::Character { result: Ok(character) }) => Event::Api(ApiEvent::Character {
        result: Ok(Box::new(self.override_character(*character))),
      }),

      Event::Favorite(FavoriteAction::UpdateFields { id, update }) => {
        let _ = follow_up.send(Event::Invalidate { id: id.clone() });
        Event::Favorite(FavoriteAction::UpdateFields { id, update })
      }

      Event::Invalidate { id } => {
        let evicted = self.cache.invalidate(&SwapiQuery::edit_invalidates(&id));
        debug!(%id, evicted, "invalidated cached queries after favorite edit");
        Event::Invalidate { id }
      }

      // Every other event kind is opaque and passes through unmodified,
      // including planet/film/starship fulfillments: overrides only ever
      // touch the primary character payloads.
      other => other,
    }
  }

  /// Rewrite a listing payload, overriding each favorited character
  /// independently. Produces a fresh payload; the original is consumed.
  fn override_page(&self, payload: CharacterPage) -> CharacterPage {
    let CharacterPage { count, page, results } = payload;
    CharacterPage {
      count,
      page,
      results: results
        .into_iter()
        .map(|c| self.override_character(c))
        .collect(),
    }
  }

  /// Replace the two overridable fields from the favorites record, if one
  /// exists. Non-favorited characters pass through unchanged.
  fn override_character(&self, character: Character) -> Character {
    match self.favorites.get(&character.url) {
      Some(fav) => Character {
        height: fav.height,
        gender: fav.gender,
        ..character
      },
      None => character,
    }
  }
}

impl<S: CacheStore> Clone for OverridePipeline<S> {
  fn clone(&self) -> Self {
    Self {
      favorites: Arc::clone(&self.favorites),
      cache: Arc::clone(&self.cache),
    }
  }
}

#[cfg(test)]
mod tests {
  use tokio::sync::mpsc;

  use super::*;
  use crate::cache::{CacheLayer, CacheSource, MemoryStore, QueryKey};
  use crate::favorites::store::FavoriteUpdate;
  use crate::swapi::types::Gender;

  fn character(url: &str, name: &str, height: &str, gender: Gender) -> Character {
    Character {
      url: url.to_string(),
      name: name.to_string(),
      height: height.to_string(),
      mass: String::new(),
      hair_color: String::new(),
      skin_color: String::new(),
      eye_color: String::new(),
      birth_year: String::new(),
      gender,
      homeworld: String::new(),
      films: Vec::new(),
      starships: Vec::new(),
    }
  }

  fn remote_page() -> CharacterPage {
    CharacterPage {
      count: 3,
      page: 1,
      results: vec![
        character("https://swapi.dev/api/people/1/", "Luke Skywalker", "172", Gender::Male),
        character("https://swapi.dev/api/people/2/", "C-3PO", "167", Gender::NotApplicable),
        character("https://swapi.dev/api/people/3/", "R2-D2", "96", Gender::NotApplicable),
      ],
    }
  }

  fn pipeline() -> (OverridePipeline<MemoryStore>, Arc<FavoritesStore>, Arc<MemoryStore>) {
    let favorites = Arc::new(FavoritesStore::in_memory());
    let cache = Arc::new(MemoryStore::new());
    (
      OverridePipeline::new(Arc::clone(&favorites), Arc::clone(&cache)),
      favorites,
      cache,
    )
  }

  fn listing_event(page: CharacterPage) -> Event {
    Event::Api(ApiEvent::Characters {
      page: 1,
      search: String::new(),
      result: Ok(page),
    })
  }

  fn unwrap_listing(event: Event) -> CharacterPage {
    match event {
      Event::Api(ApiEvent::Characters { result: Ok(page), .. }) => page,
      other => panic!("expected a listing fulfillment, got {:?}", other),
    }
  }

  #[test]
  fn edited_favorite_rewrites_the_listing_payload() {
    let (pipeline, favorites, _) = pipeline();
    let (tx, _rx) = mpsc::unbounded_channel();

    let luke = remote_page().results[0].clone();
    favorites.toggle(&luke);
    favorites.update_fields(
      &luke.url,
      &FavoriteUpdate {
        height: Some("180".to_string()),
        gender: None,
      },
    );

    let page = unwrap_listing(pipeline.intercept(listing_event(remote_page()), &tx));

    assert_eq!(page.results[0].height, "180");
    assert_eq!(page.results[0].gender, Gender::Male);
    // Everything that is not overridable keeps its remote value
    assert_eq!(page.results[0].name, "Luke Skywalker");
  }

  #[test]
  fn mixed_page_overrides_only_the_favorited_entry() {
    let (pipeline, favorites, _) = pipeline();
    let (tx, _rx) = mpsc::unbounded_channel();

    let threepio = remote_page().results[1].clone();
    favorites.toggle(&threepio);
    favorites.update_fields(
      &threepio.url,
      &FavoriteUpdate {
        height: None,
        gender: Some(Gender::Female),
      },
    );

    let page = unwrap_listing(pipeline.intercept(listing_event(remote_page()), &tx));

    assert_eq!(page.results[0].gender, Gender::Male);
    assert_eq!(page.results[1].gender, Gender::Female);
    assert_eq!(page.results[1].height, "167");
    assert_eq!(page.results[2].gender, Gender::NotApplicable);
  }

  #[test]
  fn non_favorited_single_fetch_passes_through_unchanged() {
    let (pipeline, _, _) = pipeline();
    let (tx, _rx) = mpsc::unbounded_channel();

    let luke = remote_page().results[0].clone();
    let event = Event::Api(ApiEvent::Character {
      result: Ok(Box::new(luke.clone())),
    });

    match pipeline.intercept(event, &tx) {
      Event::Api(ApiEvent::Character { result: Ok(c) }) => assert_eq!(*c, luke),
      other => panic!("unexpected event {:?}", other),
    }
  }

  #[test]
  fn single_fetch_of_an_edited_favorite_is_overridden() {
    let (pipeline, favorites, _) = pipeline();
    let (tx, _rx) = mpsc::unbounded_channel();

    let luke = remote_page().results[0].clone();
    favorites.toggle(&luke);
    favorites.update_fields(
      &luke.url,
      &FavoriteUpdate {
        height: Some("180".to_string()),
        gender: Some(Gender::NotApplicable),
      },
    );

    let event = Event::Api(ApiEvent::Character {
      result: Ok(Box::new(luke)),
    });

    match pipeline.intercept(event, &tx) {
      Event::Api(ApiEvent::Character { result: Ok(c) }) => {
        assert_eq!(c.height, "180");
        assert_eq!(c.gender, Gender::NotApplicable);
      }
      other => panic!("unexpected event {:?}", other),
    }
  }

  #[test]
  fn field_update_is_forwarded_and_invalidation_deferred() {
    let (pipeline, favorites, cache) = pipeline();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let luke = remote_page().results[0].clone();
    favorites.toggle(&luke);

    // Seed cache entries a listing and two details would have created
    let seed = |q: &SwapiQuery| cache.put(&q.cache_hash(), serde_json::json!({}), q.tags());
    seed(&SwapiQuery::CharacterList { page: 1, search: String::new() });
    seed(&SwapiQuery::CharacterDetail { id: luke.url.clone() });
    seed(&SwapiQuery::CharacterDetail {
      id: "https://swapi.dev/api/people/2/".to_string(),
    });
    seed(&SwapiQuery::Planet {
      id: "https://swapi.dev/api/planets/1/".to_string(),
    });

    let update = FavoriteUpdate {
      height: Some("180".to_string()),
      gender: None,
    };
    let forwarded = pipeline.intercept(
      Event::Favorite(FavoriteAction::UpdateFields {
        id: luke.url.clone(),
        update: update.clone(),
      }),
      &tx,
    );

    // The action comes back unchanged for the handler to commit, and
    // nothing has been evicted yet
    match &forwarded {
      Event::Favorite(FavoriteAction::UpdateFields { id, update: u }) => {
        assert_eq!(id, &luke.url);
        assert_eq!(u, &update);
      }
      other => panic!("unexpected event {:?}", other),
    }
    assert_eq!(cache.len(), 4);

    // Commit, as the handler would this turn
    favorites.update_fields(&luke.url, &update);

    // The deferred invalidation arrives as a follow-up event; running it
    // through the pipeline evicts listings plus the edited detail only
    let deferred = rx.try_recv().expect("an invalidation should be queued");
    pipeline.intercept(deferred, &tx);

    assert_eq!(cache.len(), 2);
    let live = |q: &SwapiQuery| cache.get(&q.cache_hash()).is_some();
    assert!(!live(&SwapiQuery::CharacterList { page: 1, search: String::new() }));
    assert!(!live(&SwapiQuery::CharacterDetail { id: luke.url.clone() }));
    assert!(live(&SwapiQuery::CharacterDetail {
      id: "https://swapi.dev/api/people/2/".to_string(),
    }));
    assert!(live(&SwapiQuery::Planet {
      id: "https://swapi.dev/api/planets/1/".to_string(),
    }));
  }

  #[tokio::test]
  async fn next_fetch_after_an_edit_reflects_the_new_values() {
    let (pipeline, favorites, store) = pipeline();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let layer = CacheLayer::new(Arc::clone(&store));
    let key = SwapiQuery::CharacterList { page: 1, search: String::new() };

    // The remote always serves the original record
    let fetch_through = || async {
      let result = layer.fetch(&key, || async { Ok(remote_page()) }).await.unwrap();
      let event = pipeline.intercept(
        Event::Api(ApiEvent::Characters {
          page: 1,
          search: String::new(),
          result: Ok(result.data),
        }),
        &tx,
      );
      (result.source, unwrap_listing(event))
    };

    let (source, page) = fetch_through().await;
    assert_eq!(source, CacheSource::Network);
    assert_eq!(page.results[0].height, "172");

    // Favorite and edit Luke
    let luke = remote_page().results[0].clone();
    pipeline.intercept(
      Event::Favorite(FavoriteAction::Toggle(Box::new(luke.clone()))),
      &tx,
    );
    favorites.toggle(&luke);
    let update = FavoriteUpdate {
      height: Some("180".to_string()),
      gender: None,
    };
    pipeline.intercept(
      Event::Favorite(FavoriteAction::UpdateFields {
        id: luke.url.clone(),
        update: update.clone(),
      }),
      &tx,
    );
    favorites.update_fields(&luke.url, &update);
    let deferred = rx.try_recv().unwrap();
    pipeline.intercept(deferred, &tx);

    // The listing entry was evicted, so the next read goes back to the
    // network and the override is re-applied to the fresh remote payload
    let (source, page) = fetch_through().await;
    assert_eq!(source, CacheSource::Network);
    assert_eq!(page.results[0].height, "180");
    assert_eq!(page.results[0].gender, Gender::Male);
    assert_eq!(page.results[1].height, "167");
  }

  #[test]
  fn listing_errors_and_other_events_pass_through() {
    let (pipeline, _, _) = pipeline();
    let (tx, _rx) = mpsc::unbounded_channel();

    let event = Event::Api(ApiEvent::Characters {
      page: 1,
      search: String::new(),
      result: Err("boom".to_string()),
    });
    match pipeline.intercept(event, &tx) {
      Event::Api(ApiEvent::Characters { result: Err(e), .. }) => assert_eq!(e, "boom"),
      other => panic!("unexpected event {:?}", other),
    }

    match pipeline.intercept(Event::Tick, &tx) {
      Event::Tick => {}
      other => panic!("unexpected event {:?}", other),
    }
  }
}
