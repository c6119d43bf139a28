//! Query keys and tags for directory API calls.

use crate::cache::{QueryKey, Tag};

/// Tag kinds provided by cached directory queries.
pub mod tags {
  /// Any character listing page (all pages, all searches).
  pub const CHARACTER_LIST: &str = "character-list";
  /// One character detail payload.
  pub const CHARACTER: &str = "character";
  pub const PLANET: &str = "planet";
  pub const FILMS: &str = "films";
  pub const STARSHIPS: &str = "starships";
}

/// Identity of one directory query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SwapiQuery {
  /// One page of the character listing, optionally filtered by search
  CharacterList { page: u32, search: String },
  /// One character by id
  CharacterDetail { id: String },
  /// One planet by id
  Planet { id: String },
  /// A batch of films by resource URL
  Films { refs: Vec<String> },
  /// A batch of starships by resource URL
  Starships { refs: Vec<String> },
}

impl SwapiQuery {
  /// Invalidation tags for an edit to one character: every listing page,
  /// plus that character's detail entry. Nothing else.
  pub fn edit_invalidates(id: &str) -> Vec<Tag> {
    vec![
      Tag::of_kind(tags::CHARACTER_LIST),
      Tag::with_id(tags::CHARACTER, id),
    ]
  }
}

impl QueryKey for SwapiQuery {
  fn encode(&self) -> String {
    match self {
      Self::CharacterList { page, search } => {
        format!("character_list:{}:{}", page, normalize_search(search))
      }
      Self::CharacterDetail { id } => format!("character_detail:{}", id),
      Self::Planet { id } => format!("planet:{}", id),
      Self::Films { refs } => format!("films:{}", refs.join(",")),
      Self::Starships { refs } => format!("starships:{}", refs.join(",")),
    }
  }

  fn description(&self) -> String {
    match self {
      Self::CharacterList { page, search } if search.is_empty() => {
        format!("characters page {}", page)
      }
      Self::CharacterList { page, search } => {
        format!("characters page {} matching '{}'", page, search)
      }
      Self::CharacterDetail { id } => format!("character {}", id),
      Self::Planet { id } => format!("planet {}", id),
      Self::Films { refs } => format!("{} films", refs.len()),
      Self::Starships { refs } => format!("{} starships", refs.len()),
    }
  }

  fn tags(&self) -> Vec<Tag> {
    match self {
      Self::CharacterList { .. } => vec![Tag::of_kind(tags::CHARACTER_LIST)],
      Self::CharacterDetail { id } => vec![Tag::with_id(tags::CHARACTER, id.clone())],
      Self::Planet { id } => vec![Tag::with_id(tags::PLANET, id.clone())],
      Self::Films { .. } => vec![Tag::of_kind(tags::FILMS)],
      Self::Starships { .. } => vec![Tag::of_kind(tags::STARSHIPS)],
    }
  }
}

/// Normalize a search term for consistent cache keys.
fn normalize_search(search: &str) -> String {
  search.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn equivalent_searches_share_a_key() {
    let a = SwapiQuery::CharacterList {
      page: 1,
      search: "Luke".to_string(),
    };
    let b = SwapiQuery::CharacterList {
      page: 1,
      search: "  luke ".to_string(),
    };
    assert_eq!(a.cache_hash(), b.cache_hash());
  }

  #[test]
  fn distinct_pages_get_distinct_keys() {
    let a = SwapiQuery::CharacterList {
      page: 1,
      search: String::new(),
    };
    let b = SwapiQuery::CharacterList {
      page: 2,
      search: String::new(),
    };
    assert_ne!(a.cache_hash(), b.cache_hash());
  }

  #[test]
  fn edit_tags_cover_listings_and_the_edited_detail_only() {
    let invalidates = SwapiQuery::edit_invalidates("https://swapi.dev/api/people/1/");

    let listing = SwapiQuery::CharacterList {
      page: 3,
      search: "sky".to_string(),
    };
    let edited = SwapiQuery::CharacterDetail {
      id: "https://swapi.dev/api/people/1/".to_string(),
    };
    let other = SwapiQuery::CharacterDetail {
      id: "https://swapi.dev/api/people/2/".to_string(),
    };
    let planet = SwapiQuery::Planet {
      id: "https://swapi.dev/api/planets/1/".to_string(),
    };

    let covered = |q: &SwapiQuery| {
      q.tags()
        .iter()
        .any(|provided| invalidates.iter().any(|tag| tag.covers(provided)))
    };

    assert!(covered(&listing));
    assert!(covered(&edited));
    assert!(!covered(&other));
    assert!(!covered(&planet));
  }
}
