//! Serde shapes matching raw directory API responses.
//!
//! Kept separate from the domain types so wire-format quirks (the
//! pagination envelope, absolute `next`/`previous` links) stay out of the
//! rest of the app.

use serde::Deserialize;

use super::types::{Character, CharacterPage};

/// The pagination envelope every listing endpoint wraps its results in.
#[derive(Debug, Deserialize)]
pub struct ApiPage<T> {
  #[serde(default)]
  pub count: u64,
  pub next: Option<String>,
  pub previous: Option<String>,
  #[serde(default)]
  pub results: Vec<T>,
}

impl ApiPage<Character> {
  /// Attach the requested page number; the envelope only carries opaque
  /// next/previous links.
  pub fn into_page(self, page: u32) -> CharacterPage {
    CharacterPage {
      count: self.count,
      page,
      results: self.results,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::swapi::types::Gender;

  const LISTING_FIXTURE: &str = r#"{
    "count": 82,
    "next": "https://swapi.dev/api/people/?page=2",
    "previous": null,
    "results": [
      {
        "name": "Luke Skywalker",
        "height": "172",
        "mass": "77",
        "hair_color": "blond",
        "skin_color": "fair",
        "eye_color": "blue",
        "birth_year": "19BBY",
        "gender": "male",
        "homeworld": "https://swapi.dev/api/planets/1/",
        "films": ["https://swapi.dev/api/films/1/"],
        "species": [],
        "vehicles": [],
        "starships": ["https://swapi.dev/api/starships/12/"],
        "created": "2014-12-09T13:50:51.644000Z",
        "edited": "2014-12-20T21:17:56.891000Z",
        "url": "https://swapi.dev/api/people/1/"
      },
      {
        "name": "R2-D2",
        "height": "96",
        "mass": "32",
        "hair_color": "n/a",
        "skin_color": "white, blue",
        "eye_color": "red",
        "birth_year": "33BBY",
        "gender": "n/a",
        "homeworld": "https://swapi.dev/api/planets/8/",
        "films": [],
        "starships": [],
        "url": "https://swapi.dev/api/people/3/"
      }
    ]
  }"#;

  #[test]
  fn parses_listing_fixture() {
    let api: ApiPage<Character> = serde_json::from_str(LISTING_FIXTURE).unwrap();
    let page = api.into_page(1);

    assert_eq!(page.count, 82);
    assert_eq!(page.page, 1);
    assert_eq!(page.results.len(), 2);
    assert_eq!(page.results[0].name, "Luke Skywalker");
    assert_eq!(page.results[0].gender, Gender::Male);
    assert_eq!(page.results[1].gender, Gender::NotApplicable);
    // Unknown wire fields (species, created, ...) are ignored
    assert_eq!(page.results[0].starships.len(), 1);
  }

  #[test]
  fn empty_listing_parses_to_no_results() {
    let api: ApiPage<Character> =
      serde_json::from_str(r#"{"count": 0, "next": null, "previous": null, "results": []}"#)
        .unwrap();
    assert!(api.into_page(1).results.is_empty());
  }
}
