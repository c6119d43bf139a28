//! Domain types for the galactic directory.
//!
//! Every resource carries its canonical API URL; that URL is the stable,
//! opaque identifier used throughout the app (favorites, cache tags,
//! cross-resource references).

use serde::{Deserialize, Serialize};

/// Gender classification as served by the directory.
///
/// The editable set is male / female / n-a; anything else the remote
/// serves (droids predate the schema) deserializes to `Unknown` rather
/// than failing the whole payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
  Male,
  Female,
  #[serde(rename = "n/a")]
  NotApplicable,
  #[serde(other)]
  #[default]
  Unknown,
}

impl Gender {
  pub fn as_str(&self) -> &'static str {
    match self {
      Gender::Male => "male",
      Gender::Female => "female",
      Gender::NotApplicable => "n/a",
      Gender::Unknown => "unknown",
    }
  }

  /// Next value in the edit cycle. Editing only offers the closed set,
  /// so `Unknown` enters the cycle at `Male`.
  pub fn cycled(self) -> Gender {
    match self {
      Gender::Male => Gender::Female,
      Gender::Female => Gender::NotApplicable,
      Gender::NotApplicable | Gender::Unknown => Gender::Male,
    }
  }
}

impl std::fmt::Display for Gender {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A character record.
///
/// `height` stays a string because the remote serves measurements like
/// "172" and "unknown" interchangeably. `height` and `gender` are the two
/// fields a favorite may locally override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Character {
  pub url: String,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub height: String,
  #[serde(default)]
  pub mass: String,
  #[serde(default)]
  pub hair_color: String,
  #[serde(default)]
  pub skin_color: String,
  #[serde(default)]
  pub eye_color: String,
  #[serde(default)]
  pub birth_year: String,
  #[serde(default)]
  pub gender: Gender,
  #[serde(default)]
  pub homeworld: String,
  #[serde(default)]
  pub films: Vec<String>,
  #[serde(default)]
  pub starships: Vec<String>,
}

/// One page of a character listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterPage {
  /// Total number of matches across all pages.
  pub count: u64,
  /// The 1-based page this payload covers.
  pub page: u32,
  pub results: Vec<Character>,
}

impl CharacterPage {
  pub fn total_pages(&self, page_size: u32) -> u32 {
    if page_size == 0 {
      return 0;
    }
    self.count.div_ceil(page_size as u64) as u32
  }
}

// The joined resources only contribute their display names to the detail
// view; the rest of their (large) wire shapes is ignored.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planet {
  pub url: String,
  #[serde(default)]
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Film {
  pub url: String,
  #[serde(default)]
  pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Starship {
  pub url: String,
  #[serde(default)]
  pub name: String,
}

/// Extract the trailing id segment of a resource URL.
///
/// `https://swapi.dev/api/planets/1/` → `1`. Returns an empty string for
/// URLs with no path segments.
pub fn id_from_url(url: &str) -> &str {
  url.split('/').filter(|s| !s.is_empty()).next_back().unwrap_or("")
}
