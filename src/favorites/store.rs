//! The persistent favorites store.
//!
//! Holds the user's favorited characters together with their locally
//! edited height/gender values, and persists the whole set to a JSON file
//! after every mutation. Once a character is favorited, the record here is
//! the authoritative source for its two overridable fields.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::swapi::types::{Character, Gender};

/// Partial update of the two overridable fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FavoriteUpdate {
  pub height: Option<String>,
  pub gender: Option<Gender>,
}

/// Ordered set of favorited characters, unique by url.
///
/// Interior mutability so the store can be shared behind an `Arc`; every
/// reader sees the live set, not a startup snapshot.
pub struct FavoritesStore {
  characters: Mutex<Vec<Character>>,
  path: Option<PathBuf>,
}

impl FavoritesStore {
  /// Open the store at the default location under the user data dir.
  pub fn open_default() -> Self {
    let path = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .map(|p| p.join("galdex").join("favorites.json"));

    match path {
      Some(path) => Self::load_from(path),
      None => {
        warn!("could not determine data directory; favorites will not persist");
        Self::in_memory()
      }
    }
  }

  /// Open the store backed by the given file, loading any existing
  /// contents. A missing, empty or corrupt file yields an empty set.
  pub fn load_from(path: PathBuf) -> Self {
    let characters = match std::fs::read_to_string(&path) {
      Ok(contents) if contents.trim().is_empty() => Vec::new(),
      Ok(contents) => match serde_json::from_str(&contents) {
        Ok(characters) => characters,
        Err(err) => {
          warn!(path = %path.display(), %err, "favorites file corrupt, starting empty");
          Vec::new()
        }
      },
      Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
      Err(err) => {
        warn!(path = %path.display(), %err, "could not read favorites, starting empty");
        Vec::new()
      }
    };

    debug!(count = characters.len(), "loaded favorites");
    Self {
      characters: Mutex::new(characters),
      path: Some(path),
    }
  }

  /// Store with no backing file; mutations live for the session only.
  pub fn in_memory() -> Self {
    Self {
      characters: Mutex::new(Vec::new()),
      path: None,
    }
  }

  fn characters(&self) -> MutexGuard<'_, Vec<Character>> {
    self.characters.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Toggle membership: insert a full copy of the character if absent,
  /// remove the record (and any local edits with it) if present.
  pub fn toggle(&self, character: &Character) {
    let mut characters = self.characters();
    match characters.iter().position(|c| c.url == character.url) {
      Some(idx) => {
        characters.remove(idx);
      }
      None => characters.push(character.clone()),
    }
    self.persist(&characters);
  }

  /// Apply a partial update to an existing favorite's overridable fields.
  /// A no-op when the id is not favorited; editing never creates records.
  pub fn update_fields(&self, id: &str, update: &FavoriteUpdate) {
    let mut characters = self.characters();
    let Some(character) = characters.iter_mut().find(|c| c.url == id) else {
      debug!(id, "ignoring edit for non-favorited character");
      return;
    };

    if let Some(height) = &update.height {
      character.height = height.clone();
    }
    if let Some(gender) = update.gender {
      character.gender = gender;
    }
    self.persist(&characters);
  }

  pub fn is_favorite(&self, id: &str) -> bool {
    self.characters().iter().any(|c| c.url == id)
  }

  /// Current record for an id, with any local edits applied.
  pub fn get(&self, id: &str) -> Option<Character> {
    self.characters().iter().find(|c| c.url == id).cloned()
  }

  /// Snapshot of the whole set, in insertion order.
  pub fn all(&self) -> Vec<Character> {
    self.characters().clone()
  }

  pub fn len(&self) -> usize {
    self.characters().len()
  }

  pub fn is_empty(&self) -> bool {
    self.characters().is_empty()
  }

  /// Write the set to disk. Failures are logged and swallowed: the
  /// in-memory set stays authoritative for the rest of the session.
  fn persist(&self, characters: &[Character]) {
    let Some(path) = &self.path else { return };

    let result = serde_json::to_string_pretty(characters)
      .map_err(std::io::Error::other)
      .and_then(|json| {
        if let Some(parent) = path.parent() {
          std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
      });

    if let Err(err) = result {
      warn!(path = %path.display(), %err, "failed to persist favorites");
    }
  }
}
