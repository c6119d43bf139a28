use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::favorites::FavoriteUpdate;
use crate::swapi::types::{Character, CharacterPage, Film, Planet, Starship};

/// Application events.
///
/// Everything the app reacts to flows through one channel: terminal
/// input, the tick timer, fetch fulfillments from spawned tasks, favorite
/// actions dispatched by key handlers, and deferred cache invalidations.
/// Each event passes through the override pipeline before it is handled.
#[derive(Debug)]
pub enum Event {
  /// Terminal key press
  Key(KeyEvent),
  /// Periodic tick for UI refresh
  Tick,
  /// A remote fetch settled
  Api(ApiEvent),
  /// A favorites mutation was requested
  Favorite(FavoriteAction),
  /// Deferred post-commit invalidation for one edited character
  Invalidate { id: String },
}

/// Fulfillment of one remote query. Each variant carries its own result
/// so every section of the UI gets an independent error state.
#[derive(Debug)]
pub enum ApiEvent {
  Characters {
    page: u32,
    search: String,
    result: Result<CharacterPage, String>,
  },
  Character {
    result: Result<Box<Character>, String>,
  },
  /// Homeworld of the character identified by `id`
  Planet {
    id: String,
    result: Result<Planet, String>,
  },
  /// Films of the character identified by `id`
  Films {
    id: String,
    result: Result<Vec<Film>, String>,
  },
  /// Starships of the character identified by `id`
  Starships {
    id: String,
    result: Result<Vec<Starship>, String>,
  },
}

#[derive(Debug)]
pub enum FavoriteAction {
  /// Toggle membership for a character
  Toggle(Box<Character>),
  /// Update a favorite's overridable fields
  UpdateFields { id: String, update: FavoriteUpdate },
}

/// Event handler that merges terminal input, a tick timer and events sent
/// by async tasks into one stream.
pub struct EventHandler {
  tx: mpsc::UnboundedSender<Event>,
  rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
  /// Create a new event handler with the given tick rate.
  pub fn new(tick_rate: Duration) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();

    let input_tx = tx.clone();
    tokio::task::spawn_blocking(move || loop {
      if event::poll(tick_rate).unwrap_or(false) {
        if let Ok(CrosstermEvent::Key(key)) = event::read() {
          if input_tx.send(Event::Key(key)).is_err() {
            break;
          }
        }
      } else if input_tx.send(Event::Tick).is_err() {
        break;
      }
    });

    Self { tx, rx }
  }

  /// Sender for async tasks and deferred follow-up events.
  pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
    self.tx.clone()
  }

  /// Receive the next event.
  pub async fn next(&mut self) -> Option<Event> {
    self.rx.recv().await
  }
}
