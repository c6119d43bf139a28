//! Per-section state for asynchronously fetched data.
//!
//! The detail view joins four independent remote reads; each gets its own
//! `QueryState` so a failure or slow fetch in one section never disturbs
//! the others.

/// The state of one remote query.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum QueryState<T> {
  /// Not started (e.g. waiting on the primary fetch for its inputs)
  #[default]
  Idle,
  /// Fetch in flight
  Loading,
  /// Fetch settled with data
  Success(T),
  /// Fetch settled with an error
  Error(String),
}

impl<T> QueryState<T> {
  pub fn is_loading(&self) -> bool {
    matches!(self, QueryState::Loading)
  }

  pub fn is_error(&self) -> bool {
    matches!(self, QueryState::Error(_))
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      QueryState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      QueryState::Error(e) => Some(e),
      _ => None,
    }
  }

  /// Fold a settled fetch result into a state.
  pub fn from_result(result: Result<T, String>) -> Self {
    match result {
      Ok(data) => QueryState::Success(data),
      Err(e) => QueryState::Error(e),
    }
  }
}
