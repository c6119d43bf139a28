use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;

use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use tokio::sync::mpsc;

use crate::cache::{CacheLayer, MemoryStore};
use crate::commands;
use crate::config::Config;
use crate::event::{ApiEvent, Event, EventHandler, FavoriteAction};
use crate::favorites::{FavoriteUpdate, FavoritesStore, OverridePipeline};
use crate::query::QueryState;
use crate::swapi::cached_client::CachedSwapiClient;
use crate::swapi::types::{Character, CharacterPage, Film, Gender, Planet, Starship};
use crate::ui;

/// Input mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  Normal,
  Command,
  Search,
}

/// Which field of the edit dialog has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
  Height,
  Gender,
}

/// State of the modal favorite-edit dialog
#[derive(Debug, Clone)]
pub struct EditState {
  pub id: String,
  pub name: String,
  pub height: String,
  pub gender: Gender,
  pub field: EditField,
}

/// View state - each variant owns its data
#[derive(Debug)]
pub enum ViewState {
  CharacterList {
    page: u32,
    search: String,
    data: Option<CharacterPage>,
    selected: usize,
    loading: bool,
    error: Option<String>,
  },
  CharacterDetail {
    id: String,
    character: QueryState<Character>,
    homeworld: QueryState<Planet>,
    films: QueryState<Vec<Film>>,
    starships: QueryState<Vec<Starship>>,
  },
  Favorites {
    selected: usize,
  },
}

impl ViewState {
  fn character_list(page: u32, search: String) -> Self {
    ViewState::CharacterList {
      page,
      search,
      data: None,
      selected: 0,
      loading: true,
      error: None,
    }
  }

  fn character_detail(id: String) -> Self {
    ViewState::CharacterDetail {
      id,
      character: QueryState::Loading,
      homeworld: QueryState::Idle,
      films: QueryState::Idle,
      starships: QueryState::Idle,
    }
  }
}

/// Main application state
pub struct App {
  /// Navigation stack - root is always at index 0
  view_stack: Vec<ViewState>,

  mode: Mode,

  /// Command input buffer (after pressing :)
  command_input: String,

  /// Selected autocomplete suggestion index
  selected_suggestion: usize,

  /// Search input buffer (after pressing /)
  search_input: String,

  /// Modal favorite-edit dialog, when open
  edit: Option<EditState>,

  config: Config,

  /// Cached directory client
  swapi: CachedSwapiClient,

  /// Durable favorites, shared with the override pipeline
  favorites: Arc<FavoritesStore>,

  /// Interception stage every received event passes through
  pipeline: OverridePipeline<MemoryStore>,

  /// Event sender for async tasks and deferred follow-ups
  event_tx: mpsc::UnboundedSender<Event>,

  should_quit: bool,
}

impl App {
  pub fn new(config: Config, page: u32, search: String) -> Result<Self> {
    let favorites = Arc::new(match &config.favorites_path {
      Some(path) => FavoritesStore::load_from(path.clone()),
      None => FavoritesStore::open_default(),
    });

    let cache = CacheLayer::new(Arc::new(MemoryStore::new()))
      .with_stale_time(chrono::Duration::minutes(config.cache.stale_minutes));
    let pipeline = OverridePipeline::new(Arc::clone(&favorites), cache.store());
    let swapi = CachedSwapiClient::new(&config, cache)?;

    // Placeholder sender; replaced with the event handler's in run()
    let (tx, _rx) = mpsc::unbounded_channel();

    Ok(Self {
      view_stack: vec![ViewState::character_list(page.max(1), search)],
      mode: Mode::Normal,
      command_input: String::new(),
      selected_suggestion: 0,
      search_input: String::new(),
      edit: None,
      config,
      swapi,
      favorites,
      pipeline,
      event_tx: tx,
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut events = EventHandler::new(Duration::from_millis(250));
    self.event_tx = events.sender();

    self.refresh_character_list();

    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      if let Some(event) = events.next().await {
        // Every event passes through the override pipeline before it is
        // handled; fulfillments arrive here already rewritten
        let event = self.pipeline.intercept(event, &self.event_tx);
        self.handle_event(event);
      }
    }

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
  }

  // ===== accessors for rendering =====

  pub fn current_view(&self) -> Option<&ViewState> {
    self.view_stack.last()
  }

  pub fn mode(&self) -> Mode {
    self.mode
  }

  pub fn command_input(&self) -> &str {
    &self.command_input
  }

  pub fn search_input(&self) -> &str {
    &self.search_input
  }

  pub fn suggestions(&self) -> Vec<&'static commands::Command> {
    commands::get_suggestions(&self.command_input)
  }

  pub fn selected_suggestion(&self) -> usize {
    self.selected_suggestion
  }

  pub fn edit(&self) -> Option<&EditState> {
    self.edit.as_ref()
  }

  pub fn favorites(&self) -> &FavoritesStore {
    &self.favorites
  }

  pub fn page_size(&self) -> u32 {
    self.config.ui.page_size
  }

  // ===== event dispatch =====

  /// Send an event through the app's own queue, so it flows through the
  /// pipeline like every other event.
  fn dispatch(&self, event: Event) {
    let _ = self.event_tx.send(event);
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => {}
      Event::Api(api_event) => self.handle_api_event(api_event),
      Event::Favorite(action) => self.handle_favorite_action(action),
      Event::Invalidate { id } => self.handle_invalidated(&id),
    }
  }

  // ===== data fetching =====

  fn refresh_character_list(&mut self) {
    let Some(ViewState::CharacterList {
      page,
      search,
      loading,
      error,
      ..
    }) = self.view_stack.last_mut()
    else {
      return;
    };

    *loading = true;
    *error = None;
    let (page, search) = (*page, search.clone());
    let swapi = self.swapi.clone();
    let tx = self.event_tx.clone();

    tokio::spawn(async move {
      let result = swapi
        .get_characters(page, &search)
        .await
        .map_err(|e| e.to_string());
      let _ = tx.send(Event::Api(ApiEvent::Characters { page, search, result }));
    });
  }

  fn fetch_character(&self, id: String) {
    let swapi = self.swapi.clone();
    let tx = self.event_tx.clone();

    tokio::spawn(async move {
      let result = swapi
        .get_character(&id)
        .await
        .map(Box::new)
        .map_err(|e| e.to_string());
      let _ = tx.send(Event::Api(ApiEvent::Character { result }));
    });
  }

  /// Kick off the three dependent reads once the primary character has
  /// arrived. Each settles independently.
  fn fetch_character_relations(&mut self, character: &Character) {
    let id = character.url.clone();

    let homeworld = character.homeworld.clone();
    if homeworld.is_empty() {
      // No reference to resolve; the view renders this as Unknown
      if let Some(ViewState::CharacterDetail {
        homeworld: slot, ..
      }) = self.view_stack.last_mut()
      {
        *slot = QueryState::Success(Planet {
          url: String::new(),
          name: String::new(),
        });
      }
    } else {
      if let Some(ViewState::CharacterDetail {
        homeworld: slot, ..
      }) = self.view_stack.last_mut()
      {
        *slot = QueryState::Loading;
      }
      let swapi = self.swapi.clone();
      let tx = self.event_tx.clone();
      let id = id.clone();
      tokio::spawn(async move {
        let result = swapi.get_planet(&homeworld).await.map_err(|e| e.to_string());
        let _ = tx.send(Event::Api(ApiEvent::Planet { id, result }));
      });
    }

    let films = character.films.clone();
    if films.is_empty() {
      self.set_detail_films(&id, Ok(Vec::new()));
    } else {
      if let Some(ViewState::CharacterDetail { films: slot, .. }) = self.view_stack.last_mut() {
        *slot = QueryState::Loading;
      }
      let swapi = self.swapi.clone();
      let tx = self.event_tx.clone();
      let id = id.clone();
      tokio::spawn(async move {
        let result = swapi.get_films(&films).await.map_err(|e| e.to_string());
        let _ = tx.send(Event::Api(ApiEvent::Films { id, result }));
      });
    }

    let starships = character.starships.clone();
    if starships.is_empty() {
      self.set_detail_starships(&id, Ok(Vec::new()));
    } else {
      if let Some(ViewState::CharacterDetail {
        starships: slot, ..
      }) = self.view_stack.last_mut()
      {
        *slot = QueryState::Loading;
      }
      let swapi = self.swapi.clone();
      let tx = self.event_tx.clone();
      let id = id.clone();
      tokio::spawn(async move {
        let result = swapi.get_starships(&starships).await.map_err(|e| e.to_string());
        let _ = tx.send(Event::Api(ApiEvent::Starships { id, result }));
      });
    }
  }

  // ===== fulfillment handling =====

  fn handle_api_event(&mut self, event: ApiEvent) {
    match event {
      ApiEvent::Characters { page, search, result } => {
        let Some(ViewState::CharacterList {
          page: current_page,
          search: current_search,
          data,
          selected,
          loading,
          error,
        }) = self.view_stack.last_mut()
        else {
          return;
        };

        // Drop fulfillments for queries the view has moved past
        if page != *current_page || search != *current_search {
          return;
        }

        *loading = false;
        match result {
          Ok(payload) => {
            *selected = (*selected).min(payload.results.len().saturating_sub(1));
            *data = Some(payload);
            *error = None;
          }
          Err(e) => *error = Some(e),
        }
      }

      ApiEvent::Character { result } => {
        match result {
          Ok(fetched) => {
            let Some(ViewState::CharacterDetail { id, character, .. }) =
              self.view_stack.last_mut()
            else {
              return;
            };
            if fetched.url != *id {
              return;
            }
            let fetched = *fetched;
            *character = QueryState::Success(fetched.clone());
            self.fetch_character_relations(&fetched);
          }
          Err(e) => {
            if let Some(ViewState::CharacterDetail { character, .. }) = self.view_stack.last_mut()
            {
              *character = QueryState::Error(e);
            }
          }
        }
      }

      ApiEvent::Planet { id, result } => {
        if let Some(ViewState::CharacterDetail {
          id: current,
          homeworld,
          ..
        }) = self.view_stack.last_mut()
        {
          if id == *current {
            *homeworld = QueryState::from_result(result);
          }
        }
      }

      ApiEvent::Films { id, result } => self.set_detail_films(&id, result),

      ApiEvent::Starships { id, result } => self.set_detail_starships(&id, result),
    }
  }

  fn set_detail_films(&mut self, id: &str, result: Result<Vec<Film>, String>) {
    if let Some(ViewState::CharacterDetail {
      id: current, films, ..
    }) = self.view_stack.last_mut()
    {
      if id == current {
        *films = QueryState::from_result(result);
      }
    }
  }

  fn set_detail_starships(&mut self, id: &str, result: Result<Vec<Starship>, String>) {
    if let Some(ViewState::CharacterDetail {
      id: current,
      starships,
      ..
    }) = self.view_stack.last_mut()
    {
      if id == current {
        *starships = QueryState::from_result(result);
      }
    }
  }

  // ===== favorites =====

  fn handle_favorite_action(&mut self, action: FavoriteAction) {
    match action {
      FavoriteAction::Toggle(character) => {
        self.favorites.toggle(&character);
        self.clamp_favorites_selection();
      }
      FavoriteAction::UpdateFields { id, update } => {
        self.favorites.update_fields(&id, &update);
      }
    }
  }

  /// A favorite was edited and the stale cache entries are gone; refetch
  /// whatever the current view is reading so the new values show up.
  fn handle_invalidated(&mut self, id: &str) {
    match self.view_stack.last() {
      Some(ViewState::CharacterList { .. }) => self.refresh_character_list(),
      Some(ViewState::CharacterDetail { id: current, .. }) if current == id => {
        let id = id.to_string();
        if let Some(ViewState::CharacterDetail {
          character,
          homeworld,
          films,
          starships,
          ..
        }) = self.view_stack.last_mut()
        {
          *character = QueryState::Loading;
          *homeworld = QueryState::Idle;
          *films = QueryState::Idle;
          *starships = QueryState::Idle;
        }
        self.fetch_character(id);
      }
      _ => {}
    }
  }

  fn clamp_favorites_selection(&mut self) {
    let len = self.favorites.len();
    if let Some(ViewState::Favorites { selected }) = self.view_stack.last_mut() {
      *selected = (*selected).min(len.saturating_sub(1));
    }
  }

  /// The character the cursor is on, as currently displayed.
  fn selected_character(&self) -> Option<Character> {
    match self.view_stack.last()? {
      ViewState::CharacterList { data, selected, .. } => {
        data.as_ref()?.results.get(*selected).cloned()
      }
      ViewState::Favorites { selected } => self.favorites.all().get(*selected).cloned(),
      ViewState::CharacterDetail { character, .. } => character.data().cloned(),
    }
  }

  fn open_edit_dialog(&mut self) {
    let Some(character) = self.selected_character() else {
      return;
    };
    // Editing is only offered for favorites; the store's values are the
    // ones being edited
    let Some(fav) = self.favorites.get(&character.url) else {
      return;
    };

    self.edit = Some(EditState {
      id: fav.url,
      name: fav.name,
      height: fav.height,
      gender: fav.gender,
      field: EditField::Height,
    });
  }

  // ===== input =====

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    if self.edit.is_some() {
      self.handle_edit_key(key);
      return;
    }

    match self.mode {
      Mode::Normal => self.handle_normal_key(key),
      Mode::Command => self.handle_command_key(key),
      Mode::Search => self.handle_search_key(key),
    }
  }

  fn handle_normal_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Char('q') | KeyCode::Esc => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
          // The revealed view re-reads lazily; evicted entries refetch
          self.refresh_character_list();
        } else {
          self.should_quit = true;
        }
      }
      KeyCode::Char(':') => {
        self.mode = Mode::Command;
        self.command_input.clear();
        self.selected_suggestion = 0;
      }
      KeyCode::Char('/') => {
        if !matches!(self.view_stack.last(), Some(ViewState::CharacterList { .. })) {
          self.set_root(ViewState::character_list(1, String::new()));
        }
        self.mode = Mode::Search;
        self.search_input.clear();
      }
      KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
      KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
      KeyCode::Char('n') | KeyCode::Right => self.change_page(1),
      KeyCode::Char('p') | KeyCode::Left => self.change_page(-1),
      KeyCode::Enter => {
        if let Some(character) = self.selected_character() {
          if !matches!(self.view_stack.last(), Some(ViewState::CharacterDetail { .. })) {
            self.view_stack.push(ViewState::character_detail(character.url.clone()));
            self.fetch_character(character.url);
          }
        }
      }
      KeyCode::Char('f') => {
        if let Some(character) = self.selected_character() {
          self.dispatch(Event::Favorite(FavoriteAction::Toggle(Box::new(character))));
        }
      }
      KeyCode::Char('e') => self.open_edit_dialog(),
      KeyCode::Char('r') => self.refresh_current_view(),
      _ => {}
    }
  }

  fn handle_command_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.mode = Mode::Normal;
        self.command_input.clear();
      }
      KeyCode::Tab => {
        let count = self.suggestions().len();
        if count > 0 {
          self.selected_suggestion = (self.selected_suggestion + 1) % count;
        }
      }
      KeyCode::Backspace => {
        self.command_input.pop();
        self.selected_suggestion = 0;
      }
      KeyCode::Enter => {
        let command = commands::resolve(&self.command_input)
          .or_else(|| self.suggestions().into_iter().nth(self.selected_suggestion));
        self.mode = Mode::Normal;
        if let Some(command) = command {
          self.run_command(command.name);
        }
        self.command_input.clear();
      }
      KeyCode::Char(c) => {
        self.command_input.push(c);
        self.selected_suggestion = 0;
      }
      _ => {}
    }
  }

  fn handle_search_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.mode = Mode::Normal;
        self.search_input.clear();
      }
      KeyCode::Backspace => {
        self.search_input.pop();
      }
      KeyCode::Enter => {
        self.mode = Mode::Normal;
        let term = std::mem::take(&mut self.search_input);
        if let Some(ViewState::CharacterList { page, search, selected, .. }) =
          self.view_stack.last_mut()
        {
          *page = 1;
          *search = term;
          *selected = 0;
        }
        self.refresh_character_list();
      }
      KeyCode::Char(c) => self.search_input.push(c),
      _ => {}
    }
  }

  fn handle_edit_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.edit = None;
        return;
      }
      KeyCode::Enter => {
        if let Some(edit) = self.edit.take() {
          self.dispatch(Event::Favorite(FavoriteAction::UpdateFields {
            id: edit.id,
            update: FavoriteUpdate {
              height: Some(edit.height),
              gender: Some(edit.gender),
            },
          }));
        }
        return;
      }
      _ => {}
    }

    let Some(edit) = self.edit.as_mut() else { return };
    match key.code {
      KeyCode::Tab | KeyCode::Up | KeyCode::Down => {
        edit.field = match edit.field {
          EditField::Height => EditField::Gender,
          EditField::Gender => EditField::Height,
        };
      }
      KeyCode::Backspace if edit.field == EditField::Height => {
        edit.height.pop();
      }
      KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right if edit.field == EditField::Gender => {
        edit.gender = edit.gender.cycled();
      }
      KeyCode::Char(c) if edit.field == EditField::Height => {
        edit.height.push(c);
      }
      _ => {}
    }
  }

  // ===== navigation =====

  fn set_root(&mut self, view: ViewState) {
    self.view_stack.clear();
    self.view_stack.push(view);
    self.refresh_character_list();
  }

  fn run_command(&mut self, name: &str) {
    match name {
      "characters" => self.set_root(ViewState::character_list(1, String::new())),
      "favorites" => self.set_root(ViewState::Favorites { selected: 0 }),
      "quit" => self.should_quit = true,
      _ => {}
    }
  }

  fn refresh_current_view(&mut self) {
    match self.view_stack.last() {
      Some(ViewState::CharacterList { .. }) => self.refresh_character_list(),
      Some(ViewState::CharacterDetail { id, character, .. }) => {
        if character.is_loading() {
          return;
        }
        let id = id.clone();
        self.handle_invalidated(&id);
      }
      _ => {}
    }
  }

  fn move_selection(&mut self, delta: isize) {
    let list_len = match self.view_stack.last() {
      Some(ViewState::CharacterList { data, .. }) => {
        data.as_ref().map(|d| d.results.len()).unwrap_or(0)
      }
      Some(ViewState::Favorites { .. }) => self.favorites.len(),
      _ => return,
    };
    if list_len == 0 {
      return;
    }

    let selected = match self.view_stack.last_mut() {
      Some(ViewState::CharacterList { selected, .. })
      | Some(ViewState::Favorites { selected }) => selected,
      _ => return,
    };
    *selected = selected
      .saturating_add_signed(delta)
      .min(list_len - 1);
  }

  fn change_page(&mut self, delta: i32) {
    let page_size = self.page_size();
    let Some(ViewState::CharacterList { page, data, selected, .. }) = self.view_stack.last_mut()
    else {
      return;
    };

    let total = data.as_ref().map(|d| d.total_pages(page_size)).unwrap_or(1);
    let target = page.saturating_add_signed(delta).clamp(1, total.max(1));
    if target != *page {
      *page = target;
      *selected = 0;
      self.refresh_character_list();
    }
  }
}
