//! Capital Quiz engine - application state without rendering.
//!
//! [`App`] owns the round lifecycle:
//!
//! ```text
//! Loading --fetch ok--> Playing(PairingMachine) --all pairs matched--> complete
//!    |                                                                    |
//!    +--fetch err--> Failed                     restart <-----------------+
//! ```
//!
//! The fetch is the only asynchronous step. It runs on the tokio runtime and
//! reports back over a oneshot channel that [`App::tick`] polls, so every
//! state change still happens on the frame loop.

mod config;
mod pairing;

pub use config::{
    AppConfig, ConfigError, DEFAULT_SAMPLE_SIZE, QuizConfig, QuizSection, QuizSettings,
    config_path,
};
pub use pairing::{
    DEFAULT_ERROR_DELAY, IgnoreReason, PairingMachine, PairingState, RoundStats, SelectOutcome,
};

pub use capquiz_providers::{CountryProvider, FetchError};
pub use capquiz_types::{
    CountryRecord, Tile, TileArea, TileId, TileKind, TileSet, TileVisual, UiOptions,
};

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::oneshot;
use tracing::{debug, error, info};

type FetchResult = Result<Vec<CountryRecord>, FetchError>;

enum LoadState {
    Loading {
        rx: oneshot::Receiver<FetchResult>,
    },
    Playing(PairingMachine),
    Failed(String),
}

/// Borrowed view of the round for the renderer.
#[derive(Debug, Clone, Copy)]
pub enum RoundView<'a> {
    Loading,
    Failed(&'a str),
    Playing(&'a PairingMachine),
}

/// Keyboard focus movement across the tile grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusMove {
    Left,
    Right,
    Up,
    Down,
}

pub struct App {
    settings: QuizSettings,
    provider: Arc<dyn CountryProvider>,
    load: LoadState,
    round: u32,
    focus: usize,
    grid_columns: usize,
    tile_areas: Vec<TileArea>,
    board_hidden: bool,
    tick: usize,
    should_quit: bool,
}

impl App {
    /// Creates the app and starts fetching the first round.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(settings: QuizSettings, provider: Arc<dyn CountryProvider>) -> Self {
        let mut app = Self::idle(settings, provider);
        app.start_round();
        app
    }

    /// Starts directly on a prepared board, skipping the fetch.
    pub fn with_board(
        settings: QuizSettings,
        provider: Arc<dyn CountryProvider>,
        set: TileSet,
    ) -> Self {
        let mut app = Self::idle(settings, provider);
        app.round = 1;
        app.load = LoadState::Playing(PairingMachine::new(set, app.settings.error_delay));
        app
    }

    fn idle(settings: QuizSettings, provider: Arc<dyn CountryProvider>) -> Self {
        Self {
            settings,
            provider,
            load: LoadState::Failed(String::new()),
            round: 0,
            focus: 0,
            grid_columns: 1,
            tile_areas: Vec::new(),
            board_hidden: false,
            tick: 0,
            should_quit: false,
        }
    }

    fn start_round(&mut self) {
        let (tx, rx) = oneshot::channel();
        let provider = Arc::clone(&self.provider);
        let sample_size = self.settings.sample_size;

        self.round = self.round.wrapping_add(1);
        info!(round = self.round, sample_size, "Fetching countries");

        tokio::spawn(async move {
            let result = provider.fetch_sample(sample_size).await;
            // Receiver is gone if a newer round replaced this one.
            let _ = tx.send(result);
        });

        self.load = LoadState::Loading { rx };
        self.focus = 0;
        self.tile_areas.clear();
    }

    /// Begins a new round. Only allowed once the current one is over.
    pub fn restart(&mut self) -> bool {
        if !self.can_restart() {
            return false;
        }
        self.start_round();
        true
    }

    #[must_use]
    pub fn can_restart(&self) -> bool {
        match &self.load {
            LoadState::Loading { .. } => false,
            LoadState::Failed(_) => true,
            LoadState::Playing(machine) => machine.is_complete(),
        }
    }

    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// Advances the frame: collects a finished fetch and fires the mismatch timer.
    pub fn tick_at(&mut self, now: Instant) {
        self.tick = self.tick.wrapping_add(1);
        self.poll_fetch();

        if let LoadState::Playing(machine) = &mut self.load
            && machine.tick(now)
        {
            debug!(selection = ?machine.selection(), "Mismatch reverted");
        }
    }

    fn poll_fetch(&mut self) {
        let result = match &mut self.load {
            LoadState::Loading { rx } => match rx.try_recv() {
                Ok(result) => result.map_err(|err| err.to_string()),
                Err(oneshot::error::TryRecvError::Empty) => return,
                Err(oneshot::error::TryRecvError::Closed) => {
                    Err("country fetch ended without a result".to_string())
                }
            },
            _ => return,
        };

        self.load = match result {
            Ok(records) => {
                let set = capquiz_types::build_tiles(&records, &mut rand::rng());
                info!(
                    round = self.round,
                    countries = records.len(),
                    tiles = set.tiles.len(),
                    "Round ready"
                );
                LoadState::Playing(PairingMachine::new(set, self.settings.error_delay))
            }
            Err(message) => {
                error!(round = self.round, "Country fetch failed: {message}");
                LoadState::Failed(message)
            }
        };
        self.focus = 0;
    }

    #[must_use]
    pub fn round_view(&self) -> RoundView<'_> {
        match &self.load {
            LoadState::Loading { .. } => RoundView::Loading,
            LoadState::Failed(message) => RoundView::Failed(message),
            LoadState::Playing(machine) => RoundView::Playing(machine),
        }
    }

    #[must_use]
    pub fn machine(&self) -> Option<&PairingMachine> {
        match &self.load {
            LoadState::Playing(machine) => Some(machine),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.load, LoadState::Loading { .. })
    }

    pub fn click_tile(&mut self, id: TileId) -> SelectOutcome {
        self.click_tile_at(id, Instant::now())
    }

    pub fn click_tile_at(&mut self, id: TileId, now: Instant) -> SelectOutcome {
        let LoadState::Playing(machine) = &mut self.load else {
            return SelectOutcome::Ignored(IgnoreReason::NotActive);
        };

        let outcome = machine.select(id, now);
        match outcome {
            SelectOutcome::Matched { remaining } => {
                info!(tile = %id, remaining, "Pair matched");
                if machine.is_complete() {
                    let stats = machine.stats();
                    info!(
                        round = self.round,
                        attempts = stats.attempts,
                        mistakes = stats.mistakes,
                        "Round complete"
                    );
                }
                self.clamp_focus();
            }
            SelectOutcome::Mismatched => {
                debug!(selection = ?machine.selection(), "Mismatch");
            }
            SelectOutcome::Ignored(reason) => {
                debug!(tile = %id, ?reason, "Click ignored");
            }
            SelectOutcome::Selected | SelectOutcome::Deselected => {}
        }
        outcome
    }

    /// Clicks whatever tile was drawn under the given cell.
    pub fn click_position(&mut self, column: u16, row: u16) -> Option<SelectOutcome> {
        let id = self.tile_at(column, row)?;
        if let Some(index) = self.tile_index(id) {
            self.focus = index;
        }
        Some(self.click_tile(id))
    }

    #[must_use]
    pub fn tile_at(&self, column: u16, row: u16) -> Option<TileId> {
        self.tile_areas
            .iter()
            .find(|area| area.contains(column, row))
            .map(|area| area.id)
    }

    /// Clicks the tile under the keyboard cursor.
    pub fn activate_focused(&mut self) -> Option<SelectOutcome> {
        let id = self.focused_tile()?;
        Some(self.click_tile(id))
    }

    #[must_use]
    pub fn focused_tile(&self) -> Option<TileId> {
        if self.focus >= self.focusable_count() {
            return None;
        }
        self.machine()?.tiles().get(self.focus).map(Tile::id)
    }

    /// Tiles the cursor may visit: the ones drawn last frame, or every active
    /// tile before the first layout is recorded.
    fn focusable_count(&self) -> usize {
        if self.board_hidden {
            return 0;
        }
        let active = self.machine().map_or(0, |m| m.tiles().len());
        if self.tile_areas.is_empty() {
            active
        } else {
            active.min(self.tile_areas.len())
        }
    }

    #[must_use]
    pub fn focus_index(&self) -> usize {
        self.focus
    }

    pub fn move_focus(&mut self, direction: FocusMove) {
        let count = self.focusable_count();
        if count == 0 {
            self.focus = 0;
            return;
        }
        let columns = self.grid_columns.max(1);
        let focus = self.focus.min(count - 1);
        self.focus = match direction {
            FocusMove::Left => focus.saturating_sub(1),
            FocusMove::Right => (focus + 1).min(count - 1),
            FocusMove::Up => focus.checked_sub(columns).unwrap_or(focus),
            FocusMove::Down => {
                if focus + columns < count {
                    focus + columns
                } else {
                    focus
                }
            }
        };
    }

    fn clamp_focus(&mut self) {
        let count = self.focusable_count();
        self.focus = self.focus.min(count.saturating_sub(1));
    }

    fn tile_index(&self, id: TileId) -> Option<usize> {
        self.machine()?.tiles().iter().position(|tile| tile.id() == id)
    }

    /// Records where tiles were drawn, for mouse hit-testing and focus movement.
    pub fn set_tile_layout(&mut self, areas: Vec<TileArea>, columns: usize) {
        self.tile_areas = areas;
        self.grid_columns = columns.max(1);
        self.board_hidden = false;
    }

    /// The board did not fit on screen: nothing is clickable or focusable
    /// until a layout is recorded again.
    pub fn hide_board(&mut self) {
        self.tile_areas.clear();
        self.board_hidden = true;
    }

    #[must_use]
    pub fn board_hidden(&self) -> bool {
        self.board_hidden
    }

    #[must_use]
    pub fn tile_areas(&self) -> &[TileArea] {
        &self.tile_areas
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        self.settings.ui
    }

    #[must_use]
    pub fn round(&self) -> u32 {
        self.round
    }

    #[must_use]
    pub fn tick_count(&self) -> usize {
        self.tick
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn request_quit(&mut self) {
        self.should_quit = true;
    }
}
