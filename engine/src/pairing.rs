//! Tile-pairing state machine.
//!
//! ```text
//!            select A                 select B, partner(A) == B
//!   Idle ─────────────▶ OneSelected ───────────────────────────▶ Idle (A, B removed)
//!    ▲                    │   ▲  │
//!    └────── select A ────┘   │  │ select B, partner(A) != B
//!                             │  ▼
//!                  deadline   Error [A, B]   (all selections ignored)
//!                  passed ────┘
//! ```
//!
//! Time is passed in by the caller. The machine never sleeps or spawns; the
//! frame loop calls [`PairingMachine::tick`] and the countdown resolves there.

use std::time::{Duration, Instant};

use capquiz_types::{MatchRelation, Tile, TileId, TileSet, TileVisual};

/// How long a mismatched pair stays red before the second pick is dropped.
pub const DEFAULT_ERROR_DELAY: Duration = Duration::from_millis(3000);

/// Externally visible state of the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingState {
    Idle,
    OneSelected,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    OneSelected {
        first: TileId,
    },
    Error {
        first: TileId,
        second: TileId,
        until: Instant,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// First tile of a pair picked.
    Selected,
    /// The sole selected tile was clicked again.
    Deselected,
    /// The two tiles were partners and have been removed.
    Matched { remaining: usize },
    /// The two tiles were not partners; the error countdown started.
    Mismatched,
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// A mismatch is on screen and input is disabled until it reverts.
    InputLocked,
    /// The tile is not on the board (already matched, or never existed).
    NotActive,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundStats {
    /// Two-tile comparisons made.
    pub attempts: u32,
    pub matches: u32,
    pub mistakes: u32,
}

#[derive(Debug, Clone)]
pub struct PairingMachine {
    tiles: Vec<Tile>,
    relation: MatchRelation,
    phase: Phase,
    error_delay: Duration,
    total_pairs: usize,
    stats: RoundStats,
}

impl PairingMachine {
    #[must_use]
    pub fn new(set: TileSet, error_delay: Duration) -> Self {
        let total_pairs = set.pair_count();
        Self {
            tiles: set.tiles,
            relation: set.relation,
            phase: Phase::Idle,
            error_delay,
            total_pairs,
            stats: RoundStats::default(),
        }
    }

    /// Active tiles in display order.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    #[must_use]
    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.iter().find(|tile| tile.id() == id)
    }

    #[must_use]
    pub fn contains(&self, id: TileId) -> bool {
        self.tile(id).is_some()
    }

    #[must_use]
    pub fn state(&self) -> PairingState {
        match self.phase {
            Phase::Idle => PairingState::Idle,
            Phase::OneSelected { .. } => PairingState::OneSelected,
            Phase::Error { .. } => PairingState::Error,
        }
    }

    /// Currently selected tiles, first pick first.
    #[must_use]
    pub fn selection(&self) -> Vec<TileId> {
        match self.phase {
            Phase::Idle => Vec::new(),
            Phase::OneSelected { first } => vec![first],
            Phase::Error { first, second, .. } => vec![first, second],
        }
    }

    #[must_use]
    pub fn is_selected(&self, id: TileId) -> bool {
        match self.phase {
            Phase::Idle => false,
            Phase::OneSelected { first } => first == id,
            Phase::Error { first, second, .. } => first == id || second == id,
        }
    }

    /// True while a confirmed mismatch is displayed. Input is disabled.
    #[must_use]
    pub fn error_flag(&self) -> bool {
        matches!(self.phase, Phase::Error { .. })
    }

    /// Time left before the mismatch reverts, if one is showing.
    #[must_use]
    pub fn error_remaining(&self, now: Instant) -> Option<Duration> {
        match self.phase {
            Phase::Error { until, .. } => Some(until.saturating_duration_since(now)),
            _ => None,
        }
    }

    #[must_use]
    pub fn visual(&self, id: TileId) -> TileVisual {
        match self.phase {
            Phase::Error { first, second, .. } if id == first || id == second => TileVisual::Error,
            _ if self.is_selected(id) => TileVisual::Selected,
            _ => TileVisual::Default,
        }
    }

    #[must_use]
    pub fn total_pairs(&self) -> usize {
        self.total_pairs
    }

    #[must_use]
    pub fn remaining_pairs(&self) -> usize {
        self.tiles.len() / 2
    }

    #[must_use]
    pub fn stats(&self) -> RoundStats {
        self.stats
    }

    /// All pairs matched. A board built from no records is complete from the start.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn select(&mut self, id: TileId, now: Instant) -> SelectOutcome {
        if self.error_flag() {
            return SelectOutcome::Ignored(IgnoreReason::InputLocked);
        }
        if !self.contains(id) {
            return SelectOutcome::Ignored(IgnoreReason::NotActive);
        }

        match self.phase {
            Phase::Idle => {
                self.phase = Phase::OneSelected { first: id };
                SelectOutcome::Selected
            }
            Phase::OneSelected { first } if first == id => {
                self.phase = Phase::Idle;
                SelectOutcome::Deselected
            }
            Phase::OneSelected { first } => {
                self.stats.attempts += 1;
                if self.relation.is_pair(first, id) {
                    self.tiles.retain(|tile| tile.id() != first && tile.id() != id);
                    self.stats.matches += 1;
                    self.phase = Phase::Idle;
                    SelectOutcome::Matched {
                        remaining: self.tiles.len(),
                    }
                } else {
                    self.stats.mistakes += 1;
                    self.phase = Phase::Error {
                        first,
                        second: id,
                        until: now + self.error_delay,
                    };
                    SelectOutcome::Mismatched
                }
            }
            Phase::Error { .. } => SelectOutcome::Ignored(IgnoreReason::InputLocked),
        }
    }

    /// Fires the error timer if its deadline has passed. Returns true when a
    /// mismatch was reverted.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.phase {
            Phase::Error { first, until, .. } if now >= until => {
                self.phase = Phase::OneSelected { first };
                true
            }
            _ => false,
        }
    }
}
