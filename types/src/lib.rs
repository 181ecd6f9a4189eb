//! Core domain types for Capital Quiz.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

mod tiles;

pub use tiles::{
    CAPITAL_CODE_SUFFIX, MatchRelation, TileSet, build_tiles, build_tiles_ordered, tile_pair,
};

use serde::Deserialize;
use std::fmt;

// ============================================================================
// Country data
// ============================================================================

/// A country as the quiz sees it, independent of the upstream API shape.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CountryRecord {
    pub code: String,
    pub name: String,
    pub capital: String,
}

impl CountryRecord {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        capital: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            capital: capital.into(),
        }
    }
}

// ============================================================================
// Tiles
// ============================================================================

/// Identity of a tile within one [`TileSet`].
///
/// Two tiles may never share an id inside the same set, even if their codes
/// collide. The match relation is keyed on this, not on the code string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(u32);

impl TileId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileKind {
    Country,
    Capital,
}

/// One clickable label on the board. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    id: TileId,
    code: String,
    name: String,
    kind: TileKind,
}

impl Tile {
    pub(crate) fn new(
        id: TileId,
        code: impl Into<String>,
        name: impl Into<String>,
        kind: TileKind,
    ) -> Self {
        Self {
            id,
            code: code.into(),
            name: name.into(),
            kind,
        }
    }

    #[must_use]
    pub fn id(&self) -> TileId {
        self.id
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> TileKind {
        self.kind
    }
}

/// Visual state the renderer draws a tile in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileVisual {
    #[default]
    Default,
    Selected,
    Error,
}

// ============================================================================
// UI support
// ============================================================================

/// UI configuration options derived from config/environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiOptions {
    pub ascii_only: bool,
    pub high_contrast: bool,
    pub reduced_motion: bool,
}

/// Screen rectangle a tile occupied in the last drawn frame.
///
/// Kept free of ratatui types so the engine can hit-test mouse clicks
/// without depending on the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileArea {
    pub id: TileId,
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl TileArea {
    #[must_use]
    pub fn contains(&self, column: u16, row: u16) -> bool {
        column >= self.x
            && row >= self.y
            && u32::from(column) < u32::from(self.x) + u32::from(self.width)
            && u32::from(row) < u32::from(self.y) + u32::from(self.height)
    }
}
