//! Tile generation and the country/capital match relation.

use std::collections::HashMap;

use rand::seq::SliceRandom;

use crate::{CountryRecord, Tile, TileId, TileKind};

/// Appended to a country code to form its capital tile's code.
pub const CAPITAL_CODE_SUFFIX: &str = "_capital";

/// Symmetric tile -> partner mapping. Built once, never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchRelation {
    partners: HashMap<TileId, TileId>,
}

impl MatchRelation {
    fn link(&mut self, a: TileId, b: TileId) {
        self.partners.insert(a, b);
        self.partners.insert(b, a);
    }

    #[must_use]
    pub fn partner(&self, id: TileId) -> Option<TileId> {
        self.partners.get(&id).copied()
    }

    #[must_use]
    pub fn is_pair(&self, a: TileId, b: TileId) -> bool {
        a != b && self.partner(a) == Some(b)
    }

    #[must_use]
    pub fn contains(&self, id: TileId) -> bool {
        self.partners.contains_key(&id)
    }

    /// Number of tiles covered by the relation (twice the number of pairs).
    #[must_use]
    pub fn len(&self) -> usize {
        self.partners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }
}

/// Output of the builder: the board's tiles plus the relation over them.
#[derive(Debug, Clone, Default)]
pub struct TileSet {
    pub tiles: Vec<Tile>,
    pub relation: MatchRelation,
}

impl TileSet {
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.tiles.len() / 2
    }

    #[must_use]
    pub fn find_by_code(&self, code: &str) -> Option<&Tile> {
        self.tiles.iter().find(|tile| tile.code() == code)
    }
}

/// Country tile followed by capital tile; ids `first_id` and `first_id + 1`.
#[must_use]
pub fn tile_pair(record: &CountryRecord, first_id: u32) -> [Tile; 2] {
    [
        Tile::new(
            TileId::new(first_id),
            record.code.as_str(),
            record.name.as_str(),
            TileKind::Country,
        ),
        Tile::new(
            TileId::new(first_id + 1),
            format!("{}{CAPITAL_CODE_SUFFIX}", record.code),
            record.capital.as_str(),
            TileKind::Capital,
        ),
    ]
}

/// Builds tiles in pairing order: country, capital, country, capital, ...
#[must_use]
pub fn build_tiles_ordered(records: &[CountryRecord]) -> TileSet {
    let mut tiles = Vec::with_capacity(records.len() * 2);
    let mut relation = MatchRelation::default();

    for (index, record) in records.iter().enumerate() {
        let [country, capital] = tile_pair(record, (index * 2) as u32);
        relation.link(country.id(), capital.id());
        tiles.push(country);
        tiles.push(capital);
    }

    TileSet { tiles, relation }
}

/// Builds tiles and shuffles them with `rng`. The relation is unaffected by
/// the shuffle since it is keyed on ids.
#[must_use]
pub fn build_tiles<R: rand::Rng + ?Sized>(records: &[CountryRecord], rng: &mut R) -> TileSet {
    let mut set = build_tiles_ordered(records);
    set.tiles.shuffle(rng);
    set
}
