//! Random tile placement.

use rand::Rng;

use crate::error::{Error, Result};
use crate::tile::{check_base, Grid, Tile, TileId, DEFAULT_BASE};

/// Chance of spawning a double-base tile in classic play.
pub const DEFAULT_FOUR_PROBABILITY: f64 = 0.1;

/// How new tiles are chosen after an accepted move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRule {
    base: u32,
    four_probability: f64,
}

impl Default for SpawnRule {
    fn default() -> Self {
        SpawnRule {
            base: DEFAULT_BASE,
            four_probability: DEFAULT_FOUR_PROBABILITY,
        }
    }
}

impl SpawnRule {
    pub fn new(base: u32, four_probability: f64) -> Result<SpawnRule> {
        check_base(base)?;
        if !(0.0..=1.0).contains(&four_probability) {
            return Err(Error::InvalidProbability(four_probability));
        }
        Ok(SpawnRule {
            base,
            four_probability,
        })
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn four_probability(&self) -> f64 {
        self.four_probability
    }

    /// Pick a uniformly random empty cell and a value for it.
    ///
    /// Returns `None` when the grid is full. The grid itself is left alone;
    /// the caller inserts the tile.
    pub fn spawn<R: Rng>(&self, grid: &Grid, id: TileId, rng: &mut R) -> Option<Tile> {
        let empty_cells = grid.empty_cells();
        if empty_cells.is_empty() {
            return None;
        }

        let (row, col) = empty_cells[rng.gen_range(0..empty_cells.len())];
        let value = if rng.gen_bool(self.four_probability) {
            self.base * 2
        } else {
            self.base
        };
        Some(Tile::placed(id, value, row, col))
    }
}
