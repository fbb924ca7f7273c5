//! Limited-use actions that bend the move rules.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::tile::Grid;

/// Power-up without its arguments, used for inventory bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    Undo,
    Smash,
    Shuffle,
}

/// A power-up as the player triggers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUp {
    /// Restore the board from before the last accepted move.
    Undo,
    /// Remove the tile at a cell.
    Smash { row: usize, col: usize },
    /// Scatter all tiles over random cells.
    Shuffle,
}

impl PowerUp {
    pub fn kind(self) -> PowerUpKind {
        match self {
            PowerUp::Undo => PowerUpKind::Undo,
            PowerUp::Smash { .. } => PowerUpKind::Smash,
            PowerUp::Shuffle => PowerUpKind::Shuffle,
        }
    }
}

/// Remaining charges per power-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpInventory {
    pub undo: u32,
    pub smash: u32,
    pub shuffle: u32,
}

impl Default for PowerUpInventory {
    fn default() -> Self {
        PowerUpInventory {
            undo: 1,
            smash: 1,
            shuffle: 1,
        }
    }
}

impl PowerUpInventory {
    /// No charges at all.
    pub fn empty() -> Self {
        PowerUpInventory {
            undo: 0,
            smash: 0,
            shuffle: 0,
        }
    }

    pub fn remaining(&self, kind: PowerUpKind) -> u32 {
        match kind {
            PowerUpKind::Undo => self.undo,
            PowerUpKind::Smash => self.smash,
            PowerUpKind::Shuffle => self.shuffle,
        }
    }

    /// Inventory with one charge of `kind` spent.
    pub fn consume(self, kind: PowerUpKind) -> Result<PowerUpInventory> {
        let mut next = self;
        let slot = match kind {
            PowerUpKind::Undo => &mut next.undo,
            PowerUpKind::Smash => &mut next.smash,
            PowerUpKind::Shuffle => &mut next.shuffle,
        };
        *slot = slot.checked_sub(1).ok_or(Error::PowerUpExhausted(kind))?;
        Ok(next)
    }
}

/// Grid with the tile at `(row, col)` removed.
pub fn smash(grid: &Grid, row: usize, col: usize) -> Result<Grid> {
    let mut next = grid.clone();
    next.remove(row, col)?;
    Ok(next)
}

/// Grid with the same tiles (ids and values) placed on random cells.
pub fn shuffle<R: Rng>(grid: &Grid, rng: &mut R) -> Grid {
    let size = grid.size();
    let mut cells: Vec<(usize, usize)> = (0..size * size).map(|i| (i / size, i % size)).collect();
    cells.shuffle(rng);

    let mut next = grid.cleared();
    for (tile, &(row, col)) in grid.tiles().zip(cells.iter()) {
        next.place(tile.moved_to(row, col));
    }
    next
}
