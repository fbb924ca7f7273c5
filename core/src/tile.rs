//! Tile and grid value types.
//!
//! A [`Grid`] stores `size * size` cells in row-major order (indices
//! `0..size` are row 0, and so on). Every stored [`Tile`] records its own
//! row and column, and the grid keeps the two in agreement: tiles only
//! enter through [`Grid::insert`], which checks bounds, occupancy and value.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Smallest board edge accepted by [`Grid::new`].
pub const MIN_BOARD_SIZE: usize = 2;
/// Largest board edge accepted by [`Grid::new`].
pub const MAX_BOARD_SIZE: usize = 8;
/// Value of the smallest tile unless configured otherwise.
pub const DEFAULT_BASE: u32 = 2;
/// Largest accepted base; leaves room for doubling and the level targets.
pub const MAX_BASE: u32 = 1 << 16;

/// Reject a base of zero or one too large to double within `u32`.
pub(crate) fn check_base(base: u32) -> Result<()> {
    if (1..=MAX_BASE).contains(&base) {
        Ok(())
    } else {
        Err(Error::InvalidBase(base))
    }
}

/// Opaque tile identity. Survives slides and merges so a view can animate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileId(pub u64);

impl TileId {
    /// The id following this one.
    pub fn next(self) -> TileId {
        TileId(self.0 + 1)
    }
}

/// A numbered piece occupying one cell.
///
/// Tiles are never changed in place; moving or doubling one produces a new
/// value with the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    id: TileId,
    value: u32,
    row: usize,
    col: usize,
}

impl Tile {
    /// Create a tile. The value must be positive; board-specific checks
    /// (bounds, base multiple) happen when it is inserted into a grid.
    pub fn new(id: TileId, value: u32, row: usize, col: usize) -> Result<Tile> {
        if value == 0 {
            return Err(Error::InvalidTileValue { value, base: 0 });
        }
        Ok(Tile { id, value, row, col })
    }

    /// Tile with a value already known to be positive.
    pub(crate) fn placed(id: TileId, value: u32, row: usize, col: usize) -> Tile {
        Tile { id, value, row, col }
    }

    pub fn id(&self) -> TileId {
        self.id
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    /// Whether the two tiles may merge. Tiles whose double would not fit in
    /// a `u32` never merge.
    pub fn can_merge_with(&self, other: &Tile) -> bool {
        self.value == other.value && self.value <= u32::MAX / 2
    }

    /// Same tile at another cell.
    pub(crate) fn moved_to(self, row: usize, col: usize) -> Tile {
        Tile { row, col, ..self }
    }

    /// Same tile with its value doubled, at another cell.
    pub(crate) fn doubled_at(self, row: usize, col: usize) -> Tile {
        Tile {
            value: self.value * 2,
            row,
            col,
            ..self
        }
    }
}

/// Square board of optional tiles.
#[derive(Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    base: u32,
    cells: Vec<Option<Tile>>,
}

impl Grid {
    /// Create an empty `size x size` grid with the default base of 2.
    pub fn new(size: usize) -> Result<Grid> {
        Grid::with_base(size, DEFAULT_BASE)
    }

    /// Create an empty grid whose smallest tile value is `base`.
    pub fn with_base(size: usize, base: u32) -> Result<Grid> {
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
            return Err(Error::InvalidBoardSize(size));
        }
        check_base(base)?;
        Ok(Grid {
            size,
            base,
            cells: vec![None; size * size],
        })
    }

    /// Build a grid from row-major values where 0 marks an empty cell.
    ///
    /// Ids are assigned 1, 2, 3, ... in row-major order. Mostly useful for
    /// setting up positions in tests and tools.
    pub fn from_values(size: usize, values: &[u32]) -> Result<Grid> {
        let mut grid = Grid::new(size)?;
        if values.len() != size * size {
            return Err(Error::CellCountMismatch {
                expected: size * size,
                actual: values.len(),
            });
        }
        let mut id = TileId(1);
        for (idx, &value) in values.iter().enumerate() {
            if value == 0 {
                continue;
            }
            grid.insert(Tile::new(id, value, idx / size, idx % size)?)?;
            id = id.next();
        }
        Ok(grid)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    /// Place a tile, rejecting out-of-bounds cells, occupied cells and values
    /// that are not `base * 2^k`.
    pub fn insert(&mut self, tile: Tile) -> Result<()> {
        let idx = self.index(tile.row, tile.col)?;
        if !self.is_valid_value(tile.value) {
            return Err(Error::InvalidTileValue {
                value: tile.value,
                base: self.base,
            });
        }
        if self.cells[idx].is_some() {
            return Err(Error::CellOccupied {
                row: tile.row,
                col: tile.col,
            });
        }
        self.cells[idx] = Some(tile);
        Ok(())
    }

    /// Take the tile out of a cell.
    pub fn remove(&mut self, row: usize, col: usize) -> Result<Tile> {
        let idx = self.index(row, col)?;
        self.cells[idx].take().ok_or(Error::CellEmpty { row, col })
    }

    /// Tile at a cell, `None` when empty or out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<&Tile> {
        if row >= self.size || col >= self.size {
            return None;
        }
        self.cells[row * self.size + col].as_ref()
    }

    /// Tiles in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.cells.iter().flatten()
    }

    pub fn tile_count(&self) -> usize {
        self.tiles().count()
    }

    /// Empty cells as `(row, col)` in row-major order.
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_none())
            .map(|(idx, _)| (idx / self.size, idx % self.size))
            .collect()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Largest tile value present, 0 for an empty grid.
    pub fn max_value(&self) -> u32 {
        self.tiles().map(Tile::value).max().unwrap_or(0)
    }

    /// Largest id present, used to continue id allocation.
    pub fn max_id(&self) -> Option<TileId> {
        self.tiles().map(Tile::id).max()
    }

    /// Row-major values with 0 for empty cells.
    pub fn values(&self) -> Vec<u32> {
        self.cells
            .iter()
            .map(|cell| cell.map_or(0, |t| t.value))
            .collect()
    }

    /// An empty grid with the same size and base.
    pub(crate) fn cleared(&self) -> Grid {
        Grid {
            size: self.size,
            base: self.base,
            cells: vec![None; self.cells.len()],
        }
    }

    /// Store a tile known to be in bounds, valid and on an empty cell.
    pub(crate) fn place(&mut self, tile: Tile) {
        let idx = tile.row * self.size + tile.col;
        debug_assert!(self.cells[idx].is_none());
        self.cells[idx] = Some(tile);
    }

    fn index(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.size || col >= self.size {
            return Err(Error::OutOfBounds {
                row,
                col,
                size: self.size,
            });
        }
        Ok(row * self.size + col)
    }

    fn is_valid_value(&self, value: u32) -> bool {
        value % self.base == 0 && (value / self.base).is_power_of_two()
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grid {{ size: {}, base: {} }}", self.size, self.base)?;
        for row in 0..self.size {
            for col in 0..self.size {
                match self.get(row, col) {
                    Some(tile) => write!(f, "{:6}", tile.value)?,
                    None => write!(f, "     .")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let border = format!("+{}", "------+".repeat(self.size));
        writeln!(f, "{border}")?;
        for row in 0..self.size {
            write!(f, "|")?;
            for col in 0..self.size {
                match self.get(row, col) {
                    Some(tile) => write!(f, "{:^6}|", tile.value)?,
                    None => write!(f, "      |")?,
                }
            }
            writeln!(f)?;
            writeln!(f, "{border}")?;
        }
        Ok(())
    }
}
