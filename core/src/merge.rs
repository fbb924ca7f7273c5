//! Slide-and-merge transform.
//!
//! Each line (a row for horizontal moves, a column for vertical ones) is
//! read starting from the edge the tiles move toward. Adjacent equal tiles
//! merge once; the merged tile keeps the id of the tile nearer the edge.

use crate::tile::{Grid, Tile, TileId};
use crate::Direction;

/// One pairwise merge performed during a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Merge {
    /// Tile that stays on the board, now holding `value`.
    pub survivor: TileId,
    /// Tile that disappeared into the survivor.
    pub absorbed: TileId,
    /// Value after merging.
    pub value: u32,
    pub row: usize,
    pub col: usize,
}

/// Result of sliding a grid in one direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub grid: Grid,
    /// Sum of the values of all merged tiles.
    pub score_delta: u32,
    pub merges: Vec<Merge>,
    /// Whether any tile changed position or value.
    pub moved: bool,
}

/// Slide all tiles toward `direction`, merging equal neighbours.
pub fn slide(grid: &Grid, direction: Direction) -> MoveOutcome {
    let size = grid.size();
    let mut next = grid.cleared();
    let mut score_delta = 0;
    let mut merges = Vec::new();
    let mut moved = false;

    for line in 0..size {
        let cells: Vec<(usize, usize)> = (0..size)
            .map(|k| line_cell(direction, line, k, size))
            .collect();
        let tiles: Vec<Tile> = cells
            .iter()
            .filter_map(|&(row, col)| grid.get(row, col).copied())
            .collect();

        let mut write_idx = 0;
        let mut i = 0;
        while i < tiles.len() {
            let (row, col) = cells[write_idx];
            let lead = tiles[i];
            let placed = match tiles.get(i + 1) {
                Some(absorbed) if lead.can_merge_with(absorbed) => {
                    let merged = lead.doubled_at(row, col);
                    score_delta += merged.value();
                    merges.push(Merge {
                        survivor: lead.id(),
                        absorbed: absorbed.id(),
                        value: merged.value(),
                        row,
                        col,
                    });
                    i += 2;
                    merged
                }
                _ => {
                    i += 1;
                    lead.moved_to(row, col)
                }
            };
            moved |= placed != lead;
            next.place(placed);
            write_idx += 1;
        }
    }

    MoveOutcome {
        grid: next,
        score_delta,
        merges,
        moved,
    }
}

/// Whether sliding toward `direction` would change the grid.
pub fn can_slide(grid: &Grid, direction: Direction) -> bool {
    slide(grid, direction).moved
}

/// Legal directions as `[Up, Down, Left, Right]`.
pub fn legal_directions(grid: &Grid) -> [bool; 4] {
    Direction::all().map(|direction| can_slide(grid, direction))
}

/// Cell at distance `k` from the movement edge on the given line.
fn line_cell(direction: Direction, line: usize, k: usize, size: usize) -> (usize, usize) {
    match direction {
        Direction::Left => (line, k),
        Direction::Right => (line, size - 1 - k),
        Direction::Up => (k, line),
        Direction::Down => (size - 1 - k, line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide_row(values: [u32; 4], direction: Direction) -> (Vec<u32>, u32) {
        let mut board = [0u32; 16];
        board[..4].copy_from_slice(&values);
        let grid = Grid::from_values(4, &board).unwrap();
        let outcome = slide(&grid, direction);
        (outcome.grid.values()[..4].to_vec(), outcome.score_delta)
    }

    // -------------------------------------------------------------------------
    // Line merge rules
    // -------------------------------------------------------------------------

    #[test]
    fn test_compress_simple() {
        assert_eq!(slide_row([0, 2, 0, 4], Direction::Left), (vec![2, 4, 0, 0], 0));
    }

    #[test]
    fn test_merge_simple() {
        assert_eq!(slide_row([2, 2, 0, 0], Direction::Left), (vec![4, 0, 0, 0], 4));
    }

    #[test]
    fn test_merge_two_pairs() {
        assert_eq!(slide_row([2, 2, 4, 4], Direction::Left), (vec![4, 8, 0, 0], 12));
    }

    #[test]
    fn test_three_equal_merges_first_pair_only() {
        assert_eq!(slide_row([2, 2, 2, 0], Direction::Left), (vec![4, 2, 0, 0], 4));
        assert_eq!(slide_row([0, 2, 2, 2], Direction::Right), (vec![0, 0, 2, 4], 4));
    }

    #[test]
    fn test_no_double_merge() {
        // [4, 2, 2, 0] becomes [4, 4, 0, 0], not [8, 0, 0, 0]
        assert_eq!(slide_row([4, 2, 2, 0], Direction::Left), (vec![4, 4, 0, 0], 4));
    }

    #[test]
    fn test_no_double_merge_chain() {
        assert_eq!(slide_row([2, 2, 2, 2], Direction::Left), (vec![4, 4, 0, 0], 8));
    }

    #[test]
    fn test_merge_with_gaps() {
        assert_eq!(slide_row([2, 0, 2, 0], Direction::Left), (vec![4, 0, 0, 0], 4));
    }

    // -------------------------------------------------------------------------
    // Whole-board moves
    // -------------------------------------------------------------------------

    #[test]
    fn test_move_left() {
        let grid =
            Grid::from_values(4, &[2, 2, 0, 0, 0, 4, 4, 0, 2, 0, 2, 0, 8, 8, 8, 8]).unwrap();
        let outcome = slide(&grid, Direction::Left);
        assert_eq!(
            outcome.grid.values(),
            vec![4, 0, 0, 0, 8, 0, 0, 0, 4, 0, 0, 0, 16, 16, 0, 0]
        );
        assert_eq!(outcome.score_delta, 4 + 8 + 4 + 32);
        assert_eq!(outcome.merges.len(), 5);
    }

    #[test]
    fn test_move_right() {
        let grid =
            Grid::from_values(4, &[2, 2, 0, 0, 0, 4, 4, 0, 2, 0, 2, 0, 8, 8, 8, 8]).unwrap();
        let outcome = slide(&grid, Direction::Right);
        assert_eq!(
            outcome.grid.values(),
            vec![0, 0, 0, 4, 0, 0, 0, 8, 0, 0, 0, 4, 0, 0, 16, 16]
        );
        assert_eq!(outcome.score_delta, 4 + 8 + 4 + 32);
    }

    #[test]
    fn test_move_up() {
        let grid =
            Grid::from_values(4, &[2, 0, 2, 8, 2, 4, 0, 8, 0, 4, 2, 8, 0, 0, 0, 8]).unwrap();
        let outcome = slide(&grid, Direction::Up);
        assert_eq!(
            outcome.grid.values(),
            vec![4, 8, 4, 16, 0, 0, 0, 16, 0, 0, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(outcome.score_delta, 4 + 8 + 4 + 32);
    }

    #[test]
    fn test_move_down() {
        let grid =
            Grid::from_values(4, &[2, 0, 2, 8, 2, 4, 0, 8, 0, 4, 2, 8, 0, 0, 0, 8]).unwrap();
        let outcome = slide(&grid, Direction::Down);
        assert_eq!(
            outcome.grid.values(),
            vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 16, 4, 8, 4, 16]
        );
        assert_eq!(outcome.score_delta, 4 + 8 + 4 + 32);
    }

    // -------------------------------------------------------------------------
    // Identity tracking
    // -------------------------------------------------------------------------

    #[test]
    fn test_survivor_is_tile_nearest_edge() {
        // ids: 2@(0,1)=1, 2@(0,2)=2, 2@(0,3)=3
        let grid = Grid::from_values(4, &[0, 2, 2, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0])
            .unwrap();

        let left = slide(&grid, Direction::Left);
        assert_eq!(
            left.merges,
            vec![Merge {
                survivor: TileId(1),
                absorbed: TileId(2),
                value: 4,
                row: 0,
                col: 0
            }]
        );
        assert_eq!(left.grid.get(0, 1).map(Tile::id), Some(TileId(3)));

        let right = slide(&grid, Direction::Right);
        assert_eq!(right.merges[0].survivor, TileId(3));
        assert_eq!(right.merges[0].absorbed, TileId(2));
        assert_eq!(right.grid.get(0, 2).map(Tile::id), Some(TileId(1)));
    }

    #[test]
    fn test_ids_preserved_on_plain_slide() {
        let grid = Grid::from_values(3, &[0, 0, 2, 0, 4, 0, 0, 0, 0]).unwrap();
        let outcome = slide(&grid, Direction::Left);
        assert_eq!(outcome.grid.get(0, 0).map(Tile::id), Some(TileId(1)));
        assert_eq!(outcome.grid.get(1, 0).map(Tile::id), Some(TileId(2)));
        assert!(outcome.moved);
    }

    // -------------------------------------------------------------------------
    // Legal moves
    // -------------------------------------------------------------------------

    #[test]
    fn test_unchanged_board_not_moved() {
        let grid = Grid::from_values(4, &[2, 0, 0, 0, 4, 0, 0, 0, 8, 0, 0, 0, 16, 0, 0, 0])
            .unwrap();
        let outcome = slide(&grid, Direction::Left);
        assert!(!outcome.moved);
        assert_eq!(outcome.grid, grid);
        assert_eq!(legal_directions(&grid), [false, false, false, true]);
    }

    #[test]
    fn test_no_legal_moves_on_locked_board() {
        let grid =
            Grid::from_values(4, &[2, 4, 2, 4, 4, 2, 4, 2, 2, 4, 2, 4, 4, 2, 4, 2]).unwrap();
        assert_eq!(legal_directions(&grid), [false, false, false, false]);
    }

    #[test]
    fn test_top_value_pair_stays_put() {
        let mut grid = Grid::with_base(2, 1).unwrap();
        grid.insert(Tile::new(TileId(1), 1 << 31, 0, 0).unwrap()).unwrap();
        grid.insert(Tile::new(TileId(2), 1 << 31, 0, 1).unwrap()).unwrap();
        let outcome = slide(&grid, Direction::Left);
        assert!(!outcome.moved);
        assert!(outcome.merges.is_empty());
        assert_eq!(outcome.grid, grid);
    }
}
