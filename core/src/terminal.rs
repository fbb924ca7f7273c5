//! Win and loss conditions.

use crate::tile::Grid;

/// True when the grid is full and no horizontal or vertical neighbours share
/// a value.
pub fn is_game_over(grid: &Grid) -> bool {
    if !grid.is_full() {
        return false;
    }
    let size = grid.size();
    for row in 0..size {
        for col in 0..size {
            let Some(tile) = grid.get(row, col) else {
                continue;
            };
            let neighbours = [grid.get(row, col + 1), grid.get(row + 1, col)];
            if neighbours.into_iter().flatten().any(|n| tile.can_merge_with(n)) {
                return false;
            }
        }
    }
    true
}

/// True once any tile has reached `target`.
pub fn is_level_complete(grid: &Grid, target: u32) -> bool {
    grid.max_value() >= target
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_over_with_empty_cells() {
        let grid = Grid::from_values(2, &[2, 4, 8, 0]).unwrap();
        assert!(!is_game_over(&grid));
    }

    #[test]
    fn test_game_over_no_moves() {
        let grid =
            Grid::from_values(4, &[2, 4, 2, 4, 4, 2, 4, 2, 2, 4, 2, 4, 4, 2, 4, 2]).unwrap();
        assert!(is_game_over(&grid));
    }

    #[test]
    fn test_not_over_can_merge_horizontal() {
        let grid = Grid::from_values(
            4,
            &[2, 2, 4, 8, 4, 8, 16, 32, 8, 16, 32, 64, 16, 32, 64, 128],
        )
        .unwrap();
        assert!(!is_game_over(&grid));
    }

    #[test]
    fn test_not_over_can_merge_vertical() {
        let grid = Grid::from_values(
            4,
            &[2, 4, 8, 16, 2, 8, 16, 32, 4, 16, 32, 64, 8, 32, 64, 128],
        )
        .unwrap();
        assert!(!is_game_over(&grid));
    }

    #[test]
    fn test_level_complete_threshold() {
        let grid = Grid::from_values(2, &[64, 2, 0, 0]).unwrap();
        assert!(!is_level_complete(&grid, 128));
        assert!(is_level_complete(&grid, 64));
        assert!(is_level_complete(&grid, 32));
        assert!(!is_level_complete(&Grid::new(2).unwrap(), 2));
    }
}
