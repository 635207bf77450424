use crate::engine::{Board, BOARD_SIZE, GOAL};

/// Goal `(row, column)` of a tile value. Tile `v` belongs at index `v - 1`,
/// the blank at the last cell.
fn goal_position(value: u8) -> (usize, usize) {
    let index = if value == 0 {
        BOARD_SIZE * BOARD_SIZE - 1
    } else {
        value as usize - 1
    };
    (index / BOARD_SIZE, index % BOARD_SIZE)
}

/// Sum of the Manhattan distances of all non-blank tiles to their goal cells.
///
/// Admissible and consistent for unit-cost blank moves, which is what makes
/// A* and IDA* return shortest paths.
///
/// # Examples
/// ```
/// use eight_puzzle_solver::engine::Board;
/// use eight_puzzle_solver::heuristics::manhattan_distance;
///
/// assert_eq!(manhattan_distance(&Board::goal()), 0);
/// let board = Board::from_cells([1, 2, 3, 4, 5, 6, 0, 7, 8]).unwrap();
/// assert_eq!(manhattan_distance(&board), 2);
/// ```
pub fn manhattan_distance(board: &Board) -> u32 {
    board
        .cells()
        .iter()
        .enumerate()
        .filter(|&(_, &value)| value != 0)
        .map(|(index, &value)| {
            let (r, c) = (index / BOARD_SIZE, index % BOARD_SIZE);
            let (gr, gc) = goal_position(value);
            (r.abs_diff(gr) + c.abs_diff(gc)) as u32
        })
        .sum()
}

/// Number of non-blank tiles that are not on their goal cell.
///
/// Used as the pruning test of the forward-checking backtracker.
pub fn misplaced_tiles(board: &Board) -> u32 {
    board
        .cells()
        .iter()
        .zip(GOAL.cells())
        .filter(|&(&value, &goal)| value != 0 && value != goal)
        .count() as u32
}

/// Number of pairs of non-blank tiles that appear in the wrong relative order
/// when the board is read row by row.
///
/// Blank moves change this count by an even amount, so its parity decides
/// whether a board can reach the goal.
pub fn inversion_count(board: &Board) -> u32 {
    let tiles: Vec<u8> = board.cells().iter().copied().filter(|&v| v != 0).collect();
    let mut inversions = 0;
    for i in 0..tiles.len() {
        for j in i + 1..tiles.len() {
            if tiles[i] > tiles[j] {
                inversions += 1;
            }
        }
    }
    inversions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{shuffle, Action};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_manhattan_distance_demo_board() {
        // 2 6 5 / . 8 7 / 4 3 1
        let board = Board::from_cells([2, 6, 5, 0, 8, 7, 4, 3, 1]).unwrap();
        // 2:1 6:2 5:2 8:1 7:3 4:1 3:3 1:4
        assert_eq!(manhattan_distance(&board), 17);
    }

    #[test]
    fn test_manhattan_distance_changes_by_one_per_move() {
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..100 {
            let board = shuffle(&GOAL, 25, &mut rng);
            let h = manhattan_distance(&board);
            for next in board.neighbors() {
                assert_eq!(h.abs_diff(manhattan_distance(&next)), 1);
            }
        }
    }

    #[test]
    fn test_misplaced_tiles() {
        assert_eq!(misplaced_tiles(&GOAL), 0);
        let one_off = GOAL.apply(Action::Left).unwrap();
        assert_eq!(misplaced_tiles(&one_off), 1);
        let two_off = one_off.apply(Action::Up).unwrap();
        assert_eq!(misplaced_tiles(&two_off), 2);
    }

    #[test]
    fn test_inversion_count() {
        assert_eq!(inversion_count(&GOAL), 0);
        let board = Board::from_cells([2, 1, 3, 4, 5, 6, 7, 8, 0]).unwrap();
        assert_eq!(inversion_count(&board), 1);
        let reversed = Board::from_cells([8, 7, 6, 5, 4, 3, 2, 1, 0]).unwrap();
        assert_eq!(inversion_count(&reversed), 28);
    }
}
