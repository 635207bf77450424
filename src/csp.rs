//! Filling the goal board as a constraint satisfaction problem.
//!
//! Starting from an all-blank grid, each cell except the bottom-right one
//! receives a distinct value from 1 to 8. A value must exceed the filled
//! cells directly above and to the left of it. Every solver returns the
//! sequence of partial boards from the empty grid to the goal, one cell
//! filled per step, or an empty vector on failure.

use crate::config::CspConfig;
use crate::engine::{Board, BoardKey, BOARD_SIZE, CELL_COUNT};
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Cell that stays blank in the filled board.
pub const FIXED_BLANK: usize = CELL_COUNT - 1;

/// Conflict score of a value that does not exceed its predecessor.
pub const VIOLATION_PENALTY: u32 = 9;

/// Values in `1..=8` not yet placed on `board`, ascending.
pub fn domain(board: &Board) -> Vec<u8> {
    (1..CELL_COUNT as u8)
        .filter(|v| !board.cells().contains(v))
        .collect()
}

/// Blank cells that still need a value, row-major.
pub fn unfilled_cells(board: &Board) -> Vec<usize> {
    (0..CELL_COUNT)
        .filter(|&i| i != FIXED_BLANK && board.cells()[i] == 0)
        .collect()
}

/// Largest filled value directly above or left of `index`.
fn predecessor(board: &Board, index: usize) -> Option<u8> {
    let cells = board.cells();
    let above = (index >= BOARD_SIZE).then(|| cells[index - BOARD_SIZE]);
    let left = (index % BOARD_SIZE > 0).then(|| cells[index - 1]);
    above.into_iter().chain(left).filter(|&v| v != 0).max()
}

/// True if `value` is unused and exceeds the filled neighbours above and to
/// the left of `index`.
pub fn is_consistent(board: &Board, index: usize, value: u8) -> bool {
    !board.cells().contains(&value) && predecessor(board, index).map_or(true, |p| value > p)
}

/// How badly `value` fits at `index`: its gap above the predecessor,
/// `0` without a predecessor, [`VIOLATION_PENALTY`] if it does not exceed it.
pub fn conflicts(board: &Board, index: usize, value: u8) -> u32 {
    match predecessor(board, index) {
        None => 0,
        Some(p) if value > p => u32::from(value - p),
        Some(_) => VIOLATION_PENALTY,
    }
}

struct Filler {
    forward_checking: bool,
    attempted: HashSet<BoardKey>,
    path: Vec<Board>,
}

impl Filler {
    fn fill(&mut self, board: Board) -> bool {
        let key = board.key();
        if !self.attempted.insert(key) {
            return false;
        }
        self.path.push(board);
        if board.is_goal() {
            return true;
        }

        if let Some(&index) = unfilled_cells(&board).first() {
            for value in domain(&board) {
                if self.forward_checking && !is_consistent(&board, index, value) {
                    continue;
                }
                if self.fill(board.with_cell(index, value)) {
                    return true;
                }
            }
        }

        self.path.pop();
        self.attempted.remove(&key);
        false
    }
}

fn run_filler(stage: &str, forward_checking: bool) -> Vec<Board> {
    let mut filler = Filler {
        forward_checking,
        attempted: HashSet::new(),
        path: Vec::new(),
    };
    if filler.fill(Board::empty()) {
        info!("{}: filled the board in {} steps", stage, filler.path.len() - 1);
        filler.path
    } else {
        info!("{}: no assignment reaches the goal", stage);
        Vec::new()
    }
}

/// Backtracking fill: the first unfilled cell takes each unused value in
/// ascending order. Partial boards already attempted are skipped.
///
/// # Examples
/// ```
/// use eight_puzzle_solver::csp::fill_backtracking;
/// use eight_puzzle_solver::engine::Board;
///
/// let path = fill_backtracking();
/// assert_eq!(path.first(), Some(&Board::empty()));
/// assert_eq!(path.last(), Some(&Board::goal()));
/// ```
pub fn fill_backtracking() -> Vec<Board> {
    run_filler("fill_backtracking", false)
}

/// Backtracking fill that discards a value before assigning it unless it
/// exceeds the filled neighbours above and to the left.
pub fn fill_forward_checking() -> Vec<Board> {
    run_filler("fill_forward_checking", true)
}

/// Min-conflicts fill.
///
/// Each step picks a random unfilled cell and gives it the unused value with
/// the fewest [`conflicts`], ties to the smallest value. Cells are never
/// reassigned, so a run that does not end on the goal fails.
pub fn min_conflicts<R: Rng + ?Sized>(config: &CspConfig, rng: &mut R) -> Vec<Board> {
    let mut board = Board::empty();
    let mut path = vec![board];

    for step in 0..config.max_steps {
        if board.is_goal() {
            info!("min_conflicts: goal after {} steps", step);
            return path;
        }
        let Some(&index) = unfilled_cells(&board).choose(rng) else {
            break;
        };
        let Some(value) = domain(&board)
            .into_iter()
            .min_by_key(|&v| conflicts(&board, index, v))
        else {
            break;
        };
        debug!(
            "min_conflicts: cell {} <- {} (conflicts {})",
            index,
            value,
            conflicts(&board, index, value)
        );
        board = board.with_cell(index, value);
        path.push(board);
    }

    if board.is_goal() {
        return path;
    }
    info!("min_conflicts: stalled at\n{}", board);
    Vec::new()
}
