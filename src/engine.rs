//! Core state model for the 8-puzzle.
//!
//! This module defines the pieces every solver shares:
//! - `Board`: a 3x3 grid holding the tiles 1-8 and the blank (0).
//! - `Action`: the four directions the blank can move in.
//! - `BoardKey`: a compact, hashable and order-preserving encoding of a board.
//!
//! Boards are small `Copy` values; every transition returns a new board and
//! never mutates its input.
use crate::error::{Error, Result};
use crate::heuristics::{inversion_count, manhattan_distance};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Width and height of the board.
pub const BOARD_SIZE: usize = 3;

/// Number of cells on the board.
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// The solved configuration `1 2 3 / 4 5 6 / 7 8 0`.
pub const GOAL: Board = Board {
    cells: [1, 2, 3, 4, 5, 6, 7, 8, 0],
};

/// A move of the blank cell.
///
/// The declaration order (Up, Down, Left, Right) is the canonical expansion
/// order used by every solver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
}

impl Action {
    /// All actions in canonical order.
    pub const ALL: [Action; 4] = [Action::Up, Action::Down, Action::Left, Action::Right];

    /// Returns the action that undoes this one.
    ///
    /// # Examples
    /// ```
    /// use eight_puzzle_solver::engine::Action;
    /// assert_eq!(Action::Up.inverse(), Action::Down);
    /// assert_eq!(Action::Left.inverse(), Action::Right);
    /// ```
    pub fn inverse(self) -> Action {
        match self {
            Action::Up => Action::Down,
            Action::Down => Action::Up,
            Action::Left => Action::Right,
            Action::Right => Action::Left,
        }
    }

    /// Row and column offset of the blank for this action.
    fn delta(self) -> (isize, isize) {
        match self {
            Action::Up => (-1, 0),
            Action::Down => (1, 0),
            Action::Left => (0, -1),
            Action::Right => (0, 1),
        }
    }

    /// Single-letter representation, used when printing plans.
    pub fn to_char(self) -> char {
        match self {
            Action::Up => 'U',
            Action::Down => 'D',
            Action::Left => 'L',
            Action::Right => 'R',
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Canonical key of a board, suitable for visited sets.
///
/// The nine cells are packed as 4-bit nibbles, first cell most significant,
/// so two boards with the same tile placement always produce the same key
/// and key order equals row-major lexicographic board order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoardKey(u64);

/// A 3x3 sliding-tile board.
///
/// Boards built through [`Board::from_cells`], [`Board::from_rows`] or parsing
/// always hold a permutation of `0..=8`, and every legal transition preserves
/// that. The only other boards are the partially filled grids of the CSP fill
/// solver, which start from [`Board::empty`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "[[u8; BOARD_SIZE]; BOARD_SIZE]", try_from = "[[u8; BOARD_SIZE]; BOARD_SIZE]")]
pub struct Board {
    cells: [u8; CELL_COUNT],
}

impl Board {
    /// Returns the goal board.
    pub fn goal() -> Self {
        GOAL
    }

    /// Creates an all-blank grid. Only meaningful as the start of a CSP fill.
    pub fn empty() -> Self {
        Board {
            cells: [0; CELL_COUNT],
        }
    }

    /// Creates a board from its cells in row-major order.
    ///
    /// # Errors
    /// Returns `Error::TileOutOfRange` if a value exceeds 8 and
    /// `Error::DuplicateTile` if a value appears twice.
    ///
    /// # Examples
    /// ```
    /// use eight_puzzle_solver::engine::Board;
    /// let board = Board::from_cells([1, 2, 3, 4, 5, 6, 7, 0, 8]).unwrap();
    /// assert_eq!(board.blank_position(), (2, 1));
    /// assert!(Board::from_cells([1, 1, 3, 4, 5, 6, 7, 0, 8]).is_err());
    /// ```
    pub fn from_cells(cells: [u8; CELL_COUNT]) -> Result<Self> {
        let mut seen = [false; CELL_COUNT];
        for (index, &value) in cells.iter().enumerate() {
            let slot = seen
                .get_mut(value as usize)
                .ok_or(Error::TileOutOfRange { value, index })?;
            if *slot {
                return Err(Error::DuplicateTile { value });
            }
            *slot = true;
        }
        Ok(Board { cells })
    }

    /// Creates a board from three rows.
    pub fn from_rows(rows: [[u8; BOARD_SIZE]; BOARD_SIZE]) -> Result<Self> {
        let mut cells = [0; CELL_COUNT];
        for (r, row) in rows.iter().enumerate() {
            cells[r * BOARD_SIZE..(r + 1) * BOARD_SIZE].copy_from_slice(row);
        }
        Self::from_cells(cells)
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> &[u8; CELL_COUNT] {
        &self.cells
    }

    /// The board as three rows.
    pub fn rows(&self) -> [[u8; BOARD_SIZE]; BOARD_SIZE] {
        let mut rows = [[0; BOARD_SIZE]; BOARD_SIZE];
        for (i, &value) in self.cells.iter().enumerate() {
            rows[i / BOARD_SIZE][i % BOARD_SIZE] = value;
        }
        rows
    }

    /// Returns the value at row `r`, column `c`.
    ///
    /// # Panics
    /// Panics if `r` or `c` is outside the board.
    pub fn get(&self, r: usize, c: usize) -> u8 {
        self.cells[r * BOARD_SIZE + c]
    }

    /// Row-major index of the blank. On a CSP grid this is the first empty cell.
    pub fn blank_index(&self) -> usize {
        self.cells
            .iter()
            .position(|&v| v == 0)
            .unwrap_or(CELL_COUNT - 1)
    }

    /// `(row, column)` of the blank.
    pub fn blank_position(&self) -> (usize, usize) {
        let index = self.blank_index();
        (index / BOARD_SIZE, index % BOARD_SIZE)
    }

    /// Legal actions in canonical order.
    ///
    /// Corners have two, edges three and the centre four.
    pub fn actions(&self) -> Vec<Action> {
        Action::ALL
            .into_iter()
            .filter(|&action| self.target_index(action).is_some())
            .collect()
    }

    fn target_index(&self, action: Action) -> Option<usize> {
        let (r, c) = self.blank_position();
        let (dr, dc) = action.delta();
        let nr = r.checked_add_signed(dr)?;
        let nc = c.checked_add_signed(dc)?;
        if nr < BOARD_SIZE && nc < BOARD_SIZE {
            Some(nr * BOARD_SIZE + nc)
        } else {
            None
        }
    }

    /// Moves the blank in the given direction.
    ///
    /// Returns `None` if the blank would leave the grid. The receiver is
    /// never modified.
    ///
    /// # Examples
    /// ```
    /// use eight_puzzle_solver::engine::{Action, Board};
    /// let board = Board::from_cells([1, 2, 3, 4, 5, 6, 7, 0, 8]).unwrap();
    /// assert_eq!(board.apply(Action::Right), Some(Board::goal()));
    /// assert_eq!(board.apply(Action::Down), None);
    /// ```
    pub fn apply(&self, action: Action) -> Option<Board> {
        let target = self.target_index(action)?;
        Some(self.swap_cells(self.blank_index(), target))
    }

    /// All `(action, successor)` pairs in canonical order.
    pub fn successors(&self) -> Vec<(Action, Board)> {
        Action::ALL
            .into_iter()
            .filter_map(|action| self.apply(action).map(|next| (action, next)))
            .collect()
    }

    /// Successor boards in canonical order.
    pub fn neighbors(&self) -> Vec<Board> {
        self.successors().into_iter().map(|(_, b)| b).collect()
    }

    /// Returns the action leading from `self` to `next`, if they are one
    /// blank move apart.
    pub fn action_to(&self, next: &Board) -> Option<Action> {
        self.successors()
            .into_iter()
            .find(|(_, candidate)| candidate == next)
            .map(|(action, _)| action)
    }

    /// Returns a copy with cells `i` and `j` exchanged.
    pub fn swap_cells(&self, i: usize, j: usize) -> Board {
        let mut cells = self.cells;
        cells.swap(i, j);
        Board { cells }
    }

    /// Returns a copy with cell `index` set to `value`. Used by the CSP fill.
    pub(crate) fn with_cell(&self, index: usize, value: u8) -> Board {
        let mut cells = self.cells;
        cells[index] = value;
        Board { cells }
    }

    pub fn is_goal(&self) -> bool {
        *self == GOAL
    }

    /// Manhattan distance to the goal.
    pub fn heuristic(&self) -> u32 {
        manhattan_distance(self)
    }

    pub fn key(&self) -> BoardKey {
        BoardKey(
            self.cells
                .iter()
                .fold(0u64, |acc, &v| (acc << 4) | u64::from(v)),
        )
    }
}

impl Default for Board {
    fn default() -> Self {
        GOAL
    }
}

impl From<Board> for [[u8; BOARD_SIZE]; BOARD_SIZE] {
    fn from(board: Board) -> Self {
        board.rows()
    }
}

impl TryFrom<[[u8; BOARD_SIZE]; BOARD_SIZE]> for Board {
    type Error = Error;

    fn try_from(rows: [[u8; BOARD_SIZE]; BOARD_SIZE]) -> Result<Self> {
        Board::from_rows(rows)
    }
}

impl FromStr for Board {
    type Err = Error;

    /// Parses nine cells, ignoring whitespace, commas and slashes.
    /// `0`, `.` and `_` all denote the blank.
    fn from_str(s: &str) -> Result<Self> {
        let symbols: Vec<char> = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ',' && *c != '/')
            .collect();
        if symbols.len() != CELL_COUNT {
            return Err(Error::InvalidBoardLength {
                expected: CELL_COUNT,
                got: symbols.len(),
                context: s.to_string(),
            });
        }
        let mut cells = [0u8; CELL_COUNT];
        for (position, (cell, &symbol)) in cells.iter_mut().zip(&symbols).enumerate() {
            *cell = match symbol {
                '.' | '_' => 0,
                d if d.is_ascii_digit() => d as u8 - b'0',
                character => {
                    return Err(Error::InvalidCellCharacter {
                        character,
                        position,
                        context: s.to_string(),
                    })
                }
            };
        }
        Board::from_cells(cells)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..BOARD_SIZE {
            for c in 0..BOARD_SIZE {
                if c > 0 {
                    write!(f, " ")?;
                }
                match self.get(r, c) {
                    0 => write!(f, ".")?,
                    v => write!(f, "{}", v)?,
                }
            }
            if r < BOARD_SIZE - 1 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Parity check: a board can reach the goal iff its inversion count is even.
///
/// # Examples
/// ```
/// use eight_puzzle_solver::engine::{is_solvable, Board};
/// assert!(is_solvable(&Board::goal()));
/// let swapped = Board::from_cells([2, 1, 3, 4, 5, 6, 7, 8, 0]).unwrap();
/// assert!(!is_solvable(&swapped));
/// ```
pub fn is_solvable(board: &Board) -> bool {
    inversion_count(board) % 2 == 0
}

/// Random walk of `steps` blank moves starting at `board`.
///
/// The result is always reachable from `board`, so shuffling a solvable board
/// yields a solvable board.
pub fn shuffle<R: Rng + ?Sized>(board: &Board, steps: usize, rng: &mut R) -> Board {
    let mut current = *board;
    for _ in 0..steps {
        let neighbors = current.neighbors();
        if let Some(next) = neighbors.choose(rng) {
            current = *next;
        }
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn board(cells: [u8; 9]) -> Board {
        Board::from_cells(cells).unwrap()
    }

    #[test]
    fn test_goal_is_goal() {
        assert!(GOAL.is_goal());
        assert!(Board::goal().is_goal());
        assert!(!board([1, 2, 3, 4, 5, 6, 7, 0, 8]).is_goal());
    }

    #[test]
    fn test_action_counts_by_blank_position() {
        // Blank in a corner, on an edge and in the centre.
        assert_eq!(GOAL.actions(), vec![Action::Up, Action::Left]);
        assert_eq!(board([1, 2, 3, 4, 5, 6, 7, 0, 8]).actions().len(), 3);
        assert_eq!(board([1, 2, 3, 4, 0, 6, 7, 5, 8]).actions(), Action::ALL.to_vec());
    }

    #[test]
    fn test_apply_swaps_blank_without_mutating() {
        let start = board([1, 2, 3, 4, 0, 6, 7, 5, 8]);
        let up = start.apply(Action::Up).unwrap();
        assert_eq!(up, board([1, 0, 3, 4, 2, 6, 7, 5, 8]));
        assert_eq!(start, board([1, 2, 3, 4, 0, 6, 7, 5, 8]));
        assert_eq!(GOAL.apply(Action::Right), None);
        assert_eq!(GOAL.apply(Action::Down), None);
    }

    #[test]
    fn test_apply_inverse_round_trip() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..50 {
            let b = shuffle(&GOAL, 30, &mut rng);
            for action in b.actions() {
                let next = b.apply(action).unwrap();
                assert_eq!(next.apply(action.inverse()), Some(b));
            }
        }
    }

    #[test]
    fn test_successors_follow_canonical_order() {
        let centre = board([1, 2, 3, 4, 0, 6, 7, 5, 8]);
        let actions: Vec<Action> = centre.successors().iter().map(|(a, _)| *a).collect();
        assert_eq!(actions, Action::ALL.to_vec());
        assert_eq!(centre.neighbors().len(), 4);
    }

    #[test]
    fn test_action_to() {
        let start = board([1, 2, 3, 4, 5, 6, 7, 0, 8]);
        assert_eq!(start.action_to(&GOAL), Some(Action::Right));
        assert_eq!(GOAL.action_to(&GOAL), None);
    }

    #[test]
    fn test_key_identifies_placement() {
        let a = board([1, 2, 3, 4, 5, 6, 7, 0, 8]);
        let b = GOAL.apply(Action::Left).unwrap();
        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), GOAL.key());
        assert_eq!(GOAL.key(), BoardKey(0x1234_5678_0));
        assert!(a.key() < GOAL.key());
    }

    #[test]
    fn test_from_cells_rejects_invalid() {
        assert!(matches!(
            Board::from_cells([1, 2, 3, 4, 5, 6, 7, 8, 9]),
            Err(Error::TileOutOfRange { value: 9, index: 8 })
        ));
        assert!(matches!(
            Board::from_cells([1, 2, 3, 4, 5, 6, 7, 8, 8]),
            Err(Error::DuplicateTile { value: 8 })
        ));
    }

    #[test]
    fn test_parse_and_display() {
        let parsed: Board = "1 2 3 / 4 5 6 / 7 . 8".parse().unwrap();
        assert_eq!(parsed, board([1, 2, 3, 4, 5, 6, 7, 0, 8]));
        assert_eq!("123456780".parse::<Board>().unwrap(), GOAL);
        assert_eq!(parsed.to_string(), "1 2 3\n4 5 6\n7 . 8");
        assert!("12345678".parse::<Board>().is_err());
        assert!("12345678x".parse::<Board>().is_err());
    }

    #[test]
    fn test_rows_round_trip() {
        let rows = [[2, 6, 5], [0, 8, 7], [4, 3, 1]];
        let b = Board::from_rows(rows).unwrap();
        assert_eq!(b.rows(), rows);
        assert_eq!(b.get(1, 0), 0);
        assert_eq!(b.blank_position(), (1, 0));
    }

    #[test]
    fn test_serde_uses_rows() {
        let json = serde_json::to_string(&GOAL).unwrap();
        assert_eq!(json, "[[1,2,3],[4,5,6],[7,8,0]]");
        let back: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(back, GOAL);
        assert!(serde_json::from_str::<Board>("[[1,1,3],[4,5,6],[7,8,0]]").is_err());
    }

    #[test]
    fn test_shuffle_preserves_solvability() {
        let mut rng = SmallRng::seed_from_u64(42);
        for steps in [0, 1, 5, 20, 100] {
            let b = shuffle(&GOAL, steps, &mut rng);
            assert!(is_solvable(&b));
        }
        assert!(!is_solvable(&GOAL.swap_cells(0, 1)));
    }
}
