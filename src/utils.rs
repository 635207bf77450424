use crate::engine::{Action, Board, BOARD_SIZE, CELL_COUNT};
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Parses an array of row strings into a `Board`.
///
/// Each string holds one row, top row first. Within a row, cells may be
/// separated by whitespace or written back to back. `0`, `.` and `_` denote
/// the blank. Exactly `BOARD_SIZE` rows of `BOARD_SIZE` cells are required and
/// the result must be a permutation of `0..=8`.
///
/// # Arguments
/// * `rows`: A slice of string slices, one per board row.
///
/// # Returns
/// * `Ok(Board)` if parsing is successful.
/// * `Err(Error)` if:
///     - The number of rows is not `BOARD_SIZE`.
///     - A row does not contain exactly `BOARD_SIZE` cells.
///     - An unrecognized character is encountered.
///     - A tile is repeated.
///
/// # Examples
/// ```
/// use eight_puzzle_solver::utils::board_from_str_array;
/// use eight_puzzle_solver::engine::Board;
///
/// let board = board_from_str_array(&["1 2 3", "4 5 6", "7 8 ."]).unwrap();
/// assert_eq!(board, Board::goal());
///
/// assert!(board_from_str_array(&["123", "456"]).is_err());
/// assert!(board_from_str_array(&["123", "456", "77."]).is_err());
/// ```
pub fn board_from_str_array(rows: &[&str]) -> Result<Board> {
    if rows.len() != BOARD_SIZE {
        return Err(Error::InvalidBoardLength {
            expected: CELL_COUNT,
            got: rows.iter().map(|r| row_symbols(r).len()).sum(),
            context: rows.join("/"),
        });
    }

    for row in rows {
        let got = row_symbols(row).len();
        if got != BOARD_SIZE {
            return Err(Error::InvalidBoardLength {
                expected: BOARD_SIZE,
                got,
                context: row.to_string(),
            });
        }
    }

    rows.join(" ").parse()
}

fn row_symbols(row: &str) -> Vec<char> {
    row.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Reads a board file: three non-empty lines of three cells each.
/// Blank lines and lines starting with `#` are ignored.
pub fn read_board_file(path: impl AsRef<Path>) -> Result<Board> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| Error::Io {
        operation: format!("read board file {}", path.display()),
        source,
    })?;

    let lines: Vec<&str> = content
        .lines()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && !s.starts_with('#'))
        .collect();

    board_from_str_array(&lines)
}

/// Actions linking consecutive boards of `path`, or `None` if some pair is
/// not exactly one blank move apart.
pub fn path_actions(path: &[Board]) -> Option<Vec<Action>> {
    path.windows(2)
        .map(|pair| pair[0].action_to(&pair[1]))
        .collect()
}

/// True if every consecutive pair of boards differs by one blank move.
/// Empty and single-board paths are trivially valid.
pub fn is_valid_path(path: &[Board]) -> bool {
    path_actions(path).is_some()
}

/// Applies `actions` to `start` and returns every board visited, start
/// included. Stops early at the first illegal action.
pub fn replay(start: &Board, actions: &[Action]) -> Vec<Board> {
    let mut boards = vec![*start];
    let mut current = *start;
    for &action in actions {
        match current.apply(action) {
            Some(next) => {
                boards.push(next);
                current = next;
            }
            None => break,
        }
    }
    boards
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::GOAL;
    use std::io::Write;

    #[test]
    fn test_board_from_str_array_valid() {
        let board = board_from_str_array(&["265", "087", "431"]).unwrap();
        assert_eq!(board.rows(), [[2, 6, 5], [0, 8, 7], [4, 3, 1]]);
    }

    #[test]
    fn test_board_from_str_array_invalid_char() {
        let result = board_from_str_array(&["123", "456", "78X"]);
        assert!(matches!(
            result,
            Err(Error::InvalidCellCharacter { character: 'X', .. })
        ));
    }

    #[test]
    fn test_board_from_str_array_row_too_long() {
        let result = board_from_str_array(&["1234", "56", "780"]);
        assert!(matches!(
            result,
            Err(Error::InvalidBoardLength { expected: 3, got: 4, .. })
        ));
    }

    #[test]
    fn test_board_from_str_array_duplicate_tile() {
        let result = board_from_str_array(&["1 2 3", "4 5 6", "7 7 0"]);
        assert!(matches!(result, Err(Error::DuplicateTile { value: 7 })));
    }

    #[test]
    fn test_read_board_file() {
        let path = std::env::temp_dir().join(format!(
            "eight_puzzle_board_{}.txt",
            std::process::id()
        ));
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "# demo board").unwrap();
        writeln!(file, "1 2 3").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "4 5 6").unwrap();
        writeln!(file, "7 . 8").unwrap();
        drop(file);

        let board = read_board_file(&path).unwrap();
        assert_eq!(board, Board::from_cells([1, 2, 3, 4, 5, 6, 7, 0, 8]).unwrap());
        fs::remove_file(&path).unwrap();

        assert!(matches!(read_board_file(&path), Err(Error::Io { .. })));
    }

    #[test]
    fn test_path_validity() {
        let a = GOAL.apply(Action::Up).unwrap();
        let b = a.apply(Action::Left).unwrap();
        assert!(is_valid_path(&[b, a, GOAL]));
        assert_eq!(path_actions(&[b, a, GOAL]), Some(vec![Action::Right, Action::Down]));
        assert!(is_valid_path(&[]));
        assert!(is_valid_path(&[GOAL]));
        assert!(!is_valid_path(&[b, GOAL]));
        assert!(!is_valid_path(&[GOAL, GOAL]));
    }

    #[test]
    fn test_replay() {
        let start = GOAL.apply(Action::Left).unwrap();
        assert_eq!(replay(&start, &[Action::Right]), vec![start, GOAL]);
        assert_eq!(replay(&GOAL, &[Action::Down, Action::Up]), vec![GOAL]);
    }
}
