//! Recursive backtracking over blank moves.
//!
//! A board is marked visited when the search enters it and unmarked again
//! once every move out of it has failed, so another branch may reach it
//! later through a different path.

use crate::config::{BacktrackingConfig, SearchLimits};
use crate::engine::{Board, BoardKey};
use crate::heuristics::misplaced_tiles;
use crate::node::Budget;
use log::info;
use std::collections::HashSet;

enum Step {
    Found,
    DeadEnd,
    OutOfBudget,
}

struct Backtracker {
    max_depth: u32,
    forward_checking: bool,
    visited: HashSet<BoardKey>,
    path: Vec<Board>,
    budget: Budget,
}

impl Backtracker {
    fn new(stage: &'static str, config: &BacktrackingConfig, limits: SearchLimits, forward_checking: bool) -> Self {
        Backtracker {
            max_depth: config.max_depth,
            forward_checking,
            visited: HashSet::new(),
            path: Vec::new(),
            budget: Budget::new(stage, limits.max_expansions),
        }
    }

    fn run(mut self, stage: &str, start: &Board) -> Vec<Board> {
        match self.enter(*start, 0) {
            Step::Found => {
                info!(
                    "{}: goal at depth {} after {} expansions",
                    stage,
                    self.path.len() - 1,
                    self.budget.spent()
                );
                self.path
            }
            Step::DeadEnd => {
                info!("{}: exhausted after {} expansions", stage, self.budget.spent());
                Vec::new()
            }
            Step::OutOfBudget => Vec::new(),
        }
    }

    fn enter(&mut self, board: Board, depth: u32) -> Step {
        if depth > self.max_depth {
            return Step::DeadEnd;
        }
        let key = board.key();
        if !self.visited.insert(key) {
            return Step::DeadEnd;
        }
        self.path.push(board);
        if board.is_goal() {
            return Step::Found;
        }
        if !self.budget.spend() {
            return Step::OutOfBudget;
        }

        let misplaced = misplaced_tiles(&board);
        for next in board.neighbors() {
            if self.forward_checking && misplaced_tiles(&next) >= misplaced {
                continue;
            }
            match self.enter(next, depth + 1) {
                Step::DeadEnd => {}
                found_or_out => return found_or_out,
            }
        }

        self.path.pop();
        self.visited.remove(&key);
        Step::DeadEnd
    }
}

/// Depth-first backtracking over moves, at most `max_depth` moves deep.
///
/// # Examples
/// ```
/// use eight_puzzle_solver::backtracking::backtracking;
/// use eight_puzzle_solver::config::{BacktrackingConfig, SearchLimits};
/// use eight_puzzle_solver::engine::Board;
///
/// let start = Board::from_cells([1, 2, 3, 4, 5, 6, 7, 0, 8]).unwrap();
/// let config = BacktrackingConfig { max_depth: 1 };
/// assert_eq!(backtracking(&start, &config, SearchLimits::default()).len(), 2);
/// ```
pub fn backtracking(start: &Board, config: &BacktrackingConfig, limits: SearchLimits) -> Vec<Board> {
    Backtracker::new("backtracking", config, limits, false).run("backtracking", start)
}

/// Backtracking that only moves to neighbours with strictly fewer misplaced
/// tiles than the current board.
pub fn backtracking_forward_checking(
    start: &Board,
    config: &BacktrackingConfig,
    limits: SearchLimits,
) -> Vec<Board> {
    Backtracker::new("backtracking_forward_checking", config, limits, true)
        .run("backtracking_forward_checking", start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Action, GOAL};
    use crate::utils::is_valid_path;

    fn one_move_board() -> Board {
        Board::from_cells([1, 2, 3, 4, 5, 6, 7, 0, 8]).unwrap()
    }

    #[test]
    fn test_goal_start() {
        let config = BacktrackingConfig::default();
        let limits = SearchLimits::default();
        assert_eq!(backtracking(&GOAL, &config, limits), vec![GOAL]);
        assert_eq!(backtracking_forward_checking(&GOAL, &config, limits), vec![GOAL]);
    }

    #[test]
    fn test_depth_one_finds_single_move() {
        let start = one_move_board();
        let config = BacktrackingConfig { max_depth: 1 };
        assert_eq!(
            backtracking(&start, &config, SearchLimits::default()),
            vec![start, GOAL]
        );
    }

    #[test]
    fn test_depth_zero_fails() {
        let config = BacktrackingConfig { max_depth: 0 };
        assert!(backtracking(&one_move_board(), &config, SearchLimits::default()).is_empty());
    }

    #[test]
    fn test_forward_checking_follows_improving_moves() {
        let start = GOAL.apply(Action::Left).unwrap().apply(Action::Left).unwrap();
        let path = backtracking_forward_checking(&start, &BacktrackingConfig::default(), SearchLimits::default());
        assert_eq!(path, vec![start, GOAL.apply(Action::Left).unwrap(), GOAL]);
        assert!(path.windows(2).all(|w| misplaced_tiles(&w[1]) < misplaced_tiles(&w[0])));
    }

    #[test]
    fn test_forward_checking_dead_end() {
        // Strict improvement is required at every step, so this may strand.
        let start: Board = "2 6 5 / . 8 7 / 4 3 1".parse().unwrap();
        let path = backtracking_forward_checking(&start, &BacktrackingConfig::default(), SearchLimits::default());
        if !path.is_empty() {
            assert!(is_valid_path(&path));
            assert_eq!(path.last(), Some(&GOAL));
        }
    }

    #[test]
    fn test_path_within_depth_bound() {
        let start = GOAL
            .apply(Action::Up)
            .unwrap()
            .apply(Action::Left)
            .unwrap()
            .apply(Action::Down)
            .unwrap();
        let config = BacktrackingConfig { max_depth: 5 };
        let path = backtracking(&start, &config, SearchLimits::default());
        assert!(is_valid_path(&path));
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&GOAL));
        assert!(path.len() <= 6);
    }

    #[test]
    fn test_unsolvable_stops_on_budget() {
        let unsolvable = GOAL.swap_cells(0, 1);
        let limits = SearchLimits { max_expansions: 2_000 };
        assert!(backtracking(&unsolvable, &BacktrackingConfig::default(), limits).is_empty());
    }
}
