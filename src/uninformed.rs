//! Uninformed search: BFS, DFS, DLS, UCS and IDS.
//!
//! Every function takes the initial board and returns the boards from the
//! initial board to the goal, both inclusive, or an empty vector when the
//! goal is not found within the search's bounds.

use crate::config::SearchLimits;
use crate::engine::{Board, BoardKey};
use crate::node::{Budget, NodeId, SearchTree};
use log::{debug, info};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

/// Breadth-first search. Returns a shortest path since every move costs 1.
///
/// # Examples
/// ```
/// use eight_puzzle_solver::config::SearchLimits;
/// use eight_puzzle_solver::engine::Board;
/// use eight_puzzle_solver::uninformed::bfs;
///
/// let start = Board::from_cells([1, 2, 3, 4, 5, 6, 7, 0, 8]).unwrap();
/// let path = bfs(&start, SearchLimits::default());
/// assert_eq!(path, vec![start, Board::goal()]);
/// ```
pub fn bfs(start: &Board, limits: SearchLimits) -> Vec<Board> {
    let (mut tree, root) = SearchTree::with_root(*start);
    let mut visited: HashSet<BoardKey> = HashSet::new();
    visited.insert(start.key());
    let mut queue = VecDeque::from([root]);
    let mut budget = Budget::new("bfs", limits.max_expansions);

    while let Some(id) = queue.pop_front() {
        let board = *tree.board(id);
        if board.is_goal() {
            info!("bfs: goal at depth {} after {} expansions", tree.depth(id), budget.spent());
            return tree.path(id);
        }
        if !budget.spend() {
            return Vec::new();
        }
        for (action, next) in board.successors() {
            if visited.insert(next.key()) {
                let child = tree.add_child(id, Some(action), next);
                queue.push_back(child);
            }
        }
    }

    info!("bfs: frontier exhausted after {} expansions", budget.spent());
    Vec::new()
}

/// Depth-first search without a depth bound. Paths are valid but usually far
/// from shortest.
pub fn dfs(start: &Board, limits: SearchLimits) -> Vec<Board> {
    depth_first("dfs", start, None, limits)
}

/// Depth-first search that stops pushing successors once a node is `limit`
/// moves deep. Boards beyond the limit are still marked visited.
pub fn dls(start: &Board, limit: u32, limits: SearchLimits) -> Vec<Board> {
    depth_first("dls", start, Some(limit), limits)
}

fn depth_first(
    stage: &'static str,
    start: &Board,
    depth_limit: Option<u32>,
    limits: SearchLimits,
) -> Vec<Board> {
    let (mut tree, root) = SearchTree::with_root(*start);
    let mut visited: HashSet<BoardKey> = HashSet::new();
    let mut stack = vec![root];
    let mut budget = Budget::new(stage, limits.max_expansions);

    while let Some(id) = stack.pop() {
        let board = *tree.board(id);
        if board.is_goal() {
            info!("{}: goal at depth {} after {} expansions", stage, tree.depth(id), budget.spent());
            return tree.path(id);
        }
        if !visited.insert(board.key()) {
            continue;
        }
        if !budget.spend() {
            return Vec::new();
        }
        if depth_limit.map_or(true, |limit| tree.depth(id) < limit) {
            // Reversed so the first action is popped first.
            for (action, next) in board.successors().into_iter().rev() {
                if !visited.contains(&next.key()) {
                    let child = tree.add_child(id, Some(action), next);
                    stack.push(child);
                }
            }
        }
    }

    info!("{}: frontier exhausted after {} expansions", stage, budget.spent());
    Vec::new()
}

/// Uniform-cost search over a priority queue keyed by path cost.
///
/// With unit move costs this expands boards in BFS order; ties are broken by
/// insertion order.
pub fn ucs(start: &Board, limits: SearchLimits) -> Vec<Board> {
    let (mut tree, root) = SearchTree::with_root(*start);
    let mut closed: HashSet<BoardKey> = HashSet::new();
    let mut frontier: BinaryHeap<Reverse<(u32, u64, NodeId)>> = BinaryHeap::new();
    let mut sequence = 0u64;
    frontier.push(Reverse((0, sequence, root)));
    let mut budget = Budget::new("ucs", limits.max_expansions);

    while let Some(Reverse((cost, _, id))) = frontier.pop() {
        let board = *tree.board(id);
        if board.is_goal() {
            info!("ucs: goal at cost {} after {} expansions", cost, budget.spent());
            return tree.path(id);
        }
        if !closed.insert(board.key()) {
            continue;
        }
        if !budget.spend() {
            return Vec::new();
        }
        for (action, next) in board.successors() {
            if !closed.contains(&next.key()) {
                let child = tree.add_child(id, Some(action), next);
                sequence += 1;
                frontier.push(Reverse((cost + 1, sequence, child)));
            }
        }
    }

    Vec::new()
}

enum Probe {
    Found,
    NotFound,
    OutOfBudget,
}

/// Iterative deepening: depth-limited DFS for bounds `0..max_depth`, with a
/// fresh visited structure on every iteration.
///
/// Within an iteration a board is expanded again only when reached at a
/// shallower depth than before, so the first iteration that succeeds returns
/// a shortest path.
pub fn ids(start: &Board, max_depth: u32, limits: SearchLimits) -> Vec<Board> {
    let mut budget = Budget::new("ids", limits.max_expansions);

    for bound in 0..max_depth {
        debug!("ids: depth bound {}", bound);
        let mut reached: HashMap<BoardKey, u32> = HashMap::new();
        let mut path = vec![*start];
        match depth_limited(&mut path, bound, &mut reached, &mut budget) {
            Probe::Found => {
                info!("ids: goal at depth {} after {} expansions", path.len() - 1, budget.spent());
                return path;
            }
            Probe::OutOfBudget => return Vec::new(),
            Probe::NotFound => {}
        }
    }

    Vec::new()
}

fn depth_limited(
    path: &mut Vec<Board>,
    remaining: u32,
    reached: &mut HashMap<BoardKey, u32>,
    budget: &mut Budget,
) -> Probe {
    let Some(&board) = path.last() else {
        return Probe::NotFound;
    };
    if board.is_goal() {
        return Probe::Found;
    }
    if remaining == 0 {
        return Probe::NotFound;
    }
    if !budget.spend() {
        return Probe::OutOfBudget;
    }

    let depth = (path.len() - 1) as u32;
    reached.insert(board.key(), depth);

    for next in board.neighbors() {
        if reached.get(&next.key()).is_some_and(|&d| d <= depth + 1) {
            continue;
        }
        path.push(next);
        match depth_limited(path, remaining - 1, reached, budget) {
            Probe::NotFound => {
                path.pop();
            }
            found_or_out => return found_or_out,
        }
    }

    Probe::NotFound
}
