//! Informed search guided by the Manhattan-distance heuristic: greedy
//! best-first, A* and IDA*.

use crate::config::SearchLimits;
use crate::engine::{Board, BoardKey};
use crate::node::{Budget, NodeId, SearchTree};
use log::{debug, info};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

/// Greedy best-first search: always expands the frontier board with the
/// smallest heuristic value. Fast, but paths are not minimal.
pub fn greedy(start: &Board, limits: SearchLimits) -> Vec<Board> {
    let (mut tree, root) = SearchTree::with_root(*start);
    let mut closed: HashSet<BoardKey> = HashSet::new();
    let mut frontier: BinaryHeap<Reverse<(u32, u64, NodeId)>> = BinaryHeap::new();
    let mut sequence = 0u64;
    frontier.push(Reverse((start.heuristic(), sequence, root)));
    let mut budget = Budget::new("greedy", limits.max_expansions);

    while let Some(Reverse((_, _, id))) = frontier.pop() {
        let board = *tree.board(id);
        if board.is_goal() {
            info!("greedy: goal at depth {} after {} expansions", tree.depth(id), budget.spent());
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
                frontier.push(Reverse((next.heuristic(), sequence, child)));
            }
        }
    }

    Vec::new()
}

/// A* search with `f = g + h`.
///
/// Ties on `f` prefer the smaller `h`, then the earlier insertion, so results
/// are reproducible. The goal is returned the first time it is popped, which
/// gives a shortest path because the heuristic is consistent.
///
/// # Examples
/// ```
/// use eight_puzzle_solver::config::SearchLimits;
/// use eight_puzzle_solver::engine::Board;
/// use eight_puzzle_solver::informed::astar;
///
/// let start: Board = "1 2 3 / 4 5 6 / . 7 8".parse().unwrap();
/// assert_eq!(astar(&start, SearchLimits::default()).len(), 3);
/// ```
pub fn astar(start: &Board, limits: SearchLimits) -> Vec<Board> {
    let (mut tree, root) = SearchTree::with_root(*start);
    let mut closed: HashSet<BoardKey> = HashSet::new();
    let mut best_g: HashMap<BoardKey, u32> = HashMap::new();
    let mut frontier: BinaryHeap<Reverse<(u32, u32, u64, NodeId)>> = BinaryHeap::new();
    let mut sequence = 0u64;
    let h = start.heuristic();
    frontier.push(Reverse((h, h, sequence, root)));
    best_g.insert(start.key(), 0);
    let mut budget = Budget::new("astar", limits.max_expansions);

    while let Some(Reverse((f, _, _, id))) = frontier.pop() {
        let board = *tree.board(id);
        if board.is_goal() {
            info!("astar: goal at cost {} after {} expansions", f, budget.spent());
            return tree.path(id);
        }
        if !closed.insert(board.key()) {
            continue;
        }
        if !budget.spend() {
            return Vec::new();
        }
        let g = tree.depth(id) + 1;
        for (action, next) in board.successors() {
            let key = next.key();
            if closed.contains(&key) || best_g.get(&key).is_some_and(|&known| known <= g) {
                continue;
            }
            best_g.insert(key, g);
            let child = tree.add_child(id, Some(action), next);
            let h = next.heuristic();
            sequence += 1;
            frontier.push(Reverse((g + h, h, sequence, child)));
        }
    }

    Vec::new()
}

enum Bound {
    Found,
    /// Smallest `f` that exceeded the threshold, `None` if nothing was pruned.
    Exceeded(Option<u32>),
    OutOfBudget,
}

/// IDA*: iterative deepening on `f = g + h`.
///
/// Each iteration is a depth-first search that prunes any branch whose `f`
/// exceeds the threshold; the next threshold is the smallest pruned `f`.
/// Fails when an iteration prunes nothing or the expansion budget runs out.
pub fn ida_star(start: &Board, limits: SearchLimits) -> Vec<Board> {
    let mut threshold = start.heuristic();
    let mut budget = Budget::new("ida_star", limits.max_expansions);

    loop {
        debug!("ida_star: threshold {}", threshold);
        let mut path = vec![*start];
        let mut on_path: HashSet<BoardKey> = HashSet::from([start.key()]);
        match bounded_dfs(&mut path, &mut on_path, 0, threshold, &mut budget) {
            Bound::Found => {
                info!("ida_star: goal at depth {} after {} expansions", path.len() - 1, budget.spent());
                return path;
            }
            Bound::Exceeded(Some(next)) => threshold = next,
            Bound::Exceeded(None) | Bound::OutOfBudget => return Vec::new(),
        }
    }
}

fn bounded_dfs(
    path: &mut Vec<Board>,
    on_path: &mut HashSet<BoardKey>,
    g: u32,
    threshold: u32,
    budget: &mut Budget,
) -> Bound {
    let Some(&board) = path.last() else {
        return Bound::Exceeded(None);
    };
    let f = g + board.heuristic();
    if f > threshold {
        return Bound::Exceeded(Some(f));
    }
    if board.is_goal() {
        return Bound::Found;
    }
    if !budget.spend() {
        return Bound::OutOfBudget;
    }

    let mut minimum: Option<u32> = None;
    for next in board.neighbors() {
        let key = next.key();
        if !on_path.insert(key) {
            continue;
        }
        path.push(next);
        match bounded_dfs(path, on_path, g + 1, threshold, budget) {
            Bound::Exceeded(pruned) => {
                minimum = match (minimum, pruned) {
                    (Some(a), Some(b)) => Some(a.min(b)),
                    (a, b) => a.or(b),
                };
            }
            found_or_out => return found_or_out,
        }
        path.pop();
        on_path.remove(&key);
    }

    Bound::Exceeded(minimum)
}
