//! Local search over boards: hill climbing, simulated annealing and beam
//! search.
//!
//! These strategies are incomplete. Each returns its accumulated path only if
//! the last board it reached is the goal, and an empty vector otherwise.

use crate::config::{AnnealingConfig, BeamConfig};
use crate::engine::{Board, BoardKey};
use crate::node::SearchTree;
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

fn finish(stage: &str, path: Vec<Board>) -> Vec<Board> {
    match path.last() {
        Some(last) if last.is_goal() => {
            info!("{}: reached goal in {} moves", stage, path.len() - 1);
            path
        }
        Some(last) => {
            info!("{}: stuck at heuristic {}", stage, last.heuristic());
            Vec::new()
        }
        None => Vec::new(),
    }
}

/// Simple hill climbing: moves to the first neighbour, in canonical order,
/// whose heuristic is strictly lower than the current board's. Stops when no
/// neighbour improves.
pub fn simple_hill_climbing(start: &Board) -> Vec<Board> {
    let mut path = vec![*start];
    let mut current = *start;
    while !current.is_goal() {
        let h = current.heuristic();
        match current.neighbors().into_iter().find(|n| n.heuristic() < h) {
            Some(next) => {
                current = next;
                path.push(current);
            }
            None => break,
        }
    }
    finish("simple_hill_climbing", path)
}

/// Steepest-ascent hill climbing: moves to the neighbour with the lowest
/// heuristic if it improves on the current board. Ties go to the first
/// neighbour in canonical order.
pub fn steepest_ascent_hill_climbing(start: &Board) -> Vec<Board> {
    let mut path = vec![*start];
    let mut current = *start;
    while !current.is_goal() {
        let h = current.heuristic();
        let best = current
            .neighbors()
            .into_iter()
            .map(|n| (n.heuristic(), n))
            .fold(None, |best: Option<(u32, Board)>, (nh, n)| match best {
                Some((bh, _)) if bh <= nh => best,
                _ => Some((nh, n)),
            });
        match best {
            Some((bh, next)) if bh < h => {
                current = next;
                path.push(current);
            }
            _ => break,
        }
    }
    finish("steepest_ascent_hill_climbing", path)
}

/// Stochastic hill climbing: picks uniformly among all strictly improving
/// neighbours.
pub fn stochastic_hill_climbing<R: Rng + ?Sized>(start: &Board, rng: &mut R) -> Vec<Board> {
    let mut path = vec![*start];
    let mut current = *start;
    while !current.is_goal() {
        let h = current.heuristic();
        let better: Vec<Board> = current
            .neighbors()
            .into_iter()
            .filter(|n| n.heuristic() < h)
            .collect();
        match better.choose(rng) {
            Some(&next) => {
                current = next;
                path.push(current);
            }
            None => break,
        }
    }
    finish("stochastic_hill_climbing", path)
}

/// Simulated annealing.
///
/// Each step proposes a random neighbour. Improvements are always accepted;
/// a worsening move with heuristic change `delta < 0` is accepted with
/// probability `exp(delta / T)`. The temperature is multiplied by the cooling
/// rate after every step and the search ends once it drops to 1 or below.
pub fn simulated_annealing<R: Rng + ?Sized>(
    start: &Board,
    config: &AnnealingConfig,
    rng: &mut R,
) -> Vec<Board> {
    let mut path = vec![*start];
    let mut current = *start;
    let mut temperature = config.initial_temperature;

    while temperature > 1.0 {
        if current.is_goal() {
            break;
        }
        let neighbors = current.neighbors();
        let Some(&next) = neighbors.choose(rng) else {
            break;
        };
        let delta = f64::from(current.heuristic()) - f64::from(next.heuristic());
        if delta > 0.0 || (delta / temperature).exp() > rng.gen::<f64>() {
            current = next;
            path.push(current);
        }
        temperature *= config.cooling_rate;
    }

    debug!("simulated_annealing: final temperature {:.3}", temperature);
    finish("simulated_annealing", path)
}

/// Beam search keeping the `width` best boards of each layer.
///
/// Every round expands the whole beam, drops boards seen before, sorts the
/// new candidates by heuristic (stable, so ties keep generation order) and
/// keeps the first `width` of them. Fails once the beam is empty.
pub fn beam_search(start: &Board, config: &BeamConfig) -> Vec<Board> {
    let (mut tree, root) = SearchTree::with_root(*start);
    let mut visited: HashSet<BoardKey> = HashSet::from([start.key()]);
    let mut beam = vec![root];
    let mut rounds = 0usize;

    while !beam.is_empty() {
        let mut candidates = Vec::new();
        for &id in &beam {
            let board = *tree.board(id);
            if board.is_goal() {
                info!("beam_search: goal at depth {} after {} rounds", tree.depth(id), rounds);
                return tree.path(id);
            }
            for (action, next) in board.successors() {
                if visited.insert(next.key()) {
                    candidates.push((next.heuristic(), tree.add_child(id, Some(action), next)));
                }
            }
        }
        candidates.sort_by_key(|&(h, _)| h);
        beam = candidates
            .into_iter()
            .take(config.width)
            .map(|(_, id)| id)
            .collect();
        rounds += 1;
    }

    info!("beam_search: beam emptied after {} rounds", rounds);
    Vec::new()
}
