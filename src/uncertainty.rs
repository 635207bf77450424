//! Search under nondeterminism and partial observability.
//!
//! The 8-puzzle itself is deterministic. To exercise AND-OR and belief-state
//! machinery, every action is modelled with two outcomes: the intended
//! successor and a copy of it with two random cells swapped. Belief states
//! start from the true board plus randomly perturbed copies of it.

use crate::config::{AndOrConfig, BeliefConfig, SearchLimits};
use crate::engine::{Action, Board, BoardKey, CELL_COUNT};
use crate::node::{Budget, NodeId, SearchTree};
use crate::utils::replay;
use log::{debug, info};
use rand::Rng;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet, VecDeque};

/// Possible results of applying an action.
pub trait OutcomeModel {
    /// All boards that `action` may lead to from `board`. Empty if the action
    /// is illegal.
    fn outcomes<R: Rng + ?Sized>(&self, board: &Board, action: Action, rng: &mut R) -> Vec<Board>;
}

/// The intended successor plus the same board with two distinct random
/// cells swapped.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomSwapOutcomes;

impl OutcomeModel for RandomSwapOutcomes {
    fn outcomes<R: Rng + ?Sized>(&self, board: &Board, action: Action, rng: &mut R) -> Vec<Board> {
        let Some(intended) = board.apply(action) else {
            return Vec::new();
        };
        let i = rng.gen_range(0..CELL_COUNT);
        let mut j = rng.gen_range(0..CELL_COUNT - 1);
        if j >= i {
            j += 1;
        }
        vec![intended, intended.swap_cells(i, j)]
    }
}

/// A contingency plan: an action, then one sub-plan per possible outcome.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum ConditionalPlan {
    /// The current board is the goal; nothing left to do.
    Goal,
    Act {
        action: Action,
        branches: Vec<(Board, ConditionalPlan)>,
    },
}

impl ConditionalPlan {
    /// Actions along the intended-outcome branch.
    pub fn actions(&self) -> Vec<Action> {
        let mut actions = Vec::new();
        let mut current = self;
        while let ConditionalPlan::Act { action, branches } = current {
            actions.push(*action);
            match branches.first() {
                Some((_, next)) => current = next,
                None => break,
            }
        }
        actions
    }

    /// `start` followed by the boards of the intended-outcome branch.
    pub fn boards(&self, start: &Board) -> Vec<Board> {
        replay(start, &self.actions())
    }

    /// Largest number of actions along any branch.
    pub fn depth(&self) -> usize {
        match self {
            ConditionalPlan::Goal => 0,
            ConditionalPlan::Act { branches, .. } => {
                1 + branches.iter().map(|(_, p)| p.depth()).max().unwrap_or(0)
            }
        }
    }
}

struct AndOrSearch<'a, M, R: ?Sized> {
    model: &'a M,
    rng: &'a mut R,
    depth_limit: u32,
    /// Boards on the current OR path, innermost last.
    path: Vec<BoardKey>,
}

impl<M: OutcomeModel, R: Rng + ?Sized> AndOrSearch<'_, M, R> {
    fn or_search(&mut self, board: &Board, depth: u32) -> Option<ConditionalPlan> {
        if board.is_goal() {
            return Some(ConditionalPlan::Goal);
        }
        let key = board.key();
        if depth > self.depth_limit || self.path.contains(&key) {
            return None;
        }

        self.path.push(key);
        let mut plan = None;
        for action in board.actions() {
            let outcomes = self.model.outcomes(board, action, self.rng);
            if let Some(branches) = self.and_search(&outcomes, depth + 1) {
                plan = Some(ConditionalPlan::Act { action, branches });
                break;
            }
        }
        self.path.pop();
        plan
    }

    fn and_search(&mut self, outcomes: &[Board], depth: u32) -> Option<Vec<(Board, ConditionalPlan)>> {
        let mut branches = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            let plan = self.or_search(outcome, depth)?;
            branches.push((*outcome, plan));
        }
        Some(branches)
    }
}

/// AND-OR search for a conditional plan that reaches the goal whatever
/// outcome each action has.
///
/// The goal test comes first; after that a board deeper than `depth_limit`,
/// or already on the current path, is a dead end. Returns `None` when no
/// action at the start board has a working plan for every outcome.
pub fn and_or_search<M: OutcomeModel, R: Rng + ?Sized>(
    start: &Board,
    config: &AndOrConfig,
    model: &M,
    rng: &mut R,
) -> Option<ConditionalPlan> {
    let mut search = AndOrSearch {
        model,
        rng,
        depth_limit: config.depth_limit,
        path: Vec::new(),
    };
    let plan = search.or_search(start, 0);
    match &plan {
        Some(p) => info!("and_or_search: plan of depth {}", p.depth()),
        None => info!("and_or_search: no plan within depth {}", config.depth_limit),
    }
    plan
}

/// The true board followed by `count` copies with two random cells swapped.
/// A copy may coincide with the true board when both picks hit the same cell.
pub fn perturbed_beliefs<R: Rng + ?Sized>(board: &Board, count: usize, rng: &mut R) -> Vec<Board> {
    let mut beliefs = Vec::with_capacity(count + 1);
    beliefs.push(*board);
    for _ in 0..count {
        let i = rng.gen_range(0..CELL_COUNT);
        let j = rng.gen_range(0..CELL_COUNT);
        beliefs.push(board.swap_cells(i, j));
    }
    beliefs
}

/// Belief-state search without observations.
///
/// Every round replaces the belief with the union of all successors of all
/// members. Succeeds as soon as any member is the goal and returns that
/// member's trajectory from its initial candidate board.
pub fn no_observation_search<R: Rng + ?Sized>(
    start: &Board,
    config: &BeliefConfig,
    limits: SearchLimits,
    rng: &mut R,
) -> Vec<Board> {
    let mut tree = SearchTree::new();
    let mut initial: HashSet<BoardKey> = HashSet::new();
    let mut belief: Vec<NodeId> = perturbed_beliefs(start, config.perturbations, rng)
        .into_iter()
        .filter(|b| initial.insert(b.key()))
        .map(|b| tree.add_root(b))
        .collect();
    let mut budget = Budget::new("no_observation_search", limits.max_expansions);

    for round in 0..=config.max_rounds {
        if let Some(&goal) = belief.iter().find(|&&id| tree.board(id).is_goal()) {
            info!("no_observation_search: goal in round {}", round);
            return tree.path(goal);
        }
        if round == config.max_rounds || belief.is_empty() {
            break;
        }

        let mut seen: HashSet<BoardKey> = HashSet::new();
        let mut next = Vec::new();
        for &id in &belief {
            if !budget.spend() {
                return Vec::new();
            }
            let board = *tree.board(id);
            for (action, successor) in board.successors() {
                if seen.insert(successor.key()) {
                    next.push(tree.add_child(id, Some(action), successor));
                }
            }
        }
        debug!("no_observation_search: round {} belief size {}", round + 1, next.len());
        belief = next;
    }

    info!("no_observation_search: no goal after {} rounds", config.max_rounds);
    Vec::new()
}

/// What the agent senses after a move: the blank's `(row, column)`.
pub fn observe(board: &Board) -> (usize, usize) {
    board.blank_position()
}

/// Keeps the candidates consistent with `observation`, or all of them if
/// none is.
pub fn update_beliefs(beliefs: Vec<Board>, observation: (usize, usize)) -> Vec<Board> {
    let consistent: Vec<Board> = beliefs
        .iter()
        .copied()
        .filter(|b| observe(b) == observation)
        .collect();
    if consistent.is_empty() {
        beliefs
    } else {
        consistent
    }
}

/// Belief-state search with partial observation.
///
/// Breadth-first over `(node, observation)` pairs. Each successor of an
/// expanded board spawns a fresh belief (the successor plus perturbed
/// copies), filtered by the observation of the successor. Belief sets are
/// deduplicated by their member set; the search returns the trajectory to the
/// first goal board that shows up in any updated belief.
///
/// Queued boards always agree with the observation stored next to them,
/// since the successor itself survives the filter. The observation in the
/// queue only feeds the debug trace.
pub fn partial_observation_search<R: Rng + ?Sized>(
    start: &Board,
    config: &BeliefConfig,
    rng: &mut R,
) -> Vec<Board> {
    let initial = perturbed_beliefs(start, config.perturbations, rng);
    if let Some(&goal) = initial.iter().find(|b| b.is_goal()) {
        return vec![goal];
    }

    let mut tree = SearchTree::new();
    let mut visited: HashSet<BTreeSet<Board>> = HashSet::new();
    visited.insert(initial.iter().copied().collect());
    let mut queue: VecDeque<(NodeId, (usize, usize))> = initial
        .iter()
        .map(|b| (tree.add_root(*b), observe(b)))
        .collect();
    let mut budget = Budget::new("partial_observation_search", config.max_expansions);

    while let Some((id, observation)) = queue.pop_front() {
        if !budget.spend() {
            return Vec::new();
        }
        let board = *tree.board(id);
        debug!(
            "partial_observation_search: expanding depth {} blank at {:?}",
            tree.depth(id),
            observation
        );

        for (action, successor) in board.successors() {
            let seen_blank = observe(&successor);
            let candidates = perturbed_beliefs(&successor, config.perturbations, rng);
            let updated = update_beliefs(candidates, seen_blank);
            let fresh = visited.insert(updated.iter().copied().collect());

            for belief in updated {
                let label = (belief == successor).then_some(action);
                if belief.is_goal() {
                    let goal = tree.add_child(id, label, belief);
                    info!(
                        "partial_observation_search: goal at depth {} after {} expansions",
                        tree.depth(goal),
                        budget.spent()
                    );
                    return tree.path(goal);
                }
                if fresh {
                    let node = tree.add_child(id, label, belief);
                    queue.push_back((node, seen_blank));
                }
            }
        }
    }

    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{shuffle, GOAL};
    use crate::utils::is_valid_path;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    /// Degenerate model with only the intended outcome.
    struct IntendedOnly;

    impl OutcomeModel for IntendedOnly {
        fn outcomes<R: Rng + ?Sized>(&self, board: &Board, action: Action, _rng: &mut R) -> Vec<Board> {
            board.apply(action).into_iter().collect()
        }
    }

    fn one_move_board() -> Board {
        Board::from_cells([1, 2, 3, 4, 5, 6, 7, 0, 8]).unwrap()
    }

    #[test]
    fn test_random_swap_outcomes() {
        let mut rng = SmallRng::seed_from_u64(1);
        let start = one_move_board();
        let outcomes = RandomSwapOutcomes.outcomes(&start, Action::Right, &mut rng);
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0], GOAL);
        assert_ne!(outcomes[1], GOAL);
        assert!(RandomSwapOutcomes.outcomes(&GOAL, Action::Down, &mut rng).is_empty());
    }

    #[test]
    fn test_and_or_goal_start() {
        let mut rng = SmallRng::seed_from_u64(0);
        let plan = and_or_search(&GOAL, &AndOrConfig::default(), &RandomSwapOutcomes, &mut rng);
        assert_eq!(plan, Some(ConditionalPlan::Goal));
        assert_eq!(ConditionalPlan::Goal.boards(&GOAL), vec![GOAL]);
        assert!(ConditionalPlan::Goal.actions().is_empty());
    }

    #[test]
    fn test_and_or_fails_beyond_depth_bound() {
        let mut rng = SmallRng::seed_from_u64(8);
        let far: Board = "2 6 5 / . 8 7 / 4 3 1".parse().unwrap();
        let config = AndOrConfig { depth_limit: 3 };
        assert_eq!(and_or_search(&far, &config, &RandomSwapOutcomes, &mut rng), None);
        assert_eq!(and_or_search(&far, &config, &IntendedOnly, &mut rng), None);
    }

    #[test]
    fn test_and_or_with_single_outcome_finds_plan() {
        let mut rng = SmallRng::seed_from_u64(2);
        let start = one_move_board().apply(Action::Left).unwrap();
        let plan = and_or_search(&start, &AndOrConfig::default(), &IntendedOnly, &mut rng).unwrap();
        assert_eq!(plan.depth(), 2);
        let boards = plan.boards(&start);
        assert!(is_valid_path(&boards));
        assert_eq!(boards, vec![start, one_move_board(), GOAL]);
        assert_eq!(plan.actions(), vec![Action::Right, Action::Right]);
    }

    #[test]
    fn test_and_or_requires_every_outcome() {
        // The swapped outcome always has the wrong parity, so no plan that
        // takes an action can cover both outcomes.
        let mut rng = SmallRng::seed_from_u64(4);
        let start = one_move_board();
        assert_eq!(
            and_or_search(&start, &AndOrConfig::default(), &RandomSwapOutcomes, &mut rng),
            None
        );
    }

    #[test]
    fn test_perturbed_beliefs() {
        let mut rng = SmallRng::seed_from_u64(5);
        let beliefs = perturbed_beliefs(&GOAL, 3, &mut rng);
        assert_eq!(beliefs.len(), 4);
        assert_eq!(beliefs[0], GOAL);
    }

    #[test]
    fn test_update_beliefs_filters_or_falls_back() {
        let a = GOAL;
        let b = GOAL.apply(Action::Up).unwrap();
        assert_eq!(update_beliefs(vec![a, b], observe(&a)), vec![a]);
        assert_eq!(update_beliefs(vec![a, b], (0, 0)), vec![a, b]);
    }

    #[test]
    fn test_successor_survives_its_own_observation() {
        let mut rng = SmallRng::seed_from_u64(6);
        let start = shuffle(&GOAL, 6, &mut rng);
        for (_, next) in start.successors() {
            let beliefs = perturbed_beliefs(&next, 4, &mut rng);
            let updated = update_beliefs(beliefs, observe(&next));
            assert!(updated.contains(&next));
            assert!(updated.iter().all(|b| observe(b) == observe(&next)));
        }
    }

    #[test]
    fn test_no_observation_goal_start() {
        let mut rng = SmallRng::seed_from_u64(0);
        let path = no_observation_search(&GOAL, &BeliefConfig::default(), SearchLimits::default(), &mut rng);
        assert_eq!(path, vec![GOAL]);
    }

    #[test]
    fn test_no_observation_reaches_goal() {
        for seed in 0..5 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let start = shuffle(&GOAL, 6, &mut rng);
            let path =
                no_observation_search(&start, &BeliefConfig::default(), SearchLimits::default(), &mut rng);
            assert_eq!(path.last(), Some(&GOAL));
            assert!(is_valid_path(&path));
            assert!(path.len() <= 7);
        }
    }

    #[test]
    fn test_no_observation_round_cap() {
        let mut rng = SmallRng::seed_from_u64(0);
        let far: Board = "2 6 5 / . 8 7 / 4 3 1".parse().unwrap();
        let config = BeliefConfig {
            perturbations: 0,
            max_rounds: 3,
            ..BeliefConfig::default()
        };
        assert!(no_observation_search(&far, &config, SearchLimits::default(), &mut rng).is_empty());
    }

    #[test]
    fn test_partial_observation_one_move() {
        for seed in 0..5 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let start = one_move_board();
            let path = partial_observation_search(&start, &BeliefConfig::default(), &mut rng);
            assert_eq!(path.last(), Some(&GOAL));
            assert!(path.len() <= 2);
        }
    }

    #[test]
    fn test_partial_observation_goal_start() {
        let mut rng = SmallRng::seed_from_u64(3);
        assert_eq!(
            partial_observation_search(&GOAL, &BeliefConfig::default(), &mut rng),
            vec![GOAL]
        );
    }

    #[test]
    fn test_partial_observation_budget() {
        let mut rng = SmallRng::seed_from_u64(3);
        let far: Board = "2 6 5 / . 8 7 / 4 3 1".parse().unwrap();
        let config = BeliefConfig {
            perturbations: 0,
            max_expansions: 10,
            ..BeliefConfig::default()
        };
        assert!(partial_observation_search(&far, &config, &mut rng).is_empty());
    }
}
