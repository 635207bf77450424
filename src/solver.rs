//! Uniform entry point over every search strategy.

use crate::backtracking::{backtracking, backtracking_forward_checking};
use crate::config::SolverConfig;
use crate::csp::{fill_backtracking, fill_forward_checking, min_conflicts};
use crate::engine::Board;
use crate::error::{Error, Result};
use crate::genetic::genetic_algorithm;
use crate::informed::{astar, greedy, ida_star};
use crate::local::{
    beam_search, simple_hill_climbing, simulated_annealing, steepest_ascent_hill_climbing,
    stochastic_hill_climbing,
};
use crate::rl::q_learning;
use crate::uncertainty::{
    and_or_search, no_observation_search, partial_observation_search, RandomSwapOutcomes,
};
use crate::uninformed::{bfs, dfs, dls, ids, ucs};
use clap::ValueEnum;
use log::info;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

/// Every strategy the crate provides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    Bfs,
    Dfs,
    Dls,
    Ucs,
    Ids,
    Greedy,
    AStar,
    IdaStar,
    SimpleHillClimbing,
    SteepestAscent,
    StochasticHillClimbing,
    SimulatedAnnealing,
    BeamSearch,
    Genetic,
    AndOr,
    NoObservation,
    PartialObservation,
    Backtracking,
    BacktrackingForwardChecking,
    FillBacktracking,
    FillForwardChecking,
    MinConflicts,
    QLearning,
}

impl Algorithm {
    pub const ALL: [Algorithm; 23] = [
        Algorithm::Bfs,
        Algorithm::Dfs,
        Algorithm::Dls,
        Algorithm::Ucs,
        Algorithm::Ids,
        Algorithm::Greedy,
        Algorithm::AStar,
        Algorithm::IdaStar,
        Algorithm::SimpleHillClimbing,
        Algorithm::SteepestAscent,
        Algorithm::StochasticHillClimbing,
        Algorithm::SimulatedAnnealing,
        Algorithm::BeamSearch,
        Algorithm::Genetic,
        Algorithm::AndOr,
        Algorithm::NoObservation,
        Algorithm::PartialObservation,
        Algorithm::Backtracking,
        Algorithm::BacktrackingForwardChecking,
        Algorithm::FillBacktracking,
        Algorithm::FillForwardChecking,
        Algorithm::MinConflicts,
        Algorithm::QLearning,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Bfs => "bfs",
            Algorithm::Dfs => "dfs",
            Algorithm::Dls => "dls",
            Algorithm::Ucs => "ucs",
            Algorithm::Ids => "ids",
            Algorithm::Greedy => "greedy",
            Algorithm::AStar => "a-star",
            Algorithm::IdaStar => "ida-star",
            Algorithm::SimpleHillClimbing => "simple-hill-climbing",
            Algorithm::SteepestAscent => "steepest-ascent",
            Algorithm::StochasticHillClimbing => "stochastic-hill-climbing",
            Algorithm::SimulatedAnnealing => "simulated-annealing",
            Algorithm::BeamSearch => "beam-search",
            Algorithm::Genetic => "genetic",
            Algorithm::AndOr => "and-or",
            Algorithm::NoObservation => "no-observation",
            Algorithm::PartialObservation => "partial-observation",
            Algorithm::Backtracking => "backtracking",
            Algorithm::BacktrackingForwardChecking => "backtracking-forward-checking",
            Algorithm::FillBacktracking => "fill-backtracking",
            Algorithm::FillForwardChecking => "fill-forward-checking",
            Algorithm::MinConflicts => "min-conflicts",
            Algorithm::QLearning => "q-learning",
        }
    }

    /// False for the CSP fill solvers, which always start from the empty
    /// grid and ignore the board they are given.
    pub fn uses_start_board(self) -> bool {
        !matches!(
            self,
            Algorithm::FillBacktracking | Algorithm::FillForwardChecking | Algorithm::MinConflicts
        )
    }

    /// True for strategies whose non-empty result is always a shortest path.
    pub fn is_optimal(self) -> bool {
        matches!(
            self,
            Algorithm::Bfs | Algorithm::Ucs | Algorithm::Ids | Algorithm::AStar | Algorithm::IdaStar
        )
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    /// Accepts the kebab-case name in any case, with `_` in place of `-`.
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Algorithm::ALL
            .into_iter()
            .find(|a| a.name() == wanted)
            .ok_or_else(|| Error::UnknownAlgorithm {
                name: s.to_string(),
                expected: Algorithm::ALL.map(Algorithm::name).join(", "),
            })
    }
}

/// Runs `algorithm` on `start`.
///
/// Returns the boards from `start` to the goal, or an empty vector when the
/// strategy gives up. The CSP fill solvers return their sequence of partial
/// boards from the empty grid instead.
///
/// # Examples
/// ```
/// use eight_puzzle_solver::config::SolverConfig;
/// use eight_puzzle_solver::engine::Board;
/// use eight_puzzle_solver::solver::{solve, Algorithm};
/// use rand::rngs::SmallRng;
/// use rand::SeedableRng;
///
/// let start: Board = "1 2 3 / 4 5 6 / 7 . 8".parse().unwrap();
/// let mut rng = SmallRng::seed_from_u64(0);
/// let path = solve(Algorithm::AStar, &start, &SolverConfig::default(), &mut rng);
/// assert_eq!(path, vec![start, Board::goal()]);
/// ```
pub fn solve<R: Rng + ?Sized>(
    algorithm: Algorithm,
    start: &Board,
    config: &SolverConfig,
    rng: &mut R,
) -> Vec<Board> {
    let limits = config.limits;
    match algorithm {
        Algorithm::Bfs => bfs(start, limits),
        Algorithm::Dfs => dfs(start, limits),
        Algorithm::Dls => dls(start, config.uninformed.dls_limit, limits),
        Algorithm::Ucs => ucs(start, limits),
        Algorithm::Ids => ids(start, config.uninformed.ids_max_depth, limits),
        Algorithm::Greedy => greedy(start, limits),
        Algorithm::AStar => astar(start, limits),
        Algorithm::IdaStar => ida_star(start, limits),
        Algorithm::SimpleHillClimbing => simple_hill_climbing(start),
        Algorithm::SteepestAscent => steepest_ascent_hill_climbing(start),
        Algorithm::StochasticHillClimbing => stochastic_hill_climbing(start, rng),
        Algorithm::SimulatedAnnealing => simulated_annealing(start, &config.annealing, rng),
        Algorithm::BeamSearch => beam_search(start, &config.beam),
        Algorithm::Genetic => genetic_algorithm(start, &config.genetic, limits, rng),
        Algorithm::AndOr => and_or_search(start, &config.and_or, &RandomSwapOutcomes, rng)
            .map(|plan| plan.boards(start))
            .unwrap_or_default(),
        Algorithm::NoObservation => no_observation_search(start, &config.belief, limits, rng),
        Algorithm::PartialObservation => partial_observation_search(start, &config.belief, rng),
        Algorithm::Backtracking => backtracking(start, &config.backtracking, limits),
        Algorithm::BacktrackingForwardChecking => {
            backtracking_forward_checking(start, &config.backtracking, limits)
        }
        Algorithm::FillBacktracking => fill_backtracking(),
        Algorithm::FillForwardChecking => fill_forward_checking(),
        Algorithm::MinConflicts => min_conflicts(&config.csp, rng),
        Algorithm::QLearning => q_learning(start, &config.q_learning, rng),
    }
}

/// Outcome of one timed solver run.
#[derive(Clone, Debug, Serialize)]
pub struct SolveReport {
    pub algorithm: Algorithm,
    pub path: Vec<Board>,
    /// Number of moves, 0 when no path was found.
    pub moves: usize,
    pub elapsed: Duration,
}

impl SolveReport {
    pub fn solved(&self) -> bool {
        !self.path.is_empty()
    }
}

/// Random source for one run: seeded from `seed` if given, else from entropy.
pub fn make_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    }
}

/// Times [`solve`] with a fresh random source built from `config.seed`.
pub fn solve_with_report(algorithm: Algorithm, start: &Board, config: &SolverConfig) -> SolveReport {
    let mut rng = make_rng(config.seed);
    let started = Instant::now();
    let path = solve(algorithm, start, config, &mut rng);
    let elapsed = started.elapsed();
    let moves = path.len().saturating_sub(1);
    info!(
        "{}: {} in {:.3?}",
        algorithm,
        if path.is_empty() {
            "no solution".to_string()
        } else {
            format!("{} moves", moves)
        },
        elapsed
    );
    SolveReport {
        algorithm,
        path,
        moves,
        elapsed,
    }
}
