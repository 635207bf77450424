//! # 8-Puzzle Solver Library
//!
//! Board model for the 3x3 sliding-tile puzzle plus a catalogue of search
//! strategies that solve it: uninformed and informed graph search, local
//! search, a genetic algorithm, search under nondeterminism and partial
//! observability, backtracking, a CSP formulation and tabular Q-learning.
//!
//! Every strategy takes a start board and returns the sequence of boards
//! from the start to the goal (both inclusive), or an empty vector when it
//! gives up. [`solver::solve`] dispatches on [`solver::Algorithm`].
//!
//! It is used by two binaries:
//! - `solve`: runs one algorithm on one board and prints the path.
//! - `compare`: runs a set of algorithms over seeded random boards and
//!   tabulates success rate, path length and time.
//!
//! ## Modules
//! - `engine`: `Board`, `Action`, successor generation, parity check and shuffling.
//! - `heuristics`: Manhattan distance and the other board metrics.
//! - `node`: arena-backed search tree and expansion budget shared by the searches.
//! - `uninformed`, `informed`, `local`, `genetic`, `uncertainty`,
//!   `backtracking`, `csp`, `rl`: the strategy families.
//! - `solver`: the `Algorithm` enum, `solve` and `SolveReport`.
//! - `config`: tunable parameters, loadable from JSON.
//! - `utils`: board parsing from rows and files, path checks.

pub mod backtracking;
pub mod config;
pub mod csp;
pub mod engine;
pub mod error;
pub mod genetic;
pub mod heuristics;
pub mod informed;
pub mod local;
pub mod logging;
pub mod node;
pub mod rl;
pub mod solver;
pub mod uncertainty;
pub mod uninformed;
pub mod utils;

pub use engine::{Action, Board, GOAL};
pub use error::{Error, Result};
pub use solver::{solve, solve_with_report, Algorithm, SolveReport};
