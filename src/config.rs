//! Solver parameters.
//!
//! Every stochastic or bounded strategy reads its knobs from one
//! [`SolverConfig`]. Defaults reproduce the constants of the classic demo
//! program, and the whole structure round-trips through JSON so a run can be
//! reproduced from a file.
//!
//! # Examples
//!
//! ```
//! use eight_puzzle_solver::config::SolverConfig;
//!
//! let config = SolverConfig::default()
//!     .with_seed(42)
//!     .with_beam_width(8);
//! assert!(config.validate().is_ok());
//! assert_eq!(config.beam.width, 8);
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Global bound on frontier pops for exhaustive searches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchLimits {
    pub max_expansions: u64,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_expansions: 2_000_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UninformedConfig {
    /// Depth at which DLS stops pushing successors.
    pub dls_limit: u32,
    /// Largest depth bound IDS tries (exclusive).
    pub ids_max_depth: u32,
}

impl Default for UninformedConfig {
    fn default() -> Self {
        Self {
            dls_limit: 50,
            ids_max_depth: 50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnealingConfig {
    pub initial_temperature: f64,
    /// Multiplicative cooling factor applied every iteration.
    pub cooling_rate: f64,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 1000.0,
            cooling_rate: 0.95,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamConfig {
    pub width: usize,
}

impl Default for BeamConfig {
    fn default() -> Self {
        Self { width: 4 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticConfig {
    pub population_size: usize,
    pub generations: usize,
    /// Parents are drawn uniformly from this many fittest individuals.
    pub parent_pool: usize,
    pub mutation_rate: f64,
    /// Length of the random walks that seed the initial population.
    pub shuffle_steps: usize,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            generations: 100,
            parent_pool: 10,
            mutation_rate: 0.3,
            shuffle_steps: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AndOrConfig {
    pub depth_limit: u32,
}

impl Default for AndOrConfig {
    fn default() -> Self {
        Self { depth_limit: 3 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeliefConfig {
    /// Number of perturbed boards added next to the true board.
    pub perturbations: usize,
    /// Rounds of the no-observation search before giving up.
    pub max_rounds: usize,
    /// Queue pops of the partial-observation search before giving up.
    pub max_expansions: u64,
}

impl Default for BeliefConfig {
    fn default() -> Self {
        Self {
            perturbations: 1,
            max_rounds: 50,
            max_expansions: 50_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktrackingConfig {
    pub max_depth: u32,
}

impl Default for BacktrackingConfig {
    fn default() -> Self {
        Self { max_depth: 100 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CspConfig {
    /// Step budget of the min-conflicts repair.
    pub max_steps: usize,
}

impl Default for CspConfig {
    fn default() -> Self {
        Self { max_steps: 1000 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QLearningConfig {
    /// Learning rate α
    pub alpha: f64,
    /// Discount factor γ
    pub gamma: f64,
    /// Initial exploration rate
    pub epsilon: f64,
    /// Multiplicative decay per episode
    pub epsilon_decay: f64,
    pub min_epsilon: f64,
    pub episodes: usize,
    pub max_episode_steps: usize,
    /// Cap on the greedy walk that extracts the learned policy.
    pub max_policy_steps: usize,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            gamma: 0.95,
            epsilon: 1.0,
            epsilon_decay: 0.995,
            min_epsilon: 0.1,
            episodes: 500,
            max_episode_steps: 50,
            max_policy_steps: 1000,
        }
    }
}

/// All solver parameters plus the random seed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub limits: SearchLimits,
    pub uninformed: UninformedConfig,
    pub annealing: AnnealingConfig,
    pub beam: BeamConfig,
    pub genetic: GeneticConfig,
    pub and_or: AndOrConfig,
    pub belief: BeliefConfig,
    pub backtracking: BacktrackingConfig,
    pub csp: CspConfig,
    pub q_learning: QLearningConfig,
    /// Random seed for reproducibility. `None` seeds from entropy.
    pub seed: Option<u64>,
}

fn invalid(message: impl Into<String>) -> Error {
    Error::InvalidConfiguration {
        message: message.into(),
    }
}

fn check_probability(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be in [0, 1], got {value}")))
    }
}

impl SolverConfig {
    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_expansions(mut self, max_expansions: u64) -> Self {
        self.limits.max_expansions = max_expansions;
        self
    }

    pub fn with_beam_width(mut self, width: usize) -> Self {
        self.beam.width = width;
        self
    }

    pub fn with_episodes(mut self, episodes: usize) -> Self {
        self.q_learning.episodes = episodes;
        self
    }

    /// Loads a configuration from a JSON file. Missing fields take their
    /// default values.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            operation: format!("read config file {}", path.display()),
            source,
        })?;
        let config: SolverConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rejects parameter values no solver can run with.
    pub fn validate(&self) -> Result<()> {
        if self.limits.max_expansions == 0 {
            return Err(invalid("limits.max_expansions must be positive"));
        }

        let annealing = &self.annealing;
        if !(annealing.initial_temperature.is_finite() && annealing.initial_temperature > 0.0) {
            return Err(invalid(format!(
                "annealing.initial_temperature must be positive, got {}",
                annealing.initial_temperature
            )));
        }
        if !(annealing.cooling_rate > 0.0 && annealing.cooling_rate < 1.0) {
            return Err(invalid(format!(
                "annealing.cooling_rate must be in (0, 1), got {}",
                annealing.cooling_rate
            )));
        }

        if self.beam.width == 0 {
            return Err(invalid("beam.width must be positive"));
        }

        let genetic = &self.genetic;
        if genetic.population_size < 2 {
            return Err(invalid(format!(
                "genetic.population_size must be at least 2, got {}",
                genetic.population_size
            )));
        }
        if genetic.parent_pool == 0 {
            return Err(invalid("genetic.parent_pool must be positive"));
        }
        check_probability("genetic.mutation_rate", genetic.mutation_rate)?;

        let q = &self.q_learning;
        check_probability("q_learning.alpha", q.alpha)?;
        check_probability("q_learning.gamma", q.gamma)?;
        check_probability("q_learning.epsilon", q.epsilon)?;
        check_probability("q_learning.epsilon_decay", q.epsilon_decay)?;
        check_probability("q_learning.min_epsilon", q.min_epsilon)?;

        Ok(())
    }
}
