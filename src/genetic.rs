//! Genetic algorithm over board configurations.
//!
//! Individuals are boards, not move sequences. The population evolves in
//! configuration space towards low Manhattan distance; the best individual is
//! then handed to BFS, which turns it into an actual move path to the goal.

use crate::config::{GeneticConfig, SearchLimits};
use crate::engine::{is_solvable, shuffle, Board, CELL_COUNT};
use crate::uninformed::bfs;
use log::{debug, info, warn};
use rand::seq::SliceRandom;
use rand::Rng;

/// Higher is better; the goal scores 0.
pub fn fitness(board: &Board) -> i64 {
    -i64::from(board.heuristic())
}

/// Order-preserving crossover: the first `split` cells of `first` followed by
/// the remaining values in the order they appear in `second`.
///
/// # Examples
/// ```
/// use eight_puzzle_solver::engine::Board;
/// use eight_puzzle_solver::genetic::crossover;
///
/// let a = Board::from_cells([1, 2, 3, 4, 5, 6, 7, 8, 0]).unwrap();
/// let b = Board::from_cells([8, 7, 6, 5, 4, 3, 2, 1, 0]).unwrap();
/// let child = crossover(&a, &b, 3);
/// assert_eq!(child.cells(), &[1, 2, 3, 8, 7, 6, 5, 4, 0]);
/// ```
pub fn crossover(first: &Board, second: &Board, split: usize) -> Board {
    let split = split.min(CELL_COUNT);
    let prefix = &first.cells()[..split];
    let mut cells = [0u8; CELL_COUNT];
    cells[..split].copy_from_slice(prefix);
    let rest = second.cells().iter().filter(|v| !prefix.contains(*v));
    for (cell, &value) in cells[split..].iter_mut().zip(rest) {
        *cell = value;
    }
    // Both parents are permutations, so the child is one as well.
    Board::from_cells(cells).unwrap_or(*first)
}

/// Swaps two distinct random cells.
pub fn mutate<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Board {
    let i = rng.gen_range(0..CELL_COUNT);
    let mut j = rng.gen_range(0..CELL_COUNT - 1);
    if j >= i {
        j += 1;
    }
    board.swap_cells(i, j)
}

/// Population of solvable boards.
#[derive(Clone, Debug)]
pub struct Population {
    individuals: Vec<Board>,
}

impl Population {
    /// Seeds a population with `start` plus random walks from it.
    ///
    /// Returns `None` when `start` fails the parity check: every random walk
    /// from it would fail the check as well.
    pub fn seed<R: Rng + ?Sized>(start: &Board, config: &GeneticConfig, rng: &mut R) -> Option<Self> {
        if !is_solvable(start) {
            return None;
        }
        let mut individuals = Vec::with_capacity(config.population_size);
        individuals.push(*start);
        while individuals.len() < config.population_size {
            let candidate = shuffle(start, config.shuffle_steps, rng);
            if is_solvable(&candidate) {
                individuals.push(candidate);
            }
        }
        Some(Population { individuals })
    }

    pub fn individuals(&self) -> &[Board] {
        &self.individuals
    }

    /// Fittest individual; ties go to the earliest.
    pub fn best(&self) -> Option<&Board> {
        self.individuals
            .iter()
            .fold(None, |best: Option<&Board>, candidate| match best {
                Some(b) if fitness(b) >= fitness(candidate) => Some(b),
                _ => Some(candidate),
            })
    }

    /// Produces the next generation.
    ///
    /// The best individual survives unchanged. The rest are children of two
    /// parents drawn uniformly (with replacement) from the `parent_pool`
    /// fittest, optionally mutated, and admitted only if solvable.
    pub fn evolve<R: Rng + ?Sized>(&self, config: &GeneticConfig, rng: &mut R) -> Population {
        let mut ranked = self.individuals.clone();
        ranked.sort_by_key(|b| std::cmp::Reverse(fitness(b)));
        let pool = &ranked[..config.parent_pool.min(ranked.len())];

        let mut next = Vec::with_capacity(config.population_size);
        next.extend(ranked.first().copied());
        while next.len() < config.population_size {
            let (Some(first), Some(second)) = (pool.choose(rng), pool.choose(rng)) else {
                break;
            };
            let split = rng.gen_range(1..CELL_COUNT - 1);
            let mut child = crossover(first, second, split);
            if rng.gen::<f64>() < config.mutation_rate {
                child = mutate(&child, rng);
            }
            if is_solvable(&child) {
                next.push(child);
            }
        }
        Population { individuals: next }
    }
}

/// Runs the genetic algorithm and returns the BFS path from the best
/// individual found to the goal.
///
/// Returns an empty vector when `start` is not solvable.
pub fn genetic_algorithm<R: Rng + ?Sized>(
    start: &Board,
    config: &GeneticConfig,
    limits: SearchLimits,
    rng: &mut R,
) -> Vec<Board> {
    let Some(mut population) = Population::seed(start, config, rng) else {
        warn!("genetic_algorithm: start board fails the parity check");
        return Vec::new();
    };
    let mut best_ever = *start;

    for generation in 0..config.generations {
        if let Some(&best) = population.best() {
            if fitness(&best) > fitness(&best_ever) {
                best_ever = best;
            }
        }
        debug!("genetic_algorithm: generation {} best fitness {}", generation, fitness(&best_ever));
        if fitness(&best_ever) == 0 {
            break;
        }
        population = population.evolve(config, rng);
    }
    if let Some(&best) = population.best() {
        if fitness(&best) > fitness(&best_ever) {
            best_ever = best;
        }
    }

    info!("genetic_algorithm: best individual has heuristic {}", best_ever.heuristic());
    bfs(&best_ever, limits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::GOAL;
    use crate::utils::is_valid_path;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_crossover_keeps_permutation() {
        let mut rng = SmallRng::seed_from_u64(4);
        for _ in 0..100 {
            let a = shuffle(&GOAL, 30, &mut rng);
            let b = shuffle(&GOAL, 30, &mut rng);
            let split = rng.gen_range(1..CELL_COUNT - 1);
            let child = crossover(&a, &b, split);
            assert!(Board::from_cells(*child.cells()).is_ok());
            assert_eq!(&child.cells()[..split], &a.cells()[..split]);
        }
    }

    #[test]
    fn test_mutate_swaps_two_cells() {
        let mut rng = SmallRng::seed_from_u64(9);
        for _ in 0..50 {
            let mutated = mutate(&GOAL, &mut rng);
            let differing = mutated
                .cells()
                .iter()
                .zip(GOAL.cells())
                .filter(|(a, b)| a != b)
                .count();
            assert_eq!(differing, 2);
        }
    }

    #[test]
    fn test_every_admitted_individual_is_solvable() {
        let mut rng = SmallRng::seed_from_u64(12);
        let config = GeneticConfig::default();
        let start: Board = "2 6 5 / . 8 7 / 4 3 1".parse().unwrap();
        let mut population = Population::seed(&start, &config, &mut rng).unwrap();
        for _ in 0..20 {
            assert_eq!(population.individuals().len(), config.population_size);
            assert!(population.individuals().iter().all(is_solvable));
            population = population.evolve(&config, &mut rng);
        }
    }

    #[test]
    fn test_elitism_never_loses_best() {
        let mut rng = SmallRng::seed_from_u64(13);
        let config = GeneticConfig::default();
        let start: Board = "2 6 5 / . 8 7 / 4 3 1".parse().unwrap();
        let mut population = Population::seed(&start, &config, &mut rng).unwrap();
        let mut best = fitness(population.best().unwrap());
        for _ in 0..20 {
            population = population.evolve(&config, &mut rng);
            let now = fitness(population.best().unwrap());
            assert!(now >= best);
            best = now;
        }
    }

    #[test]
    fn test_unsolvable_start_returns_empty() {
        let mut rng = SmallRng::seed_from_u64(1);
        let unsolvable = GOAL.swap_cells(0, 1);
        assert!(Population::seed(&unsolvable, &GeneticConfig::default(), &mut rng).is_none());
        let path = genetic_algorithm(
            &unsolvable,
            &GeneticConfig::default(),
            SearchLimits::default(),
            &mut rng,
        );
        assert!(path.is_empty());
    }

    #[test]
    fn test_goal_start_returns_goal() {
        let mut rng = SmallRng::seed_from_u64(1);
        let path = genetic_algorithm(&GOAL, &GeneticConfig::default(), SearchLimits::default(), &mut rng);
        assert_eq!(path, vec![GOAL]);
    }

    #[test]
    fn test_result_is_valid_path_to_goal() {
        let mut rng = SmallRng::seed_from_u64(6);
        let start: Board = "1 2 3 / . 4 5 / 7 8 6".parse().unwrap();
        let path = genetic_algorithm(&start, &GeneticConfig::default(), SearchLimits::default(), &mut rng);
        assert!(is_valid_path(&path));
        assert_eq!(path.last(), Some(&GOAL));
    }
}
