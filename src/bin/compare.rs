use clap::Parser;
use eight_puzzle_solver::config::SolverConfig;
use eight_puzzle_solver::engine::{shuffle, Board, GOAL};
use eight_puzzle_solver::logging::init_logging;
use eight_puzzle_solver::solver::{solve_with_report, Algorithm};
use log::LevelFilter;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Compare search strategies on random 8-puzzle boards", long_about = None)]
struct Args {
    /// Number of random boards
    #[clap(short = 'n', long, default_value_t = 20)]
    boards: usize,

    /// Random moves from the goal used to scramble each board
    #[clap(long, default_value_t = 20)]
    scramble: usize,

    /// Seed of the first board; board i uses seed + i
    #[clap(short, long, default_value_t = 0)]
    seed: u64,

    /// Strategies to compare; all of them if omitted
    #[clap(short, long, value_enum, value_delimiter = ',')]
    algorithms: Vec<Algorithm>,

    /// JSON file with solver parameters
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Log level for stderr
    #[clap(long, default_value_t = LevelFilter::Warn)]
    log_level: LevelFilter,
}

#[derive(Default)]
struct Tally {
    solved: usize,
    total_moves: usize,
    total_time: Duration,
    runs: usize,
}

fn run(args: Args) -> eight_puzzle_solver::Result<()> {
    init_logging(args.log_level, None)?;

    let base_config = match &args.config {
        Some(path) => SolverConfig::from_json_file(path)?,
        None => SolverConfig::default(),
    };
    let algorithms: Vec<Algorithm> = if args.algorithms.is_empty() {
        Algorithm::ALL.to_vec()
    } else {
        args.algorithms.clone()
    };

    let mut tallies: HashMap<Algorithm, Tally> = HashMap::new();
    println!("Comparing {} strategies on {} boards...", algorithms.len(), args.boards);

    for board_idx in 0..args.boards {
        let current_seed = args.seed + board_idx as u64;
        let mut rng = SmallRng::seed_from_u64(current_seed);
        let board: Board = shuffle(&GOAL, args.scramble, &mut rng);
        let config = base_config.clone().with_seed(current_seed);

        println!(
            "\nBoard {} (seed {}, heuristic {}):\n{}",
            board_idx,
            current_seed,
            board.heuristic(),
            board
        );

        for &algorithm in &algorithms {
            let report = solve_with_report(algorithm, &board, &config);
            let tally = tallies.entry(algorithm).or_default();
            tally.runs += 1;
            tally.total_time += report.elapsed;
            if report.solved() {
                tally.solved += 1;
                tally.total_moves += report.moves;
            }
            println!(
                "  {:<30} {:<12} {:>10.3?}",
                algorithm.name(),
                if report.solved() {
                    format!("{} moves", report.moves)
                } else {
                    "failed".to_string()
                },
                report.elapsed
            );
        }
    }

    println!("\n--- Comparison Complete ---");
    println!(
        "{:<30} {:>8} {:>12} {:>14}",
        "strategy", "success", "mean moves", "mean time"
    );
    for algorithm in &algorithms {
        let Some(tally) = tallies.get(algorithm) else {
            continue;
        };
        if tally.runs == 0 {
            continue;
        }
        let success = 100.0 * tally.solved as f64 / tally.runs as f64;
        let mean_moves = if tally.solved == 0 {
            "-".to_string()
        } else {
            format!("{:.2}", tally.total_moves as f64 / tally.solved as f64)
        };
        let mean_time = tally.total_time / tally.runs as u32;
        println!(
            "{:<30} {:>7.1}% {:>12} {:>14.3?}",
            algorithm.name(),
            success,
            mean_moves,
            mean_time
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
