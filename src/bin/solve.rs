use clap::Parser;
use eight_puzzle_solver::config::SolverConfig;
use eight_puzzle_solver::engine::{is_solvable, Board};
use eight_puzzle_solver::logging::init_logging;
use eight_puzzle_solver::solver::{solve_with_report, Algorithm};
use eight_puzzle_solver::utils::{path_actions, read_board_file};
use log::LevelFilter;
use std::path::PathBuf;
use std::process::ExitCode;

const DEMO_BOARD: &str = "2 6 5 / 0 8 7 / 4 3 1";

#[derive(Parser, Debug)]
#[clap(author, version, about = "Solve an 8-puzzle board with one search strategy", long_about = None)]
struct Args {
    /// Search strategy to run
    #[clap(short, long, value_enum, default_value_t = Algorithm::AStar)]
    algorithm: Algorithm,

    /// Board as nine cells in row-major order, e.g. "123456780" or "1 2 3/4 5 6/7 8 ."
    #[clap(short, long, conflicts_with = "board_file")]
    board: Option<String>,

    /// Path to a board file (three rows of three cells)
    board_file: Option<PathBuf>,

    /// JSON file with solver parameters
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Random seed, overrides the seed in the config file
    #[clap(short, long)]
    seed: Option<u64>,

    /// Print the report as JSON instead of text
    #[clap(long)]
    json: bool,

    /// Log level for stderr
    #[clap(long, default_value_t = LevelFilter::Warn)]
    log_level: LevelFilter,

    /// Also write debug logs to this file
    #[clap(long)]
    log_file: Option<PathBuf>,
}

fn load_board(args: &Args) -> eight_puzzle_solver::Result<Board> {
    match (&args.board, &args.board_file) {
        (Some(cells), _) => cells.parse(),
        (None, Some(path)) => read_board_file(path),
        (None, None) => DEMO_BOARD.parse(),
    }
}

fn run(args: Args) -> eight_puzzle_solver::Result<()> {
    init_logging(args.log_level, args.log_file.as_deref())?;

    let mut config = match &args.config {
        Some(path) => SolverConfig::from_json_file(path)?,
        None => SolverConfig::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    let board = load_board(&args)?;

    if !args.json {
        println!("Initial board:\n{}\n", board);
        if args.algorithm.uses_start_board() && !is_solvable(&board) {
            println!("Warning: this board fails the parity check and cannot reach the goal.\n");
        }
        println!("Running {}...\n", args.algorithm);
    }

    let report = solve_with_report(args.algorithm, &board, &config);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if !report.solved() {
        println!("No solution found ({:.3?}).", report.elapsed);
        return Ok(());
    }

    println!("Solution found in {:.3?}: {} moves", report.elapsed, report.moves);
    if let Some(actions) = path_actions(&report.path) {
        let moves: String = actions.iter().map(|a| a.to_char()).collect();
        if !moves.is_empty() {
            println!("Blank moves: {}", moves);
        }
    }
    println!();
    for (i, step) in report.path.iter().enumerate() {
        println!("Step {}:\n{}\n", i, step);
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
