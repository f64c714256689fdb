//! symgp: symbolic regression via tree-based genetic programming.
//!
//! The user provides a dataset file (header `VARS CONSTS MIN_RANDOM
//! MAX_RANDOM CASES`, then one line per fitness case) and optionally a TOML
//! configuration; the program evolves expressions until the dataset is fit
//! within the solved threshold or the generation budget runs out.
//!
//! Exit codes: 0 solved, 1 budget exhausted, 2 configuration or data error.

use clap::Parser;
use std::path::PathBuf;
use std::process;

use symgp::config::RunConfig;
use symgp::data::load_dataset;
use symgp::evolution::{EvolutionEngine, RunStatus};
use symgp::report::RunReport;

#[derive(Parser)]
#[command(name = "symgp", version, about = "Symbolic regression with genetic programming")]
struct Cli {
    /// Dataset file to fit.
    dataset: PathBuf,
    /// TOML run configuration; defaults apply if omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// RNG seed; overrides the configured seed for reproducible runs.
    #[arg(short, long)]
    seed: Option<u64>,
    /// Write a JSON run report to this path on completion.
    #[arg(short, long, value_name = "FILE")]
    export: Option<PathBuf>,
}

fn print_parameters(config: &RunConfig) {
    log::info!("-- symgp --");
    log::info!("POPULATION_SIZE={}", config.population_size);
    log::info!("GENERATIONS={}", config.generations);
    log::info!("MAX_PROGRAM_LEN={}", config.max_program_len);
    log::info!("INITIAL_DEPTH={}", config.initial_depth);
    log::info!("TOURNAMENT_SIZE={}", config.tournament_size);
    log::info!("CROSSOVER_RATE={}", config.crossover_rate);
    log::info!("MUTATION_RATE={}", config.mutation_rate);
    log::info!("SOLVED_EPSILON={}", config.solved_epsilon);
    log::info!("MUTATION_MODE={:?}", config.mutation_mode);
    match config.seed {
        Some(seed) => log::info!("SEED={}", seed),
        None => log::info!("SEED=<from OS>"),
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(path) => match RunConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Failed to load configuration: {}", e);
                process::exit(2);
            }
        },
        None => RunConfig::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    let dataset = match load_dataset(&cli.dataset) {
        Ok(dataset) => dataset,
        Err(e) => {
            log::error!("Failed to load dataset: {}", e);
            process::exit(2);
        }
    };

    print_parameters(&config);

    let mut engine = match EvolutionEngine::new(&config, &dataset) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("Invalid run setup: {}", e);
            process::exit(2);
        }
    };
    let outcome = engine.run();

    if let Some(path) = cli.export {
        let report = RunReport::new(&outcome, &config, &dataset);
        match report.write_json(&path) {
            Ok(()) => log::info!("Run report written to {}", path.display()),
            Err(e) => {
                log::error!("Failed to write run report: {}", e);
                process::exit(2);
            }
        }
    }

    println!("Best Individual: {}", outcome.best_equation);
    match outcome.status {
        RunStatus::Solved => {
            println!("PROBLEM SOLVED");
            process::exit(0);
        }
        RunStatus::Exhausted => {
            println!("PROBLEM *NOT* SOLVED");
            process::exit(1);
        }
    }
}
