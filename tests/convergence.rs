//! End-to-end run on a trivially solvable problem: one variable, no
//! constants, target y = 2x. The initial population (512 individuals grown
//! to depth 5 over a single-terminal alphabet) contains an exact doubling
//! tree with overwhelming probability, so a fixed seed solves at the first
//! generation check.

use std::io::Write;
use tempfile::NamedTempFile;

use symgp::config::{MutationMode, RunConfig};
use symgp::data::load_dataset;
use symgp::evolution::{EvolutionEngine, RunStatus};
use symgp::report::RunReport;

fn solvable_config(seed: u64) -> RunConfig {
    RunConfig {
        population_size: 512,
        generations: 50,
        max_program_len: 1000,
        initial_depth: 5,
        seed: Some(seed),
        ..RunConfig::default()
    }
}

fn write_doubling_dataset() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "1 0 -1.0 1.0 2\n1.0 2.0\n2.0 4.0\n").unwrap();
    file
}

#[test]
fn solves_doubling_problem_for_fixed_seed() {
    let file = write_doubling_dataset();
    let dataset = load_dataset(file.path()).unwrap();
    let config = solvable_config(1234);

    let mut engine = EvolutionEngine::new(&config, &dataset).unwrap();
    let outcome = engine.run();

    assert_eq!(outcome.status, RunStatus::Solved);
    assert!(outcome.best_fitness > config.solved_epsilon);
    assert!(!outcome.best_equation.is_empty());
    // Every generation record precedes the sweep that follows it, so the
    // history is never empty and generation indices are consecutive.
    for (index, stats) in outcome.history.iter().enumerate() {
        assert_eq!(stats.generation, index);
    }
}

#[test]
fn identical_seeds_reproduce_identical_runs() {
    let file = write_doubling_dataset();
    let dataset = load_dataset(file.path()).unwrap();
    let config = solvable_config(99);

    let outcome_a = EvolutionEngine::new(&config, &dataset).unwrap().run();
    let outcome_b = EvolutionEngine::new(&config, &dataset).unwrap().run();

    assert_eq!(outcome_a.status, outcome_b.status);
    assert_eq!(outcome_a.best_fitness, outcome_b.best_fitness);
    assert_eq!(outcome_a.best_program, outcome_b.best_program);
    assert_eq!(outcome_a.history, outcome_b.history);
}

#[test]
fn arity_preserving_mode_also_solves() {
    let file = write_doubling_dataset();
    let dataset = load_dataset(file.path()).unwrap();
    let config = RunConfig {
        mutation_mode: MutationMode::ArityPreserving,
        ..solvable_config(7)
    };

    let outcome = EvolutionEngine::new(&config, &dataset).unwrap().run();
    assert_eq!(outcome.status, RunStatus::Solved);
}

#[test]
fn solved_run_exports_a_readable_report() {
    let file = write_doubling_dataset();
    let dataset = load_dataset(file.path()).unwrap();
    let config = solvable_config(42);

    let outcome = EvolutionEngine::new(&config, &dataset).unwrap().run();
    let report = RunReport::new(&outcome, &config, &dataset);

    let out = NamedTempFile::new().unwrap();
    report.write_json(out.path()).unwrap();
    let loaded = RunReport::read_json(out.path()).unwrap();

    assert_eq!(loaded.status, RunStatus::Solved);
    assert_eq!(loaded.generations.len(), outcome.history.len());
    assert_eq!(loaded.best_equation, outcome.best_equation);
    assert_eq!(loaded.dataset.var_count, 1);
}
