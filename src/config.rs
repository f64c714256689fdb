//! Run configuration: evolution parameters loaded from a TOML file, with a
//! validation pass that rejects anything the engine cannot safely run with.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::vm::op::Symbol;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileReadError(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error(
        "Terminal range overflows into the operator range: \
         {terminals} variables+constants, operators start at token {operations_start}"
    )]
    TerminalRangeOverflow {
        terminals: usize,
        operations_start: Symbol,
    },
    #[error("Terminal range is empty: at least one variable or constant is required")]
    EmptyTerminalRange,
    #[error("Dataset contains no fitness cases")]
    EmptyDataset,
    #[error("population_size must be at least 1")]
    EmptyPopulation,
    #[error("generations must be at least 1")]
    NoGenerations,
    #[error("tournament_size must be at least 1")]
    EmptyTournament,
    #[error("max_program_len must be at least 2 to fit any tree with an operator root")]
    ProgramLengthTooSmall,
    #[error("{name} must be a probability in [0, 1], got {value}")]
    ProbabilityOutOfRange { name: &'static str, value: f64 },
}

/// Which replacement rule the per-node mutation operator applies to
/// operator tokens. See [`crate::evolution`] for the behavioral difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MutationMode {
    /// Historical behavior: any mutated operator token ends up unary
    /// (a mutated binary node draws a binary replacement that is then
    /// overwritten by a unary one), while the node's physical children stay
    /// in place and are reinterpreted by later traversals.
    #[default]
    Faithful,
    /// Binary operators are replaced by binary operators and unary by unary,
    /// keeping the tree structurally intact.
    ArityPreserving,
}

/// Immutable parameters of an evolution run.
///
/// The variable/constant counts and the constant range are not part of this
/// struct: they come from the dataset header (see [`crate::data`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Number of individuals held in the steady-state population.
    pub population_size: usize,
    /// Generation budget; each generation performs `population_size`
    /// offspring/replacement steps.
    pub generations: usize,
    /// Hard cap on generated program length; longer growth attempts are
    /// resampled.
    pub max_program_len: usize,
    /// Maximum depth for initial random trees.
    pub initial_depth: usize,
    /// Contestants drawn (with replacement) per tournament.
    pub tournament_size: usize,
    /// Probability an offspring comes from crossover rather than mutation.
    pub crossover_rate: f64,
    /// Per-node replacement probability of the mutation operator.
    pub mutation_rate: f64,
    /// A run is solved once best fitness exceeds this (fitness is negated
    /// absolute error, so -1e-5 means total error below 1e-5).
    pub solved_epsilon: f64,
    /// Operator-token replacement rule for mutation.
    pub mutation_mode: MutationMode,
    /// Fixed RNG seed for reproducible runs; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            population_size: 2000,
            generations: 100,
            max_program_len: 10_000,
            initial_depth: 5,
            tournament_size: 2,
            crossover_rate: 0.9,
            mutation_rate: 0.05,
            solved_epsilon: -1e-5,
            mutation_mode: MutationMode::default(),
            seed: None,
        }
    }
}

impl RunConfig {
    /// Loads and validates a configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: RunConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects parameter combinations the engine cannot run with. Dataset
    /// dependent checks (terminal-range overflow) happen when the
    /// [`crate::vm::op::Alphabet`] is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.generations == 0 {
            return Err(ConfigError::NoGenerations);
        }
        if self.tournament_size == 0 {
            return Err(ConfigError::EmptyTournament);
        }
        if self.max_program_len < 2 {
            return Err(ConfigError::ProgramLengthTooSmall);
        }
        for (name, value) in [
            ("crossover_rate", self.crossover_rate),
            ("mutation_rate", self.mutation_rate),
        ] {
            if !(0.0..=1.0).contains(&value) || value.is_nan() {
                return Err(ConfigError::ProbabilityOutOfRange { name, value });
            }
        }
        Ok(())
    }
}
