//! Run reporting: per-generation statistics and a JSON export of the whole
//! run for downstream consumers (spreadsheet/formula tooling, symbolic
//! simplifiers) and for reproducibility.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::config::RunConfig;
use crate::data::Dataset;
use crate::evolution::{RunOutcome, RunStatus};

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One generation's statistics record, emitted once per generation boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: usize,
    /// Mean fitness over the population (fitness is negated absolute error).
    pub avg_fitness: f64,
    pub best_fitness: f64,
    /// Mean program length in tokens.
    pub avg_program_len: f64,
    /// Parenthesized infix rendering of the generation's best individual,
    /// variables as `X1..XV`, constants as literals.
    pub best_equation: String,
}

/// Shape of the dataset a run was scored against, for the report header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub var_count: usize,
    pub const_count: usize,
    pub case_count: usize,
}

impl From<&Dataset> for DatasetSummary {
    fn from(dataset: &Dataset) -> Self {
        Self {
            var_count: dataset.var_count,
            const_count: dataset.const_count,
            case_count: dataset.case_count(),
        }
    }
}

/// Complete record of a finished run, serialized to JSON on request.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunReport {
    /// Schema version for forward/backward compatibility.
    pub schema_version: String,
    /// Unix timestamp when the report was generated.
    pub generated_at: i64,
    pub status: RunStatus,
    pub config: RunConfig,
    pub dataset: DatasetSummary,
    pub generations: Vec<GenerationStats>,
    pub best_fitness: f64,
    pub best_equation: String,
}

impl RunReport {
    /// Assembles the report from a finished run.
    pub fn new(outcome: &RunOutcome, config: &RunConfig, dataset: &Dataset) -> Self {
        Self {
            schema_version: "1.0.0".to_string(),
            generated_at: chrono::Utc::now().timestamp(),
            status: outcome.status,
            config: config.clone(),
            dataset: DatasetSummary::from(dataset),
            generations: outcome.history.clone(),
            best_fitness: outcome.best_fitness,
            best_equation: outcome.best_equation.clone(),
        }
    }

    /// Writes the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<(), ReportError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reads a previously written report.
    pub fn read_json(path: &Path) -> Result<Self, ReportError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
