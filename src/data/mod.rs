//! Dataset loader for the whitespace-delimited regression format.
//!
//! The first line is a header `VARS CONSTS MIN_RANDOM MAX_RANDOM CASES`;
//! each of the following `CASES` lines holds `VARS` input values followed by
//! one target value. Any malformation is a hard failure that prevents the
//! run from starting.

use log::info;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Failed to read data file: {0}")]
    FileReadError(#[from] std::io::Error),
    #[error("Data file is empty (missing header line)")]
    MissingHeader,
    #[error("Malformed header '{0}': expected VARS CONSTS MIN_RANDOM MAX_RANDOM CASES")]
    MalformedHeader(String),
    #[error("Malformed number '{token}' on line {line}")]
    MalformedNumber { line: usize, token: String },
    #[error("Line {line} has {found} values, expected {expected} inputs plus one target")]
    WrongColumnCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("Header promises {expected} fitness cases but the file holds {found}")]
    CaseCountMismatch { expected: usize, found: usize },
    #[error("Constant range is invalid: min_random {min} exceeds max_random {max}")]
    InvalidConstantRange { min: f64, max: f64 },
}

/// One row of the dataset: an input vector plus its target output.
#[derive(Debug, Clone, PartialEq)]
pub struct FitnessCase {
    pub inputs: Vec<f64>,
    pub target: f64,
}

/// A parsed regression problem: terminal-space sizes, the sampling range for
/// ephemeral constants, and the fitness cases.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Number of input variables per fitness case.
    pub var_count: usize,
    /// Number of ephemeral constant slots to draw at run start.
    pub const_count: usize,
    /// Lower bound of the ephemeral constant range.
    pub min_random: f64,
    /// Upper bound of the ephemeral constant range.
    pub max_random: f64,
    pub cases: Vec<FitnessCase>,
}

impl Dataset {
    pub fn case_count(&self) -> usize {
        self.cases.len()
    }
}

fn parse_number(token: &str, line: usize) -> Result<f64, DataError> {
    token.parse().map_err(|_| DataError::MalformedNumber {
        line,
        token: token.to_string(),
    })
}

fn parse_count(token: &str, header: &str) -> Result<usize, DataError> {
    token
        .parse()
        .map_err(|_| DataError::MalformedHeader(header.to_string()))
}

/// Loads a dataset from disk.
pub fn load_dataset(path: &Path) -> Result<Dataset, DataError> {
    let content = fs::read_to_string(path)?;
    let dataset = parse_dataset(&content)?;
    info!(
        "Loaded dataset '{}': {} variables, {} constants in [{}, {}], {} fitness cases",
        path.display(),
        dataset.var_count,
        dataset.const_count,
        dataset.min_random,
        dataset.max_random,
        dataset.case_count()
    );
    Ok(dataset)
}

/// Parses the dataset text format. Exposed separately from [`load_dataset`]
/// so tests and callers with in-memory data can skip the filesystem.
pub fn parse_dataset(content: &str) -> Result<Dataset, DataError> {
    let mut lines = content.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());

    let (_, header) = lines.next().ok_or(DataError::MissingHeader)?;
    let fields: Vec<&str> = header.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(DataError::MalformedHeader(header.to_string()));
    }
    let var_count = parse_count(fields[0], header)?;
    let const_count = parse_count(fields[1], header)?;
    let min_random = parse_number(fields[2], 1)?;
    let max_random = parse_number(fields[3], 1)?;
    let expected_cases = parse_count(fields[4], header)?;

    if min_random > max_random {
        return Err(DataError::InvalidConstantRange {
            min: min_random,
            max: max_random,
        });
    }

    let mut cases = Vec::with_capacity(expected_cases);
    for (index, line) in lines {
        let line_no = index + 1;
        let values: Vec<f64> = line
            .split_whitespace()
            .map(|token| parse_number(token, line_no))
            .collect::<Result<_, _>>()?;
        if values.len() != var_count + 1 {
            return Err(DataError::WrongColumnCount {
                line: line_no,
                expected: var_count,
                found: values.len(),
            });
        }
        let mut inputs = values;
        let target = inputs.pop().unwrap_or_default();
        cases.push(FitnessCase { inputs, target });
    }

    if cases.len() != expected_cases {
        return Err(DataError::CaseCountMismatch {
            expected: expected_cases,
            found: cases.len(),
        });
    }

    Ok(Dataset {
        var_count,
        const_count,
        min_random,
        max_random,
        cases,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_valid_dataset() {
        let text = "2 3 -5.0 5.0 2\n\
                    1.0 2.0 3.0\n\
                    0.5 -0.5 0.0\n";
        let dataset = parse_dataset(text).unwrap();
        assert_eq!(dataset.var_count, 2);
        assert_eq!(dataset.const_count, 3);
        assert_eq!(dataset.min_random, -5.0);
        assert_eq!(dataset.max_random, 5.0);
        assert_eq!(dataset.case_count(), 2);
        assert_eq!(dataset.cases[0].inputs, vec![1.0, 2.0]);
        assert_eq!(dataset.cases[0].target, 3.0);
        assert_eq!(dataset.cases[1].target, 0.0);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let text = "1 0 0 1 2\n\n1.0 2.0\n\n2.0 4.0\n\n";
        let dataset = parse_dataset(text).unwrap();
        assert_eq!(dataset.case_count(), 2);
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(parse_dataset(""), Err(DataError::MissingHeader)));
    }

    #[test]
    fn test_malformed_header() {
        assert!(matches!(
            parse_dataset("1 0 0 1\n"),
            Err(DataError::MalformedHeader(_))
        ));
        assert!(matches!(
            parse_dataset("one 0 0 1 0\n"),
            Err(DataError::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_malformed_number_in_row() {
        let text = "1 0 0 1 1\n1.0 abc\n";
        assert!(matches!(
            parse_dataset(text),
            Err(DataError::MalformedNumber { token, .. }) if token == "abc"
        ));
    }

    #[test]
    fn test_wrong_column_count() {
        let text = "2 0 0 1 1\n1.0 2.0\n";
        assert!(matches!(
            parse_dataset(text),
            Err(DataError::WrongColumnCount {
                expected: 2,
                found: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_case_count_mismatch() {
        let text = "1 0 0 1 3\n1.0 2.0\n2.0 4.0\n";
        assert!(matches!(
            parse_dataset(text),
            Err(DataError::CaseCountMismatch {
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn test_inverted_constant_range() {
        let text = "1 1 5.0 -5.0 0\n";
        assert!(matches!(
            parse_dataset(text),
            Err(DataError::InvalidConstantRange { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "1 0 -1.0 1.0 1\n2.0 4.0\n").unwrap();
        let dataset = load_dataset(file.path()).unwrap();
        assert_eq!(dataset.case_count(), 1);
        assert_eq!(dataset.cases[0].inputs, vec![2.0]);
    }
}
