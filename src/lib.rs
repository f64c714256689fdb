//! symgp is a tree-based genetic programming engine for symbolic regression.
//! It evolves a population of arithmetic expressions, encoded as flat prefix
//! token buffers, to minimize absolute error against a dataset of
//! input/output pairs.
//!
//! The crate ships both as a library and as the `symgp` command-line program.
//! The library exposes the expression encoding and interpreter ([`vm`]), the
//! steady-state evolutionary engine ([`evolution`]), the dataset loader
//! ([`data`]) and the run reporting types ([`report`]).

pub mod config;
pub mod data;
pub mod evolution;
pub mod report;
pub mod vm;
