//! The steady-state evolutionary engine.
//!
//! [`EvolutionEngine`] owns the population (a pair of index-aligned vectors:
//! programs and fitness scores), bootstraps it from the random program
//! generator, and drives generations of tournament selection, subtree
//! crossover, per-node mutation and negative-tournament eviction until the
//! problem is solved or the generation budget runs out.
//!
//! All randomness flows through one explicitly threaded [`StdRng`]. The
//! order of draws — offspring coin, parent tournament(s), operator draws,
//! eviction tournament — is a stable contract: changing it changes the whole
//! evolutionary trajectory for a given seed.

pub mod generator;

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, MutationMode, RunConfig};
use crate::data::{Dataset, FitnessCase};
use crate::report::GenerationStats;
use crate::vm::engine::{self, Bindings};
use crate::vm::op::{self, Alphabet, OpClass, Symbol};
use generator::{random_program, Program};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Best fitness exceeded the solved threshold.
    Solved,
    /// The generation budget was exhausted first.
    Exhausted,
}

/// Final report of a run: terminal status, per-generation statistics and the
/// best individual seen at any generation boundary.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub status: RunStatus,
    /// Number of generations for which statistics were produced.
    pub generations_run: usize,
    pub history: Vec<GenerationStats>,
    pub best_program: Program,
    pub best_fitness: f64,
    pub best_equation: String,
}

/// Scores a program against every fitness case: negated sum of absolute
/// errors, so higher is better and `0.0` is a perfect fit.
///
/// Each case's inputs are loaded into the variable slots of `bindings`; the
/// constant slots above them are untouched. Deterministic, no failure modes.
pub fn fitness_of(program: &[Symbol], cases: &[FitnessCase], bindings: &mut Bindings) -> f64 {
    let mut total_error = 0.0;
    for case in cases {
        bindings.load_case(&case.inputs);
        let (value, _) = engine::eval(program, 0, bindings);
        total_error += (value - case.target).abs();
    }
    -total_error
}

/// Tournament selection: `tournament_size` uniform draws with replacement,
/// returning the index with maximum fitness. The comparison is strict, so
/// among tied contestants the earliest drawn wins.
pub fn tournament(rng: &mut StdRng, fitness: &[f64], tournament_size: usize) -> usize {
    let mut best = rng.random_range(0..fitness.len());
    let mut best_fitness = f64::NEG_INFINITY;
    for _ in 0..tournament_size {
        let competitor = rng.random_range(0..fitness.len());
        if fitness[competitor] > best_fitness {
            best_fitness = fitness[competitor];
            best = competitor;
        }
    }
    best
}

/// Negative tournament: like [`tournament`] but returns the minimum-fitness
/// index, used to pick the individual an offspring replaces.
pub fn negative_tournament(rng: &mut StdRng, fitness: &[f64], tournament_size: usize) -> usize {
    let mut worst = rng.random_range(0..fitness.len());
    let mut worst_fitness = f64::INFINITY;
    for _ in 0..tournament_size {
        let competitor = rng.random_range(0..fitness.len());
        if fitness[competitor] < worst_fitness {
            worst_fitness = fitness[competitor];
            worst = competitor;
        }
    }
    worst
}

/// Subtree crossover. Picks a uniform position in each parent, resolves the
/// enclosing subtree spans via [`engine::subtree_end`], and splices parent2's
/// subtree into parent1's slot. The offspring may exceed the configured
/// maximum program length; no cap is enforced here.
pub fn crossover(rng: &mut StdRng, parent1: &[Symbol], parent2: &[Symbol]) -> Program {
    let len1 = engine::tree_len(parent1);
    let len2 = engine::tree_len(parent2);

    let xo1start = rng.random_range(0..len1);
    let xo1end = engine::subtree_end(parent1, xo1start);
    let xo2start = rng.random_range(0..len2);
    let xo2end = engine::subtree_end(parent2, xo2start);

    splice(parent1, xo1start, xo1end, len1, parent2, xo2start, xo2end)
}

/// The pure splice behind [`crossover`]:
/// `parent1[..xo1start] ++ parent2[xo2start..xo2end] ++ parent1[xo1end..len1]`.
pub fn splice(
    parent1: &[Symbol],
    xo1start: usize,
    xo1end: usize,
    len1: usize,
    parent2: &[Symbol],
    xo2start: usize,
    xo2end: usize,
) -> Program {
    let mut offspring = Vec::with_capacity(xo1start + (xo2end - xo2start) + (len1 - xo1end));
    offspring.extend_from_slice(&parent1[..xo1start]);
    offspring.extend_from_slice(&parent2[xo2start..xo2end]);
    offspring.extend_from_slice(&parent1[xo1end..len1]);
    offspring
}

/// Per-node mutation: copies the parent's logical tree span and replaces
/// each token independently with probability `rate`. Terminals become fresh
/// uniform terminals; operator handling depends on `mode`.
///
/// Under [`MutationMode::Faithful`] a mutated binary token first draws a
/// binary replacement and is then unconditionally overwritten by a unary
/// draw, while its two physical children stay in the buffer. The logical
/// tree therefore shrinks (later traversals reinterpret the stray child as a
/// sibling subtree) and the trailing tokens become unreachable junk; since
/// operators only ever lose arity, traversal stays in bounds. The junk is
/// physically dropped the next time the individual passes through mutation,
/// which copies only the logical span.
pub fn mutate(
    rng: &mut StdRng,
    parent: &[Symbol],
    alphabet: &Alphabet,
    rate: f64,
    mode: MutationMode,
) -> Program {
    let len = engine::tree_len(parent);
    let mut child = parent[..len].to_vec();
    for position in 0..len {
        if rng.random::<f64>() >= rate {
            continue;
        }
        match op::op_class(child[position]) {
            None => child[position] = alphabet.random_terminal(rng),
            Some(class) => match mode {
                MutationMode::Faithful => {
                    if class == OpClass::Binary {
                        child[position] = alphabet.random_binary(rng);
                    }
                    child[position] = alphabet.random_unary(rng);
                }
                MutationMode::ArityPreserving => {
                    child[position] = match class {
                        OpClass::Binary => alphabet.random_binary(rng),
                        OpClass::Unary => alphabet.random_unary(rng),
                    };
                }
            },
        }
    }
    child
}

/// Owns the population and orchestrates the run.
pub struct EvolutionEngine<'a> {
    config: &'a RunConfig,
    dataset: &'a Dataset,
    alphabet: Alphabet,
    /// Variable slots plus the run-wide constant table.
    bindings: Bindings,
    /// Programs and fitness scores are index-aligned; every replacement
    /// writes both.
    population: Vec<Program>,
    fitness: Vec<f64>,
    rng: StdRng,
}

impl<'a> EvolutionEngine<'a> {
    /// Builds the engine: validates the configuration against the dataset,
    /// seeds the RNG, draws the constant table and bootstraps the scored
    /// initial population.
    ///
    /// # Errors
    /// [`ConfigError`] for invalid parameters, a terminal range colliding
    /// with the operator tokens, or an empty dataset.
    pub fn new(config: &'a RunConfig, dataset: &'a Dataset) -> Result<Self, ConfigError> {
        config.validate()?;
        let alphabet = Alphabet::new(dataset.var_count, dataset.const_count)?;
        if dataset.cases.is_empty() {
            return Err(ConfigError::EmptyDataset);
        }

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        // Ephemeral constants: drawn once, shared by index across every
        // individual for the whole run.
        let span = dataset.max_random - dataset.min_random;
        let constants: Vec<f64> = (0..dataset.const_count)
            .map(|_| span * rng.random::<f64>() + dataset.min_random)
            .collect();
        let bindings = Bindings::new(dataset.var_count, constants);

        let mut engine = Self {
            config,
            dataset,
            alphabet,
            bindings,
            population: Vec::with_capacity(config.population_size),
            fitness: Vec::with_capacity(config.population_size),
            rng,
        };
        engine.initialize_population();
        Ok(engine)
    }

    fn initialize_population(&mut self) {
        info!(
            "Initializing population of {} individuals (max_len={}, depth={})",
            self.config.population_size, self.config.max_program_len, self.config.initial_depth
        );
        for _ in 0..self.config.population_size {
            let program = random_program(
                &mut self.rng,
                &self.alphabet,
                self.config.max_program_len,
                self.config.initial_depth,
            );
            let score = fitness_of(&program, &self.dataset.cases, &mut self.bindings);
            self.population.push(program);
            self.fitness.push(score);
        }
    }

    pub fn population(&self) -> &[Program] {
        &self.population
    }

    pub fn fitness(&self) -> &[f64] {
        &self.fitness
    }

    /// The register file carrying this run's constant table.
    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// One steady-state sweep: `population_size` offspring, each replacing a
    /// negative-tournament victim in place. An offspring installed early in
    /// the sweep can be selected as a parent or a victim later in the same
    /// sweep; there is no generation-boundary snapshot.
    pub fn steady_state_sweep(&mut self) {
        let t_size = self.config.tournament_size;
        for _ in 0..self.config.population_size {
            let offspring = if self.rng.random::<f64>() < self.config.crossover_rate {
                let parent1 = tournament(&mut self.rng, &self.fitness, t_size);
                let parent2 = tournament(&mut self.rng, &self.fitness, t_size);
                crossover(
                    &mut self.rng,
                    &self.population[parent1],
                    &self.population[parent2],
                )
            } else {
                let parent = tournament(&mut self.rng, &self.fitness, t_size);
                mutate(
                    &mut self.rng,
                    &self.population[parent],
                    &self.alphabet,
                    self.config.mutation_rate,
                    self.config.mutation_mode,
                )
            };
            let offspring_fitness = fitness_of(&offspring, &self.dataset.cases, &mut self.bindings);
            let victim = negative_tournament(&mut self.rng, &self.fitness, t_size);
            self.population[victim] = offspring;
            self.fitness[victim] = offspring_fitness;
        }
    }

    /// Scans the population for this generation's statistics and the index
    /// of its best individual.
    fn generation_stats(&self, generation: usize) -> (GenerationStats, usize) {
        let mut best = 0;
        let mut total_fitness = 0.0;
        let mut total_len = 0usize;
        for (index, score) in self.fitness.iter().enumerate() {
            total_fitness += score;
            total_len += engine::tree_len(&self.population[index]);
            if *score > self.fitness[best] {
                best = index;
            }
        }
        let count = self.population.len() as f64;
        let stats = GenerationStats {
            generation,
            avg_fitness: total_fitness / count,
            best_fitness: self.fitness[best],
            avg_program_len: total_len as f64 / count,
            best_equation: engine::render_infix(&self.population[best], &self.bindings),
        };
        (stats, best)
    }

    /// Runs the full state machine:
    /// `Init -> {check -> sweep}* -> Solved | Exhausted`.
    ///
    /// The solved check uses the previous generation's statistics and fires
    /// before the sweep, so a generation that would have solved the problem
    /// on the budget's final sweep still reports `Exhausted`.
    pub fn run(&mut self) -> RunOutcome {
        let (stats, best_index) = self.generation_stats(0);
        log_generation(&stats);

        let mut best_fitness = stats.best_fitness;
        let mut best_program = self.population[best_index].clone();
        let mut best_equation = stats.best_equation.clone();
        let mut last_best = stats.best_fitness;
        let mut history = vec![stats];
        let mut status = RunStatus::Exhausted;

        for generation in 1..self.config.generations {
            if last_best > self.config.solved_epsilon {
                status = RunStatus::Solved;
                break;
            }
            self.steady_state_sweep();
            let (stats, best_index) = self.generation_stats(generation);
            log_generation(&stats);
            if stats.best_fitness > best_fitness {
                best_fitness = stats.best_fitness;
                best_program = self.population[best_index].clone();
                best_equation = stats.best_equation.clone();
            }
            last_best = stats.best_fitness;
            history.push(stats);
        }
        match status {
            RunStatus::Solved => info!("Problem solved: best fitness {:.6}", best_fitness),
            RunStatus::Exhausted => info!(
                "Generation budget exhausted: best fitness {:.6}",
                best_fitness
            ),
        }

        RunOutcome {
            status,
            generations_run: history.len(),
            history,
            best_program,
            best_fitness,
            best_equation,
        }
    }
}

fn log_generation(stats: &GenerationStats) {
    info!(
        "Generation={} Avg Fitness={:.6} Best Fitness={:.6} Avg Size={:.2}",
        stats.generation, stats.avg_fitness, stats.best_fitness, stats.avg_program_len
    );
    info!("Best Individual: {}", stats.best_equation);
}
