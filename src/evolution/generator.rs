//! Random program generator.
//!
//! Grows a prefix-encoded tree under a depth limit and a hard length cap.
//! The root is always an operator; below it a fair coin (or depth
//! exhaustion) decides between a uniform terminal and a uniform operator.
//! Hitting the length cap aborts the whole attempt: no partial tree ever
//! escapes, the caller simply resamples.

use log::debug;
use rand::rngs::StdRng;
use rand::Rng;

use crate::vm::op::{self, Alphabet, Symbol};

/// A grown program, as an owned token buffer.
pub type Program = Vec<Symbol>;

/// Recoverable signal: the attempt would have exceeded the length cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowOverflow;

/// Attempts to grow one tree into `buf` (cleared first).
///
/// # Errors
/// [`GrowOverflow`] when the tree would exceed `max_len`. The buffer
/// contents are unspecified after a failure; RNG consumption is the only
/// side effect that persists.
pub fn grow(
    rng: &mut StdRng,
    alphabet: &Alphabet,
    buf: &mut Program,
    max_len: usize,
    depth: usize,
) -> Result<(), GrowOverflow> {
    buf.clear();
    grow_node(rng, alphabet, buf, max_len, depth, true)
}

fn grow_node(
    rng: &mut StdRng,
    alphabet: &Alphabet,
    buf: &mut Program,
    max_len: usize,
    depth: usize,
    at_root: bool,
) -> Result<(), GrowOverflow> {
    if buf.len() >= max_len {
        return Err(GrowOverflow);
    }
    // The root is forced to be an operator so no individual is a bare
    // terminal; everywhere else a fair coin leans half the picks terminal.
    let pick_terminal = !at_root && (depth == 0 || rng.random_range(0..2) == 0);
    if pick_terminal {
        buf.push(alphabet.random_terminal(rng));
        return Ok(());
    }
    let operator = alphabet.random_operator(rng);
    buf.push(operator);
    for _ in 0..op::arity(operator) {
        grow_node(rng, alphabet, buf, max_len, depth.saturating_sub(1), false)?;
    }
    Ok(())
}

/// Grows a program, resampling on overflow until an attempt fits.
///
/// The generator is restartable with no side effects besides RNG
/// consumption, so retrying is always sound. Termination is probabilistic
/// but assured for any `max_len >= 2` (a unary root over a terminal fits).
pub fn random_program(
    rng: &mut StdRng,
    alphabet: &Alphabet,
    max_len: usize,
    depth: usize,
) -> Program {
    let mut buf = Program::new();
    let mut attempts = 0usize;
    while grow(rng, alphabet, &mut buf, max_len, depth).is_err() {
        attempts += 1;
        if attempts % 1000 == 0 {
            debug!(
                "Program generation still retrying after {} overflows (max_len={})",
                attempts, max_len
            );
        }
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::engine::tree_len;
    use crate::vm::op::is_terminal;
    use rand::SeedableRng;

    fn alphabet() -> Alphabet {
        Alphabet::new(2, 3).unwrap()
    }

    #[test]
    fn test_generated_programs_are_single_complete_trees() {
        let alphabet = alphabet();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..500 {
            let program = random_program(&mut rng, &alphabet, 10_000, 5);
            assert_eq!(
                tree_len(&program),
                program.len(),
                "traversal must consume exactly the whole buffer"
            );
        }
    }

    #[test]
    fn test_root_is_always_an_operator() {
        let alphabet = alphabet();
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..500 {
            let program = random_program(&mut rng, &alphabet, 10_000, 5);
            assert!(!is_terminal(program[0]));
        }
    }

    #[test]
    fn test_depth_zero_forces_terminal_children() {
        let alphabet = alphabet();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            // Depth 0: the root operator is still forced, every child is a
            // terminal, so programs are at most 3 tokens long.
            let program = random_program(&mut rng, &alphabet, 10_000, 0);
            assert!(!is_terminal(program[0]));
            assert!(program.len() <= 3);
            assert!(program[1..].iter().all(|&sym| is_terminal(sym)));
        }
    }

    #[test]
    fn test_length_cap_is_respected() {
        let alphabet = alphabet();
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..200 {
            let program = random_program(&mut rng, &alphabet, 5, 8);
            assert!(program.len() <= 5);
            assert_eq!(tree_len(&program), program.len());
        }
    }

    #[test]
    fn test_grow_signals_overflow_without_partial_tree_reuse() {
        let alphabet = alphabet();
        let mut rng = StdRng::seed_from_u64(5);
        let mut buf = Program::new();
        let mut saw_overflow = false;
        for _ in 0..500 {
            match grow(&mut rng, &alphabet, &mut buf, 3, 8) {
                Ok(()) => assert_eq!(tree_len(&buf), buf.len()),
                Err(GrowOverflow) => saw_overflow = true,
            }
        }
        assert!(saw_overflow, "a cap of 3 with depth 8 must overflow sometimes");
    }
}
