//! Symbol alphabet for the flat prefix-order program encoding.
//!
//! A program is a sequence of [`Symbol`] tokens. Values below
//! [`OPERATIONS_START`] are terminals: `0..var_count` reference a variable of
//! the current fitness case, `var_count..var_count + const_count` reference a
//! slot in the run-wide constant table. Values in
//! `OPERATIONS_START..=OPERATIONS_END` are operators with a fixed arity, and
//! structure is recovered purely from arity during traversal.

use crate::config::ConfigError;
use rand::rngs::StdRng;
use rand::Rng;

/// A single token of an encoded program.
pub type Symbol = u16;

pub const ADD: Symbol = 110;
pub const SUB: Symbol = 111;
pub const MUL: Symbol = 112;
pub const DIV: Symbol = 113;
pub const SIN: Symbol = 114;
pub const COS: Symbol = 115;

/// First operator token; every smaller value is a terminal.
pub const OPERATIONS_START: Symbol = ADD;
/// Last binary operator token.
pub const BINARY_OPERATIONS_END: Symbol = DIV;
/// First unary operator token.
pub const UNARY_OPERATIONS_START: Symbol = SIN;
/// Last operator token.
pub const OPERATIONS_END: Symbol = COS;

/// Arity class of an operator token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpClass {
    Binary,
    Unary,
}

/// Returns `true` if the token references a variable or a constant slot.
#[inline]
pub fn is_terminal(sym: Symbol) -> bool {
    sym < OPERATIONS_START
}

/// Returns the arity class of an operator token, or `None` for terminals.
#[inline]
pub fn op_class(sym: Symbol) -> Option<OpClass> {
    if is_terminal(sym) {
        None
    } else if sym <= BINARY_OPERATIONS_END {
        Some(OpClass::Binary)
    } else {
        Some(OpClass::Unary)
    }
}

/// Number of child subtrees the token consumes during traversal.
#[inline]
pub fn arity(sym: Symbol) -> usize {
    match op_class(sym) {
        None => 0,
        Some(OpClass::Binary) => 2,
        Some(OpClass::Unary) => 1,
    }
}

/// The terminal space of a run: how many variable and constant tokens exist.
///
/// The alphabet is fixed at construction and shared by the random program
/// generator and the mutation operator, so every random token draw goes
/// through the same range definitions.
#[derive(Debug, Clone, Copy)]
pub struct Alphabet {
    var_count: usize,
    const_count: usize,
}

impl Alphabet {
    /// Builds the alphabet for `var_count` variables and `const_count`
    /// ephemeral constants.
    ///
    /// # Errors
    /// Returns [`ConfigError::TerminalRangeOverflow`] if the terminal range
    /// would collide with the operator range, and
    /// [`ConfigError::EmptyTerminalRange`] if there are no terminals at all
    /// (no leaf could ever be emitted).
    pub fn new(var_count: usize, const_count: usize) -> Result<Self, ConfigError> {
        let terminals = var_count + const_count;
        if terminals >= OPERATIONS_START as usize {
            return Err(ConfigError::TerminalRangeOverflow {
                terminals,
                operations_start: OPERATIONS_START,
            });
        }
        if terminals == 0 {
            return Err(ConfigError::EmptyTerminalRange);
        }
        Ok(Self {
            var_count,
            const_count,
        })
    }

    pub fn var_count(&self) -> usize {
        self.var_count
    }

    pub fn const_count(&self) -> usize {
        self.const_count
    }

    /// Total number of terminal tokens (variables plus constants).
    pub fn terminal_count(&self) -> usize {
        self.var_count + self.const_count
    }

    /// Draws a uniformly random terminal token.
    pub fn random_terminal(&self, rng: &mut StdRng) -> Symbol {
        rng.random_range(0..self.terminal_count()) as Symbol
    }

    /// Draws a uniformly random operator token over the full operator range.
    pub fn random_operator(&self, rng: &mut StdRng) -> Symbol {
        rng.random_range(OPERATIONS_START..=OPERATIONS_END)
    }

    /// Draws a uniformly random binary operator token.
    pub fn random_binary(&self, rng: &mut StdRng) -> Symbol {
        rng.random_range(OPERATIONS_START..=BINARY_OPERATIONS_END)
    }

    /// Draws a uniformly random unary operator token.
    pub fn random_unary(&self, rng: &mut StdRng) -> Symbol {
        rng.random_range(UNARY_OPERATIONS_START..=OPERATIONS_END)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_terminal_and_operator_ranges_are_disjoint() {
        for sym in 0..OPERATIONS_START {
            assert!(is_terminal(sym));
            assert_eq!(arity(sym), 0);
        }
        for sym in OPERATIONS_START..=OPERATIONS_END {
            assert!(!is_terminal(sym));
            assert!(arity(sym) > 0);
        }
    }

    #[test]
    fn test_operator_arity_partition() {
        assert_eq!(op_class(ADD), Some(OpClass::Binary));
        assert_eq!(op_class(SUB), Some(OpClass::Binary));
        assert_eq!(op_class(MUL), Some(OpClass::Binary));
        assert_eq!(op_class(DIV), Some(OpClass::Binary));
        assert_eq!(op_class(SIN), Some(OpClass::Unary));
        assert_eq!(op_class(COS), Some(OpClass::Unary));
        assert_eq!(op_class(0), None);
    }

    #[test]
    fn test_alphabet_rejects_terminal_overflow() {
        let result = Alphabet::new(100, 20);
        assert!(matches!(
            result,
            Err(ConfigError::TerminalRangeOverflow { terminals: 120, .. })
        ));
    }

    #[test]
    fn test_alphabet_rejects_empty_terminal_range() {
        assert!(matches!(
            Alphabet::new(0, 0),
            Err(ConfigError::EmptyTerminalRange)
        ));
    }

    #[test]
    fn test_random_draws_stay_in_range() {
        let alphabet = Alphabet::new(3, 5).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let t = alphabet.random_terminal(&mut rng);
            assert!((t as usize) < alphabet.terminal_count());

            let op = alphabet.random_operator(&mut rng);
            assert!((OPERATIONS_START..=OPERATIONS_END).contains(&op));

            let bin = alphabet.random_binary(&mut rng);
            assert_eq!(op_class(bin), Some(OpClass::Binary));

            let un = alphabet.random_unary(&mut rng);
            assert_eq!(op_class(un), Some(OpClass::Unary));
        }
    }
}
