//! Recursive interpreter for prefix-encoded expression trees.
//!
//! Programs carry no parent/child pointers; structure is reconstructed from
//! operator arity alone. [`eval`] walks the token buffer with an explicit
//! position cursor returned alongside each value, and [`subtree_end`] is the
//! matching pure traversal. The two must consume identical spans: every size
//! computation and every crossover/mutation bound in the crate goes through
//! [`subtree_end`], so a divergence would silently corrupt the population.

use crate::vm::op::{self, OpClass, Symbol};
use std::fmt::Write;

/// Denominators at or below this magnitude make division return the
/// numerator unchanged. Deliberate asymmetric approximation, not a fault.
pub const PROTECTED_DIV_THRESHOLD: f64 = 0.001;

/// The register file a program is evaluated against: `var_count` variable
/// slots followed by the run-wide constant table.
///
/// Variable slots are overwritten per fitness case; constant slots are drawn
/// once at run start and never resampled.
#[derive(Debug, Clone)]
pub struct Bindings {
    slots: Vec<f64>,
    var_count: usize,
}

impl Bindings {
    /// Builds a register file with `var_count` zeroed variable slots and the
    /// given constant table occupying the slots above them.
    pub fn new(var_count: usize, constants: Vec<f64>) -> Self {
        let mut slots = vec![0.0; var_count];
        slots.extend(constants);
        Self { slots, var_count }
    }

    /// Copies one fitness case's input vector into the variable slots.
    /// Constant slots are untouched.
    pub fn load_case(&mut self, inputs: &[f64]) {
        debug_assert_eq!(inputs.len(), self.var_count);
        self.slots[..self.var_count].copy_from_slice(inputs);
    }

    pub fn var_count(&self) -> usize {
        self.var_count
    }

    /// Value bound to a terminal token.
    #[inline]
    pub fn value_of(&self, sym: Symbol) -> f64 {
        self.slots[sym as usize]
    }

    /// The shared constant table (slots above the variables).
    pub fn constants(&self) -> &[f64] {
        &self.slots[self.var_count..]
    }
}

/// Evaluates the subtree rooted at `pos` and returns its value together with
/// the position immediately after the consumed span.
///
/// There are no error paths: any structurally valid sequence whose terminal
/// tokens fit the bindings is fully consumable. Division is protected by
/// [`PROTECTED_DIV_THRESHOLD`].
pub fn eval(seq: &[Symbol], pos: usize, bindings: &Bindings) -> (f64, usize) {
    let sym = seq[pos];
    if op::is_terminal(sym) {
        return (bindings.value_of(sym), pos + 1);
    }
    match sym {
        op::ADD => {
            let (lhs, next) = eval(seq, pos + 1, bindings);
            let (rhs, end) = eval(seq, next, bindings);
            (lhs + rhs, end)
        }
        op::SUB => {
            let (lhs, next) = eval(seq, pos + 1, bindings);
            let (rhs, end) = eval(seq, next, bindings);
            (lhs - rhs, end)
        }
        op::MUL => {
            let (lhs, next) = eval(seq, pos + 1, bindings);
            let (rhs, end) = eval(seq, next, bindings);
            (lhs * rhs, end)
        }
        op::DIV => {
            let (num, next) = eval(seq, pos + 1, bindings);
            let (den, end) = eval(seq, next, bindings);
            if den.abs() <= PROTECTED_DIV_THRESHOLD {
                (num, end)
            } else {
                (num / den, end)
            }
        }
        op::SIN => {
            let (arg, end) = eval(seq, pos + 1, bindings);
            (arg.sin(), end)
        }
        op::COS => {
            let (arg, end) = eval(seq, pos + 1, bindings);
            (arg.cos(), end)
        }
        // Unknown token: consumed as an inert leaf, same as subtree_end.
        _ => (0.0, pos + 1),
    }
}

/// Returns the position immediately after the subtree rooted at `pos`,
/// using the same arity rules as [`eval`] but without evaluating anything.
pub fn subtree_end(seq: &[Symbol], pos: usize) -> usize {
    let mut end = pos + 1;
    for _ in 0..op::arity(seq[pos]) {
        end = subtree_end(seq, end);
    }
    end
}

/// Length of the tree rooted at position 0. For a well-formed program this
/// equals the buffer length.
pub fn tree_len(seq: &[Symbol]) -> usize {
    subtree_end(seq, 0)
}

/// Renders the tree rooted at position 0 as a fully parenthesized infix
/// string: variables as `X1..XV`, constants as their literal value.
pub fn render_infix(seq: &[Symbol], bindings: &Bindings) -> String {
    let mut out = String::new();
    render_at(seq, 0, bindings, &mut out);
    out
}

fn render_at(seq: &[Symbol], pos: usize, bindings: &Bindings, out: &mut String) -> usize {
    let sym = seq[pos];
    if op::is_terminal(sym) {
        if (sym as usize) < bindings.var_count() {
            let _ = write!(out, "X{}", sym + 1);
        } else {
            let _ = write!(out, "{}", bindings.value_of(sym));
        }
        return pos + 1;
    }
    match op::op_class(sym) {
        Some(OpClass::Binary) => {
            let infix = match sym {
                op::ADD => " + ",
                op::SUB => " - ",
                op::MUL => " * ",
                _ => " / ",
            };
            out.push('(');
            let next = render_at(seq, pos + 1, bindings, out);
            out.push_str(infix);
            let end = render_at(seq, next, bindings, out);
            out.push(')');
            end
        }
        Some(OpClass::Unary) => {
            let name = if sym == op::SIN { "sin" } else { "cos" };
            out.push('(');
            out.push_str(name);
            out.push('(');
            let end = render_at(seq, pos + 1, bindings, out);
            out.push_str("))");
            end
        }
        None => unreachable!("terminal handled above"),
    }
}
