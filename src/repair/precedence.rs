//! Deterministic single-pass precedence fix-up.

use crate::problem::{Precedence, Solution};

/// Clears every selected successor whose predecessor is unselected.
///
/// Pairs are visited once, in order. Clearing a successor is not
/// propagated: if that successor is itself the predecessor of a pair
/// visited earlier, the earlier pair stays violated until the next call.
#[derive(Debug, Clone)]
pub struct PrecedenceRepair {
    pairs: Vec<Precedence>,
}

impl PrecedenceRepair {
    pub fn new(pairs: Vec<Precedence>) -> Self {
        Self { pairs }
    }

    pub fn pairs(&self) -> &[Precedence] {
        &self.pairs
    }

    /// Applies one pass over all pairs. Returns the number of bits cleared.
    pub fn apply(&self, solution: &mut Solution) -> usize {
        let mut cleared = 0;
        for pair in &self.pairs {
            if solution.is_selected(pair.successor) && !solution.is_selected(pair.predecessor) {
                solution.set_selected(pair.successor, false);
                cleared += 1;
            }
        }
        cleared
    }
}
