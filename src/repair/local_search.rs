//! Stochastic swap-neighbourhood hill climbing.

use rand::Rng;

use crate::moea::multi_objective::dominates;
use crate::problem::Solution;

/// Hill climbing over "drop one selected, add one unselected" swaps.
///
/// Each round draws one selected and one unselected index uniformly,
/// evaluates the swapped neighbour and moves to it only if it
/// Pareto-dominates the current plan without adding constraint
/// violation. The index lists are rebuilt only after an accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborhoodLocalSearch {
    rounds: usize,
}

impl NeighborhoodLocalSearch {
    pub fn new(rounds: usize) -> Self {
        Self { rounds }
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Improves an evaluated `solution` in place.
    ///
    /// `evaluate` must fill objectives and constraints for a neighbour's
    /// bits. Returns the number of accepted moves.
    pub fn improve<R, F>(&self, solution: &mut Solution, rng: &mut R, mut evaluate: F) -> usize
    where
        R: Rng,
        F: FnMut(&mut Solution),
    {
        let (mut selected, mut unselected) = solution.partition();
        let mut accepted = 0;
        for _ in 0..self.rounds {
            if selected.is_empty() || unselected.is_empty() {
                break;
            }
            let drop = selected[rng.random_range(0..selected.len())];
            let add = unselected[rng.random_range(0..unselected.len())];

            let mut neighbor = solution.clone();
            neighbor.set_selected(drop, false);
            neighbor.set_selected(add, true);
            evaluate(&mut neighbor);

            if dominates(neighbor.objectives(), solution.objectives())
                && neighbor.violation() <= solution.violation()
            {
                *solution = neighbor;
                (selected, unselected) = solution.partition();
                accepted += 1;
            }
        }
        accepted
    }
}
