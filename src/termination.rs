//! Stagnation-based adaptive termination.
//!
//! [`StagnationTracker`] watches the feasible part of each generation.
//! The search is considered to be progressing while new feasible bit
//! patterns keep appearing; once `patience` consecutive generations bring
//! nothing new, or the evaluation budget is spent, the tracker signals
//! the engine to stop.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::problem::{Fingerprint, Solution};

/// Tracker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    /// No feasible solution observed yet.
    Warming,
    /// An elite set exists and the search has not stopped.
    Stable,
    /// Patience or budget ran out. Terminal.
    Exhausted,
}

/// Elite-set stagnation tracker.
#[derive(Debug, Clone)]
pub struct StagnationTracker {
    patience: usize,
    max_evaluations: usize,
    elite: HashSet<Fingerprint>,
    stagnant_generations: usize,
    state: TrackerState,
}

impl StagnationTracker {
    /// Creates a tracker. A `patience` of 0 disables stagnation stopping.
    pub fn new(patience: usize, max_evaluations: usize) -> Self {
        Self {
            patience,
            max_evaluations,
            elite: HashSet::new(),
            stagnant_generations: 0,
            state: TrackerState::Warming,
        }
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    /// Consecutive generations without a new feasible fingerprint.
    pub fn stagnant_generations(&self) -> usize {
        self.stagnant_generations
    }

    /// Fingerprints of the most recent improving feasible subset.
    pub fn elite(&self) -> &HashSet<Fingerprint> {
        &self.elite
    }

    /// Records one generation and returns whether the search should stop.
    ///
    /// `evaluations` is the total number of evaluations spent so far.
    /// An empty feasible subset leaves the elite set and counter
    /// untouched; only the budget can stop the search then.
    pub fn observe(&mut self, population: &[Solution], evaluations: usize) -> bool {
        if self.state == TrackerState::Exhausted {
            return true;
        }

        let feasible: HashSet<Fingerprint> = population
            .iter()
            .filter(|s| s.is_feasible())
            .map(Solution::fingerprint)
            .collect();

        if !feasible.is_empty() {
            if feasible.iter().any(|f| !self.elite.contains(f)) {
                self.elite = feasible;
                self.stagnant_generations = 0;
                self.state = TrackerState::Stable;
            } else {
                self.stagnant_generations += 1;
            }
        }

        if evaluations >= self.max_evaluations {
            debug!(
                event = "budget_exhausted",
                evaluations,
                max_evaluations = self.max_evaluations
            );
            self.state = TrackerState::Exhausted;
            return true;
        }
        if self.patience > 0 && self.stagnant_generations >= self.patience {
            info!(
                event = "patience_exhausted",
                evaluations,
                patience = self.patience,
                elite = self.elite.len()
            );
            self.state = TrackerState::Exhausted;
            return true;
        }
        false
    }
}
