//! The problem the evolutionary engine sees: a formulation plus its
//! repair policy.

use rand::Rng;
use tracing::warn;

use super::formulation::Formulation;
use super::types::{Problem, Solution};
use crate::exact::{ExactSolver, SolverConfig};
use crate::repair::{ExactRepairOracle, NeighborhoodLocalSearch, PrecedenceRepair};

/// Which probabilistic repair runs after evaluation.
#[derive(Debug)]
pub enum Repair {
    None,
    Exact {
        oracle: ExactRepairOracle,
        probability: f64,
    },
    LocalSearch {
        search: NeighborhoodLocalSearch,
        probability: f64,
    },
}

/// A formulation with its repair operators attached.
///
/// Evaluation order: optional precedence fix-up, objective/constraint
/// computation, then with probability `p` the configured repair followed
/// by a re-evaluation of the repaired bits.
#[derive(Debug)]
pub struct ProblemModel {
    formulation: Formulation,
    fixup: Option<PrecedenceRepair>,
    repair: Repair,
}

impl ProblemModel {
    /// A model that only evaluates.
    pub fn new(formulation: Formulation) -> Self {
        Self {
            formulation,
            fixup: None,
            repair: Repair::None,
        }
    }

    /// Attaches exact repair with the given probability.
    ///
    /// A solver that cannot be set up disables repair for the whole run
    /// instead of failing it.
    pub fn with_exact_repair<S>(mut self, solver: S, config: SolverConfig, probability: f64) -> Self
    where
        S: ExactSolver + 'static,
    {
        self.repair = match ExactRepairOracle::new(&self.formulation, solver, config) {
            Ok(oracle) => Repair::Exact {
                oracle,
                probability: probability.clamp(0.0, 1.0),
            },
            Err(err) => {
                warn!(event = "exact_repair_unavailable", error = %err);
                Repair::None
            }
        };
        self
    }

    /// Attaches swap local search with the given probability.
    pub fn with_local_search(mut self, rounds: usize, probability: f64) -> Self {
        self.repair = Repair::LocalSearch {
            search: NeighborhoodLocalSearch::new(rounds),
            probability: probability.clamp(0.0, 1.0),
        };
        self
    }

    /// Clears orphaned successors before every evaluation.
    ///
    /// Has no effect on formulations without prerequisite pairs.
    pub fn with_precedence_fixup(mut self) -> Self {
        let pairs = self.formulation.precedences();
        self.fixup = (!pairs.is_empty()).then(|| PrecedenceRepair::new(pairs.to_vec()));
        self
    }

    pub fn formulation(&self) -> &Formulation {
        &self.formulation
    }

    pub fn repair(&self) -> &Repair {
        &self.repair
    }

    /// Probability with which repair currently runs (0 without repair).
    pub fn repair_probability(&self) -> f64 {
        match &self.repair {
            Repair::None => 0.0,
            Repair::Exact { probability, .. } | Repair::LocalSearch { probability, .. } => {
                *probability
            }
        }
    }
}

impl Problem for ProblemModel {
    fn num_variables(&self) -> usize {
        self.formulation.num_variables()
    }

    fn num_objectives(&self) -> usize {
        self.formulation.num_objectives()
    }

    fn num_constraints(&self) -> usize {
        self.formulation.num_constraints()
    }

    fn evaluate<R: Rng>(&mut self, solution: &mut Solution, rng: &mut R) {
        if let Some(fixup) = &self.fixup {
            fixup.apply(solution);
        }
        self.formulation.evaluate(solution);

        match &mut self.repair {
            Repair::None => {}
            Repair::LocalSearch {
                search,
                probability,
            } => {
                if rng.random::<f64>() < *probability {
                    let formulation = &self.formulation;
                    search.improve(solution, rng, |neighbor| formulation.evaluate(neighbor));
                }
            }
            Repair::Exact {
                oracle,
                probability,
            } => {
                if rng.random::<f64>() < *probability {
                    match oracle.repair(solution) {
                        Ok(true) => self.formulation.evaluate(solution),
                        Ok(false) => {}
                        Err(err) => {
                            warn!(event = "exact_repair_disabled", error = %err);
                            *probability = 0.0;
                        }
                    }
                }
            }
        }
    }
}
