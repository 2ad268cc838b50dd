//! Repair operators applied around evaluation.
//!
//! - [`PrecedenceRepair`]: deterministic single-pass prerequisite fix-up
//! - [`NeighborhoodLocalSearch`]: stochastic swap hill climbing
//! - [`ExactRepairOracle`]: re-optimisation through an exact solver
//!
//! None of them decide *when* to run; [`ProblemModel`](crate::problem::ProblemModel)
//! owns the repair probabilities.

mod exact;
mod local_search;
mod precedence;

pub use exact::ExactRepairOracle;
pub use local_search::NeighborhoodLocalSearch;
pub use precedence::PrecedenceRepair;
