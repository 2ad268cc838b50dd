//! Multi-objective evolutionary engine.
//!
//! The engine is deliberately generic: it knows nothing about
//! requirements or customers, only the [`Problem`](crate::problem::Problem)
//! contract (create a solution, evaluate it) and the
//! [`StagnationTracker`](crate::termination::StagnationTracker) stopping
//! rule.
//!
//! # Key Types
//!
//! - [`Algorithm`]: initialize / step / is_done / result capability
//! - [`Nsga2`]: constrained-dominance NSGA-II
//! - [`MoeaConfig`]: population size, budget and operator rates
//!
//! # Submodules
//!
//! - [`operators`]: single-point crossover and bit-flip mutation
//! - [`multi_objective`]: dominance, non-dominated sorting and crowding distance
//!
//! # References
//!
//! - Deb et al. (2002), *A Fast and Elitist Multiobjective GA: NSGA-II*
//! - Deb (2000), *An efficient constraint handling method for genetic algorithms*

mod config;
pub mod multi_objective;
pub mod operators;
mod runner;
mod selection;

pub use config::MoeaConfig;
pub use runner::{Algorithm, Nsga2};
pub use selection::crowded_tournament;
