//! Hybrid evaluation, repair and termination engine for the
//! multi-objective Next Release Problem (NRP).
//!
//! A release plan is a bit vector over requirements. Around a
//! constrained-dominance NSGA-II this crate provides:
//!
//! - **Problem model**: loads linear or customer-style NRP instances and
//!   evaluates plans under the selected formulation.
//! - **Repair**: a single-pass prerequisite fix-up, a stochastic swap
//!   local search, and an exact re-optimisation oracle over a 0/1 program
//!   with scoped bound constraints.
//! - **Termination**: a stagnation tracker over the feasible set with an
//!   evaluation budget.
//! - **Seeding**: a seed pool sampled without replacement and injected
//!   into the initial population.
//! - **Experiments**: a multi-run driver that dumps each run's feasible
//!   front.
//!
//! # Architecture
//!
//! The evolutionary engine in [`moea`] only knows the
//! [`Problem`](problem::Problem) contract. Repair policy lives in
//! [`ProblemModel`](problem::ProblemModel), stopping in
//! [`StagnationTracker`](termination::StagnationTracker), and the exact
//! solver behind the [`ExactSolver`](exact::ExactSolver) trait.

pub mod error;
pub mod exact;
pub mod experiment;
pub mod moea;
pub mod problem;
pub mod random;
pub mod repair;
pub mod seeds;
pub mod termination;

pub use error::{NrpError, Result};
