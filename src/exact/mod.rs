//! Exact 0/1 linear programming capability.
//!
//! The repair oracle needs a solver that accepts a linear 0/1 objective
//! with linear constraints and returns an optimal (or time-limited
//! feasible) assignment. This module defines that contract and a
//! session type that owns the solver together with its base program.
//!
//! # Key Components
//!
//! - [`BinaryProgram`], [`LinearConstraint`]: the model
//! - [`ExactSolver`]: trait for solver implementations
//! - [`MicroLpSolver`]: LP-relaxation branch and bound via `microlp`
//! - [`SimpleBinarySolver`]: bounded enumeration for small programs
//! - [`SolverSession`]: base program plus scoped temporary constraints
//!
//! # Design
//!
//! Experiments use [`MicroLpSolver`]. [`SimpleBinarySolver`] enumerates
//! the whole tree, honours the time limit and serves as a reference on
//! small programs.

mod milp;
mod program;
mod session;
mod solver;

pub use milp::MicroLpSolver;
pub use program::{BinaryProgram, LinearConstraint, Sense, FEASIBILITY_TOLERANCE};
pub use session::{ScopedConstraint, SolverSession};
pub use solver::{ExactSolution, ExactSolver, SimpleBinarySolver, SolverConfig, SolverStatus};
