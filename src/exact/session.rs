//! Long-lived solver session with scoped temporary constraints.

use super::program::{BinaryProgram, LinearConstraint};
use super::solver::{ExactSolution, ExactSolver, SolverConfig};
use crate::error::Result;

/// An exact solver bound to one base program.
///
/// The base program is fixed when the session opens. Per-call constraints
/// are added through [`scoped`](SolverSession::scoped) and removed when the
/// returned guard drops, whether the solve succeeded, failed or was never
/// attempted.
#[derive(Debug)]
pub struct SolverSession<S> {
    solver: S,
    program: BinaryProgram,
    config: SolverConfig,
}

impl<S: ExactSolver> SolverSession<S> {
    /// Opens a session after the solver accepts the base program.
    ///
    /// # Errors
    ///
    /// Propagates the solver's [`prepare`](ExactSolver::prepare) failure.
    pub fn open(solver: S, program: BinaryProgram, config: SolverConfig) -> Result<Self> {
        solver.prepare(&program)?;
        Ok(Self {
            solver,
            program,
            config,
        })
    }

    pub fn program(&self) -> &BinaryProgram {
        &self.program
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solves the current program (base plus any live temporaries).
    pub fn solve(&self) -> Result<ExactSolution> {
        self.solver.solve(&self.program, &self.config)
    }

    /// Adds `constraint` for the lifetime of the returned guard.
    pub fn scoped(&mut self, constraint: LinearConstraint) -> ScopedConstraint<'_, S> {
        let base_len = self.program.constraints().len();
        self.program.add_constraint(constraint);
        ScopedConstraint {
            session: self,
            base_len,
        }
    }
}

/// Guard holding a temporary constraint in its session.
pub struct ScopedConstraint<'s, S: ExactSolver> {
    session: &'s mut SolverSession<S>,
    base_len: usize,
}

impl<S: ExactSolver> ScopedConstraint<'_, S> {
    /// Solves with the temporary constraint in place.
    pub fn solve(&self) -> Result<ExactSolution> {
        self.session.solve()
    }
}

impl<S: ExactSolver> Drop for ScopedConstraint<'_, S> {
    fn drop(&mut self) {
        self.session.program.truncate_constraints(self.base_len);
    }
}
