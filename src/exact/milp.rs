//! Branch-and-bound backend built on `microlp`.

use std::time::Instant;

use microlp::{ComparisonOp, Error, OptimizationDirection, Problem, Variable};
use tracing::debug;

use super::program::{BinaryProgram, Sense};
use super::solver::{ExactSolution, ExactSolver, SolverConfig, SolverStatus};
use crate::error::{NrpError, Result};

/// Solves 0/1 programs with `microlp`'s LP-relaxation branch and bound.
///
/// Every program variable becomes a binary variable; the objective is
/// minimised. A returned solution is proven optimal.
///
/// # Limitations
///
/// - `microlp` exposes no interruption hook, so `time_limit` is not
///   enforced during a solve. An overrun is logged.
/// - Always single-threaded; `num_workers` is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLpSolver;

impl MicroLpSolver {
    pub fn new() -> Self {
        Self
    }
}

impl ExactSolver for MicroLpSolver {
    fn solve(&self, program: &BinaryProgram, config: &SolverConfig) -> Result<ExactSolution> {
        if program.validate().is_err() {
            return Ok(ExactSolution::empty(SolverStatus::ModelInvalid));
        }
        let start = Instant::now();

        let mut problem = Problem::new(OptimizationDirection::Minimize);
        let vars: Vec<Variable> = (0..program.num_variables())
            .map(|j| problem.add_binary_var(program.objective().get(j).copied().unwrap_or(0.0)))
            .collect();
        for constraint in program.constraints() {
            let op = match constraint.sense {
                Sense::Le => ComparisonOp::Le,
                Sense::Ge => ComparisonOp::Ge,
            };
            problem.add_constraint(
                constraint.terms.iter().map(|&(j, a)| (vars[j], a)),
                op,
                constraint.rhs,
            );
        }

        let outcome = problem.solve();
        let solve_time = start.elapsed();
        if solve_time > config.time_limit {
            debug!(
                event = "exact_time_limit_overrun",
                program = %program.name,
                elapsed_secs = solve_time.as_secs_f64(),
            );
        }

        match outcome {
            Ok(solution) => {
                // branch and bound leaves integral values up to rounding noise
                let values: Vec<f64> = vars.iter().map(|&v| solution[v].round()).collect();
                Ok(ExactSolution {
                    status: SolverStatus::Optimal,
                    values,
                    objective_value: Some(solution.objective()),
                    solve_time,
                })
            }
            Err(Error::Infeasible) => Ok(ExactSolution {
                solve_time,
                ..ExactSolution::empty(SolverStatus::Infeasible)
            }),
            // a bounded domain cannot be unbounded unless the data is broken
            Err(Error::Unbounded) => Ok(ExactSolution {
                solve_time,
                ..ExactSolution::empty(SolverStatus::ModelInvalid)
            }),
            Err(other) => Err(NrpError::Solver(other.to_string())),
        }
    }
}
