//! Exact-solver-backed repair.
//!
//! The oracle keeps one [`SolverSession`] for the whole run. Its base
//! program is the formulation's constraint set with one objective as the
//! minimisation target; each repair call adds a temporary bound saying
//! "the other objective must be at least as good as the candidate's"
//! and, on an optimal answer, overwrites the candidate's bits.

use std::fmt;

use tracing::debug;

use crate::error::{NrpError, Result};
use crate::exact::{
    BinaryProgram, ExactSolver, LinearConstraint, SolverConfig, SolverSession, SolverStatus,
};
use crate::problem::{CustomerForm, CustomerInstance, Formulation, LinearInstance, Solution};

/// Solver-backed repair operator.
pub struct ExactRepairOracle {
    session: SolverSession<Box<dyn ExactSolver>>,
    /// Coefficients of the objective bounded per call, over decision bits.
    bound_row: Vec<f64>,
    /// Index of the bounded objective in a solution's objective vector.
    bound_objective: usize,
    /// Leading program variables that map onto decision bits.
    decision_len: usize,
}

impl ExactRepairOracle {
    /// Builds the base program for `formulation` and opens the session.
    ///
    /// # Errors
    ///
    /// [`NrpError::Solver`] when the formulation cannot be expressed
    /// (a linear instance with fewer than two objectives) or the solver
    /// rejects the base program.
    pub fn new<S>(formulation: &Formulation, solver: S, config: SolverConfig) -> Result<Self>
    where
        S: ExactSolver + 'static,
    {
        let (program, bound_row) = match formulation {
            Formulation::Linear(instance) => linear_program(instance)?,
            Formulation::Customer { instance, form } => customer_program(instance, *form),
        };
        let decision_len = formulation.num_variables();
        let session = SolverSession::open(Box::new(solver) as Box<dyn ExactSolver>, program, config)?;
        Ok(Self {
            session,
            bound_row,
            bound_objective: 1,
            decision_len,
        })
    }

    /// The base program the session was opened with.
    pub fn program(&self) -> &BinaryProgram {
        self.session.program()
    }

    /// Re-optimises `solution` under "bounded objective no worse than now".
    ///
    /// Returns `Ok(true)` when the bits were overwritten; the caller must
    /// re-evaluate. Timeouts and infeasibility return `Ok(false)` and
    /// leave the solution untouched. `Err` is a solver failure.
    pub fn repair(&mut self, solution: &mut Solution) -> Result<bool> {
        let current = solution.objectives()[self.bound_objective];
        if !current.is_finite() {
            return Err(NrpError::Solver(
                "candidate must be evaluated before exact repair".into(),
            ));
        }

        let bound = LinearConstraint::le(LinearConstraint::dense_terms(&self.bound_row), current);
        let scoped = self.session.scoped(bound);
        let answer = scoped.solve()?;
        drop(scoped);

        if answer.status != SolverStatus::Optimal {
            debug!(event = "exact_repair_skipped", status = ?answer.status);
            return Ok(false);
        }
        for (i, selected) in answer.rounded().into_iter().take(self.decision_len).enumerate() {
            solution.set_selected(i, selected);
        }
        debug!(
            event = "exact_repair",
            objective = answer.objective_value.unwrap_or(f64::NAN),
            bound = current
        );
        Ok(true)
    }
}

impl fmt::Debug for ExactRepairOracle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExactRepairOracle")
            .field("program", &self.session.program().name)
            .field("bound_objective", &self.bound_objective)
            .finish_non_exhaustive()
    }
}

/// Inequations as `sum(a x) <= constant`, minimise objective 0, bound
/// objective 1.
fn linear_program(instance: &LinearInstance) -> Result<(BinaryProgram, Vec<f64>)> {
    let objectives = instance.objectives();
    if objectives.len() < 2 {
        return Err(NrpError::Solver(
            "exact repair needs at least two objectives".into(),
        ));
    }
    let mut program = BinaryProgram::new("linear", instance.num_variables());
    program.set_objective(objectives[0].clone());
    for inequation in instance.inequations() {
        program.add_constraint(LinearConstraint::le(
            inequation.terms().to_vec(),
            inequation.constant(),
        ));
    }
    Ok((program, objectives[1].clone()))
}

/// Requirement variables `x` followed by customer variables `y`, with
/// `y_c <= x_r` for every request. The cost row is the per-call bound.
fn customer_program(instance: &CustomerInstance, form: CustomerForm) -> (BinaryProgram, Vec<f64>) {
    let n = instance.num_requirements();
    let m = instance.num_customers();

    let mut objective = vec![0.0; n + m];
    for (c, &p) in instance.profit().iter().enumerate() {
        objective[n + c] = -p;
    }
    let name = match form {
        CustomerForm::Binary => "customer-binary",
        CustomerForm::Bincst { .. } => {
            objective[..n].copy_from_slice(instance.cost());
            "customer-bincst"
        }
        CustomerForm::Triurgency => {
            let urgency = instance.urgency().unwrap_or(&[]);
            for (i, &cost) in instance.cost().iter().enumerate() {
                objective[i] = cost - urgency.get(i).copied().unwrap_or(0.0);
            }
            "customer-triurgency"
        }
    };

    let mut program = BinaryProgram::new(name, n + m);
    program.set_objective(objective);
    for (c, needed) in instance.requests().iter().enumerate() {
        for &r in needed {
            program.add_constraint(LinearConstraint::le(vec![(n + c, 1.0), (r, -1.0)], 0.0));
        }
    }
    if let CustomerForm::Bincst { min_urgency, .. } = form {
        let urgency = instance.urgency().unwrap_or(&[]);
        program.add_constraint(LinearConstraint::ge(
            LinearConstraint::dense_terms(urgency),
            min_urgency,
        ));
    }

    (program, instance.cost().to_vec())
}
