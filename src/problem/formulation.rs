//! NRP formulations as tagged variants.
//!
//! A [`Formulation`] turns a bit vector into objective and constraint
//! vectors. It never repairs; repair is layered on top by
//! [`ProblemModel`](super::ProblemModel).

use super::instance::{CustomerInstance, LinearInstance, Precedence, ProblemInstance};
use super::types::Solution;
use crate::error::{NrpError, Result};

/// `xuan` values below this select the three-objective urgency form.
const TRIURGENCY_SENTINEL: f64 = -5.0;

/// Which objectives and constraints a customer instance is scored with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CustomerForm {
    /// Objectives `(-profit, cost)`, unconstrained.
    Binary,
    /// Objectives `(-profit, cost)` and one constraint
    /// `urgency_sum - min_urgency >= 0`.
    Bincst {
        bound: f64,
        /// `ceil(bound * total_urgency)`.
        min_urgency: f64,
    },
    /// Objectives `(-profit, cost, -urgency_sum)`, unconstrained.
    Triurgency,
}

impl CustomerForm {
    /// Selects the form from the `xuan` bound: positive means
    /// a threshold constraint, below `-5` means a third urgency objective,
    /// anything else is the plain bi-objective form.
    pub fn from_bound(bound: f64, instance: &CustomerInstance) -> Self {
        if bound > 0.0 {
            Self::bincst(bound, instance)
        } else if bound < TRIURGENCY_SENTINEL {
            Self::Triurgency
        } else {
            Self::Binary
        }
    }

    /// Threshold form with `min_urgency = ceil(bound * total_urgency)`.
    pub fn bincst(bound: f64, instance: &CustomerInstance) -> Self {
        Self::Bincst {
            bound,
            min_urgency: (bound * instance.total_urgency()).ceil(),
        }
    }
}

/// An NRP formulation ready for evaluation.
#[derive(Debug, Clone)]
pub enum Formulation {
    /// Objective rows plus sparse inequations ("constrained MONRP").
    Linear(LinearInstance),
    /// Customer/requirement instance scored according to `form`.
    Customer {
        instance: CustomerInstance,
        form: CustomerForm,
    },
}

impl Formulation {
    /// Builds a formulation from a loaded problem.
    ///
    /// `bound` only matters for customer instances, see
    /// [`CustomerForm::from_bound`].
    ///
    /// # Errors
    ///
    /// Urgency-based forms need urgency data in the problem file.
    pub fn from_instance(instance: ProblemInstance, bound: f64) -> Result<Self> {
        match instance {
            ProblemInstance::Linear(linear) => Ok(Self::Linear(linear)),
            ProblemInstance::Customer(customer) => {
                let form = CustomerForm::from_bound(bound, &customer);
                if form != CustomerForm::Binary && customer.urgency().is_none() {
                    return Err(NrpError::MalformedProblem(
                        "urgency table is required for urgency-based variants".into(),
                    ));
                }
                Ok(Self::Customer {
                    instance: customer,
                    form,
                })
            }
        }
    }

    pub fn num_variables(&self) -> usize {
        match self {
            Self::Linear(instance) => instance.num_variables(),
            Self::Customer { instance, .. } => instance.num_requirements(),
        }
    }

    pub fn num_objectives(&self) -> usize {
        match self {
            Self::Linear(instance) => instance.objectives().len(),
            Self::Customer { form, .. } => match form {
                CustomerForm::Triurgency => 3,
                _ => 2,
            },
        }
    }

    pub fn num_constraints(&self) -> usize {
        match self {
            Self::Linear(instance) => instance.inequations().len(),
            Self::Customer { form, .. } => match form {
                CustomerForm::Bincst { .. } => 1,
                _ => 0,
            },
        }
    }

    /// Prerequisite pairs, empty for customer formulations.
    pub fn precedences(&self) -> &[Precedence] {
        match self {
            Self::Linear(instance) => instance.precedences(),
            Self::Customer { .. } => &[],
        }
    }

    /// Writes objectives and constraints for the current bits.
    ///
    /// Pure function of the bit vector: calling it twice on the same bits
    /// yields identical vectors.
    pub fn evaluate(&self, solution: &mut Solution) {
        debug_assert_eq!(solution.len(), self.num_variables());
        match self {
            Self::Linear(instance) => {
                for k in 0..instance.objectives().len() {
                    let value = instance.objective_value(k, solution.bits());
                    solution.objectives_mut()[k] = value;
                }
                for (k, inequation) in instance.inequations().iter().enumerate() {
                    let slack = inequation.slack(solution.bits());
                    solution.constraints_mut()[k] = slack;
                }
            }
            Self::Customer { instance, form } => {
                let bits = solution.bits();
                let profit = instance.profit_of(bits);
                let cost = instance.cost_of(bits);
                let urgency = instance.urgency_of(bits);

                let objectives = solution.objectives_mut();
                objectives[0] = -profit;
                objectives[1] = cost;
                if *form == CustomerForm::Triurgency {
                    objectives[2] = -urgency;
                }
                if let CustomerForm::Bincst { min_urgency, .. } = *form {
                    solution.constraints_mut()[0] = urgency - min_urgency;
                }
            }
        }
    }
}
