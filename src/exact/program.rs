//! 0/1 linear program definition.

/// Absolute tolerance for constraint satisfaction checks.
pub const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// Direction of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    /// `sum(a_j * x_j) <= rhs`
    Le,
    /// `sum(a_j * x_j) >= rhs`
    Ge,
}

/// A sparse linear constraint over binary variables.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    /// `(variable index, coefficient)` pairs.
    pub terms: Vec<(usize, f64)>,
    pub sense: Sense,
    pub rhs: f64,
}

impl LinearConstraint {
    /// `sum(terms) <= rhs`.
    pub fn le(terms: Vec<(usize, f64)>, rhs: f64) -> Self {
        Self {
            terms,
            sense: Sense::Le,
            rhs,
        }
    }

    /// `sum(terms) >= rhs`.
    pub fn ge(terms: Vec<(usize, f64)>, rhs: f64) -> Self {
        Self {
            terms,
            sense: Sense::Ge,
            rhs,
        }
    }

    /// Sparse terms from a dense coefficient row, dropping zeros.
    pub fn dense_terms(coefficients: &[f64]) -> Vec<(usize, f64)> {
        coefficients
            .iter()
            .enumerate()
            .filter(|&(_, &a)| a != 0.0)
            .map(|(j, &a)| (j, a))
            .collect()
    }

    /// Left-hand side value under `values`.
    pub fn activity(&self, values: &[bool]) -> f64 {
        self.terms
            .iter()
            .filter(|&&(j, _)| values[j])
            .map(|&(_, a)| a)
            .sum()
    }

    pub fn is_satisfied(&self, values: &[bool]) -> bool {
        let lhs = self.activity(values);
        match self.sense {
            Sense::Le => lhs <= self.rhs + FEASIBILITY_TOLERANCE,
            Sense::Ge => lhs >= self.rhs - FEASIBILITY_TOLERANCE,
        }
    }
}

/// Minimize `objective · x` over `x ∈ {0,1}^n` subject to linear constraints.
///
/// # Examples
///
/// ```
/// use u_nrp::exact::{BinaryProgram, LinearConstraint};
///
/// let mut program = BinaryProgram::new("pick-one", 2);
/// program.set_objective(vec![3.0, -1.0]);
/// program.add_constraint(LinearConstraint::le(vec![(0, 1.0), (1, 1.0)], 1.0));
/// assert!(program.validate().is_ok());
/// assert_eq!(program.objective_value(&[false, true]), -1.0);
/// ```
#[derive(Debug, Clone)]
pub struct BinaryProgram {
    pub name: String,
    num_variables: usize,
    objective: Vec<f64>,
    constraints: Vec<LinearConstraint>,
}

impl BinaryProgram {
    /// Creates a program with a zero objective and no constraints.
    pub fn new(name: impl Into<String>, num_variables: usize) -> Self {
        Self {
            name: name.into(),
            num_variables,
            objective: vec![0.0; num_variables],
            constraints: Vec::new(),
        }
    }

    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    /// Sets the dense minimization objective.
    pub fn set_objective(&mut self, coefficients: Vec<f64>) {
        self.objective = coefficients;
    }

    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    pub fn add_constraint(&mut self, constraint: LinearConstraint) {
        self.constraints.push(constraint);
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// Drops every constraint added after the first `len`.
    pub(crate) fn truncate_constraints(&mut self, len: usize) {
        self.constraints.truncate(len);
    }

    pub fn objective_value(&self, values: &[bool]) -> f64 {
        self.objective
            .iter()
            .zip(values)
            .filter(|&(_, &v)| v)
            .map(|(&c, _)| c)
            .sum()
    }

    pub fn is_feasible(&self, values: &[bool]) -> bool {
        self.constraints.iter().all(|c| c.is_satisfied(values))
    }

    /// Checks dimensions and coefficients.
    pub fn validate(&self) -> Result<(), String> {
        if self.objective.len() != self.num_variables {
            return Err(format!(
                "objective has {} coefficients for {} variables",
                self.objective.len(),
                self.num_variables
            ));
        }
        if self.objective.iter().any(|c| !c.is_finite()) {
            return Err("objective has a non-finite coefficient".into());
        }
        for (k, constraint) in self.constraints.iter().enumerate() {
            if !constraint.rhs.is_finite() {
                return Err(format!("constraint {k} has a non-finite bound"));
            }
            for &(j, a) in &constraint.terms {
                if j >= self.num_variables {
                    return Err(format!("constraint {k} references unknown variable {j}"));
                }
                if !a.is_finite() {
                    return Err(format!("constraint {k} has a non-finite coefficient"));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_satisfaction() {
        let le = LinearConstraint::le(vec![(0, 1.0), (1, -1.0)], 0.0);
        assert!(le.is_satisfied(&[false, false]));
        assert!(le.is_satisfied(&[true, true]));
        assert!(!le.is_satisfied(&[true, false]));

        let ge = LinearConstraint::ge(vec![(0, 2.0), (1, 2.0)], 4.0);
        assert!(ge.is_satisfied(&[true, true]));
        assert!(!ge.is_satisfied(&[true, false]));
    }

    #[test]
    fn test_dense_terms_skip_zeros() {
        assert_eq!(
            LinearConstraint::dense_terms(&[0.0, 2.0, 0.0, -1.0]),
            vec![(1, 2.0), (3, -1.0)]
        );
    }

    #[test]
    fn test_validate_rejects_unknown_variable() {
        let mut program = BinaryProgram::new("bad", 2);
        program.add_constraint(LinearConstraint::le(vec![(2, 1.0)], 1.0));
        assert!(program.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_objective_length() {
        let mut program = BinaryProgram::new("bad", 2);
        program.set_objective(vec![1.0]);
        assert!(program.validate().is_err());
    }

    #[test]
    fn test_truncate_constraints() {
        let mut program = BinaryProgram::new("p", 1);
        program.add_constraint(LinearConstraint::le(vec![(0, 1.0)], 1.0));
        program.add_constraint(LinearConstraint::ge(vec![(0, 1.0)], 1.0));
        program.truncate_constraints(1);
        assert_eq!(program.constraints().len(), 1);
        assert_eq!(program.constraints()[0].sense, Sense::Le);
    }
}
