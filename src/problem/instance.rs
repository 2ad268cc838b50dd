//! Immutable NRP instances and the problem-file loader.
//!
//! Two constraint styles exist:
//!
//! - [`LinearInstance`]: objective coefficient rows plus sparse linear
//!   inequations. Inequations with exactly three entries shaped like a
//!   prerequisite (`-1` on the predecessor, `+1` on the successor, `0` on
//!   the constant index) are converted once into [`Precedence`] pairs.
//! - [`CustomerInstance`]: per-requirement cost and urgency, per-customer
//!   profit, and the list of requirements each customer needs. Ids are
//!   re-indexed to dense `0..n` arrays in ascending id order.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{NrpError, Result};

/// Absolute tolerance used when matching coefficients against the
/// precedence shape constants `-1`, `0` and `+1`.
pub const SHAPE_TOLERANCE: f64 = 1e-6;

fn around(value: f64, target: f64) -> bool {
    (value - target).abs() <= SHAPE_TOLERANCE
}

/// A prerequisite relation: `successor` may only be selected when
/// `predecessor` is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Precedence {
    pub predecessor: usize,
    pub successor: usize,
}

/// A sparse linear inequation `sum(a_j * x_j) <= constant`.
///
/// Its constraint value is the slack `constant - sum(a_j * x_j)`, which is
/// non-negative exactly when the inequation holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Inequation {
    terms: Vec<(usize, f64)>,
    constant: f64,
}

impl Inequation {
    /// Variable terms `(index, coefficient)` in ascending index order.
    pub fn terms(&self) -> &[(usize, f64)] {
        &self.terms
    }

    /// Right-hand side (the coefficient stored at the constant index).
    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// `constant - sum(a_j * x_j)` over the selected bits.
    pub fn slack(&self, bits: &[bool]) -> f64 {
        let lhs: f64 = self
            .terms
            .iter()
            .filter(|&&(j, _)| bits[j])
            .map(|&(_, a)| a)
            .sum();
        self.constant - lhs
    }
}

/// Objective rows and sparse inequations over `n` binary variables.
#[derive(Debug, Clone)]
pub struct LinearInstance {
    num_variables: usize,
    objectives: Vec<Vec<f64>>,
    inequations: Vec<Inequation>,
    precedences: Vec<Precedence>,
}

impl LinearInstance {
    /// Builds an instance from dense objective rows and sparse inequation
    /// maps keyed by variable index, with index `n` holding the constant.
    ///
    /// # Errors
    ///
    /// Returns [`NrpError::MalformedProblem`] when objective rows disagree
    /// in length, an inequation references an index beyond the constant
    /// index, or a three-entry inequation does not have the precedence
    /// shape.
    pub fn new(
        objectives: Vec<Vec<f64>>,
        inequations: Vec<BTreeMap<usize, f64>>,
    ) -> Result<Self> {
        let Some(first) = objectives.first() else {
            return Err(NrpError::MalformedProblem(
                "at least one objective is required".into(),
            ));
        };
        let n = first.len();
        if n == 0 {
            return Err(NrpError::MalformedProblem(
                "objectives have no coefficients".into(),
            ));
        }
        if let Some(k) = objectives.iter().position(|row| row.len() != n) {
            return Err(NrpError::MalformedProblem(format!(
                "objective {k} has {} coefficients, expected {n}",
                objectives[k].len()
            )));
        }

        let mut parsed = Vec::with_capacity(inequations.len());
        let mut precedences = Vec::new();
        for (k, map) in inequations.iter().enumerate() {
            if let Some(&bad) = map.keys().find(|&&j| j > n) {
                return Err(NrpError::MalformedProblem(format!(
                    "inequation {k} references variable {bad} beyond constant index {n}"
                )));
            }
            if map.len() == 3 {
                precedences.push(detect_precedence(k, map, n)?);
            }
            parsed.push(Inequation {
                terms: map
                    .iter()
                    .filter(|&(&j, _)| j < n)
                    .map(|(&j, &a)| (j, a))
                    .collect(),
                constant: map.get(&n).copied().unwrap_or(0.0),
            });
        }

        Ok(Self {
            num_variables: n,
            objectives,
            inequations: parsed,
            precedences,
        })
    }

    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    pub fn objectives(&self) -> &[Vec<f64>] {
        &self.objectives
    }

    pub fn inequations(&self) -> &[Inequation] {
        &self.inequations
    }

    /// Prerequisite pairs derived at construction, in inequation order.
    pub fn precedences(&self) -> &[Precedence] {
        &self.precedences
    }

    /// Linear value of objective `k` over the selected bits.
    pub fn objective_value(&self, k: usize, bits: &[bool]) -> f64 {
        self.objectives[k]
            .iter()
            .zip(bits)
            .filter(|&(_, &bit)| bit)
            .map(|(&c, _)| c)
            .sum()
    }
}

/// Classifies a three-entry inequation as a precedence pair.
fn detect_precedence(k: usize, map: &BTreeMap<usize, f64>, n: usize) -> Result<Precedence> {
    let mut predecessor = None;
    let mut successor = None;
    for (&j, &a) in map {
        if around(a, 0.0) {
            if j != n {
                return Err(NrpError::MalformedProblem(format!(
                    "inequation {k}: zero coefficient on variable {j} in a precedence"
                )));
            }
        } else if j == n {
            return Err(NrpError::MalformedProblem(format!(
                "inequation {k}: precedence constant must be 0, found {a}"
            )));
        } else if around(a, -1.0) {
            if predecessor.replace(j).is_some() {
                return Err(NrpError::MalformedProblem(format!(
                    "inequation {k}: more than one predecessor"
                )));
            }
        } else if around(a, 1.0) {
            if successor.replace(j).is_some() {
                return Err(NrpError::MalformedProblem(format!(
                    "inequation {k}: more than one successor"
                )));
            }
        } else {
            return Err(NrpError::MalformedProblem(format!(
                "inequation {k}: coefficient {a} on variable {j} is not -1, 0 or +1"
            )));
        }
    }
    match (predecessor, successor) {
        (Some(predecessor), Some(successor)) => Ok(Precedence {
            predecessor,
            successor,
        }),
        _ => Err(NrpError::MalformedProblem(format!(
            "inequation {k}: precedence needs one -1 and one +1 coefficient"
        ))),
    }
}

/// Customer/requirement instance with dense indices.
#[derive(Debug, Clone)]
pub struct CustomerInstance {
    requirement_ids: Vec<u64>,
    customer_ids: Vec<u64>,
    cost: Vec<f64>,
    urgency: Option<Vec<f64>>,
    profit: Vec<f64>,
    requests: Vec<Vec<usize>>,
}

impl CustomerInstance {
    /// Builds an instance from id-keyed tables.
    ///
    /// Requirements are the keys of `cost`; customers are the keys of
    /// `requests`. Both are re-indexed in ascending id order.
    ///
    /// # Errors
    ///
    /// Returns [`NrpError::MalformedProblem`] when there are no
    /// requirements, a customer has no profit, a request names an unknown
    /// requirement, or `urgency` does not cover every requirement.
    pub fn new(
        cost: BTreeMap<u64, f64>,
        profit: BTreeMap<u64, f64>,
        urgency: Option<BTreeMap<u64, f64>>,
        requests: BTreeMap<u64, Vec<u64>>,
    ) -> Result<Self> {
        if cost.is_empty() {
            return Err(NrpError::MalformedProblem("problem has no requirements".into()));
        }
        let requirement_ids: Vec<u64> = cost.keys().copied().collect();
        let index_of: BTreeMap<u64, usize> = requirement_ids
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, i))
            .collect();

        let urgency = match urgency {
            Some(table) => {
                let mut dense = Vec::with_capacity(requirement_ids.len());
                for id in &requirement_ids {
                    let Some(&u) = table.get(id) else {
                        return Err(NrpError::MalformedProblem(format!(
                            "requirement {id} has no urgency"
                        )));
                    };
                    dense.push(u);
                }
                Some(dense)
            }
            None => None,
        };

        let mut customer_ids = Vec::with_capacity(requests.len());
        let mut dense_profit = Vec::with_capacity(requests.len());
        let mut dense_requests = Vec::with_capacity(requests.len());
        for (&customer, needed) in &requests {
            let Some(&p) = profit.get(&customer) else {
                return Err(NrpError::MalformedProblem(format!(
                    "customer {customer} has no profit"
                )));
            };
            let mut indices = Vec::with_capacity(needed.len());
            for req in needed {
                let Some(&i) = index_of.get(req) else {
                    return Err(NrpError::MalformedProblem(format!(
                        "customer {customer} requests unknown requirement {req}"
                    )));
                };
                indices.push(i);
            }
            customer_ids.push(customer);
            dense_profit.push(p);
            dense_requests.push(indices);
        }

        Ok(Self {
            cost: cost.into_values().collect(),
            requirement_ids,
            customer_ids,
            urgency,
            profit: dense_profit,
            requests: dense_requests,
        })
    }

    /// Builds an instance whose ids already are the dense indices.
    pub fn from_dense(
        cost: Vec<f64>,
        profit: Vec<f64>,
        urgency: Option<Vec<f64>>,
        requests: Vec<Vec<usize>>,
    ) -> Result<Self> {
        let cost = cost.into_iter().enumerate().map(|(i, c)| (i as u64, c)).collect();
        let profit = profit.into_iter().enumerate().map(|(i, p)| (i as u64, p)).collect();
        let urgency = urgency.map(|u| u.into_iter().enumerate().map(|(i, v)| (i as u64, v)).collect());
        let requests = requests
            .into_iter()
            .enumerate()
            .map(|(i, r)| (i as u64, r.into_iter().map(|j| j as u64).collect()))
            .collect();
        Self::new(cost, profit, urgency, requests)
    }

    pub fn num_requirements(&self) -> usize {
        self.cost.len()
    }

    pub fn num_customers(&self) -> usize {
        self.profit.len()
    }

    /// Original id of the requirement at dense index `i`.
    pub fn requirement_id(&self, i: usize) -> u64 {
        self.requirement_ids[i]
    }

    /// Original id of the customer at dense index `c`.
    pub fn customer_id(&self, c: usize) -> u64 {
        self.customer_ids[c]
    }

    pub fn cost(&self) -> &[f64] {
        &self.cost
    }

    /// Per-requirement urgency, if the problem file carried it.
    pub fn urgency(&self) -> Option<&[f64]> {
        self.urgency.as_deref()
    }

    pub fn profit(&self) -> &[f64] {
        &self.profit
    }

    /// Dense requirement indices each customer needs.
    pub fn requests(&self) -> &[Vec<usize>] {
        &self.requests
    }

    /// Sum of urgency over all requirements (0 without urgency data).
    pub fn total_urgency(&self) -> f64 {
        self.urgency.as_deref().map_or(0.0, |u| u.iter().sum())
    }

    /// Cost of the selected requirements.
    pub fn cost_of(&self, bits: &[bool]) -> f64 {
        selected_sum(&self.cost, bits)
    }

    /// Urgency of the selected requirements.
    pub fn urgency_of(&self, bits: &[bool]) -> f64 {
        self.urgency.as_deref().map_or(0.0, |u| selected_sum(u, bits))
    }

    /// Profit of the customers whose every request is selected.
    pub fn profit_of(&self, bits: &[bool]) -> f64 {
        self.requests
            .iter()
            .zip(&self.profit)
            .filter(|(needed, _)| needed.iter().all(|&r| bits[r]))
            .map(|(_, &p)| p)
            .sum()
    }
}

fn selected_sum(values: &[f64], bits: &[bool]) -> f64 {
    values
        .iter()
        .zip(bits)
        .filter(|&(_, &bit)| bit)
        .map(|(&v, _)| v)
        .sum()
}

#[derive(Debug, Deserialize)]
struct LinearFile {
    objectives: Vec<Vec<f64>>,
    #[serde(default)]
    inequations: Vec<BTreeMap<String, f64>>,
}

#[derive(Debug, Deserialize)]
struct CustomerFile {
    cost: BTreeMap<String, f64>,
    profit: BTreeMap<String, f64>,
    #[serde(default)]
    urgency: Option<BTreeMap<String, f64>>,
    request: BTreeMap<String, Vec<u64>>,
}

/// A loaded problem in either constraint style.
#[derive(Debug, Clone)]
pub enum ProblemInstance {
    Linear(LinearInstance),
    Customer(CustomerInstance),
}

impl ProblemInstance {
    /// Reads and parses a problem file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| NrpError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Parses a problem document.
    ///
    /// A document with an `objectives` field is a linear instance; one
    /// with `cost`, `profit` and `request` is a customer instance.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let Some(fields) = value.as_object() else {
            return Err(NrpError::MalformedProblem(
                "problem document must be a JSON object".into(),
            ));
        };

        if fields.contains_key("objectives") {
            let file: LinearFile = serde_json::from_value(value)?;
            let inequations = file
                .inequations
                .into_iter()
                .map(|map| rekey(map, "inequation"))
                .collect::<Result<Vec<_>>>()?;
            Ok(Self::Linear(LinearInstance::new(file.objectives, inequations)?))
        } else if fields.contains_key("cost") {
            let file: CustomerFile = serde_json::from_value(value)?;
            Ok(Self::Customer(CustomerInstance::new(
                rekey(file.cost, "cost")?,
                rekey(file.profit, "profit")?,
                file.urgency.map(|u| rekey(u, "urgency")).transpose()?,
                rekey(file.request, "request")?,
            )?))
        } else {
            Err(NrpError::MalformedProblem(
                "problem document has neither `objectives` nor `cost`".into(),
            ))
        }
    }

    /// Number of decision variables (requirements).
    pub fn num_variables(&self) -> usize {
        match self {
            Self::Linear(instance) => instance.num_variables(),
            Self::Customer(instance) => instance.num_requirements(),
        }
    }
}

/// Parses string keys into integer ids.
fn rekey<K, V>(map: BTreeMap<String, V>, table: &str) -> Result<BTreeMap<K, V>>
where
    K: std::str::FromStr + Ord,
{
    map.into_iter()
        .map(|(key, value)| {
            key.trim()
                .parse::<K>()
                .map(|k| (k, value))
                .map_err(|_| {
                    NrpError::MalformedProblem(format!("{table} key `{key}` is not an index"))
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(usize, f64)]) -> BTreeMap<usize, f64> {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_precedence_detection() {
        let instance = LinearInstance::new(
            vec![vec![1.0, 2.0, 3.0], vec![4.0, 3.0, 2.0]],
            vec![map(&[(1, -1.0), (2, 1.0), (3, 0.0)])],
        )
        .unwrap();
        assert_eq!(
            instance.precedences(),
            &[Precedence { predecessor: 1, successor: 2 }]
        );
    }

    #[test]
    fn test_precedence_detection_within_tolerance() {
        let instance = LinearInstance::new(
            vec![vec![1.0; 3]],
            vec![map(&[(0, 0.9999995), (2, -1.0000004), (3, 1e-7)])],
        )
        .unwrap();
        assert_eq!(
            instance.precedences(),
            &[Precedence { predecessor: 2, successor: 0 }]
        );
    }

    #[test]
    fn test_precedence_rejects_unexpected_coefficient() {
        let err = LinearInstance::new(
            vec![vec![1.0; 3]],
            vec![map(&[(0, -1.0), (1, 2.0), (3, 0.0)])],
        )
        .unwrap_err();
        assert!(matches!(err, NrpError::MalformedProblem(_)));
    }

    #[test]
    fn test_precedence_rejects_zero_on_variable() {
        let err = LinearInstance::new(
            vec![vec![1.0; 3]],
            vec![map(&[(0, -1.0), (1, 0.0), (2, 1.0)])],
        )
        .unwrap_err();
        assert!(matches!(err, NrpError::MalformedProblem(_)));
    }

    #[test]
    fn test_precedence_rejects_two_successors() {
        let err = LinearInstance::new(
            vec![vec![1.0; 3]],
            vec![map(&[(0, 1.0), (1, 1.0), (3, 0.0)])],
        )
        .unwrap_err();
        assert!(matches!(err, NrpError::MalformedProblem(_)));
    }

    #[test]
    fn test_non_precedence_inequations_kept() {
        // Budget constraint: 2x0 + 3x1 + 4x2 <= 5
        let instance = LinearInstance::new(
            vec![vec![1.0; 3]],
            vec![map(&[(0, 2.0), (1, 3.0), (2, 4.0), (3, 5.0)])],
        )
        .unwrap();
        assert!(instance.precedences().is_empty());
        let ineq = &instance.inequations()[0];
        assert_eq!(ineq.slack(&[true, true, false]), 0.0);
        assert_eq!(ineq.slack(&[false, true, true]), -2.0);
    }

    #[test]
    fn test_index_beyond_constant_rejected() {
        let err = LinearInstance::new(vec![vec![1.0; 2]], vec![map(&[(0, 1.0), (5, 1.0)])])
            .unwrap_err();
        assert!(matches!(err, NrpError::MalformedProblem(_)));
    }

    #[test]
    fn test_ragged_objectives_rejected() {
        let err = LinearInstance::new(vec![vec![1.0; 2], vec![1.0; 3]], vec![]).unwrap_err();
        assert!(matches!(err, NrpError::MalformedProblem(_)));
    }

    #[test]
    fn test_objective_value() {
        let instance =
            LinearInstance::new(vec![vec![1.0, 2.0, 3.0], vec![4.0, 3.0, 2.0]], vec![]).unwrap();
        assert_eq!(instance.objective_value(0, &[false, true, false]), 2.0);
        assert_eq!(instance.objective_value(1, &[true, false, true]), 6.0);
    }

    #[test]
    fn test_load_linear_document() {
        let text = r#"{
            "objectives": [[1, 2, 3], [4, 3, 2]],
            "inequations": [{"1": -1, "2": 1, "3": 0}]
        }"#;
        let ProblemInstance::Linear(instance) = ProblemInstance::from_json_str(text).unwrap()
        else {
            panic!("expected a linear instance");
        };
        assert_eq!(instance.num_variables(), 3);
        assert_eq!(instance.precedences().len(), 1);
    }

    #[test]
    fn test_load_customer_document_reindexes() {
        let text = r#"{
            "cost": {"30": 5, "10": 1, "20": 2},
            "profit": {"7": 10, "3": 4},
            "urgency": {"10": 1, "20": 2, "30": 3},
            "request": {"7": [10, 30], "3": [20]}
        }"#;
        let ProblemInstance::Customer(instance) = ProblemInstance::from_json_str(text).unwrap()
        else {
            panic!("expected a customer instance");
        };
        assert_eq!(instance.cost(), &[1.0, 2.0, 5.0]);
        assert_eq!(instance.requirement_id(2), 30);
        // customers in id order: 3 then 7
        assert_eq!(instance.customer_id(0), 3);
        assert_eq!(instance.profit(), &[4.0, 10.0]);
        assert_eq!(instance.requests(), &[vec![1], vec![0, 2]]);
        assert_eq!(instance.total_urgency(), 6.0);
    }

    #[test]
    fn test_customer_unknown_requirement_rejected() {
        let text = r#"{
            "cost": {"1": 5},
            "profit": {"1": 10},
            "request": {"1": [2]}
        }"#;
        let err = ProblemInstance::from_json_str(text).unwrap_err();
        assert!(matches!(err, NrpError::MalformedProblem(_)));
    }

    #[test]
    fn test_customers_are_the_requesting_ones() {
        // customer 9 has profit but no request
        let text = r#"{
            "cost": {"1": 5},
            "profit": {"4": 10, "9": 2},
            "request": {"4": [1]}
        }"#;
        let ProblemInstance::Customer(instance) = ProblemInstance::from_json_str(text).unwrap()
        else {
            panic!("expected a customer instance");
        };
        assert_eq!(instance.num_customers(), 1);
        assert_eq!(instance.profit(), &[10.0]);

        let text = r#"{
            "cost": {"1": 5},
            "profit": {"4": 10},
            "request": {"4": [1], "5": [1]}
        }"#;
        let err = ProblemInstance::from_json_str(text).unwrap_err();
        assert!(matches!(err, NrpError::MalformedProblem(_)));
    }

    #[test]
    fn test_customer_missing_urgency_rejected() {
        let text = r#"{
            "cost": {"1": 5, "2": 1},
            "profit": {"1": 10},
            "urgency": {"1": 3},
            "request": {"1": [2]}
        }"#;
        assert!(ProblemInstance::from_json_str(text).is_err());
    }

    #[test]
    fn test_unparseable_document_fails_fast() {
        assert!(matches!(
            ProblemInstance::from_json_str("{ not json"),
            Err(NrpError::Json(_))
        ));
        assert!(matches!(
            ProblemInstance::from_json_str(r#"{"variables": {}}"#),
            Err(NrpError::MalformedProblem(_))
        ));
        assert!(matches!(
            ProblemInstance::from_json_str(r#"{"objectives": [[1, 2]], "inequations": [{"x": 1}]}"#),
            Err(NrpError::MalformedProblem(_))
        ));
    }

    #[test]
    fn test_bundle_profit() {
        let instance = CustomerInstance::from_dense(
            vec![1.0, 1.0, 1.0],
            vec![10.0, 5.0],
            None,
            vec![vec![0, 1], vec![2]],
        )
        .unwrap();
        // customer 0 needs both 0 and 1; only 0 selected -> no profit from it
        assert_eq!(instance.profit_of(&[true, false, true]), 5.0);
        assert_eq!(instance.profit_of(&[true, true, true]), 15.0);
        assert_eq!(instance.cost_of(&[true, false, true]), 2.0);
    }
}
