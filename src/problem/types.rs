//! Core types shared by the problem model, the repair operators and the
//! evolutionary engine.
//!
//! [`Solution`] is the mutable candidate the engine owns; [`Fingerprint`]
//! is its immutable, value-keyed identity; [`Problem`] is the contract
//! between the engine and an NRP formulation.

use rand::Rng;

/// A candidate release plan: one bit per requirement plus the objective
/// and constraint vectors written by evaluation.
///
/// All objectives are minimized. A constraint component is satisfied
/// when it is `>= 0` and violated when negative.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    bits: Vec<bool>,
    objectives: Vec<f64>,
    constraints: Vec<f64>,
}

impl Solution {
    /// Creates an unevaluated solution from explicit bits.
    ///
    /// Objectives start at `f64::INFINITY` and constraints at `0.0`
    /// until the problem evaluates the solution.
    pub fn new(bits: Vec<bool>, num_objectives: usize, num_constraints: usize) -> Self {
        Self {
            bits,
            objectives: vec![f64::INFINITY; num_objectives],
            constraints: vec![0.0; num_constraints],
        }
    }

    /// Creates a solution whose bits are drawn independently with
    /// probability 0.5 each.
    pub fn random<R: Rng>(
        num_variables: usize,
        num_objectives: usize,
        num_constraints: usize,
        rng: &mut R,
    ) -> Self {
        let bits = (0..num_variables).map(|_| rng.random_bool(0.5)).collect();
        Self::new(bits, num_objectives, num_constraints)
    }

    /// Decision bits, one per requirement.
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Mutable access to the decision bits.
    pub fn bits_mut(&mut self) -> &mut [bool] {
        &mut self.bits
    }

    /// Number of decision variables.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Whether the solution has no decision variables.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.bits[index]
    }

    pub fn set_selected(&mut self, index: usize, selected: bool) {
        self.bits[index] = selected;
    }

    pub fn objectives(&self) -> &[f64] {
        &self.objectives
    }

    pub fn objectives_mut(&mut self) -> &mut [f64] {
        &mut self.objectives
    }

    pub fn constraints(&self) -> &[f64] {
        &self.constraints
    }

    pub fn constraints_mut(&mut self) -> &mut [f64] {
        &mut self.constraints
    }

    /// Whether every constraint component is `>= 0`.
    pub fn is_feasible(&self) -> bool {
        self.constraints.iter().all(|&c| c >= 0.0)
    }

    /// Overall constraint violation: the sum of magnitudes of the
    /// negative constraint components. Zero for feasible solutions.
    pub fn violation(&self) -> f64 {
        self.constraints
            .iter()
            .filter(|&&c| c < 0.0)
            .map(|&c| -c)
            .sum()
    }

    /// Indices of selected and unselected bits, in ascending order.
    pub fn partition(&self) -> (Vec<usize>, Vec<usize>) {
        let mut selected = Vec::new();
        let mut unselected = Vec::new();
        for (i, &bit) in self.bits.iter().enumerate() {
            if bit {
                selected.push(i);
            } else {
                unselected.push(i);
            }
        }
        (selected, unselected)
    }

    /// Value identity of the bit pattern.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::from_bits(&self.bits)
    }
}

/// Immutable, packed copy of a solution's bit pattern.
///
/// Equality and hashing are exact bitwise comparisons of the decision
/// vector; objectives and constraints never participate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    len: usize,
    words: Box<[u64]>,
}

impl Fingerprint {
    /// Packs `bits` into 64-bit words, least significant bit first.
    pub fn from_bits(bits: &[bool]) -> Self {
        let mut words = vec![0u64; bits.len().div_ceil(64)];
        for (i, &bit) in bits.iter().enumerate() {
            if bit {
                words[i / 64] |= 1u64 << (i % 64);
            }
        }
        Self {
            len: bits.len(),
            words: words.into_boxed_slice(),
        }
    }

    /// Number of bits the fingerprint was built from.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// An optimization problem over fixed-length bit vectors.
///
/// The engine creates solutions through [`create_solution`](Problem::create_solution)
/// and scores them through [`evaluate`](Problem::evaluate). Evaluation takes
/// `&mut self` because a formulation may own a long-lived solver session
/// that repair operators mutate.
pub trait Problem {
    /// Length of every solution's bit vector.
    fn num_variables(&self) -> usize;

    /// Length of every solution's objective vector.
    fn num_objectives(&self) -> usize;

    /// Length of every solution's constraint vector.
    fn num_constraints(&self) -> usize;

    /// Creates a solution with uniformly random bits, unevaluated.
    fn create_solution<R: Rng>(&self, rng: &mut R) -> Solution {
        Solution::random(
            self.num_variables(),
            self.num_objectives(),
            self.num_constraints(),
            rng,
        )
    }

    /// Writes objectives and constraints into `solution`, possibly
    /// repairing its bits in place first.
    fn evaluate<R: Rng>(&mut self, solution: &mut Solution, rng: &mut R);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;
    use std::collections::HashSet;

    #[test]
    fn test_new_solution_is_unevaluated() {
        let s = Solution::new(vec![true, false], 2, 1);
        assert_eq!(s.len(), 2);
        assert!(s.objectives().iter().all(|o| o.is_infinite()));
        assert_eq!(s.constraints(), &[0.0]);
    }

    #[test]
    fn test_random_solution_length() {
        let mut rng = create_rng(3);
        let s = Solution::random(100, 2, 0, &mut rng);
        assert_eq!(s.len(), 100);
        let ones = s.bits().iter().filter(|&&b| b).count();
        // 0.5 per bit: anything this lopsided means the draw is broken
        assert!(ones > 20 && ones < 80, "got {ones} ones");
    }

    #[test]
    fn test_feasibility_and_violation() {
        let mut s = Solution::new(vec![false; 3], 2, 3);
        s.constraints_mut().copy_from_slice(&[0.0, 2.0, 1.0]);
        assert!(s.is_feasible());
        assert_eq!(s.violation(), 0.0);

        s.constraints_mut().copy_from_slice(&[-1.0, 2.0, -0.5]);
        assert!(!s.is_feasible());
        assert!((s.violation() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_partition() {
        let s = Solution::new(vec![true, false, true, false], 2, 0);
        let (sel, unsel) = s.partition();
        assert_eq!(sel, vec![0, 2]);
        assert_eq!(unsel, vec![1, 3]);
    }

    #[test]
    fn test_fingerprint_ignores_objectives() {
        let mut a = Solution::new(vec![true, false, true], 2, 0);
        let mut b = a.clone();
        a.objectives_mut().copy_from_slice(&[1.0, 2.0]);
        b.objectives_mut().copy_from_slice(&[5.0, 9.0]);
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_fingerprint_distinguishes_bits() {
        let a = Fingerprint::from_bits(&[true, false]);
        let b = Fingerprint::from_bits(&[false, true]);
        assert_ne!(a, b);

        let mut set = HashSet::new();
        set.insert(a.clone());
        assert!(set.contains(&Fingerprint::from_bits(&[true, false])));
        assert!(!set.contains(&b));
    }

    #[test]
    fn test_fingerprint_length_matters() {
        // Trailing zeros pack into the same word but are different plans
        let short = Fingerprint::from_bits(&[true]);
        let long = Fingerprint::from_bits(&[true, false]);
        assert_ne!(short, long);
        assert_eq!(long.len(), 2);
    }

    #[test]
    fn test_fingerprint_spans_words() {
        let mut bits = vec![false; 130];
        bits[129] = true;
        let a = Fingerprint::from_bits(&bits);
        bits[129] = false;
        bits[65] = true;
        let b = Fingerprint::from_bits(&bits);
        assert_ne!(a, b);
    }
}
