//! Binary-string variation operators.
//!
//! # Crossover
//!
//! - [`single_point_crossover`]: swap the tails of two parents after a
//!   random cut point
//!
//! # Mutation
//!
//! - [`bit_flip_mutation`]: flip each bit independently
//!
//! Both operate on [`Solution`] bits only; offspring come back with
//! unevaluated objective and constraint vectors.

use rand::Rng;

use crate::problem::Solution;

/// Single-point crossover.
///
/// Picks a cut point in `1..n` and exchanges the tails. Parents of
/// length below 2 are returned unchanged.
///
/// # Panics
/// Panics if parents have different lengths.
pub fn single_point_crossover<R: Rng>(
    parent1: &Solution,
    parent2: &Solution,
    rng: &mut R,
) -> (Solution, Solution) {
    let n = parent1.len();
    assert_eq!(n, parent2.len(), "parents must have equal length");

    let mut child1 = offspring(parent1);
    let mut child2 = offspring(parent2);
    if n < 2 {
        return (child1, child2);
    }

    let point = rng.random_range(1..n);
    child1.bits_mut()[point..].copy_from_slice(&parent2.bits()[point..]);
    child2.bits_mut()[point..].copy_from_slice(&parent1.bits()[point..]);
    (child1, child2)
}

/// Bit-flip mutation: each bit flips with probability `probability`.
///
/// Returns the number of flipped bits.
pub fn bit_flip_mutation<R: Rng>(solution: &mut Solution, probability: f64, rng: &mut R) -> usize {
    let mut flipped = 0;
    for bit in solution.bits_mut() {
        if rng.random_bool(probability) {
            *bit = !*bit;
            flipped += 1;
        }
    }
    flipped
}

/// Unevaluated copy of `parent`'s bits.
pub(crate) fn offspring(parent: &Solution) -> Solution {
    Solution::new(
        parent.bits().to_vec(),
        parent.objectives().len(),
        parent.constraints().len(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    #[test]
    fn test_crossover_exchanges_tails() {
        let mut rng = create_rng(42);
        let p1 = Solution::new(vec![true; 10], 2, 0);
        let p2 = Solution::new(vec![false; 10], 2, 0);

        for _ in 0..100 {
            let (c1, c2) = single_point_crossover(&p1, &p2, &mut rng);
            let point = c1.bits().iter().position(|&b| !b).unwrap();
            assert!(point >= 1 && point < 10);
            assert!(c1.bits()[..point].iter().all(|&b| b));
            assert!(c1.bits()[point..].iter().all(|&b| !b));
            for i in 0..10 {
                assert_ne!(c1.bits()[i], c2.bits()[i]);
            }
        }
    }

    #[test]
    fn test_crossover_children_unevaluated() {
        let mut rng = create_rng(1);
        let mut p1 = Solution::new(vec![true, false, true], 2, 1);
        p1.objectives_mut().copy_from_slice(&[1.0, 2.0]);
        p1.constraints_mut()[0] = -4.0;
        let p2 = p1.clone();

        let (c1, _) = single_point_crossover(&p1, &p2, &mut rng);
        assert_eq!(c1.bits(), p1.bits());
        assert!(c1.objectives().iter().all(|o| o.is_infinite()));
        assert_eq!(c1.constraints(), &[0.0]);
    }

    #[test]
    fn test_crossover_single_bit() {
        let mut rng = create_rng(1);
        let p1 = Solution::new(vec![true], 2, 0);
        let p2 = Solution::new(vec![false], 2, 0);
        let (c1, c2) = single_point_crossover(&p1, &p2, &mut rng);
        assert_eq!(c1.bits(), &[true]);
        assert_eq!(c2.bits(), &[false]);
    }

    #[test]
    fn test_mutation_extremes() {
        let mut rng = create_rng(42);
        let mut s = Solution::new(vec![false; 16], 2, 0);
        assert_eq!(bit_flip_mutation(&mut s, 0.0, &mut rng), 0);
        assert!(s.bits().iter().all(|&b| !b));

        assert_eq!(bit_flip_mutation(&mut s, 1.0, &mut rng), 16);
        assert!(s.bits().iter().all(|&b| b));
    }

    #[test]
    fn test_offspring_copies_bits_only() {
        let mut parent = Solution::new(vec![true, false, true], 2, 1);
        parent.objectives_mut().copy_from_slice(&[1.0, 2.0]);
        let child = offspring(&parent);
        assert_eq!(child.bits(), parent.bits());
        assert_eq!(child.objectives().len(), 2);
        assert_eq!(child.constraints().len(), 1);
        assert!(child.objectives().iter().all(|v| !v.is_finite()));
    }
}
