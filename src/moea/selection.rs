//! Crowded tournament selection.
//!
//! # References
//!
//! - Deb et al. (2002), crowded-comparison operator
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"

use rand::Rng;

/// Tournament of size `k` over `(rank, crowding)` pairs.
///
/// Draws `k` indices with replacement and keeps the one with the lowest
/// rank, breaking rank ties by the larger crowding distance.
/// Higher `k` = stronger selection pressure; `k` below 1 is treated as 1.
///
/// # Panics
/// Panics if `ranks` is empty or `ranks` and `crowding` differ in length.
pub fn crowded_tournament<R: Rng>(
    ranks: &[usize],
    crowding: &[f64],
    k: usize,
    rng: &mut R,
) -> usize {
    assert!(!ranks.is_empty(), "cannot select from empty population");
    assert_eq!(ranks.len(), crowding.len());

    let n = ranks.len();
    let mut best_idx = rng.random_range(0..n);
    for _ in 1..k.max(1) {
        let idx = rng.random_range(0..n);
        if crowded_less(ranks, crowding, idx, best_idx) {
            best_idx = idx;
        }
    }
    best_idx
}

/// Whether `a` is strictly better than `b` under the crowded comparison.
fn crowded_less(ranks: &[usize], crowding: &[f64], a: usize, b: usize) -> bool {
    ranks[a] < ranks[b] || (ranks[a] == ranks[b] && crowding[a] > crowding[b])
}
