//! Constrained dominance, front ranking and crowding distance.
//!
//! All objectives are minimised. Constraint values follow the
//! [`Solution`] convention (`>= 0` satisfied), and two solutions are
//! first compared on their overall violation.
//!
//! # Algorithms
//!
//! - [`pareto_cmp`] / [`dominates`]: plain Pareto dominance
//! - [`constrained_cmp`]: overall violation first, then Pareto dominance
//! - [`non_dominated_sort`]: front peeling (Deb et al., 2002) under
//!   [`constrained_cmp`]
//! - [`crowding_distance`]: per-front density estimate
//!
//! # References
//!
//! - Deb et al. (2002), *A Fast and Elitist Multiobjective GA: NSGA-II*,
//!   IEEE TEVC 6(2)

use crate::problem::Solution;

/// Which side of a pairwise comparison wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dominance {
    Left,
    Right,
    Neither,
}

/// Pareto comparison of two objective vectors of equal length.
pub fn pareto_cmp(a: &[f64], b: &[f64]) -> Dominance {
    let (left_wins, right_wins) = a
        .iter()
        .zip(b)
        .fold((false, false), |(l, r), (x, y)| (l || x < y, r || y < x));
    match (left_wins, right_wins) {
        (true, false) => Dominance::Left,
        (false, true) => Dominance::Right,
        _ => Dominance::Neither,
    }
}

/// Whether `a` is no worse than `b` in every objective and strictly
/// better in at least one.
///
/// ```
/// use u_nrp::moea::multi_objective::dominates;
///
/// assert!(dominates(&[1.0, 2.0], &[1.0, 3.0]));
/// assert!(!dominates(&[1.0, 2.0], &[1.0, 2.0]));
/// assert!(!dominates(&[0.0, 5.0], &[1.0, 3.0]));
/// ```
pub fn dominates(a: &[f64], b: &[f64]) -> bool {
    pareto_cmp(a, b) == Dominance::Left
}

/// Constrained dominance between two evaluated solutions.
///
/// The smaller overall violation wins, so a feasible solution beats any
/// infeasible one. Equal violation, including two feasible solutions,
/// falls back to [`pareto_cmp`].
pub fn constrained_cmp(a: &Solution, b: &Solution) -> Dominance {
    let (va, vb) = (a.violation(), b.violation());
    if va < vb {
        Dominance::Left
    } else if vb < va {
        Dominance::Right
    } else {
        pareto_cmp(a.objectives(), b.objectives())
    }
}

/// Front membership of a sorted population.
///
/// `ranks[i]` is the front of solution `i`; `fronts[r]` lists the indices
/// on front `r` in ascending order.
#[derive(Debug, Clone, Default)]
pub struct NondominatedSortResult {
    pub ranks: Vec<usize>,
    pub fronts: Vec<Vec<usize>>,
}

/// Ranks `solutions` into fronts under [`constrained_cmp`].
///
/// O(m·n²) comparisons for `n` solutions with `m` objectives. An empty
/// slice yields no fronts.
pub fn non_dominated_sort(solutions: &[Solution]) -> NondominatedSortResult {
    let n = solutions.len();
    // beats[i]: solutions i dominates; beaten_by[j]: how many dominate j
    let mut beats: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut beaten_by = vec![0usize; n];

    for i in 0..n {
        for j in (i + 1)..n {
            let (winner, loser) = match constrained_cmp(&solutions[i], &solutions[j]) {
                Dominance::Left => (i, j),
                Dominance::Right => (j, i),
                Dominance::Neither => continue,
            };
            beats[winner].push(loser);
            beaten_by[loser] += 1;
        }
    }

    let mut result = NondominatedSortResult {
        ranks: vec![0; n],
        fronts: Vec::new(),
    };
    let mut front: Vec<usize> = (0..n).filter(|&i| beaten_by[i] == 0).collect();
    while !front.is_empty() {
        let rank = result.fronts.len();
        let mut peeled = Vec::new();
        for &i in &front {
            result.ranks[i] = rank;
            for &j in &beats[i] {
                beaten_by[j] -= 1;
                if beaten_by[j] == 0 {
                    peeled.push(j);
                }
            }
        }
        peeled.sort_unstable();
        result.fronts.push(std::mem::replace(&mut front, peeled));
    }
    result
}

/// Crowding distance of each member of one front.
///
/// Per objective the members are ordered by value; both extremes get
/// `f64::INFINITY` and every interior member accumulates the normalised
/// gap between its two neighbours. An objective with zero spread adds
/// nothing. Fronts of one or two members are all boundary.
///
/// ```
/// use u_nrp::moea::multi_objective::crowding_distance;
///
/// let front: [&[f64]; 3] = [&[1.0, 5.0], &[3.0, 3.0], &[5.0, 1.0]];
/// let distances = crowding_distance(&front);
///
/// assert!(distances[0].is_infinite());
/// assert!(distances[1].is_finite());
/// assert!(distances[2].is_infinite());
/// ```
pub fn crowding_distance(front: &[&[f64]]) -> Vec<f64> {
    let n = front.len();
    if n <= 2 {
        return vec![f64::INFINITY; n];
    }

    let mut distance = vec![0.0; n];
    let mut order: Vec<usize> = (0..n).collect();
    for k in 0..front[0].len() {
        order.sort_by(|&a, &b| front[a][k].total_cmp(&front[b][k]));
        let (lo, hi) = (order[0], order[n - 1]);
        distance[lo] = f64::INFINITY;
        distance[hi] = f64::INFINITY;

        let spread = front[hi][k] - front[lo][k];
        if spread <= 0.0 {
            continue;
        }
        for w in order.windows(3) {
            distance[w[1]] += (front[w[2]][k] - front[w[0]][k]) / spread;
        }
    }
    distance
}
