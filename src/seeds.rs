//! Seed pool loading, sampling and initial-population injection.
//!
//! A seed file holds one plan per line; every `'0'`/`'1'` character
//! becomes a bit and any other character is ignored, so `(0, 1, 1)` and
//! `011` describe the same plan. An empty line yields an empty seed,
//! which means "no seed" for the run that receives it.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rand::seq::index;
use rand::Rng;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{NrpError, Result};
use crate::problem::{Problem, Solution};

/// Ordered list of externally supplied plans.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedPool {
    seeds: Vec<Vec<bool>>,
}

impl SeedPool {
    pub fn new(seeds: Vec<Vec<bool>>) -> Self {
        Self { seeds }
    }

    /// Parses one seed line.
    pub fn parse_line(line: &str) -> Vec<bool> {
        line.chars()
            .filter_map(|c| match c {
                '0' => Some(false),
                '1' => Some(true),
                _ => None,
            })
            .collect()
    }

    /// Reads a seed file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let read_error = |source| NrpError::Read {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(read_error)?;
        Self::from_reader(BufReader::new(file)).map_err(|e| match e {
            NrpError::Read { source, .. } => read_error(source),
            other => other,
        })
    }

    /// Reads seeds from any line-oriented source.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut seeds = Vec::new();
        for line in reader.lines() {
            let line = line.map_err(|source| NrpError::Read {
                path: "<seeds>".into(),
                source,
            })?;
            seeds.push(Self::parse_line(&line));
        }
        Ok(Self { seeds })
    }

    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }

    pub fn seeds(&self) -> &[Vec<bool>] {
        &self.seeds
    }

    /// Draws `n` seeds without replacement.
    ///
    /// Asking for more seeds than the pool holds is not an error: the
    /// whole pool is returned in file order and a warning is logged.
    pub fn sample<R: Rng>(&self, n: usize, rng: &mut R) -> Vec<Vec<bool>> {
        if n > self.seeds.len() {
            warn!(
                event = "seed_pool_short",
                requested = n,
                available = self.seeds.len()
            );
            return self.seeds.clone();
        }
        index::sample(rng, self.seeds.len(), n)
            .into_iter()
            .map(|i| self.seeds[i].clone())
            .collect()
    }
}

/// How a seed enters the initial population.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedInjection {
    /// One seeded individual plus `size - 1` random ones.
    #[default]
    Single,
    /// The seeded individual is re-evaluated after each bit is copied and
    /// appended once per seed bit, followed by `size - 1` random ones.
    /// The population then holds `seed.len()` identical copies and is
    /// larger than `size`.
    Replicated,
}

/// Builds the initial population.
///
/// Seeded individuals come back evaluated; random ones are unevaluated
/// and left to the engine. Without a seed (or with an empty one) all
/// `size` individuals are random.
///
/// # Errors
///
/// [`NrpError::MalformedSeed`] when a non-empty seed's length differs
/// from the problem's variable count.
pub fn build_population<P: Problem, R: Rng>(
    problem: &mut P,
    seed: Option<&[bool]>,
    size: usize,
    mode: SeedInjection,
    rng: &mut R,
) -> Result<Vec<Solution>> {
    let seed = seed.filter(|s| !s.is_empty());
    let Some(seed) = seed else {
        return Ok((0..size).map(|_| problem.create_solution(rng)).collect());
    };
    if seed.len() != problem.num_variables() {
        return Err(NrpError::MalformedSeed(format!(
            "seed has {} bits, problem has {} variables",
            seed.len(),
            problem.num_variables()
        )));
    }

    info!(event = "seed_used", bits = seed.len(), mode = ?mode);
    let mut population = Vec::with_capacity(size + seed.len());
    let mut first = problem.create_solution(rng);
    match mode {
        SeedInjection::Single => {
            first.bits_mut().copy_from_slice(seed);
            problem.evaluate(&mut first, rng);
            population.push(first);
        }
        SeedInjection::Replicated => {
            for (i, &bit) in seed.iter().enumerate() {
                first.set_selected(i, bit);
                problem.evaluate(&mut first, rng);
            }
            population.extend(std::iter::repeat(first).take(seed.len()));
        }
    }
    population.extend((1..size).map(|_| problem.create_solution(rng)));
    Ok(population)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::io::Cursor;

    /// Counts selected bits; tracks how often it evaluated.
    struct CountOnes {
        n: usize,
        evaluations: usize,
    }

    impl Problem for CountOnes {
        fn num_variables(&self) -> usize {
            self.n
        }
        fn num_objectives(&self) -> usize {
            2
        }
        fn num_constraints(&self) -> usize {
            0
        }
        fn evaluate<R: Rng>(&mut self, solution: &mut Solution, _rng: &mut R) {
            self.evaluations += 1;
            let ones = solution.bits().iter().filter(|&&b| b).count() as f64;
            solution.objectives_mut()[0] = -ones;
            solution.objectives_mut()[1] = ones;
        }
    }

    #[test]
    fn test_parse_line_ignores_noise() {
        assert_eq!(
            SeedPool::parse_line("(0, 1, 1)"),
            vec![false, true, true]
        );
        assert_eq!(SeedPool::parse_line("10x2 1"), vec![true, false, true]);
        assert!(SeedPool::parse_line("").is_empty());
    }

    #[test]
    fn test_from_reader_one_seed_per_line() {
        let pool = SeedPool::from_reader(Cursor::new("011\n(1, 0, 0)\n\n")).unwrap();
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.seeds()[1], vec![true, false, false]);
        assert!(pool.seeds()[2].is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let err = SeedPool::load("/definitely/not/here.txt").unwrap_err();
        assert!(matches!(err, NrpError::Read { .. }));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seeds.txt");
        std::fs::write(&path, "0101\n1111\n").unwrap();
        let pool = SeedPool::load(&path).unwrap();
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.seeds()[0], vec![false, true, false, true]);
    }

    #[test]
    fn test_sample_more_than_pool_returns_all() {
        let pool = SeedPool::new(vec![vec![true], vec![false]]);
        let mut rng = create_rng(1);
        assert_eq!(pool.sample(5, &mut rng), pool.seeds().to_vec());
    }

    #[test]
    fn test_unseeded_population_is_random_and_unevaluated() {
        let mut problem = CountOnes { n: 8, evaluations: 0 };
        let mut rng = create_rng(3);
        let population =
            build_population(&mut problem, None, 10, SeedInjection::Single, &mut rng).unwrap();
        assert_eq!(population.len(), 10);
        assert_eq!(problem.evaluations, 0);

        let empty: &[bool] = &[];
        let population =
            build_population(&mut problem, Some(empty), 10, SeedInjection::Replicated, &mut rng)
                .unwrap();
        assert_eq!(population.len(), 10);
    }

    #[test]
    fn test_single_injection() {
        let mut problem = CountOnes { n: 4, evaluations: 0 };
        let mut rng = create_rng(3);
        let seed = [true, true, false, true];
        let population =
            build_population(&mut problem, Some(&seed), 6, SeedInjection::Single, &mut rng)
                .unwrap();
        assert_eq!(population.len(), 6);
        assert_eq!(population[0].bits(), &seed);
        assert_eq!(population[0].objectives(), &[-3.0, 3.0]);
        assert_eq!(problem.evaluations, 1);
    }

    #[test]
    fn test_replicated_injection() {
        let mut problem = CountOnes { n: 4, evaluations: 0 };
        let mut rng = create_rng(3);
        let seed = [true, false, false, true];
        let population =
            build_population(&mut problem, Some(&seed), 6, SeedInjection::Replicated, &mut rng)
                .unwrap();
        assert_eq!(population.len(), 4 + 5);
        for copy in &population[..4] {
            assert_eq!(copy.bits(), &seed);
            assert_eq!(copy.objectives(), &[-2.0, 2.0]);
        }
        assert_eq!(problem.evaluations, 4);
    }

    #[test]
    fn test_seed_length_mismatch() {
        let mut problem = CountOnes { n: 4, evaluations: 0 };
        let mut rng = create_rng(3);
        let err = build_population(
            &mut problem,
            Some(&[true, false]),
            6,
            SeedInjection::Single,
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, NrpError::MalformedSeed(_)));
    }

    #[test]
    fn test_injection_mode_names() {
        let single: SeedInjection = serde_json::from_str("\"single\"").unwrap();
        let replicated: SeedInjection = serde_json::from_str("\"replicated\"").unwrap();
        assert_eq!(single, SeedInjection::Single);
        assert_eq!(replicated, SeedInjection::Replicated);
    }

    proptest! {
        #[test]
        fn prop_sample_without_replacement(size in 1usize..30, frac in 0.0f64..=1.0, seed in any::<u64>()) {
            let seeds: Vec<Vec<bool>> = (0..size)
                .map(|i| (0..5).map(|b| (i >> b) & 1 == 1).collect())
                .collect();
            let pool = SeedPool::new(seeds);
            let n = ((size as f64) * frac) as usize;
            let mut rng = create_rng(seed);
            let drawn = pool.sample(n, &mut rng);
            prop_assert_eq!(drawn.len(), n);
            let distinct: HashSet<&Vec<bool>> = drawn.iter().collect();
            prop_assert_eq!(distinct.len(), n);
            for d in &drawn {
                prop_assert!(pool.seeds().contains(d));
            }
        }
    }
}
