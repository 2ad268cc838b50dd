//! Generational NSGA-II loop.
//!
//! [`Nsga2`] orchestrates initialization → evaluation → crowded
//! tournament → crossover → mutation → (μ+λ) survivor selection, asking
//! the [`StagnationTracker`] after every generation whether to stop.

use rand::Rng;
use tracing::debug;

use super::config::MoeaConfig;
use super::multi_objective::{crowding_distance, non_dominated_sort};
use super::operators::{bit_flip_mutation, offspring, single_point_crossover};
use super::selection::crowded_tournament;
use crate::error::{NrpError, Result};
use crate::problem::{Problem, Solution};
use crate::seeds::{build_population, SeedInjection};
use crate::termination::StagnationTracker;

/// A population-based search driven one generation at a time.
pub trait Algorithm {
    /// Builds and evaluates the initial population.
    fn initialize(&mut self) -> Result<()>;

    /// Runs one generation.
    fn step(&mut self);

    /// Whether the stopping rule has fired.
    fn is_done(&self) -> bool;

    /// The current result set.
    fn result(&self) -> Vec<Solution>;

    /// Initializes, steps until done and returns the result.
    fn run(&mut self) -> Result<Vec<Solution>> {
        self.initialize()?;
        while !self.is_done() {
            self.step();
        }
        Ok(self.result())
    }
}

/// Constrained-dominance NSGA-II over bit-vector solutions.
///
/// # Usage
///
/// ```
/// use u_nrp::moea::{Algorithm, MoeaConfig, Nsga2};
/// use u_nrp::problem::{CustomerForm, CustomerInstance, Formulation, ProblemModel};
/// use u_nrp::random::create_rng;
///
/// let instance = CustomerInstance::from_dense(
///     vec![1.0, 2.0, 3.0],
///     vec![4.0, 5.0],
///     None,
///     vec![vec![0], vec![1, 2]],
/// )
/// .unwrap();
/// let mut model = ProblemModel::new(Formulation::Customer { instance, form: CustomerForm::Binary });
/// let config = MoeaConfig::default().with_population_size(10).with_max_evaluations(200);
///
/// let mut nsga2 = Nsga2::new(&mut model, config, create_rng(42)).unwrap();
/// let front = nsga2.run().unwrap();
/// assert!(!front.is_empty());
/// ```
pub struct Nsga2<'a, P, R> {
    problem: &'a mut P,
    config: MoeaConfig,
    rng: R,
    tracker: StagnationTracker,
    seed: Option<Vec<bool>>,
    injection: SeedInjection,
    population: Vec<Solution>,
    ranks: Vec<usize>,
    crowding: Vec<f64>,
    evaluations: usize,
    generations: usize,
    done: bool,
}

impl<'a, P: Problem, R: Rng> Nsga2<'a, P, R> {
    /// Creates an engine over `problem`.
    ///
    /// # Errors
    ///
    /// [`NrpError::Config`] when `config` does not validate.
    pub fn new(problem: &'a mut P, config: MoeaConfig, rng: R) -> Result<Self> {
        config.validate().map_err(NrpError::Config)?;
        let tracker = StagnationTracker::new(config.patience, config.max_evaluations);
        Ok(Self {
            problem,
            config,
            rng,
            tracker,
            seed: None,
            injection: SeedInjection::default(),
            population: Vec::new(),
            ranks: Vec::new(),
            crowding: Vec::new(),
            evaluations: 0,
            generations: 0,
            done: false,
        })
    }

    /// Injects `seed` into the initial population.
    pub fn with_seed(mut self, seed: Vec<bool>, injection: SeedInjection) -> Self {
        self.seed = Some(seed);
        self.injection = injection;
        self
    }

    /// Evaluations spent so far, including the initial population.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Completed generations after initialization.
    pub fn generations(&self) -> usize {
        self.generations
    }

    pub fn population(&self) -> &[Solution] {
        &self.population
    }

    pub fn tracker(&self) -> &StagnationTracker {
        &self.tracker
    }

    fn evaluate(&mut self, solution: &mut Solution) {
        self.problem.evaluate(solution, &mut self.rng);
        self.evaluations += 1;
    }

    fn make_offspring(&mut self) -> Vec<Solution> {
        let size = self.config.population_size;
        let mut children = Vec::with_capacity(size + 1);
        while children.len() < size {
            let a = crowded_tournament(
                &self.ranks,
                &self.crowding,
                self.config.tournament_size,
                &mut self.rng,
            );
            let b = crowded_tournament(
                &self.ranks,
                &self.crowding,
                self.config.tournament_size,
                &mut self.rng,
            );

            let (mut c1, mut c2) = if self.rng.random_bool(self.config.crossover_rate) {
                single_point_crossover(&self.population[a], &self.population[b], &mut self.rng)
            } else {
                (offspring(&self.population[a]), offspring(&self.population[b]))
            };
            bit_flip_mutation(&mut c1, self.config.mutation_rate, &mut self.rng);
            bit_flip_mutation(&mut c2, self.config.mutation_rate, &mut self.rng);

            self.evaluate(&mut c1);
            children.push(c1);
            if children.len() < size {
                self.evaluate(&mut c2);
                children.push(c2);
            }
        }
        children
    }

    fn observe(&mut self) {
        self.done = self.tracker.observe(&self.population, self.evaluations);
    }
}

impl<P: Problem, R: Rng> Algorithm for Nsga2<'_, P, R> {
    fn initialize(&mut self) -> Result<()> {
        let mut population = build_population(
            &mut *self.problem,
            self.seed.as_deref(),
            self.config.population_size,
            self.injection,
            &mut self.rng,
        )?;
        for solution in &mut population {
            self.evaluate(solution);
        }
        let size = population.len();
        let survivors = select_survivors(population, size);
        self.population = survivors.population;
        self.ranks = survivors.ranks;
        self.crowding = survivors.crowding;
        self.generations = 0;
        self.observe();
        Ok(())
    }

    fn step(&mut self) {
        let offspring = self.make_offspring();
        let mut combined = std::mem::take(&mut self.population);
        combined.extend(offspring);

        let survivors = select_survivors(combined, self.config.population_size);
        self.population = survivors.population;
        self.ranks = survivors.ranks;
        self.crowding = survivors.crowding;
        self.generations += 1;

        debug!(
            event = "generation",
            generation = self.generations,
            evaluations = self.evaluations,
            front = self.ranks.iter().filter(|&&r| r == 0).count()
        );
        self.observe();
    }

    fn is_done(&self) -> bool {
        self.done
    }

    /// Rank-0 members of the current population.
    fn result(&self) -> Vec<Solution> {
        self.population
            .iter()
            .zip(&self.ranks)
            .filter(|&(_, &rank)| rank == 0)
            .map(|(s, _)| s.clone())
            .collect()
    }
}

struct Survivors {
    population: Vec<Solution>,
    ranks: Vec<usize>,
    crowding: Vec<f64>,
}

/// Keeps `size` solutions by front, breaking the last front by crowding.
fn select_survivors(combined: Vec<Solution>, size: usize) -> Survivors {
    let sorted = non_dominated_sort(&combined);
    let mut chosen: Vec<(usize, usize, f64)> = Vec::with_capacity(size);

    for (rank, front) in sorted.fronts.iter().enumerate() {
        if chosen.len() >= size {
            break;
        }
        let objectives: Vec<&[f64]> = front.iter().map(|&i| combined[i].objectives()).collect();
        let distances = crowding_distance(&objectives);

        let mut order: Vec<usize> = (0..front.len()).collect();
        if chosen.len() + front.len() > size {
            order.sort_by(|&a, &b| distances[b].total_cmp(&distances[a]));
            order.truncate(size - chosen.len());
        }
        chosen.extend(order.into_iter().map(|k| (front[k], rank, distances[k])));
    }

    let mut slots: Vec<Option<Solution>> = combined.into_iter().map(Some).collect();
    let mut survivors = Survivors {
        population: Vec::with_capacity(chosen.len()),
        ranks: Vec::with_capacity(chosen.len()),
        crowding: Vec::with_capacity(chosen.len()),
    };
    for (index, rank, distance) in chosen {
        if let Some(solution) = slots[index].take() {
            survivors.population.push(solution);
            survivors.ranks.push(rank);
            survivors.crowding.push(distance);
        }
    }
    survivors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moea::multi_objective::dominates;
    use crate::problem::{CustomerForm, CustomerInstance, Formulation, ProblemModel};
    use crate::random::create_rng;

    fn model(n: usize) -> ProblemModel {
        let cost: Vec<f64> = (0..n).map(|i| 1.0 + (i % 5) as f64).collect();
        let profit: Vec<f64> = (0..n).map(|i| 10.0 - (i % 7) as f64).collect();
        let requests = (0..n).map(|i| vec![i]).collect();
        let instance = CustomerInstance::from_dense(cost, profit, None, requests).unwrap();
        ProblemModel::new(Formulation::Customer {
            instance,
            form: CustomerForm::Binary,
        })
    }

    fn evaluated(objectives: &[f64], violation: f64) -> Solution {
        let mut s = Solution::new(vec![false], objectives.len(), 1);
        s.objectives_mut().copy_from_slice(objectives);
        s.constraints_mut()[0] = -violation;
        s
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut problem = model(4);
        let config = MoeaConfig::default().with_population_size(1);
        let err = Nsga2::new(&mut problem, config, create_rng(1)).err();
        assert!(matches!(err, Some(NrpError::Config(_))));
    }

    #[test]
    fn test_run_respects_budget() {
        let mut problem = model(12);
        let config = MoeaConfig::default()
            .with_population_size(20)
            .with_max_evaluations(300);
        let mut nsga2 = Nsga2::new(&mut problem, config, create_rng(42)).unwrap();
        let front = nsga2.run().unwrap();

        assert!(nsga2.is_done());
        assert!(nsga2.evaluations() >= 300);
        // at most one generation of overshoot
        assert!(nsga2.evaluations() < 300 + 20);
        assert_eq!(nsga2.population().len(), 20);
        assert!(!front.is_empty());
    }

    #[test]
    fn test_result_is_mutually_non_dominated() {
        let mut problem = model(10);
        let config = MoeaConfig::default()
            .with_population_size(30)
            .with_max_evaluations(900);
        let mut nsga2 = Nsga2::new(&mut problem, config, create_rng(7)).unwrap();
        let front = nsga2.run().unwrap();
        for a in &front {
            for b in &front {
                assert!(!dominates(a.objectives(), b.objectives()));
            }
        }
    }

    #[test]
    fn test_converges_on_trivial_instance() {
        // every requirement has profit 10 and cost 1: each count is a
        // distinct trade-off, so the front spreads across plan sizes
        let instance = CustomerInstance::from_dense(
            vec![1.0; 6],
            vec![10.0; 6],
            None,
            (0..6).map(|i| vec![i]).collect(),
        )
        .unwrap();
        let mut problem = ProblemModel::new(Formulation::Customer {
            instance,
            form: CustomerForm::Binary,
        });
        let config = MoeaConfig::default()
            .with_population_size(20)
            .with_max_evaluations(2000)
            .with_mutation_rate(0.2);
        let mut nsga2 = Nsga2::new(&mut problem, config, create_rng(3)).unwrap();
        let front = nsga2.run().unwrap();
        let sizes: std::collections::HashSet<usize> = front
            .iter()
            .map(|s| s.bits().iter().filter(|&&b| b).count())
            .collect();
        assert!(sizes.len() >= 5, "front covers sizes {sizes:?}");
    }

    #[test]
    fn test_patience_stops_before_budget() {
        let mut problem = model(3);
        let config = MoeaConfig::default()
            .with_population_size(10)
            .with_max_evaluations(1_000_000)
            .with_patience(3);
        let mut nsga2 = Nsga2::new(&mut problem, config, create_rng(11)).unwrap();
        nsga2.run().unwrap();
        assert!(nsga2.evaluations() < 1_000_000);
        assert!(nsga2.tracker().stagnant_generations() >= 3);
    }

    #[test]
    fn test_seed_survives_initialization() {
        let mut problem = model(6);
        let config = MoeaConfig::default()
            .with_population_size(10)
            .with_max_evaluations(10);
        let seed = vec![true, false, true, false, true, false];
        let mut nsga2 = Nsga2::new(&mut problem, config, create_rng(5))
            .unwrap()
            .with_seed(seed.clone(), SeedInjection::Single);
        nsga2.initialize().unwrap();
        assert_eq!(nsga2.evaluations(), 10);
        assert!(nsga2.population().iter().any(|s| s.bits() == seed.as_slice()));
        assert!(nsga2.is_done());
    }

    #[test]
    fn test_malformed_seed_fails_initialize() {
        let mut problem = model(6);
        let config = MoeaConfig::default().with_population_size(4);
        let mut nsga2 = Nsga2::new(&mut problem, config, create_rng(5))
            .unwrap()
            .with_seed(vec![true], SeedInjection::Single);
        assert!(matches!(nsga2.run(), Err(NrpError::MalformedSeed(_))));
    }

    #[test]
    fn test_select_survivors_prefers_fronts_then_crowding() {
        let combined = vec![
            evaluated(&[0.0, 4.0], 0.0),
            evaluated(&[1.0, 3.0], 0.0),
            evaluated(&[2.0, 2.0], 0.0),
            evaluated(&[4.0, 0.0], 0.0),
            evaluated(&[0.0, 0.0], 5.0),
        ];
        let survivors = select_survivors(combined, 3);
        assert_eq!(survivors.population.len(), 3);
        assert!(survivors.ranks.iter().all(|&r| r == 0));
        // both extremes kept
        let objectives: Vec<&[f64]> = survivors.population.iter().map(|s| s.objectives()).collect();
        assert!(objectives.contains(&[0.0, 4.0].as_slice()));
        assert!(objectives.contains(&[4.0, 0.0].as_slice()));
        assert!(survivors.population.iter().all(|s| s.is_feasible()));
    }
}
