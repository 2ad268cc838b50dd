//! Runs an experiment end to end.

use std::path::Path;
use std::time::{Duration, Instant};

use tracing::info;

use super::config::RunConfig;
use super::dumper::Dumper;
use crate::error::Result;
use crate::exact::MicroLpSolver;
use crate::moea::{Algorithm, Nsga2};
use crate::problem::{Formulation, ProblemInstance, ProblemModel, Solution};
use crate::random::{create_rng, resolve_seed};
use crate::seeds::SeedPool;

/// Outcome of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub run: usize,
    pub elapsed: Duration,
    pub evaluations: usize,
    pub generations: usize,
    /// Feasible members of the final front, as dumped.
    pub feasible: usize,
}

/// Loads everything an experiment needs once, then executes its runs.
///
/// The problem model (and with it any exact solver session) is shared by
/// all runs; each run gets its own engine and generator.
#[derive(Debug)]
pub struct ExperimentDriver {
    config: RunConfig,
    model: ProblemModel,
    seeds: Vec<Vec<bool>>,
    random_seed: u64,
    dumper: Dumper,
}

impl ExperimentDriver {
    /// Reads the experiment file and prepares the driver.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(RunConfig::load(path)?)
    }

    /// Loads the problem and the seed pool and builds the problem model.
    ///
    /// # Errors
    ///
    /// Any malformed config, problem or seed file, or a result directory
    /// that cannot be created. Nothing is optimised before these checks
    /// pass.
    pub fn new(config: RunConfig) -> Result<Self> {
        config.validate()?;

        let problem_path = config.problem_path();
        let instance = ProblemInstance::load(&problem_path)?;
        let formulation = Formulation::from_instance(instance, config.xuan)?;
        info!(
            event = "problem_loaded",
            path = %problem_path.display(),
            variables = formulation.num_variables(),
            objectives = formulation.num_objectives(),
            constraints = formulation.num_constraints(),
        );

        let random_seed = resolve_seed(config.random_seed);
        info!(event = "random_seed", random_seed);

        let seeds = match &config.seeds {
            Some(path) => {
                let pool = SeedPool::load(path)?;
                info!(event = "seeds_loaded", path = %path.display(), count = pool.len());
                pool.sample(config.iteration, &mut create_rng(random_seed))
            }
            None => Vec::new(),
        };

        let model = build_model(formulation, &config);
        let dumper = Dumper::new(&config.result_path)?;

        Ok(Self {
            config,
            model,
            seeds,
            random_seed,
            dumper,
        })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn model(&self) -> &ProblemModel {
        &self.model
    }

    /// Seed actually used, for replaying the experiment.
    pub fn random_seed(&self) -> u64 {
        self.random_seed
    }

    /// Executes all `iteration` runs in order.
    pub fn run(&mut self) -> Result<Vec<RunSummary>> {
        (0..self.config.iteration)
            .map(|run| self.run_once(run))
            .collect()
    }

    /// Executes and dumps run `run`.
    pub fn run_once(&mut self, run: usize) -> Result<RunSummary> {
        let rng = create_rng(self.random_seed.wrapping_add(run as u64 + 1));
        let seed = self.seeds.get(run).filter(|s| !s.is_empty()).cloned();
        info!(event = "run_start", run, seeded = seed.is_some());

        let start = Instant::now();
        let mut engine = Nsga2::new(&mut self.model, self.config.to_moea_config(), rng)?;
        if let Some(seed) = seed {
            engine = engine.with_seed(seed, self.config.seed_injection);
        }
        let front = engine.run()?;
        let elapsed = start.elapsed();
        let evaluations = engine.evaluations();
        let generations = engine.generations();

        let feasible: Vec<Solution> = front.into_iter().filter(|s| s.is_feasible()).collect();
        self.dumper.dump(run, &feasible, elapsed)?;

        info!(
            event = "run_end",
            run,
            elapsed_secs = elapsed.as_secs_f64(),
            evaluations,
            generations,
            feasible = feasible.len(),
        );
        Ok(RunSummary {
            run,
            elapsed,
            evaluations,
            generations,
            feasible: feasible.len(),
        })
    }
}

/// Exact repair wins over local search when both are configured.
fn build_model(formulation: Formulation, config: &RunConfig) -> ProblemModel {
    let mut model = ProblemModel::new(formulation);
    if config.precedence_fixup {
        model = model.with_precedence_fixup();
    }
    if let Some(probability) = config.repair {
        model.with_exact_repair(MicroLpSolver::new(), config.solver_config(), probability)
    } else if let Some((rounds, ratio)) = config.local_search() {
        model.with_local_search(rounds, ratio)
    } else {
        model
    }
}
