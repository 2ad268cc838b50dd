//! Experiment configuration file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{NrpError, Result};
use crate::exact::SolverConfig;
use crate::moea::MoeaConfig;
use crate::seeds::SeedInjection;

/// One experiment: `iteration` independent runs over one problem file.
///
/// Unknown keys are ignored.
///
/// # Examples
///
/// ```
/// use u_nrp::experiment::RunConfig;
///
/// let config = RunConfig::from_json_str(r#"{
///     "iteration": 3,
///     "result_path": "out",
///     "population": 50,
///     "max_evaluations": 5000,
///     "tournament": 2,
///     "patient": 10,
///     "crossover": 0.8,
///     "mutation": 0.05,
///     "dump_path": "dump",
///     "problem_name": "classic_1",
///     "xuan": 0.3
/// }"#).unwrap();
///
/// assert_eq!(config.problem_path(), std::path::Path::new("dump/classic_1.json"));
/// assert!(config.repair.is_none());
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// Number of independent runs.
    pub iteration: usize,
    /// Directory receiving `i_k.json`, `s_k.txt` and `v_k.txt`.
    pub result_path: PathBuf,
    pub population: usize,
    pub max_evaluations: usize,
    #[serde(default = "default_tournament")]
    pub tournament: usize,
    /// Stagnation patience in generations; 0 stops on budget only.
    #[serde(default)]
    pub patient: usize,
    pub crossover: f64,
    /// Per-bit flip probability.
    pub mutation: f64,
    /// Exact repair probability. Takes precedence over local search.
    #[serde(default)]
    pub repair: Option<f64>,
    /// Exact solver wall-clock limit in seconds.
    #[serde(default)]
    pub time_limit: Option<f64>,
    /// Seed file, one plan per line.
    #[serde(default)]
    pub seeds: Option<PathBuf>,
    pub dump_path: PathBuf,
    pub problem_name: String,
    /// Local search rounds.
    #[serde(default)]
    pub round: Option<usize>,
    /// Local search probability.
    #[serde(default)]
    pub ratio: Option<f64>,
    /// Urgency bound selecting the customer variant.
    #[serde(default)]
    pub xuan: f64,
    /// Base seed for all runs; drawn at random when absent.
    #[serde(default)]
    pub random_seed: Option<u64>,
    #[serde(default)]
    pub precedence_fixup: bool,
    #[serde(default)]
    pub seed_injection: SeedInjection,
}

fn default_tournament() -> usize {
    2
}

fn probability(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(NrpError::Config(format!(
            "{name} must be within [0, 1], got {value}"
        )))
    }
}

impl RunConfig {
    /// Reads and validates an experiment file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| NrpError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Parses and validates an experiment document.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings no run could use.
    pub fn validate(&self) -> Result<()> {
        if self.iteration == 0 {
            return Err(NrpError::Config("iteration must be at least 1".into()));
        }
        if self.population == 0 {
            return Err(NrpError::Config("population must be at least 1".into()));
        }
        if self.tournament == 0 {
            return Err(NrpError::Config("tournament must be at least 1".into()));
        }
        probability("crossover", self.crossover)?;
        probability("mutation", self.mutation)?;
        if let Some(repair) = self.repair {
            probability("repair", repair)?;
        }
        if let Some(ratio) = self.ratio {
            probability("ratio", ratio)?;
        }
        if let Some(limit) = self.time_limit {
            if Duration::try_from_secs_f64(limit).is_err() {
                return Err(NrpError::Config(format!(
                    "time_limit must be a non-negative number of seconds, got {limit}"
                )));
            }
        }
        self.to_moea_config().validate().map_err(NrpError::Config)
    }

    /// `dump_path/problem_name.json`.
    pub fn problem_path(&self) -> PathBuf {
        self.dump_path.join(format!("{}.json", self.problem_name))
    }

    /// Engine parameters shared by every run.
    pub fn to_moea_config(&self) -> MoeaConfig {
        MoeaConfig::default()
            .with_population_size(self.population)
            .with_max_evaluations(self.max_evaluations)
            .with_tournament_size(self.tournament)
            .with_crossover_rate(self.crossover)
            .with_mutation_rate(self.mutation)
            .with_patience(self.patient)
    }

    /// Exact solver settings; the default limit applies when none is set.
    ///
    /// Assumes [`validate`](Self::validate) accepted `time_limit`.
    pub fn solver_config(&self) -> SolverConfig {
        let mut config = SolverConfig::default();
        if let Some(limit) = self.time_limit.and_then(|t| Duration::try_from_secs_f64(t).ok()) {
            config.time_limit = limit;
        }
        config
    }

    /// Local search settings when both `round` and `ratio` are present.
    pub fn local_search(&self) -> Option<(usize, f64)> {
        self.round.zip(self.ratio)
    }
}
