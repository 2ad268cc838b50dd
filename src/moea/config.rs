//! Evolutionary engine configuration.
//!
//! [`MoeaConfig`] holds all parameters that control the generational loop.

/// Configuration for the NSGA-II engine.
///
/// # Defaults
///
/// ```
/// use u_nrp::moea::MoeaConfig;
///
/// let config = MoeaConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.max_evaluations, 25_000);
/// ```
///
/// # Builder
///
/// ```
/// use u_nrp::moea::MoeaConfig;
///
/// let config = MoeaConfig::default()
///     .with_population_size(200)
///     .with_tournament_size(5)
///     .with_mutation_rate(0.01)
///     .with_patience(30);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct MoeaConfig {
    /// Survivors kept after every generation.
    pub population_size: usize,

    /// Evaluation budget. The run stops once this many evaluations have
    /// been spent, counting the initial population.
    pub max_evaluations: usize,

    /// Number of contestants per crowded tournament.
    pub tournament_size: usize,

    /// Chance that a selected pair is recombined; otherwise both parents
    /// are copied unchanged into mutation.
    pub crossover_rate: f64,

    /// Per-bit flip probability applied to every offspring (0.0–1.0).
    pub mutation_rate: f64,

    /// Generations without a new feasible plan before stopping; 0 leaves
    /// only the evaluation budget.
    pub patience: usize,
}

impl Default for MoeaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_evaluations: 25_000,
            tournament_size: 2,
            crossover_rate: 0.9,
            mutation_rate: 0.01,
            patience: 0,
        }
    }
}

impl MoeaConfig {
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    pub fn with_max_evaluations(mut self, n: usize) -> Self {
        self.max_evaluations = n;
        self
    }

    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    /// Clamped to `[0, 1]`.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Clamped to `[0, 1]`.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_patience(mut self, patience: usize) -> Self {
        self.patience = patience;
        self
    }

    /// Checks that a run with these parameters can start.
    pub fn validate(&self) -> Result<(), String> {
        if self.population_size < 2 {
            return Err("population must hold at least 2 solutions".into());
        }
        if self.max_evaluations == 0 {
            return Err("max_evaluations must be at least 1".into());
        }
        if self.tournament_size == 0 {
            return Err("tournament_size must be at least 1".into());
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err("crossover_rate must be within [0, 1]".into());
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err("mutation_rate must be within [0, 1]".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = MoeaConfig::default();
        assert_eq!(
            (config.population_size, config.max_evaluations, config.tournament_size),
            (100, 25_000, 2)
        );
        assert_eq!(config.patience, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_setters_chain() {
        let config = MoeaConfig::default()
            .with_population_size(40)
            .with_max_evaluations(4_000)
            .with_tournament_size(4)
            .with_crossover_rate(0.6)
            .with_mutation_rate(0.02)
            .with_patience(12);

        assert_eq!(config.population_size, 40);
        assert_eq!(config.max_evaluations, 4_000);
        assert_eq!(config.tournament_size, 4);
        assert_eq!(config.crossover_rate, 0.6);
        assert_eq!(config.mutation_rate, 0.02);
        assert_eq!(config.patience, 12);
    }

    #[test]
    fn test_rate_setters_clamp() {
        let config = MoeaConfig::default()
            .with_crossover_rate(-3.0)
            .with_mutation_rate(7.0);
        assert_eq!(config.crossover_rate, 0.0);
        assert_eq!(config.mutation_rate, 1.0);
    }

    #[test]
    fn test_validate_rejects() {
        let cases = [
            MoeaConfig::default().with_population_size(1),
            MoeaConfig::default().with_max_evaluations(0),
            MoeaConfig::default().with_tournament_size(0),
            MoeaConfig {
                mutation_rate: f64::NAN,
                ..MoeaConfig::default()
            },
            MoeaConfig {
                crossover_rate: 1.5,
                ..MoeaConfig::default()
            },
        ];
        for config in cases {
            assert!(config.validate().is_err(), "{config:?}");
        }
    }
}
