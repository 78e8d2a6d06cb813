//! Engine configuration.
//!
//! Every field has a default, so a TOML file only needs the values it
//! changes:
//!
//! ```toml
//! workers = 4
//! seed = 7
//!
//! [population]
//! size = 200
//! elite_count = 10
//!
//! [operators]
//! crossover_type = { type = "k_point", points = 3 }
//! mutation_type = "swap"
//!
//! [[stop_criteria]]
//! type = "generation"
//! generations = 500
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::criteria::{GenerationCriterion, StopCriterion};
use crate::error::{Error, Result};
use crate::ga::{FitnessWeights, GeneticOperators, PopulationConfig};

/// Everything an [`EvolutionEngine`](crate::engine::EvolutionEngine) run needs
/// besides the scheduling input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Population size and replacement parameters.
    pub population: PopulationConfig,
    /// Crossover and mutation strategies.
    pub operators: GeneticOperators,
    /// Fitness criterion weights.
    pub weights: FitnessWeights,
    /// Worker threads running generations concurrently.
    pub workers: usize,
    /// Base RNG seed; `None` draws a fresh seed per run.
    pub seed: Option<u64>,
    /// Criteria halting a run; any one firing stops it.
    pub stop_criteria: Vec<StopCriterion>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            population: PopulationConfig::default(),
            operators: GeneticOperators::default(),
            weights: FitnessWeights::default(),
            workers: 2,
            seed: None,
            stop_criteria: vec![StopCriterion::Generation(GenerationCriterion {
                generations: 1000,
            })],
        }
    }
}

impl EngineConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a TOML document and validates it.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!(
            path = %path.display(),
            population = config.population.size,
            workers = config.workers,
            criteria = config.stop_criteria.len(),
            "loaded engine configuration"
        );
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::config(e.to_string()))
    }

    pub fn with_population(mut self, population: PopulationConfig) -> Self {
        self.population = population;
        self
    }

    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population.size = size;
        self
    }

    pub fn with_elite_count(mut self, elite_count: usize) -> Self {
        self.population.elite_count = elite_count;
        self
    }

    pub fn with_mutation_probability(mut self, probability: f64) -> Self {
        self.population.mutation_probability = probability;
        self
    }

    pub fn with_operators(mut self, operators: GeneticOperators) -> Self {
        self.operators = operators;
        self
    }

    pub fn with_weights(mut self, weights: FitnessWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replaces the stop criteria.
    pub fn with_stop_criteria(mut self, criteria: Vec<StopCriterion>) -> Self {
        self.stop_criteria = criteria;
        self
    }

    /// Adds a stop criterion to the existing ones.
    pub fn with_stop_criterion(mut self, criterion: impl Into<StopCriterion>) -> Self {
        self.stop_criteria.push(criterion.into());
        self
    }

    /// Checks every parameter, returning the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.population.validate()?;
        self.operators.validate()?;
        if !self.weights.is_valid() {
            return Err(Error::config(
                "fitness weights must be finite, non-negative and not all zero",
            ));
        }
        if self.workers == 0 {
            return Err(Error::config("workers must be at least 1"));
        }
        if self.stop_criteria.is_empty() {
            return Err(Error::config("at least one stop criterion is required"));
        }
        for criterion in &self.stop_criteria {
            criterion.validate()?;
        }
        Ok(())
    }
}
