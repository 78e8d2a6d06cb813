//! Stop criteria.
//!
//! Predicates over [`Statistics`] evaluated once per completed generation.
//! Every criterion validates its parameters on construction (and again via
//! `validate()` when deserialized), so a run never starts with a criterion
//! that can't be evaluated meaningfully.
//!
//! | Criterion | Fires when |
//! |-----------|-----------|
//! | [`GenerationCriterion`] | `generation >= N` |
//! | [`FitnessCriterion`] | a statistic compares to a limit |
//! | [`FitnessProgressCriterion`] | `history_depth` consecutive generations stagnate |

use std::ops::BitOr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::statistics::{Statistics, StatisticsValue};

/// Comparison operator set; a value matches if any enabled relation holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Comparison {
    pub less_than: bool,
    pub equal: bool,
    pub greater_than: bool,
}

impl Comparison {
    pub const LESS_THAN: Comparison = Comparison {
        less_than: true,
        equal: false,
        greater_than: false,
    };
    pub const EQUAL: Comparison = Comparison {
        less_than: false,
        equal: true,
        greater_than: false,
    };
    pub const GREATER_THAN: Comparison = Comparison {
        less_than: false,
        equal: false,
        greater_than: true,
    };

    /// Whether no relation is enabled.
    pub fn is_empty(&self) -> bool {
        !(self.less_than || self.equal || self.greater_than)
    }

    /// Whether `value` relates to `limit` by any enabled relation.
    pub fn matches(&self, value: f64, limit: f64) -> bool {
        (self.less_than && value < limit)
            || (self.equal && value == limit)
            || (self.greater_than && value > limit)
    }
}

impl BitOr for Comparison {
    type Output = Comparison;

    fn bitor(self, rhs: Comparison) -> Comparison {
        Comparison {
            less_than: self.less_than || rhs.less_than,
            equal: self.equal || rhs.equal,
            greater_than: self.greater_than || rhs.greater_than,
        }
    }
}

/// How progress between two generations is measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressMode {
    /// `current - previous`.
    #[default]
    Absolute,
    /// `(current - previous) / |previous| * 100`.
    Percent,
}

/// Fires once `generation >= generations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationCriterion {
    pub generations: u64,
}

impl GenerationCriterion {
    pub fn new(generations: u64) -> Result<Self> {
        let criterion = Self { generations };
        criterion.validate()?;
        Ok(criterion)
    }

    pub fn validate(&self) -> Result<()> {
        if self.generations == 0 {
            return Err(Error::config("generation criterion needs at least 1 generation"));
        }
        Ok(())
    }

    pub fn evaluate(&self, statistics: &Statistics) -> bool {
        statistics.generation() >= self.generations
    }
}

/// Fires when a statistic compares to `limit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessCriterion {
    pub value: StatisticsValue,
    pub comparison: Comparison,
    pub limit: f64,
}

impl FitnessCriterion {
    pub fn new(value: StatisticsValue, comparison: Comparison, limit: f64) -> Result<Self> {
        let criterion = Self {
            value,
            comparison,
            limit,
        };
        criterion.validate()?;
        Ok(criterion)
    }

    pub fn validate(&self) -> Result<()> {
        if self.comparison.is_empty() {
            return Err(Error::config("fitness criterion needs a comparison"));
        }
        if !self.limit.is_finite() {
            return Err(Error::config("fitness criterion limit must be finite"));
        }
        Ok(())
    }

    pub fn evaluate(&self, statistics: &Statistics) -> bool {
        self.comparison.matches(statistics.value(self.value), self.limit)
    }
}

/// Fires after `history_depth` consecutive stagnating generations.
///
/// A generation stagnates when its progress relates to `required_progress`
/// by `comparison` (e.g. `LESS_THAN`: progress below the requirement). Any
/// non-stagnating generation resets the streak to zero, and so does firing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessProgressCriterion {
    pub value: StatisticsValue,
    pub comparison: Comparison,
    pub required_progress: f64,
    pub history_depth: u32,
    #[serde(default)]
    pub mode: ProgressMode,
    #[serde(skip)]
    streak: u32,
}

impl FitnessProgressCriterion {
    pub fn new(
        value: StatisticsValue,
        comparison: Comparison,
        required_progress: f64,
        history_depth: u32,
        mode: ProgressMode,
    ) -> Result<Self> {
        let criterion = Self {
            value,
            comparison,
            required_progress,
            history_depth,
            mode,
            streak: 0,
        };
        criterion.validate()?;
        Ok(criterion)
    }

    pub fn validate(&self) -> Result<()> {
        if self.history_depth == 0 {
            return Err(Error::config("progress criterion history depth must be at least 1"));
        }
        if self.required_progress == 0.0 || !self.required_progress.is_finite() {
            return Err(Error::config(
                "progress criterion required progress must be finite and nonzero",
            ));
        }
        if self.comparison.is_empty() {
            return Err(Error::config("progress criterion needs a comparison"));
        }
        Ok(())
    }

    /// Current run of stagnating generations.
    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn reset(&mut self) {
        self.streak = 0;
    }

    pub fn evaluate(&mut self, statistics: &Statistics) -> bool {
        let progress = statistics.progress(self.value, self.mode == ProgressMode::Percent);
        if !self.comparison.matches(progress, self.required_progress) {
            self.streak = 0;
            return false;
        }
        self.streak += 1;
        if self.streak >= self.history_depth {
            self.streak = 0;
            return true;
        }
        false
    }
}

/// A configured stop criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StopCriterion {
    Generation(GenerationCriterion),
    Fitness(FitnessCriterion),
    FitnessProgress(FitnessProgressCriterion),
}

impl StopCriterion {
    pub fn validate(&self) -> Result<()> {
        match self {
            StopCriterion::Generation(c) => c.validate(),
            StopCriterion::Fitness(c) => c.validate(),
            StopCriterion::FitnessProgress(c) => c.validate(),
        }
    }

    pub fn evaluate(&mut self, statistics: &Statistics) -> bool {
        match self {
            StopCriterion::Generation(c) => c.evaluate(statistics),
            StopCriterion::Fitness(c) => c.evaluate(statistics),
            StopCriterion::FitnessProgress(c) => c.evaluate(statistics),
        }
    }

    /// Clears any internal history.
    pub fn reset(&mut self) {
        if let StopCriterion::FitnessProgress(c) = self {
            c.reset();
        }
    }
}

impl From<GenerationCriterion> for StopCriterion {
    fn from(c: GenerationCriterion) -> Self {
        StopCriterion::Generation(c)
    }
}

impl From<FitnessCriterion> for StopCriterion {
    fn from(c: FitnessCriterion) -> Self {
        StopCriterion::Fitness(c)
    }
}

impl From<FitnessProgressCriterion> for StopCriterion {
    fn from(c: FitnessProgressCriterion) -> Self {
        StopCriterion::FitnessProgress(c)
    }
}

/// A set of criteria; stops when any one fires.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StopCriteria {
    criteria: Vec<StopCriterion>,
}

impl StopCriteria {
    /// Validates and collects the criteria.
    pub fn new(criteria: Vec<StopCriterion>) -> Result<Self> {
        for criterion in &criteria {
            criterion.validate()?;
        }
        Ok(Self { criteria })
    }

    pub fn criteria(&self) -> &[StopCriterion] {
        &self.criteria
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Evaluates every criterion (so progress streaks stay current) and
    /// reports whether any fired.
    pub fn evaluate(&mut self, statistics: &Statistics) -> bool {
        self.criteria
            .iter_mut()
            .fold(false, |fired, c| c.evaluate(statistics) || fired)
    }

    pub fn reset(&mut self) {
        self.criteria.iter_mut().for_each(StopCriterion::reset);
    }
}
