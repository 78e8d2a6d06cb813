//! Per-generation population statistics.
//!
//! Each tracked value keeps its current figure and the figure from the
//! preceding generation, so stop criteria can measure progress.
//!
//! # Combining
//!
//! `a += &b` merges statistics of two populations: best/worst take the
//! better/worse of the two (per [`FitnessComparison`]), totals and sizes
//! add up, averages are recomputed, and every scaled field is reset to
//! zero since independently scaled populations don't combine.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

/// A statistic tracked per generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatisticsValue {
    BestFitness,
    WorstFitness,
    AverageFitness,
    TotalFitness,
    BestScaledFitness,
    WorstScaledFitness,
    AverageScaledFitness,
    TotalScaledFitness,
    PopulationSize,
}

impl StatisticsValue {
    /// Every statistic, in storage order.
    pub const ALL: [StatisticsValue; 9] = [
        StatisticsValue::BestFitness,
        StatisticsValue::WorstFitness,
        StatisticsValue::AverageFitness,
        StatisticsValue::TotalFitness,
        StatisticsValue::BestScaledFitness,
        StatisticsValue::WorstScaledFitness,
        StatisticsValue::AverageScaledFitness,
        StatisticsValue::TotalScaledFitness,
        StatisticsValue::PopulationSize,
    ];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }

    fn is_scaled(self) -> bool {
        matches!(
            self,
            StatisticsValue::BestScaledFitness
                | StatisticsValue::WorstScaledFitness
                | StatisticsValue::AverageScaledFitness
                | StatisticsValue::TotalScaledFitness
        )
    }
}

/// Direction in which fitness improves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessComparison {
    #[default]
    Maximize,
    Minimize,
}

impl FitnessComparison {
    /// Whether `a` is strictly better than `b`.
    pub fn is_better(self, a: f64, b: f64) -> bool {
        match self {
            FitnessComparison::Maximize => a > b,
            FitnessComparison::Minimize => a < b,
        }
    }

    pub fn better(self, a: f64, b: f64) -> f64 {
        if self.is_better(b, a) {
            b
        } else {
            a
        }
    }

    pub fn worse(self, a: f64, b: f64) -> f64 {
        if self.is_better(b, a) {
            a
        } else {
            b
        }
    }
}

const COUNT: usize = StatisticsValue::ALL.len();

/// Current and previous-generation aggregates plus the generation counter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    current: [f64; COUNT],
    previous: [f64; COUNT],
    generation: u64,
    comparison: FitnessComparison,
}

impl Default for Statistics {
    fn default() -> Self {
        Self::new(FitnessComparison::default())
    }
}

impl Statistics {
    pub fn new(comparison: FitnessComparison) -> Self {
        Self {
            current: [0.0; COUNT],
            previous: [0.0; COUNT],
            generation: 0,
            comparison,
        }
    }

    /// Number of completed generations.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn comparison(&self) -> FitnessComparison {
        self.comparison
    }

    #[inline]
    pub fn value(&self, value: StatisticsValue) -> f64 {
        self.current[value.index()]
    }

    #[inline]
    pub fn previous_value(&self, value: StatisticsValue) -> f64 {
        self.previous[value.index()]
    }

    /// Sets (`relative == false`) or offsets (`relative == true`) a current value.
    ///
    /// Changing a total or the population size recomputes the matching averages.
    pub fn change_value(&mut self, value: StatisticsValue, amount: f64, relative: bool) {
        let slot = &mut self.current[value.index()];
        if relative {
            *slot += amount;
        } else {
            *slot = amount;
        }

        match value {
            StatisticsValue::TotalFitness => self.recompute_average(false),
            StatisticsValue::TotalScaledFitness => self.recompute_average(true),
            StatisticsValue::PopulationSize => {
                self.recompute_average(false);
                self.recompute_average(true);
            }
            _ => {}
        }
    }

    /// Moves current values to "previous" and advances the generation counter.
    pub fn next_generation(&mut self) {
        self.previous = self.current;
        self.generation += 1;
    }

    /// Change of a value since the previous generation.
    ///
    /// With `percent`, the change is expressed as a percentage of the
    /// previous value's magnitude; from a previous value of zero any
    /// change is infinite.
    pub fn progress(&self, value: StatisticsValue, percent: bool) -> f64 {
        let current = self.value(value);
        let previous = self.previous_value(value);
        let diff = current - previous;
        if !percent {
            return diff;
        }
        if previous == 0.0 {
            if diff == 0.0 {
                0.0
            } else {
                f64::INFINITY.copysign(diff)
            }
        } else {
            diff / previous.abs() * 100.0
        }
    }

    /// Clears all values and the generation counter.
    pub fn reset(&mut self) {
        *self = Self::new(self.comparison);
    }

    /// Merges another population's statistics into this one.
    pub fn combine(&mut self, other: &Statistics) {
        use StatisticsValue::*;

        let own_size = self.value(PopulationSize);
        let other_size = other.value(PopulationSize);

        if own_size <= 0.0 {
            self.current[BestFitness.index()] = other.value(BestFitness);
            self.current[WorstFitness.index()] = other.value(WorstFitness);
        } else if other_size > 0.0 {
            self.current[BestFitness.index()] = self
                .comparison
                .better(self.value(BestFitness), other.value(BestFitness));
            self.current[WorstFitness.index()] = self
                .comparison
                .worse(self.value(WorstFitness), other.value(WorstFitness));
        }

        self.current[TotalFitness.index()] += other.value(TotalFitness);
        self.current[PopulationSize.index()] = own_size + other_size;

        for value in StatisticsValue::ALL.into_iter().filter(|v| v.is_scaled()) {
            self.current[value.index()] = 0.0;
        }
        self.recompute_average(false);
        self.generation = self.generation.max(other.generation);
    }

    fn recompute_average(&mut self, scaled: bool) {
        let (total, average) = if scaled {
            (
                StatisticsValue::TotalScaledFitness,
                StatisticsValue::AverageScaledFitness,
            )
        } else {
            (
                StatisticsValue::TotalFitness,
                StatisticsValue::AverageFitness,
            )
        };
        let size = self.value(StatisticsValue::PopulationSize);
        self.current[average.index()] = if size > 0.0 {
            self.value(total) / size
        } else {
            0.0
        };
    }
}

impl AddAssign<&Statistics> for Statistics {
    fn add_assign(&mut self, other: &Statistics) {
        self.combine(other);
    }
}
