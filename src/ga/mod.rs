//! Genetic algorithm for interview timetabling.
//!
//! # Encoding
//!
//! A chromosome is a slot table: `T × L` global slots (tutor-major), each
//! holding the student instances interviewed there. See
//! [`TimetableChromosome`].
//!
//! # Submodules
//!
//! - [`operators`]: Runtime-selectable crossover and mutation strategies
//! - [`population`]: Selection, breeding and elitist replacement
//!
//! # Reference
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and Machine Learning"
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

mod chromosome;
mod fitness;
pub mod operators;
pub mod population;

pub use chromosome::{MutationTransaction, TimetableChromosome, UNEVALUATED};
pub use fitness::{FitnessBreakdown, FitnessEvaluator, FitnessWeights, StudentLoad};
pub use operators::{
    crossover_at, k_point_crossover, relocate_mutation, swap_mutation, uniform_crossover,
    CrossoverType, GeneticOperators, MutationType,
};
pub use population::{breed, Population, PopulationConfig};
