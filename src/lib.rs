//! Interview timetabling for the U-Engine ecosystem.
//!
//! Assigns student interview requests to (tutor, time-of-day) slots with a
//! steady-state genetic algorithm running on worker threads.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Subject`, `Tutor`, `Student`,
//!   `StudentInstance`, `SlotLayout`, `SchedulingContext`
//! - **`validation`**: Input integrity checks (duplicate IDs, tutor ordinals,
//!   references, time ranges)
//! - **`ga`**: Slot-table chromosome, fitness, operators, population
//! - **`statistics`**: Per-generation aggregates with previous-generation values
//! - **`criteria`**: Generation, fitness-threshold and stagnation stop criteria
//! - **`engine`**: Multi-threaded evolution engine with an event channel
//! - **`config`**: TOML-loadable engine configuration
//! - **`seed`**: Previously saved solutions used to seed a population
//! - **`kpi`**: Constraint-violation report for a finished timetable
//!
//! # Example
//!
//! ```
//! use u_interview::ga::{FitnessEvaluator, GeneticOperators, Population, PopulationConfig};
//! use u_interview::models::{SchedulingContext, Student, Subject, Tutor};
//! use rand::rngs::SmallRng;
//! use rand::SeedableRng;
//!
//! let context = SchedulingContext::new(
//!     vec![Subject::new(1, "Maths")],
//!     vec![
//!         Tutor::new(1, "Ada").with_subject(1, 1.0),
//!         Tutor::new(2, "Grace").with_subject(1, 1.0),
//!     ],
//!     vec![Student::new(1, "Bob", 1).with_interviews(2)],
//!     12,
//! )
//! .unwrap();
//!
//! let config = PopulationConfig::default();
//! let evaluator = FitnessEvaluator::default();
//! let operators = GeneticOperators::default();
//! let mut rng = SmallRng::seed_from_u64(42);
//!
//! let mut population = Population::seed(&context, &config, &evaluator, None, &mut rng);
//! for _ in 0..50 {
//!     population.step(&context, &config, &operators, &evaluator, &mut rng).unwrap();
//! }
//! assert!(population.best().unwrap().fitness() > 0.9);
//! ```
//!
//! # References
//!
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and Machine Learning"
//! - Schaerf (1999), "A Survey of Automated Timetabling"

pub mod config;
pub mod criteria;
pub mod engine;
pub mod error;
pub mod ga;
pub mod kpi;
pub mod models;
pub mod seed;
pub mod statistics;
pub mod validation;

pub use error::{Error, Result};
