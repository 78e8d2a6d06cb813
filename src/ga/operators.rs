//! Crossover and mutation operators.
//!
//! Operators are stateless: they read parents, write children, and draw
//! from the caller's RNG. Instances are always visited in ascending id
//! order, so results are reproducible under a fixed seed.
//!
//! Strategies are selected through [`GeneticOperators`].
//!
//! ```
//! use u_interview::ga::{CrossoverType, GeneticOperators, MutationType};
//!
//! let ops = GeneticOperators::default();
//! assert_eq!(ops.crossover_type, CrossoverType::KPoint { points: 2 });
//! assert_eq!(ops.mutation_type, MutationType::Relocate);
//! ```

use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::TimetableChromosome;
use crate::error::{Error, Result};

// ======================== Crossover operators ========================

/// k-point crossover with caller-supplied points.
///
/// Walks the instances in ascending id order, copying each placement from
/// the active parent and switching parents on reaching each index in
/// `points`. Deterministic: identical parents, points and starting parent
/// always give the same child.
pub fn crossover_at(
    p1: &TimetableChromosome,
    p2: &TimetableChromosome,
    points: &[usize],
    start_with_first: bool,
) -> Result<TimetableChromosome> {
    check_parents(p1, p2)?;

    let mut points = points.to_vec();
    points.sort_unstable();
    points.dedup();
    let mut points = points.into_iter().peekable();

    let mut child = p1.clone_with(false);
    let mut first_active = start_with_first;

    for (i, ((&id, &slot1), (_, &slot2))) in
        p1.placements().iter().zip(p2.placements()).enumerate()
    {
        while points.next_if_eq(&i).is_some() {
            first_active = !first_active;
        }
        child.place(id, if first_active { slot1 } else { slot2 });
    }

    Ok(child)
}

/// k-point crossover with `k` distinct random points and a random starting parent.
pub fn k_point_crossover<R: Rng>(
    p1: &TimetableChromosome,
    p2: &TimetableChromosome,
    k: usize,
    rng: &mut R,
) -> Result<TimetableChromosome> {
    let n = p1.instance_count();
    let points = index::sample(rng, n, k.min(n)).into_vec();
    let start_with_first = rng.random_bool(0.5);
    crossover_at(p1, p2, &points, start_with_first)
}

/// Uniform crossover: each placement comes from either parent with equal probability.
pub fn uniform_crossover<R: Rng>(
    p1: &TimetableChromosome,
    p2: &TimetableChromosome,
    rng: &mut R,
) -> Result<TimetableChromosome> {
    check_parents(p1, p2)?;

    let mut child = p1.clone_with(false);
    for ((&id, &slot1), (_, &slot2)) in p1.placements().iter().zip(p2.placements()) {
        child.place(id, if rng.random_bool(0.5) { slot1 } else { slot2 });
    }
    Ok(child)
}

fn check_parents(p1: &TimetableChromosome, p2: &TimetableChromosome) -> Result<()> {
    if p1.num_slots() != p2.num_slots() {
        return Err(Error::invariant(format!(
            "crossover parents have {} and {} slots",
            p1.num_slots(),
            p2.num_slots()
        )));
    }
    if p1.instance_count() != p2.instance_count() || !p1.instance_ids().eq(p2.instance_ids()) {
        return Err(Error::invariant(
            "crossover parents place different instance sets",
        ));
    }
    Ok(())
}

// ======================== Mutation operators ========================

/// Relocates `count` randomly chosen instances to uniformly random slots.
///
/// The new slot may equal the old one.
pub fn relocate_mutation<R: Rng>(chromosome: &mut TimetableChromosome, count: usize, rng: &mut R) {
    let n = chromosome.instance_count();
    let num_slots = chromosome.num_slots();
    if n == 0 || num_slots == 0 {
        return;
    }
    for _ in 0..count {
        let i = rng.random_range(0..n);
        if let Some(id) = chromosome.nth_instance(i) {
            chromosome.place(id, rng.random_range(0..num_slots));
        }
    }
}

/// Exchanges the slots of `count` random instance pairs.
pub fn swap_mutation<R: Rng>(chromosome: &mut TimetableChromosome, count: usize, rng: &mut R) {
    let n = chromosome.instance_count();
    if n < 2 {
        return;
    }
    for _ in 0..count {
        let a = chromosome.nth_instance(rng.random_range(0..n));
        let b = chromosome.nth_instance(rng.random_range(0..n));
        if let (Some(a), Some(b)) = (a, b) {
            if let (Some(slot_a), Some(slot_b)) = (chromosome.slot_of(a), chromosome.slot_of(b)) {
                chromosome.place(a, slot_b);
                chromosome.place(b, slot_a);
            }
        }
    }
}

// ======================== Strategy selection ========================

/// Crossover strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CrossoverType {
    /// Splice at `points` distinct random positions.
    KPoint { points: usize },
    /// Pick each placement from either parent.
    Uniform,
}

/// Mutation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationType {
    /// Move an instance to a random slot.
    Relocate,
    /// Exchange the slots of two instances.
    Swap,
}

/// Runtime-selectable genetic operators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticOperators {
    /// Crossover strategy.
    pub crossover_type: CrossoverType,
    /// Mutation strategy.
    pub mutation_type: MutationType,
    /// Elementary moves per mutation.
    pub mutation_count: usize,
}

impl Default for GeneticOperators {
    fn default() -> Self {
        Self {
            crossover_type: CrossoverType::KPoint { points: 2 },
            mutation_type: MutationType::Relocate,
            mutation_count: 1,
        }
    }
}

impl GeneticOperators {
    /// Performs crossover using the configured strategy.
    pub fn crossover<R: Rng>(
        &self,
        p1: &TimetableChromosome,
        p2: &TimetableChromosome,
        rng: &mut R,
    ) -> Result<TimetableChromosome> {
        match self.crossover_type {
            CrossoverType::KPoint { points } => k_point_crossover(p1, p2, points, rng),
            CrossoverType::Uniform => uniform_crossover(p1, p2, rng),
        }
    }

    /// Performs mutation using the configured strategy.
    pub fn mutate<R: Rng>(&self, chromosome: &mut TimetableChromosome, rng: &mut R) {
        match self.mutation_type {
            MutationType::Relocate => relocate_mutation(chromosome, self.mutation_count, rng),
            MutationType::Swap => swap_mutation(chromosome, self.mutation_count, rng),
        }
    }

    /// Rejects parameters that would make an operator a no-op by accident.
    pub fn validate(&self) -> Result<()> {
        if let CrossoverType::KPoint { points: 0 } = self.crossover_type {
            return Err(Error::config("crossover points must be at least 1"));
        }
        if self.mutation_count == 0 {
            return Err(Error::config("mutation_count must be at least 1"));
        }
        Ok(())
    }
}
