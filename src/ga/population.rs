//! Fixed-size population and the generation step.
//!
//! A generation is split so the expensive part runs outside any lock:
//!
//! 1. [`Population::select_parents`] draws `selection_size` distinct members
//!    and keeps the best `parent_count` (read-only).
//! 2. [`breed`] couples the parents, mutates and evaluates the offspring
//!    (touches no shared state).
//! 3. [`Population::replace`] swaps the weakest non-elite members for the
//!    offspring (the only write).
//!
//! [`Population::step`] runs all three in sequence.

use std::cmp::Ordering;

use rand::seq::index;
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{FitnessEvaluator, GeneticOperators, TimetableChromosome};
use crate::error::{Error, Result};
use crate::models::SchedulingContext;
use crate::seed::SeedSolution;
use crate::statistics::{Statistics, StatisticsValue};

/// Population and replacement parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Number of chromosomes (`P`); constant for a run.
    pub size: usize,
    /// Random members drawn per selection (`S`).
    pub selection_size: usize,
    /// Best of the drawn members kept as parents (`K`).
    pub parent_count: usize,
    /// Offspring produced and members replaced per generation (`C`).
    pub offspring_count: usize,
    /// Fittest members never replaced (`E`).
    pub elite_count: usize,
    /// Probability that an offspring is mutated.
    pub mutation_probability: f64,
    /// Roll back mutations that lower an offspring's fitness.
    pub reject_worse_mutations: bool,
    /// Best/worst chromosomes remembered for reporting.
    pub track_count: usize,
    /// Members initialized from a seed solution, when one is supplied.
    pub seeded_members: usize,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: 100,
            selection_size: 20,
            parent_count: 10,
            offspring_count: 10,
            elite_count: 5,
            mutation_probability: 0.5,
            reject_worse_mutations: false,
            track_count: 5,
            seeded_members: 1,
        }
    }
}

impl PopulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.size < 2 {
            return Err(Error::config("population size must be at least 2"));
        }
        if self.parent_count < 2 {
            return Err(Error::config("parent_count must be at least 2"));
        }
        if self.parent_count > self.selection_size {
            return Err(Error::config("parent_count must not exceed selection_size"));
        }
        if self.selection_size > self.size {
            return Err(Error::config("selection_size must not exceed population size"));
        }
        if self.offspring_count == 0 {
            return Err(Error::config("offspring_count must be at least 1"));
        }
        if self.elite_count + self.offspring_count > self.size {
            return Err(Error::config(
                "elite_count + offspring_count must not exceed population size",
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_probability) {
            return Err(Error::config("mutation_probability must be within [0, 1]"));
        }
        Ok(())
    }
}

/// The pool of candidate timetables.
#[derive(Debug, Clone)]
pub struct Population {
    members: Vec<TimetableChromosome>,
    tracked_best: Vec<TimetableChromosome>,
    tracked_worst: Vec<TimetableChromosome>,
    track_count: usize,
}

impl Population {
    /// Creates and evaluates the initial population.
    ///
    /// With a seed solution, the first `seeded_members` members are built
    /// from it; the rest are random.
    pub fn seed<R: Rng>(
        context: &SchedulingContext,
        config: &PopulationConfig,
        evaluator: &FitnessEvaluator,
        seed: Option<&SeedSolution>,
        rng: &mut R,
    ) -> Self {
        let instances = context.instance_ids();
        let seeded = seed.map_or(0, |_| config.seeded_members.min(config.size));

        let mut members = Vec::with_capacity(config.size);
        if let Some(seed) = seed {
            members.extend((0..seeded).map(|_| seed.apply(context, rng)));
        }
        members.extend(
            (seeded..config.size)
                .map(|_| TimetableChromosome::random(&instances, context.num_slots(), rng)),
        );

        Self::from_members(members, context, evaluator, config.track_count)
    }

    /// Wraps existing chromosomes, evaluating them.
    pub fn from_members(
        members: Vec<TimetableChromosome>,
        context: &SchedulingContext,
        evaluator: &FitnessEvaluator,
        track_count: usize,
    ) -> Self {
        let mut population = Self {
            members,
            tracked_best: Vec::new(),
            tracked_worst: Vec::new(),
            track_count,
        };
        population.evaluate_all(context, evaluator);
        population
    }

    /// Re-evaluates every member in parallel.
    pub fn evaluate_all(&mut self, context: &SchedulingContext, evaluator: &FitnessEvaluator) {
        self.members.par_iter_mut().for_each(|member| {
            evaluator.evaluate_in_place(context, member);
        });
        self.tracked_best.clear();
        self.tracked_worst.clear();
        self.update_tracking();
    }

    pub fn members(&self) -> &[TimetableChromosome] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member indices, fittest first (ties keep index order).
    pub fn ranked_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.members.len()).collect();
        indices.sort_by(|&a, &b| by_fitness_desc(&self.members[a], &self.members[b]));
        indices
    }

    /// Fittest member.
    pub fn best(&self) -> Option<&TimetableChromosome> {
        self.members.iter().min_by(|a, b| by_fitness_desc(a, b))
    }

    /// Weakest member.
    pub fn worst(&self) -> Option<&TimetableChromosome> {
        self.members.iter().max_by(|a, b| by_fitness_desc(a, b))
    }

    /// Best chromosomes seen so far, fittest first.
    pub fn tracked_best(&self) -> &[TimetableChromosome] {
        &self.tracked_best
    }

    /// Worst chromosomes seen so far, weakest first.
    pub fn tracked_worst(&self) -> &[TimetableChromosome] {
        &self.tracked_worst
    }

    /// Draws `selection_size` distinct members and returns copies of the
    /// best `parent_count`, fittest first.
    pub fn select_parents<R: Rng>(
        &self,
        config: &PopulationConfig,
        rng: &mut R,
    ) -> Vec<TimetableChromosome> {
        let n = self.members.len();
        let mut drawn = index::sample(rng, n, config.selection_size.min(n)).into_vec();
        drawn.sort_by(|&a, &b| by_fitness_desc(&self.members[a], &self.members[b]));
        drawn
            .into_iter()
            .take(config.parent_count)
            .map(|i| self.members[i].clone())
            .collect()
    }

    /// Replaces the weakest members with `offspring`, never touching the
    /// `elite_count` fittest. Returns how many members were replaced.
    pub fn replace(&mut self, offspring: Vec<TimetableChromosome>, elite_count: usize) -> usize {
        let ranked = self.ranked_indices();
        let elite = elite_count.min(ranked.len());
        let victims: Vec<usize> = ranked[elite..]
            .iter()
            .rev()
            .take(offspring.len())
            .copied()
            .collect();

        let replaced = victims.len();
        for (idx, child) in victims.into_iter().zip(offspring) {
            self.members[idx] = child;
        }
        self.update_tracking();
        replaced
    }

    /// One complete generation on the calling thread.
    pub fn step<R: Rng>(
        &mut self,
        context: &SchedulingContext,
        config: &PopulationConfig,
        operators: &GeneticOperators,
        evaluator: &FitnessEvaluator,
        rng: &mut R,
    ) -> Result<usize> {
        let parents = self.select_parents(config, rng);
        let offspring = breed(&parents, context, config, operators, evaluator, rng)?;
        Ok(self.replace(offspring, config.elite_count))
    }

    /// Writes this population's aggregates into the current statistics.
    ///
    /// Scaled values use window scaling: `(f - worst) / (best - worst)`,
    /// or 1.0 for every member when all fitnesses are equal.
    pub fn record(&self, statistics: &mut Statistics) {
        let (Some(best), Some(worst)) = (self.best(), self.worst()) else {
            statistics.change_value(StatisticsValue::PopulationSize, 0.0, false);
            return;
        };
        let (best, worst) = (best.fitness(), worst.fitness());
        let total: f64 = self.members.iter().map(TimetableChromosome::fitness).sum();

        let span = best - worst;
        let scale = |f: f64| if span > 0.0 { (f - worst) / span } else { 1.0 };
        let total_scaled: f64 = self.members.iter().map(|m| scale(m.fitness())).sum();

        statistics.change_value(StatisticsValue::PopulationSize, self.members.len() as f64, false);
        statistics.change_value(StatisticsValue::BestFitness, best, false);
        statistics.change_value(StatisticsValue::WorstFitness, worst, false);
        statistics.change_value(StatisticsValue::TotalFitness, total, false);
        statistics.change_value(StatisticsValue::BestScaledFitness, scale(best), false);
        statistics.change_value(StatisticsValue::WorstScaledFitness, scale(worst), false);
        statistics.change_value(StatisticsValue::TotalScaledFitness, total_scaled, false);
    }

    fn update_tracking(&mut self) {
        if self.track_count == 0 {
            return;
        }
        let ranked = self.ranked_indices();
        let k = self.track_count;

        let mut best = std::mem::take(&mut self.tracked_best);
        best.extend(ranked.iter().take(k).map(|&i| self.members[i].clone()));
        self.tracked_best = keep_distinct(best, k, by_fitness_desc);

        let mut worst = std::mem::take(&mut self.tracked_worst);
        worst.extend(ranked.iter().rev().take(k).map(|&i| self.members[i].clone()));
        self.tracked_worst = keep_distinct(worst, k, |a, b| by_fitness_desc(b, a));
    }
}

/// Couples parents sequentially, then mutates and evaluates each child.
///
/// Produces `offspring_count` children. Every child is checked to place
/// the same instances as the context; a mismatch is an [`Error::Invariant`].
pub fn breed<R: Rng>(
    parents: &[TimetableChromosome],
    context: &SchedulingContext,
    config: &PopulationConfig,
    operators: &GeneticOperators,
    evaluator: &FitnessEvaluator,
    rng: &mut R,
) -> Result<Vec<TimetableChromosome>> {
    if parents.is_empty() {
        return Err(Error::invariant("no parents to breed from"));
    }
    let k = parents.len();
    let mut offspring = Vec::with_capacity(config.offspring_count);

    for i in 0..config.offspring_count {
        let a = &parents[(2 * i) % k];
        let b = &parents[(2 * i + 1) % k];
        let mut child = operators.crossover(a, b, rng)?;
        evaluator.evaluate_in_place(context, &mut child);

        if rng.random_bool(config.mutation_probability) {
            let mut tx = child.begin_mutation();
            operators.mutate(&mut tx, rng);
            let fitness = evaluator.evaluate_in_place(context, &mut tx);
            if config.reject_worse_mutations && fitness < tx.previous_fitness() {
                tx.rollback();
            } else {
                tx.commit();
            }
        }

        child.check_invariants()?;
        if child.instance_count() != context.instance_count() {
            return Err(Error::invariant(format!(
                "offspring places {} instances, expected {}",
                child.instance_count(),
                context.instance_count()
            )));
        }
        offspring.push(child);
    }

    Ok(offspring)
}

fn by_fitness_desc(a: &TimetableChromosome, b: &TimetableChromosome) -> Ordering {
    b.fitness()
        .partial_cmp(&a.fitness())
        .unwrap_or(Ordering::Equal)
}

fn keep_distinct(
    mut candidates: Vec<TimetableChromosome>,
    k: usize,
    order: impl Fn(&TimetableChromosome, &TimetableChromosome) -> Ordering,
) -> Vec<TimetableChromosome> {
    candidates.sort_by(&order);
    let mut kept: Vec<TimetableChromosome> = Vec::with_capacity(k);
    for candidate in candidates {
        if kept.len() == k {
            break;
        }
        if !kept.iter().any(|c| c.placements() == candidate.placements()) {
            kept.push(candidate);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BaseId, Student, Subject, Tutor};
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn context() -> SchedulingContext {
        SchedulingContext::new(
            vec![Subject::new(1, "Maths"), Subject::new(2, "Physics")],
            vec![
                Tutor::new(1, "T1").with_subject(1, 1.0).with_blocked_time(0),
                Tutor::new(2, "T2").with_subject(2, 1.0),
                Tutor::new(3, "T3").with_subject(1, 0.5).with_subject(2, 0.5),
            ],
            (1..=10u32)
                .map(|i| Student::new(i, format!("S{i}"), 1 + i % 2).with_interviews(2))
                .collect(),
            12,
        )
        .unwrap()
    }

    fn small_config() -> PopulationConfig {
        PopulationConfig {
            size: 20,
            selection_size: 8,
            parent_count: 4,
            offspring_count: 6,
            elite_count: 2,
            mutation_probability: 0.5,
            reject_worse_mutations: false,
            track_count: 3,
            seeded_members: 1,
        }
    }

    #[test]
    fn test_default_config_valid() {
        assert!(PopulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let base = small_config();
        let cases = [
            PopulationConfig {
                size: 1,
                ..base.clone()
            },
            PopulationConfig {
                parent_count: 1,
                ..base.clone()
            },
            PopulationConfig {
                parent_count: 9,
                ..base.clone()
            },
            PopulationConfig {
                selection_size: 21,
                ..base.clone()
            },
            PopulationConfig {
                offspring_count: 0,
                ..base.clone()
            },
            PopulationConfig {
                elite_count: 15,
                ..base.clone()
            },
            PopulationConfig {
                mutation_probability: 1.5,
                ..base.clone()
            },
        ];
        for case in cases {
            assert!(case.validate().is_err(), "{case:?}");
        }
    }

    #[test]
    fn test_seed_population() {
        let ctx = context();
        let mut rng = SmallRng::seed_from_u64(42);
        let evaluator = FitnessEvaluator::default();
        let pop = Population::seed(&ctx, &small_config(), &evaluator, None, &mut rng);

        assert_eq!(pop.len(), 20);
        for member in pop.members() {
            assert!(member.is_evaluated());
            assert!(member.check_instances(&ctx.instance_ids()).is_ok());
        }
        assert_eq!(pop.tracked_best().len(), 3);
        assert_eq!(pop.tracked_worst().len(), 3);
    }

    #[test]
    fn test_seed_population_from_solution() {
        let ctx = context();
        let mut seed = SeedSolution::new();
        seed.insert(13, BaseId(1));
        let mut rng = SmallRng::seed_from_u64(42);
        let config = PopulationConfig {
            seeded_members: 2,
            ..small_config()
        };
        let evaluator = FitnessEvaluator::default();
        let pop = Population::seed(&ctx, &config, &evaluator, Some(&seed), &mut rng);
        let first = ctx.instances_of(BaseId(1)).next().unwrap().id;
        assert_eq!(pop.members()[0].slot_of(first), Some(13));
        assert_eq!(pop.members()[1].slot_of(first), Some(13));
        assert_eq!(pop.len(), 20);
    }

    #[test]
    fn test_select_parents_best_of_sample() {
        let ctx = context();
        let config = small_config();
        let mut rng = SmallRng::seed_from_u64(42);
        let pop = Population::seed(&ctx, &config, &FitnessEvaluator::default(), None, &mut rng);

        let parents = pop.select_parents(&config, &mut rng);
        assert_eq!(parents.len(), 4);
        for pair in parents.windows(2) {
            assert!(pair[0].fitness() >= pair[1].fitness());
        }
    }

    #[test]
    fn test_replace_protects_elite() {
        let ctx = context();
        let config = small_config();
        let evaluator = FitnessEvaluator::default();
        let mut rng = SmallRng::seed_from_u64(42);
        let mut pop = Population::seed(&ctx, &config, &evaluator, None, &mut rng);

        let ranked = pop.ranked_indices();
        let elite: Vec<TimetableChromosome> =
            ranked[..2].iter().map(|&i| pop.members()[i].clone()).collect();

        // Offspring worse than everyone still must not displace the elite.
        let mut offspring = Vec::new();
        for _ in 0..18 {
            let mut child = pop.members()[0].clone();
            child.set_fitness(-1.0);
            offspring.push(child);
        }
        let replaced = pop.replace(offspring, 2);

        assert_eq!(replaced, 18);
        assert_eq!(pop.len(), 20);
        for e in &elite {
            assert!(pop.members().iter().any(|m| m.placements() == e.placements()
                && (m.fitness() - e.fitness()).abs() < 1e-12));
        }
    }

    #[test]
    fn test_replace_removes_weakest() {
        let ctx = context();
        let evaluator = FitnessEvaluator::default();
        let mut rng = SmallRng::seed_from_u64(42);
        let members: Vec<TimetableChromosome> = (0..5)
            .map(|_| TimetableChromosome::random(&ctx.instance_ids(), ctx.num_slots(), &mut rng))
            .collect();
        let mut pop = Population::from_members(members, &ctx, &evaluator, 2);
        let worst_index = *pop.ranked_indices().last().unwrap();

        let mut child = pop.best().unwrap().clone();
        child.set_fitness(2.0);
        assert_eq!(pop.replace(vec![child], 1), 1);

        assert!((pop.members()[worst_index].fitness() - 2.0).abs() < 1e-12);
        assert!((pop.best().unwrap().fitness() - 2.0).abs() < 1e-12);
        assert!((pop.tracked_best()[0].fitness() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_breed_preserves_instances() {
        let ctx = context();
        let config = PopulationConfig {
            mutation_probability: 1.0,
            ..small_config()
        };
        let evaluator = FitnessEvaluator::default();
        let mut rng = SmallRng::seed_from_u64(42);
        let pop = Population::seed(&ctx, &config, &evaluator, None, &mut rng);
        let parents = pop.select_parents(&config, &mut rng);

        let offspring = breed(
            &parents,
            &ctx,
            &config,
            &GeneticOperators::default(),
            &evaluator,
            &mut rng,
        )
        .unwrap();
        assert_eq!(offspring.len(), 6);
        for child in &offspring {
            assert!(child.check_instances(&ctx.instance_ids()).is_ok());
            assert!(child.is_evaluated());
            assert!((child.fitness() - evaluator.evaluate(&ctx, child)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_breed_rolls_back_worse_mutations() {
        let ctx = context();
        let config = PopulationConfig {
            mutation_probability: 1.0,
            reject_worse_mutations: true,
            ..small_config()
        };
        let operators = GeneticOperators {
            mutation_count: 5,
            ..Default::default()
        };
        let evaluator = FitnessEvaluator::default();
        let mut rng = SmallRng::seed_from_u64(11);
        let pop = Population::seed(&ctx, &config, &evaluator, None, &mut rng);

        let mut rolled_back = 0;
        let mut kept = 0;
        for _ in 0..10 {
            let parents = pop.select_parents(&config, &mut rng);
            let k = parents.len();

            // Replays the same draws breed makes, one child at a time.
            let mut replay = rng.clone();
            let offspring =
                breed(&parents, &ctx, &config, &operators, &evaluator, &mut rng).unwrap();

            for (i, child) in offspring.iter().enumerate() {
                let (a, b) = (&parents[(2 * i) % k], &parents[(2 * i + 1) % k]);
                let mut crossed = operators.crossover(a, b, &mut replay).unwrap();
                let before = evaluator.evaluate_in_place(&ctx, &mut crossed);
                assert!(replay.random_bool(config.mutation_probability));
                let mut mutated = crossed.clone();
                operators.mutate(&mut mutated, &mut replay);
                let after = evaluator.evaluate(&ctx, &mutated);

                assert!(child.fitness() >= before);
                assert!(child.check_instances(&ctx.instance_ids()).is_ok());
                if after < before {
                    assert_eq!(child.placements(), crossed.placements());
                    assert!((child.fitness() - before).abs() < 1e-12);
                    rolled_back += 1;
                } else {
                    assert_eq!(child.placements(), mutated.placements());
                    assert!((child.fitness() - after).abs() < 1e-12);
                    kept += 1;
                }
            }
        }
        assert!(rolled_back > 0);
        assert!(kept > 0);
    }

    #[test]
    fn test_breed_keeps_worse_mutations_by_default() {
        let ctx = context();
        let config = PopulationConfig {
            mutation_probability: 1.0,
            ..small_config()
        };
        let operators = GeneticOperators {
            mutation_count: 5,
            ..Default::default()
        };
        let evaluator = FitnessEvaluator::default();
        let mut rng = SmallRng::seed_from_u64(11);
        let pop = Population::seed(&ctx, &config, &evaluator, None, &mut rng);

        let parents = pop.select_parents(&config, &mut rng);
        let k = parents.len();
        let mut replay = rng.clone();
        let offspring = breed(&parents, &ctx, &config, &operators, &evaluator, &mut rng).unwrap();

        for (i, child) in offspring.iter().enumerate() {
            let (a, b) = (&parents[(2 * i) % k], &parents[(2 * i + 1) % k]);
            let mut mutated = operators.crossover(a, b, &mut replay).unwrap();
            evaluator.evaluate_in_place(&ctx, &mut mutated);
            assert!(replay.random_bool(config.mutation_probability));
            operators.mutate(&mut mutated, &mut replay);
            assert_eq!(child.placements(), mutated.placements());
        }
    }

    #[test]
    fn test_breed_detects_foreign_parents() {
        let ctx = context();
        let evaluator = FitnessEvaluator::default();
        let mut rng = SmallRng::seed_from_u64(42);
        let ids = ctx.instance_ids();
        let parents = vec![
            TimetableChromosome::random(&ids[..5], ctx.num_slots(), &mut rng),
            TimetableChromosome::random(&ids[..5], ctx.num_slots(), &mut rng),
        ];
        let result = breed(
            &parents,
            &ctx,
            &small_config(),
            &GeneticOperators::default(),
            &evaluator,
            &mut rng,
        );
        assert!(matches!(result, Err(Error::Invariant(_))));
    }

    #[test]
    fn test_step_keeps_size_and_never_loses_best() {
        let ctx = context();
        let config = small_config();
        let evaluator = FitnessEvaluator::default();
        let operators = GeneticOperators::default();
        let mut rng = SmallRng::seed_from_u64(42);
        let mut pop = Population::seed(&ctx, &config, &evaluator, None, &mut rng);

        let mut best = pop.best().unwrap().fitness();
        for _ in 0..50 {
            pop.step(&ctx, &config, &operators, &evaluator, &mut rng).unwrap();
            assert_eq!(pop.len(), 20);
            let now = pop.best().unwrap().fitness();
            assert!(now >= best);
            best = now;
        }
    }

    #[test]
    fn test_record_statistics() {
        let ctx = context();
        let evaluator = FitnessEvaluator::default();
        let mut rng = SmallRng::seed_from_u64(42);
        let pop = Population::seed(&ctx, &small_config(), &evaluator, None, &mut rng);

        let mut stats = Statistics::default();
        pop.record(&mut stats);

        let total: f64 = pop.members().iter().map(|m| m.fitness()).sum();
        assert_eq!(stats.value(StatisticsValue::PopulationSize), 20.0);
        assert!((stats.value(StatisticsValue::TotalFitness) - total).abs() < 1e-10);
        assert!((stats.value(StatisticsValue::AverageFitness) - total / 20.0).abs() < 1e-10);
        let best = pop.best().unwrap().fitness();
        assert!((stats.value(StatisticsValue::BestFitness) - best).abs() < 1e-12);
        assert!(stats.value(StatisticsValue::WorstFitness) <= best);
        assert!((stats.value(StatisticsValue::BestScaledFitness) - 1.0).abs() < 1e-12);
        let avg_scaled = stats.value(StatisticsValue::AverageScaledFitness);
        assert!((0.0..=1.0).contains(&avg_scaled));
    }
}
