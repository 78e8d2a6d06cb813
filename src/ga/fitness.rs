//! Timetable fitness.
//!
//! Each placed instance earns weight for every criterion it satisfies:
//!
//! | Criterion | Condition | Default weight |
//! |-----------|-----------|----------------|
//! | Exclusivity | no other instance shares the slot | 1.5 |
//! | Subject match | tutor has nonzero proficiency in the subject | 1.0 |
//! | Availability | tutor not blocked at that time | 1.0 |
//! | Single engagement | only instance of its student at that time, across all tutors | 1.0 |
//! | Pairing diversity | only instance of its student with that tutor | 0.2 |
//! | Novelty | tutor not among the student's previous tutors | 0.1 |
//!
//! Fitness = earned / (per-instance maximum × instance count), in `[0, 1]`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::TimetableChromosome;
use crate::models::{BaseId, SchedulingContext, TutorId};

/// Per-criterion weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    pub exclusivity: f64,
    pub subject_match: f64,
    pub availability: f64,
    pub single_engagement: f64,
    pub pairing_diversity: f64,
    pub novelty: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            exclusivity: 1.5,
            subject_match: 1.0,
            availability: 1.0,
            single_engagement: 1.0,
            pairing_diversity: 0.2,
            novelty: 0.1,
        }
    }
}

impl FitnessWeights {
    /// Weight earned by an instance satisfying every criterion.
    pub fn per_instance_max(&self) -> f64 {
        self.exclusivity
            + self.subject_match
            + self.availability
            + self.single_engagement
            + self.pairing_diversity
            + self.novelty
    }

    /// Whether every weight is finite and non-negative, with a positive sum.
    pub fn is_valid(&self) -> bool {
        let all = [
            self.exclusivity,
            self.subject_match,
            self.availability,
            self.single_engagement,
            self.pairing_diversity,
            self.novelty,
        ];
        all.iter().all(|w| w.is_finite() && *w >= 0.0) && self.per_instance_max() > 0.0
    }
}

/// Number of instances satisfying each criterion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FitnessBreakdown {
    pub instances: usize,
    pub exclusive: usize,
    pub subject_match: usize,
    pub available: usize,
    pub single_engagement: usize,
    pub diverse_pairing: usize,
    pub novel: usize,
}

impl FitnessBreakdown {
    /// Total weight earned.
    pub fn earned(&self, weights: &FitnessWeights) -> f64 {
        weights.exclusivity * self.exclusive as f64
            + weights.subject_match * self.subject_match as f64
            + weights.availability * self.available as f64
            + weights.single_engagement * self.single_engagement as f64
            + weights.pairing_diversity * self.diverse_pairing as f64
            + weights.novelty * self.novel as f64
    }

    /// Normalized fitness in `[0, 1]`; 0.0 when nothing is placed.
    pub fn fitness(&self, weights: &FitnessWeights) -> f64 {
        if self.instances == 0 {
            return 0.0;
        }
        let max = weights.per_instance_max() * self.instances as f64;
        (self.earned(weights) / max).clamp(0.0, 1.0)
    }
}

/// Scores chromosomes against the scheduling constraints.
#[derive(Debug, Clone, Default)]
pub struct FitnessEvaluator {
    weights: FitnessWeights,
}

impl FitnessEvaluator {
    pub fn new(weights: FitnessWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &FitnessWeights {
        &self.weights
    }

    /// Normalized fitness of a chromosome.
    pub fn evaluate(&self, context: &SchedulingContext, chromosome: &TimetableChromosome) -> f64 {
        self.breakdown(context, chromosome).fitness(&self.weights)
    }

    /// Evaluates and caches the fitness on the chromosome.
    pub fn evaluate_in_place(
        &self,
        context: &SchedulingContext,
        chromosome: &mut TimetableChromosome,
    ) -> f64 {
        let fitness = self.evaluate(context, chromosome);
        chromosome.set_fitness(fitness);
        fitness
    }

    /// Per-criterion satisfaction counts.
    ///
    /// Instances unknown to the context count toward the total but earn
    /// nothing.
    pub fn breakdown(
        &self,
        context: &SchedulingContext,
        chromosome: &TimetableChromosome,
    ) -> FitnessBreakdown {
        let layout = context.layout();
        let load = StudentLoad::count(context, chromosome);

        let mut result = FitnessBreakdown {
            instances: chromosome.instance_count(),
            ..Default::default()
        };

        for (&id, &slot) in chromosome.placements() {
            let Some(instance) = context.instance(id) else {
                continue;
            };
            let (tutor_id, time) = layout.decode(slot);

            if chromosome.occupants(slot).len() == 1 {
                result.exclusive += 1;
            }
            if let Some(tutor) = context.tutor(tutor_id) {
                if tutor.teaches(instance.subject) {
                    result.subject_match += 1;
                }
                if !tutor.is_blocked_at(time) {
                    result.available += 1;
                }
            }
            if load.engagements(instance.base_id, time) == 1 {
                result.single_engagement += 1;
            }
            if load.pairings(instance.base_id, tutor_id) == 1 {
                result.diverse_pairing += 1;
            }
            if !instance.has_seen(tutor_id) {
                result.novel += 1;
            }
        }

        result
    }
}

/// Per-student placement counts, by time of day and by tutor.
#[derive(Debug, Default)]
pub struct StudentLoad {
    engagements: HashMap<(BaseId, usize), u32>,
    pairings: HashMap<(BaseId, TutorId), u32>,
}

impl StudentLoad {
    /// Counts every placed instance the context knows about.
    pub fn count(context: &SchedulingContext, chromosome: &TimetableChromosome) -> Self {
        let layout = context.layout();
        let mut load = Self::default();
        for (&id, &slot) in chromosome.placements() {
            if let Some(instance) = context.instance(id) {
                let (tutor, time) = layout.decode(slot);
                *load.engagements.entry((instance.base_id, time)).or_insert(0) += 1;
                *load.pairings.entry((instance.base_id, tutor)).or_insert(0) += 1;
            }
        }
        load
    }

    /// Interviews of `student` held at `time`, across all tutors.
    pub fn engagements(&self, student: BaseId, time: usize) -> u32 {
        self.engagements.get(&(student, time)).copied().unwrap_or(0)
    }

    /// Interviews of `student` held with `tutor`, at any time.
    pub fn pairings(&self, student: BaseId, tutor: TutorId) -> u32 {
        self.pairings.get(&(student, tutor)).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InstanceId, Student, Subject, Tutor};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn single_pair(student_subject: u32) -> SchedulingContext {
        SchedulingContext::new(
            vec![Subject::new(1, "A"), Subject::new(2, "B")],
            vec![Tutor::new(1, "Tutor").with_subject(1, 1.0)],
            vec![Student::new(1, "Student", student_subject)],
            12,
        )
        .unwrap()
    }

    #[test]
    fn test_every_slot_scores_one_for_perfect_match() {
        let ctx = single_pair(1);
        let evaluator = FitnessEvaluator::default();
        for slot in 0..12 {
            let mut ch = TimetableChromosome::empty(ctx.num_slots());
            ch.place(InstanceId(0), slot);
            let f = evaluator.evaluate(&ctx, &ch);
            assert!((f - 1.0).abs() < 1e-10, "slot {slot}: {f}");
        }
    }

    #[test]
    fn test_subject_mismatch_loses_one_point() {
        let ctx = single_pair(2);
        let evaluator = FitnessEvaluator::default();
        let best = (0..12)
            .map(|slot| {
                let mut ch = TimetableChromosome::empty(ctx.num_slots());
                ch.place(InstanceId(0), slot);
                evaluator.evaluate(&ctx, &ch)
            })
            .fold(f64::MIN, f64::max);
        assert!((best - 3.8 / 4.8).abs() < 1e-10);
    }

    #[test]
    fn test_double_booking_and_engagement() {
        // Two students in one slot; one student twice at the same time.
        let ctx = SchedulingContext::new(
            vec![Subject::new(1, "A")],
            vec![
                Tutor::new(1, "T1").with_subject(1, 1.0),
                Tutor::new(2, "T2").with_subject(1, 1.0).with_blocked_time(0),
            ],
            vec![
                Student::new(1, "S1", 1).with_interviews(2).with_previous_tutor(2),
                Student::new(2, "S2", 1),
            ],
            12,
        )
        .unwrap();
        let evaluator = FitnessEvaluator::default();
        let mut ch = TimetableChromosome::empty(ctx.num_slots());
        ch.place(InstanceId(0), 0); // S1 with T1 at t=0
        ch.place(InstanceId(1), 12); // S1 with T2 at t=0 (blocked, seen before)
        ch.place(InstanceId(2), 0); // S2 with T1 at t=0, shares slot

        let b = evaluator.breakdown(&ctx, &ch);
        assert_eq!(b.instances, 3);
        assert_eq!(b.exclusive, 1);
        assert_eq!(b.subject_match, 3);
        assert_eq!(b.available, 2);
        assert_eq!(b.single_engagement, 1);
        assert_eq!(b.diverse_pairing, 3);
        assert_eq!(b.novel, 2);

        let expected = (1.5 + 3.0 + 2.0 + 1.0 + 0.6 + 0.2) / (4.8 * 3.0);
        assert!((evaluator.evaluate(&ctx, &ch) - expected).abs() < 1e-10);

        let s1 = ctx.instance(InstanceId(0)).unwrap().base_id;
        let s2 = ctx.instance(InstanceId(2)).unwrap().base_id;
        let load = StudentLoad::count(&ctx, &ch);
        assert_eq!(load.engagements(s1, 0), 2);
        assert_eq!(load.engagements(s2, 0), 1);
        assert_eq!(load.engagements(s1, 1), 0);
        assert_eq!(load.pairings(s1, TutorId(1)), 1);
        assert_eq!(load.pairings(s1, TutorId(2)), 1);
        assert_eq!(load.pairings(s2, TutorId(2)), 0);
    }

    #[test]
    fn test_student_load_skips_unknown_instances() {
        let ctx = single_pair(1);
        let mut ch = TimetableChromosome::empty(ctx.num_slots());
        ch.place(InstanceId(0), 3);
        ch.place(InstanceId(7), 3);

        let base = ctx.instance(InstanceId(0)).unwrap().base_id;
        let load = StudentLoad::count(&ctx, &ch);
        assert_eq!(load.engagements(base, 3), 1);
        assert_eq!(load.pairings(base, TutorId(1)), 1);
    }

    #[test]
    fn test_fitness_always_in_unit_interval() {
        let ctx = SchedulingContext::new(
            vec![Subject::new(1, "A"), Subject::new(2, "B")],
            vec![
                Tutor::new(1, "T1").with_subject(1, 1.0).with_blocked_time(3),
                Tutor::new(2, "T2").with_subject(2, 0.4),
            ],
            (1..=8u32)
                .map(|i| Student::new(i, format!("S{i}"), 1 + i % 2).with_interviews(2))
                .collect(),
            12,
        )
        .unwrap();
        let evaluator = FitnessEvaluator::default();
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..100 {
            let mut ch =
                TimetableChromosome::random(&ctx.instance_ids(), ctx.num_slots(), &mut rng);
            let f = evaluator.evaluate_in_place(&ctx, &mut ch);
            assert!((0.0..=1.0).contains(&f));
            assert!(ch.is_evaluated());
        }
    }

    #[test]
    fn test_empty_chromosome_scores_zero() {
        let ctx = single_pair(1);
        let ch = TimetableChromosome::empty(ctx.num_slots());
        assert_eq!(FitnessEvaluator::default().evaluate(&ctx, &ch), 0.0);
    }

    #[test]
    fn test_weights() {
        let w = FitnessWeights::default();
        assert!((w.per_instance_max() - 4.8).abs() < 1e-10);
        assert!(w.is_valid());
        let bad = FitnessWeights {
            novelty: -1.0,
            ..Default::default()
        };
        assert!(!bad.is_valid());
    }
}
