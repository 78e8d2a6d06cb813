//! Timetable quality metrics (KPIs).
//!
//! Counts constraint violations in a finished timetable for reporting.
//! Fitness folds these into one number; the KPI keeps them apart.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Double-booked slots | Slots holding more than one interview |
//! | Subject mismatches | Interviews with a tutor who doesn't teach the subject |
//! | Tutor-blocked | Interviews at a time the tutor is unavailable |
//! | Student-blocked | Interviews at a time the student is unavailable |
//! | Simultaneous engagements | Interviews sharing a time with another of the same student |
//! | Repeat pairings | Interviews with a tutor the student also meets elsewhere |
//! | Previous-tutor pairings | Interviews with a tutor the student has seen before |
//! | Utilization | Occupied fraction of each tutor's slots |
//!
//! Student-blocked times are not part of the fitness function; they are
//! reported here only.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::ga::{StudentLoad, TimetableChromosome};
use crate::models::{SchedulingContext, TutorId};

/// Timetable performance indicators.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimetableKpi {
    /// Instances placed.
    pub interviews: usize,
    /// Slots with two or more occupants.
    pub double_booked_slots: usize,
    pub subject_mismatches: usize,
    pub tutor_blocked: usize,
    pub student_blocked: usize,
    pub simultaneous_engagements: usize,
    pub repeat_pairings: usize,
    pub previous_tutor_pairings: usize,
    /// Fraction of each tutor's slots in use (0.0..1.0).
    pub utilization_by_tutor: BTreeMap<TutorId, f64>,
    /// Mean of `utilization_by_tutor`.
    pub avg_utilization: f64,
}

impl TimetableKpi {
    /// Computes KPIs for a chromosome.
    pub fn calculate(context: &SchedulingContext, chromosome: &TimetableChromosome) -> Self {
        let layout = context.layout();
        let mut kpi = Self {
            interviews: chromosome.instance_count(),
            ..Default::default()
        };

        kpi.double_booked_slots = chromosome
            .slots()
            .iter()
            .filter(|occupants| occupants.len() > 1)
            .count();

        let load = StudentLoad::count(context, chromosome);

        for (&id, &slot) in chromosome.placements() {
            let Some(instance) = context.instance(id) else {
                continue;
            };
            let (tutor_id, time) = layout.decode(slot);

            if let Some(tutor) = context.tutor(tutor_id) {
                if !tutor.teaches(instance.subject) {
                    kpi.subject_mismatches += 1;
                }
                if tutor.is_blocked_at(time) {
                    kpi.tutor_blocked += 1;
                }
            }
            if instance.is_blocked_at(time) {
                kpi.student_blocked += 1;
            }
            if load.engagements(instance.base_id, time) > 1 {
                kpi.simultaneous_engagements += 1;
            }
            if load.pairings(instance.base_id, tutor_id) > 1 {
                kpi.repeat_pairings += 1;
            }
            if instance.has_seen(tutor_id) {
                kpi.previous_tutor_pairings += 1;
            }
        }

        let per_tutor = layout.slots_per_day;
        for tutor in context.tutors() {
            let start = layout.encode(tutor.id, 0);
            let used = chromosome
                .slots()
                .get(start..start + per_tutor)
                .map_or(0, |row| row.iter().filter(|o| !o.is_empty()).count());
            let utilization = if per_tutor == 0 {
                0.0
            } else {
                used as f64 / per_tutor as f64
            };
            kpi.utilization_by_tutor.insert(tutor.id, utilization);
        }
        kpi.avg_utilization = if kpi.utilization_by_tutor.is_empty() {
            0.0
        } else {
            kpi.utilization_by_tutor.values().sum::<f64>() / kpi.utilization_by_tutor.len() as f64
        };

        kpi
    }

    /// Whether the timetable can be used as is: no slot is double-booked, no
    /// student is in two places at once, every interview matches its tutor's
    /// subjects and availability.
    pub fn is_usable(&self) -> bool {
        self.double_booked_slots == 0
            && self.simultaneous_engagements == 0
            && self.subject_mismatches == 0
            && self.tutor_blocked == 0
    }
}
