//! Tutor model.
//!
//! Tutors conduct interviews. Each tutor teaches a set of subjects with a
//! proficiency level and may be unavailable at some times of day.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{SlotLayout, SubjectId, TutorId};

/// A tutor that can be assigned interview slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tutor {
    /// Tutor identifier (1-based, contiguous across the tutor set).
    pub id: TutorId,
    /// Human-readable name.
    pub name: String,
    /// Subject proficiency (0.0 to 1.0).
    pub proficiencies: BTreeMap<SubjectId, f64>,
    /// Blocked times of day, in `[0, slots_per_day)`.
    pub blocked_times: BTreeSet<usize>,
    /// Global slot indices derived from `blocked_times`.
    #[serde(skip)]
    blocked_slots: BTreeSet<usize>,
}

impl Tutor {
    /// Creates a tutor with no subjects and no blocked times.
    pub fn new(id: impl Into<TutorId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            proficiencies: BTreeMap::new(),
            blocked_times: BTreeSet::new(),
            blocked_slots: BTreeSet::new(),
        }
    }

    /// Adds (or replaces) a subject proficiency.
    pub fn with_subject(mut self, subject: impl Into<SubjectId>, proficiency: f64) -> Self {
        self.proficiencies.insert(subject.into(), proficiency);
        self
    }

    /// Blocks a time of day.
    pub fn with_blocked_time(mut self, time: usize) -> Self {
        self.blocked_times.insert(time);
        self
    }

    /// Proficiency in a subject (0.0 if not taught).
    pub fn proficiency(&self, subject: SubjectId) -> f64 {
        self.proficiencies.get(&subject).copied().unwrap_or(0.0)
    }

    /// Whether this tutor teaches the subject at all.
    ///
    /// Any nonzero proficiency counts.
    pub fn teaches(&self, subject: SubjectId) -> bool {
        self.proficiency(subject) > 0.0
    }

    /// Whether the tutor is blocked at a time of day.
    pub fn is_blocked_at(&self, time: usize) -> bool {
        self.blocked_times.contains(&time)
    }

    /// Blocked global slot indices.
    ///
    /// Only meaningful after [`refresh_blocked_slots`](Self::refresh_blocked_slots)
    /// has run against the current layout.
    pub fn blocked_slots(&self) -> &BTreeSet<usize> {
        &self.blocked_slots
    }

    /// Replaces the blocked times and recomputes the derived slot set.
    pub fn set_blocked_times(
        &mut self,
        times: impl IntoIterator<Item = usize>,
        layout: &SlotLayout,
    ) {
        self.blocked_times = times.into_iter().collect();
        self.refresh_blocked_slots(layout);
    }

    /// Recomputes `blockedTime + (ordinal - 1) * slots_per_day` for every blocked time.
    pub fn refresh_blocked_slots(&mut self, layout: &SlotLayout) {
        self.blocked_slots = self
            .blocked_times
            .iter()
            .map(|&time| layout.encode(self.id, time))
            .collect();
    }
}
