//! Scheduling context.
//!
//! Owns every domain object of one timetabling problem and resolves the
//! integer handles stored in chromosomes. Constructed once (after
//! validation) and shared read-only with the engine and its operators.

use serde::Serialize;

use super::{
    BaseId, InstanceId, SlotLayout, Student, StudentInstance, Subject, SubjectId, Tutor, TutorId,
};
use crate::error::{Error, Result};
use crate::validation::{validate_input, ValidationError, ValidationErrorKind};

/// The complete, validated input of a timetabling problem.
#[derive(Debug, Clone, Serialize)]
pub struct SchedulingContext {
    layout: SlotLayout,
    subjects: Vec<Subject>,
    /// Sorted by id, so `tutors[ordinal - 1]` is the tutor with that ordinal.
    tutors: Vec<Tutor>,
    students: Vec<Student>,
    /// Sorted by id; ids are `0..len`.
    instances: Vec<StudentInstance>,
}

impl SchedulingContext {
    /// Validates the input and builds the context.
    ///
    /// Students are expanded into instances in input order, with instance
    /// ids allocated from 0.
    pub fn new(
        subjects: Vec<Subject>,
        mut tutors: Vec<Tutor>,
        students: Vec<Student>,
        slots_per_day: usize,
    ) -> Result<Self> {
        validate_input(&subjects, &tutors, &students, slots_per_day).map_err(Error::Validation)?;

        tutors.sort_by_key(|t| t.id);
        let layout = SlotLayout::new(tutors.len(), slots_per_day);
        for tutor in &mut tutors {
            tutor.refresh_blocked_slots(&layout);
        }

        let mut next_id = 0;
        let instances = students
            .iter()
            .flat_map(|s| s.expand(&mut next_id))
            .collect();

        Ok(Self {
            layout,
            subjects,
            tutors,
            students,
            instances,
        })
    }

    /// Slot grid dimensions.
    #[inline]
    pub fn layout(&self) -> &SlotLayout {
        &self.layout
    }

    /// Total number of slots.
    #[inline]
    pub fn num_slots(&self) -> usize {
        self.layout.num_slots()
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn subject(&self, id: SubjectId) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == id)
    }

    /// Tutors in ordinal order.
    pub fn tutors(&self) -> &[Tutor] {
        &self.tutors
    }

    pub fn tutor(&self, id: TutorId) -> Option<&Tutor> {
        let idx = (id.0 as usize).checked_sub(1)?;
        self.tutors.get(idx)
    }

    /// Tutor owning a slot.
    pub fn tutor_at(&self, slot: usize) -> Option<&Tutor> {
        if !self.layout.contains(slot) {
            return None;
        }
        self.tutor(self.layout.tutor_of(slot))
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    /// All student instances, sorted by id.
    pub fn instances(&self) -> &[StudentInstance] {
        &self.instances
    }

    pub fn instance(&self, id: InstanceId) -> Option<&StudentInstance> {
        self.instances
            .get(id.0 as usize)
            .filter(|instance| instance.id == id)
    }

    /// Instance ids in ascending order.
    pub fn instance_ids(&self) -> Vec<InstanceId> {
        self.instances.iter().map(|i| i.id).collect()
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Instances generated for one logical student, in id order.
    pub fn instances_of(&self, base_id: BaseId) -> impl Iterator<Item = &StudentInstance> {
        self.instances.iter().filter(move |i| i.base_id == base_id)
    }

    /// Replaces a tutor's blocked times, recomputing the derived slot set.
    pub fn set_tutor_blocked_times(
        &mut self,
        id: TutorId,
        times: impl IntoIterator<Item = usize>,
    ) -> Result<()> {
        let times: Vec<usize> = times.into_iter().collect();
        let slots_per_day = self.layout.slots_per_day;
        if let Some(&bad) = times.iter().find(|&&t| t >= slots_per_day) {
            return Err(Error::Validation(vec![ValidationError::new(
                ValidationErrorKind::TimeOutOfRange,
                format!("Tutor {id} blocked time {bad} outside [0, {slots_per_day})"),
            )]));
        }
        let layout = self.layout;
        let idx = (id.0 as usize).checked_sub(1);
        let tutor = idx
            .and_then(|i| self.tutors.get_mut(i))
            .ok_or_else(|| {
                Error::Validation(vec![ValidationError::new(
                    ValidationErrorKind::InvalidTutorReference,
                    format!("Unknown tutor {id}"),
                )])
            })?;
        tutor.set_blocked_times(times, &layout);
        Ok(())
    }
}
