//! Input validation for timetabling problems.
//!
//! Checks structural integrity of subjects, tutors and students before a
//! scheduling context is built. Detects:
//! - Empty subject, tutor or student sets
//! - Duplicate IDs
//! - Tutor IDs that are not exactly `1..=n` (slot decoding depends on it)
//! - References to unknown subjects or tutors
//! - Blocked times outside the day
//! - Proficiencies outside `[0, 1]`
//! - Students requesting zero interviews

use crate::models::{Student, Subject, Tutor};
use std::collections::HashSet;
use std::fmt;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// No subjects configured.
    NoSubjects,
    /// No tutors configured.
    NoTutors,
    /// No students configured.
    NoStudents,
    /// The day has no slots.
    NoSlots,
    /// Two entities share the same ID.
    DuplicateId,
    /// Tutor IDs are not dense ordinals starting at 1.
    NonContiguousTutorIds,
    /// A tutor or student references a subject that doesn't exist.
    InvalidSubjectReference,
    /// A student references a previous tutor that doesn't exist.
    InvalidTutorReference,
    /// A blocked time lies outside `[0, slots_per_day)`.
    TimeOutOfRange,
    /// A proficiency lies outside `[0, 1]`.
    ProficiencyOutOfRange,
    /// A student requests no interviews.
    NoInterviews,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates the input data for a timetabling problem.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(
    subjects: &[Subject],
    tutors: &[Tutor],
    students: &[Student],
    slots_per_day: usize,
) -> ValidationResult {
    let mut errors = Vec::new();

    if slots_per_day == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoSlots,
            "slots_per_day must be at least 1",
        ));
    }
    if subjects.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoSubjects,
            "No subjects configured",
        ));
    }
    if tutors.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoTutors,
            "No tutors configured",
        ));
    }
    if students.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoStudents,
            "No students configured",
        ));
    }

    let mut subject_ids = HashSet::new();
    for s in subjects {
        if !subject_ids.insert(s.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate subject ID: {}", s.id),
            ));
        }
    }

    let mut tutor_ids = HashSet::new();
    for t in tutors {
        if !tutor_ids.insert(t.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate tutor ID: {}", t.id),
            ));
        }

        for (subject, &level) in &t.proficiencies {
            if !subject_ids.contains(subject) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidSubjectReference,
                    format!("Tutor '{}' references unknown subject {}", t.name, subject),
                ));
            }
            if !(0.0..=1.0).contains(&level) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::ProficiencyOutOfRange,
                    format!(
                        "Tutor '{}' has proficiency {} in subject {} (expected 0..=1)",
                        t.name, level, subject
                    ),
                ));
            }
        }

        check_times(&t.blocked_times, slots_per_day, &mut errors, || {
            format!("Tutor '{}'", t.name)
        });
    }

    // Slot decoding assumes ids 1..=n with no gaps.
    if !tutors.is_empty() && tutor_ids.len() == tutors.len() {
        let n = tutors.len() as u32;
        if tutors.iter().any(|t| t.id.0 == 0 || t.id.0 > n) {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonContiguousTutorIds,
                format!("Tutor IDs must be exactly 1..={n}"),
            ));
        }
    }

    let mut base_ids = HashSet::new();
    for s in students {
        if !base_ids.insert(s.base_id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate student ID: {}", s.base_id),
            ));
        }
        if !subject_ids.contains(&s.subject) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidSubjectReference,
                format!("Student '{}' references unknown subject {}", s.name, s.subject),
            ));
        }
        for prev in &s.previous_tutors {
            if !tutor_ids.contains(prev) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidTutorReference,
                    format!("Student '{}' references unknown tutor {}", s.name, prev),
                ));
            }
        }
        if s.interviews == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NoInterviews,
                format!("Student '{}' requests no interviews", s.name),
            ));
        }
        check_times(&s.blocked_times, slots_per_day, &mut errors, || {
            format!("Student '{}'", s.name)
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_times<'a>(
    times: impl IntoIterator<Item = &'a usize>,
    slots_per_day: usize,
    errors: &mut Vec<ValidationError>,
    owner: impl Fn() -> String,
) {
    for &time in times {
        if time >= slots_per_day {
            errors.push(ValidationError::new(
                ValidationErrorKind::TimeOutOfRange,
                format!(
                    "{} blocked time {} outside [0, {})",
                    owner(),
                    time,
                    slots_per_day
                ),
            ));
        }
    }
}
