//! Interview timetabling domain models.
//!
//! Subjects, tutors and students as read from the configuration, the
//! student instances the engine actually places, and the slot grid
//! arithmetic that maps a global slot index to (tutor, time-of-day).
//!
//! # Domain Mappings
//!
//! | u-interview | Meaning |
//! |-------------|---------|
//! | Tutor | Interviewer; one row of the slot grid |
//! | Student | Person requesting N interviews |
//! | StudentInstance | One requested interview |
//! | Slot | (tutor, time-of-day) cell |

mod context;
mod ids;
mod slot;
mod student;
mod subject;
mod tutor;

pub use context::SchedulingContext;
pub use ids::{BaseId, InstanceId, SubjectId, TutorId};
pub use slot::{SlotLayout, DEFAULT_SLOTS_PER_DAY};
pub use student::{Student, StudentInstance};
pub use subject::Subject;
pub use tutor::Tutor;
