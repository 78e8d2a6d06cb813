//! Slot-index arithmetic.
//!
//! A slot is one (tutor, time-of-day) cell. Global index =
//! `(tutor_ordinal - 1) * slots_per_day + time`. Decoding relies on tutor
//! ids being dense ordinals starting at 1; validation enforces that before
//! a layout is ever used.

use serde::{Deserialize, Serialize};

use super::TutorId;

/// Interview slots per tutor per day in the reference deployment.
pub const DEFAULT_SLOTS_PER_DAY: usize = 12;

/// Dimensions of the slot grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotLayout {
    /// Number of tutors.
    pub num_tutors: usize,
    /// Slots per tutor per day.
    pub slots_per_day: usize,
}

impl SlotLayout {
    /// Creates a layout.
    pub fn new(num_tutors: usize, slots_per_day: usize) -> Self {
        Self {
            num_tutors,
            slots_per_day,
        }
    }

    /// Total number of slots (`num_tutors * slots_per_day`).
    #[inline]
    pub fn num_slots(&self) -> usize {
        self.num_tutors * self.slots_per_day
    }

    /// Tutor owning a slot.
    #[inline]
    pub fn tutor_of(&self, index: usize) -> TutorId {
        TutorId((index / self.slots_per_day + 1) as u32)
    }

    /// Time of day of a slot.
    #[inline]
    pub fn time_of(&self, index: usize) -> usize {
        index % self.slots_per_day
    }

    /// Splits a slot index into (tutor, time).
    #[inline]
    pub fn decode(&self, index: usize) -> (TutorId, usize) {
        (self.tutor_of(index), self.time_of(index))
    }

    /// Global index of (tutor, time).
    #[inline]
    pub fn encode(&self, tutor: TutorId, time: usize) -> usize {
        (tutor.0 as usize).saturating_sub(1) * self.slots_per_day + time
    }

    /// Whether an index addresses a slot in this layout.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        index < self.num_slots()
    }
}
