//! Integer handles for domain entities.
//!
//! Chromosomes and operators never hold references to domain objects; they
//! store these handles and resolve them through a
//! [`SchedulingContext`](super::SchedulingContext).

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// Raw integer value.
            #[inline]
            pub fn get(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }
    };
}

id_type!(
    /// Subject identifier.
    SubjectId
);

id_type!(
    /// Tutor identifier. Tutor ids double as 1-based ordinals in slot arithmetic.
    TutorId
);

id_type!(
    /// Identifier shared by every instance generated for one logical student.
    BaseId
);

id_type!(
    /// Identifier of a single student instance (one requested interview).
    InstanceId
);
