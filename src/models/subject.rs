//! Subject model.

use serde::{Deserialize, Serialize};

use super::SubjectId;

/// A subject students are interviewed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    /// Unique subject identifier.
    pub id: SubjectId,
    /// Human-readable name.
    pub name: String,
}

impl Subject {
    /// Creates a subject.
    pub fn new(id: impl Into<SubjectId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}
