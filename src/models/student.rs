//! Student model.
//!
//! A [`Student`] is what the configuration describes: one person asking for
//! some number of interviews in a subject. The engine schedules
//! [`StudentInstance`]s, one per requested interview, all sharing the
//! student's [`BaseId`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{BaseId, InstanceId, SubjectId, TutorId};

/// A logical student requesting one or more interviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Identifier shared by every generated instance.
    pub base_id: BaseId,
    /// Human-readable name.
    pub name: String,
    /// Required subject.
    pub subject: SubjectId,
    /// Number of interviews requested.
    pub interviews: u32,
    /// Tutors seen previously; repeat pairings are discouraged.
    pub previous_tutors: Vec<TutorId>,
    /// Blocked times of day.
    pub blocked_times: BTreeSet<usize>,
}

/// One interview to be placed in a slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentInstance {
    /// Unique instance identifier.
    pub id: InstanceId,
    /// Logical student this instance belongs to.
    pub base_id: BaseId,
    /// Student name.
    pub name: String,
    /// Required subject.
    pub subject: SubjectId,
    /// Tutors seen previously.
    pub previous_tutors: Vec<TutorId>,
    /// Blocked times of day.
    pub blocked_times: BTreeSet<usize>,
}

impl Student {
    /// Creates a student requesting a single interview.
    pub fn new(
        base_id: impl Into<BaseId>,
        name: impl Into<String>,
        subject: impl Into<SubjectId>,
    ) -> Self {
        Self {
            base_id: base_id.into(),
            name: name.into(),
            subject: subject.into(),
            interviews: 1,
            previous_tutors: Vec::new(),
            blocked_times: BTreeSet::new(),
        }
    }

    /// Sets the number of requested interviews.
    pub fn with_interviews(mut self, interviews: u32) -> Self {
        self.interviews = interviews;
        self
    }

    /// Records a previously seen tutor.
    pub fn with_previous_tutor(mut self, tutor: impl Into<TutorId>) -> Self {
        self.previous_tutors.push(tutor.into());
        self
    }

    /// Blocks a time of day.
    pub fn with_blocked_time(mut self, time: usize) -> Self {
        self.blocked_times.insert(time);
        self
    }

    /// Expands into one instance per requested interview.
    ///
    /// Instance ids are allocated from `next_id`, which is advanced past the
    /// ids handed out.
    pub fn expand(&self, next_id: &mut u32) -> Vec<StudentInstance> {
        (0..self.interviews)
            .map(|_| {
                let id = InstanceId(*next_id);
                *next_id += 1;
                StudentInstance {
                    id,
                    base_id: self.base_id,
                    name: self.name.clone(),
                    subject: self.subject,
                    previous_tutors: self.previous_tutors.clone(),
                    blocked_times: self.blocked_times.clone(),
                }
            })
            .collect()
    }
}

impl StudentInstance {
    /// Whether the student has met this tutor before.
    pub fn has_seen(&self, tutor: TutorId) -> bool {
        self.previous_tutors.contains(&tutor)
    }

    /// Whether the student is blocked at a time of day.
    pub fn is_blocked_at(&self, time: usize) -> bool {
        self.blocked_times.contains(&time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_shares_base_id() {
        let s = Student::new(7, "Grace", 1)
            .with_interviews(3)
            .with_previous_tutor(2)
            .with_blocked_time(0);
        let mut next = 10;
        let instances = s.expand(&mut next);

        assert_eq!(instances.len(), 3);
        assert_eq!(next, 13);
        assert_eq!(
            instances.iter().map(|i| i.id).collect::<Vec<_>>(),
            vec![InstanceId(10), InstanceId(11), InstanceId(12)]
        );
        assert!(instances.iter().all(|i| i.base_id == BaseId(7)));
        assert!(instances[0].has_seen(TutorId(2)));
        assert!(instances[2].is_blocked_at(0));
    }

    #[test]
    fn test_expand_zero_interviews() {
        let s = Student::new(1, "Nobody", 1).with_interviews(0);
        let mut next = 0;
        assert!(s.expand(&mut next).is_empty());
        assert_eq!(next, 0);
    }
}
