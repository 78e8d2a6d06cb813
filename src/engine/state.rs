//! Engine lifecycle states and the events published while running.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ga::TimetableChromosome;

/// Lifecycle of an [`EvolutionEngine`](super::EvolutionEngine).
///
/// ```text
/// NotStarted ──start──▶ Running ──criteria──▶ CriteriaStopped
///                          │    ──stop──────▶ UserStopped
///                          │    ──invariant─▶ Aborted
/// ```
///
/// Every stopped state ends the run; `start_solving` begins a new one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    #[default]
    NotStarted,
    Running,
    /// A stop criterion fired.
    CriteriaStopped,
    /// `stop_solving` was called.
    UserStopped,
    /// A worker detected a broken chromosome invariant.
    Aborted,
}

impl EngineState {
    #[inline]
    pub fn is_running(self) -> bool {
        self == EngineState::Running
    }

    /// Whether a run has ended, for any reason.
    #[inline]
    pub fn is_stopped(self) -> bool {
        matches!(
            self,
            EngineState::CriteriaStopped | EngineState::UserStopped | EngineState::Aborted
        )
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineState::NotStarted => "not started",
            EngineState::Running => "running",
            EngineState::CriteriaStopped => "stopped by criteria",
            EngineState::UserStopped => "stopped by user",
            EngineState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Notification published on the engine's event channel.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// The population's best fitness improved.
    NewBest {
        generation: u64,
        fitness: f64,
        chromosome: TimetableChromosome,
    },
    /// The engine entered a new state.
    StateChanged(EngineState),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_predicates() {
        assert!(EngineState::Running.is_running());
        assert!(!EngineState::Running.is_stopped());
        assert!(!EngineState::NotStarted.is_stopped());
        for s in [
            EngineState::CriteriaStopped,
            EngineState::UserStopped,
            EngineState::Aborted,
        ] {
            assert!(s.is_stopped());
            assert!(!s.is_running());
        }
    }

    #[test]
    fn test_state_serde() {
        let json = serde_json::to_string(&EngineState::CriteriaStopped).unwrap();
        assert_eq!(json, "\"criteria_stopped\"");
        assert_eq!(EngineState::default(), EngineState::NotStarted);
        assert_eq!(EngineState::UserStopped.to_string(), "stopped by user");
    }
}
