//! Previously saved solutions.
//!
//! A seed solution maps slot indices to the base ids of the students placed
//! there. It carries no instance ids, so it stays meaningful after the
//! student list is re-expanded; it is only used to bias initialization.
//!
//! Stored as JSON: `{"0": [3], "13": [1, 4]}`.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::ga::TimetableChromosome;
use crate::models::{BaseId, InstanceId, SchedulingContext};

/// Slot index → base ids placed in that slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeedSolution {
    slots: BTreeMap<usize, Vec<BaseId>>,
}

impl SeedSolution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a student placed in a slot.
    pub fn insert(&mut self, slot: usize, base_id: BaseId) {
        self.slots.entry(slot).or_default().push(base_id);
    }

    pub fn slots(&self) -> &BTreeMap<usize, Vec<BaseId>> {
        &self.slots
    }

    /// Number of recorded placements.
    pub fn len(&self) -> usize {
        self.slots.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Captures a chromosome's placements.
    pub fn from_chromosome(context: &SchedulingContext, chromosome: &TimetableChromosome) -> Self {
        let mut seed = Self::new();
        for (&id, &slot) in chromosome.placements() {
            if let Some(instance) = context.instance(id) {
                seed.insert(slot, instance.base_id);
            }
        }
        seed
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reads a seed solution from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Builds a chromosome from the recorded placements.
    ///
    /// Each base id entry claims that student's next unplaced instance (in
    /// id order, slots visited in ascending order). Entries for unknown
    /// slots or students, or beyond a student's instance count, are
    /// ignored; instances left over are placed randomly.
    pub fn apply<R: Rng>(&self, context: &SchedulingContext, rng: &mut R) -> TimetableChromosome {
        let num_slots = context.num_slots();
        let mut chromosome = TimetableChromosome::empty(num_slots);

        let mut pending: HashMap<BaseId, VecDeque<InstanceId>> = HashMap::new();
        for instance in context.instances() {
            pending
                .entry(instance.base_id)
                .or_default()
                .push_back(instance.id);
        }

        let mut ignored = 0usize;
        for (&slot, bases) in &self.slots {
            if !context.layout().contains(slot) {
                ignored += bases.len();
                continue;
            }
            for base in bases {
                match pending.get_mut(base).and_then(VecDeque::pop_front) {
                    Some(id) => chromosome.place(id, slot),
                    None => ignored += 1,
                }
            }
        }
        if ignored > 0 {
            warn!(ignored, "seed solution entries did not match the current input");
        }

        if num_slots > 0 {
            for instance in context.instances() {
                if chromosome.slot_of(instance.id).is_none() {
                    chromosome.place(instance.id, rng.random_range(0..num_slots));
                }
            }
        }

        chromosome
    }
}
