//! Slot-table chromosome for interview timetabling.
//!
//! # Encoding
//!
//! The chromosome keeps two views of one assignment:
//! - **Slot table**: one multiset of instance ids per global slot. More than
//!   one occupant is a double-booking; it is penalised by fitness, not
//!   rejected structurally.
//! - **Placements**: instance id → slot index. A `BTreeMap`, so walking it
//!   always visits instances in ascending id order.
//!
//! Every instance appears in exactly one slot and the two views agree after
//! every public operation, including a rolled-back mutation.

use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

use rand::Rng;

use crate::error::{Error, Result};
use crate::models::InstanceId;

/// Fitness of a chromosome that has not been evaluated since its last change.
pub const UNEVALUATED: f64 = f64::NEG_INFINITY;

/// A complete candidate assignment of student instances to slots.
///
/// Higher fitness = better timetable (maximization convention).
#[derive(Debug, Clone, PartialEq)]
pub struct TimetableChromosome {
    slots: Vec<Vec<InstanceId>>,
    placements: BTreeMap<InstanceId, usize>,
    fitness: f64,
}

impl TimetableChromosome {
    /// Creates a chromosome with `num_slots` empty slots and no placements.
    pub fn empty(num_slots: usize) -> Self {
        Self {
            slots: vec![Vec::new(); num_slots],
            placements: BTreeMap::new(),
            fitness: UNEVALUATED,
        }
    }

    /// Places every instance in a uniformly random slot in `[0, num_slots)`.
    pub fn random<R: Rng>(instances: &[InstanceId], num_slots: usize, rng: &mut R) -> Self {
        let mut chromosome = Self::empty(num_slots);
        if num_slots == 0 {
            return chromosome;
        }
        for &id in instances {
            chromosome.place(id, rng.random_range(0..num_slots));
        }
        chromosome
    }

    /// Copies this chromosome, either fully or as an empty skeleton with the
    /// same slot count (the starting point of a crossover child).
    pub fn clone_with(&self, contents: bool) -> Self {
        if contents {
            self.clone()
        } else {
            Self::empty(self.slots.len())
        }
    }

    /// Places (or moves) an instance into a slot.
    ///
    /// # Panics
    /// Panics if `slot >= num_slots()`.
    pub fn place(&mut self, id: InstanceId, slot: usize) {
        assert!(slot < self.slots.len(), "slot {slot} out of range");
        if let Some(old) = self.placements.insert(id, slot) {
            Self::remove_from(&mut self.slots[old], id);
        }
        self.slots[slot].push(id);
        self.fitness = UNEVALUATED;
    }

    /// Removes an instance, returning the slot it occupied.
    pub fn remove(&mut self, id: InstanceId) -> Option<usize> {
        let slot = self.placements.remove(&id)?;
        Self::remove_from(&mut self.slots[slot], id);
        self.fitness = UNEVALUATED;
        Some(slot)
    }

    /// Slot currently holding an instance.
    #[inline]
    pub fn slot_of(&self, id: InstanceId) -> Option<usize> {
        self.placements.get(&id).copied()
    }

    /// Instances placed in a slot (empty for out-of-range indices).
    pub fn occupants(&self, slot: usize) -> &[InstanceId] {
        self.slots.get(slot).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The full slot → instances table.
    pub fn slots(&self) -> &[Vec<InstanceId>] {
        &self.slots
    }

    /// The reverse instance → slot map.
    pub fn placements(&self) -> &BTreeMap<InstanceId, usize> {
        &self.placements
    }

    /// Instance ids in ascending order.
    pub fn instance_ids(&self) -> impl Iterator<Item = InstanceId> + '_ {
        self.placements.keys().copied()
    }

    /// The `index`-th instance in ascending id order.
    pub fn nth_instance(&self, index: usize) -> Option<InstanceId> {
        self.placements.keys().nth(index).copied()
    }

    #[inline]
    pub fn instance_count(&self) -> usize {
        self.placements.len()
    }

    #[inline]
    pub fn num_slots(&self) -> usize {
        self.slots.len()
    }

    /// Cached fitness, or [`UNEVALUATED`].
    #[inline]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    #[inline]
    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    /// Whether the cached fitness reflects the current placements.
    #[inline]
    pub fn is_evaluated(&self) -> bool {
        self.fitness != UNEVALUATED
    }

    /// Checks that both views agree and every instance is placed exactly once.
    pub fn check_invariants(&self) -> Result<()> {
        let occupied: usize = self.slots.iter().map(Vec::len).sum();
        if occupied != self.placements.len() {
            return Err(Error::invariant(format!(
                "{} slot entries for {} placed instances",
                occupied,
                self.placements.len()
            )));
        }
        for (&id, &slot) in &self.placements {
            let count = self
                .slots
                .get(slot)
                .map(|occupants| occupants.iter().filter(|&&o| o == id).count())
                .unwrap_or(0);
            if count != 1 {
                return Err(Error::invariant(format!(
                    "instance {id} mapped to slot {slot} but found there {count} times"
                )));
            }
        }
        Ok(())
    }

    /// Checks the invariants and that exactly `expected` instances are placed.
    pub fn check_instances(&self, expected: &[InstanceId]) -> Result<()> {
        self.check_invariants()?;
        if self.placements.len() != expected.len()
            || expected.iter().any(|id| !self.placements.contains_key(id))
        {
            return Err(Error::invariant(format!(
                "chromosome places {} instances, expected {}",
                self.placements.len(),
                expected.len()
            )));
        }
        Ok(())
    }

    /// Starts a mutation transaction.
    ///
    /// Only the placements are backed up; the slot table is rebuilt from them
    /// on rollback.
    pub fn begin_mutation(&mut self) -> MutationTransaction<'_> {
        MutationTransaction {
            backup: self.placements.clone(),
            fitness: self.fitness,
            chromosome: self,
        }
    }

    fn rebuild_slots(&mut self) {
        for occupants in &mut self.slots {
            occupants.clear();
        }
        for (&id, &slot) in &self.placements {
            self.slots[slot].push(id);
        }
    }

    fn remove_from(occupants: &mut Vec<InstanceId>, id: InstanceId) {
        if let Some(pos) = occupants.iter().position(|&o| o == id) {
            occupants.swap_remove(pos);
        }
    }
}

/// A mutation in progress.
///
/// Dereferences to the live chromosome. [`commit`](Self::commit) (or simply
/// dropping the transaction) keeps the changes; [`rollback`](Self::rollback)
/// restores the placements and fitness from before
/// [`TimetableChromosome::begin_mutation`].
#[derive(Debug)]
pub struct MutationTransaction<'a> {
    chromosome: &'a mut TimetableChromosome,
    backup: BTreeMap<InstanceId, usize>,
    fitness: f64,
}

impl MutationTransaction<'_> {
    /// Fitness before the mutation started.
    pub fn previous_fitness(&self) -> f64 {
        self.fitness
    }

    /// Keeps the mutated state and discards the backup.
    pub fn commit(self) {}

    /// Discards every placement made during the transaction.
    pub fn rollback(self) {
        let MutationTransaction {
            chromosome,
            backup,
            fitness,
        } = self;
        chromosome.placements = backup;
        chromosome.fitness = fitness;
        chromosome.rebuild_slots();
    }
}

impl Deref for MutationTransaction<'_> {
    type Target = TimetableChromosome;

    fn deref(&self) -> &TimetableChromosome {
        self.chromosome
    }
}

impl DerefMut for MutationTransaction<'_> {
    fn deref_mut(&mut self) -> &mut TimetableChromosome {
        self.chromosome
    }
}
