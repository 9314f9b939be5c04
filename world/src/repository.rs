//! Index allocation and storage for one kind of mob.

use std::collections::BTreeSet;

use crate::error::{WorldError, WorldResult};
use crate::mob::{Mob, MobData, MobKind, MAX_MOB_INDEX};
use crate::position::Position;

/// Mobs of one kind, stored by index. The lowest free index is reused first;
/// every insert gets a fresh spawn serial.
#[derive(Debug)]
pub struct MobRepository {
    kind: MobKind,
    slots: Vec<Option<Mob>>,
    free: BTreeSet<u16>,
    spawns: u64,
}

impl MobRepository {
    /// A repository with indices `1..=capacity`. `capacity` is clamped to
    /// [`MAX_MOB_INDEX`].
    #[must_use]
    pub fn new(kind: MobKind, capacity: u16) -> Self {
        let capacity = capacity.min(MAX_MOB_INDEX);
        let mut slots = Vec::new();
        slots.resize_with(usize::from(capacity) + 1, || None);
        Self {
            kind,
            slots,
            free: (1..=capacity).collect(),
            spawns: 0,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> MobKind {
        self.kind
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len() - 1
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.capacity() - self.free.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Creates a mob in the lowest free slot. `data` must be of this
    /// repository's kind.
    pub(crate) fn insert(&mut self, position: Position, data: MobData) -> WorldResult<&mut Mob> {
        debug_assert_eq!(data.kind(), self.kind);
        let index = self.free.pop_first().ok_or(WorldError::RepositoryFull {
            kind: self.kind,
            capacity: self.capacity(),
        })?;
        self.spawns += 1;
        let mob = Mob::new(index, position, data).with_spawn(self.spawns);
        Ok(self.slots[usize::from(index)].insert(mob))
    }

    pub(crate) fn remove(&mut self, index: u16) -> Option<Mob> {
        let mob = self.slots.get_mut(usize::from(index))?.take()?;
        self.free.insert(index);
        Some(mob)
    }

    #[must_use]
    pub fn get(&self, index: u16) -> Option<&Mob> {
        self.slots.get(usize::from(index))?.as_ref()
    }

    pub fn get_mut(&mut self, index: u16) -> Option<&mut Mob> {
        self.slots.get_mut(usize::from(index))?.as_mut()
    }

    /// Mobs in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Mob> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Mob> {
        self.slots.iter_mut().filter_map(Option::as_mut)
    }
}
