//! Per-observer ordered record of tracked mobs.

use std::collections::HashMap;

use crate::mob::{Mob, MobId};

/// Hard cap on a local view set; the client counts entries in 8 bits.
pub const MAX_LOCAL_MOBS: usize = 255;

/// Mobs the client currently tracks, in the order it tracks them.
///
/// The order is the wire order of the "existing entries" section, so it is
/// preserved across removals. Each entry keeps the spawn serial it was
/// admitted with, so a mob that took over a freed index is not mistaken
/// for the one the client is drawing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalViewSet {
    order: Vec<MobId>,
    members: HashMap<MobId, u64>,
}

impl LocalViewSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.order.len() >= MAX_LOCAL_MOBS
    }

    #[must_use]
    pub fn contains(&self, id: MobId) -> bool {
        self.members.contains_key(&id)
    }

    /// The spawn serial `id` was admitted with.
    #[must_use]
    pub fn spawn_of(&self, id: MobId) -> Option<u64> {
        self.members.get(&id).copied()
    }

    /// Whether this exact incarnation of `mob` is tracked.
    #[must_use]
    pub fn tracks(&self, mob: &Mob) -> bool {
        self.spawn_of(mob.id()) == Some(mob.spawn())
    }

    /// Appends `id`. Returns `false` if it is already tracked or the set is full.
    pub fn insert(&mut self, id: MobId, spawn: u64) -> bool {
        if self.is_full() || self.contains(id) {
            return false;
        }
        self.members.insert(id, spawn);
        self.order.push(id);
        true
    }

    /// Removes `id`, keeping the order of the rest.
    pub fn remove(&mut self, id: MobId) -> bool {
        if self.members.remove(&id).is_none() {
            return false;
        }
        self.order.retain(|&tracked| tracked != id);
        true
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = MobId> + '_ {
        self.order.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mob::MobKind;

    fn npc(index: u16) -> MobId {
        MobId::new(MobKind::Npc, index)
    }

    #[test]
    fn insert_preserves_order() {
        let mut set = LocalViewSet::new();
        assert!(set.insert(npc(5), 1));
        assert!(set.insert(npc(2), 2));
        assert!(set.insert(npc(9), 3));
        assert!(!set.insert(npc(2), 2));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![npc(5), npc(2), npc(9)]);
    }

    #[test]
    fn remove_keeps_remaining_order() {
        let mut set = LocalViewSet::new();
        for index in 1..=4 {
            set.insert(npc(index), u64::from(index));
        }
        assert!(set.remove(npc(2)));
        assert!(!set.remove(npc(2)));
        assert!(!set.contains(npc(2)));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![npc(1), npc(3), npc(4)]);
    }

    #[test]
    fn capped_at_255() {
        let mut set = LocalViewSet::new();
        for index in 1..=300 {
            set.insert(npc(index), u64::from(index));
        }
        assert_eq!(set.len(), MAX_LOCAL_MOBS);
        assert!(set.is_full());
        assert!(!set.contains(npc(256)));
    }

    #[test]
    fn entries_remember_their_spawn() {
        let mut set = LocalViewSet::new();
        set.insert(npc(3), 7);
        assert_eq!(set.spawn_of(npc(3)), Some(7));
        assert!(!set.insert(npc(3), 8));
        assert_eq!(set.spawn_of(npc(3)), Some(7));
        set.remove(npc(3));
        assert_eq!(set.spawn_of(npc(3)), None);
    }
}
