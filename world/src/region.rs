//! Spatial index: mobs bucketed into 32x32 regions.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;

use crate::mob::{MobId, MobKind};
use crate::position::RegionCoordinates;

/// Membership of one region.
///
/// Each kind's list has its own lock, so reading players never waits on an
/// npc moving in, and regions never contend with each other.
#[derive(Debug)]
pub struct Region {
    coordinates: RegionCoordinates,
    players: RwLock<Vec<MobId>>,
    npcs: RwLock<Vec<MobId>>,
}

impl Region {
    #[must_use]
    pub fn new(coordinates: RegionCoordinates) -> Self {
        Self {
            coordinates,
            players: RwLock::new(Vec::new()),
            npcs: RwLock::new(Vec::new()),
        }
    }

    #[must_use]
    pub const fn coordinates(&self) -> RegionCoordinates {
        self.coordinates
    }

    const fn list(&self, kind: MobKind) -> &RwLock<Vec<MobId>> {
        match kind {
            MobKind::Player => &self.players,
            MobKind::Npc => &self.npcs,
        }
    }

    /// Adds `id`; returns `false` if it was already a member.
    pub fn add(&self, id: MobId) -> bool {
        let mut members = self.list(id.kind).write();
        if members.contains(&id) {
            return false;
        }
        members.push(id);
        true
    }

    /// Removes `id`, keeping the order of the remaining members.
    pub fn remove(&self, id: MobId) -> bool {
        let mut members = self.list(id.kind).write();
        match members.iter().position(|&member| member == id) {
            Some(at) => {
                members.remove(at);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn contains(&self, id: MobId) -> bool {
        self.list(id.kind).read().contains(&id)
    }

    /// Snapshot of the members of `kind`, in insertion order.
    #[must_use]
    pub fn members(&self, kind: MobKind) -> Vec<MobId> {
        self.list(kind).read().clone()
    }

    #[must_use]
    pub fn len(&self, kind: MobKind) -> usize {
        self.list(kind).read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.read().is_empty() && self.npcs.read().is_empty()
    }
}

/// All regions, created on first access.
#[derive(Debug, Default)]
pub struct RegionRepository {
    regions: DashMap<RegionCoordinates, Arc<Region>>,
}

impl RegionRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The region at `coordinates`, creating it if needed.
    pub fn region_at(&self, coordinates: RegionCoordinates) -> Arc<Region> {
        let entry = self
            .regions
            .entry(coordinates)
            .or_insert_with(|| Arc::new(Region::new(coordinates)));
        Arc::clone(entry.value())
    }

    /// The region at `coordinates` if it was ever created.
    #[must_use]
    pub fn get(&self, coordinates: RegionCoordinates) -> Option<Arc<Region>> {
        self.regions
            .get(&coordinates)
            .map(|region| Arc::clone(region.value()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
