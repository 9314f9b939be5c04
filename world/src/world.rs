//! The world: mob repositories, spatial index and definitions.

use std::mem;

use crate::definition::DefinitionTable;
use crate::error::{WorldError, WorldResult};
use crate::local::LocalViewSet;
use crate::mob::{Mob, MobData, MobId, MobKind, MAX_MOB_INDEX};
use crate::position::{Direction, Position, PLANE_COUNT};
use crate::region::RegionRepository;
use crate::repository::MobRepository;

/// Owns every mob and keeps region membership in step with positions.
///
/// Membership changes only through [`register`](Self::register),
/// [`unregister`](Self::unregister), [`move_mob`](Self::move_mob) and
/// [`teleport`](Self::teleport), which gameplay calls between update passes.
#[derive(Debug)]
pub struct World {
    players: MobRepository,
    npcs: MobRepository,
    regions: RegionRepository,
    definitions: DefinitionTable,
}

impl World {
    #[must_use]
    pub fn new(definitions: DefinitionTable) -> Self {
        Self::with_capacity(definitions, MAX_MOB_INDEX, MAX_MOB_INDEX)
    }

    #[must_use]
    pub fn with_capacity(definitions: DefinitionTable, players: u16, npcs: u16) -> Self {
        Self {
            players: MobRepository::new(MobKind::Player, players),
            npcs: MobRepository::new(MobKind::Npc, npcs),
            regions: RegionRepository::new(),
            definitions,
        }
    }

    #[must_use]
    pub const fn definitions(&self) -> &DefinitionTable {
        &self.definitions
    }

    #[must_use]
    pub const fn regions(&self) -> &RegionRepository {
        &self.regions
    }

    const fn repository(&self, kind: MobKind) -> &MobRepository {
        match kind {
            MobKind::Player => &self.players,
            MobKind::Npc => &self.npcs,
        }
    }

    fn repository_mut(&mut self, kind: MobKind) -> &mut MobRepository {
        match kind {
            MobKind::Player => &mut self.players,
            MobKind::Npc => &mut self.npcs,
        }
    }

    /// Adds a mob at `position` and indexes it in its region.
    pub fn register(&mut self, position: Position, data: MobData) -> WorldResult<MobId> {
        if position.plane >= PLANE_COUNT {
            return Err(WorldError::InvalidPlane {
                plane: position.plane,
            });
        }
        let id = self
            .repository_mut(data.kind())
            .insert(position, data)?
            .id();
        self.regions.region_at(position.region()).add(id);
        Ok(id)
    }

    /// Removes a mob from the world and its region.
    pub fn unregister(&mut self, id: MobId) -> WorldResult<Mob> {
        let mob = self
            .repository_mut(id.kind)
            .remove(id.index)
            .ok_or(WorldError::UnknownMob { id })?;
        if let Some(region) = self.regions.get(mob.position().region()) {
            region.remove(id);
        }
        Ok(mob)
    }

    #[must_use]
    pub fn mob(&self, id: MobId) -> Option<&Mob> {
        self.repository(id.kind).get(id.index)
    }

    pub fn mob_mut(&mut self, id: MobId) -> Option<&mut Mob> {
        self.repository_mut(id.kind).get_mut(id.index)
    }

    /// Mobs of `kind` in index order.
    pub fn mobs(&self, kind: MobKind) -> impl Iterator<Item = &Mob> {
        self.repository(kind).iter()
    }

    pub fn mobs_mut(&mut self, kind: MobKind) -> impl Iterator<Item = &mut Mob> {
        self.repository_mut(kind).iter_mut()
    }

    #[must_use]
    pub fn count(&self, kind: MobKind) -> usize {
        self.repository(kind).len()
    }

    /// Moves a mob one step (`walk`) or two (`walk` then `run`) and records
    /// the directions for this tick's movement segment.
    pub fn move_mob(
        &mut self,
        id: MobId,
        walk: Direction,
        run: Option<Direction>,
    ) -> WorldResult<Position> {
        let mob = self.mob(id).ok_or(WorldError::UnknownMob { id })?;
        let from = mob.position();
        let mut to = from.step(walk).ok_or(WorldError::OutOfBounds { id })?;
        if let Some(run) = run {
            to = to.step(run).ok_or(WorldError::OutOfBounds { id })?;
        }

        self.relocate(id, from, to);
        if let Some(mob) = self.mob_mut(id) {
            mob.set_position(to);
            mob.set_directions(Some(walk), run);
        }
        Ok(to)
    }

    /// Places a mob at `destination` without walking.
    pub fn teleport(&mut self, id: MobId, destination: Position) -> WorldResult<()> {
        if destination.plane >= PLANE_COUNT {
            return Err(WorldError::InvalidPlane {
                plane: destination.plane,
            });
        }
        let from = self
            .mob(id)
            .ok_or(WorldError::UnknownMob { id })?
            .position();

        self.relocate(id, from, destination);
        if let Some(mob) = self.mob_mut(id) {
            mob.set_position(destination);
            mob.set_directions(None, None);
            mob.set_teleporting();
        }
        Ok(())
    }

    fn relocate(&self, id: MobId, from: Position, to: Position) {
        let (old, new) = (from.region(), to.region());
        if old == new {
            return;
        }
        if let Some(region) = self.regions.get(old) {
            region.remove(id);
        }
        self.regions.region_at(new).add(id);
    }

    /// Moves an observer's local view set out of the world so it can be
    /// updated while the world is borrowed immutably.
    pub fn take_local_view(&mut self, observer: MobId, kind: MobKind) -> WorldResult<LocalViewSet> {
        let local = self
            .mob_mut(observer)
            .ok_or(WorldError::UnknownMob { id: observer })?
            .local_mut(kind)
            .ok_or(WorldError::NotAPlayer { id: observer })?;
        Ok(mem::take(local))
    }

    /// Puts back a set taken with [`take_local_view`](Self::take_local_view).
    pub fn restore_local_view(
        &mut self,
        observer: MobId,
        kind: MobKind,
        set: LocalViewSet,
    ) -> WorldResult<()> {
        let local = self
            .mob_mut(observer)
            .ok_or(WorldError::UnknownMob { id: observer })?
            .local_mut(kind)
            .ok_or(WorldError::NotAPlayer { id: observer })?;
        *local = set;
        Ok(())
    }

    /// Side length in tiles; players are 1, npcs come from their definition.
    #[must_use]
    pub fn size_of(&self, mob: &Mob) -> u8 {
        match mob.data() {
            MobData::Player(_) => 1,
            MobData::Npc(npc) => self
                .definitions
                .get(npc.definition)
                .map_or(1, |definition| definition.size),
        }
    }

    #[must_use]
    pub fn combat_level_of(&self, mob: &Mob) -> u8 {
        match mob.data() {
            MobData::Player(player) => player.combat_level,
            MobData::Npc(npc) => self
                .definitions
                .get(npc.definition)
                .map_or(0, |definition| definition.combat_level),
        }
    }
}
