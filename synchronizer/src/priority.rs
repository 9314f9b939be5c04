//! Admission priority for staggered updating.

use world::{Mob, MobId, Position, World};

/// Ranks candidates against each other relative to one observer.
///
/// Two mobs are compared by awarding points: the closer one gets 1, the
/// larger one 1, the higher combat level 2 and the one in combat 3. When the
/// totals are equal the left operand gets one more point, so comparison is
/// not symmetric and is only used through [`select`](Self::select).
#[derive(Debug, Clone, Copy)]
pub struct PriorityOrdering<'a> {
    world: &'a World,
    observer: Position,
}

impl<'a> PriorityOrdering<'a> {
    #[must_use]
    pub const fn new(world: &'a World, observer: Position) -> Self {
        Self { world, observer }
    }

    /// Points for `(left, right)`.
    #[must_use]
    pub fn score(&self, left: &Mob, right: &Mob) -> (u8, u8) {
        let (mut l, mut r) = (0u8, 0u8);
        let mut award = |left_wins: bool, right_wins: bool, points: u8| {
            if left_wins {
                l += points;
            } else if right_wins {
                r += points;
            }
        };

        let distance = |mob: &Mob| self.observer.distance(mob.position()).unwrap_or(u16::MAX);
        let (dl, dr) = (distance(left), distance(right));
        award(dl < dr, dr < dl, 1);

        let (sl, sr) = (self.world.size_of(left), self.world.size_of(right));
        award(sl > sr, sr > sl, 1);

        let (cl, cr) = (
            self.world.combat_level_of(left),
            self.world.combat_level_of(right),
        );
        award(cl > cr, cr > cl, 2);

        let (fl, fr) = (left.in_combat(), right.in_combat());
        award(fl && !fr, fr && !fl, 3);

        if l == r {
            l += 1;
        }
        (l, r)
    }

    /// Picks up to `limit` candidates, best first.
    ///
    /// Each round walks the remaining candidates keeping a champion; a
    /// challenger replaces it only by scoring strictly more, so the earliest
    /// of equals wins. Ids with no registered mob are ignored.
    #[must_use]
    pub fn select(&self, candidates: &[MobId], limit: usize) -> Vec<MobId> {
        let mut remaining: Vec<&Mob> = candidates
            .iter()
            .filter_map(|&id| self.world.mob(id))
            .collect();
        let mut selected = Vec::with_capacity(limit.min(remaining.len()));

        while selected.len() < limit && !remaining.is_empty() {
            let mut champion = 0;
            for challenger in 1..remaining.len() {
                let (held, taken) = self.score(remaining[champion], remaining[challenger]);
                if taken > held {
                    champion = challenger;
                }
            }
            selected.push(remaining.remove(champion).id());
        }
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use world::{DefinitionTable, MobData, NpcDefinition};

    fn world() -> World {
        let definition = |id, size, combat_level| NpcDefinition {
            id,
            name: format!("npc {id}"),
            size,
            combat_level,
        };
        let definitions: DefinitionTable = [
            definition(1, 1, 2),
            definition(2, 1, 40),
            definition(3, 3, 2),
        ]
        .into_iter()
        .collect();
        World::new(definitions)
    }

    const OBSERVER: Position = Position::new(3200, 3200, 0);

    #[test]
    fn equal_mobs_favour_the_left() {
        let mut world = world();
        let a = world.register(Position::new(3202, 3200, 0), MobData::npc(1)).unwrap();
        let b = world.register(Position::new(3200, 3202, 0), MobData::npc(1)).unwrap();
        let ordering = PriorityOrdering::new(&world, OBSERVER);
        let (a, b) = (world.mob(a).unwrap(), world.mob(b).unwrap());
        assert_eq!(ordering.score(a, b), (1, 0));
        assert_eq!(ordering.score(b, a), (1, 0));
    }

    #[test]
    fn combat_outweighs_distance_and_size() {
        let mut world = world();
        let near_big = world.register(Position::new(3201, 3200, 0), MobData::npc(3)).unwrap();
        let far = world.register(Position::new(3210, 3200, 0), MobData::npc(1)).unwrap();
        world.mob_mut(far).unwrap().set_in_combat(true);
        let ordering = PriorityOrdering::new(&world, OBSERVER);
        assert_eq!(
            ordering.score(world.mob(near_big).unwrap(), world.mob(far).unwrap()),
            (2, 3)
        );
    }

    #[test]
    fn select_prefers_higher_combat_level() {
        let mut world = world();
        let weak: Vec<_> = (0..4)
            .map(|i| {
                world
                    .register(Position::new(3203, 3200 + i, 0), MobData::npc(1))
                    .unwrap()
            })
            .collect();
        let strong = world.register(Position::new(3203, 3205, 0), MobData::npc(2)).unwrap();
        let mut candidates = weak.clone();
        candidates.push(strong);

        let ordering = PriorityOrdering::new(&world, OBSERVER);
        let selected = ordering.select(&candidates, 2);
        assert_eq!(selected, vec![strong, weak[0]]);
    }

    #[test]
    fn select_respects_limit_and_skips_unknown() {
        let mut world = world();
        let a = world.register(OBSERVER, MobData::npc(1)).unwrap();
        let ordering = PriorityOrdering::new(&world, OBSERVER);
        assert_eq!(ordering.select(&[MobId::npc(999), a], 5), vec![a]);
        assert!(ordering.select(&[a], 0).is_empty());
    }
}
