//! Interest management: which mobs an observer could start tracking.

use world::{LocalViewSet, Mob, MobId, MobKind, ViewabilityResolver, World};

use crate::priority::PriorityOrdering;

/// Active, viewable mobs of `kind` around `observer`, in region iteration
/// order. The observer itself is excluded.
#[must_use]
pub fn gather_candidates(
    world: &World,
    resolver: &ViewabilityResolver,
    observer: &Mob,
    kind: MobKind,
) -> Vec<MobId> {
    let position = observer.position();
    resolver
        .regions(position)
        .into_iter()
        .filter_map(|coordinates| world.regions().get(coordinates))
        .flat_map(|region| region.members(kind))
        .filter(|&id| id != observer.id())
        .filter(|&id| {
            world.mob(id).is_some_and(|mob| {
                mob.is_active() && resolver.is_viewable(position, mob.position())
            })
        })
        .collect()
}

/// Candidates not yet in `local`, in the order they should be admitted.
///
/// With `staggered` set and more untracked candidates than `admission`
/// slots, the best `admission` go first by [`PriorityOrdering`] and the rest
/// keep region order behind them.
#[must_use]
pub fn admission_order(
    world: &World,
    observer: &Mob,
    candidates: Vec<MobId>,
    local: &LocalViewSet,
    admission: usize,
    staggered: bool,
) -> Vec<MobId> {
    let untracked: Vec<MobId> = candidates
        .into_iter()
        .filter(|&id| !local.contains(id))
        .collect();
    if !staggered || untracked.len() <= admission {
        return untracked;
    }

    let mut ordered =
        PriorityOrdering::new(world, observer.position()).select(&untracked, admission);
    let rest: Vec<MobId> = untracked
        .into_iter()
        .filter(|id| !ordered.contains(id))
        .collect();
    ordered.extend(rest);
    ordered
}
