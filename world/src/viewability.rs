//! Which regions and mobs an observer can see.

use crate::error::{WorldError, WorldResult};
use crate::position::{Position, RegionCoordinates, REGION_SIZE};

/// Largest supported viewing distance. A signed 5-bit addition offset tops
/// out at 15, and at this distance every visible tile lies within the regions
/// [`ViewabilityResolver::regions`] returns.
pub const MAX_VIEWING_DISTANCE: u16 = 15;

/// Resolves the regions that may hold mobs visible from a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewabilityResolver {
    distance: u16,
}

impl ViewabilityResolver {
    pub fn new(distance: u16) -> WorldResult<Self> {
        if distance == 0 || distance > MAX_VIEWING_DISTANCE {
            return Err(WorldError::InvalidViewingDistance {
                distance,
                max: MAX_VIEWING_DISTANCE,
            });
        }
        Ok(Self { distance })
    }

    #[must_use]
    pub const fn distance(&self) -> u16 {
        self.distance
    }

    /// The observer's own region plus the neighbours it is close enough to
    /// see into: 1 to 4 regions.
    #[must_use]
    pub fn regions(&self, observer: Position) -> Vec<RegionCoordinates> {
        let own = observer.region();
        let dx = self.axis_offset(observer.x % REGION_SIZE);
        let dy = self.axis_offset(observer.y % REGION_SIZE);

        let mut regions = Vec::with_capacity(4);
        regions.push(own);
        if let Some(dx) = dx {
            regions.extend(own.offset(dx, 0));
        }
        if let Some(dy) = dy {
            regions.extend(own.offset(0, dy));
        }
        if let (Some(dx), Some(dy)) = (dx, dy) {
            regions.extend(own.offset(dx, dy));
        }
        regions
    }

    /// `-1` or `+1` when the local coordinate is within viewing distance of
    /// the low or high region edge.
    fn axis_offset(&self, local: u16) -> Option<i16> {
        if local < self.distance {
            Some(-1)
        } else if local > REGION_SIZE - 1 - self.distance {
            Some(1)
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_viewable(&self, observer: Position, target: Position) -> bool {
        observer.is_within(target, self.distance)
    }
}
