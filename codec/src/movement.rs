//! Movement segments of the bit section.
//!
//! Every tracked mob gets one segment per message. The first bit says
//! whether anything follows; a 2-bit type then selects stationary-with-update
//! (0), walk (1), run (2) or type 3. Type 3 means teleport in the observer's
//! own section and removal everywhere else, so it is only written through
//! [`write_teleport`] and [`write_drop`].

use bitstream::{BitReader, BitResult, BitWriter};
use world::{Direction, Mob, FRAME_SIZE};

use crate::error::{CodecError, CodecResult};

const TYPE_STATIONARY: u64 = 0;
const TYPE_WALK: u64 = 1;
const TYPE_RUN: u64 = 2;
const TYPE_TELEPORT_OR_DROP: u64 = 3;

/// One mob's movement for one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementSegment {
    /// Placed at local coordinates of the observer's frame.
    Teleport {
        plane: u8,
        frame_unchanged: bool,
        pending: bool,
        local_x: u8,
        local_y: u8,
    },
    Run {
        walk: Direction,
        run: Direction,
        pending: bool,
    },
    Walk {
        direction: Direction,
        pending: bool,
    },
    Stationary {
        pending: bool,
    },
    /// The entry leaves the local view set.
    Drop,
}

impl MovementSegment {
    /// Segment for a tracked mob other than the observer.
    #[must_use]
    pub fn for_mob(mob: &Mob, pending: bool) -> Self {
        match (mob.walking_direction(), mob.running_direction()) {
            (Some(walk), Some(run)) => Self::Run { walk, run, pending },
            (Some(direction), None) => Self::Walk { direction, pending },
            _ => Self::Stationary { pending },
        }
    }

    /// Segment for the observer itself. Teleports and frame changes place
    /// the observer at its local coordinates.
    pub fn for_self(observer: &Mob, pending: bool) -> CodecResult<Self> {
        if !observer.is_teleporting() && !observer.frame_changed() {
            return Ok(Self::for_mob(observer, pending));
        }
        let position = observer.position();
        let local = observer.frame().local(position);
        let in_frame = |v: i32| (0..FRAME_SIZE).contains(&v);
        if !in_frame(local.0) || !in_frame(local.1) {
            return Err(CodecError::CoordinateOutOfRange {
                id: observer.id(),
                local,
            });
        }
        Ok(Self::Teleport {
            plane: position.plane,
            frame_unchanged: !observer.frame_changed(),
            pending,
            local_x: local.0 as u8,
            local_y: local.1 as u8,
        })
    }

    /// Whether update blocks follow for this mob.
    #[must_use]
    pub const fn pending(&self) -> bool {
        match *self {
            Self::Teleport { pending, .. }
            | Self::Run { pending, .. }
            | Self::Walk { pending, .. }
            | Self::Stationary { pending } => pending,
            Self::Drop => false,
        }
    }

    /// `true` for the single zero bit: nothing moved, nothing to update.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Stationary { pending: false })
    }

    pub fn write(&self, bits: &mut BitWriter) -> BitResult<()> {
        match *self {
            Self::Teleport {
                plane,
                frame_unchanged,
                pending,
                local_x,
                local_y,
            } => write_teleport(bits, plane, frame_unchanged, pending, local_x, local_y),
            Self::Run { walk, run, pending } => {
                bits.write_bit(true);
                bits.write_bits(TYPE_RUN, 2)?;
                bits.write_bits(u64::from(walk.id()), 3)?;
                bits.write_bits(u64::from(run.id()), 3)?;
                bits.write_bit(pending);
                Ok(())
            }
            Self::Walk { direction, pending } => {
                bits.write_bit(true);
                bits.write_bits(TYPE_WALK, 2)?;
                bits.write_bits(u64::from(direction.id()), 3)?;
                bits.write_bit(pending);
                Ok(())
            }
            Self::Stationary { pending: true } => {
                bits.write_bit(true);
                bits.write_bits(TYPE_STATIONARY, 2)
            }
            Self::Stationary { pending: false } => {
                bits.write_bit(false);
                Ok(())
            }
            Self::Drop => write_drop(bits),
        }
    }

    /// Reads the observer's own segment; type 3 is a teleport.
    pub fn read_self(bits: &mut BitReader<'_>) -> BitResult<Self> {
        Self::read(bits, true)
    }

    /// Reads a tracked entry's segment; type 3 is a drop.
    pub fn read_entry(bits: &mut BitReader<'_>) -> BitResult<Self> {
        Self::read(bits, false)
    }

    fn read(bits: &mut BitReader<'_>, own: bool) -> BitResult<Self> {
        if !bits.read_bit()? {
            return Ok(Self::Stationary { pending: false });
        }
        match bits.read_bits(2)? {
            TYPE_STATIONARY => Ok(Self::Stationary { pending: true }),
            TYPE_WALK => {
                let direction = read_direction(bits)?;
                let pending = bits.read_bit()?;
                Ok(Self::Walk { direction, pending })
            }
            TYPE_RUN => {
                let walk = read_direction(bits)?;
                let run = read_direction(bits)?;
                let pending = bits.read_bit()?;
                Ok(Self::Run { walk, run, pending })
            }
            _ if own => {
                let plane = bits.read_bits(2)? as u8;
                let frame_unchanged = bits.read_bit()?;
                let pending = bits.read_bit()?;
                let local_y = bits.read_bits(7)? as u8;
                let local_x = bits.read_bits(7)? as u8;
                Ok(Self::Teleport {
                    plane,
                    frame_unchanged,
                    pending,
                    local_x,
                    local_y,
                })
            }
            _ => Ok(Self::Drop),
        }
    }
}

fn read_direction(bits: &mut BitReader<'_>) -> BitResult<Direction> {
    Ok(Direction::from_bits(bits.read_bits(3)? as u8))
}

/// Writes the observer's teleport segment.
pub fn write_teleport(
    bits: &mut BitWriter,
    plane: u8,
    frame_unchanged: bool,
    pending: bool,
    local_x: u8,
    local_y: u8,
) -> BitResult<()> {
    bits.write_bit(true);
    bits.write_bits(TYPE_TELEPORT_OR_DROP, 2)?;
    bits.write_bits(u64::from(plane), 2)?;
    bits.write_bit(frame_unchanged);
    bits.write_bit(pending);
    bits.write_bits(u64::from(local_y), 7)?;
    bits.write_bits(u64::from(local_x), 7)
}

/// Writes the removal of a tracked entry.
pub fn write_drop(bits: &mut BitWriter) -> BitResult<()> {
    bits.write_bit(true);
    bits.write_bits(TYPE_TELEPORT_OR_DROP, 2)
}
