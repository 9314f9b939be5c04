//! Error types for world management.

use std::fmt;

use crate::mob::{MobId, MobKind};

/// Result type for world operations.
pub type WorldResult<T> = Result<T, WorldError>;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WorldError {
    /// Plane outside `0..4`.
    InvalidPlane { plane: u8 },

    /// Every index of this kind is taken.
    RepositoryFull { kind: MobKind, capacity: usize },

    /// No mob is registered under this id.
    UnknownMob { id: MobId },

    /// The operation needs a player.
    NotAPlayer { id: MobId },

    /// A step would leave the map.
    OutOfBounds { id: MobId },

    /// Viewing distance outside `1..=max`.
    InvalidViewingDistance { distance: u16, max: u16 },
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPlane { plane } => write!(f, "invalid plane {plane}"),
            Self::RepositoryFull { kind, capacity } => {
                write!(f, "{kind} repository full ({capacity} slots)")
            }
            Self::UnknownMob { id } => write!(f, "unknown mob {id}"),
            Self::NotAPlayer { id } => write!(f, "{id} is not a player"),
            Self::OutOfBounds { id } => write!(f, "{id} would step off the map"),
            Self::InvalidViewingDistance { distance, max } => {
                write!(f, "viewing distance {distance} outside 1..={max}")
            }
        }
    }
}

impl std::error::Error for WorldError {}
