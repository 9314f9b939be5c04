//! Pending field data referenced by update flags.

use crate::mob::MobId;
use crate::position::{Direction, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Animation {
    pub id: u16,
    pub delay: u8,
}

/// A spot graphic drawn at the mob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Graphic {
    pub id: u16,
    pub height: u16,
    pub delay: u16,
}

/// A public chat message. `text` is already packed by the chat codec.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChatMessage {
    pub text: Vec<u8>,
    pub color: u8,
    pub effects: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HitKind {
    Block,
    Normal,
    Poison,
    Disease,
}

impl HitKind {
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::Block => 0,
            Self::Normal => 1,
            Self::Poison => 2,
            Self::Disease => 3,
        }
    }

    #[must_use]
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::Block),
            1 => Some(Self::Normal),
            2 => Some(Self::Poison),
            3 => Some(Self::Disease),
            _ => None,
        }
    }
}

/// Damage splat plus the health bar to draw with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hit {
    pub damage: u8,
    pub kind: HitKind,
    pub current_health: u8,
    pub max_health: u8,
}

/// Who a mob is facing. `Reset` clears a previous target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionTarget {
    Mob(MobId),
    Reset,
}

/// Scripted movement between two tiles, given as offsets from the mob's
/// current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForcedMovement {
    pub start: (i8, i8),
    pub end: (i8, i8),
    pub start_ticks: u16,
    pub end_ticks: u16,
    pub direction: Direction,
}

/// Data for every flag that carries some. Appearance has none here: it is
/// read from the mob's kind data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockState {
    pub animation: Option<Animation>,
    pub graphic: Option<Graphic>,
    pub chat: Option<ChatMessage>,
    pub forced_chat: Option<String>,
    pub interacting: Option<InteractionTarget>,
    pub face_position: Option<Position>,
    pub primary_hit: Option<Hit>,
    pub secondary_hit: Option<Hit>,
    pub transform: Option<u16>,
    pub forced_movement: Option<ForcedMovement>,
}

impl BlockState {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
