//! Opcodes and frame layouts of the messages this crate produces.

use wire::FrameKind;
use world::MobKind;

pub const PLAYER_SYNC_OPCODE: u8 = 81;
pub const NPC_SYNC_OPCODE: u8 = 65;
pub const REGION_CHANGE_OPCODE: u8 = 73;

/// Index that ends the addition list.
pub const ADDITION_TERMINATOR: u16 = 2047;

/// Which synchronization message is being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SyncKind {
    /// Opcode 81; starts with the observer's own section.
    Players,
    /// Opcode 65.
    Npcs,
}

impl SyncKind {
    pub const ALL: [Self; 2] = [Self::Players, Self::Npcs];

    #[must_use]
    pub const fn opcode(self) -> u8 {
        match self {
            Self::Players => PLAYER_SYNC_OPCODE,
            Self::Npcs => NPC_SYNC_OPCODE,
        }
    }

    #[must_use]
    pub const fn from_opcode(opcode: u8) -> Option<Self> {
        match opcode {
            PLAYER_SYNC_OPCODE => Some(Self::Players),
            NPC_SYNC_OPCODE => Some(Self::Npcs),
            _ => None,
        }
    }

    /// Kind of mob tracked by this message.
    #[must_use]
    pub const fn mob_kind(self) -> MobKind {
        match self {
            Self::Players => MobKind::Player,
            Self::Npcs => MobKind::Npc,
        }
    }

    #[must_use]
    pub const fn has_self_section(self) -> bool {
        matches!(self, Self::Players)
    }
}

/// Frame layout by opcode, for [`wire::decode_frame`].
#[must_use]
pub const fn frame_kind(opcode: u8) -> Option<FrameKind> {
    match opcode {
        PLAYER_SYNC_OPCODE | NPC_SYNC_OPCODE => Some(FrameKind::VariableShort),
        REGION_CHANGE_OPCODE => Some(FrameKind::Fixed(4)),
        _ => None,
    }
}
