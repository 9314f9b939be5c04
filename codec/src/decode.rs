//! Reading sync messages back.
//!
//! Follows the client's parse: the bit section first, then each announced
//! block set in the order the bits announced them.

use wire::{ByteReader, FrameRef, Limits};
use world::MAX_LOCAL_MOBS;

use crate::block_set::{DecodedBlocks, UpdateBlockSet};
use crate::blocks::table_for;
use crate::error::{CodecError, CodecResult, LimitKind};
use crate::movement::MovementSegment;
use crate::protocol::{SyncKind, ADDITION_TERMINATOR};

/// A movement segment and the blocks it announced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEntry {
    pub segment: MovementSegment,
    pub blocks: Option<DecodedBlocks>,
}

/// One addition to the local view set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAddition {
    pub index: u16,
    pub update_follows: bool,
    pub discard_movement: bool,
    pub dx: i8,
    pub dy: i8,
    pub blocks: Option<DecodedBlocks>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSync {
    pub kind: SyncKind,
    /// The observer's own section; players only.
    pub own: Option<DecodedEntry>,
    /// Existing entries in local view set order.
    pub entries: Vec<DecodedEntry>,
    pub additions: Vec<DecodedAddition>,
}

impl DecodedSync {
    /// Entries dropped by this message.
    #[must_use]
    pub fn removed(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.segment == MovementSegment::Drop)
            .count()
    }

    /// Size of the local view set once the message is applied.
    #[must_use]
    pub fn local_count(&self) -> usize {
        self.entries.len() - self.removed() + self.additions.len()
    }
}

struct BitSection {
    own: Option<MovementSegment>,
    entries: Vec<MovementSegment>,
    additions: Vec<(u16, bool, bool, i8, i8)>,
}

/// Decodes a player or npc sync frame.
pub fn decode_sync(frame: &FrameRef<'_>, limits: &Limits) -> CodecResult<DecodedSync> {
    let kind = SyncKind::from_opcode(frame.opcode).ok_or(CodecError::UnexpectedOpcode {
        opcode: frame.opcode,
    })?;
    let set = UpdateBlockSet::new(table_for(kind.mob_kind()));
    let mut reader = ByteReader::new(frame.payload);

    let section = reader.bit_access(|bits| -> CodecResult<BitSection> {
        let own = if kind.has_self_section() {
            Some(MovementSegment::read_self(bits)?)
        } else {
            None
        };

        let count = bits.read_bits(8)? as usize;
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            entries.push(MovementSegment::read_entry(bits)?);
        }

        let mut additions = Vec::new();
        while bits.bits_remaining() >= 11 {
            let index = bits.read_bits(11)? as u16;
            if index == ADDITION_TERMINATOR {
                break;
            }
            if additions.len() == MAX_LOCAL_MOBS {
                return Err(CodecError::LimitsExceeded {
                    kind: LimitKind::LocalMobs,
                    limit: MAX_LOCAL_MOBS,
                    actual: MAX_LOCAL_MOBS + 1,
                });
            }
            let update_follows = bits.read_bit()?;
            let discard_movement = bits.read_bit()?;
            let dy = bits.read_signed_bits(5)? as i8;
            let dx = bits.read_signed_bits(5)? as i8;
            additions.push((index, update_follows, discard_movement, dx, dy));
        }
        Ok(BitSection {
            own,
            entries,
            additions,
        })
    })?;

    let mut blocks_for = |pending: bool| -> CodecResult<Option<DecodedBlocks>> {
        if pending {
            Ok(Some(set.decode(&mut reader, limits)?))
        } else {
            Ok(None)
        }
    };

    let own = match section.own {
        Some(segment) => Some(DecodedEntry {
            segment,
            blocks: blocks_for(segment.pending())?,
        }),
        None => None,
    };
    let mut entries = Vec::with_capacity(section.entries.len());
    for segment in section.entries {
        entries.push(DecodedEntry {
            segment,
            blocks: blocks_for(segment.pending())?,
        });
    }
    let mut additions = Vec::with_capacity(section.additions.len());
    for (index, update_follows, discard_movement, dx, dy) in section.additions {
        additions.push(DecodedAddition {
            index,
            update_follows,
            discard_movement,
            dx,
            dy,
            blocks: blocks_for(update_follows)?,
        });
    }

    if !reader.is_empty() {
        return Err(CodecError::TrailingData {
            remaining: reader.remaining(),
        });
    }
    Ok(DecodedSync {
        kind,
        own,
        entries,
        additions,
    })
}
