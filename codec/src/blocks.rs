//! Update block layouts and the static block tables.
//!
//! Each [`BlockSpec`] pairs an [`UpdateFlag`] with its mask bit and the
//! plain functions that write and read its bytes. A [`BlockTable`] lists the
//! specs for one mob kind in wire order; that order and the masks are fixed
//! by the client.

use std::fmt;

use blake3::Hasher;
use wire::{ByteReader, ByteWriter, DecodeError, Limits, WireResult};
use world::{
    Animation, Appearance, ChatMessage, DefinitionTable, Direction, ForcedMovement, Gender,
    Graphic, Hit, HitKind, InteractionTarget, Mob, MobId, MobKind, UpdateFlag,
};

use crate::error::{CodecError, CodecResult};

/// Shared read-only state block writers may consult.
#[derive(Debug, Clone, Copy)]
pub struct BlockContext<'a> {
    definitions: &'a DefinitionTable,
}

impl<'a> BlockContext<'a> {
    #[must_use]
    pub const fn new(definitions: &'a DefinitionTable) -> Self {
        Self { definitions }
    }

    #[must_use]
    pub const fn definitions(&self) -> &'a DefinitionTable {
        self.definitions
    }
}

/// Writes one block's bytes for a mob.
pub type BlockWriter = fn(&Mob, &BlockContext<'_>, &mut ByteWriter) -> CodecResult<()>;

/// Reads one block's bytes back.
pub type BlockReader = fn(&mut ByteReader<'_>, &Limits) -> WireResult<BlockData>;

/// One entry of a block table.
#[derive(Clone, Copy)]
pub struct BlockSpec {
    pub flag: UpdateFlag,
    pub mask: u16,
    pub write: BlockWriter,
    pub read: BlockReader,
}

impl fmt::Debug for BlockSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockSpec")
            .field("flag", &self.flag)
            .field("mask", &format_args!("0x{:03X}", self.mask))
            .finish_non_exhaustive()
    }
}

/// Ordered block specs for one mob kind.
#[derive(Debug)]
pub struct BlockTable {
    kind: MobKind,
    blocks: &'static [BlockSpec],
}

impl BlockTable {
    #[must_use]
    pub const fn kind(&self) -> MobKind {
        self.kind
    }

    /// Specs in wire order.
    #[must_use]
    pub const fn blocks(&self) -> &'static [BlockSpec] {
        self.blocks
    }

    #[must_use]
    pub fn spec(&self, flag: UpdateFlag) -> Option<&'static BlockSpec> {
        self.blocks.iter().find(|spec| spec.flag == flag)
    }

    /// Union of every mask in the table.
    #[must_use]
    pub fn known_mask(&self) -> u16 {
        self.blocks.iter().fold(0, |mask, spec| mask | spec.mask)
    }

    /// Deterministic hash of the layout (kind, order, flags, masks).
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = Hasher::new();
        hasher.update(&[self.kind as u8]);
        hasher.update(&(self.blocks.len() as u32).to_le_bytes());
        for spec in self.blocks {
            hasher.update(&[spec.flag as u8]);
            hasher.update(&spec.mask.to_le_bytes());
        }
        let mut first = [0u8; 8];
        first.copy_from_slice(&hasher.finalize().as_bytes()[..8]);
        u64::from_le_bytes(first)
    }
}

/// Player blocks in the order the client reads them.
pub static PLAYER_BLOCKS: BlockTable = BlockTable {
    kind: MobKind::Player,
    blocks: &[
        BlockSpec {
            flag: UpdateFlag::ForcedMovement,
            mask: 0x400,
            write: write_forced_movement,
            read: read_forced_movement,
        },
        BlockSpec {
            flag: UpdateFlag::Graphic,
            mask: 0x100,
            write: write_graphic,
            read: read_graphic,
        },
        BlockSpec {
            flag: UpdateFlag::Animation,
            mask: 0x8,
            write: write_animation,
            read: read_animation,
        },
        BlockSpec {
            flag: UpdateFlag::ForcedChat,
            mask: 0x4,
            write: write_forced_chat,
            read: read_forced_chat,
        },
        BlockSpec {
            flag: UpdateFlag::Chat,
            mask: 0x80,
            write: write_chat,
            read: read_chat,
        },
        BlockSpec {
            flag: UpdateFlag::Interacting,
            mask: 0x1,
            write: write_interacting,
            read: read_interacting,
        },
        BlockSpec {
            flag: UpdateFlag::Appearance,
            mask: 0x10,
            write: write_player_appearance,
            read: read_player_appearance,
        },
        BlockSpec {
            flag: UpdateFlag::FacePosition,
            mask: 0x2,
            write: write_face_position,
            read: read_face_position,
        },
        BlockSpec {
            flag: UpdateFlag::PrimaryHit,
            mask: 0x20,
            write: write_primary_hit,
            read: read_primary_hit,
        },
        BlockSpec {
            flag: UpdateFlag::SecondaryHit,
            mask: 0x200,
            write: write_secondary_hit,
            read: read_secondary_hit,
        },
    ],
};

/// Npc blocks in the order the client reads them. `0x40` stays free for the
/// mask escape bit.
pub static NPC_BLOCKS: BlockTable = BlockTable {
    kind: MobKind::Npc,
    blocks: &[
        BlockSpec {
            flag: UpdateFlag::Animation,
            mask: 0x10,
            write: write_animation,
            read: read_animation,
        },
        BlockSpec {
            flag: UpdateFlag::PrimaryHit,
            mask: 0x8,
            write: write_primary_hit,
            read: read_primary_hit,
        },
        BlockSpec {
            flag: UpdateFlag::Graphic,
            mask: 0x80,
            write: write_graphic,
            read: read_graphic,
        },
        BlockSpec {
            flag: UpdateFlag::Interacting,
            mask: 0x20,
            write: write_interacting,
            read: read_interacting,
        },
        BlockSpec {
            flag: UpdateFlag::ForcedChat,
            mask: 0x1,
            write: write_forced_chat,
            read: read_forced_chat,
        },
        BlockSpec {
            flag: UpdateFlag::Transform,
            mask: 0x2,
            write: write_transform,
            read: read_transform,
        },
        BlockSpec {
            flag: UpdateFlag::FacePosition,
            mask: 0x4,
            write: write_face_position,
            read: read_face_position,
        },
        BlockSpec {
            flag: UpdateFlag::SecondaryHit,
            mask: 0x100,
            write: write_secondary_hit,
            read: read_secondary_hit,
        },
        BlockSpec {
            flag: UpdateFlag::Appearance,
            mask: 0x200,
            write: write_npc_appearance,
            read: read_npc_appearance,
        },
        BlockSpec {
            flag: UpdateFlag::ForcedMovement,
            mask: 0x400,
            write: write_forced_movement,
            read: read_forced_movement,
        },
    ],
};

/// The table for `kind`.
#[must_use]
pub const fn table_for(kind: MobKind) -> &'static BlockTable {
    match kind {
        MobKind::Player => &PLAYER_BLOCKS,
        MobKind::Npc => &NPC_BLOCKS,
    }
}

/// A decoded block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockData {
    ForcedMovement(ForcedMovement),
    Graphic(Graphic),
    Animation(Animation),
    ForcedChat(String),
    Chat {
        message: ChatMessage,
        privilege: u8,
    },
    Interacting(InteractionTarget),
    PlayerAppearance(PlayerAppearance),
    NpcAppearance {
        definition: u16,
        size: u8,
    },
    FacePosition {
        x: u16,
        y: u16,
    },
    PrimaryHit(Hit),
    SecondaryHit(Hit),
    Transform(u16),
}

/// Decoded player appearance block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerAppearance {
    pub appearance: Appearance,
    /// Lower-case name with `_` for spaces, as recovered from base 37.
    pub name: String,
    pub combat_level: u8,
    pub total_level: u16,
}

fn require<T>(value: Option<T>, mob: &Mob, flag: UpdateFlag) -> CodecResult<T> {
    value.ok_or(CodecError::MissingBlockData { id: mob.id(), flag })
}

fn invalid(field: &'static str, value: u64) -> DecodeError {
    DecodeError::InvalidValue { field, value }
}

fn write_forced_movement(mob: &Mob, _: &BlockContext<'_>, out: &mut ByteWriter) -> CodecResult<()> {
    let movement = require(
        mob.blocks().forced_movement,
        mob,
        UpdateFlag::ForcedMovement,
    )?;
    out.put_u8_subtract(movement.start.0 as u8);
    out.put_u8_subtract(movement.start.1 as u8);
    out.put_u8_subtract(movement.end.0 as u8);
    out.put_u8_subtract(movement.end.1 as u8);
    out.put_u16_le_add(movement.start_ticks);
    out.put_u16_add(movement.end_ticks);
    out.put_u8_subtract(movement.direction.id());
    Ok(())
}

fn read_forced_movement(reader: &mut ByteReader<'_>, _: &Limits) -> WireResult<BlockData> {
    let start = (
        reader.get_u8_subtract()? as i8,
        reader.get_u8_subtract()? as i8,
    );
    let end = (
        reader.get_u8_subtract()? as i8,
        reader.get_u8_subtract()? as i8,
    );
    let start_ticks = reader.get_u16_le_add()?;
    let end_ticks = reader.get_u16_add()?;
    let raw = reader.get_u8_subtract()?;
    let direction = Direction::from_id(raw).ok_or_else(|| invalid("direction", raw.into()))?;
    Ok(BlockData::ForcedMovement(ForcedMovement {
        start,
        end,
        start_ticks,
        end_ticks,
        direction,
    }))
}

fn write_graphic(mob: &Mob, _: &BlockContext<'_>, out: &mut ByteWriter) -> CodecResult<()> {
    let graphic = require(mob.blocks().graphic, mob, UpdateFlag::Graphic)?;
    out.put_u16_le(graphic.id);
    out.put_u32(u32::from(graphic.height) << 16 | u32::from(graphic.delay));
    Ok(())
}

fn read_graphic(reader: &mut ByteReader<'_>, _: &Limits) -> WireResult<BlockData> {
    let id = reader.get_u16_le()?;
    let packed = reader.get_u32()?;
    Ok(BlockData::Graphic(Graphic {
        id,
        height: (packed >> 16) as u16,
        delay: packed as u16,
    }))
}

fn write_animation(mob: &Mob, _: &BlockContext<'_>, out: &mut ByteWriter) -> CodecResult<()> {
    let animation = require(mob.blocks().animation, mob, UpdateFlag::Animation)?;
    out.put_u16_le(animation.id);
    out.put_u8_negate(animation.delay);
    Ok(())
}

fn read_animation(reader: &mut ByteReader<'_>, _: &Limits) -> WireResult<BlockData> {
    let id = reader.get_u16_le()?;
    let delay = reader.get_u8_negate()?;
    Ok(BlockData::Animation(Animation { id, delay }))
}

fn write_forced_chat(mob: &Mob, _: &BlockContext<'_>, out: &mut ByteWriter) -> CodecResult<()> {
    let text = require(
        mob.blocks().forced_chat.as_deref(),
        mob,
        UpdateFlag::ForcedChat,
    )?;
    out.put_str(text)?;
    Ok(())
}

fn read_forced_chat(reader: &mut ByteReader<'_>, limits: &Limits) -> WireResult<BlockData> {
    Ok(BlockData::ForcedChat(reader.get_str(limits)?))
}

fn write_chat(mob: &Mob, _: &BlockContext<'_>, out: &mut ByteWriter) -> CodecResult<()> {
    let message = require(mob.blocks().chat.as_ref(), mob, UpdateFlag::Chat)?;
    let len = u8::try_from(message.text.len()).map_err(|_| CodecError::InvalidValue {
        id: mob.id(),
        field: "chat length",
        value: message.text.len() as i64,
    })?;
    let privilege = mob.player().map_or(0, |player| player.privilege.id());
    out.put_u16_le(u16::from(message.color) << 8 | u16::from(message.effects));
    out.put_u8(privilege);
    out.put_u8_negate(len);
    out.put_bytes_reversed(&message.text);
    Ok(())
}

fn read_chat(reader: &mut ByteReader<'_>, _: &Limits) -> WireResult<BlockData> {
    let [color, effects] = reader.get_u16_le()?.to_be_bytes();
    let privilege = reader.get_u8()?;
    let len = reader.get_u8_negate()?;
    let text = reader.get_bytes_reversed(usize::from(len))?;
    Ok(BlockData::Chat {
        message: ChatMessage {
            text,
            color,
            effects,
        },
        privilege,
    })
}

const PLAYER_TARGET_OFFSET: u16 = 0x8000;
const NO_TARGET: u16 = 0xFFFF;

fn write_interacting(mob: &Mob, _: &BlockContext<'_>, out: &mut ByteWriter) -> CodecResult<()> {
    let target = require(mob.blocks().interacting, mob, UpdateFlag::Interacting)?;
    let raw = match target {
        InteractionTarget::Reset => NO_TARGET,
        InteractionTarget::Mob(id) => match id.kind {
            MobKind::Npc => id.index,
            MobKind::Player => id.index | PLAYER_TARGET_OFFSET,
        },
    };
    out.put_u16_le(raw);
    Ok(())
}

fn read_interacting(reader: &mut ByteReader<'_>, _: &Limits) -> WireResult<BlockData> {
    let raw = reader.get_u16_le()?;
    let target = match raw {
        NO_TARGET => InteractionTarget::Reset,
        raw if raw >= PLAYER_TARGET_OFFSET => {
            InteractionTarget::Mob(MobId::player(raw - PLAYER_TARGET_OFFSET))
        }
        raw => InteractionTarget::Mob(MobId::npc(raw)),
    };
    Ok(BlockData::Interacting(target))
}

fn write_player_appearance(
    mob: &Mob,
    _: &BlockContext<'_>,
    out: &mut ByteWriter,
) -> CodecResult<()> {
    let player = require(mob.player(), mob, UpdateFlag::Appearance)?;
    let appearance = &player.appearance;

    let mut block = ByteWriter::with_capacity(64);
    block.put_u8(match appearance.gender {
        Gender::Male => 0,
        Gender::Female => 1,
    });
    block.put_u8(appearance.head_icon);
    for &slot in &appearance.equipment {
        match slot {
            0 => block.put_u8(0),
            // The reader takes a zero first byte as an empty slot.
            1..=0xFF => {
                return Err(CodecError::InvalidValue {
                    id: mob.id(),
                    field: "equipment slot",
                    value: i64::from(slot),
                })
            }
            _ => block.put_u16(slot),
        }
    }
    for &color in &appearance.colors {
        block.put_u8(color);
    }
    for &animation in &appearance.animations {
        block.put_u16(animation);
    }
    block.put_u64(encode_base37(&player.username));
    block.put_u8(player.combat_level);
    block.put_u16(player.total_level);

    out.put_u8_negate(block.len() as u8);
    out.put_bytes(block.as_slice());
    Ok(())
}

fn read_player_appearance(reader: &mut ByteReader<'_>, _: &Limits) -> WireResult<BlockData> {
    let len = reader.get_u8_negate()?;
    let mut block = ByteReader::new(reader.get_bytes(usize::from(len))?);

    let gender = match block.get_u8()? {
        0 => Gender::Male,
        1 => Gender::Female,
        other => return Err(invalid("gender", other.into())),
    };
    let head_icon = block.get_u8()?;
    let mut equipment = [0u16; 12];
    for slot in &mut equipment {
        let high = block.get_u8()?;
        if high != 0 {
            *slot = u16::from_be_bytes([high, block.get_u8()?]);
        }
    }
    let mut colors = [0u8; 5];
    for color in &mut colors {
        *color = block.get_u8()?;
    }
    let mut animations = [0u16; 7];
    for animation in &mut animations {
        *animation = block.get_u16()?;
    }
    let name = decode_base37(block.get_u64()?);
    let combat_level = block.get_u8()?;
    let total_level = block.get_u16()?;

    Ok(BlockData::PlayerAppearance(PlayerAppearance {
        appearance: Appearance {
            gender,
            head_icon,
            equipment,
            colors,
            animations,
        },
        name,
        combat_level,
        total_level,
    }))
}

fn write_npc_appearance(mob: &Mob, ctx: &BlockContext<'_>, out: &mut ByteWriter) -> CodecResult<()> {
    let npc = require(mob.npc(), mob, UpdateFlag::Appearance)?;
    let definition =
        ctx.definitions
            .get(npc.definition)
            .ok_or(CodecError::MissingDefinition {
                id: mob.id(),
                definition: npc.definition,
            })?;
    out.put_u16_le_add(npc.definition);
    out.put_u8(definition.size);
    Ok(())
}

fn read_npc_appearance(reader: &mut ByteReader<'_>, _: &Limits) -> WireResult<BlockData> {
    let definition = reader.get_u16_le_add()?;
    let size = reader.get_u8()?;
    Ok(BlockData::NpcAppearance { definition, size })
}

fn write_face_position(mob: &Mob, _: &BlockContext<'_>, out: &mut ByteWriter) -> CodecResult<()> {
    let position = require(mob.blocks().face_position, mob, UpdateFlag::FacePosition)?;
    let doubled = |value: u16| {
        u16::try_from(u32::from(value) * 2 + 1).map_err(|_| CodecError::InvalidValue {
            id: mob.id(),
            field: "face position",
            value: i64::from(value),
        })
    };
    out.put_u16_le_add(doubled(position.x)?);
    out.put_u16_le(doubled(position.y)?);
    Ok(())
}

fn read_face_position(reader: &mut ByteReader<'_>, _: &Limits) -> WireResult<BlockData> {
    let x = reader.get_u16_le_add()?;
    let y = reader.get_u16_le()?;
    Ok(BlockData::FacePosition {
        x: x.saturating_sub(1) / 2,
        y: y.saturating_sub(1) / 2,
    })
}

fn read_hit_kind(raw: u8) -> WireResult<HitKind> {
    HitKind::from_id(raw).ok_or_else(|| invalid("hit kind", raw.into()))
}

fn write_primary_hit(mob: &Mob, _: &BlockContext<'_>, out: &mut ByteWriter) -> CodecResult<()> {
    let hit = require(mob.blocks().primary_hit, mob, UpdateFlag::PrimaryHit)?;
    out.put_u8(hit.damage);
    out.put_u8_add(hit.kind.id());
    out.put_u8_negate(hit.current_health);
    out.put_u8(hit.max_health);
    Ok(())
}

fn read_primary_hit(reader: &mut ByteReader<'_>, _: &Limits) -> WireResult<BlockData> {
    let damage = reader.get_u8()?;
    let kind = read_hit_kind(reader.get_u8_add()?)?;
    let current_health = reader.get_u8_negate()?;
    let max_health = reader.get_u8()?;
    Ok(BlockData::PrimaryHit(Hit {
        damage,
        kind,
        current_health,
        max_health,
    }))
}

fn write_secondary_hit(mob: &Mob, _: &BlockContext<'_>, out: &mut ByteWriter) -> CodecResult<()> {
    let hit = require(mob.blocks().secondary_hit, mob, UpdateFlag::SecondaryHit)?;
    out.put_u8(hit.damage);
    out.put_u8_subtract(hit.kind.id());
    out.put_u8(hit.current_health);
    out.put_u8_negate(hit.max_health);
    Ok(())
}

fn read_secondary_hit(reader: &mut ByteReader<'_>, _: &Limits) -> WireResult<BlockData> {
    let damage = reader.get_u8()?;
    let kind = read_hit_kind(reader.get_u8_subtract()?)?;
    let current_health = reader.get_u8()?;
    let max_health = reader.get_u8_negate()?;
    Ok(BlockData::SecondaryHit(Hit {
        damage,
        kind,
        current_health,
        max_health,
    }))
}

fn write_transform(mob: &Mob, _: &BlockContext<'_>, out: &mut ByteWriter) -> CodecResult<()> {
    let definition = require(mob.blocks().transform, mob, UpdateFlag::Transform)?;
    out.put_u16_le_add(definition);
    Ok(())
}

fn read_transform(reader: &mut ByteReader<'_>, _: &Limits) -> WireResult<BlockData> {
    Ok(BlockData::Transform(reader.get_u16_le_add()?))
}

const BASE37_CHARS: &[u8; 37] = b"_abcdefghijklmnopqrstuvwxyz0123456789";

/// Packs up to 12 name characters into base 37. Characters other than
/// ASCII letters and digits map to `_`.
#[must_use]
pub fn encode_base37(name: &str) -> u64 {
    let mut value = 0u64;
    for c in name.chars().take(12) {
        value *= 37;
        value += match c {
            'A'..='Z' => 1 + u64::from(c) - u64::from('A'),
            'a'..='z' => 1 + u64::from(c) - u64::from('a'),
            '0'..='9' => 27 + u64::from(c) - u64::from('0'),
            _ => 0,
        };
    }
    while value != 0 && value % 37 == 0 {
        value /= 37;
    }
    value
}

#[must_use]
pub fn decode_base37(mut value: u64) -> String {
    let mut name = Vec::new();
    while value != 0 {
        name.push(BASE37_CHARS[(value % 37) as usize]);
        value /= 37;
    }
    name.iter().rev().map(|&b| char::from(b)).collect()
}
