//! Combines a mob's active blocks into one mask-prefixed payload.

use wire::{ByteReader, ByteWriter, Limits};
use world::{Mob, UpdateFlag};

use crate::blocks::{BlockContext, BlockData, BlockSpec, BlockTable};
use crate::cache::BlockCache;
use crate::error::{CodecError, CodecResult};
use crate::types::Perspective;

/// Set on the low mask byte when a second byte follows.
pub const MASK_ESCAPE: u16 = 0x40;

/// Masks at or above this value need the second byte.
pub const WIDE_MASK_THRESHOLD: u16 = 0x100;

/// Delta encoder over one block table.
#[derive(Debug, Clone, Copy)]
pub struct UpdateBlockSet {
    table: &'static BlockTable,
}

/// Blocks read back from a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBlocks {
    /// Mask without the escape bit.
    pub mask: u16,
    /// Blocks in table order.
    pub blocks: Vec<BlockData>,
}

impl UpdateBlockSet {
    #[must_use]
    pub const fn new(table: &'static BlockTable) -> Self {
        Self { table }
    }

    #[must_use]
    pub const fn table(&self) -> &'static BlockTable {
        self.table
    }

    fn active<'a>(
        &self,
        mob: &'a Mob,
        perspective: Perspective,
    ) -> impl Iterator<Item = &'static BlockSpec> + 'a {
        self.table
            .blocks()
            .iter()
            .filter(move |spec| match (spec.flag, perspective) {
                (UpdateFlag::Appearance, Perspective::AddNew) => true,
                (UpdateFlag::Chat, Perspective::SelfView) => false,
                (flag, _) => mob.flags().get(flag),
            })
    }

    /// Whether anything would be written for `mob` from `perspective`.
    #[must_use]
    pub fn has_pending(&self, mob: &Mob, perspective: Perspective) -> bool {
        self.active(mob, perspective).next().is_some()
    }

    /// Raw mask, without the escape bit.
    #[must_use]
    pub fn mask(&self, mob: &Mob, perspective: Perspective) -> u16 {
        self.active(mob, perspective)
            .fold(0, |mask, spec| mask | spec.mask)
    }

    /// Writes the mask followed by each active block.
    pub fn encode(
        &self,
        mob: &Mob,
        perspective: Perspective,
        ctx: &BlockContext<'_>,
        out: &mut ByteWriter,
    ) -> CodecResult<()> {
        write_mask(self.mask(mob, perspective), out);
        for spec in self.active(mob, perspective) {
            (spec.write)(mob, ctx, out)?;
        }
        Ok(())
    }

    /// [`encode`](Self::encode) from the maintain-existing perspective,
    /// served from `cache` when another observer already encoded `mob` this
    /// tick.
    pub fn encode_cached(
        &self,
        cache: &mut BlockCache,
        mob: &Mob,
        ctx: &BlockContext<'_>,
        out: &mut ByteWriter,
    ) -> CodecResult<()> {
        if let Some(bytes) = cache.get(mob.id()) {
            out.put_bytes(bytes);
            cache.record_hit();
            return Ok(());
        }
        let mut scratch = ByteWriter::with_capacity(32);
        self.encode(mob, Perspective::MaintainExisting, ctx, &mut scratch)?;
        out.put_bytes(scratch.as_slice());
        cache.insert(mob.id(), scratch.as_slice());
        Ok(())
    }

    /// Reads a mask and the blocks it announces.
    pub fn decode(
        &self,
        reader: &mut ByteReader<'_>,
        limits: &Limits,
    ) -> CodecResult<DecodedBlocks> {
        let mut mask = u16::from(reader.get_u8()?);
        if mask & MASK_ESCAPE != 0 {
            mask |= u16::from(reader.get_u8()?) << 8;
            mask &= !MASK_ESCAPE;
        }
        if mask & !self.table.known_mask() != 0 {
            return Err(CodecError::InvalidMask { mask });
        }

        let mut blocks = Vec::with_capacity(mask.count_ones() as usize);
        for spec in self.table.blocks() {
            if mask & spec.mask != 0 {
                blocks.push((spec.read)(reader, limits)?);
            }
        }
        Ok(DecodedBlocks { mask, blocks })
    }
}

fn write_mask(mask: u16, out: &mut ByteWriter) {
    if mask >= WIDE_MASK_THRESHOLD {
        out.put_u16_le(mask | MASK_ESCAPE);
    } else {
        out.put_u8(mask as u8);
    }
}
