//! Per-observer synchronization messages.

use bitstream::BitWriter;
use wire::{ByteWriter, Frame, FrameKind, Limits, MessageBuilder};
use world::{LocalViewSet, Mob, MobId, ViewabilityResolver, World};

use crate::block_set::UpdateBlockSet;
use crate::blocks::{table_for, BlockContext};
use crate::cache::BlockCache;
use crate::error::{CodecError, CodecResult};
use crate::limits::CodecLimits;
use crate::movement::{write_drop, MovementSegment};
use crate::protocol::{SyncKind, ADDITION_TERMINATOR};
use crate::types::Perspective;

/// Counters for one message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SyncStats {
    /// Entries admitted to the local view set.
    pub added: usize,
    /// Entries dropped from the local view set.
    pub removed: usize,
    /// Candidates left for a later tick by the caps.
    pub deferred: usize,
    /// Encoded frame size, zero when unchanged.
    pub bytes: usize,
}

/// Result of encoding one observer's message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Message { frame: Frame, stats: SyncStats },
    /// Nothing to tell the client; no message is sent.
    Unchanged { stats: SyncStats },
}

impl SyncOutcome {
    #[must_use]
    pub const fn stats(&self) -> SyncStats {
        match self {
            Self::Message { stats, .. } | Self::Unchanged { stats } => *stats,
        }
    }

    #[must_use]
    pub fn into_frame(self) -> Option<Frame> {
        match self {
            Self::Message { frame, .. } => Some(frame),
            Self::Unchanged { .. } => None,
        }
    }
}

/// Builds player (81) or npc (65) sync messages.
#[derive(Debug, Clone)]
pub struct SynchronizationEncoder {
    kind: SyncKind,
    blocks: UpdateBlockSet,
    resolver: ViewabilityResolver,
    limits: CodecLimits,
    wire_limits: Limits,
}

impl SynchronizationEncoder {
    #[must_use]
    pub fn new(
        kind: SyncKind,
        resolver: ViewabilityResolver,
        limits: CodecLimits,
        wire_limits: Limits,
    ) -> Self {
        Self {
            kind,
            blocks: UpdateBlockSet::new(table_for(kind.mob_kind())),
            resolver,
            limits,
            wire_limits,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> SyncKind {
        self.kind
    }

    #[must_use]
    pub const fn block_set(&self) -> &UpdateBlockSet {
        &self.blocks
    }

    /// Encodes `observer`'s message and updates `local`.
    ///
    /// `candidates` are viewable mobs in the order they should be admitted.
    /// Those still tracked after the drops are skipped. `local` is only
    /// modified when the message was built successfully.
    pub fn encode(
        &self,
        world: &World,
        observer: MobId,
        local: &mut LocalViewSet,
        candidates: &[MobId],
        cache: &mut BlockCache,
    ) -> CodecResult<SyncOutcome> {
        self.encode_with(world, observer, local, cache, |_, _| candidates.to_vec())
    }

    /// Like [`encode`](Self::encode), but the admission order is asked for
    /// once the existing entries have been walked.
    ///
    /// `order` receives the local view set after this tick's drops and the
    /// number of free admission slots, and returns candidates in admission
    /// order. A mob dropped this tick can therefore be added back in the
    /// same message.
    pub fn encode_with<F>(
        &self,
        world: &World,
        observer: MobId,
        local: &mut LocalViewSet,
        cache: &mut BlockCache,
        order: F,
    ) -> CodecResult<SyncOutcome>
    where
        F: FnOnce(&LocalViewSet, usize) -> Vec<MobId>,
    {
        let observer = world
            .mob(observer)
            .filter(|mob| mob.player().is_some())
            .ok_or(CodecError::UnknownObserver { id: observer })?;
        let ctx = BlockContext::new(world.definitions());

        let mut next = local.clone();
        let mut stats = SyncStats::default();
        let mut changed = false;
        let mut blocks = ByteWriter::new();
        let mut message = MessageBuilder::new(self.kind.opcode(), FrameKind::VariableShort);

        message.bit_access(|bits| -> CodecResult<()> {
            if self.kind.has_self_section() {
                let pending = self.blocks.has_pending(observer, Perspective::SelfView);
                let segment = MovementSegment::for_self(observer, pending)?;
                segment.write(bits)?;
                changed |= !segment.is_idle();
                if pending {
                    self.blocks
                        .encode(observer, Perspective::SelfView, &ctx, &mut blocks)?;
                }
            }

            bits.write_bits(next.len() as u64, 8)?;
            let tracked: Vec<MobId> = next.iter().collect();
            for id in tracked {
                let kept = world
                    .mob(id)
                    .filter(|mob| next.tracks(mob) && self.keeps(observer, mob));
                match kept {
                    Some(mob) => {
                        let pending = self.blocks.has_pending(mob, Perspective::MaintainExisting);
                        let segment = MovementSegment::for_mob(mob, pending);
                        segment.write(bits)?;
                        changed |= !segment.is_idle();
                        if pending {
                            self.blocks.encode_cached(cache, mob, &ctx, &mut blocks)?;
                        }
                    }
                    None => {
                        write_drop(bits)?;
                        next.remove(id);
                        stats.removed += 1;
                        changed = true;
                    }
                }
            }

            let capacity = self.limits.local_capacity();
            let admission = self.limits.admission_capacity();
            let slots = admission.min(capacity.saturating_sub(next.len()));
            for id in order(&next, slots) {
                if id.kind != self.kind.mob_kind() || id == observer.id() || next.contains(id) {
                    continue;
                }
                let Some(mob) = world.mob(id).filter(|mob| self.admits(observer, mob)) else {
                    continue;
                };
                if stats.added >= admission || next.len() >= capacity {
                    stats.deferred += 1;
                    continue;
                }
                self.write_addition(bits, observer, mob)?;
                self.blocks
                    .encode(mob, Perspective::AddNew, &ctx, &mut blocks)?;
                next.insert(id, mob.spawn());
                stats.added += 1;
                changed = true;
            }

            if !blocks.is_empty() {
                bits.write_bits(u64::from(ADDITION_TERMINATOR), 11)?;
            }
            Ok(())
        })?;

        if !changed {
            return Ok(SyncOutcome::Unchanged { stats });
        }

        message.put_bytes(blocks.as_slice());
        let frame = message.finish(&self.wire_limits)?;
        stats.bytes = frame.encoded_len();
        *local = next;
        Ok(SyncOutcome::Message { frame, stats })
    }

    /// Whether a tracked entry stays in the local view set.
    fn keeps(&self, observer: &Mob, mob: &Mob) -> bool {
        mob.is_active()
            && !mob.is_teleporting()
            && !observer.frame_changed()
            && self.resolver.is_viewable(observer.position(), mob.position())
    }

    fn admits(&self, observer: &Mob, mob: &Mob) -> bool {
        mob.is_active() && self.resolver.is_viewable(observer.position(), mob.position())
    }

    fn write_addition(
        &self,
        bits: &mut BitWriter,
        observer: &Mob,
        mob: &Mob,
    ) -> CodecResult<()> {
        let dx = i32::from(mob.position().x) - i32::from(observer.position().x);
        let dy = i32::from(mob.position().y) - i32::from(observer.position().y);
        let fits = |delta: i32| (-16..=15).contains(&delta);
        if !fits(dx) || !fits(dy) {
            return Err(CodecError::DeltaOutOfRange {
                id: mob.id(),
                dx,
                dy,
            });
        }
        bits.write_bits(u64::from(mob.id().index), 11)?;
        // Appearance is always sent for additions.
        bits.write_bit(true);
        // Discard any client-side walking queue.
        bits.write_bit(true);
        bits.write_signed_bits(i64::from(dy), 5)?;
        bits.write_signed_bits(i64::from(dx), 5)?;
        Ok(())
    }
}
