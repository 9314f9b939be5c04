//! The per-tick update pass.

use codec::{
    BlockCache, RegionChangeMessage, SyncKind, SyncOutcome, SyncStats, SynchronizationEncoder,
    Tick,
};
use wire::Frame;
use world::{
    LocalViewSet, MobId, MobKind, SessionId, SessionStatus, ViewabilityResolver, World,
    WorldError,
};

use crate::candidates::{admission_order, gather_candidates};
use crate::config::{ConfigError, SyncConfig};
use crate::error::{SyncError, SyncResult};
use crate::transport::{Transport, TransportError};

/// An observer skipped for one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObserverFailure {
    pub observer: MobId,
    pub error: SyncError,
}

/// What one call to [`Synchronizer::run_tick`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickReport {
    pub tick: u64,
    /// Players that were eligible to receive updates.
    pub observers: usize,
    /// Sync messages handed to the transport.
    pub messages: usize,
    /// Sync messages omitted because nothing changed.
    pub unchanged: usize,
    pub region_changes: usize,
    /// Encoded bytes of every frame sent, region changes included.
    pub bytes: usize,
    pub added: usize,
    pub removed: usize,
    pub deferred: usize,
    /// Maintenance encodes served from the tick cache.
    pub cache_hits: usize,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub failures: Vec<ObserverFailure>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub transport_failures: Vec<TransportError>,
}

impl TickReport {
    fn record(&mut self, stats: SyncStats) {
        self.added += stats.added;
        self.removed += stats.removed;
        self.deferred += stats.deferred;
    }
}

/// Frames built for one observer, in send order.
#[derive(Debug, Default)]
struct ObserverUpdate {
    frames: Vec<Frame>,
    region_change: bool,
    /// Per kind: stats and whether a message was built.
    outcomes: Vec<(SyncKind, SyncStats, bool)>,
}

#[derive(Debug, Clone, Copy)]
struct Observer {
    id: MobId,
    session: SessionId,
}

/// Runs the update pass once per tick.
///
/// A pass has three phases. The pre phase re-anchors every player's
/// coordinate frame. The sync phase builds, for each active player, an
/// optional region change followed by the player and npc messages, and hands
/// them to the transport. The post phase clears flags, blocks and movement
/// on every mob and resets the tick cache.
#[derive(Debug)]
pub struct Synchronizer {
    config: SyncConfig,
    resolver: ViewabilityResolver,
    players: SynchronizationEncoder,
    npcs: SynchronizationEncoder,
    cache: BlockCache,
    tick: Tick,
}

impl Synchronizer {
    pub fn new(config: SyncConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let resolver = config.resolver()?;
        let encoder = |kind: SyncKind| {
            SynchronizationEncoder::new(
                kind,
                resolver,
                config.codec_limits(kind.mob_kind()),
                config.wire_limits(),
            )
        };
        let players = encoder(SyncKind::Players);
        let npcs = encoder(SyncKind::Npcs);
        Ok(Self {
            config,
            resolver,
            players,
            npcs,
            cache: BlockCache::new(),
            tick: Tick::default(),
        })
    }

    #[must_use]
    pub const fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// The tick the next call to [`run_tick`](Self::run_tick) runs.
    #[must_use]
    pub const fn tick(&self) -> Tick {
        self.tick
    }

    pub fn run_tick<T>(&mut self, world: &mut World, transport: &mut T) -> TickReport
    where
        T: Transport + ?Sized,
    {
        let span = tracing::debug_span!("tick", tick = self.tick.raw());
        let _enter = span.enter();

        let mut report = TickReport {
            tick: self.tick.raw(),
            ..TickReport::default()
        };

        for player in world.mobs_mut(MobKind::Player) {
            player.update_frame();
        }

        let observers: Vec<Observer> = world
            .mobs(MobKind::Player)
            .filter(|mob| mob.is_active())
            .filter_map(|mob| {
                let session = mob.session()?;
                (session.status == SessionStatus::Active).then_some(Observer {
                    id: mob.id(),
                    session: session.id,
                })
            })
            .collect();
        report.observers = observers.len();

        for observer in observers {
            match self.synchronize(world, observer.id) {
                Ok(update) => self.dispatch(observer, update, transport, &mut report),
                Err(error) => {
                    tracing::warn!(
                        tick = self.tick.raw(),
                        observer = %observer.id,
                        %error,
                        "skipping observer"
                    );
                    report.failures.push(ObserverFailure {
                        observer: observer.id,
                        error,
                    });
                }
            }
        }

        for kind in [MobKind::Player, MobKind::Npc] {
            for mob in world.mobs_mut(kind) {
                mob.reset_tick_state();
            }
        }
        report.cache_hits = self.cache.hits();
        self.cache.reset();
        self.tick = self.tick.next();

        tracing::debug!(
            observers = report.observers,
            messages = report.messages,
            unchanged = report.unchanged,
            bytes = report.bytes,
            added = report.added,
            removed = report.removed,
            deferred = report.deferred,
            failures = report.failures.len(),
            "tick complete"
        );
        report
    }

    /// Builds every frame for `observer`. Both local view sets are committed
    /// together, and only if every frame was built.
    fn synchronize(&mut self, world: &mut World, observer: MobId) -> SyncResult<ObserverUpdate> {
        let players = world.take_local_view(observer, MobKind::Player)?;
        let npcs = match world.take_local_view(observer, MobKind::Npc) {
            Ok(npcs) => npcs,
            Err(err) => {
                world.restore_local_view(observer, MobKind::Player, players)?;
                return Err(err.into());
            }
        };

        let mut next_players = players.clone();
        let mut next_npcs = npcs.clone();
        let result = self.encode_observer(world, observer, &mut next_players, &mut next_npcs);
        let (players, npcs) = if result.is_ok() {
            (next_players, next_npcs)
        } else {
            (players, npcs)
        };
        world.restore_local_view(observer, MobKind::Player, players)?;
        world.restore_local_view(observer, MobKind::Npc, npcs)?;
        result
    }

    fn encode_observer(
        &mut self,
        world: &World,
        id: MobId,
        players: &mut LocalViewSet,
        npcs: &mut LocalViewSet,
    ) -> SyncResult<ObserverUpdate> {
        let observer = world.mob(id).ok_or(WorldError::UnknownMob { id })?;
        let mut update = ObserverUpdate::default();

        if observer.frame_changed() {
            let message = RegionChangeMessage::for_frame(observer.frame());
            update.frames.push(message.encode(&self.config.wire_limits())?);
            update.region_change = true;
        }

        let staggered = self.config.staggered_updating;
        for (encoder, local) in [(&self.players, players), (&self.npcs, npcs)] {
            let kind = encoder.kind().mob_kind();
            let candidates = gather_candidates(world, &self.resolver, observer, kind);
            let outcome = encoder.encode_with(world, id, local, &mut self.cache, |tracked, slots| {
                admission_order(world, observer, candidates, tracked, slots, staggered)
            })?;
            let stats = outcome.stats();
            let sent = match outcome {
                SyncOutcome::Message { frame, .. } => {
                    update.frames.push(frame);
                    true
                }
                SyncOutcome::Unchanged { .. } => false,
            };
            update.outcomes.push((encoder.kind(), stats, sent));
        }
        Ok(update)
    }

    fn dispatch<T>(
        &self,
        observer: Observer,
        update: ObserverUpdate,
        transport: &mut T,
        report: &mut TickReport,
    ) where
        T: Transport + ?Sized,
    {
        if update.region_change {
            report.region_changes += 1;
        }
        for &(kind, stats, sent) in &update.outcomes {
            report.record(stats);
            if !sent {
                report.unchanged += 1;
                continue;
            }
            report.messages += 1;
            tracing::trace!(
                observer = %observer.id,
                opcode = kind.opcode(),
                bytes = stats.bytes,
                added = stats.added,
                removed = stats.removed,
                "sync message"
            );
        }

        if update.frames.is_empty() {
            return;
        }
        for frame in update.frames {
            let len = frame.encoded_len();
            if let Err(err) = transport.send(observer.session, frame) {
                tracing::warn!(
                    tick = self.tick.raw(),
                    observer = %observer.id,
                    error = %err,
                    "send failed"
                );
                report.transport_failures.push(err);
                return;
            }
            report.bytes += len;
        }
        if let Err(err) = transport.flush(observer.session) {
            tracing::warn!(
                tick = self.tick.raw(),
                observer = %observer.id,
                error = %err,
                "flush failed"
            );
            report.transport_failures.push(err);
        }
    }
}
