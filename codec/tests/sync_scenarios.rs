use codec::{
    decode_sync, BlockCache, BlockData, CodecError, CodecLimits, MovementSegment, SyncKind,
    SyncOutcome, SynchronizationEncoder,
};
use wire::{decode_frame, FrameRef, Limits};
use world::{
    Animation, DefinitionTable, Direction, LocalViewSet, MobData, MobId, MobKind, NpcDefinition,
    PlayerData, Position, SessionId, ViewabilityResolver, World,
};

const HOME: Position = Position::new(3222, 3218, 0);

fn definitions() -> DefinitionTable {
    [
        NpcDefinition {
            id: 1,
            name: "Man".to_string(),
            size: 1,
            combat_level: 2,
        },
        NpcDefinition {
            id: 2,
            name: "Giant rat".to_string(),
            size: 2,
            combat_level: 3,
        },
    ]
    .into_iter()
    .collect()
}

fn world_with_observer() -> (World, MobId) {
    let mut world = World::new(definitions());
    let observer = world
        .register(
            HOME,
            MobData::player(PlayerData::new("observer", SessionId(1))),
        )
        .unwrap();
    (world, observer)
}

fn encoder(kind: SyncKind) -> SynchronizationEncoder {
    SynchronizationEncoder::new(
        kind,
        ViewabilityResolver::new(15).unwrap(),
        CodecLimits::default(),
        Limits::default(),
    )
}

fn offset(dx: i16, dy: i16) -> Position {
    Position::new(
        HOME.x.checked_add_signed(dx).unwrap(),
        HOME.y.checked_add_signed(dy).unwrap(),
        0,
    )
}

/// Runs one sync pass for `observer` and commits the local view set.
fn sync(
    world: &mut World,
    encoder: &SynchronizationEncoder,
    observer: MobId,
    candidates: &[MobId],
    cache: &mut BlockCache,
) -> Result<SyncOutcome, CodecError> {
    let kind = encoder.kind().mob_kind();
    let mut local = world.take_local_view(observer, kind).unwrap();
    let result = encoder.encode(world, observer, &mut local, candidates, cache);
    world.restore_local_view(observer, kind, local).unwrap();
    result
}

fn end_tick(world: &mut World, cache: &mut BlockCache) {
    for kind in [MobKind::Player, MobKind::Npc] {
        for mob in world.mobs_mut(kind) {
            mob.reset_tick_state();
        }
    }
    cache.reset();
}

fn local(world: &World, observer: MobId, kind: MobKind) -> LocalViewSet {
    world
        .mob(observer)
        .unwrap()
        .player()
        .unwrap()
        .local(kind)
        .clone()
}

fn decode(outcome: SyncOutcome) -> codec::DecodedSync {
    let frame = outcome.into_frame().expect("message expected");
    let bytes = frame.to_bytes();
    let (view, used) = decode_frame(&bytes, codec::frame_kind, &Limits::default()).unwrap();
    assert_eq!(used, bytes.len());
    decode_sync(&view, &Limits::default()).unwrap()
}

#[test]
fn new_npc_is_added_with_forced_appearance() {
    let (mut world, observer) = world_with_observer();
    let npc = world.register(offset(3, -2), MobData::npc(1)).unwrap();
    assert!(world.mob(npc).unwrap().flags().is_empty());

    let mut cache = BlockCache::new();
    let outcome = sync(&mut world, &encoder(SyncKind::Npcs), observer, &[npc], &mut cache).unwrap();
    let frame = outcome.clone().into_frame().unwrap();
    assert_eq!(
        frame.to_bytes(),
        vec![
            65, 0, 11, // opcode, u16 length
            0x00, 0x00, 0x3F, 0x87, 0xFF, 0xC0, // count, addition, terminator
            0x40, 0x02, 0x81, 0x00, 1, // escaped mask 0x200, definition, size
        ]
    );
    assert_eq!(outcome.stats().added, 1);

    let decoded = decode(outcome);
    let addition = &decoded.additions[0];
    assert_eq!(addition.index, npc.index);
    assert_eq!((addition.dx, addition.dy), (3, -2));
    assert!(addition.update_follows);
    let blocks = addition.blocks.as_ref().unwrap();
    assert_eq!(blocks.mask, 0x200);
    assert_eq!(
        blocks.blocks,
        vec![BlockData::NpcAppearance {
            definition: 1,
            size: 1
        }]
    );
    assert!(local(&world, observer, MobKind::Npc).contains(npc));
}

#[test]
fn admission_is_capped_per_tick_and_in_total() {
    let (mut world, observer) = world_with_observer();
    let npcs: Vec<MobId> = (0..300i16)
        .map(|i| {
            world
                .register(offset(i % 20 - 15, i / 20 - 10), MobData::npc(1))
                .unwrap()
        })
        .collect();

    let encoder = encoder(SyncKind::Npcs);
    let mut cache = BlockCache::new();
    let mut sizes = Vec::new();
    for _ in 0..18 {
        let outcome = sync(&mut world, &encoder, observer, &npcs, &mut cache).unwrap();
        let stats = outcome.stats();
        assert!(stats.added <= 15);
        sizes.push(local(&world, observer, MobKind::Npc).len());
        end_tick(&mut world, &mut cache);
    }

    assert_eq!(sizes[0], 15);
    assert_eq!(sizes[1], 30);
    assert_eq!(sizes[16], 255);
    assert_eq!(sizes[17], 255);

    let last = sync(&mut world, &encoder, observer, &npcs, &mut cache).unwrap();
    assert_eq!(last.stats().added, 0);
    assert_eq!(last.stats().deferred, 45);
}

#[test]
fn mob_leaving_view_is_dropped_in_the_same_tick() {
    let (mut world, observer) = world_with_observer();
    let npc = world.register(offset(15, 0), MobData::npc(1)).unwrap();
    let encoder = encoder(SyncKind::Npcs);
    let mut cache = BlockCache::new();

    sync(&mut world, &encoder, observer, &[npc], &mut cache).unwrap();
    end_tick(&mut world, &mut cache);

    world.move_mob(npc, Direction::East, None).unwrap();
    let outcome = sync(&mut world, &encoder, observer, &[], &mut cache).unwrap();
    assert_eq!(outcome.stats().removed, 1);
    let decoded = decode(outcome);
    assert_eq!(decoded.entries[0].segment, MovementSegment::Drop);
    assert!(decoded.additions.is_empty());
    assert!(local(&world, observer, MobKind::Npc).is_empty());
}

#[test]
fn teleported_mob_is_dropped_and_readded() {
    let (mut world, observer) = world_with_observer();
    let npc = world.register(offset(2, 2), MobData::npc(1)).unwrap();
    let encoder = encoder(SyncKind::Npcs);
    let mut cache = BlockCache::new();

    sync(&mut world, &encoder, observer, &[npc], &mut cache).unwrap();
    end_tick(&mut world, &mut cache);

    world.teleport(npc, offset(-4, 5)).unwrap();
    let decoded = decode(sync(&mut world, &encoder, observer, &[npc], &mut cache).unwrap());
    assert_eq!(decoded.entries[0].segment, MovementSegment::Drop);
    assert_eq!(decoded.additions.len(), 1);
    assert_eq!((decoded.additions[0].dx, decoded.additions[0].dy), (-4, 5));
    assert_eq!(decoded.local_count(), 1);
}

#[test]
fn existing_entries_move_and_share_cached_blocks() {
    let (mut world, observer) = world_with_observer();
    let other = world
        .register(
            offset(1, 0),
            MobData::player(PlayerData::new("other", SessionId(2))),
        )
        .unwrap();
    let npc = world.register(offset(0, 3), MobData::npc(2)).unwrap();
    let encoder = encoder(SyncKind::Npcs);
    let mut cache = BlockCache::new();

    for viewer in [observer, other] {
        sync(&mut world, &encoder, viewer, &[npc], &mut cache).unwrap();
    }
    end_tick(&mut world, &mut cache);

    world.move_mob(npc, Direction::North, None).unwrap();
    world
        .mob_mut(npc)
        .unwrap()
        .play_animation(Animation { id: 422, delay: 0 });

    let first = sync(&mut world, &encoder, observer, &[npc], &mut cache).unwrap();
    let second = sync(&mut world, &encoder, other, &[npc], &mut cache).unwrap();
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.hits(), 1);

    let (first, second) = (decode(first), decode(second));
    assert_eq!(first.entries, second.entries);
    assert_eq!(
        first.entries[0].segment,
        MovementSegment::Walk {
            direction: Direction::North,
            pending: true
        }
    );
    assert_eq!(
        first.entries[0].blocks.as_ref().unwrap().blocks,
        vec![BlockData::Animation(Animation { id: 422, delay: 0 })]
    );
}

#[test]
fn quiet_tick_is_unchanged() {
    let (mut world, observer) = world_with_observer();
    let npc = world.register(offset(1, 1), MobData::npc(1)).unwrap();
    let encoder = encoder(SyncKind::Npcs);
    let mut cache = BlockCache::new();

    sync(&mut world, &encoder, observer, &[npc], &mut cache).unwrap();
    end_tick(&mut world, &mut cache);

    let outcome = sync(&mut world, &encoder, observer, &[npc], &mut cache).unwrap();
    assert!(matches!(outcome, SyncOutcome::Unchanged { .. }));
    assert_eq!(local(&world, observer, MobKind::Npc).len(), 1);
}

#[test]
fn frame_change_drops_every_entry() {
    let (mut world, observer) = world_with_observer();
    let npc = world.register(offset(1, 1), MobData::npc(1)).unwrap();
    let encoder = encoder(SyncKind::Npcs);
    let mut cache = BlockCache::new();

    sync(&mut world, &encoder, observer, &[npc], &mut cache).unwrap();
    end_tick(&mut world, &mut cache);

    // Run east side by side until the observer nears the frame edge.
    for _ in 0..17 {
        for id in [observer, npc] {
            world
                .move_mob(id, Direction::East, Some(Direction::East))
                .unwrap();
        }
    }
    assert!(world.mob_mut(observer).unwrap().update_frame());
    let decoded = decode(sync(&mut world, &encoder, observer, &[npc], &mut cache).unwrap());
    assert_eq!(decoded.entries.len(), 1);
    assert_eq!(decoded.removed(), 1);
    // Still in view, so it comes straight back relative to the new frame.
    assert_eq!(decoded.additions.len(), 1);
    assert_eq!((decoded.additions[0].dx, decoded.additions[0].dy), (1, 1));
    assert_eq!(local(&world, observer, MobKind::Npc).len(), 1);
}

#[test]
fn reused_index_is_dropped_and_added_as_a_newcomer() {
    let (mut world, observer) = world_with_observer();
    let old = world.register(offset(1, 1), MobData::npc(1)).unwrap();
    let encoder = encoder(SyncKind::Npcs);
    let mut cache = BlockCache::new();

    sync(&mut world, &encoder, observer, &[old], &mut cache).unwrap();
    end_tick(&mut world, &mut cache);

    world.unregister(old).unwrap();
    let newcomer = world.register(offset(-6, 4), MobData::npc(2)).unwrap();
    assert_eq!(newcomer, old);

    let decoded = decode(sync(&mut world, &encoder, observer, &[newcomer], &mut cache).unwrap());
    assert_eq!(decoded.entries[0].segment, MovementSegment::Drop);
    assert_eq!(decoded.additions.len(), 1);
    assert_eq!((decoded.additions[0].dx, decoded.additions[0].dy), (-6, 4));
    let set = local(&world, observer, MobKind::Npc);
    assert!(set.tracks(world.mob(newcomer).unwrap()));
}

#[test]
fn failed_message_leaves_local_view_untouched() {
    let (mut world, observer) = world_with_observer();
    let known = world.register(offset(1, 1), MobData::npc(1)).unwrap();
    let broken = world.register(offset(2, 2), MobData::npc(99)).unwrap();
    let encoder = encoder(SyncKind::Npcs);
    let mut cache = BlockCache::new();

    sync(&mut world, &encoder, observer, &[known], &mut cache).unwrap();
    end_tick(&mut world, &mut cache);
    let before = local(&world, observer, MobKind::Npc);

    let err = sync(&mut world, &encoder, observer, &[known, broken], &mut cache).unwrap_err();
    assert_eq!(
        err,
        CodecError::MissingDefinition {
            id: broken,
            definition: 99
        }
    );
    assert_eq!(local(&world, observer, MobKind::Npc), before);
}

#[test]
fn player_sync_starts_with_own_section() {
    let (mut world, observer) = world_with_observer();
    let other = world
        .register(
            offset(-1, 4),
            MobData::player(PlayerData::new("other", SessionId(2))),
        )
        .unwrap();
    let mut cache = BlockCache::new();

    let outcome = sync(
        &mut world,
        &encoder(SyncKind::Players),
        observer,
        &[observer, other],
        &mut cache,
    )
    .unwrap();
    let decoded = decode(outcome);
    assert_eq!(decoded.kind, SyncKind::Players);
    let own = decoded.own.unwrap();
    assert!(matches!(
        own.segment,
        MovementSegment::Teleport {
            frame_unchanged: false,
            local_x: 54,
            local_y: 50,
            ..
        }
    ));
    assert_eq!(decoded.additions.len(), 1);
    let addition = &decoded.additions[0];
    assert_eq!((addition.dx, addition.dy), (-1, 4));
    let blocks = addition.blocks.as_ref().unwrap();
    assert_eq!(blocks.mask, 0x10);
    assert!(matches!(
        &blocks.blocks[0],
        BlockData::PlayerAppearance(appearance) if appearance.name == "other"
    ));
}

#[test]
fn npcs_cannot_observe() {
    let (mut world, _) = world_with_observer();
    let npc = world.register(offset(1, 1), MobData::npc(1)).unwrap();
    let mut local = LocalViewSet::new();
    let err = encoder(SyncKind::Npcs)
        .encode(&world, npc, &mut local, &[], &mut BlockCache::new())
        .unwrap_err();
    assert_eq!(err, CodecError::UnknownObserver { id: npc });
}

#[test]
fn decoder_rejects_foreign_opcodes() {
    let view = FrameRef {
        opcode: 73,
        kind: wire::FrameKind::Fixed(4),
        payload: &[0, 0, 0, 0],
    };
    assert_eq!(
        decode_sync(&view, &Limits::default()),
        Err(CodecError::UnexpectedOpcode { opcode: 73 })
    );
}
