use bitstream::{BitReader, BitWriter};
use codec::{
    BlockContext, MovementSegment, Perspective, UpdateBlockSet, MASK_ESCAPE, NPC_BLOCKS,
    PLAYER_BLOCKS,
};
use proptest::prelude::*;
use wire::{ByteReader, ByteWriter, Limits};
use world::{
    Animation, ChatMessage, DefinitionTable, Direction, ForcedMovement, Graphic, Hit, HitKind,
    InteractionTarget, Mob, MobData, MobId, NpcDefinition, PlayerData, Position, SessionId,
};

fn direction() -> impl Strategy<Value = Direction> {
    (0..8u8).prop_map(|id| Direction::from_id(id).unwrap())
}

fn own_segment() -> impl Strategy<Value = MovementSegment> {
    prop_oneof![
        (0..4u8, any::<bool>(), any::<bool>(), 0..104u8, 0..104u8).prop_map(
            |(plane, frame_unchanged, pending, local_x, local_y)| MovementSegment::Teleport {
                plane,
                frame_unchanged,
                pending,
                local_x,
                local_y,
            }
        ),
        (direction(), direction(), any::<bool>())
            .prop_map(|(walk, run, pending)| MovementSegment::Run { walk, run, pending }),
        (direction(), any::<bool>())
            .prop_map(|(direction, pending)| MovementSegment::Walk { direction, pending }),
        any::<bool>().prop_map(|pending| MovementSegment::Stationary { pending }),
    ]
}

#[derive(Debug, Clone)]
struct Updates {
    animation: Option<(u16, u8)>,
    graphic: Option<(u16, u16, u16)>,
    hits: Vec<(u8, u8, u8)>,
    forced_chat: Option<String>,
    chat: Option<Vec<u8>>,
    interacting: Option<u16>,
    face: Option<(u16, u16)>,
    transform: bool,
    appearance: bool,
    forced_movement: Option<(i8, i8, Direction)>,
}

fn updates() -> impl Strategy<Value = Updates> {
    (
        proptest::option::of((any::<u16>(), any::<u8>())),
        proptest::option::of((any::<u16>(), any::<u16>(), any::<u16>())),
        prop::collection::vec((any::<u8>(), any::<u8>(), any::<u8>()), 0..3),
        proptest::option::of("[a-zA-Z ]{0,20}"),
        proptest::option::of(prop::collection::vec(any::<u8>(), 0..40)),
        proptest::option::of(0..2000u16),
        proptest::option::of((0..20000u16, 0..20000u16)),
        any::<bool>(),
        any::<bool>(),
        proptest::option::of((any::<i8>(), any::<i8>(), direction())),
    )
        .prop_map(
            |(
                animation,
                graphic,
                hits,
                forced_chat,
                chat,
                interacting,
                face,
                transform,
                appearance,
                forced_movement,
            )| Updates {
                animation,
                graphic,
                hits,
                forced_chat,
                chat,
                interacting,
                face,
                transform,
                appearance,
                forced_movement,
            },
        )
}

fn apply(mob: &mut Mob, updates: &Updates) {
    if let Some((id, delay)) = updates.animation {
        mob.play_animation(Animation { id, delay });
    }
    if let Some((id, height, delay)) = updates.graphic {
        mob.play_graphic(Graphic { id, height, delay });
    }
    for &(damage, current_health, max_health) in &updates.hits {
        mob.hit(Hit {
            damage,
            kind: HitKind::Normal,
            current_health,
            max_health,
        });
    }
    if let Some(text) = &updates.forced_chat {
        mob.force_chat(text.clone());
    }
    if let Some(text) = &updates.chat {
        mob.say(ChatMessage {
            text: text.clone(),
            color: 1,
            effects: 2,
        });
    }
    if let Some(index) = updates.interacting {
        mob.interact(InteractionTarget::Mob(MobId::player(index)));
    }
    if let Some((x, y)) = updates.face {
        mob.face(Position::new(x, y, 0));
    }
    if updates.transform {
        mob.transform(1);
    }
    if updates.appearance {
        mob.update_appearance();
    }
    if let Some((dx, dy, direction)) = updates.forced_movement {
        mob.force_move(ForcedMovement {
            start: (0, 0),
            end: (dx, dy),
            start_ticks: 10,
            end_ticks: 30,
            direction,
        });
    }
}

fn definitions() -> DefinitionTable {
    [NpcDefinition {
        id: 1,
        name: "Goblin".to_string(),
        size: 1,
        combat_level: 5,
    }]
    .into_iter()
    .collect()
}

proptest! {
    #[test]
    fn movement_segments_roundtrip(segments in prop::collection::vec(own_segment(), 1..32)) {
        // Teleports only decode in the observer's own section, so write one
        // segment per buffer.
        for segment in segments {
            let mut bits = BitWriter::new();
            segment.write(&mut bits).unwrap();
            let bytes = bits.finish();
            let mut reader = BitReader::new(&bytes);
            prop_assert_eq!(MovementSegment::read_self(&mut reader).unwrap(), segment);
            prop_assert!(reader.bits_remaining() < 8);
        }
    }

    #[test]
    fn entry_segments_roundtrip_back_to_back(
        segments in prop::collection::vec(own_segment(), 0..64)
    ) {
        let segments: Vec<_> = segments
            .into_iter()
            .map(|segment| match segment {
                MovementSegment::Teleport { .. } => MovementSegment::Drop,
                other => other,
            })
            .collect();
        let mut bits = BitWriter::new();
        for segment in &segments {
            segment.write(&mut bits).unwrap();
        }
        let bytes = bits.finish();
        let mut reader = BitReader::new(&bytes);
        for segment in &segments {
            prop_assert_eq!(&MovementSegment::read_entry(&mut reader).unwrap(), segment);
        }
    }

    #[test]
    fn mask_matches_active_blocks_and_decodes(updates in updates(), perspective in 0..3u8) {
        let perspective = match perspective {
            0 => Perspective::SelfView,
            1 => Perspective::AddNew,
            _ => Perspective::MaintainExisting,
        };
        let definitions = definitions();
        let ctx = BlockContext::new(&definitions);

        let mut npc = Mob::new(1, Position::new(3200, 3200, 0), MobData::npc(1));
        let mut player = Mob::new(
            1,
            Position::new(3200, 3200, 0),
            MobData::player(PlayerData::new("prop", SessionId(1))),
        );
        apply(&mut npc, &updates);
        apply(&mut player, &updates);

        for (mob, set) in [
            (&npc, UpdateBlockSet::new(&NPC_BLOCKS)),
            (&player, UpdateBlockSet::new(&PLAYER_BLOCKS)),
        ] {
            let expected = set
                .table()
                .blocks()
                .iter()
                .filter(|spec| {
                    let forced = perspective == Perspective::AddNew
                        && spec.flag == world::UpdateFlag::Appearance;
                    let suppressed = perspective == Perspective::SelfView
                        && spec.flag == world::UpdateFlag::Chat;
                    forced || (mob.flags().get(spec.flag) && !suppressed)
                })
                .fold(0u16, |mask, spec| mask | spec.mask);
            prop_assert_eq!(set.mask(mob, perspective), expected);

            let mut out = ByteWriter::new();
            set.encode(mob, perspective, &ctx, &mut out).unwrap();
            let bytes = out.into_vec();
            prop_assert_eq!(bytes[0] & MASK_ESCAPE as u8 != 0, expected >= 0x100);

            let mut reader = ByteReader::new(&bytes);
            let decoded = set.decode(&mut reader, &Limits::unlimited()).unwrap();
            prop_assert!(reader.is_empty());
            prop_assert_eq!(decoded.mask, expected);
            prop_assert_eq!(decoded.blocks.len(), expected.count_ones() as usize);
        }
    }
}
