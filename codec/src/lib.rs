//! Update blocks, movement segments and sync message encoding for mobsync.
//!
//! This crate turns the world's per-tick state into the bit-packed player
//! and npc synchronization messages the client reads, and reads them back.
//!
//! # Features
//!
//! - Static block tables with per-block writers and readers
//! - Mask-prefixed delta encoding from three perspectives
//! - Tick-scoped cache shared by every observer of a mob
//! - Movement segments with the type 3 split between teleport and drop
//! - Capped, transactional local view set maintenance
//!
//! # Design Principles
//!
//! - **Bit-exact** - Layouts, orders and caps follow the client.
//! - **No partial state** - A failed message leaves the local view set untouched.
//! - **Deterministic** - Same world and candidates produce the same bytes.
//!
//! # Example
//!
//! ```
//! use codec::{decode_sync, BlockCache, CodecLimits, SyncKind, SynchronizationEncoder};
//! use world::{
//!     DefinitionTable, MobData, MobKind, NpcDefinition, PlayerData, Position, SessionId,
//!     ViewabilityResolver, World,
//! };
//!
//! let definitions: DefinitionTable = [NpcDefinition {
//!     id: 1,
//!     name: "Man".into(),
//!     size: 1,
//!     combat_level: 2,
//! }]
//! .into_iter()
//! .collect();
//! let mut world = World::new(definitions);
//! let observer = world
//!     .register(Position::new(3222, 3218, 0), MobData::player(PlayerData::new("alice", SessionId(1))))
//!     .unwrap();
//! let npc = world.register(Position::new(3225, 3216, 0), MobData::npc(1)).unwrap();
//!
//! let encoder = SynchronizationEncoder::new(
//!     SyncKind::Npcs,
//!     ViewabilityResolver::new(15).unwrap(),
//!     CodecLimits::default(),
//!     wire::Limits::default(),
//! );
//! let mut local = world.take_local_view(observer, MobKind::Npc).unwrap();
//! let mut cache = BlockCache::new();
//! let outcome = encoder
//!     .encode(&world, observer, &mut local, &[npc], &mut cache)
//!     .unwrap();
//! assert!(local.contains(npc));
//!
//! let frame = outcome.into_frame().unwrap();
//! let bytes = frame.to_bytes();
//! let (view, _) = wire::decode_frame(&bytes, codec::frame_kind, &wire::Limits::default()).unwrap();
//! let decoded = decode_sync(&view, &wire::Limits::default()).unwrap();
//! assert_eq!(decoded.additions[0].dx, 3);
//! assert_eq!(decoded.additions[0].dy, -2);
//! ```

mod block_set;
mod blocks;
mod cache;
mod decode;
mod error;
mod limits;
mod movement;
mod protocol;
mod region;
mod sync;
mod types;

pub use block_set::{DecodedBlocks, UpdateBlockSet, MASK_ESCAPE, WIDE_MASK_THRESHOLD};
pub use blocks::{
    decode_base37, encode_base37, table_for, BlockContext, BlockData, BlockReader, BlockSpec,
    BlockTable, BlockWriter, PlayerAppearance, NPC_BLOCKS, PLAYER_BLOCKS,
};
pub use cache::BlockCache;
pub use decode::{decode_sync, DecodedAddition, DecodedEntry, DecodedSync};
pub use error::{CodecError, CodecResult, LimitKind};
pub use limits::CodecLimits;
pub use movement::{write_drop, write_teleport, MovementSegment};
pub use protocol::{
    frame_kind, SyncKind, ADDITION_TERMINATOR, NPC_SYNC_OPCODE, PLAYER_SYNC_OPCODE,
    REGION_CHANGE_OPCODE,
};
pub use region::RegionChangeMessage;
pub use sync::{SyncOutcome, SyncStats, SynchronizationEncoder};
pub use types::{Perspective, Tick};
pub use wire::Limits as WireLimits;
