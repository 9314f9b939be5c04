//! World state for the mobsync protocol.
//!
//! This crate owns the server-side model the synchronization pass reads:
//! mobs and their per-tick update flags, the spatial index that buckets them
//! into regions, the viewability rules, each observer's local view sets and
//! the static npc definitions. It knows nothing about bits or frames.
//!
//! # Example
//!
//! ```
//! use world::{DefinitionTable, MobData, MobKind, Position, ViewabilityResolver, World};
//!
//! let mut world = World::new(DefinitionTable::new());
//! let npc = world.register(Position::new(3222, 3218, 0), MobData::npc(1)).unwrap();
//!
//! let resolver = ViewabilityResolver::new(15).unwrap();
//! let observer = Position::new(3220, 3220, 0);
//! let visible: Vec<_> = resolver
//!     .regions(observer)
//!     .into_iter()
//!     .filter_map(|coords| world.regions().get(coords))
//!     .flat_map(|region| region.members(MobKind::Npc))
//!     .collect();
//! assert_eq!(visible, vec![npc]);
//! ```

mod block;
mod definition;
mod error;
mod flags;
mod local;
mod mob;
mod position;
mod region;
mod repository;
mod viewability;
mod world;

pub use block::{
    Animation, BlockState, ChatMessage, ForcedMovement, Graphic, Hit, HitKind, InteractionTarget,
};
pub use definition::{DefinitionTable, NpcDefinition};
pub use error::{WorldError, WorldResult};
pub use flags::{UpdateFlag, UpdateFlagSet};
pub use local::{LocalViewSet, MAX_LOCAL_MOBS};
pub use mob::{
    Appearance, Gender, Mob, MobData, MobId, MobKind, NpcData, PlayerData, Privilege, Session,
    SessionId, SessionStatus, MAX_MOB_INDEX,
};
pub use position::{
    CoordinateFrame, Direction, Position, RegionCoordinates, CHUNK_SIZE, FRAME_MARGIN,
    FRAME_SIZE, PLANE_COUNT, REGION_SIZE,
};
pub use region::{Region, RegionRepository};
pub use repository::MobRepository;
pub use viewability::{ViewabilityResolver, MAX_VIEWING_DISTANCE};
pub use world::World;
