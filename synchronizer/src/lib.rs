//! Per-tick update pass for mobsync.
//!
//! The [`Synchronizer`] is called once per tick, after gameplay has mutated
//! the [`World`](world::World). It gathers each player's candidates from the
//! regions around them, orders admissions, builds the sync messages with
//! `codec`, and queues them on a [`Transport`].
//!
//! # Design Principles
//!
//! - **One pass per tick** - Pre, sync and post phases run back to back on
//!   one thread and never block.
//! - **Observer isolation** - A failing observer is logged and skipped; its
//!   local view sets are left as they were.
//! - **Single flush** - Every session is flushed at most once per tick.
//!
//! # Example
//!
//! ```
//! use synchronizer::{MemoryTransport, SyncConfig, Synchronizer};
//! use world::{DefinitionTable, MobData, PlayerData, Position, SessionId, SessionStatus, World};
//!
//! let mut world = World::new(DefinitionTable::new());
//! let alice = world
//!     .register(Position::new(3222, 3218, 0), MobData::player(PlayerData::new("alice", SessionId(1))))
//!     .unwrap();
//! world.mob_mut(alice).unwrap().player_mut().unwrap().session.status = SessionStatus::Active;
//!
//! let mut sync = Synchronizer::new(SyncConfig::default()).unwrap();
//! let mut transport = MemoryTransport::new();
//! let report = sync.run_tick(&mut world, &mut transport);
//!
//! assert_eq!(report.observers, 1);
//! assert_eq!(report.region_changes, 1);
//! assert_eq!(transport.delivered(SessionId(1)).len(), 2);
//! ```

mod candidates;
mod config;
mod driver;
mod error;
mod priority;
mod transport;

pub use candidates::{admission_order, gather_candidates};
pub use config::{ConfigError, SyncConfig};
pub use driver::{ObserverFailure, Synchronizer, TickReport};
pub use error::{SyncError, SyncResult};
pub use priority::PriorityOrdering;
pub use transport::{MemoryTransport, Transport, TransportError};
