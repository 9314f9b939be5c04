//! Simulation and inspection tools for mobsync.
//!
//! - Generate a seeded world, run it through the synchronizer and summarise
//!   the traffic against a naive full-state baseline
//! - Dump the frames each session received
//! - Decode dumped frames back into movement, additions and update blocks
//!
//! # Design Principles
//!
//! - **Reproducible** - A seed fully determines a simulation run.
//! - **Human-readable output** - Make it easy to see what the encoder sent.

pub mod inspect;
pub mod logging;
pub mod scenario;
pub mod simulate;

pub use inspect::{format_pretty, inspect_frames, FrameBody, InspectReport};
pub use scenario::{default_definitions, Scenario, ScenarioConfig};
pub use simulate::{simulate, write_summary, Summary};
