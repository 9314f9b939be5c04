//! Tick-scoped arena of encoded update blocks.

use std::collections::HashMap;
use std::ops::Range;

use world::MobId;

/// Encoded "maintain existing" block bytes, keyed by mob.
///
/// Entries are written by the first observer that needs a mob's blocks in a
/// tick and read verbatim by every later one. [`reset`](Self::reset) must run
/// at tick end, after flags are cleared.
#[derive(Debug, Default)]
pub struct BlockCache {
    arena: Vec<u8>,
    entries: HashMap<MobId, Range<usize>>,
    hits: usize,
}

impl BlockCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: MobId) -> Option<&[u8]> {
        self.entries
            .get(&id)
            .and_then(|range| self.arena.get(range.clone()))
    }

    /// Stores bytes for `id`. An existing entry is kept.
    pub fn insert(&mut self, id: MobId, bytes: &[u8]) {
        if self.entries.contains_key(&id) {
            return;
        }
        let start = self.arena.len();
        self.arena.extend_from_slice(bytes);
        self.entries.insert(id, start..self.arena.len());
    }

    /// Number of cached mobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bytes held by the arena.
    #[must_use]
    pub fn arena_bytes(&self) -> usize {
        self.arena.len()
    }

    /// Reads served from the arena since the last reset.
    #[must_use]
    pub const fn hits(&self) -> usize {
        self.hits
    }

    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Drops every entry, keeping the allocation.
    pub fn reset(&mut self) {
        self.arena.clear();
        self.entries.clear();
        self.hits = 0;
    }
}
