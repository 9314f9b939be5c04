//! Static npc definitions.

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NpcDefinition {
    pub id: u16,
    pub name: String,
    /// Side length in tiles.
    pub size: u8,
    pub combat_level: u8,
}

/// Npc definitions by id.
///
/// With the `serde` feature the table (de)serializes as a list of definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "Vec<NpcDefinition>", into = "Vec<NpcDefinition>")
)]
pub struct DefinitionTable {
    definitions: HashMap<u16, NpcDefinition>,
}

impl DefinitionTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the definition with the same id.
    pub fn insert(&mut self, definition: NpcDefinition) -> Option<NpcDefinition> {
        self.definitions.insert(definition.id, definition)
    }

    #[must_use]
    pub fn get(&self, id: u16) -> Option<&NpcDefinition> {
        self.definitions.get(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NpcDefinition> {
        self.definitions.values()
    }
}

impl FromIterator<NpcDefinition> for DefinitionTable {
    fn from_iter<I: IntoIterator<Item = NpcDefinition>>(iter: I) -> Self {
        let mut table = Self::new();
        for definition in iter {
            table.insert(definition);
        }
        table
    }
}

impl From<Vec<NpcDefinition>> for DefinitionTable {
    fn from(definitions: Vec<NpcDefinition>) -> Self {
        definitions.into_iter().collect()
    }
}

impl From<DefinitionTable> for Vec<NpcDefinition> {
    fn from(table: DefinitionTable) -> Self {
        let mut definitions: Self = table.definitions.into_values().collect();
        definitions.sort_by_key(|definition| definition.id);
        definitions
    }
}
