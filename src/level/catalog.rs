//! # Archetype Catalog
//!
//! Lookup from room type (or name) to the archetypes a level offers.

use super::{LevelDescription, RoomArchetype, RoomType};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::HashMap;

/// Index over a level's archetypes.
#[derive(Debug, Clone, Default)]
pub struct ArchetypeCatalog {
    archetypes: Vec<RoomArchetype>,
    by_type: HashMap<RoomType, Vec<usize>>,
}

impl ArchetypeCatalog {
    /// Builds a catalog from a list of archetypes.
    pub fn new(archetypes: Vec<RoomArchetype>) -> Self {
        let mut by_type: HashMap<RoomType, Vec<usize>> = HashMap::new();
        for (index, archetype) in archetypes.iter().enumerate() {
            by_type.entry(archetype.room_type).or_default().push(index);
        }
        Self { archetypes, by_type }
    }

    /// Builds a catalog from a level description.
    pub fn from_level(level: &LevelDescription) -> Self {
        Self::new(level.archetypes.clone())
    }

    /// Number of archetypes.
    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }

    /// All archetypes of one type, in declaration order.
    pub fn of_type(&self, room_type: RoomType) -> Vec<&RoomArchetype> {
        self.by_type
            .get(&room_type)
            .map(|indices| indices.iter().map(|&i| &self.archetypes[i]).collect())
            .unwrap_or_default()
    }

    /// Looks an archetype up by name.
    pub fn by_name(&self, name: &str) -> Option<&RoomArchetype> {
        self.archetypes.iter().find(|a| a.name == name)
    }

    /// Archetypes usable in the normal-room phase.
    pub fn fillers(&self) -> Vec<&RoomArchetype> {
        self.archetypes.iter().filter(|a| a.room_type.is_filler()).collect()
    }

    /// Picks an archetype of `room_type`.
    ///
    /// A designated name wins when it exists and has the right type;
    /// otherwise a random archetype of that type is chosen.
    pub fn pick(
        &self,
        room_type: RoomType,
        designated: Option<&str>,
        rng: &mut StdRng,
    ) -> Option<&RoomArchetype> {
        if let Some(archetype) = designated
            .and_then(|name| self.by_name(name))
            .filter(|a| a.room_type == room_type)
        {
            return Some(archetype);
        }

        self.of_type(room_type).choose(rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn catalog() -> ArchetypeCatalog {
        ArchetypeCatalog::new(vec![
            RoomArchetype::new("door", RoomType::Start, 2, 2),
            RoomArchetype::new("hall", RoomType::Normal, 3, 2),
            RoomArchetype::new("den", RoomType::Elite, 3, 3),
            RoomArchetype::new("lair", RoomType::Boss, 3, 3),
            RoomArchetype::new("throne", RoomType::Boss, 4, 4),
        ])
    }

    #[test]
    fn test_lookup_by_type_and_name() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog.of_type(RoomType::Boss).len(), 2);
        assert!(catalog.of_type(RoomType::Shop).is_empty());
        assert_eq!(catalog.by_name("hall").map(|a| a.room_type), Some(RoomType::Normal));
        assert!(catalog.by_name("nope").is_none());
        assert_eq!(catalog.fillers().len(), 2);
    }

    #[test]
    fn test_pick_prefers_designated() {
        let catalog = catalog();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            let boss = catalog.pick(RoomType::Boss, Some("throne"), &mut rng).unwrap();
            assert_eq!(boss.name, "throne");
        }

        // A designated name of the wrong type is ignored
        let start = catalog.pick(RoomType::Start, Some("throne"), &mut rng).unwrap();
        assert_eq!(start.name, "door");

        assert!(catalog.pick(RoomType::Secret, None, &mut rng).is_none());
    }
}
