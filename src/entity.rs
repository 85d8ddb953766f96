//! Entities and the generational entity table
//!
//! Every world object lives in one [`EntityTable`] slot and is referred to
//! by a generational [`EntityId`]. Reclaiming an entity bumps its slot
//! generation, so a stale id held by a behavior simply fails to resolve
//! instead of dangling.

use serde::{Deserialize, Serialize};

use crate::geometry::{Rect, Vec2};

/// Identity tag carried by every entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Peon,
    Orc,
    Tree,
    Rock,
    Stockpile,
    Forge,
    Obelisk,
}

impl EntityKind {
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Peon => "peon",
            EntityKind::Orc => "orc",
            EntityKind::Tree => "tree",
            EntityKind::Rock => "rock",
            EntityKind::Stockpile => "stockpile",
            EntityKind::Forge => "forge",
            EntityKind::Obelisk => "obelisk",
        }
    }
}

/// Generational handle into the entity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

impl EntityId {
    pub fn index(self) -> u32 {
        self.index
    }
}

/// Base state every entity carries regardless of kind.
#[derive(Debug, Clone)]
pub struct Entity {
    pub kind: EntityKind,
    pub position: Vec2,
    /// Hit box relative to `position`.
    pub hit_box: Rect,
    /// Cosmetic draw offset (movement hop). Never affects queries.
    pub draw_offset: Vec2,
    pub alive: bool,
}

impl Entity {
    pub fn new(kind: EntityKind, position: Vec2, hit_box: Rect) -> Self {
        Self {
            kind,
            position,
            hit_box,
            draw_offset: Vec2::ZERO,
            alive: true,
        }
    }

    /// Hit box translated into world space.
    pub fn hit_box_world(&self) -> Rect {
        self.hit_box.offset(self.position)
    }

    pub fn center(&self) -> Vec2 {
        self.hit_box_world().center()
    }
}

struct Slot {
    generation: u32,
    entity: Option<Entity>,
}

/// Slot arena with stable iteration order.
///
/// Iteration follows insertion (spawn) order, which is what gives the
/// world's "first found" queries their documented tie-break.
#[derive(Default)]
pub struct EntityTable {
    slots: Vec<Slot>,
    order: Vec<EntityId>,
    free: Vec<u32>,
}

impl EntityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity: Entity) -> EntityId {
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.entity = Some(entity);
                EntityId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    entity: Some(entity),
                });
                EntityId {
                    index,
                    generation: 0,
                }
            }
        };
        self.order.push(id);
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entity.as_ref()
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entity.as_mut()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Frees the slot and bumps its generation so the id goes stale.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let entity = slot.entity.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.order.retain(|other| *other != id);
        Some(entity)
    }

    /// Live entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.order
            .iter()
            .filter_map(move |id| self.get(*id).map(|entity| (*id, entity)))
    }

    /// Ids of live entities in insertion order.
    pub fn ids(&self) -> Vec<EntityId> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(kind: EntityKind) -> Entity {
        Entity::new(kind, Vec2::ZERO, Rect::new(-16.0, -16.0, 32.0, 32.0))
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut table = EntityTable::new();
        let id = table.insert(entity(EntityKind::Tree));
        assert!(table.contains(id));
        assert_eq!(table.get(id).map(|e| e.kind), Some(EntityKind::Tree));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_stale_id_misses_after_slot_reuse() {
        let mut table = EntityTable::new();
        let first = table.insert(entity(EntityKind::Tree));
        table.remove(first);
        let second = table.insert(entity(EntityKind::Rock));

        // Same slot, new generation: the old id must not resolve.
        assert_eq!(first.index(), second.index());
        assert!(table.get(first).is_none());
        assert_eq!(table.get(second).map(|e| e.kind), Some(EntityKind::Rock));
    }

    #[test]
    fn test_iteration_preserves_insertion_order() {
        let mut table = EntityTable::new();
        table.insert(entity(EntityKind::Tree));
        table.insert(entity(EntityKind::Rock));
        table.insert(entity(EntityKind::Peon));
        let kinds: Vec<EntityKind> = table.iter().map(|(_, e)| e.kind).collect();
        assert_eq!(
            kinds,
            vec![EntityKind::Tree, EntityKind::Rock, EntityKind::Peon]
        );
    }

    #[test]
    fn test_double_remove_is_noop() {
        let mut table = EntityTable::new();
        let id = table.insert(entity(EntityKind::Orc));
        assert!(table.remove(id).is_some());
        assert!(table.remove(id).is_none());
        assert!(table.is_empty());
    }
}
