//! Items and inventories

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Everything a peon can carry or a stockpile can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Wood,
    Stone,
    Coal,
    IronOre,
    IronBar,
}

impl ItemKind {
    pub const ALL: [ItemKind; 5] = [
        ItemKind::Wood,
        ItemKind::Stone,
        ItemKind::Coal,
        ItemKind::IronOre,
        ItemKind::IronBar,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ItemKind::Wood => "wood",
            ItemKind::Stone => "stone",
            ItemKind::Coal => "coal",
            ItemKind::IronOre => "iron_ore",
            ItemKind::IronBar => "iron_bar",
        }
    }
}

/// Item-kind → count mapping, owned exclusively by one agent or one
/// stockpile-like entity.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    items: HashMap<ItemKind, u32>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn give(&mut self, item: ItemKind, quantity: u32) {
        if quantity > 0 {
            *self.items.entry(item).or_insert(0) += quantity;
        }
    }

    /// Removes `quantity` of `item`. Fails without changing anything if the
    /// inventory holds less than that.
    pub fn take(&mut self, item: ItemKind, quantity: u32) -> bool {
        match self.items.get_mut(&item) {
            Some(count) if *count >= quantity => {
                *count -= quantity;
                true
            }
            _ => false,
        }
    }

    /// Drains every unit of `item`, returning how many were held.
    pub fn take_all(&mut self, item: ItemKind) -> u32 {
        self.items.remove(&item).unwrap_or(0)
    }

    pub fn count(&self, item: ItemKind) -> u32 {
        self.items.get(&item).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.items.values().all(|count| *count == 0)
    }
}
