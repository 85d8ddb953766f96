//! Carrying items to a stockpile

use rand::Rng;

use crate::entity::{EntityId, EntityKind};
use crate::inventory::ItemKind;

use super::{Action, ActionCtx, Step, WORK_RANGE};

/// Walk to the nearest stockpile and hand over carried items. A quantity of
/// `None` transfers every unit of the item the agent holds.
#[derive(Debug)]
pub(super) struct DepositAction {
    item: ItemKind,
    quantity: Option<u32>,
    destination: Option<EntityId>,
}

impl DepositAction {
    pub(super) fn new(item: ItemKind, quantity: Option<u32>) -> Self {
        Self {
            item,
            quantity,
            destination: None,
        }
    }

    pub(super) fn update(&mut self, ctx: &mut ActionCtx) -> Step {
        let agent_center = match ctx.world.entity(ctx.agent) {
            Some(entity) => entity.center(),
            None => return Step::Abort,
        };

        // Resolve the destination once, to the stockpile nearest the agent
        // at the time the deposit starts.
        if self.destination.is_none() {
            self.destination = ctx
                .world
                .nearest_entity(Some(EntityKind::Stockpile), agent_center);
        }
        let destination = match self.destination {
            Some(id) => id,
            // Nowhere to put anything.
            None => return Step::Abort,
        };

        let (dest_position, dest_center, dest_alive) = match ctx.world.entity(destination) {
            Some(entity) => (entity.position, entity.center(), entity.alive),
            None => return Step::Abort,
        };
        if !dest_alive {
            return Step::Abort;
        }

        if agent_center.distance(dest_center) > WORK_RANGE {
            return Step::Child(Action::move_within(dest_position, WORK_RANGE));
        }

        // In range: move the items across in one go.
        if ctx.world.inventory(destination).is_none() {
            return Step::Abort;
        }
        let moved = match ctx.world.inventory_mut(ctx.agent) {
            Some(inventory) => match self.quantity {
                None => inventory.take_all(self.item),
                Some(wanted) => {
                    let available = inventory.count(self.item);
                    let taking = wanted.min(available);
                    inventory.take(self.item, taking);
                    taking
                }
            },
            None => 0,
        };
        if moved > 0 {
            if let Some(stock) = ctx.world.inventory_mut(destination) {
                stock.give(self.item, moved);
            }
            let variant = ctx.rng.gen_range(0..2);
            ctx.audio.play(&format!("drop_{variant:02}"));
        }
        Step::Complete
    }
}
