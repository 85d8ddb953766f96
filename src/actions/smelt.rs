//! Converting ore to bars at a forge

use rand::Rng;

use crate::entity::EntityId;
use crate::inventory::ItemKind;
use crate::timer::Timer;

use super::{Action, ActionCtx, Step, WORK_RANGE};

const WORK_MIN_MS: f64 = 5000.0;
const WORK_MAX_MS: f64 = 10000.0;

/// Walk to a forge and convert carried iron ore into bars, one per dwell
/// cycle. Once the ore runs out the bars get deposited and the action
/// completes.
#[derive(Debug)]
pub(super) struct SmeltAction {
    forge: EntityId,
    work_ms: f64,
    timer: Timer,
    deposited: bool,
}

impl SmeltAction {
    pub(super) fn new(forge: EntityId) -> Self {
        Self {
            forge,
            work_ms: 0.0,
            timer: Timer::new(),
            deposited: false,
        }
    }

    pub(super) fn update(&mut self, ctx: &mut ActionCtx) -> Step {
        self.timer.advance(ctx.dt);

        let (forge_position, forge_center, forge_alive) = match ctx.world.entity(self.forge) {
            Some(entity) => (entity.position, entity.center(), entity.alive),
            None => return Step::Abort,
        };
        if !forge_alive {
            return Step::Abort;
        }

        let agent_center = match ctx.world.entity(ctx.agent) {
            Some(entity) => entity.center(),
            None => return Step::Abort,
        };
        if agent_center.distance(forge_center) > WORK_RANGE {
            return Step::Child(Action::move_within(forge_position, WORK_RANGE));
        }

        let (ore, bars) = match ctx.world.inventory(ctx.agent) {
            Some(inventory) => (
                inventory.count(ItemKind::IronOre),
                inventory.count(ItemKind::IronBar),
            ),
            None => return Step::Abort,
        };

        if ore == 0 {
            if !self.deposited && bars > 0 {
                self.deposited = true;
                return Step::Child(Action::deposit(ItemKind::IronBar, None));
            }
            return Step::Complete;
        }

        if !self.timer.is_started() {
            self.work_ms = ctx.rng.gen_range(WORK_MIN_MS..=WORK_MAX_MS);
            self.timer.start();
            return Step::Continue;
        }

        if self.timer.elapsed_ms() > self.work_ms {
            self.timer.stop();
            if let Some(inventory) = ctx.world.inventory_mut(ctx.agent) {
                if inventory.take(ItemKind::IronOre, 1) {
                    inventory.give(ItemKind::IronBar, 1);
                }
            }
            ctx.audio.play("smelting_00");
        }

        Step::Continue
    }
}
