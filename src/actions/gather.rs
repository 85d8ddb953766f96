//! Working a resource node

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::entity::EntityId;
use crate::inventory::ItemKind;
use crate::timer::Timer;
use crate::world::World;

use super::{Action, ActionCtx, Step, WORK_RANGE};

const WORK_MIN_MS: f64 = 5000.0;
const WORK_MAX_MS: f64 = 10000.0;
const YIELD_MIN: u32 = 1;
const YIELD_MAX: u32 = 3;

/// Repeatedly works a resource node: walk into range, dwell, strike, carry
/// the yield off to a stockpile, come back — until the node is exhausted.
///
/// Holds a worker slot on the node for its whole registered lifetime; the
/// slot is claimed at construction (see [`Action::gather`]) and released
/// exactly once, on completion.
#[derive(Debug)]
pub(super) struct GatherAction {
    target: EntityId,
    work_ms: f64,
    timer: Timer,
    /// Whether this action holds a worker slot on `target`. Guards release
    /// so it can never run twice.
    pub(super) registered: bool,
}

impl GatherAction {
    pub(super) fn new(target: EntityId) -> Self {
        Self {
            target,
            work_ms: 0.0,
            timer: Timer::new(),
            registered: false,
        }
    }

    pub(super) fn target(&self) -> EntityId {
        self.target
    }

    /// Gives the worker slot back. Idempotent; a no-op if this action never
    /// registered or already released.
    pub(super) fn release(&mut self, world: &mut World) {
        if self.registered {
            world.release_worker(self.target);
            self.registered = false;
        }
    }

    pub(super) fn update(&mut self, ctx: &mut ActionCtx) -> Step {
        self.timer.advance(ctx.dt);

        let (target_position, target_center, target_alive) = match ctx.world.entity(self.target) {
            Some(entity) => (entity.position, entity.center(), entity.alive),
            // The node is gone from under us. Abort; any registration was
            // already wound down when the node was reclaimed.
            None => return Step::Abort,
        };
        if !target_alive {
            // Someone else struck the final blow. Graceful exit releases
            // our slot.
            return Step::Complete;
        }
        let item = match ctx.world.resource(self.target) {
            Some(node) => node.item(),
            None => return Step::Abort,
        };

        let agent_center = match ctx.world.entity(ctx.agent) {
            Some(entity) => entity.center(),
            None => return Step::Abort,
        };
        if agent_center.distance(target_center) > WORK_RANGE {
            // Too far away. Walk over; we resume once the walk completes.
            return Step::Child(Action::move_to(target_position));
        }

        if !self.timer.is_started() {
            self.work_ms = ctx.rng.gen_range(WORK_MIN_MS..=WORK_MAX_MS);
            self.timer.start();
            return Step::Continue;
        }

        if self.timer.elapsed_ms() > self.work_ms {
            self.timer.stop();
            ctx.world.damage_resource(self.target);
            ctx.audio.play(&work_sound(item, ctx.rng));
            let quantity = ctx.rng.gen_range(YIELD_MIN..=YIELD_MAX);
            if let Some(inventory) = ctx.world.inventory_mut(ctx.agent) {
                inventory.give(item, quantity);
            }
            // Haul the yield off; gathering resumes when the deposit pops.
            return Step::Child(Action::deposit(item, None));
        }

        Step::Continue
    }
}

fn work_sound(item: ItemKind, rng: &mut ChaCha8Rng) -> String {
    let variant = rng.gen_range(0..3);
    match item {
        ItemKind::Wood => format!("woodcutting_{variant:02}"),
        _ => format!("mining_{variant:02}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::MemoryAudio;
    use crate::geometry::Vec2;
    use crate::terrain::TerrainGrid;
    use rand::SeedableRng;

    fn fixture() -> (World, ChaCha8Rng, MemoryAudio) {
        let world = World::new(TerrainGrid::generate(16, 16, false));
        (world, ChaCha8Rng::seed_from_u64(11), MemoryAudio::new())
    }

    #[test]
    fn test_out_of_range_walks_to_target() {
        let (mut world, mut rng, mut audio) = fixture();
        let agent = world.spawn_peon(1, Vec2::new(0.0, 0.0))[0];
        let node = world.spawn_resource(ItemKind::Wood, Vec2::new(300.0, 0.0), 3, 2);
        let mut action = GatherAction::new(node);

        let mut ctx = ActionCtx {
            world: &mut world,
            rng: &mut rng,
            audio: &mut audio,
            agent,
            dt: 0.1,
        };
        match action.update(&mut ctx) {
            Step::Child(child) => assert_eq!(child.name(), "Move"),
            _ => panic!("expected a walk toward the node"),
        }
    }

    #[test]
    fn test_dwell_then_strike_yields_and_deposits() {
        let (mut world, mut rng, mut audio) = fixture();
        let agent = world.spawn_peon(1, Vec2::new(100.0, 100.0))[0];
        let node = world.spawn_resource(ItemKind::Wood, Vec2::new(110.0, 100.0), 3, 2);
        let mut action = GatherAction::new(node);

        // First in-range tick arms the dwell timer.
        let mut ctx = ActionCtx {
            world: &mut world,
            rng: &mut rng,
            audio: &mut audio,
            agent,
            dt: 0.1,
        };
        assert!(matches!(action.update(&mut ctx), Step::Continue));
        assert!(action.timer.is_started());
        assert!(action.work_ms >= WORK_MIN_MS && action.work_ms <= WORK_MAX_MS);

        // Push the timer past any possible draw in one go.
        let mut ctx = ActionCtx {
            world: &mut world,
            rng: &mut rng,
            audio: &mut audio,
            agent,
            dt: 11.0,
        };
        let step = action.update(&mut ctx);
        match step {
            Step::Child(child) => assert_eq!(child.name(), "Deposit"),
            _ => panic!("expected a deposit after the strike"),
        }

        let carried = world
            .inventory(agent)
            .map(|inv| inv.count(ItemKind::Wood))
            .unwrap();
        assert!((1..=3).contains(&carried));
        assert_eq!(world.resource(node).map(|n| n.remaining_hits()), Some(2));
        assert_eq!(audio.played.len(), 1);
        assert!(audio.played[0].starts_with("woodcutting_"));
    }

    #[test]
    fn test_dead_target_completes_gracefully() {
        let (mut world, mut rng, mut audio) = fixture();
        let agent = world.spawn_peon(1, Vec2::new(100.0, 100.0))[0];
        let node = world.spawn_resource(ItemKind::Stone, Vec2::new(110.0, 100.0), 1, 1);

        let mut action = Action::gather(&mut world, node);
        assert!(!action.is_complete());

        // Another strike exhausts the node before our dwell finishes.
        world.damage_resource(node);

        let mut ctx = ActionCtx {
            world: &mut world,
            rng: &mut rng,
            audio: &mut audio,
            agent,
            dt: 0.1,
        };
        action.update(&mut ctx);
        assert!(action.is_complete());
        assert_eq!(world.resource(node).map(|n| n.workers()), Some(0));
    }

    #[test]
    fn test_mining_sound_for_non_wood() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert!(work_sound(ItemKind::IronOre, &mut rng).starts_with("mining_"));
        assert!(work_sound(ItemKind::Wood, &mut rng).starts_with("woodcutting_"));
    }
}
