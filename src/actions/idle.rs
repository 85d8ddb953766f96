//! The default resting behavior

use rand::Rng;

use crate::geometry::Vec2;
use crate::timer::Timer;

use super::{Action, ActionCtx, Step};

const WAIT_MIN_MS: f64 = 1000.0;
const WAIT_MAX_MS: f64 = 10000.0;

/// Largest wander step per axis, in world units.
const WANDER_RADIUS: f64 = 32.0;

/// Wait a randomly drawn while, then wander one short step to a passable
/// point nearby. Never completes itself: idling is the resting state an
/// agent falls back to, evicted only by an external push or clear.
#[derive(Debug)]
pub(super) struct IdleAction {
    wait_ms: f64,
    timer: Timer,
}

impl IdleAction {
    pub(super) fn new() -> Self {
        Self {
            wait_ms: 0.0,
            timer: Timer::new(),
        }
    }

    pub(super) fn update(&mut self, ctx: &mut ActionCtx) -> Step {
        self.timer.advance(ctx.dt);

        if !self.timer.is_started() {
            self.wait_ms = ctx.rng.gen_range(WAIT_MIN_MS..=WAIT_MAX_MS);
            self.timer.start();
            return Step::Continue;
        }

        if self.timer.elapsed_ms() > self.wait_ms {
            self.timer.stop();

            let offset = Vec2::new(
                ctx.rng.gen_range(-WANDER_RADIUS..=WANDER_RADIUS),
                ctx.rng.gen_range(-WANDER_RADIUS..=WANDER_RADIUS),
            );
            let position = match ctx.world.entity(ctx.agent) {
                Some(entity) => entity.position,
                None => return Step::Abort,
            };
            let destination = position + offset;
            if ctx.world.is_passable(destination) {
                return Step::Child(Action::move_to(destination));
            }
            // Impassable draw: stay idle; the stopped timer means a fresh
            // wait gets drawn next tick.
        }

        Step::Continue
    }
}
