//! Walking from here to there

use rand::Rng;

use crate::entity::EntityId;
use crate::geometry::Vec2;

use super::{ActionCtx, Step};

const HOP_AMPLITUDE: f64 = 6.0;
const HOP_FREQUENCY: f64 = 15.0;
const HOP_FREQUENCY_JITTER: f64 = 3.0;

/// Straight-line walk toward a destination, with an optional follow target
/// that refreshes the destination every tick (pursuit). The hop is a purely
/// cosmetic draw offset; arrival is governed by the range and the
/// overshoot snap alone.
#[derive(Debug)]
pub(super) struct MoveAction {
    destination: Vec2,
    follow: Option<EntityId>,
    range: f64,
    hop_phase: f64,
    hop_frequency: f64,
    jittered: bool,
}

impl MoveAction {
    pub(super) fn new(destination: Vec2, range: f64) -> Self {
        Self {
            destination,
            follow: None,
            range,
            hop_phase: 0.0,
            hop_frequency: HOP_FREQUENCY,
            jittered: false,
        }
    }

    pub(super) fn pursue(target: EntityId, range: f64) -> Self {
        Self {
            follow: Some(target),
            ..Self::new(Vec2::ZERO, range)
        }
    }

    pub(super) fn update(&mut self, ctx: &mut ActionCtx) -> Step {
        // Pursuit: chase the target's current position. A vanished target
        // leaves the last known destination in place.
        if let Some(target) = self.follow {
            if let Some(entity) = ctx.world.entity(target) {
                self.destination = entity.position;
            }
        }

        if !self.jittered {
            self.jittered = true;
            self.hop_frequency += ctx
                .rng
                .gen_range(-HOP_FREQUENCY_JITTER..=HOP_FREQUENCY_JITTER);
        }
        self.hop_phase += ctx.dt;
        let hop = (self.hop_phase * self.hop_frequency).sin().abs() * HOP_AMPLITUDE;
        ctx.world
            .set_draw_offset(ctx.agent, Vec2::new(0.0, -hop));

        let start = match ctx.world.entity(ctx.agent) {
            Some(entity) => entity.position,
            None => return Step::Abort,
        };
        let speed = ctx.world.agent_speed(ctx.agent);

        let remaining = start.distance(self.destination);
        let direction = (self.destination - start).normalized();
        let mut next = start + direction * (speed * ctx.dt);

        let mut arrived = next.distance(self.destination) <= self.range;
        // Overshoot: the step was longer than the distance left, so snap
        // onto the destination instead of sailing past it.
        if start.distance(next) > remaining {
            next = self.destination;
            arrived = true;
        }

        ctx.world.set_position(ctx.agent, next);
        if arrived {
            Step::Complete
        } else {
            Step::Continue
        }
    }
}
