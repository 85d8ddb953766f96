//! Agent behaviors
//!
//! Each behavior is one variant of the closed [`Action`] enum, and every
//! agent owns an [`ActionStack`] of them. The stack is a push-down
//! automaton: pushing a child suspends the current behavior untouched, and
//! the child's completion pops it and resumes the parent on the following
//! tick. Exactly one action runs per agent per tick.

mod deposit;
mod gather;
mod idle;
mod movement;
mod smelt;

use rand_chacha::ChaCha8Rng;

use crate::audio::Audio;
use crate::entity::EntityId;
use crate::geometry::Vec2;
use crate::inventory::ItemKind;
use crate::world::World;

use deposit::DepositAction;
use gather::GatherAction;
use idle::IdleAction;
use movement::MoveAction;
use smelt::SmeltAction;

/// How close an agent must be, center to center, to work an entity
/// (gathering, depositing, smelting).
pub const WORK_RANGE: f64 = 48.0;

/// Everything a behavior may touch during one tick.
pub struct ActionCtx<'a> {
    pub world: &'a mut World,
    pub rng: &'a mut ChaCha8Rng,
    pub audio: &'a mut dyn Audio,
    /// The agent whose stack is being ticked.
    pub agent: EntityId,
    /// Elapsed simulated seconds since the previous tick.
    pub dt: f64,
}

/// What a behavior decided to do with its tick.
pub(crate) enum Step {
    /// Keep running next tick.
    Continue,
    /// Suspend and hand control to a child behavior.
    Child(Action),
    /// Done; run completion side effects.
    Complete,
    /// Done; skip completion side effects.
    Abort,
}

#[derive(Debug)]
enum ActionKind {
    Idle(IdleAction),
    Move(MoveAction),
    Gather(GatherAction),
    Deposit(DepositAction),
    Smelt(SmeltAction),
}

/// One unit of agent behavior with its own update/completion lifecycle.
#[derive(Debug)]
pub struct Action {
    kind: ActionKind,
    finished: bool,
}

impl Action {
    /// The default resting behavior: wait a while, wander a short step.
    pub fn idle() -> Action {
        Action {
            kind: ActionKind::Idle(IdleAction::new()),
            finished: false,
        }
    }

    /// Walk to a fixed point, completing on exact arrival.
    pub fn move_to(destination: Vec2) -> Action {
        Action {
            kind: ActionKind::Move(MoveAction::new(destination, 0.0)),
            finished: false,
        }
    }

    /// Walk until within `range` of a fixed point.
    pub fn move_within(destination: Vec2, range: f64) -> Action {
        Action {
            kind: ActionKind::Move(MoveAction::new(destination, range)),
            finished: false,
        }
    }

    /// Chase an entity, re-reading its position every tick. If the target
    /// disappears the walk continues to its last known position.
    pub fn pursue(target: EntityId, range: f64) -> Action {
        Action {
            kind: ActionKind::Move(MoveAction::pursue(target, range)),
            finished: false,
        }
    }

    /// Work a resource node until it is exhausted.
    ///
    /// Claims a worker slot up front. When the target is missing, dead, or
    /// already at its worker cap, the action is born already-complete and
    /// holds no slot — check [`Action::is_complete`] after constructing.
    pub fn gather(world: &mut World, target: EntityId) -> Action {
        let mut state = GatherAction::new(target);
        let viable = world.entity(target).map_or(false, |entity| entity.alive)
            && world.resource(target).map_or(false, |node| !node.is_full());
        let registered = viable && world.try_register_worker(target);
        state.registered = registered;
        Action {
            kind: ActionKind::Gather(state),
            finished: !registered,
        }
    }

    /// Carry items to the nearest stockpile. `quantity` of `None` means
    /// every unit of `item` the agent holds.
    pub fn deposit(item: ItemKind, quantity: Option<u32>) -> Action {
        Action {
            kind: ActionKind::Deposit(DepositAction::new(item, quantity)),
            finished: false,
        }
    }

    /// Convert carried iron ore into bars at a forge, then deposit them.
    pub fn smelt(forge: EntityId) -> Action {
        Action {
            kind: ActionKind::Smelt(SmeltAction::new(forge)),
            finished: false,
        }
    }

    /// Diagnostic name of the behavior variant.
    pub fn name(&self) -> &'static str {
        match &self.kind {
            ActionKind::Idle(_) => "Idle",
            ActionKind::Move(_) => "Move",
            ActionKind::Gather(_) => "Gather",
            ActionKind::Deposit(_) => "Deposit",
            ActionKind::Smelt(_) => "Smelt",
        }
    }

    pub fn is_complete(&self) -> bool {
        self.finished
    }

    /// Runs one tick of this behavior. Returns a child behavior to push, if
    /// the behavior suspended itself. Updating an already-complete action
    /// has no effect.
    pub fn update(&mut self, ctx: &mut ActionCtx) -> Option<Action> {
        if self.finished {
            return None;
        }
        let step = match &mut self.kind {
            ActionKind::Idle(action) => action.update(ctx),
            ActionKind::Move(action) => action.update(ctx),
            ActionKind::Gather(action) => action.update(ctx),
            ActionKind::Deposit(action) => action.update(ctx),
            ActionKind::Smelt(action) => action.update(ctx),
        };
        match step {
            Step::Continue => None,
            Step::Child(child) => Some(child),
            Step::Complete => {
                self.complete(ctx.world, ctx.agent);
                None
            }
            Step::Abort => {
                self.abort(ctx.world, ctx.agent);
                None
            }
        }
    }

    /// Normal, side-effecting exit: a gather releases its worker slot, a
    /// move clears the agent's draw offset. Idempotent.
    pub fn complete(&mut self, world: &mut World, agent: EntityId) {
        if self.finished {
            return;
        }
        match &mut self.kind {
            ActionKind::Gather(action) => action.release(world),
            ActionKind::Move(_) => world.clear_draw_offset(agent),
            _ => {}
        }
        self.finished = true;
        tracing::debug!(action = self.name(), "action complete");
    }

    /// Exceptional exit: skips completion side effects, but still cleans up
    /// purely cosmetic state. Idempotent.
    pub fn abort(&mut self, world: &mut World, agent: EntityId) {
        if self.finished {
            return;
        }
        if matches!(self.kind, ActionKind::Move(_)) {
            world.clear_draw_offset(agent);
        }
        self.finished = true;
        tracing::debug!(action = self.name(), "action aborted");
    }

    fn gather_target(&self) -> Option<EntityId> {
        match &self.kind {
            ActionKind::Gather(action) => Some(action.target()),
            _ => None,
        }
    }
}

/// Ordered, agent-owned sequence of behaviors; the last element is active.
#[derive(Debug, Default)]
pub struct ActionStack {
    actions: Vec<Action>,
}

impl ActionStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Name of the active behavior, if any.
    pub fn top_name(&self) -> Option<&'static str> {
        self.actions.last().map(Action::name)
    }

    /// Suspends the current behavior and makes `action` active.
    pub fn push(&mut self, action: Action) {
        tracing::debug!(action = action.name(), "action pushed");
        self.actions.push(action);
    }

    /// Runs one tick: self-heal with an idle behavior if empty, update the
    /// top once, and pop it if it finished — the behavior underneath
    /// resumes on the next tick, never this one.
    pub fn tick(&mut self, ctx: &mut ActionCtx) {
        if self.actions.is_empty() {
            self.push(Action::idle());
        }

        let child = match self.actions.last_mut() {
            Some(top) => top.update(ctx),
            None => None,
        };

        if let Some(child) = child {
            self.push(child);
        } else if self.actions.last().map_or(false, Action::is_complete) {
            if let Some(popped) = self.actions.pop() {
                tracing::debug!(action = popped.name(), "action popped");
            }
        }

        // Never leave the stack empty behind us.
        if self.actions.is_empty() {
            self.push(Action::idle());
        }
    }

    /// Force-completes every behavior on the stack, top-down, then empties
    /// it. Completion side effects (worker-slot release, offset cleanup)
    /// run for each entry, even those buried mid-stack.
    pub fn clear_all(&mut self, world: &mut World, agent: EntityId) {
        for action in self.actions.iter_mut().rev() {
            action.complete(world, agent);
        }
        self.actions.clear();
    }

    /// Completes any gather registered on one of the given entities. Called
    /// by the reclamation pass so worker slots never outlive their node.
    pub(crate) fn release_dead_targets(
        &mut self,
        dead: &[EntityId],
        world: &mut World,
        agent: EntityId,
    ) {
        for action in self.actions.iter_mut() {
            if let Some(target) = action.gather_target() {
                if dead.contains(&target) {
                    action.complete(world, agent);
                }
            }
        }
    }
}
