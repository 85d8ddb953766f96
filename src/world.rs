//! The world: entity ownership, spatial queries, terrain, and time
//!
//! The world owns every entity in a generational slot table plus per-concern
//! component maps (resource nodes, inventories, agent state). One update
//! pass advances the calendar, drives every live agent's behavior stack, and
//! then reclaims dead entities — reclamation never runs mid-iteration, so an
//! id read during an update stays resolvable for the rest of that tick.

use std::collections::HashMap;
use std::mem;

use serde::Serialize;

use crate::actions::{Action, ActionCtx, ActionStack};
use crate::audio::Audio;
use crate::calendar::Calendar;
use crate::entity::{Entity, EntityId, EntityKind, EntityTable};
use crate::geometry::{Rect, Vec2};
use crate::inventory::{Inventory, ItemKind};
use crate::rng::RngManager;
use crate::terrain::TerrainGrid;

pub const PEON_MOVE_SPEED: f64 = 64.0;
pub const ORC_MOVE_SPEED: f64 = 96.0;

const AGENT_HIT_BOX: Rect = Rect {
    x: -8.0,
    y: -8.0,
    width: 16.0,
    height: 16.0,
};
const PROP_HIT_BOX: Rect = Rect {
    x: -16.0,
    y: -16.0,
    width: 32.0,
    height: 32.0,
};
const OBELISK_HIT_BOX: Rect = Rect {
    x: -36.0,
    y: -30.0,
    width: 73.0,
    height: 80.0,
};

/// A harvestable node: what it yields, how much is left, and how many
/// agents may work it at once.
#[derive(Debug, Clone)]
pub struct ResourceNode {
    item: ItemKind,
    remaining_hits: u32,
    workers: u32,
    worker_cap: u32,
}

impl ResourceNode {
    pub fn new(item: ItemKind, remaining_hits: u32, worker_cap: u32) -> Self {
        Self {
            item,
            remaining_hits,
            workers: 0,
            worker_cap,
        }
    }

    pub fn item(&self) -> ItemKind {
        self.item
    }

    pub fn remaining_hits(&self) -> u32 {
        self.remaining_hits
    }

    pub fn workers(&self) -> u32 {
        self.workers
    }

    pub fn worker_cap(&self) -> u32 {
        self.worker_cap
    }

    pub fn is_full(&self) -> bool {
        self.workers >= self.worker_cap
    }

    /// Applies one depletion hit. Returns true once the node is exhausted.
    fn damage(&mut self) -> bool {
        self.remaining_hits = self.remaining_hits.saturating_sub(1);
        self.remaining_hits == 0
    }

    fn add_worker(&mut self) -> bool {
        if self.is_full() {
            return false;
        }
        self.workers += 1;
        true
    }

    /// Saturating release; over-release is a guarded no-op.
    fn remove_worker(&mut self) {
        self.workers = self.workers.saturating_sub(1);
    }
}

/// Per-agent state: movement speed plus the behavior stack driving it.
#[derive(Default)]
pub struct AgentState {
    pub speed: f64,
    pub stack: ActionStack,
}

#[derive(Debug, Serialize)]
pub struct EntitySnapshot {
    pub id: u32,
    pub kind: &'static str,
    pub x: f64,
    pub y: f64,
    pub alive: bool,
}

#[derive(Debug, Serialize)]
pub struct StockEntry {
    pub item: &'static str,
    pub count: u32,
}

#[derive(Debug, Serialize)]
pub struct WorldSnapshot {
    pub scenario: String,
    pub tick: u64,
    pub day: u32,
    pub month: &'static str,
    pub year: u32,
    pub game_over: bool,
    pub stockpile: Vec<StockEntry>,
    pub entities: Vec<EntitySnapshot>,
}

pub struct World {
    entities: EntityTable,
    resources: HashMap<EntityId, ResourceNode>,
    inventories: HashMap<EntityId, Inventory>,
    agents: HashMap<EntityId, AgentState>,
    terrain: TerrainGrid,
    calendar: Calendar,
    game_over: bool,
}

impl World {
    pub fn new(terrain: TerrainGrid) -> Self {
        Self {
            entities: EntityTable::new(),
            resources: HashMap::new(),
            inventories: HashMap::new(),
            agents: HashMap::new(),
            terrain,
            calendar: Calendar::new(),
            game_over: false,
        }
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn terrain(&self) -> &TerrainGrid {
        &self.terrain
    }

    pub fn center(&self) -> Vec2 {
        self.terrain.center()
    }

    pub fn is_passable(&self, point: Vec2) -> bool {
        self.terrain.is_passable(point)
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    // ---- spawning ----------------------------------------------------

    fn spawn(&mut self, kind: EntityKind, position: Vec2, hit_box: Rect) -> EntityId {
        let id = self.entities.insert(Entity::new(kind, position, hit_box));
        tracing::debug!(kind = kind.name(), x = position.x, y = position.y, "spawned entity");
        id
    }

    pub fn spawn_peon(&mut self, quantity: u32, position: Vec2) -> Vec<EntityId> {
        (0..quantity)
            .map(|_| {
                let id = self.spawn(EntityKind::Peon, position, AGENT_HIT_BOX);
                self.inventories.insert(id, Inventory::new());
                self.agents.insert(
                    id,
                    AgentState {
                        speed: PEON_MOVE_SPEED,
                        stack: ActionStack::new(),
                    },
                );
                id
            })
            .collect()
    }

    pub fn spawn_orc(&mut self, quantity: u32, position: Vec2) -> Vec<EntityId> {
        (0..quantity)
            .map(|_| {
                let id = self.spawn(EntityKind::Orc, position, AGENT_HIT_BOX);
                self.inventories.insert(id, Inventory::new());
                self.agents.insert(
                    id,
                    AgentState {
                        speed: ORC_MOVE_SPEED,
                        stack: ActionStack::new(),
                    },
                );
                id
            })
            .collect()
    }

    pub fn spawn_resource(
        &mut self,
        item: ItemKind,
        position: Vec2,
        remaining_hits: u32,
        worker_cap: u32,
    ) -> EntityId {
        let kind = match item {
            ItemKind::Wood => EntityKind::Tree,
            _ => EntityKind::Rock,
        };
        let id = self.spawn(kind, position, PROP_HIT_BOX);
        self.resources
            .insert(id, ResourceNode::new(item, remaining_hits, worker_cap));
        id
    }

    pub fn spawn_stockpile(&mut self, position: Vec2) -> EntityId {
        let id = self.spawn(EntityKind::Stockpile, position, PROP_HIT_BOX);
        self.inventories.insert(id, Inventory::new());
        id
    }

    pub fn spawn_forge(&mut self, position: Vec2) -> EntityId {
        let id = self.spawn(EntityKind::Forge, position, PROP_HIT_BOX);
        self.inventories.insert(id, Inventory::new());
        id
    }

    pub fn spawn_obelisk(&mut self, position: Vec2) -> EntityId {
        self.spawn(EntityKind::Obelisk, position, OBELISK_HIT_BOX)
    }

    // ---- direct access -----------------------------------------------

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    pub fn resource(&self, id: EntityId) -> Option<&ResourceNode> {
        self.resources.get(&id)
    }

    pub fn inventory(&self, id: EntityId) -> Option<&Inventory> {
        self.inventories.get(&id)
    }

    pub fn inventory_mut(&mut self, id: EntityId) -> Option<&mut Inventory> {
        self.inventories.get_mut(&id)
    }

    pub fn agent(&self, id: EntityId) -> Option<&AgentState> {
        self.agents.get(&id)
    }

    pub fn agent_speed(&self, id: EntityId) -> f64 {
        self.agents.get(&id).map_or(0.0, |agent| agent.speed)
    }

    pub fn set_position(&mut self, id: EntityId, position: Vec2) {
        if let Some(entity) = self.entities.get_mut(id) {
            entity.position = position;
        }
    }

    pub fn set_draw_offset(&mut self, id: EntityId, offset: Vec2) {
        if let Some(entity) = self.entities.get_mut(id) {
            entity.draw_offset = offset;
        }
    }

    pub fn clear_draw_offset(&mut self, id: EntityId) {
        self.set_draw_offset(id, Vec2::ZERO);
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn peon_count(&self) -> usize {
        self.entities
            .iter()
            .filter(|(_, entity)| entity.alive && entity.kind == EntityKind::Peon)
            .count()
    }

    // ---- resource contention -----------------------------------------

    /// Applies one depletion hit, killing the entity on the final one.
    /// Returns true when this hit exhausted the node.
    pub fn damage_resource(&mut self, id: EntityId) -> bool {
        let exhausted = match self.resources.get_mut(&id) {
            Some(node) => node.damage(),
            None => return false,
        };
        if exhausted {
            if let Some(entity) = self.entities.get_mut(id) {
                entity.alive = false;
            }
        }
        exhausted
    }

    /// Claims a worker slot on the node. Fails when the node is missing,
    /// dead, or already at its cap.
    pub fn try_register_worker(&mut self, id: EntityId) -> bool {
        let alive = self.entities.get(id).map_or(false, |entity| entity.alive);
        if !alive {
            return false;
        }
        self.resources
            .get_mut(&id)
            .map_or(false, ResourceNode::add_worker)
    }

    /// Releases a worker slot. Safe to call with a stale id or on an
    /// already-empty node.
    pub fn release_worker(&mut self, id: EntityId) {
        if let Some(node) = self.resources.get_mut(&id) {
            node.remove_worker();
        }
    }

    // ---- spatial and identity queries --------------------------------

    fn kind_matches(entity: &Entity, filter: Option<EntityKind>) -> bool {
        filter.map_or(true, |kind| entity.kind == kind)
    }

    /// First live entity whose hit box contains `point`, in spawn order.
    pub fn entity_at(&self, point: Vec2, filter: Option<EntityKind>) -> Option<EntityId> {
        self.entities
            .iter()
            .filter(|(_, entity)| entity.alive && Self::kind_matches(entity, filter))
            .find(|(_, entity)| entity.hit_box_world().contains(point))
            .map(|(id, _)| id)
    }

    /// Every live entity whose hit box intersects `rect`, in spawn order.
    pub fn entities_in_rect(&self, filter: Option<EntityKind>, rect: Rect) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|(_, entity)| entity.alive && Self::kind_matches(entity, filter))
            .filter(|(_, entity)| entity.hit_box_world().intersects(rect))
            .map(|(id, _)| id)
            .collect()
    }

    /// First live entity of the given kind, in spawn order. Used for
    /// singletons such as the stockpile and the obelisk.
    pub fn find_entity(&self, kind: EntityKind) -> Option<EntityId> {
        self.entities
            .iter()
            .find(|(_, entity)| entity.alive && entity.kind == kind)
            .map(|(id, _)| id)
    }

    /// Live entities within `range` of `point`, center to center, in spawn
    /// order.
    pub fn entities_near(
        &self,
        filter: Option<EntityKind>,
        point: Vec2,
        range: f64,
    ) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|(_, entity)| entity.alive && Self::kind_matches(entity, filter))
            .filter(|(_, entity)| entity.center().distance(point) <= range)
            .map(|(id, _)| id)
            .collect()
    }

    /// The live entity of the given kind nearest to `point`. Exact ties go
    /// to the first-spawned entity.
    pub fn nearest_entity(&self, filter: Option<EntityKind>, point: Vec2) -> Option<EntityId> {
        let mut best: Option<(EntityId, f64)> = None;
        for (id, entity) in self.entities.iter() {
            if !entity.alive || !Self::kind_matches(entity, filter) {
                continue;
            }
            let distance = entity.center().distance(point);
            let closer = best.map_or(true, |(_, best_distance)| distance < best_distance);
            if closer {
                best = Some((id, distance));
            }
        }
        best.map(|(id, _)| id)
    }

    // ---- command surface ---------------------------------------------

    /// Pushes a behavior onto an agent's stack, suspending whatever it was
    /// doing. The only external entry point into the automaton besides the
    /// tick itself.
    pub fn push_action(&mut self, agent: EntityId, action: Action) {
        if let Some(state) = self.agents.get_mut(&agent) {
            state.stack.push(action);
        }
    }

    /// Force-completes an agent's entire stack, completion side effects
    /// included. Used when a command overrides whatever the agent was doing.
    pub fn clear_actions(&mut self, agent: EntityId) {
        let mut stack = match self.agents.get_mut(&agent) {
            Some(state) => mem::take(&mut state.stack),
            None => return,
        };
        stack.clear_all(self, agent);
        if let Some(state) = self.agents.get_mut(&agent) {
            state.stack = stack;
        }
    }

    // ---- the tick ----------------------------------------------------

    /// One simulation step: advance the calendar, run one action per live
    /// agent, then reclaim the dead.
    pub fn update(&mut self, dt: f64, rng: &mut RngManager, audio: &mut dyn Audio) {
        self.calendar.advance(dt);

        let behavior = rng.stream("behavior");
        for id in self.entities.ids() {
            let alive = match self.entities.get(id) {
                Some(entity) => entity.alive,
                None => continue,
            };
            if !alive {
                continue;
            }
            let mut stack = match self.agents.get_mut(&id) {
                Some(state) => mem::take(&mut state.stack),
                None => continue,
            };
            {
                let mut ctx = ActionCtx {
                    world: &mut *self,
                    rng: &mut *behavior,
                    audio: &mut *audio,
                    agent: id,
                    dt,
                };
                stack.tick(&mut ctx);
            }
            if let Some(state) = self.agents.get_mut(&id) {
                state.stack = stack;
            }
        }

        self.reclaim_dead();
    }

    /// Purges every dead entity. Runs between update passes only.
    ///
    /// Before a slot is freed, behaviors that still hold a claim on the
    /// dying entity are force-completed: gathers registered on a dying
    /// resource release their worker slot, and a dying agent's own stack is
    /// wound down. Afterward the freed slot's generation is bumped, so any
    /// id still held elsewhere goes stale instead of dangling.
    pub fn reclaim_dead(&mut self) {
        let dead: Vec<EntityId> = self
            .entities
            .iter()
            .filter(|(_, entity)| !entity.alive)
            .map(|(id, _)| id)
            .collect();
        if dead.is_empty() {
            return;
        }

        for agent_id in self.entities.ids() {
            let agent_dead = self
                .entities
                .get(agent_id)
                .map_or(true, |entity| !entity.alive);
            let mut stack = match self.agents.get_mut(&agent_id) {
                Some(state) => mem::take(&mut state.stack),
                None => continue,
            };
            if agent_dead {
                stack.clear_all(self, agent_id);
            } else {
                stack.release_dead_targets(&dead, self, agent_id);
            }
            if let Some(state) = self.agents.get_mut(&agent_id) {
                state.stack = stack;
            }
        }

        for id in dead {
            if let Some(entity) = self.entities.remove(id) {
                if entity.kind == EntityKind::Obelisk {
                    self.game_over = true;
                    tracing::info!("the obelisk has fallen");
                }
                tracing::debug!(kind = entity.kind.name(), "reclaimed entity");
            }
            self.resources.remove(&id);
            self.inventories.remove(&id);
            self.agents.remove(&id);
        }
    }

    // ---- observation -------------------------------------------------

    pub fn snapshot(&self, scenario: &str, tick: u64) -> WorldSnapshot {
        let stockpile = self
            .find_entity(EntityKind::Stockpile)
            .and_then(|id| self.inventory(id))
            .map(|inventory| {
                ItemKind::ALL
                    .iter()
                    .map(|item| StockEntry {
                        item: item.name(),
                        count: inventory.count(*item),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let entities = self
            .entities
            .iter()
            .map(|(id, entity)| EntitySnapshot {
                id: id.index(),
                kind: entity.kind.name(),
                x: entity.position.x,
                y: entity.position.y,
                alive: entity.alive,
            })
            .collect();

        WorldSnapshot {
            scenario: scenario.to_string(),
            tick,
            day: self.calendar.day(),
            month: self.calendar.month_name(),
            year: self.calendar.year(),
            game_over: self.game_over,
            stockpile,
            entities,
        }
    }
}
