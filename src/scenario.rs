//! Scenario configuration
//!
//! A scenario YAML file pins everything a run needs: the seed, tick length,
//! map dimensions, and what to spawn where. Building a world from the same
//! scenario and seed always produces the same starting state.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use thiserror::Error;

use crate::geometry::Vec2;
use crate::inventory::ItemKind;
use crate::rng::RngManager;
use crate::terrain::{TerrainGrid, TILE_SIZE};
use crate::world::World;

fn default_tick_seconds() -> f64 {
    0.1
}

fn default_snapshot_interval_ticks() -> u64 {
    100
}

fn default_water_border() -> bool {
    true
}

fn default_peons() -> u32 {
    3
}

fn default_trees() -> u32 {
    40
}

fn default_rocks() -> u32 {
    3
}

fn default_tree_hits() -> u32 {
    5
}

fn default_rock_hits() -> u32 {
    8
}

fn default_worker_cap() -> u32 {
    3
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("scenario validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub seed: u64,
    #[serde(default)]
    pub ticks: Option<u64>,
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: f64,
    #[serde(default = "default_snapshot_interval_ticks")]
    pub snapshot_interval_ticks: u64,
    pub map: MapConfig,
    #[serde(default)]
    pub spawns: SpawnConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MapConfig {
    pub width_tiles: u32,
    pub height_tiles: u32,
    #[serde(default = "default_water_border")]
    pub water_border: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpawnConfig {
    #[serde(default = "default_peons")]
    pub peons: u32,
    #[serde(default)]
    pub orcs: u32,
    #[serde(default = "default_trees")]
    pub trees: u32,
    #[serde(default = "default_rocks")]
    pub rocks: u32,
    #[serde(default = "default_tree_hits")]
    pub tree_hits: u32,
    #[serde(default = "default_rock_hits")]
    pub rock_hits: u32,
    #[serde(default = "default_worker_cap")]
    pub worker_cap: u32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            peons: default_peons(),
            orcs: 0,
            trees: default_trees(),
            rocks: default_rocks(),
            tree_hits: default_tree_hits(),
            rock_hits: default_rock_hits(),
            worker_cap: default_worker_cap(),
        }
    }
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        scenario.validate()?;
        Ok(scenario)
    }
}

impl Scenario {
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.name.is_empty() {
            return Err(ScenarioError::Validation(
                "scenario must define a name".to_string(),
            ));
        }
        if self.tick_seconds <= 0.0 {
            return Err(ScenarioError::Validation(
                "tick_seconds must be positive".to_string(),
            ));
        }
        let min_side = if self.map.water_border { 3 } else { 1 };
        if self.map.width_tiles < min_side || self.map.height_tiles < min_side {
            return Err(ScenarioError::Validation(format!(
                "map must be at least {min_side}x{min_side} tiles"
            )));
        }
        if self.spawns.peons == 0 {
            return Err(ScenarioError::Validation(
                "scenario must spawn at least one peon".to_string(),
            ));
        }
        Ok(())
    }

    /// Tick count for a run: explicit override first, then the scenario's
    /// own value, then a default.
    pub fn ticks(&self, override_ticks: Option<u64>) -> u64 {
        override_ticks.or(self.ticks).unwrap_or(600)
    }

    /// Builds the starting world: terrain, the obelisk at the center,
    /// stockpile and forge beside it, peons and orcs at their camps, and
    /// resource nodes scattered over passable ground.
    pub fn build_world(&self, rng: &mut RngManager) -> World {
        let terrain = TerrainGrid::generate(
            self.map.width_tiles,
            self.map.height_tiles,
            self.map.water_border,
        );
        let mut world = World::new(terrain);
        let center = world.center();

        world.spawn_obelisk(center);
        world.spawn_stockpile(center + Vec2::new(96.0, 0.0));
        world.spawn_forge(center + Vec2::new(-96.0, 0.0));
        world.spawn_peon(self.spawns.peons, center + Vec2::new(0.0, 96.0));
        if self.spawns.orcs > 0 {
            world.spawn_orc(self.spawns.orcs, center + Vec2::new(0.0, -160.0));
        }

        let worldgen = rng.stream("worldgen");
        for _ in 0..self.spawns.trees {
            if let Some(position) = random_passable_point(&world, worldgen) {
                world.spawn_resource(
                    ItemKind::Wood,
                    position,
                    self.spawns.tree_hits,
                    self.spawns.worker_cap,
                );
            }
        }
        const ROCK_ITEMS: [ItemKind; 3] = [ItemKind::Stone, ItemKind::Coal, ItemKind::IronOre];
        for index in 0..self.spawns.rocks {
            if let Some(position) = random_passable_point(&world, worldgen) {
                world.spawn_resource(
                    ROCK_ITEMS[index as usize % ROCK_ITEMS.len()],
                    position,
                    self.spawns.rock_hits,
                    self.spawns.worker_cap,
                );
            }
        }

        world
    }
}

/// Samples a uniformly random passable point, giving up after a bounded
/// number of rejected draws.
fn random_passable_point(world: &World, rng: &mut ChaCha8Rng) -> Option<Vec2> {
    let width = f64::from(world.terrain().width_tiles()) * TILE_SIZE;
    let height = f64::from(world.terrain().height_tiles()) * TILE_SIZE;
    for _ in 0..32 {
        let point = Vec2::new(rng.gen_range(0.0..width), rng.gen_range(0.0..height));
        if world.is_passable(point) {
            return Some(point);
        }
    }
    None
}
