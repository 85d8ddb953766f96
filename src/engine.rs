//! Headless simulation driver
//!
//! The engine stands in for a frame loop: it advances the world at a fixed
//! simulated tick length and writes periodic snapshots. Rendering, input,
//! and audio backends live with the embedder; the engine wires a silent
//! audio sink in their place.

use std::path::PathBuf;

use thiserror::Error;

use crate::audio::{Audio, NullAudio};
use crate::rng::RngManager;
use crate::scenario::Scenario;
use crate::snapshot::{SnapshotConfig, SnapshotError, SnapshotManager};
use crate::world::World;

pub struct EngineConfig {
    pub snapshot: SnapshotConfig,
}

impl EngineConfig {
    pub fn from_scenario(scenario: &Scenario) -> Self {
        Self {
            snapshot: SnapshotConfig {
                interval: scenario.snapshot_interval_ticks,
                ..SnapshotConfig::default()
            },
        }
    }

    pub fn with_snapshot_dir(mut self, dir: String) -> Self {
        self.snapshot.output_dir = dir;
        self
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

#[derive(Debug)]
pub struct TickSummary {
    pub tick: u64,
    pub day: u32,
    pub month: &'static str,
    pub year: u32,
    pub peons: usize,
    pub game_over: bool,
    pub snapshot_path: Option<PathBuf>,
}

pub struct Engine {
    world: World,
    rng: RngManager,
    audio: Box<dyn Audio>,
    tick: u64,
    tick_seconds: f64,
    scenario_name: String,
    snapshot_manager: SnapshotManager,
}

impl Engine {
    pub fn from_scenario(scenario: &Scenario, config: EngineConfig) -> Self {
        let mut rng = RngManager::new(scenario.seed);
        let world = scenario.build_world(&mut rng);
        Self {
            world,
            rng,
            audio: Box::new(NullAudio),
            tick: 0,
            tick_seconds: scenario.tick_seconds,
            scenario_name: scenario.name.clone(),
            snapshot_manager: SnapshotManager::new(config.snapshot),
        }
    }

    pub fn tick(&mut self) -> Result<TickSummary, EngineError> {
        self.tick += 1;
        self.world
            .update(self.tick_seconds, &mut self.rng, self.audio.as_mut());
        let snapshot_path =
            self.snapshot_manager
                .maybe_snapshot(self.tick, &self.scenario_name, &self.world)?;

        let calendar = self.world.calendar();
        Ok(TickSummary {
            tick: self.tick,
            day: calendar.day(),
            month: calendar.month_name(),
            year: calendar.year(),
            peons: self.world.peon_count(),
            game_over: self.world.is_game_over(),
            snapshot_path,
        })
    }

    pub fn run(&mut self, ticks: u64) -> Result<(), EngineError> {
        for _ in 0..ticks {
            let summary = self.tick()?;
            if let Some(path) = &summary.snapshot_path {
                tracing::info!(tick = summary.tick, path = %path.display(), "snapshot written");
            }
        }
        Ok(())
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn scenario_name(&self) -> &str {
        &self.scenario_name
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world access, the entry point for external commands
    /// (push/clear actions, cheat spawns) between ticks.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}
