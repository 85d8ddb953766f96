//! Periodic world snapshots
//!
//! The render substitute for headless runs: every N ticks the world state
//! is serialized to a JSON file under `<output_dir>/<scenario>/`.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::world::World;

#[derive(Clone, Debug)]
pub struct SnapshotConfig {
    /// Ticks between snapshots; 0 disables them.
    pub interval: u64,
    pub output_dir: String,
}

impl SnapshotConfig {
    pub fn with_output_dir(mut self, dir: String) -> Self {
        self.output_dir = dir;
        self
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            interval: 100,
            output_dir: "snapshots".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

pub struct SnapshotManager {
    config: SnapshotConfig,
}

impl SnapshotManager {
    pub fn new(config: SnapshotConfig) -> Self {
        Self { config }
    }

    pub fn maybe_snapshot(
        &self,
        tick: u64,
        scenario_name: &str,
        world: &World,
    ) -> Result<Option<PathBuf>, SnapshotError> {
        if self.config.interval == 0 || tick % self.config.interval != 0 {
            return Ok(None);
        }

        let dir = Path::new(&self.config.output_dir).join(scenario_name);
        fs::create_dir_all(&dir)?;
        let file_path = dir.join(format!("tick_{tick:06}.json"));
        let json = serde_json::to_string_pretty(&world.snapshot(scenario_name, tick))?;
        fs::write(&file_path, json)?;
        Ok(Some(file_path))
    }
}
