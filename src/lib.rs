//! A tile-world simulation of autonomous peons.
//!
//! Agents run stacks of interruptible behaviors — idle-wander, move,
//! gather, deposit, smelt — against a shared world of resources,
//! stockpiles, and terrain. The [`world::World`] owns every entity and
//! answers the spatial queries behaviors rely on; the [`engine::Engine`]
//! drives it headlessly from a YAML scenario.

pub mod actions;
pub mod audio;
pub mod calendar;
pub mod engine;
pub mod entity;
pub mod geometry;
pub mod inventory;
pub mod rng;
pub mod scenario;
pub mod snapshot;
pub mod terrain;
pub mod timer;
pub mod world;

pub use engine::{Engine, EngineConfig, EngineError, TickSummary};
pub use scenario::{Scenario, ScenarioLoader};
