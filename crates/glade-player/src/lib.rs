//! Glade Player - Headless world runner
//!
//! Builds the demo world from `glade.toml` and an assets directory, then
//! drives rendering and proximity audio frame by frame:
//! - `EngineConfig` - TOML configuration with defaults
//! - `World` - terrain, scattered entities, lights, GUIs and sky
//! - `App` - the frame loop

pub mod app;
pub mod config;
pub mod rand;
pub mod world;

pub use app::{App, Autopilot, RunSummary};
pub use config::EngineConfig;
pub use world::World;
