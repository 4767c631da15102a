//! Core engine-facing contracts and the frame driver.
//!
//! This module defines the stable interface between the platform layer, the
//! driver, and the game-side collaborators (textures, player, shader program,
//! scene). Collaborators never call back into the driver; they receive the
//! specific handles they need at construction and per call.

mod camera;
mod config;
mod driver;
mod fault;
mod platform;
mod run_state;
mod subsystem;

#[cfg(test)]
mod tests;

pub use camera::Camera;
pub use config::EngineConfig;
pub use driver::{EngineDriver, RunOutcome};
pub use fault::{Fault, FaultRecord, InitStep, Phase};
pub use platform::{GraphicsBackend, InputGateway, Platform};
pub use run_state::{Lifecycle, RunState};
pub use subsystem::{Player, Scene, ShaderProgram, SubsystemFactory, SubsystemSet};
