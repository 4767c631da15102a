//! Voxel demo: one textured block and a fly camera, driven by `voxel-engine`.

mod player;
mod scene;
mod shader_program;
mod subsystems;
mod textures;

use std::process::ExitCode;

use voxel_engine::core::{EngineConfig, EngineDriver};
use voxel_engine::logging::{LoggingConfig, init_logging};
use voxel_engine::window::WinitPlatform;

use crate::subsystems::VoxelSubsystems;

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());

    let config = EngineConfig {
        title: "voxel | ".to_string(),
        ..EngineConfig::default()
    };

    let driver = match EngineDriver::initialize(config, WinitPlatform::new(), VoxelSubsystems) {
        Ok(driver) => driver,
        Err(e) => {
            log::error!("error during initialization: {e:#}");
            log::debug!("{e:?}");
            return ExitCode::from(1);
        }
    };

    match driver.run() {
        Ok(outcome) => {
            log::info!("exiting: {outcome:?}");
            ExitCode::from(outcome.exit_code())
        }
        // Already reported by the driver.
        Err(_) => ExitCode::from(2),
    }
}
