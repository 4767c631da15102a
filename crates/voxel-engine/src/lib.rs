//! Voxel engine crate.
//!
//! This crate owns the frame lifecycle driver and the platform + GPU pieces it
//! drives. Game-specific collaborators (textures, player, shaders, scene) live
//! in higher layers and plug in through the traits in [`core`].

pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod paint;
pub mod time;
pub mod window;
