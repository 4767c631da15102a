//! GPU device + surface management.
//!
//! This module is responsible for:
//! - negotiating context attributes before the device exists
//! - creating the wgpu Instance/Adapter/Device/Queue and configuring the Surface
//! - owning depth and multisample targets and the shared render state
//! - acquiring, clearing and presenting frames

mod config;
mod context;
mod error;
mod frame;
mod render_state;
mod surface;

pub use config::{ContextAttributes, ContextConfig, ContextProfile};
pub use context::GraphicsContext;
pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use render_state::RenderState;
