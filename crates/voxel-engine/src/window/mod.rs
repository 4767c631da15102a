//! Window + event pump.
//!
//! Owns the `winit` EventLoop and Window and implements the driver's platform
//! traits on top of them and the wgpu graphics context.

mod platform;
mod pump;

pub use platform::WinitPlatform;
