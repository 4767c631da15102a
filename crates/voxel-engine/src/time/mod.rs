//! Time subsystem.
//!
//! Provides frame timing without coupling to the platform layer.
//! Intended usage:
//! - one `FrameClock` per driver, created at startup
//! - call `tick()` once per frame, after the simulation update

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
