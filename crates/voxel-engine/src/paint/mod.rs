//! Colour types shared by the driver and renderers.

mod color;

pub use color::Color;
