use crate::device::ContextConfig;
use crate::paint::Color;

/// Compiled-in engine settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub context: ContextConfig,
    /// Prepended to the frame-rate readout in the window title.
    pub title: String,
    /// Framebuffer clear color.
    pub background: Color,
    /// Frame cap enforced by the frame clock; `None` leaves pacing to vsync.
    pub max_fps: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            context: ContextConfig::default(),
            title: String::new(),
            background: Color::rgb(0.58, 0.83, 0.99),
            max_fps: None,
        }
    }
}
