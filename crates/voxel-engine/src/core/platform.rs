use anyhow::Result;

use crate::device::ContextConfig;
use crate::input::InputEvent;
use crate::paint::Color;

/// Window + graphics context operations the driver needs.
pub trait GraphicsBackend {
    /// Handle collaborators build GPU resources from.
    type Graphics;

    /// One acquired, cleared frame.
    type Frame;

    /// Records context attributes for the next window creation. Must precede
    /// [`create_window`](Self::create_window).
    fn set_attributes(&mut self, config: &ContextConfig) -> Result<()>;

    /// Creates the window and the graphics context.
    fn create_window(&mut self, title: &str) -> Result<()>;

    /// Enables depth test, back-face culling, blending and automatic
    /// reclamation of transient resources. Idempotent.
    fn enable_default_state(&mut self) -> Result<()>;

    fn graphics(&self) -> Result<&Self::Graphics>;

    fn set_title(&mut self, title: &str);

    /// Acquires the next frame cleared to `clear`. `Ok(None)` means the frame
    /// should be skipped without a fault.
    fn begin_frame(&mut self, clear: Color) -> Result<Option<Self::Frame>>;

    /// Submits and presents the frame (double-buffer swap).
    fn present(&mut self, frame: Self::Frame) -> Result<()>;
}

/// Exclusive input capture and the per-frame event drain.
pub trait InputGateway {
    /// Confines the pointer to the window and hides the cursor.
    fn capture(&mut self) -> Result<()>;

    /// Returns the events queued since the last call, oldest first.
    /// Never blocks waiting for input.
    fn poll(&mut self) -> Result<Vec<InputEvent>>;
}

/// Platform driven by `EngineDriver`.
pub trait Platform: GraphicsBackend + InputGateway {
    /// Brings up the platform layer (event loop).
    fn init(&mut self) -> Result<()>;

    /// Releases the window, graphics context and event loop.
    fn shutdown(&mut self);
}
