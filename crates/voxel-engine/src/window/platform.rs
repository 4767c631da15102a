use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail, ensure};
use winit::dpi::PhysicalSize;
use winit::event_loop::{ControlFlow, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{CursorGrabMode, Window};

use crate::core::{GraphicsBackend, InputGateway, Platform};
use crate::device::{ContextAttributes, ContextConfig, GpuFrame, GraphicsContext};
use crate::input::InputEvent;
use crate::paint::Color;

use super::pump::EventPump;

/// Loop iterations to wait for the window before giving up.
const WINDOW_PUMP_LIMIT: usize = 64;

/// Desktop platform: a pumped winit event loop, one window, one wgpu context.
///
/// The loop is never handed control; every `poll` pumps it once with a zero
/// timeout, so the driver keeps ownership of the frame cadence.
pub struct WinitPlatform {
    event_loop: Option<EventLoop<()>>,
    pump: EventPump,
    attributes: Option<ContextAttributes>,
    gfx: Option<GraphicsContext>,
}

impl WinitPlatform {
    pub fn new() -> Self {
        Self {
            event_loop: None,
            pump: EventPump::default(),
            attributes: None,
            gfx: None,
        }
    }

    pub fn window(&self) -> Option<&Arc<Window>> {
        self.pump.window()
    }

    fn gfx_mut(&mut self) -> Result<&mut GraphicsContext> {
        self.gfx
            .as_mut()
            .context("graphics context has not been created")
    }

    fn pump_once(&mut self) -> Result<()> {
        let event_loop = self
            .event_loop
            .as_mut()
            .context("platform is not initialized")?;

        match event_loop.pump_app_events(Some(Duration::ZERO), &mut self.pump) {
            PumpStatus::Continue => Ok(()),
            PumpStatus::Exit(code) => bail!("event loop exited with code {code}"),
        }
    }
}

impl Default for WinitPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsBackend for WinitPlatform {
    type Graphics = GraphicsContext;
    type Frame = GpuFrame;

    fn set_attributes(&mut self, config: &ContextConfig) -> Result<()> {
        ensure!(
            self.gfx.is_none(),
            "context attributes cannot change after the window is created"
        );

        let attributes = config.negotiate()?;
        log::debug!("negotiated context attributes: {attributes:?}");
        self.attributes = Some(attributes);
        Ok(())
    }

    fn create_window(&mut self, title: &str) -> Result<()> {
        ensure!(self.gfx.is_none(), "window already exists");
        let attributes = self
            .attributes
            .clone()
            .context("context attributes must be set before creating the window")?;

        let (width, height) = attributes.resolution;
        self.pump.request_window(
            Window::default_attributes()
                .with_title(title)
                .with_inner_size(PhysicalSize::new(width, height)),
        );

        for _ in 0..WINDOW_PUMP_LIMIT {
            self.pump_once()?;
            if let Some(err) = self.pump.take_creation_error() {
                return Err(err);
            }
            if self.pump.window().is_some() {
                break;
            }
        }

        let window = self
            .pump
            .window()
            .cloned()
            .context("event loop never became ready to create a window")?;

        let gfx = pollster::block_on(GraphicsContext::new(window, attributes))
            .context("failed to create graphics context")?;
        self.gfx = Some(gfx);
        Ok(())
    }

    fn enable_default_state(&mut self) -> Result<()> {
        self.gfx_mut()?.enable_default_state();
        Ok(())
    }

    fn graphics(&self) -> Result<&GraphicsContext> {
        self.gfx
            .as_ref()
            .context("graphics context has not been created")
    }

    fn set_title(&mut self, title: &str) {
        if let Some(window) = self.pump.window() {
            window.set_title(title);
        }
    }

    fn begin_frame(&mut self, clear: Color) -> Result<Option<GpuFrame>> {
        self.gfx_mut()?.begin_frame(clear)
    }

    fn present(&mut self, frame: GpuFrame) -> Result<()> {
        self.gfx_mut()?.present(frame)
    }
}

impl InputGateway for WinitPlatform {
    fn capture(&mut self) -> Result<()> {
        let window = self
            .pump
            .window()
            .context("cannot capture input without a window")?;

        // Not every platform supports both modes; X11 only confines, macOS only locks.
        let grabbed = window
            .set_cursor_grab(CursorGrabMode::Confined)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked));
        if let Err(e) = grabbed {
            log::warn!("failed to grab cursor: {e}");
        }
        window.set_cursor_visible(false);

        Ok(())
    }

    fn poll(&mut self) -> Result<Vec<InputEvent>> {
        self.pump_once()?;

        if let Some(size) = self.pump.take_resize() {
            if let Some(gfx) = self.gfx.as_mut() {
                gfx.resize(size);
            }
        }

        Ok(self.pump.drain())
    }
}

impl Platform for WinitPlatform {
    fn init(&mut self) -> Result<()> {
        ensure!(self.event_loop.is_none(), "platform is already initialized");

        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        event_loop.set_control_flow(ControlFlow::Poll);
        self.event_loop = Some(event_loop);
        Ok(())
    }

    fn shutdown(&mut self) {
        log::debug!("shutting down platform");
        // The context borrows the window's surface; drop it first.
        self.gfx = None;
        self.pump.release();
        self.attributes = None;
        self.event_loop = None;
    }
}
