use std::sync::Arc;

use anyhow::Context;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, DeviceId, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes, WindowId};

use crate::input::platform::translate_window_event;
use crate::input::{InputEvent, InputState};

/// Application handler fed by `pump_app_events`.
///
/// Creates the window once the loop is able to, and queues translated events
/// until the platform drains them.
#[derive(Default)]
pub(crate) struct EventPump {
    pending: Option<WindowAttributes>,
    window: Option<Arc<Window>>,
    creation_error: Option<anyhow::Error>,

    tracker: InputState,
    queue: Vec<InputEvent>,
    resized: Option<PhysicalSize<u32>>,
}

impl EventPump {
    /// Schedules window creation on the next loop callback that can create one.
    pub(crate) fn request_window(&mut self, attributes: WindowAttributes) {
        self.pending = Some(attributes);
    }

    pub(crate) fn window(&self) -> Option<&Arc<Window>> {
        self.window.as_ref()
    }

    pub(crate) fn take_creation_error(&mut self) -> Option<anyhow::Error> {
        self.creation_error.take()
    }

    /// Latest drawable size reported since the previous call.
    pub(crate) fn take_resize(&mut self) -> Option<PhysicalSize<u32>> {
        self.resized.take()
    }

    /// Queued events, oldest first.
    pub(crate) fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.queue)
    }

    pub(crate) fn release(&mut self) {
        self.pending = None;
        self.window = None;
        self.queue.clear();
        self.resized = None;
        self.tracker = InputState::default();
    }

    fn create_pending(&mut self, event_loop: &ActiveEventLoop) {
        let Some(attributes) = self.pending.take() else {
            return;
        };

        match event_loop
            .create_window(attributes)
            .context("failed to create window")
        {
            Ok(window) => {
                log::debug!("window created ({:?})", window.inner_size());
                self.window = Some(Arc::new(window));
            }
            Err(e) => self.creation_error = Some(e),
        }
    }
}

impl ApplicationHandler for EventPump {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        self.create_pending(event_loop);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // Platforms without a resume notification.
        self.create_pending(event_loop);
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        if window.id() != window_id {
            return;
        }

        match &event {
            WindowEvent::Resized(size) => self.resized = Some(*size),
            WindowEvent::ScaleFactorChanged { .. } => self.resized = Some(window.inner_size()),
            _ => {}
        }

        if let Some(ev) = translate_window_event(window, &self.tracker, &event) {
            self.tracker.apply_event(&ev);
            self.queue.push(ev);
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if self.window.is_none() {
            return;
        }

        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.queue.push(InputEvent::MouseMotion {
                dx: dx as f32,
                dy: dy as f32,
            });
        }
    }
}
