use std::sync::Arc;

use anyhow::{Context, Result, anyhow, ensure};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::paint::Color;

use super::config::{ContextAttributes, shader_model_rank};
use super::frame::{GpuFrame, encode_pass};
use super::surface::{self, FrameTargets};
use super::{RenderState, SurfaceErrorAction};

/// Owns the wgpu device, the window surface and the per-size render targets.
///
/// This is the engine's graphics context:
/// - created from negotiated [`ContextAttributes`] once the window exists
/// - holds the shared [`RenderState`] pipelines are built from
/// - acquires, clears and presents frames
pub struct GraphicsContext {
    window: Arc<Window>,

    /// Surface bound to the window; `'static` because the window is shared.
    surface: wgpu::Surface<'static>,

    device: wgpu::Device,
    queue: wgpu::Queue,

    /// Active surface configuration.
    config: wgpu::SurfaceConfiguration,

    /// Current drawable size in physical pixels.
    size: PhysicalSize<u32>,

    attributes: ContextAttributes,
    render_state: RenderState,
    targets: FrameTargets,
}

impl GraphicsContext {
    /// Creates the device and surface for `window`.
    ///
    /// Fails when no adapter satisfies the negotiated attributes (backend set,
    /// shader model, multisample count) or when device creation fails.
    pub async fn new(window: Arc<Window>, attributes: ContextAttributes) -> Result<Self> {
        let size = window.inner_size();
        ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: attributes.backends,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let info = adapter.get_info();
        log::info!("using adapter '{}' ({:?})", info.name, info.backend);

        let supported = adapter.get_downlevel_capabilities().shader_model;
        ensure!(
            shader_model_rank(supported) >= shader_model_rank(attributes.shader_model),
            "adapter '{}' supports {:?}, requested {:?}",
            info.name,
            supported,
            attributes.shader_model
        );

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&surface_caps)
            .context("no supported surface formats")?;

        // Counts other than 1 and 4 are adapter-specific in wgpu.
        let required_features = if matches!(attributes.sample_count, 1 | 4) {
            wgpu::Features::empty()
        } else {
            wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES
        };
        ensure!(
            adapter.features().contains(required_features),
            "adapter '{}' cannot negotiate {} samples",
            info.name,
            attributes.sample_count
        );
        for f in [format, attributes.depth_format] {
            ensure!(
                adapter
                    .get_texture_format_features(f)
                    .flags
                    .sample_count_supported(attributes.sample_count),
                "{:?} does not support {} samples on this adapter",
                f,
                attributes.sample_count
            );
        }

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("voxel-engine device"),
                required_features,
                required_limits: attributes.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: attributes.present_mode,
            alpha_mode: surface::choose_alpha_mode(&surface_caps),
            view_formats: vec![],
            desired_maximum_frame_latency: attributes.desired_maximum_frame_latency,
        };

        surface.configure(&device, &config);

        let targets = FrameTargets::new(
            &device,
            size,
            format,
            attributes.depth_format,
            attributes.sample_count,
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            size,
            attributes,
            render_state: RenderState::default(),
            targets,
        })
    }

    /// Enables depth test, back-face culling, alpha blending and automatic
    /// reclamation of transient resources. Idempotent.
    pub fn enable_default_state(&mut self) {
        self.render_state.enable_defaults();
        log::debug!("render state: {:?}", self.render_state);
    }

    pub fn render_state(&self) -> RenderState {
        self.render_state
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn depth_format(&self) -> wgpu::TextureFormat {
        self.attributes.depth_format
    }

    pub fn sample_count(&self) -> u32 {
        self.attributes.sample_count
    }

    /// Current drawable size (physical pixels).
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Width over height, or `1.0` while the drawable is zero-sized.
    pub fn aspect_ratio(&self) -> f32 {
        if self.size.width == 0 || self.size.height == 0 {
            return 1.0;
        }
        self.size.width as f32 / self.size.height as f32
    }

    /// Reconfigures the surface and recreates size-dependent targets.
    ///
    /// wgpu cannot configure a 0x0 surface; in that case only the recorded
    /// size changes and configuration waits for the next non-zero resize.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.size = new_size;
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.targets = FrameTargets::new(
            &self.device,
            new_size,
            self.config.format,
            self.attributes.depth_format,
            self.attributes.sample_count,
        );
    }

    /// Acquires the next surface texture and clears color and depth.
    ///
    /// Returns `Ok(None)` when the frame should be skipped (surface lost,
    /// outdated or timed out); only unrecoverable surface errors fail.
    pub fn begin_frame(&mut self, clear: Color) -> Result<Option<GpuFrame>> {
        if self.size.width == 0 || self.size.height == 0 {
            return Ok(None);
        }

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(err) => {
                return match SurfaceErrorAction::classify(&err) {
                    SurfaceErrorAction::Fatal => Err(anyhow!("failed to acquire surface texture: {err}")),
                    SurfaceErrorAction::Reconfigured => {
                        self.surface.configure(&self.device, &self.config);
                        log::debug!("surface reconfigured after {err}; skipping frame");
                        Ok(None)
                    }
                    SurfaceErrorAction::SkipFrame => {
                        log::debug!("skipping frame: {err}");
                        Ok(None)
                    }
                };
            }
        };

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("voxel frame encoder"),
            });

        // Clear pass; dropped before collaborators record their own passes.
        {
            let _pass = encode_pass(
                &mut encoder,
                "voxel clear",
                &view,
                self.targets.msaa_view.as_ref(),
                &self.targets.depth_view,
                wgpu::LoadOp::Clear(clear.to_wgpu()),
                wgpu::LoadOp::Clear(1.0),
            );
        }

        Ok(Some(GpuFrame {
            surface_texture,
            view,
            msaa_view: self.targets.msaa_view.clone(),
            depth_view: self.targets.depth_view.clone(),
            encoder,
        }))
    }

    /// Submits the recorded commands and presents the frame.
    ///
    /// With automatic reclamation enabled, polls the device afterwards so
    /// resources dropped during the frame are freed.
    pub fn present(&mut self, frame: GpuFrame) -> Result<()> {
        let GpuFrame {
            surface_texture,
            encoder,
            ..
        } = frame;

        self.queue.submit(std::iter::once(encoder.finish()));
        self.window.pre_present_notify();
        surface_texture.present();

        if self.render_state.auto_reclaim {
            self.device
                .poll(wgpu::PollType::Poll)
                .context("failed to reclaim GPU resources")?;
        }

        Ok(())
    }
}
