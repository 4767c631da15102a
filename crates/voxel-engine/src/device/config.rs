use anyhow::{Result, bail, ensure};

/// Graphics API profile requested for the context.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ContextProfile {
    /// Modern feature level only; primary native backends.
    Core,
    /// Any backend, including GL/WebGL-class adapters with downlevel limits.
    Compatibility,
}

/// Context attributes requested before the window and device exist.
///
/// Applied once through `GraphicsBackend::set_attributes`, which must precede
/// window creation.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextConfig {
    /// Minimum API feature level as `(major, minor)`, GL-style numbering.
    pub api_version: (u8, u8),
    pub profile: ContextProfile,
    /// Depth buffer precision: 16, 24 or 32 bits.
    pub depth_bits: u8,
    /// Multisample count: 1, 2, 4, 8 or 16.
    pub samples: u32,
    /// Window resolution in physical pixels.
    pub resolution: (u32, u32),
    /// Vsynced swap chain when true; present as soon as possible otherwise.
    pub double_buffered: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            api_version: (3, 3),
            profile: ContextProfile::Core,
            depth_bits: 24,
            samples: 1,
            resolution: (1600, 900),
            double_buffered: true,
        }
    }
}

/// Negotiation parameters derived from a [`ContextConfig`].
#[derive(Debug, Clone)]
pub struct ContextAttributes {
    pub backends: wgpu::Backends,
    pub required_limits: wgpu::Limits,
    /// Lowest shader model the adapter must support.
    pub shader_model: wgpu::ShaderModel,
    pub depth_format: wgpu::TextureFormat,
    pub sample_count: u32,
    pub present_mode: wgpu::PresentMode,
    pub desired_maximum_frame_latency: u32,
    pub resolution: (u32, u32),
}

impl ContextConfig {
    /// Validates the configuration and maps it onto wgpu terms.
    pub fn negotiate(&self) -> Result<ContextAttributes> {
        let (major, minor) = self.api_version;
        ensure!(major > 0, "invalid API version {major}.{minor}");

        let (width, height) = self.resolution;
        ensure!(width > 0 && height > 0, "window resolution {width}x{height} has zero area");

        let depth_format = match self.depth_bits {
            16 => wgpu::TextureFormat::Depth16Unorm,
            24 => wgpu::TextureFormat::Depth24Plus,
            32 => wgpu::TextureFormat::Depth32Float,
            other => bail!("unsupported depth buffer size: {other} bits"),
        };

        ensure!(
            matches!(self.samples, 1 | 2 | 4 | 8 | 16),
            "unsupported multisample count: {}",
            self.samples
        );

        let shader_model = match major {
            0..=2 => wgpu::ShaderModel::Sm2,
            3 => wgpu::ShaderModel::Sm4,
            _ => wgpu::ShaderModel::Sm5,
        };

        let (backends, required_limits) = match self.profile {
            ContextProfile::Core => (wgpu::Backends::PRIMARY, wgpu::Limits::default()),
            ContextProfile::Compatibility => (wgpu::Backends::all(), wgpu::Limits::downlevel_defaults()),
        };

        let (present_mode, desired_maximum_frame_latency) = if self.double_buffered {
            (wgpu::PresentMode::Fifo, 2)
        } else {
            (wgpu::PresentMode::AutoNoVsync, 1)
        };

        Ok(ContextAttributes {
            backends,
            required_limits,
            shader_model,
            depth_format,
            sample_count: self.samples,
            present_mode,
            desired_maximum_frame_latency,
            resolution: self.resolution,
        })
    }
}

/// Orders shader models so adapter capabilities can be compared.
pub(crate) fn shader_model_rank(model: wgpu::ShaderModel) -> u8 {
    match model {
        wgpu::ShaderModel::Sm2 => 2,
        wgpu::ShaderModel::Sm4 => 4,
        wgpu::ShaderModel::Sm5 => 5,
        #[allow(unreachable_patterns)]
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_negotiates() {
        let attrs = ContextConfig::default().negotiate().unwrap();
        assert_eq!(attrs.depth_format, wgpu::TextureFormat::Depth24Plus);
        assert_eq!(attrs.sample_count, 1);
        assert_eq!(attrs.present_mode, wgpu::PresentMode::Fifo);
        assert_eq!(attrs.backends, wgpu::Backends::PRIMARY);
        assert_eq!(shader_model_rank(attrs.shader_model), 4);
        assert_eq!(attrs.resolution, (1600, 900));
    }

    #[test]
    fn depth_bits_select_format() {
        let cfg = |bits| ContextConfig { depth_bits: bits, ..Default::default() };
        assert_eq!(cfg(16).negotiate().unwrap().depth_format, wgpu::TextureFormat::Depth16Unorm);
        assert_eq!(cfg(32).negotiate().unwrap().depth_format, wgpu::TextureFormat::Depth32Float);
        assert!(cfg(8).negotiate().is_err());
    }

    #[test]
    fn sample_count_must_be_a_supported_power_of_two() {
        for ok in [1, 2, 4, 8, 16] {
            let cfg = ContextConfig { samples: ok, ..Default::default() };
            assert!(cfg.negotiate().is_ok(), "{ok} samples should be accepted");
        }
        for bad in [0, 3, 32] {
            let cfg = ContextConfig { samples: bad, ..Default::default() };
            assert!(cfg.negotiate().is_err(), "{bad} samples should be rejected");
        }
    }

    #[test]
    fn api_version_maps_to_shader_model() {
        let model = |major| {
            let cfg = ContextConfig { api_version: (major, 0), ..Default::default() };
            shader_model_rank(cfg.negotiate().unwrap().shader_model)
        };
        assert_eq!(model(2), 2);
        assert_eq!(model(3), 4);
        assert_eq!(model(4), 5);

        let zero = ContextConfig { api_version: (0, 0), ..Default::default() };
        assert!(zero.negotiate().is_err());
    }

    #[test]
    fn compatibility_profile_widens_backends() {
        let cfg = ContextConfig { profile: ContextProfile::Compatibility, ..Default::default() };
        assert_eq!(cfg.negotiate().unwrap().backends, wgpu::Backends::all());
    }

    #[test]
    fn single_buffering_drops_vsync() {
        let cfg = ContextConfig { double_buffered: false, ..Default::default() };
        let attrs = cfg.negotiate().unwrap();
        assert_eq!(attrs.present_mode, wgpu::PresentMode::AutoNoVsync);
        assert_eq!(attrs.desired_maximum_frame_latency, 1);
    }

    #[test]
    fn zero_resolution_is_rejected() {
        let cfg = ContextConfig { resolution: (0, 720), ..Default::default() };
        assert!(cfg.negotiate().is_err());
    }
}
