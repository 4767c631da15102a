use winit::dpi::PhysicalSize;

pub(crate) fn choose_surface_format(caps: &wgpu::SurfaceCapabilities) -> Option<wgpu::TextureFormat> {
    let preferred = [
        wgpu::TextureFormat::Bgra8UnormSrgb,
        wgpu::TextureFormat::Rgba8UnormSrgb,
    ];

    preferred
        .into_iter()
        .find(|f| caps.formats.contains(f))
        .or_else(|| caps.formats.first().copied())
}

pub(crate) fn choose_alpha_mode(caps: &wgpu::SurfaceCapabilities) -> wgpu::CompositeAlphaMode {
    if caps.alpha_modes.contains(&wgpu::CompositeAlphaMode::Opaque) {
        return wgpu::CompositeAlphaMode::Opaque;
    }
    caps.alpha_modes
        .first()
        .copied()
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Size-dependent render targets: depth buffer plus optional MSAA color.
pub(crate) struct FrameTargets {
    pub depth_view: wgpu::TextureView,
    pub msaa_view: Option<wgpu::TextureView>,
}

impl FrameTargets {
    pub fn new(
        device: &wgpu::Device,
        size: PhysicalSize<u32>,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> Self {
        let depth_view = create_target(device, "voxel depth target", size, depth_format, sample_count);
        let msaa_view = (sample_count > 1)
            .then(|| create_target(device, "voxel msaa target", size, color_format, sample_count));

        Self { depth_view, msaa_view }
    }
}

fn create_target(
    device: &wgpu::Device,
    label: &str,
    size: PhysicalSize<u32>,
    format: wgpu::TextureFormat,
    sample_count: u32,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });

    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
