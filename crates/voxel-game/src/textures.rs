use anyhow::{Context, Result, ensure};
use voxel_engine::device::GraphicsContext;

const ATLAS_PNG: &[u8] = include_bytes!("../assets/atlas.png");

/// Square tiles laid out left to right in the atlas.
pub const ATLAS_TILES: u32 = 4;

/// Block texture atlas, decoded and uploaded once at startup.
pub struct BlockTextures {
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl BlockTextures {
    pub fn load(gfx: &GraphicsContext) -> Result<Self> {
        let atlas = decode_atlas()?;
        let (width, height) = atlas.dimensions();
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = gfx.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("voxel block atlas"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        gfx.queue().write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            atlas.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        // Nearest filtering keeps the texels crisp.
        let sampler = gfx.device().create_sampler(&wgpu::SamplerDescriptor {
            label: Some("voxel block sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        log::info!("block atlas uploaded ({width}x{height})");
        Ok(Self {
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
            sampler,
        })
    }
}

fn decode_atlas() -> Result<image::RgbaImage> {
    let atlas = image::load_from_memory(ATLAS_PNG)
        .context("failed to decode block atlas")?
        .to_rgba8();

    let (width, height) = atlas.dimensions();
    ensure!(
        width == height * ATLAS_TILES,
        "block atlas must be a row of {ATLAS_TILES} square tiles, got {width}x{height}"
    );
    Ok(atlas)
}
