use std::num::NonZeroU64;

use anyhow::Result;
use bytemuck::{Pod, Zeroable};
use voxel_engine::core::{Camera, ShaderProgram};
use voxel_engine::device::GraphicsContext;
use voxel_engine::time::FrameTime;
use wgpu::util::DeviceExt;

use crate::textures::BlockTextures;

/// Per-frame uniform shared by every draw.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct Globals {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 3],
    time: f32,
}

impl Globals {
    fn new(camera: &Camera, time: f32) -> Self {
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            camera_pos: camera.position.to_array(),
            time,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    /// Flat per-face light factor.
    pub shade: f32,
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x2, // uv
        2 => Float32    // shade
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// The block pipeline and its shared bindings.
///
/// Bind groups: 0 = globals, 1 = block atlas, 2 = per-object model matrix
/// (owned by whoever draws).
pub struct VoxelShader {
    pipeline: wgpu::RenderPipeline,
    globals: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    atlas_bind_group: wgpu::BindGroup,
    model_layout: wgpu::BindGroupLayout,
}

impl VoxelShader {
    pub fn new(gfx: &GraphicsContext, textures: &BlockTextures, camera: &Camera) -> Result<Self> {
        let device = gfx.device();
        let state = gfx.render_state();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("voxel shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/voxel.wgsl").into()),
        });

        let globals_layout = uniform_layout(
            device,
            "voxel globals bgl",
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            std::mem::size_of::<Globals>() as u64,
        );
        let model_layout = uniform_layout(
            device,
            "voxel model bgl",
            wgpu::ShaderStages::VERTEX,
            std::mem::size_of::<[[f32; 4]; 4]>() as u64,
        );

        let atlas_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("voxel atlas bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let globals = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("voxel globals ubo"),
            contents: bytemuck::bytes_of(&Globals::new(camera, 0.0)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("voxel globals bind group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals.as_entire_binding(),
            }],
        });

        let atlas_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("voxel atlas bind group"),
            layout: &atlas_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&textures.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&textures.sampler),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("voxel pipeline layout"),
            bind_group_layouts: &[&globals_layout, &atlas_layout, &model_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("voxel pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gfx.surface_format(),
                    blend: state.blend(),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: state.primitive(),
            depth_stencil: Some(state.depth_stencil(gfx.depth_format())),
            multisample: state.multisample(gfx.sample_count()),
            multiview_mask: None,
            cache: None,
        });

        log::debug!("voxel pipeline built ({:?})", gfx.surface_format());
        Ok(Self {
            pipeline,
            globals,
            globals_bind_group,
            atlas_bind_group,
            model_layout,
        })
    }

    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    pub fn globals_bind_group(&self) -> &wgpu::BindGroup {
        &self.globals_bind_group
    }

    pub fn atlas_bind_group(&self) -> &wgpu::BindGroup {
        &self.atlas_bind_group
    }

    /// Layout for bind group 2.
    pub fn model_layout(&self) -> &wgpu::BindGroupLayout {
        &self.model_layout
    }
}

impl ShaderProgram<GraphicsContext> for VoxelShader {
    fn update(&mut self, gfx: &GraphicsContext, camera: &Camera, time: &FrameTime) -> Result<()> {
        let globals = Globals::new(camera, time.elapsed);
        gfx.queue()
            .write_buffer(&self.globals, 0, bytemuck::bytes_of(&globals));
        Ok(())
    }
}

fn uniform_layout(
    device: &wgpu::Device,
    label: &str,
    visibility: wgpu::ShaderStages,
    size: u64,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: NonZeroU64::new(size),
            },
            count: None,
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec3};

    #[test]
    fn globals_match_the_wgsl_layout() {
        // mat4x4<f32> + vec3<f32> + f32
        assert_eq!(std::mem::size_of::<Globals>(), 80);
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
    }

    #[test]
    fn globals_carry_camera_and_time() {
        let camera = Camera {
            position: Vec3::new(1.0, 2.0, 3.0),
            view: Mat4::from_translation(Vec3::new(-1.0, -2.0, -3.0)),
            projection: Mat4::perspective_rh(1.0, 1.5, 0.1, 10.0),
        };
        let g = Globals::new(&camera, 4.5);

        assert_eq!(g.view_proj, camera.view_projection().to_cols_array_2d());
        assert_eq!(g.camera_pos, [1.0, 2.0, 3.0]);
        assert_eq!(g.time, 4.5);
    }
}
