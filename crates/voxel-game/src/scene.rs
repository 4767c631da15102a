use std::f32::consts::TAU;

use anyhow::Result;
use glam::{Mat4, Vec3};
use voxel_engine::core::Scene;
use voxel_engine::device::{GpuFrame, GraphicsContext};
use voxel_engine::time::FrameTime;
use wgpu::util::DeviceExt;

use crate::shader_program::{Vertex, VoxelShader};
use crate::textures::ATLAS_TILES;

/// Radians per second.
const SPIN_RATE: f32 = 0.4;

const TILE_TOP: u32 = 0;
const TILE_SIDE: u32 = 1;
const TILE_BOTTOM: u32 = 2;

/// One face of the unit cube: corner `origin`, spanned by `u` and `v` with
/// `u × v` pointing outward.
struct Face {
    origin: Vec3,
    u: Vec3,
    v: Vec3,
    tile: u32,
    shade: f32,
}

const FACES: [Face; 6] = [
    // +X
    Face {
        origin: Vec3::new(0.5, -0.5, 0.5),
        u: Vec3::NEG_Z,
        v: Vec3::Y,
        tile: TILE_SIDE,
        shade: 0.8,
    },
    // -X
    Face {
        origin: Vec3::new(-0.5, -0.5, -0.5),
        u: Vec3::Z,
        v: Vec3::Y,
        tile: TILE_SIDE,
        shade: 0.8,
    },
    // +Y
    Face {
        origin: Vec3::new(-0.5, 0.5, 0.5),
        u: Vec3::X,
        v: Vec3::NEG_Z,
        tile: TILE_TOP,
        shade: 1.0,
    },
    // -Y
    Face {
        origin: Vec3::new(-0.5, -0.5, -0.5),
        u: Vec3::X,
        v: Vec3::Z,
        tile: TILE_BOTTOM,
        shade: 0.55,
    },
    // +Z
    Face {
        origin: Vec3::new(-0.5, -0.5, 0.5),
        u: Vec3::X,
        v: Vec3::Y,
        tile: TILE_SIDE,
        shade: 0.9,
    },
    // -Z
    Face {
        origin: Vec3::new(0.5, -0.5, -0.5),
        u: Vec3::NEG_X,
        v: Vec3::Y,
        tile: TILE_SIDE,
        shade: 0.7,
    },
];

/// Unit cube centred on the origin as a counter-clockwise triangle list.
pub(crate) fn cube_vertices() -> Vec<Vertex> {
    let mut out = Vec::with_capacity(FACES.len() * 6);

    for face in &FACES {
        let u0 = face.tile as f32 / ATLAS_TILES as f32;
        let u1 = (face.tile + 1) as f32 / ATLAS_TILES as f32;

        // Image rows grow downwards, so the face's bottom edge samples v = 1.
        let corners = [
            (face.origin, [u0, 1.0]),
            (face.origin + face.u, [u1, 1.0]),
            (face.origin + face.u + face.v, [u1, 0.0]),
            (face.origin + face.v, [u0, 0.0]),
        ];

        for i in [0, 1, 2, 0, 2, 3] {
            let (position, uv) = corners[i];
            out.push(Vertex {
                position: position.to_array(),
                uv,
                shade: face.shade,
            });
        }
    }

    out
}

/// A single spinning grass block.
pub struct VoxelScene {
    pipeline: wgpu::RenderPipeline,
    globals_bind_group: wgpu::BindGroup,
    atlas_bind_group: wgpu::BindGroup,

    model: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,

    vertices: wgpu::Buffer,
    vertex_count: u32,

    angle: f32,
}

impl VoxelScene {
    pub fn new(gfx: &GraphicsContext, shader: &VoxelShader) -> Result<Self> {
        let device = gfx.device();
        let cube = cube_vertices();

        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("voxel cube vbo"),
            contents: bytemuck::cast_slice(&cube),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let model = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("voxel model ubo"),
            contents: bytemuck::cast_slice(&Mat4::IDENTITY.to_cols_array()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let model_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("voxel model bind group"),
            layout: shader.model_layout(),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: model.as_entire_binding(),
            }],
        });

        Ok(Self {
            pipeline: shader.pipeline().clone(),
            globals_bind_group: shader.globals_bind_group().clone(),
            atlas_bind_group: shader.atlas_bind_group().clone(),
            model,
            model_bind_group,
            vertices,
            vertex_count: cube.len() as u32,
            angle: 0.0,
        })
    }
}

impl Scene<GraphicsContext, GpuFrame> for VoxelScene {
    fn update(&mut self, gfx: &GraphicsContext, time: &FrameTime) -> Result<()> {
        self.angle = (self.angle + SPIN_RATE * time.dt) % TAU;

        let model = Mat4::from_rotation_y(self.angle);
        gfx.queue()
            .write_buffer(&self.model, 0, bytemuck::cast_slice(&model.to_cols_array()));
        Ok(())
    }

    fn render(&self, _gfx: &GraphicsContext, frame: &mut GpuFrame) -> Result<()> {
        let mut pass = frame.begin_pass("voxel scene pass");

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.globals_bind_group, &[]);
        pass.set_bind_group(1, &self.atlas_bind_group, &[]);
        pass.set_bind_group(2, &self.model_bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertices.slice(..));
        pass.draw(0..self.vertex_count, 0..1);

        Ok(())
    }
}
