use anyhow::Result;
use voxel_engine::core::{Camera, SubsystemFactory};
use voxel_engine::device::{GpuFrame, GraphicsContext};

use crate::player::FlyPlayer;
use crate::scene::VoxelScene;
use crate::shader_program::VoxelShader;
use crate::textures::BlockTextures;

/// Builds the demo's collaborators against the wgpu context.
pub struct VoxelSubsystems;

impl SubsystemFactory<GraphicsContext, GpuFrame> for VoxelSubsystems {
    type Textures = BlockTextures;
    type Player = FlyPlayer;
    type ShaderProgram = VoxelShader;
    type Scene = VoxelScene;

    fn textures(&mut self, gfx: &GraphicsContext) -> Result<BlockTextures> {
        BlockTextures::load(gfx)
    }

    fn player(&mut self, gfx: &GraphicsContext) -> Result<FlyPlayer> {
        Ok(FlyPlayer::new(gfx.aspect_ratio()))
    }

    fn shader_program(
        &mut self,
        gfx: &GraphicsContext,
        textures: &BlockTextures,
        camera: &Camera,
    ) -> Result<VoxelShader> {
        VoxelShader::new(gfx, textures, camera)
    }

    fn scene(&mut self, gfx: &GraphicsContext, shader_program: &VoxelShader) -> Result<VoxelScene> {
        VoxelScene::new(gfx, shader_program)
    }
}
