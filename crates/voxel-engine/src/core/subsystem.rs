use anyhow::Result;

use crate::input::InputEvent;
use crate::time::FrameTime;

use super::camera::Camera;
use super::fault::{Fault, InPhase, InitStep, Phase};

/// Simulation collaborator fed by input.
pub trait Player {
    /// Handles one input event. A failure affects only that event.
    fn handle_event(&mut self, event: &InputEvent) -> Result<()>;

    /// Advances camera and movement state.
    fn update(&mut self, time: &FrameTime) -> Result<()>;

    fn camera(&self) -> Camera;
}

/// Owns GPU programs and pushes time-varying uniforms.
pub trait ShaderProgram<G> {
    /// Writes uniforms for the frame. Must not create programs.
    fn update(&mut self, gfx: &G, camera: &Camera, time: &FrameTime) -> Result<()>;
}

/// Owns scene geometry and issues draw calls.
pub trait Scene<G, F> {
    fn update(&mut self, gfx: &G, time: &FrameTime) -> Result<()>;

    /// Records draw calls into `frame`. Must not mutate simulation state.
    fn render(&self, gfx: &G, frame: &mut F) -> Result<()>;
}

/// Builds the subsystem set. Each constructor receives only the graphics
/// handle and the earlier members it depends on.
pub trait SubsystemFactory<G, F> {
    type Textures;
    type Player: Player;
    type ShaderProgram: ShaderProgram<G>;
    type Scene: Scene<G, F>;

    fn textures(&mut self, gfx: &G) -> Result<Self::Textures>;

    fn player(&mut self, gfx: &G) -> Result<Self::Player>;

    fn shader_program(
        &mut self,
        gfx: &G,
        textures: &Self::Textures,
        camera: &Camera,
    ) -> Result<Self::ShaderProgram>;

    fn scene(&mut self, gfx: &G, shader_program: &Self::ShaderProgram) -> Result<Self::Scene>;
}

/// The four collaborators owned by the driver.
pub struct SubsystemSet<T, Pl, Sh, Sc> {
    pub textures: T,
    pub player: Pl,
    pub shader_program: Sh,
    pub scene: Sc,
}

impl<T, Pl, Sh, Sc> SubsystemSet<T, Pl, Sh, Sc>
where
    Pl: Player,
{
    /// Constructs textures → player → shader program → scene.
    ///
    /// Stops at the first failing step; the fault names it.
    pub fn build<G, F, S>(factory: &mut S, gfx: &G) -> Result<Self, Fault>
    where
        S: SubsystemFactory<G, F, Textures = T, Player = Pl, ShaderProgram = Sh, Scene = Sc>,
    {
        log::info!("loading textures");
        let textures = factory
            .textures(gfx)
            .in_phase(Phase::Init(InitStep::Textures))?;

        log::info!("creating player");
        let player = factory
            .player(gfx)
            .in_phase(Phase::Init(InitStep::Player))?;

        log::info!("setting up shader program");
        let shader_program = factory
            .shader_program(gfx, &textures, &player.camera())
            .in_phase(Phase::Init(InitStep::ShaderProgram))?;

        log::info!("creating scene");
        let scene = factory
            .scene(gfx, &shader_program)
            .in_phase(Phase::Init(InitStep::Scene))?;

        log::info!("initialization complete");
        Ok(Self {
            textures,
            player,
            shader_program,
            scene,
        })
    }
}
