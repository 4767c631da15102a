use std::f32::consts::FRAC_PI_2;

use anyhow::{Result, ensure};
use glam::{Mat4, Vec3};
use voxel_engine::core::{Camera, Player};
use voxel_engine::input::{InputEvent, InputState, Key};
use voxel_engine::time::FrameTime;

/// World units per second.
const MOVE_SPEED: f32 = 4.0;
/// Radians per pixel of raw mouse motion.
const MOUSE_SENSITIVITY: f32 = 0.002;
const MAX_PITCH_DEG: f32 = 89.0;

const FOV_Y_DEG: f32 = 60.0;
const Z_NEAR: f32 = 0.05;
const Z_FAR: f32 = 200.0;

/// Free-flying first-person camera.
///
/// WASD moves on the horizontal plane, Space and Shift move up and down, and
/// raw mouse motion turns the view.
pub struct FlyPlayer {
    position: Vec3,
    yaw: f32,
    pitch: f32,
    aspect: f32,
    input: InputState,
}

impl FlyPlayer {
    pub fn new(aspect: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.75, 3.0),
            // Looking down -Z.
            yaw: -FRAC_PI_2,
            pitch: 0.0,
            aspect,
            input: InputState::default(),
        }
    }

    fn forward(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vec3::new(cos_yaw * cos_pitch, sin_pitch, sin_yaw * cos_pitch)
    }

    /// Unit direction of travel from the held keys; zero when idle.
    fn heading(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let ahead = Vec3::new(cos_yaw, 0.0, sin_yaw);
        let right = ahead.cross(Vec3::Y);

        let held = |key| self.input.key_down(key);
        let mut dir = Vec3::ZERO;
        if held(Key::W) {
            dir += ahead;
        }
        if held(Key::S) {
            dir -= ahead;
        }
        if held(Key::D) {
            dir += right;
        }
        if held(Key::A) {
            dir -= right;
        }
        if held(Key::Space) {
            dir += Vec3::Y;
        }
        if held(Key::Shift) {
            dir -= Vec3::Y;
        }
        dir.normalize_or_zero()
    }
}

impl Player for FlyPlayer {
    fn handle_event(&mut self, event: &InputEvent) -> Result<()> {
        self.input.apply_event(event);

        match event {
            InputEvent::MouseMotion { dx, dy } => {
                let max_pitch = MAX_PITCH_DEG.to_radians();
                self.yaw += dx * MOUSE_SENSITIVITY;
                self.pitch = (self.pitch - dy * MOUSE_SENSITIVITY).clamp(-max_pitch, max_pitch);
            }
            InputEvent::Resized { width, height } if *width > 0 && *height > 0 => {
                self.aspect = *width as f32 / *height as f32;
            }
            _ => {}
        }

        Ok(())
    }

    fn update(&mut self, time: &FrameTime) -> Result<()> {
        self.position += self.heading() * MOVE_SPEED * time.dt;
        ensure!(
            self.position.is_finite(),
            "player position diverged: {}",
            self.position
        );
        Ok(())
    }

    fn camera(&self) -> Camera {
        Camera {
            position: self.position,
            view: Mat4::look_to_rh(self.position, self.forward(), Vec3::Y),
            projection: Mat4::perspective_rh(FOV_Y_DEG.to_radians(), self.aspect, Z_NEAR, Z_FAR),
        }
    }
}
