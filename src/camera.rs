//! A free-flying camera driven by keyboard, mouse and scroll wheel.

use glam::{Mat4, Vec3};
use sdl2::keyboard::Keycode;

use crate::{config::CameraConfig, input::UpdateContext};

pub const DEFAULT_YAW: f32 = -90.0;
pub const DEFAULT_PITCH: f32 = 0.0;
pub const DEFAULT_ZOOM: f32 = 45.0;
pub const MIN_ZOOM: f32 = 1.0;
pub const MAX_ZOOM: f32 = 45.0;
pub const PITCH_LIMIT: f32 = 89.0;
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 100.0;

/// Directions the camera can move in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Euler-angle camera. Angles are in degrees.
#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Vec3,
    pub front: Vec3,
    pub up: Vec3,
    pub right: Vec3,
    pub world_up: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    /// Vertical field of view.
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl Camera {
    /// A camera at `position` looking down -Z.
    pub fn new(position: Vec3) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up: Vec3::Y,
            right: Vec3::X,
            world_up: Vec3::Y,
            yaw: DEFAULT_YAW,
            pitch: DEFAULT_PITCH,
            movement_speed: 2.5,
            mouse_sensitivity: 0.1,
            zoom: DEFAULT_ZOOM,
        };
        camera.update_vectors();
        camera
    }

    /// Applies speed and sensitivity from the configuration.
    pub fn with_config(mut self, config: &CameraConfig) -> Self {
        self.movement_speed = config.speed;
        self.mouse_sensitivity = config.sensitivity;
        self
    }

    /// Points the camera at `target` by deriving yaw and pitch from the direction.
    pub fn looking_at(mut self, target: Vec3) -> Self {
        let dir = (target - self.position).normalize_or(Vec3::NEG_Z);
        self.pitch = dir.y.asin().to_degrees().clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.yaw = dir.z.atan2(dir.x).to_degrees();
        self.update_vectors();
        self
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    pub fn projection(&self, aspect_ratio: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.zoom.to_radians(), aspect_ratio, Z_NEAR, Z_FAR)
    }

    /// Moves the camera by `movement_speed * delta_time` in the given direction.
    pub fn process_keyboard(&mut self, direction: CameraMovement, delta_time: f32) {
        let velocity = self.movement_speed * delta_time;
        self.position += match direction {
            CameraMovement::Forward => self.front * velocity,
            CameraMovement::Backward => -self.front * velocity,
            CameraMovement::Left => -self.right * velocity,
            CameraMovement::Right => self.right * velocity,
            CameraMovement::Up => self.world_up * velocity,
            CameraMovement::Down => -self.world_up * velocity,
        };
    }

    /// Turns the camera. A positive `y_offset` looks up.
    pub fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32, constrain_pitch: bool) {
        self.yaw += x_offset * self.mouse_sensitivity;
        self.pitch += y_offset * self.mouse_sensitivity;

        if constrain_pitch {
            self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }

        self.update_vectors();
    }

    /// Zooms in for positive `y_offset`.
    pub fn process_mouse_scroll(&mut self, y_offset: f32) {
        self.zoom = (self.zoom - y_offset).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Applies the usual fly controls from one frame of input: WASD to move, Space and
    /// left shift to rise and sink, mouse to look around and the wheel to zoom.
    pub fn update(&mut self, ctx: &UpdateContext) {
        const BINDINGS: [(Keycode, CameraMovement); 6] = [
            (Keycode::W, CameraMovement::Forward),
            (Keycode::S, CameraMovement::Backward),
            (Keycode::A, CameraMovement::Left),
            (Keycode::D, CameraMovement::Right),
            (Keycode::Space, CameraMovement::Up),
            (Keycode::LShift, CameraMovement::Down),
        ];
        for (key, movement) in BINDINGS {
            if ctx.keyboard.is_down(key) {
                self.process_keyboard(movement, ctx.delta_time);
            }
        }

        let delta = ctx.mouse.delta;
        if delta.x != 0.0 || delta.y != 0.0 {
            // Window y grows downwards.
            self.process_mouse_movement(delta.x, -delta.y, true);
        }
        if ctx.mouse.scroll_delta.y != 0.0 {
            self.process_mouse_scroll(ctx.mouse.scroll_delta.y);
        }
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos())
            .normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputState;

    fn approx(a: Vec3, b: Vec3) -> bool {
        a.abs_diff_eq(b, 1e-5)
    }

    #[test]
    fn default_camera_looks_down_negative_z() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 3.0));
        assert!(approx(camera.front, Vec3::NEG_Z));
        assert!(approx(camera.right, Vec3::X));
        assert!(approx(camera.up, Vec3::Y));
    }

    #[test]
    fn keyboard_moves_by_speed_times_delta() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.process_keyboard(CameraMovement::Forward, 2.0);
        assert!(approx(camera.position, Vec3::new(0.0, 0.0, -5.0)));
        camera.process_keyboard(CameraMovement::Right, 1.0);
        assert!(approx(camera.position, Vec3::new(2.5, 0.0, -5.0)));
        camera.process_keyboard(CameraMovement::Up, 0.4);
        assert!(approx(camera.position, Vec3::new(2.5, 1.0, -5.0)));
    }

    #[test]
    fn pitch_is_constrained() {
        let mut camera = Camera::default();
        camera.process_mouse_movement(0.0, 10_000.0, true);
        assert_eq!(camera.pitch, PITCH_LIMIT);
        camera.process_mouse_movement(0.0, -10_000.0, true);
        assert_eq!(camera.pitch, -PITCH_LIMIT);

        camera.process_mouse_movement(0.0, -10_000.0, false);
        assert!(camera.pitch < -PITCH_LIMIT);
    }

    #[test]
    fn yaw_turns_right() {
        let mut camera = Camera::default();
        // 90 degrees at the default sensitivity.
        camera.process_mouse_movement(900.0, 0.0, true);
        assert!(approx(camera.front, Vec3::X));
    }

    #[test]
    fn zoom_is_clamped() {
        let mut camera = Camera::default();
        camera.process_mouse_scroll(10.0);
        assert_eq!(camera.zoom, 35.0);
        camera.process_mouse_scroll(100.0);
        assert_eq!(camera.zoom, MIN_ZOOM);
        camera.process_mouse_scroll(-100.0);
        assert_eq!(camera.zoom, MAX_ZOOM);
    }

    #[test]
    fn view_matrix_puts_target_in_front() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 3.0)).looking_at(Vec3::new(1.0, 0.0, 0.0));
        let p = camera.view_matrix().transform_point3(Vec3::new(1.0, 0.0, 0.0));
        assert!(p.x.abs() < 1e-4 && p.y.abs() < 1e-4);
        assert!(p.z < 0.0);
    }

    #[test]
    fn update_reads_keys_and_inverts_mouse_y() {
        let mut input = InputState::default();
        input.keyboard.press(Keycode::W);
        input.mouse.delta = glam::Vec2::new(0.0, -100.0);
        let ctx = UpdateContext::new(&input, 1.0, 0.0);

        let mut camera = Camera::default();
        camera.update(&ctx);
        // Mouse moved up, so the camera looks up.
        assert!((camera.pitch - 10.0).abs() < 1e-4);
        assert!(camera.position.z < 0.0);
    }
}
