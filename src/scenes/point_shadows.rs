//! Omnidirectional shadows from a point light.
//!
//! Linear light distance is rendered into all six faces of a depth cube map in a single pass,
//! with a geometry shader routing each triangle to every face. The light slides back and
//! forth through the room; T toggles shadows.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use glow::HasContext;
use sdl2::keyboard::Keycode;

use super::{Scene, SceneContext, SceneSwitch, aspect_ratio, clear, reset_viewport};
use crate::{
    abs::{Framebuffer, Mesh, ShaderProgram, Texture},
    camera::Camera,
    geometry,
    input::UpdateContext,
    render::shadow::point_light_transforms,
};

const NEAR_PLANE: f32 = 1.0;
const FAR_PLANE: f32 = 25.0;
/// Edge length of the room cube.
const ROOM_SIZE: f32 = 10.0;

/// Amplitude of the light's swing along Z.
const LIGHT_SWING: f32 = 3.0;

/// Position of the light `time` seconds into the chapter. It swings along Z through the centre
/// of the room with a period of 4π seconds.
pub fn light_position(time: f32) -> Vec3 {
    Vec3::new(0.0, 0.0, (time * 0.5).sin() * LIGHT_SWING)
}

fn cube_transforms() -> [Mat4; 5] {
    let place = |position: Vec3, scale: f32| {
        Mat4::from_translation(position) * Mat4::from_scale(Vec3::splat(scale))
    };
    [
        place(Vec3::new(4.0, -3.5, 0.0), 1.0),
        place(Vec3::new(2.0, 3.0, 1.0), 1.5),
        place(Vec3::new(-3.0, -1.0, 0.0), 1.0),
        place(Vec3::new(-1.5, 1.0, 1.5), 1.0),
        Mat4::from_translation(Vec3::new(-1.5, 2.0, -3.0))
            * Mat4::from_axis_angle(Vec3::new(1.0, 0.0, 1.0).normalize(), 60f32.to_radians())
            * Mat4::from_scale(Vec3::splat(1.5)),
    ]
}

pub struct PointShadowsScene {
    gl: Arc<glow::Context>,
    camera: Camera,
    depth_program: ShaderProgram,
    lit_program: ShaderProgram,
    lamp_program: ShaderProgram,
    depth_cube: Framebuffer,
    cube: Mesh,
    wood: Texture,
    light_pos: Vec3,
    shadows: bool,
}

impl PointShadowsScene {
    pub fn new(ctx: &SceneContext) -> Result<Self, String> {
        let size = ctx.config.chapters.shadow_map_size as i32;
        let lit_program = ctx.program("point_shadow_lit")?;
        lit_program.use_program();
        lit_program.set_uniform("u_diffuse", 0);
        lit_program.set_uniform("u_depth_map", 1);

        Ok(Self {
            gl: Arc::clone(&ctx.gl),
            camera: ctx.camera(Vec3::new(0.0, 0.0, 3.0)),
            depth_program: ctx.program("point_shadow_depth")?,
            lit_program,
            lamp_program: ctx.program("solid_color")?,
            depth_cube: Framebuffer::depth_cube(&ctx.gl, size)?,
            cube: Mesh::from_vertices(&ctx.gl, &geometry::CUBE)?,
            wood: ctx.texture("wood.png")?,
            light_pos: light_position(0.0),
            shadows: true,
        })
    }

    /// Draws the room and the cubes inside it. The room is seen from the inside, so culling
    /// is off and its normals are flipped.
    fn draw_scene(&self, program: &ShaderProgram) {
        unsafe {
            self.gl.disable(glow::CULL_FACE);
        }
        program.set_uniform("u_reverse_normals", true);
        program.set_uniform("u_model", Mat4::from_scale(Vec3::splat(ROOM_SIZE)));
        self.cube.draw();
        program.set_uniform("u_reverse_normals", false);

        unsafe {
            self.gl.enable(glow::CULL_FACE);
        }
        for model in cube_transforms() {
            program.set_uniform("u_model", model);
            self.cube.draw();
        }
        unsafe {
            self.gl.disable(glow::CULL_FACE);
        }
    }
}

impl Scene for PointShadowsScene {
    fn update(&mut self, ctx: &UpdateContext) -> SceneSwitch {
        self.camera.update(ctx);
        if ctx.keyboard.was_pressed(Keycode::T) {
            self.shadows = !self.shadows;
            log::info!("Shadows {}", if self.shadows { "on" } else { "off" });
        }
        self.light_pos = light_position(ctx.time);
        SceneSwitch::None
    }

    fn render(&mut self, size: (u32, u32)) {
        unsafe {
            self.gl.enable(glow::DEPTH_TEST);
        }

        self.depth_cube.bind();
        unsafe {
            self.gl.clear(glow::DEPTH_BUFFER_BIT);
        }
        self.depth_program.use_program();
        self.depth_program.set_uniform(
            "u_shadow_matrices",
            point_light_transforms(self.light_pos, NEAR_PLANE, FAR_PLANE),
        );
        self.depth_program.set_uniform("u_far_plane", FAR_PLANE);
        self.depth_program.set_uniform("u_light_pos", self.light_pos);
        self.draw_scene(&self.depth_program);
        Framebuffer::unbind(&self.gl);

        reset_viewport(&self.gl, size);
        clear(
            &self.gl,
            [0.1, 0.1, 0.1],
            glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT,
        );

        let projection = self.camera.projection(aspect_ratio(size));
        let view = self.camera.view_matrix();

        self.lit_program.use_program();
        self.lit_program.set_uniform("u_projection", projection);
        self.lit_program.set_uniform("u_view", view);
        self.lit_program
            .set_uniform("u_view_pos", self.camera.position);
        self.lit_program.set_uniform("u_light_pos", self.light_pos);
        self.lit_program.set_uniform("u_far_plane", FAR_PLANE);
        self.lit_program.set_uniform("u_shadows", self.shadows);
        self.wood.bind(0);
        if let Some(depth) = self.depth_cube.depth_texture() {
            depth.bind(1);
        }
        self.draw_scene(&self.lit_program);

        self.lamp_program.use_program();
        self.lamp_program.set_uniform("u_projection", projection);
        self.lamp_program.set_uniform("u_view", view);
        self.lamp_program.set_uniform(
            "u_model",
            Mat4::from_translation(self.light_pos) * Mat4::from_scale(Vec3::splat(0.1)),
        );
        self.lamp_program.set_uniform("u_color", Vec3::ONE);
        self.cube.draw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_stays_inside_the_room() {
        for step in 0..200 {
            let pos = light_position(step as f32 * 0.1);
            assert!(pos.abs().max_element() < ROOM_SIZE * 0.5);
        }
    }

    #[test]
    fn light_swings_along_z() {
        assert_eq!(light_position(0.0), Vec3::ZERO);
        let peak = light_position(std::f32::consts::PI);
        assert!(peak.abs_diff_eq(Vec3::new(0.0, 0.0, LIGHT_SWING), 1e-5));
        let trough = light_position(3.0 * std::f32::consts::PI);
        assert!(trough.abs_diff_eq(Vec3::new(0.0, 0.0, -LIGHT_SWING), 1e-5));
        for step in 0..100 {
            let pos = light_position(step as f32 * 0.3);
            assert_eq!((pos.x, pos.y), (0.0, 0.0));
        }
    }

    #[test]
    fn far_plane_covers_the_room() {
        // The farthest corner from any light position must still fit in the depth range.
        let corner = Vec3::splat(ROOM_SIZE * 0.5);
        let farthest = light_position(-std::f32::consts::PI).distance(corner);
        assert!(farthest < FAR_PLANE);
    }
}
