//! Directional shadows from a 2D depth map.
//!
//! The scene is first rendered from the light into a depth-only framebuffer, then from the
//! camera with the depth map bound. T toggles shadows.

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
    render::shadow::directional_light_space,
};

const LIGHT_POS: Vec3 = Vec3::new(-2.0, 4.0, -1.0);
const LIGHT_HALF_EXTENT: f32 = 10.0;
const LIGHT_NEAR: f32 = 1.0;
const LIGHT_FAR: f32 = 7.5;

/// Model matrices of the three cubes standing on the floor.
fn cube_transforms() -> [Mat4; 3] {
    [
        Mat4::from_translation(Vec3::new(0.0, 1.5, 0.0)),
        Mat4::from_translation(Vec3::new(2.0, 0.0, 1.0)),
        Mat4::from_translation(Vec3::new(-1.0, 0.0, 2.0))
            * Mat4::from_axis_angle(Vec3::new(1.0, 0.0, 1.0).normalize(), 60f32.to_radians())
            * Mat4::from_scale(Vec3::splat(0.5)),
    ]
}

pub struct ShadowMappingScene {
    gl: Arc<glow::Context>,
    camera: Camera,
    depth_program: ShaderProgram,
    lit_program: ShaderProgram,
    depth_map: Framebuffer,
    floor: Mesh,
    cube: Mesh,
    wood: Texture,
    light_space: Mat4,
    shadows: bool,
}

impl ShadowMappingScene {
    pub fn new(ctx: &SceneContext) -> Result<Self, String> {
        let size = ctx.config.chapters.shadow_map_size as i32;
        let lit_program = ctx.program("shadow_lit")?;
        lit_program.use_program();
        lit_program.set_uniform("u_diffuse", 0);
        lit_program.set_uniform("u_shadow_map", 1);

        Ok(Self {
            gl: Arc::clone(&ctx.gl),
            camera: ctx
                .camera(Vec3::new(0.0, 2.0, 5.0))
                .looking_at(Vec3::ZERO),
            depth_program: ctx.program("shadow_depth")?,
            lit_program,
            depth_map: Framebuffer::depth(&ctx.gl, size, size)?,
            floor: Mesh::from_vertices(&ctx.gl, &geometry::floor(25.0, 25.0))?,
            cube: Mesh::from_vertices(&ctx.gl, &geometry::CUBE)?,
            wood: ctx.texture("wood.png")?,
            light_space: directional_light_space(
                LIGHT_POS,
                Vec3::ZERO,
                LIGHT_HALF_EXTENT,
                LIGHT_NEAR,
                LIGHT_FAR,
            ),
            shadows: true,
        })
    }

    fn draw_scene(&self, program: &ShaderProgram) {
        program.set_uniform("u_model", Mat4::IDENTITY);
        self.floor.draw();
        for model in cube_transforms() {
            program.set_uniform("u_model", model);
            self.cube.draw();
        }
    }
}

impl Scene for ShadowMappingScene {
    fn update(&mut self, ctx: &UpdateContext) -> SceneSwitch {
        self.camera.update(ctx);
        if ctx.keyboard.was_pressed(Keycode::T) {
            self.shadows = !self.shadows;
            log::info!("Shadows {}", if self.shadows { "on" } else { "off" });
        }
        SceneSwitch::None
    }

    fn render(&mut self, size: (u32, u32)) {
        // Depth pass. Culling front faces keeps the depth of back faces in the map, which
        // removes most acne on lit surfaces.
        self.depth_map.bind();
        unsafe {
            self.gl.enable(glow::DEPTH_TEST);
            self.gl.clear(glow::DEPTH_BUFFER_BIT);
            self.gl.enable(glow::CULL_FACE);
            self.gl.cull_face(glow::FRONT);
        }
        self.depth_program.use_program();
        self.depth_program
            .set_uniform("u_light_space", self.light_space);
        self.draw_scene(&self.depth_program);
        unsafe {
            self.gl.cull_face(glow::BACK);
            self.gl.disable(glow::CULL_FACE);
        }
        Framebuffer::unbind(&self.gl);

        reset_viewport(&self.gl, size);
        clear(
            &self.gl,
            [0.1, 0.1, 0.1],
            glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT,
        );

        self.lit_program.use_program();
        self.lit_program
            .set_uniform("u_projection", self.camera.projection(aspect_ratio(size)));
        self.lit_program
            .set_uniform("u_view", self.camera.view_matrix());
        self.lit_program
            .set_uniform("u_view_pos", self.camera.position);
        self.lit_program.set_uniform("u_light_pos", LIGHT_POS);
        self.lit_program
            .set_uniform("u_light_space", self.light_space);
        self.lit_program.set_uniform("u_shadows", self.shadows);

        self.wood.bind(0);
        if let Some(depth) = self.depth_map.depth_texture() {
            depth.bind(1);
        }
        self.draw_scene(&self.lit_program);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cubes_are_inside_the_light_frustum() {
        let light_space =
            directional_light_space(LIGHT_POS, Vec3::ZERO, LIGHT_HALF_EXTENT, LIGHT_NEAR, LIGHT_FAR);
        for model in cube_transforms() {
            let ndc = light_space.project_point3(model.transform_point3(Vec3::ZERO));
            assert!(ndc.abs().max_element() <= 1.0, "{ndc}");
        }
    }
}
