//! A cube map skybox and a cube reflecting or refracting it.
//!
//! R switches the cube between a mirror and glass.

use std::sync::Arc;

use glam::{Mat3, Mat4, Vec3};
use glow::HasContext;
use sdl2::keyboard::Keycode;

use super::{Scene, SceneContext, SceneSwitch, aspect_ratio, clear};
use crate::{
    abs::{Mesh, ShaderProgram, Texture},
    camera::Camera,
    geometry,
    input::UpdateContext,
};

/// Face images in cube map order: +X, -X, +Y, -Y, +Z, -Z.
pub const FACES: [&str; 6] = ["right", "left", "top", "bottom", "front", "back"];

/// Ratio of refractive indices going from air into glass.
pub const REFRACTION_RATIO: f32 = 1.00 / 1.52;

/// Removes the translation of a view matrix so the sky stays centred on the camera.
pub fn without_translation(view: Mat4) -> Mat4 {
    Mat4::from_mat3(Mat3::from_mat4(view))
}

pub struct SkyboxScene {
    gl: Arc<glow::Context>,
    camera: Camera,
    sky_program: ShaderProgram,
    environment_program: ShaderProgram,
    cube: Mesh,
    sky: Mesh,
    cubemap: Texture,
    refract: bool,
}

impl SkyboxScene {
    pub fn new(ctx: &SceneContext) -> Result<Self, String> {
        let faces = FACES.map(|face| ctx.asset_path("skybox", &format!("{face}.jpg")));
        let cubemap = match Texture::cubemap(&ctx.gl, &faces) {
            Ok(texture) => texture,
            Err(e) => {
                log::error!("{e}; using a plain sky");
                Texture::solid_cubemap(&ctx.gl, [110, 150, 200, 255])?
            }
        };

        let sky_program = ctx.program("skybox")?;
        sky_program.use_program();
        sky_program.set_uniform("u_skybox", 0);
        let environment_program = ctx.program("environment")?;
        environment_program.use_program();
        environment_program.set_uniform("u_skybox", 0);
        environment_program.set_uniform("u_refraction_ratio", REFRACTION_RATIO);

        Ok(Self {
            gl: Arc::clone(&ctx.gl),
            camera: ctx.camera(Vec3::new(0.0, 0.0, 3.0)),
            sky_program,
            environment_program,
            cube: Mesh::from_vertices(&ctx.gl, &geometry::CUBE)?,
            sky: Mesh::from_vertices(&ctx.gl, &geometry::skybox())?,
            cubemap,
            refract: false,
        })
    }
}

impl Scene for SkyboxScene {
    fn update(&mut self, ctx: &UpdateContext) -> SceneSwitch {
        self.camera.update(ctx);
        if ctx.keyboard.was_pressed(Keycode::R) {
            self.refract = !self.refract;
            log::info!("{}", if self.refract { "Refraction" } else { "Reflection" });
        }
        SceneSwitch::None
    }

    fn render(&mut self, size: (u32, u32)) {
        unsafe {
            self.gl.enable(glow::DEPTH_TEST);
            self.gl.depth_func(glow::LESS);
        }
        clear(
            &self.gl,
            [0.1, 0.1, 0.1],
            glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT,
        );

        let projection = self.camera.projection(aspect_ratio(size));
        let view = self.camera.view_matrix();

        self.cubemap.bind(0);

        self.environment_program.use_program();
        self.environment_program
            .set_uniform("u_projection", projection);
        self.environment_program.set_uniform("u_view", view);
        self.environment_program
            .set_uniform("u_model", Mat4::IDENTITY);
        self.environment_program
            .set_uniform("u_camera_pos", self.camera.position);
        self.environment_program
            .set_uniform("u_refract", self.refract);
        self.cube.draw();

        // The sky is drawn last at depth 1.0, so it only fills pixels nothing else covered.
        unsafe {
            self.gl.depth_func(glow::LEQUAL);
        }
        self.sky_program.use_program();
        self.sky_program.set_uniform("u_projection", projection);
        self.sky_program
            .set_uniform("u_view", without_translation(view));
        self.sky.draw();
        unsafe {
            self.gl.depth_func(glow::LESS);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sky_ignores_camera_position() {
        let near = Camera::new(Vec3::ZERO).view_matrix();
        let far = Camera::new(Vec3::new(10.0, -4.0, 7.0)).view_matrix();
        assert!(without_translation(near).abs_diff_eq(without_translation(far), 1e-5));
        assert_eq!(without_translation(far).w_axis, glam::Vec4::W);
    }

    #[test]
    fn rotation_is_kept() {
        let view = Camera::new(Vec3::new(1.0, 2.0, 3.0))
            .looking_at(Vec3::ZERO)
            .view_matrix();
        let dir = Vec3::new(0.3, 0.4, -1.0);
        let rotated = without_translation(view).transform_vector3(dir);
        assert!(rotated.abs_diff_eq(view.transform_vector3(dir), 1e-5));
    }
}
