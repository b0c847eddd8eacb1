//! Vertex normals drawn as short lines by a geometry shader.
//!
//! N hides or shows the normals.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use glow::HasContext;
use sdl2::keyboard::Keycode;

use super::{CLEAR_COLOR, Scene, SceneContext, SceneSwitch, aspect_ratio, clear};
use crate::{abs::ShaderProgram, camera::Camera, input::UpdateContext, model::Model};

const NORMAL_COLOR: Vec3 = Vec3::new(1.0, 1.0, 0.0);

pub struct NormalVisualizationScene {
    gl: Arc<glow::Context>,
    camera: Camera,
    model_program: ShaderProgram,
    normal_program: ShaderProgram,
    model: Model,
    magnitude: f32,
    show_normals: bool,
}

impl NormalVisualizationScene {
    pub fn new(ctx: &SceneContext) -> Result<Self, String> {
        Ok(Self {
            gl: Arc::clone(&ctx.gl),
            camera: ctx.camera(Vec3::new(0.0, 0.0, 3.0)),
            model_program: ctx.program("unlit_texture")?,
            normal_program: ctx.program("normals")?,
            model: Model::load_or_cube(&ctx.gl, &ctx.model_path("backpack"))?,
            magnitude: ctx.config.chapters.normal_length,
            show_normals: true,
        })
    }
}

impl Scene for NormalVisualizationScene {
    fn update(&mut self, ctx: &UpdateContext) -> SceneSwitch {
        self.camera.update(ctx);
        if ctx.keyboard.was_pressed(Keycode::N) {
            self.show_normals = !self.show_normals;
        }
        SceneSwitch::None
    }

    fn render(&mut self, size: (u32, u32)) {
        unsafe {
            self.gl.enable(glow::DEPTH_TEST);
        }
        clear(
            &self.gl,
            CLEAR_COLOR,
            glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT,
        );

        let projection = self.camera.projection(aspect_ratio(size));
        let view = self.camera.view_matrix();
        let model = Mat4::IDENTITY;

        self.model_program.use_program();
        self.model_program.set_uniform("u_projection", projection);
        self.model_program.set_uniform("u_view", view);
        self.model_program.set_uniform("u_model", model);
        self.model.draw(&self.model_program);

        if self.show_normals {
            self.normal_program.use_program();
            self.normal_program.set_uniform("u_projection", projection);
            self.normal_program.set_uniform("u_view", view);
            self.normal_program.set_uniform("u_model", model);
            self.normal_program
                .set_uniform("u_magnitude", self.magnitude);
            self.normal_program.set_uniform("u_color", NORMAL_COLOR);
            self.model.draw(&self.normal_program);
        }
    }
}
