//! An imported OBJ model lit by the same rig as the lighting chapter.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use glow::HasContext;

use super::{
    CLEAR_COLOR, Scene, SceneContext, SceneSwitch, aspect_ratio, clear,
    lighting::{default_lights, toggle_lights},
};
use crate::{
    abs::ShaderProgram,
    camera::Camera,
    input::UpdateContext,
    model::Model,
    render::lighting::LightSetup,
};

pub struct ModelLoadingScene {
    gl: Arc<glow::Context>,
    camera: Camera,
    program: ShaderProgram,
    model: Model,
    lights: LightSetup,
}

impl ModelLoadingScene {
    pub fn new(ctx: &SceneContext) -> Result<Self, String> {
        let model = Model::load_or_cube(&ctx.gl, &ctx.model_path("backpack"))?;
        log::info!(
            "Model has {} meshes sharing {} textures",
            model.meshes().len(),
            model.textures_loaded()
        );

        Ok(Self {
            gl: Arc::clone(&ctx.gl),
            camera: ctx.camera(Vec3::new(0.0, 0.0, 3.0)),
            program: ctx.program("lit")?,
            model,
            lights: default_lights(),
        })
    }
}

impl Scene for ModelLoadingScene {
    fn update(&mut self, ctx: &UpdateContext) -> SceneSwitch {
        self.camera.update(ctx);
        toggle_lights(&mut self.lights, ctx);
        if let Some(spot) = &mut self.lights.spot {
            spot.position = self.camera.position;
            spot.direction = self.camera.front;
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

        self.program.use_program();
        self.program
            .set_uniform("u_projection", self.camera.projection(aspect_ratio(size)));
        self.program
            .set_uniform("u_view", self.camera.view_matrix());
        self.program
            .set_uniform("u_view_pos", self.camera.position);
        self.program.set_uniform("u_model", Mat4::IDENTITY);
        self.lights.apply(&self.program);
        self.model.draw(&self.program);
    }
}
