//! Ten textured cubes mixing two images.
//!
//! Up/Down change how much of the second texture shows through.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use glow::HasContext;
use sdl2::keyboard::Keycode;

use super::{CLEAR_COLOR, Scene, SceneContext, SceneSwitch, aspect_ratio, clear};
use crate::{
    abs::{Mesh, ShaderProgram, Texture},
    camera::Camera,
    geometry,
    input::UpdateContext,
};

const ROTATION_AXIS: Vec3 = Vec3::new(1.0, 0.3, 0.5);

pub struct TexturesScene {
    gl: Arc<glow::Context>,
    camera: Camera,
    program: ShaderProgram,
    cube: Mesh,
    container: Texture,
    face: Texture,
    mix: f32,
    time: f32,
}

impl TexturesScene {
    pub fn new(ctx: &SceneContext) -> Result<Self, String> {
        let program = ctx.program("textured")?;
        program.use_program();
        program.set_uniform("u_texture1", 0);
        program.set_uniform("u_texture2", 1);

        Ok(Self {
            gl: Arc::clone(&ctx.gl),
            camera: ctx.camera(Vec3::new(0.0, 0.0, 3.0)),
            program,
            cube: Mesh::from_vertices(&ctx.gl, &geometry::CUBE)?,
            container: ctx.texture("container.jpg")?,
            face: ctx.texture("awesomeface.png")?,
            mix: 0.2,
            time: 0.0,
        })
    }
}

impl Scene for TexturesScene {
    fn update(&mut self, ctx: &UpdateContext) -> SceneSwitch {
        self.camera.update(ctx);
        if ctx.keyboard.is_down(Keycode::Up) {
            self.mix = (self.mix + ctx.delta_time).min(1.0);
        }
        if ctx.keyboard.is_down(Keycode::Down) {
            self.mix = (self.mix - ctx.delta_time).max(0.0);
        }
        self.time = ctx.time;
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

        self.container.bind(0);
        self.face.bind(1);

        self.program.use_program();
        self.program.set_uniform("u_mix", self.mix);
        self.program
            .set_uniform("u_projection", self.camera.projection(aspect_ratio(size)));
        self.program
            .set_uniform("u_view", self.camera.view_matrix());

        for (i, position) in geometry::CUBE_POSITIONS.iter().enumerate() {
            let mut angle = 20.0 * i as f32;
            // Every third cube spins.
            if i % 3 == 0 {
                angle += self.time * 25.0;
            }
            let model = Mat4::from_translation(*position)
                * Mat4::from_axis_angle(ROTATION_AXIS.normalize(), angle.to_radians());
            self.program.set_uniform("u_model", model);
            self.cube.draw();
        }
    }
}
