//! Post-processing through an offscreen framebuffer.
//!
//! The scene is rendered into a color texture which is then drawn over the whole window with
//! a screen-space effect. E and Q cycle through the effects.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use glow::HasContext;
use sdl2::keyboard::Keycode;

use super::{Scene, SceneContext, SceneSwitch, aspect_ratio, clear, reset_viewport, stencil_outline};
use crate::{
    abs::{Framebuffer, Mesh, ShaderProgram, Texture},
    camera::Camera,
    geometry,
    input::UpdateContext,
    render::postprocess::PostEffect,
};

pub struct FramebuffersScene {
    gl: Arc<glow::Context>,
    camera: Camera,
    scene_program: ShaderProgram,
    screen_program: ShaderProgram,
    framebuffer: Framebuffer,
    cube: Mesh,
    floor: Mesh,
    quad: Mesh,
    container: Texture,
    metal: Texture,
    effect: PostEffect,
}

impl FramebuffersScene {
    pub fn new(ctx: &SceneContext) -> Result<Self, String> {
        let scene_program = ctx.program("unlit_texture")?;
        scene_program.use_program();
        scene_program.set_uniform("u_material.diffuse", 0);
        let screen_program = ctx.program("screen")?;
        screen_program.use_program();
        screen_program.set_uniform("u_screen", 0);

        let (width, height) = ctx.size;
        Ok(Self {
            gl: Arc::clone(&ctx.gl),
            camera: ctx.camera(Vec3::new(0.0, 0.0, 3.0)),
            scene_program,
            screen_program,
            framebuffer: Framebuffer::color(&ctx.gl, width.max(1) as i32, height.max(1) as i32)?,
            cube: Mesh::from_vertices(&ctx.gl, &geometry::CUBE)?,
            floor: Mesh::from_vertices(&ctx.gl, &geometry::floor(5.0, 2.0))?,
            quad: Mesh::from_vertices(&ctx.gl, &geometry::screen_quad())?,
            container: ctx.texture("container.jpg")?,
            metal: ctx.texture("metal.png")?,
            effect: PostEffect::None,
        })
    }

    fn set_effect(&mut self, effect: PostEffect) {
        self.effect = effect;
        log::info!("Post effect: {}", effect.name());
    }
}

impl Scene for FramebuffersScene {
    fn resize(&mut self, width: u32, height: u32) -> Result<(), String> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.framebuffer = Framebuffer::color(&self.gl, width as i32, height as i32)?;
        log::debug!("Recreated post-processing framebuffer at {width}x{height}");
        Ok(())
    }

    fn update(&mut self, ctx: &UpdateContext) -> SceneSwitch {
        self.camera.update(ctx);
        if ctx.keyboard.was_pressed(Keycode::E) {
            self.set_effect(self.effect.next());
        }
        if ctx.keyboard.was_pressed(Keycode::Q) {
            self.set_effect(self.effect.previous());
        }
        SceneSwitch::None
    }

    fn render(&mut self, size: (u32, u32)) {
        // Scene pass, into the offscreen color buffer.
        self.framebuffer.bind();
        unsafe {
            self.gl.enable(glow::DEPTH_TEST);
        }
        clear(
            &self.gl,
            [0.1, 0.1, 0.1],
            glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT,
        );

        let (width, height) = self.framebuffer.size();
        self.scene_program.use_program();
        self.scene_program.set_uniform(
            "u_projection",
            self.camera
                .projection(aspect_ratio((width as u32, height as u32))),
        );
        self.scene_program
            .set_uniform("u_view", self.camera.view_matrix());

        self.metal.bind(0);
        self.scene_program.set_uniform("u_model", Mat4::IDENTITY);
        self.floor.draw();

        self.container.bind(0);
        for position in stencil_outline::CUBE_POSITIONS {
            self.scene_program
                .set_uniform("u_model", Mat4::from_translation(position));
            self.cube.draw();
        }

        // Screen pass.
        Framebuffer::unbind(&self.gl);
        reset_viewport(&self.gl, size);
        unsafe {
            self.gl.disable(glow::DEPTH_TEST);
        }
        clear(&self.gl, [1.0, 1.0, 1.0], glow::COLOR_BUFFER_BIT);

        self.screen_program.use_program();
        self.effect.apply(&self.screen_program);
        if let Some(texture) = self.framebuffer.texture() {
            texture.bind(0);
        }
        self.quad.draw();

        unsafe {
            self.gl.enable(glow::DEPTH_TEST);
        }
    }
}
