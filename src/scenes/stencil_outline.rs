//! Object outlining with the stencil buffer.
//!
//! The cubes write 1 into the stencil buffer; slightly enlarged copies are then drawn in a flat
//! color wherever the stencil is not 1, leaving only a border visible.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use glow::HasContext;

use super::{Scene, SceneContext, SceneSwitch, aspect_ratio, clear};
use crate::{
    abs::{Mesh, ShaderProgram, Texture},
    camera::Camera,
    geometry,
    input::UpdateContext,
};

pub const CUBE_POSITIONS: [Vec3; 2] = [Vec3::new(-1.0, 0.0, -1.0), Vec3::new(2.0, 0.0, 0.0)];
const OUTLINE_SCALE: f32 = 1.1;
const OUTLINE_COLOR: Vec3 = Vec3::new(0.04, 0.28, 0.26);

pub struct StencilOutlineScene {
    gl: Arc<glow::Context>,
    camera: Camera,
    textured: ShaderProgram,
    outline: ShaderProgram,
    cube: Mesh,
    floor: Mesh,
    marble: Texture,
    metal: Texture,
}

impl StencilOutlineScene {
    pub fn new(ctx: &SceneContext) -> Result<Self, String> {
        let textured = ctx.program("unlit_texture")?;
        textured.use_program();
        textured.set_uniform("u_material.diffuse", 0);

        Ok(Self {
            gl: Arc::clone(&ctx.gl),
            camera: ctx.camera(Vec3::new(0.0, 0.0, 3.0)),
            textured,
            outline: ctx.program("solid_color")?,
            cube: Mesh::from_vertices(&ctx.gl, &geometry::CUBE)?,
            floor: Mesh::from_vertices(&ctx.gl, &geometry::floor(5.0, 2.0))?,
            marble: ctx.texture("marble.jpg")?,
            metal: ctx.texture("metal.png")?,
        })
    }

    fn draw_cubes(&self, program: &ShaderProgram, scale: f32) {
        for position in CUBE_POSITIONS {
            program.set_uniform(
                "u_model",
                Mat4::from_translation(position) * Mat4::from_scale(Vec3::splat(scale)),
            );
            self.cube.draw();
        }
    }
}

impl Scene for StencilOutlineScene {
    fn update(&mut self, ctx: &UpdateContext) -> SceneSwitch {
        self.camera.update(ctx);
        SceneSwitch::None
    }

    fn render(&mut self, size: (u32, u32)) {
        let gl = &self.gl;
        unsafe {
            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LESS);
            gl.enable(glow::STENCIL_TEST);
            gl.stencil_func(glow::NOTEQUAL, 1, 0xFF);
            gl.stencil_op(glow::KEEP, glow::KEEP, glow::REPLACE);
            gl.stencil_mask(0xFF);
        }
        clear(
            gl,
            [0.1, 0.1, 0.1],
            glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT | glow::STENCIL_BUFFER_BIT,
        );

        let projection = self.camera.projection(aspect_ratio(size));
        let view = self.camera.view_matrix();

        self.textured.use_program();
        self.textured.set_uniform("u_projection", projection);
        self.textured.set_uniform("u_view", view);

        // The floor must not touch the stencil buffer.
        unsafe {
            gl.stencil_mask(0x00);
        }
        self.metal.bind(0);
        self.textured.set_uniform("u_model", Mat4::IDENTITY);
        self.floor.draw();

        // First pass: cubes as usual, marking their pixels with 1.
        unsafe {
            gl.stencil_func(glow::ALWAYS, 1, 0xFF);
            gl.stencil_mask(0xFF);
        }
        self.marble.bind(0);
        self.draw_cubes(&self.textured, 1.0);

        // Second pass: enlarged cubes only outside the marked pixels, on top of everything.
        unsafe {
            gl.stencil_func(glow::NOTEQUAL, 1, 0xFF);
            gl.stencil_mask(0x00);
            gl.disable(glow::DEPTH_TEST);
        }
        self.outline.use_program();
        self.outline.set_uniform("u_projection", projection);
        self.outline.set_uniform("u_view", view);
        self.outline.set_uniform("u_color", OUTLINE_COLOR);
        self.draw_cubes(&self.outline, OUTLINE_SCALE);

        unsafe {
            gl.stencil_mask(0xFF);
            gl.stencil_func(glow::ALWAYS, 0, 0xFF);
            gl.enable(glow::DEPTH_TEST);
            gl.disable(glow::STENCIL_TEST);
        }
    }
}
