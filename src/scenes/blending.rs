//! Transparency: grass cut out by discarding fragments, semi-transparent windows blended
//! back to front.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use glow::HasContext;

use super::{Scene, SceneContext, SceneSwitch, aspect_ratio, clear, stencil_outline};
use crate::{
    abs::{Mesh, ShaderProgram, Texture, TextureOptions},
    camera::Camera,
    geometry,
    input::UpdateContext,
    render::transparency::sort_back_to_front,
};

/// Fragments of the grass texture below this alpha are discarded.
pub const ALPHA_CUTOFF: f32 = 0.1;

const GRASS_POSITIONS: [Vec3; 4] = [
    Vec3::new(-3.0, 0.0, -1.5),
    Vec3::new(3.0, 0.0, -2.0),
    Vec3::new(-2.5, 0.0, 1.5),
    Vec3::new(2.8, 0.0, 1.2),
];

const WINDOW_POSITIONS: [Vec3; 5] = [
    Vec3::new(-1.5, 0.0, -0.48),
    Vec3::new(1.5, 0.0, 0.51),
    Vec3::new(0.0, 0.0, 0.7),
    Vec3::new(-0.3, 0.0, -2.3),
    Vec3::new(0.5, 0.0, -0.6),
];

pub struct BlendingScene {
    gl: Arc<glow::Context>,
    camera: Camera,
    opaque: ShaderProgram,
    sprite_program: ShaderProgram,
    cube: Mesh,
    floor: Mesh,
    sprite: Mesh,
    marble: Texture,
    metal: Texture,
    grass: Texture,
    window: Texture,
}

impl BlendingScene {
    pub fn new(ctx: &SceneContext) -> Result<Self, String> {
        let opaque = ctx.program("unlit_texture")?;
        opaque.use_program();
        opaque.set_uniform("u_material.diffuse", 0);
        let sprite_program = ctx.program("transparent")?;
        sprite_program.use_program();
        sprite_program.set_uniform("u_texture", 0);

        Ok(Self {
            gl: Arc::clone(&ctx.gl),
            camera: ctx.camera(Vec3::new(0.0, 0.0, 3.0)),
            opaque,
            sprite_program,
            cube: Mesh::from_vertices(&ctx.gl, &geometry::CUBE)?,
            floor: Mesh::from_vertices(&ctx.gl, &geometry::floor(5.0, 2.0))?,
            sprite: Mesh::from_vertices(&ctx.gl, &geometry::SPRITE)?,
            marble: ctx.texture("marble.jpg")?,
            metal: ctx.texture("metal.png")?,
            grass: ctx.texture_with("grass.png", TextureOptions::clamped())?,
            window: ctx.texture_with("blending_transparent_window.png", TextureOptions::clamped())?,
        })
    }
}

impl Scene for BlendingScene {
    fn update(&mut self, ctx: &UpdateContext) -> SceneSwitch {
        self.camera.update(ctx);
        SceneSwitch::None
    }

    fn render(&mut self, size: (u32, u32)) {
        unsafe {
            self.gl.enable(glow::DEPTH_TEST);
            self.gl.disable(glow::BLEND);
        }
        clear(
            &self.gl,
            [0.1, 0.1, 0.1],
            glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT,
        );

        let projection = self.camera.projection(aspect_ratio(size));
        let view = self.camera.view_matrix();

        self.opaque.use_program();
        self.opaque.set_uniform("u_projection", projection);
        self.opaque.set_uniform("u_view", view);

        self.metal.bind(0);
        self.opaque.set_uniform("u_model", Mat4::IDENTITY);
        self.floor.draw();

        self.marble.bind(0);
        for position in stencil_outline::CUBE_POSITIONS {
            self.opaque
                .set_uniform("u_model", Mat4::from_translation(position));
            self.cube.draw();
        }

        self.sprite_program.use_program();
        self.sprite_program.set_uniform("u_projection", projection);
        self.sprite_program.set_uniform("u_view", view);

        // Grass is either fully opaque or fully transparent, so order does not matter.
        self.sprite_program
            .set_uniform("u_alpha_cutoff", ALPHA_CUTOFF);
        self.grass.bind(0);
        for position in GRASS_POSITIONS {
            self.sprite_program
                .set_uniform("u_model", Mat4::from_translation(position));
            self.sprite.draw();
        }

        // Windows blend with what is behind them, so they go last and farthest first.
        unsafe {
            self.gl.enable(glow::BLEND);
            self.gl
                .blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
        }
        self.sprite_program.set_uniform("u_alpha_cutoff", 0.0);
        self.window.bind(0);
        for position in sort_back_to_front(self.camera.position, &WINDOW_POSITIONS) {
            self.sprite_program
                .set_uniform("u_model", Mat4::from_translation(position));
            self.sprite.draw();
        }
        unsafe {
            self.gl.disable(glow::BLEND);
        }
    }
}
