//! A planet inside an asteroid ring drawn with instanced rendering.
//!
//! Every rock shares one mesh; its model matrix comes from a per-instance vertex attribute,
//! so the whole ring takes one draw call per rock mesh.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use glow::HasContext;

use super::{Scene, SceneContext, SceneSwitch, aspect_ratio, clear};
use crate::{
    abs::{InstanceBuffer, ShaderProgram},
    camera::Camera,
    input::UpdateContext,
    model::Model,
    render::instancing::asteroid_field,
};

pub const RING_RADIUS: f32 = 50.0;
pub const RING_OFFSET: f32 = 2.5;
/// The ring is wider than the default camera range.
const FAR_PLANE: f32 = 500.0;

pub struct InstancingScene {
    gl: Arc<glow::Context>,
    camera: Camera,
    planet_program: ShaderProgram,
    rock_program: ShaderProgram,
    planet: Model,
    rock: Model,
    instances: InstanceBuffer,
}

impl InstancingScene {
    pub fn new(ctx: &SceneContext) -> Result<Self, String> {
        let settings = &ctx.config.chapters;

        let start = std::time::Instant::now();
        let transforms = asteroid_field(
            settings.asteroid_count,
            RING_RADIUS,
            RING_OFFSET,
            settings.asteroid_seed,
        );
        log::info!(
            "Generated {} asteroid transforms in {:?}",
            transforms.len(),
            start.elapsed()
        );

        let rock = Model::load_or_cube(&ctx.gl, &ctx.model_path("rock"))?;
        let instances = InstanceBuffer::new(&ctx.gl, &transforms)?;
        rock.attach_instances(&instances);

        let mut camera = ctx.camera(Vec3::new(0.0, 10.0, RING_RADIUS + 5.0));
        camera.movement_speed *= 10.0;

        Ok(Self {
            gl: Arc::clone(&ctx.gl),
            camera: camera.looking_at(Vec3::ZERO),
            planet_program: ctx.program("unlit_texture")?,
            rock_program: ctx.program("instanced")?,
            planet: Model::load_or_cube(&ctx.gl, &ctx.model_path("planet"))?,
            rock,
            instances,
        })
    }
}

impl Scene for InstancingScene {
    fn update(&mut self, ctx: &UpdateContext) -> SceneSwitch {
        self.camera.update(ctx);
        SceneSwitch::None
    }

    fn render(&mut self, size: (u32, u32)) {
        unsafe {
            self.gl.enable(glow::DEPTH_TEST);
        }
        clear(
            &self.gl,
            [0.05, 0.05, 0.05],
            glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT,
        );

        let projection = Mat4::perspective_rh_gl(
            self.camera.zoom.to_radians(),
            aspect_ratio(size),
            0.1,
            FAR_PLANE,
        );
        let view = self.camera.view_matrix();

        self.planet_program.use_program();
        self.planet_program.set_uniform("u_projection", projection);
        self.planet_program.set_uniform("u_view", view);
        self.planet_program.set_uniform(
            "u_model",
            Mat4::from_translation(Vec3::new(0.0, -3.0, 0.0)) * Mat4::from_scale(Vec3::splat(4.0)),
        );
        self.planet.draw(&self.planet_program);

        if self.instances.is_empty() {
            return;
        }
        self.rock_program.use_program();
        self.rock_program.set_uniform("u_projection", projection);
        self.rock_program.set_uniform("u_view", view);
        self.rock
            .draw_instanced(&self.rock_program, self.instances.len());
    }
}
