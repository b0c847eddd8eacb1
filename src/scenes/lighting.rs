//! Multiple lights: a sun, four point lights and a flashlight held by the camera.
//!
//! K toggles the sun, L the flashlight, 1-4 the point lights and B switches between Phong and
//! Blinn-Phong specular highlights.

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
    render::lighting::{Attenuation, DirLight, LightColor, LightSetup, PointLight, SpotLight},
};

const ROTATION_AXIS: Vec3 = Vec3::new(1.0, 0.3, 0.5);
const SHININESS: f32 = 32.0;

pub const POINT_LIGHT_POSITIONS: [Vec3; 4] = [
    Vec3::new(0.7, 0.2, 2.0),
    Vec3::new(2.3, -3.3, -4.0),
    Vec3::new(-4.0, 2.0, -12.0),
    Vec3::new(0.0, 0.0, -3.0),
];

const POINT_LIGHT_KEYS: [Keycode; 4] = [Keycode::Num1, Keycode::Num2, Keycode::Num3, Keycode::Num4];

/// The light rig of the chapter.
pub fn default_lights() -> LightSetup {
    let attenuation = Attenuation::for_range(50.0);
    LightSetup {
        dir: DirLight {
            direction: Vec3::new(-0.2, -1.0, -0.3),
            color: LightColor::scaled(Vec3::ONE, 0.05, 0.4, 0.5),
            enabled: true,
        },
        points: POINT_LIGHT_POSITIONS
            .iter()
            .map(|&position| PointLight {
                position,
                color: LightColor::scaled(Vec3::ONE, 0.05, 0.8, 1.0),
                attenuation,
                enabled: true,
            })
            .collect(),
        spot: Some(SpotLight::new(
            LightColor::scaled(Vec3::ONE, 0.0, 1.0, 1.0),
            attenuation,
            6.5,
            12.0,
        )),
        blinn: false,
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

/// Applies the light toggles pressed this frame: K sun, L flashlight, 1-4 point lights and
/// B for Blinn-Phong.
pub fn toggle_lights(lights: &mut LightSetup, ctx: &UpdateContext) {
    let pressed = |key| ctx.keyboard.was_pressed(key);

    if pressed(Keycode::K) {
        lights.dir.enabled = !lights.dir.enabled;
        log::info!("Sun {}", on_off(lights.dir.enabled));
    }
    if pressed(Keycode::L)
        && let Some(spot) = &mut lights.spot
    {
        spot.enabled = !spot.enabled;
        log::info!("Flashlight {}", on_off(spot.enabled));
    }
    for (i, key) in POINT_LIGHT_KEYS.into_iter().enumerate() {
        if pressed(key)
            && let Some(light) = lights.points.get_mut(i)
        {
            light.enabled = !light.enabled;
            log::info!("Point light {} {}", i + 1, on_off(light.enabled));
        }
    }
    if pressed(Keycode::B) {
        lights.blinn = !lights.blinn;
        log::info!("{} shading", if lights.blinn { "Blinn-Phong" } else { "Phong" });
    }
}

pub struct LightingScene {
    gl: Arc<glow::Context>,
    camera: Camera,
    lit: ShaderProgram,
    lamp: ShaderProgram,
    cube: Mesh,
    diffuse: Texture,
    specular: Texture,
    lights: LightSetup,
}

impl LightingScene {
    pub fn new(ctx: &SceneContext) -> Result<Self, String> {
        Ok(Self {
            gl: Arc::clone(&ctx.gl),
            camera: ctx.camera(Vec3::new(0.0, 0.0, 3.0)),
            lit: ctx.program("lit")?,
            lamp: ctx.program("solid_color")?,
            cube: Mesh::from_vertices(&ctx.gl, &geometry::CUBE)?,
            diffuse: ctx.texture("container2.png")?,
            specular: ctx.texture("container2_specular.png")?,
            lights: default_lights(),
        })
    }
}

impl Scene for LightingScene {
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

        let projection = self.camera.projection(aspect_ratio(size));
        let view = self.camera.view_matrix();

        self.diffuse.bind(0);
        self.specular.bind(1);

        self.lit.use_program();
        self.lit.set_uniform("u_material.diffuse", 0);
        self.lit.set_uniform("u_material.specular", 1);
        self.lit.set_uniform("u_material.shininess", SHININESS);
        self.lit.set_uniform("u_view_pos", self.camera.position);
        self.lit.set_uniform("u_projection", projection);
        self.lit.set_uniform("u_view", view);
        self.lights.apply(&self.lit);

        for (i, position) in geometry::CUBE_POSITIONS.iter().enumerate() {
            let model = Mat4::from_translation(*position)
                * Mat4::from_axis_angle(ROTATION_AXIS.normalize(), (20.0 * i as f32).to_radians());
            self.lit.set_uniform("u_model", model);
            self.cube.draw();
        }

        self.lamp.use_program();
        self.lamp.set_uniform("u_projection", projection);
        self.lamp.set_uniform("u_view", view);
        for light in self.lights.points.iter().filter(|light| light.enabled) {
            let model =
                Mat4::from_translation(light.position) * Mat4::from_scale(Vec3::splat(0.2));
            self.lamp.set_uniform("u_model", model);
            self.lamp.set_uniform("u_color", Vec3::ONE);
            self.cube.draw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputState;

    #[test]
    fn rig_uses_every_point_light_slot() {
        let lights = default_lights();
        assert_eq!(lights.points.len(), crate::render::lighting::MAX_POINT_LIGHTS);
        assert!(lights.points.iter().all(|light| light.enabled));
        assert!(!lights.blinn);
        assert!(
            lights
                .points
                .iter()
                .all(|light| light.attenuation == Attenuation::new(1.0, 0.09, 0.032))
        );
    }

    #[test]
    fn flashlight_cone_is_narrow() {
        let spot = default_lights().spot.unwrap();
        assert!(spot.inner_cutoff > spot.outer_cutoff);
        assert_eq!(spot.intensity(1.0), 1.0);
        assert_eq!(spot.intensity(15f32.to_radians().cos()), 0.0);
    }

    #[test]
    fn toggles_fire_once_per_press() {
        let mut lights = default_lights();
        let mut input = InputState::default();

        input.keyboard.press(Keycode::K);
        input.keyboard.press(Keycode::Num3);
        toggle_lights(&mut lights, &UpdateContext::new(&input, 0.016, 0.0));
        assert!(!lights.dir.enabled);
        assert!(!lights.points[2].enabled);
        assert!(lights.points[1].enabled);

        // Keys held over the next frame change nothing.
        input.begin_frame();
        toggle_lights(&mut lights, &UpdateContext::new(&input, 0.016, 0.016));
        assert!(!lights.dir.enabled);

        input.keyboard.release(Keycode::K);
        input.begin_frame();
        input.keyboard.press(Keycode::K);
        input.keyboard.press(Keycode::B);
        toggle_lights(&mut lights, &UpdateContext::new(&input, 0.016, 0.032));
        assert!(lights.dir.enabled);
        assert!(lights.blinn);
    }
}
