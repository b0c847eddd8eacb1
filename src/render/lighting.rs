//! Light sources and how they are uploaded to the lighting shaders.
//!
//! Every light writes itself into a GLSL struct under a uniform prefix, e.g.
//! `u_point_lights[2].position`. The structs are declared in `shaders/lit/frag.glsl`.

use glam::Vec3;

use crate::abs::ShaderProgram;

/// Number of point lights the lit shader declares.
pub const MAX_POINT_LIGHTS: usize = 4;

/// Distance attenuation `1 / (constant + linear * d + quadratic * d^2)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

/// Coefficients that fade a light out at roughly the given distance.
const RANGE_TABLE: [(f32, Attenuation); 12] = [
    (7.0, Attenuation::new(1.0, 0.7, 1.8)),
    (13.0, Attenuation::new(1.0, 0.35, 0.44)),
    (20.0, Attenuation::new(1.0, 0.22, 0.20)),
    (32.0, Attenuation::new(1.0, 0.14, 0.07)),
    (50.0, Attenuation::new(1.0, 0.09, 0.032)),
    (65.0, Attenuation::new(1.0, 0.07, 0.017)),
    (100.0, Attenuation::new(1.0, 0.045, 0.0075)),
    (160.0, Attenuation::new(1.0, 0.027, 0.0028)),
    (200.0, Attenuation::new(1.0, 0.022, 0.0019)),
    (325.0, Attenuation::new(1.0, 0.014, 0.0007)),
    (600.0, Attenuation::new(1.0, 0.007, 0.0002)),
    (3250.0, Attenuation::new(1.0, 0.0014, 0.000007)),
];

impl Attenuation {
    pub const fn new(constant: f32, linear: f32, quadratic: f32) -> Self {
        Self {
            constant,
            linear,
            quadratic,
        }
    }

    /// Picks the tabulated coefficients for the smallest range covering `range`. Ranges past
    /// the table use its last entry.
    pub fn for_range(range: f32) -> Self {
        RANGE_TABLE
            .iter()
            .find(|(r, _)| *r >= range)
            .unwrap_or(&RANGE_TABLE[RANGE_TABLE.len() - 1])
            .1
    }

    /// The multiplier applied to a light `distance` units away. Mirrors the shader.
    #[cfg(test)]
    pub fn factor(&self, distance: f32) -> f32 {
        1.0 / (self.constant + self.linear * distance + self.quadratic * distance * distance)
    }

    fn apply(&self, program: &ShaderProgram, prefix: &str) {
        program.set_uniform(&format!("{prefix}.constant"), self.constant);
        program.set_uniform(&format!("{prefix}.linear"), self.linear);
        program.set_uniform(&format!("{prefix}.quadratic"), self.quadratic);
    }
}

/// Ambient, diffuse and specular intensities of a light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightColor {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

impl LightColor {
    /// Scales a base color by the three intensities.
    pub fn scaled(color: Vec3, ambient: f32, diffuse: f32, specular: f32) -> Self {
        Self {
            ambient: color * ambient,
            diffuse: color * diffuse,
            specular: color * specular,
        }
    }

    fn apply(&self, program: &ShaderProgram, prefix: &str) {
        program.set_uniform(&format!("{prefix}.ambient"), self.ambient);
        program.set_uniform(&format!("{prefix}.diffuse"), self.diffuse);
        program.set_uniform(&format!("{prefix}.specular"), self.specular);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirLight {
    pub direction: Vec3,
    pub color: LightColor,
    pub enabled: bool,
}

impl DirLight {
    pub const UNIFORM: &'static str = "u_dir_light";

    pub fn apply(&self, program: &ShaderProgram) {
        let prefix = Self::UNIFORM;
        program.set_uniform(&format!("{prefix}.direction"), self.direction);
        program.set_uniform(&format!("{prefix}.enabled"), self.enabled);
        self.color.apply(program, &format!("{prefix}.color"));
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: LightColor,
    pub attenuation: Attenuation,
    pub enabled: bool,
}

impl PointLight {
    /// Uniform prefix of the point light at `index`.
    pub fn uniform_prefix(index: usize) -> String {
        format!("u_point_lights[{index}]")
    }

    pub fn apply(&self, program: &ShaderProgram, index: usize) {
        let prefix = Self::uniform_prefix(index);
        program.set_uniform(&format!("{prefix}.position"), self.position);
        program.set_uniform(&format!("{prefix}.enabled"), self.enabled);
        self.color.apply(program, &format!("{prefix}.color"));
        self.attenuation
            .apply(program, &format!("{prefix}.attenuation"));
    }
}

/// A cone light. Cutoffs are stored as cosines, as the shader compares them against a dot
/// product.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpotLight {
    pub position: Vec3,
    pub direction: Vec3,
    pub color: LightColor,
    pub attenuation: Attenuation,
    pub inner_cutoff: f32,
    pub outer_cutoff: f32,
    pub enabled: bool,
}

impl SpotLight {
    pub const UNIFORM: &'static str = "u_spot_light";

    /// Creates a spotlight with cutoff angles given in degrees.
    pub fn new(
        color: LightColor,
        attenuation: Attenuation,
        inner_degrees: f32,
        outer_degrees: f32,
    ) -> Self {
        Self {
            position: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            color,
            attenuation,
            inner_cutoff: inner_degrees.to_radians().cos(),
            outer_cutoff: outer_degrees.to_radians().cos(),
            enabled: true,
        }
    }

    /// Soft-edge intensity for a fragment whose light direction makes `cos_theta` with the
    /// spot direction: 1 inside the inner cone, 0 outside the outer cone, linear in between.
    /// Mirrors the shader.
    #[cfg(test)]
    pub fn intensity(&self, cos_theta: f32) -> f32 {
        let epsilon = (self.inner_cutoff - self.outer_cutoff).max(f32::EPSILON);
        ((cos_theta - self.outer_cutoff) / epsilon).clamp(0.0, 1.0)
    }

    pub fn apply(&self, program: &ShaderProgram) {
        let prefix = Self::UNIFORM;
        program.set_uniform(&format!("{prefix}.position"), self.position);
        program.set_uniform(&format!("{prefix}.direction"), self.direction);
        program.set_uniform(&format!("{prefix}.inner_cutoff"), self.inner_cutoff);
        program.set_uniform(&format!("{prefix}.outer_cutoff"), self.outer_cutoff);
        program.set_uniform(&format!("{prefix}.enabled"), self.enabled);
        self.color.apply(program, &format!("{prefix}.color"));
        self.attenuation
            .apply(program, &format!("{prefix}.attenuation"));
    }
}

/// Lights consumed by the `lit` shader. Slots without a point light are uploaded disabled.
#[derive(Clone, Debug, PartialEq)]
pub struct LightSetup {
    pub dir: DirLight,
    pub points: Vec<PointLight>,
    pub spot: Option<SpotLight>,
    pub blinn: bool,
}

impl LightSetup {
    pub fn apply(&self, program: &ShaderProgram) {
        self.dir.apply(program);
        for index in 0..MAX_POINT_LIGHTS {
            match self.points.get(index) {
                Some(light) => light.apply(program, index),
                None => program.set_uniform(
                    &format!("{}.enabled", PointLight::uniform_prefix(index)),
                    false,
                ),
            }
        }
        match &self.spot {
            Some(spot) => spot.apply(program),
            None => program.set_uniform(&format!("{}.enabled", SpotLight::UNIFORM), false),
        }
        program.set_uniform("u_blinn", self.blinn);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attenuation_starts_at_one_and_falls_off() {
        let att = Attenuation::new(1.0, 0.09, 0.032);
        assert_eq!(att.factor(0.0), 1.0);
        assert!(att.factor(1.0) < 1.0);
        assert!(att.factor(10.0) < att.factor(5.0));
        let expected = 1.0 / (1.0 + 0.9 + 3.2);
        assert!((att.factor(10.0) - expected).abs() < 1e-6);
    }

    #[test]
    fn range_lookup_rounds_up() {
        assert_eq!(Attenuation::for_range(50.0), Attenuation::new(1.0, 0.09, 0.032));
        assert_eq!(Attenuation::for_range(8.0), Attenuation::new(1.0, 0.35, 0.44));
        assert_eq!(Attenuation::for_range(1.0), Attenuation::new(1.0, 0.7, 1.8));
        assert_eq!(
            Attenuation::for_range(10_000.0),
            Attenuation::new(1.0, 0.0014, 0.000007)
        );
    }

    #[test]
    fn spotlight_has_a_soft_edge() {
        let spot = SpotLight::new(
            LightColor::scaled(Vec3::ONE, 0.0, 1.0, 1.0),
            Attenuation::for_range(50.0),
            6.5,
            12.0,
        );
        assert!(spot.inner_cutoff > spot.outer_cutoff);
        assert_eq!(spot.intensity(1.0), 1.0);
        assert_eq!(spot.intensity(spot.inner_cutoff), 1.0);
        assert_eq!(spot.intensity(spot.outer_cutoff), 0.0);
        assert_eq!(spot.intensity(0.0), 0.0);
        let halfway = (spot.inner_cutoff + spot.outer_cutoff) / 2.0;
        assert!((spot.intensity(halfway) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn equal_cutoffs_give_a_hard_edge() {
        let spot = SpotLight::new(
            LightColor::scaled(Vec3::ONE, 0.0, 1.0, 1.0),
            Attenuation::for_range(50.0),
            10.0,
            10.0,
        );
        assert_eq!(spot.intensity(1.0), 1.0);
        assert_eq!(spot.intensity(spot.outer_cutoff), 0.0);
        assert_eq!(spot.intensity(0.0), 0.0);
        assert!(!spot.intensity(spot.inner_cutoff).is_nan());
    }

    #[test]
    fn scaled_color_multiplies_each_term() {
        let color = LightColor::scaled(Vec3::new(1.0, 0.5, 0.0), 0.05, 0.8, 1.0);
        assert_eq!(color.ambient, Vec3::new(0.05, 0.025, 0.0));
        assert_eq!(color.diffuse, Vec3::new(0.8, 0.4, 0.0));
        assert_eq!(color.specular, Vec3::new(1.0, 0.5, 0.0));
    }

    #[test]
    fn point_light_prefix_indexes_the_array() {
        assert_eq!(PointLight::uniform_prefix(0), "u_point_lights[0]");
        assert_eq!(PointLight::uniform_prefix(3), "u_point_lights[3]");
    }
}
