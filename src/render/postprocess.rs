//! Full-screen effects applied to an offscreen color buffer.

use crate::abs::ShaderProgram;

/// Distance between kernel taps, in texture coordinates.
pub const KERNEL_OFFSET: f32 = 1.0 / 300.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PostEffect {
    #[default]
    None,
    Inversion,
    Grayscale,
    Sharpen,
    Blur,
    EdgeDetect,
}

impl PostEffect {
    pub const ALL: [PostEffect; 6] = [
        PostEffect::None,
        PostEffect::Inversion,
        PostEffect::Grayscale,
        PostEffect::Sharpen,
        PostEffect::Blur,
        PostEffect::EdgeDetect,
    ];

    /// Value of the `u_mode` uniform: 0 passthrough, 1 inversion, 2 grayscale, 3 kernel.
    pub fn mode(self) -> i32 {
        match self {
            PostEffect::None => 0,
            PostEffect::Inversion => 1,
            PostEffect::Grayscale => 2,
            PostEffect::Sharpen | PostEffect::Blur | PostEffect::EdgeDetect => 3,
        }
    }

    /// The 3x3 convolution kernel, row-major from the top left tap.
    pub fn kernel(self) -> Option<[f32; 9]> {
        match self {
            PostEffect::Sharpen => Some([
                -1.0, -1.0, -1.0, //
                -1.0, 9.0, -1.0, //
                -1.0, -1.0, -1.0,
            ]),
            PostEffect::Blur => Some([
                1.0 / 16.0, 2.0 / 16.0, 1.0 / 16.0, //
                2.0 / 16.0, 4.0 / 16.0, 2.0 / 16.0, //
                1.0 / 16.0, 2.0 / 16.0, 1.0 / 16.0,
            ]),
            PostEffect::EdgeDetect => Some([
                1.0, 1.0, 1.0, //
                1.0, -8.0, 1.0, //
                1.0, 1.0, 1.0,
            ]),
            _ => None,
        }
    }

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|e| *e == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        let i = Self::ALL.iter().position(|e| *e == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn name(self) -> &'static str {
        match self {
            PostEffect::None => "none",
            PostEffect::Inversion => "inversion",
            PostEffect::Grayscale => "grayscale",
            PostEffect::Sharpen => "sharpen",
            PostEffect::Blur => "blur",
            PostEffect::EdgeDetect => "edge detection",
        }
    }

    /// Sets the effect's uniforms on the bound screen program.
    pub fn apply(self, program: &ShaderProgram) {
        program.set_uniform("u_mode", self.mode());
        program.set_uniform("u_offset", KERNEL_OFFSET);
        if let Some(kernel) = self.kernel() {
            program.set_uniform("u_kernel", kernel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum(kernel: [f32; 9]) -> f32 {
        kernel.iter().sum()
    }

    #[test]
    fn kernels_preserve_or_remove_brightness() {
        assert!((sum(PostEffect::Sharpen.kernel().unwrap()) - 1.0).abs() < 1e-6);
        assert!((sum(PostEffect::Blur.kernel().unwrap()) - 1.0).abs() < 1e-6);
        assert!(sum(PostEffect::EdgeDetect.kernel().unwrap()).abs() < 1e-6);
    }

    #[test]
    fn only_kernel_effects_have_kernels() {
        for effect in PostEffect::ALL {
            assert_eq!(effect.kernel().is_some(), effect.mode() == 3, "{}", effect.name());
        }
    }

    #[test]
    fn cycling_visits_every_effect() {
        let mut effect = PostEffect::None;
        for _ in 0..PostEffect::ALL.len() {
            effect = effect.next();
        }
        assert_eq!(effect, PostEffect::None);
        assert_eq!(PostEffect::None.previous(), PostEffect::EdgeDetect);
        assert_eq!(PostEffect::Blur.next().previous(), PostEffect::Blur);
    }
}
