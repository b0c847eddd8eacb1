//! Structs and functions for handling textures.
//!
//! The module provides the [`Texture`] struct which is a CPU representation of a GPU texture.
//! A texture is either a regular 2D texture or a cube map, see [`Texture::target`].

use std::{path::Path, sync::Arc};

use glow::HasContext;
use image::{DynamicImage, GenericImageView};

/// How a 2D texture is sampled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureOptions {
    /// Wrap mode for both the S and T axes.
    pub wrap: u32,
    /// Minification filter. Mipmaps are generated when this is a mipmap filter.
    pub min_filter: u32,
    /// Magnification filter.
    pub mag_filter: u32,
    /// Upload as `SRGB8_ALPHA8` instead of `RGBA8`.
    pub srgb: bool,
    /// Flip the image vertically so that the first row ends up at `v = 0`.
    pub flip_vertically: bool,
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self {
            wrap: glow::REPEAT,
            min_filter: glow::LINEAR_MIPMAP_LINEAR,
            mag_filter: glow::LINEAR,
            srgb: false,
            flip_vertically: true,
        }
    }
}

impl TextureOptions {
    /// Options for textures with transparent borders, which must not bleed across edges.
    pub fn clamped() -> Self {
        Self {
            wrap: glow::CLAMP_TO_EDGE,
            ..Self::default()
        }
    }

    fn uses_mipmaps(&self) -> bool {
        matches!(
            self.min_filter,
            glow::NEAREST_MIPMAP_NEAREST
                | glow::LINEAR_MIPMAP_NEAREST
                | glow::NEAREST_MIPMAP_LINEAR
                | glow::LINEAR_MIPMAP_LINEAR
        )
    }
}

/// Pixels of the texture used in place of images that fail to load: a 2x2 magenta and black
/// checker.
pub const FALLBACK_PIXELS: [u8; 16] = [
    255, 0, 255, 255, 0, 0, 0, 255, //
    0, 0, 0, 255, 255, 0, 255, 255,
];

/// Represents a texture stored on the GPU side.
pub struct Texture {
    pub(super) gl: Arc<glow::Context>,
    pub(super) id: glow::Texture,
    pub(super) target: u32,
    pub(super) width: u32,
    pub(super) height: u32,
}

impl Texture {
    /// Creates a new 2D texture from the given [`image::DynamicImage`].
    pub fn new(
        gl: &Arc<glow::Context>,
        image: &DynamicImage,
        options: TextureOptions,
    ) -> Result<Self, String> {
        let image = if options.flip_vertically {
            image.flipv()
        } else {
            image.clone()
        };
        let (width, height) = image.dimensions();
        let data = image.to_rgba8().into_raw();
        Self::new_from_data(gl, width, height, &data, options)
    }

    /// Creates a new 2D texture from the given raw RGBA data.
    pub fn new_from_data(
        gl: &Arc<glow::Context>,
        width: u32,
        height: u32,
        data: &[u8],
        options: TextureOptions,
    ) -> Result<Self, String> {
        let internal = if options.srgb {
            glow::SRGB8_ALPHA8
        } else {
            glow::RGBA8
        };
        unsafe {
            let texture = gl.create_texture()?;
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                internal as i32,
                width as i32,
                height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(data)),
            );
            if options.uses_mipmaps() {
                gl.generate_mipmap(glow::TEXTURE_2D);
            }
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, options.wrap as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, options.wrap as i32);
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                options.min_filter as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                options.mag_filter as i32,
            );
            gl.bind_texture(glow::TEXTURE_2D, None);

            Ok(Self {
                gl: Arc::clone(gl),
                id: texture,
                target: glow::TEXTURE_2D,
                width,
                height,
            })
        }
    }

    /// Loads an image file from disk into a 2D texture.
    pub fn load(
        gl: &Arc<glow::Context>,
        path: &Path,
        options: TextureOptions,
    ) -> Result<Self, String> {
        let image = image::open(path)
            .map_err(|e| format!("failed to load texture {}: {e}", path.display()))?;
        let texture = Self::new(gl, &image, options)?;
        log::debug!(
            "Loaded texture {} ({}x{})",
            path.display(),
            texture.width(),
            texture.height()
        );
        Ok(texture)
    }

    /// Like [`Texture::load`], but logs the error and returns the checker texture instead.
    pub fn load_or_fallback(
        gl: &Arc<glow::Context>,
        path: &Path,
        options: TextureOptions,
    ) -> Result<Self, String> {
        match Self::load(gl, path, options) {
            Ok(texture) => Ok(texture),
            Err(e) => {
                log::error!("{e}; using fallback texture");
                Self::fallback(gl)
            }
        }
    }

    /// The 2x2 checker texture.
    pub fn fallback(gl: &Arc<glow::Context>) -> Result<Self, String> {
        Self::new_from_data(
            gl,
            2,
            2,
            &FALLBACK_PIXELS,
            TextureOptions {
                min_filter: glow::NEAREST,
                mag_filter: glow::NEAREST,
                ..TextureOptions::default()
            },
        )
    }

    /// A 1x1 texture of a single RGBA color.
    pub fn solid(gl: &Arc<glow::Context>, rgba: [u8; 4]) -> Result<Self, String> {
        Self::new_from_data(
            gl,
            1,
            1,
            &rgba,
            TextureOptions {
                min_filter: glow::NEAREST,
                mag_filter: glow::NEAREST,
                ..TextureOptions::default()
            },
        )
    }

    /// Loads six images into a cube map.
    ///
    /// Faces are given in `+X, -X, +Y, -Y, +Z, -Z` order, i.e. right, left, top, bottom, front
    /// and back. Cube map faces are not flipped.
    pub fn cubemap<P: AsRef<Path>>(gl: &Arc<glow::Context>, faces: &[P; 6]) -> Result<Self, String> {
        unsafe {
            let texture = gl.create_texture()?;
            gl.bind_texture(glow::TEXTURE_CUBE_MAP, Some(texture));

            let mut size = (0, 0);
            for (i, face) in faces.iter().enumerate() {
                let path = face.as_ref();
                let image = match image::open(path) {
                    Ok(image) => image,
                    Err(e) => {
                        gl.bind_texture(glow::TEXTURE_CUBE_MAP, None);
                        gl.delete_texture(texture);
                        return Err(format!("failed to load cube face {}: {e}", path.display()));
                    }
                };
                size = image.dimensions();
                let data = image.to_rgba8().into_raw();
                gl.tex_image_2d(
                    glow::TEXTURE_CUBE_MAP_POSITIVE_X + i as u32,
                    0,
                    glow::RGBA8 as i32,
                    size.0 as i32,
                    size.1 as i32,
                    0,
                    glow::RGBA,
                    glow::UNSIGNED_BYTE,
                    glow::PixelUnpackData::Slice(Some(data.as_slice())),
                );
            }
            set_cube_parameters(gl, glow::LINEAR);
            gl.bind_texture(glow::TEXTURE_CUBE_MAP, None);

            Ok(Self {
                gl: Arc::clone(gl),
                id: texture,
                target: glow::TEXTURE_CUBE_MAP,
                width: size.0,
                height: size.1,
            })
        }
    }

    /// A cube map whose every face is a single color, used when skybox images are missing.
    pub fn solid_cubemap(gl: &Arc<glow::Context>, rgba: [u8; 4]) -> Result<Self, String> {
        unsafe {
            let texture = gl.create_texture()?;
            gl.bind_texture(glow::TEXTURE_CUBE_MAP, Some(texture));
            for i in 0..6 {
                gl.tex_image_2d(
                    glow::TEXTURE_CUBE_MAP_POSITIVE_X + i,
                    0,
                    glow::RGBA8 as i32,
                    1,
                    1,
                    0,
                    glow::RGBA,
                    glow::UNSIGNED_BYTE,
                    glow::PixelUnpackData::Slice(Some(&rgba)),
                );
            }
            set_cube_parameters(gl, glow::NEAREST);
            gl.bind_texture(glow::TEXTURE_CUBE_MAP, None);

            Ok(Self {
                gl: Arc::clone(gl),
                id: texture,
                target: glow::TEXTURE_CUBE_MAP,
                width: 1,
                height: 1,
            })
        }
    }

    /// Returns the width of the texture.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the texture.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Binds the texture to the specified texture unit.
    pub fn bind(&self, unit: u32) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(self.target, Some(self.id));
        }
    }
}

/// Clamp-to-edge wrapping on all three axes so cube seams do not show.
unsafe fn set_cube_parameters(gl: &glow::Context, filter: u32) {
    unsafe {
        gl.tex_parameter_i32(glow::TEXTURE_CUBE_MAP, glow::TEXTURE_MIN_FILTER, filter as i32);
        gl.tex_parameter_i32(glow::TEXTURE_CUBE_MAP, glow::TEXTURE_MAG_FILTER, filter as i32);
        for wrap in [glow::TEXTURE_WRAP_S, glow::TEXTURE_WRAP_T, glow::TEXTURE_WRAP_R] {
            gl.tex_parameter_i32(glow::TEXTURE_CUBE_MAP, wrap, glow::CLAMP_TO_EDGE as i32);
        }
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_texture(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_use_mipmaps() {
        assert!(TextureOptions::default().uses_mipmaps());
        let nearest = TextureOptions {
            min_filter: glow::NEAREST,
            ..TextureOptions::default()
        };
        assert!(!nearest.uses_mipmaps());
    }

    #[test]
    fn clamped_options_only_change_wrap() {
        let clamped = TextureOptions::clamped();
        assert_eq!(clamped.wrap, glow::CLAMP_TO_EDGE);
        assert_eq!(clamped.min_filter, TextureOptions::default().min_filter);
        assert!(clamped.flip_vertically);
    }

    #[test]
    fn fallback_is_a_checker() {
        let pixels: Vec<&[u8]> = FALLBACK_PIXELS.chunks(4).collect();
        assert_eq!(pixels.len(), 4);
        assert_eq!(pixels[0], pixels[3]);
        assert_eq!(pixels[1], pixels[2]);
        assert_ne!(pixels[0], pixels[1]);
    }
}
