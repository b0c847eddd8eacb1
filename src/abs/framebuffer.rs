//! Module to work with OpenGL framebuffers.
//!
//! This module provides functionality to create, bind, and manage OpenGL framebuffers used for
//! post-processing and shadow maps.

use std::sync::Arc;

use glow::HasContext;

use crate::abs::Texture;

/// Represents an OpenGL framebuffer.
pub struct Framebuffer {
    gl: Arc<glow::Context>,
    fbo: glow::Framebuffer,
    color_tex: Option<Texture>,
    depth_tex: Option<Texture>,
    renderbuffer: Option<glow::Renderbuffer>,
    width: i32,
    height: i32,
}

impl Framebuffer {
    /// Creates a framebuffer with an RGB color texture and a combined depth/stencil
    /// renderbuffer, the usual target for post-processing.
    pub fn color(gl: &Arc<glow::Context>, width: i32, height: i32) -> Result<Self, String> {
        unsafe {
            let fbo = gl.create_framebuffer()?;
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(fbo));

            let tex = gl.create_texture()?;
            gl.bind_texture(glow::TEXTURE_2D, Some(tex));
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGB8 as i32,
                width,
                height,
                0,
                glow::RGB,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(None),
            );
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_S,
                glow::CLAMP_TO_EDGE as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_T,
                glow::CLAMP_TO_EDGE as i32,
            );
            gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::TEXTURE_2D,
                Some(tex),
                0,
            );
            gl.bind_texture(glow::TEXTURE_2D, None);

            let rbo = gl.create_renderbuffer()?;
            gl.bind_renderbuffer(glow::RENDERBUFFER, Some(rbo));
            gl.renderbuffer_storage(glow::RENDERBUFFER, glow::DEPTH24_STENCIL8, width, height);
            gl.framebuffer_renderbuffer(
                glow::FRAMEBUFFER,
                glow::DEPTH_STENCIL_ATTACHMENT,
                glow::RENDERBUFFER,
                Some(rbo),
            );
            gl.bind_renderbuffer(glow::RENDERBUFFER, None);

            let framebuffer = Self {
                gl: Arc::clone(gl),
                fbo,
                color_tex: Some(Texture {
                    gl: Arc::clone(gl),
                    id: tex,
                    target: glow::TEXTURE_2D,
                    width: width as u32,
                    height: height as u32,
                }),
                depth_tex: None,
                renderbuffer: Some(rbo),
                width,
                height,
            };
            framebuffer.finish()
        }
    }

    /// Creates a depth-only framebuffer for a 2D shadow map.
    ///
    /// Samples outside the map read a depth of `1.0`, so geometry beyond the light frustum is
    /// never shadowed.
    pub fn depth(gl: &Arc<glow::Context>, width: i32, height: i32) -> Result<Self, String> {
        unsafe {
            let fbo = gl.create_framebuffer()?;
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(fbo));

            let tex = gl.create_texture()?;
            gl.bind_texture(glow::TEXTURE_2D, Some(tex));
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::DEPTH_COMPONENT24 as i32,
                width,
                height,
                0,
                glow::DEPTH_COMPONENT,
                glow::FLOAT,
                glow::PixelUnpackData::Slice(None),
            );
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::NEAREST as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::NEAREST as i32);
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_S,
                glow::CLAMP_TO_BORDER as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_T,
                glow::CLAMP_TO_BORDER as i32,
            );
            gl.tex_parameter_f32_slice(
                glow::TEXTURE_2D,
                glow::TEXTURE_BORDER_COLOR,
                &[1.0, 1.0, 1.0, 1.0],
            );
            gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::DEPTH_ATTACHMENT,
                glow::TEXTURE_2D,
                Some(tex),
                0,
            );
            gl.draw_buffer(glow::NONE);
            gl.read_buffer(glow::NONE);
            gl.bind_texture(glow::TEXTURE_2D, None);

            let framebuffer = Self {
                gl: Arc::clone(gl),
                fbo,
                color_tex: None,
                depth_tex: Some(Texture {
                    gl: Arc::clone(gl),
                    id: tex,
                    target: glow::TEXTURE_2D,
                    width: width as u32,
                    height: height as u32,
                }),
                renderbuffer: None,
                width,
                height,
            };
            framebuffer.finish()
        }
    }

    /// Creates a depth-only framebuffer backed by a cube map, for omnidirectional shadows.
    ///
    /// The whole cube is attached as a layered target; the geometry shader picks the face
    /// through `gl_Layer`.
    pub fn depth_cube(gl: &Arc<glow::Context>, size: i32) -> Result<Self, String> {
        unsafe {
            let fbo = gl.create_framebuffer()?;
            let tex = gl.create_texture()?;
            gl.bind_texture(glow::TEXTURE_CUBE_MAP, Some(tex));
            for face in 0..6 {
                gl.tex_image_2d(
                    glow::TEXTURE_CUBE_MAP_POSITIVE_X + face,
                    0,
                    glow::DEPTH_COMPONENT24 as i32,
                    size,
                    size,
                    0,
                    glow::DEPTH_COMPONENT,
                    glow::FLOAT,
                    glow::PixelUnpackData::Slice(None),
                );
            }
            gl.tex_parameter_i32(
                glow::TEXTURE_CUBE_MAP,
                glow::TEXTURE_MIN_FILTER,
                glow::NEAREST as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_CUBE_MAP,
                glow::TEXTURE_MAG_FILTER,
                glow::NEAREST as i32,
            );
            for wrap in [glow::TEXTURE_WRAP_S, glow::TEXTURE_WRAP_T, glow::TEXTURE_WRAP_R] {
                gl.tex_parameter_i32(glow::TEXTURE_CUBE_MAP, wrap, glow::CLAMP_TO_EDGE as i32);
            }

            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(fbo));
            gl.framebuffer_texture(glow::FRAMEBUFFER, glow::DEPTH_ATTACHMENT, Some(tex), 0);
            gl.draw_buffer(glow::NONE);
            gl.read_buffer(glow::NONE);
            gl.bind_texture(glow::TEXTURE_CUBE_MAP, None);

            let framebuffer = Self {
                gl: Arc::clone(gl),
                fbo,
                color_tex: None,
                depth_tex: Some(Texture {
                    gl: Arc::clone(gl),
                    id: tex,
                    target: glow::TEXTURE_CUBE_MAP,
                    width: size as u32,
                    height: size as u32,
                }),
                renderbuffer: None,
                width: size,
                height: size,
            };
            framebuffer.finish()
        }
    }

    /// Checks completeness and unbinds. An incomplete framebuffer is dropped (and its
    /// attachments with it) before the error is returned.
    fn finish(self) -> Result<Self, String> {
        let status = unsafe { self.gl.check_framebuffer_status(glow::FRAMEBUFFER) };
        Self::unbind(&self.gl);
        if status != glow::FRAMEBUFFER_COMPLETE {
            return Err(format!("framebuffer incomplete (status {status:#x})"));
        }
        Ok(self)
    }

    /// Binds the framebuffer for rendering and sets the viewport to cover it.
    pub fn bind(&self) {
        unsafe {
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(self.fbo));
            self.gl.viewport(0, 0, self.width, self.height);
        }
    }

    /// Unbinds the framebuffer, reverting to the default framebuffer.
    pub fn unbind(gl: &glow::Context) {
        unsafe {
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
        }
    }

    /// Returns the color texture of the framebuffer, if it has one.
    pub fn texture(&self) -> Option<&Texture> {
        self.color_tex.as_ref()
    }

    /// Returns the depth texture of the framebuffer, if it exists.
    pub fn depth_texture(&self) -> Option<&Texture> {
        self.depth_tex.as_ref()
    }

    /// Returns the size of the attachments in pixels.
    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        unsafe {
            if let Some(rbo) = self.renderbuffer {
                self.gl.delete_renderbuffer(rbo);
            }
            self.gl.delete_framebuffer(self.fbo);
        }
    }
}
