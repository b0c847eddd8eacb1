//! OpenGL Shaders
//!
//! This module defines the [`Shader`] and [`ShaderProgram`] structs for managing OpenGL shaders.
//! This module also provides the [`Uniform`] trait for setting uniform variables in shader
//! programs.

use std::sync::Arc;

use glam::{Mat4, Vec2, Vec3, Vec4};
use glow::HasContext;

/// Returns a human readable name for a shader stage, used in error messages.
pub fn stage_name(shader_type: u32) -> &'static str {
    match shader_type {
        glow::VERTEX_SHADER => "vertex",
        glow::FRAGMENT_SHADER => "fragment",
        glow::GEOMETRY_SHADER => "geometry",
        _ => "unknown",
    }
}

/// Represents an individual OpenGL shader.
pub struct Shader {
    gl: Arc<glow::Context>,
    id: glow::Shader,
}

impl Shader {
    /// Compiles a new shader from the given source code.
    ///
    /// On failure the returned error contains the stage name and the driver's info log.
    pub fn new(gl: &Arc<glow::Context>, shader_type: u32, source: &str) -> Result<Self, String> {
        unsafe {
            let shader = gl.create_shader(shader_type).map_err(|e| e.to_string())?;
            gl.shader_source(shader, source);
            gl.compile_shader(shader);

            if !gl.get_shader_compile_status(shader) {
                let log = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);
                return Err(format!(
                    "{} shader failed to compile:\n{}",
                    stage_name(shader_type),
                    log.trim_end()
                ));
            }

            Ok(Self {
                gl: Arc::clone(gl),
                id: shader,
            })
        }
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_shader(self.id);
        }
    }
}

/// Represents a uniform variable in a shader program.
pub trait Uniform {
    /// Uploads the value to the given location of the currently bound program.
    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation);

    /// Sets the value of the uniform variable in the given shader program.
    ///
    /// Names that do not resolve to an active uniform are silently ignored, matching what GL
    /// does for location `-1`.
    fn set_uniform(&self, gl: &glow::Context, program: glow::Program, name: &str) {
        let location = unsafe { gl.get_uniform_location(program, name) };
        if let Some(loc) = location {
            self.upload(gl, &loc);
        }
    }
}

impl Uniform for bool {
    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_1_i32(Some(location), *self as i32) }
    }
}

impl Uniform for f32 {
    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_1_f32(Some(location), *self) }
    }
}

impl Uniform for i32 {
    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_1_i32(Some(location), *self) }
    }
}

impl Uniform for Vec2 {
    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_2_f32(Some(location), self.x, self.y) }
    }
}

impl Uniform for Vec3 {
    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_3_f32(Some(location), self.x, self.y, self.z) }
    }
}

impl Uniform for Vec4 {
    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_4_f32(Some(location), self.x, self.y, self.z, self.w) }
    }
}

impl Uniform for Mat4 {
    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_matrix_4_f32_slice(Some(location), false, self.as_ref()) }
    }
}

impl<const N: usize> Uniform for [f32; N] {
    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_1_f32_slice(Some(location), self) }
    }
}

impl<const N: usize> Uniform for [Mat4; N] {
    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        let data: Vec<f32> = self.iter().flat_map(|m| m.to_cols_array()).collect();
        unsafe { gl.uniform_matrix_4_f32_slice(Some(location), false, &data) }
    }
}

impl<T: Uniform> Uniform for &T {
    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        (*self).upload(gl, location);
    }
}

/// Represents an OpenGL shader program composed of multiple shaders.
pub struct ShaderProgram {
    gl: Arc<glow::Context>,
    id: glow::Program,
}

impl ShaderProgram {
    /// Links a new shader program from the given shaders.
    pub fn new(gl: &Arc<glow::Context>, shaders: &[&Shader]) -> Result<Self, String> {
        unsafe {
            let program = gl.create_program().map_err(|e| e.to_string())?;

            for shader in shaders {
                gl.attach_shader(program, shader.id);
            }

            gl.link_program(program);

            if !gl.get_program_link_status(program) {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                return Err(format!("program failed to link:\n{}", log.trim_end()));
            }

            for shader in shaders {
                gl.detach_shader(program, shader.id);
            }

            Ok(Self {
                gl: Arc::clone(gl),
                id: program,
            })
        }
    }

    /// Compiles and links a program from vertex, fragment and optional geometry sources.
    pub fn from_sources(
        gl: &Arc<glow::Context>,
        vertex: &str,
        fragment: &str,
        geometry: Option<&str>,
    ) -> Result<Self, String> {
        let vert = Shader::new(gl, glow::VERTEX_SHADER, vertex)?;
        let frag = Shader::new(gl, glow::FRAGMENT_SHADER, fragment)?;
        match geometry {
            Some(source) => {
                let geom = Shader::new(gl, glow::GEOMETRY_SHADER, source)?;
                Self::new(gl, &[&vert, &geom, &frag])
            }
            None => Self::new(gl, &[&vert, &frag]),
        }
    }

    /// Binds the shader program for use.
    pub fn use_program(&self) {
        unsafe {
            self.gl.use_program(Some(self.id));
        }
    }

    /// Sets a uniform variable in the shader program.
    ///
    /// The program must be bound with [`ShaderProgram::use_program`] first.
    pub fn set_uniform<T: Uniform>(&self, name: &str, value: T) {
        value.set_uniform(&self.gl, self.id, name);
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_program(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_names() {
        assert_eq!(stage_name(glow::VERTEX_SHADER), "vertex");
        assert_eq!(stage_name(glow::FRAGMENT_SHADER), "fragment");
        assert_eq!(stage_name(glow::GEOMETRY_SHADER), "geometry");
        assert_eq!(stage_name(0), "unknown");
    }
}
