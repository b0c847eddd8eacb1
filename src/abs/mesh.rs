//! Mesh management module.
//!
//! This module defines the [`Mesh`] struct for managing mesh data on the GPU side.
//! Vertices should implement the [`Vertex`] trait. Per-instance transforms live in an
//! [`InstanceBuffer`] attached to a mesh.

use std::mem::{offset_of, size_of};
use std::sync::Arc;

use glam::{Mat4, Vec2, Vec3};
use glow::HasContext;

/// Trait that defines the necessary methods for a vertex.
pub trait Vertex {
    /// Sets up the vertex attribute pointers for the vertex.
    fn vertex_attribs(gl: &glow::Context);
}

/// The vertex used by almost every chapter: position, normal and texture coordinates at
/// attribute locations 0, 1 and 2.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[repr(C)]
pub struct Vertex3D {
    pub position: Vec3,
    pub normal: Vec3,
    pub tex_coords: Vec2,
}

impl Vertex3D {
    pub const fn new(position: [f32; 3], normal: [f32; 3], tex_coords: [f32; 2]) -> Self {
        Self {
            position: Vec3::from_array(position),
            normal: Vec3::from_array(normal),
            tex_coords: Vec2::from_array(tex_coords),
        }
    }
}

impl Vertex for Vertex3D {
    fn vertex_attribs(gl: &glow::Context) {
        unsafe {
            let stride = size_of::<Vertex3D>() as i32;

            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(
                0,
                3,
                glow::FLOAT,
                false,
                stride,
                offset_of!(Vertex3D, position) as i32,
            );

            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_f32(
                1,
                3,
                glow::FLOAT,
                false,
                stride,
                offset_of!(Vertex3D, normal) as i32,
            );

            gl.enable_vertex_attrib_array(2);
            gl.vertex_attrib_pointer_f32(
                2,
                2,
                glow::FLOAT,
                false,
                stride,
                offset_of!(Vertex3D, tex_coords) as i32,
            );
        }
    }
}

/// Position-only vertex, used for the skybox.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct PositionVertex {
    pub position: Vec3,
}

impl Vertex for PositionVertex {
    fn vertex_attribs(gl: &glow::Context) {
        unsafe {
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(
                0,
                3,
                glow::FLOAT,
                false,
                size_of::<PositionVertex>() as i32,
                0,
            );
        }
    }
}

/// Vertex of the full-screen quad, already in normalized device coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct ScreenVertex {
    pub position: Vec2,
    pub tex_coords: Vec2,
}

impl Vertex for ScreenVertex {
    fn vertex_attribs(gl: &glow::Context) {
        unsafe {
            let stride = size_of::<ScreenVertex>() as i32;
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 2, glow::FLOAT, false, stride, 0);
            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_f32(
                1,
                2,
                glow::FLOAT,
                false,
                stride,
                offset_of!(ScreenVertex, tex_coords) as i32,
            );
        }
    }
}

/// Reinterprets a slice of plain `#[repr(C)]` values as bytes for upload.
fn as_bytes<T: Copy>(data: &[T]) -> &[u8] {
    unsafe { std::slice::from_raw_parts(data.as_ptr() as *const u8, std::mem::size_of_val(data)) }
}

/// Represents a mesh stored on the GPU side.
pub struct Mesh {
    gl: Arc<glow::Context>,
    draw_mode: u32,
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ebo: glow::Buffer,
    index_count: usize,
}

impl Mesh {
    /// Creates a new mesh from the given vertex and index data.
    pub fn new<V: Vertex + Copy>(
        gl: &Arc<glow::Context>,
        vertices: &[V],
        indices: &[u32],
        draw_mode: u32,
    ) -> Result<Self, String> {
        unsafe {
            let vao = gl.create_vertex_array()?;
            let vbo = gl.create_buffer()?;
            let ebo = gl.create_buffer()?;

            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, as_bytes(vertices), glow::STATIC_DRAW);

            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                as_bytes(indices),
                glow::STATIC_DRAW,
            );

            V::vertex_attribs(gl);

            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None);

            Ok(Self {
                gl: Arc::clone(gl),
                draw_mode,
                vao,
                vbo,
                ebo,
                index_count: indices.len(),
            })
        }
    }

    /// Creates a triangle mesh from unindexed vertices, e.g. the 36-vertex cube.
    pub fn from_vertices<V: Vertex + Copy>(
        gl: &Arc<glow::Context>,
        vertices: &[V],
    ) -> Result<Self, String> {
        let indices: Vec<u32> = (0..vertices.len() as u32).collect();
        Self::new(gl, vertices, &indices, glow::TRIANGLES)
    }

    /// Draws the mesh.
    pub fn draw(&self) {
        unsafe {
            self.gl.bind_vertex_array(Some(self.vao));
            self.gl
                .draw_elements(self.draw_mode, self.index_count as i32, glow::UNSIGNED_INT, 0);
            self.gl.bind_vertex_array(None);
        }
    }

    /// Draws `instances` copies of the mesh in one call. Per-instance data must have been
    /// attached with [`InstanceBuffer::attach`].
    pub fn draw_instanced(&self, instances: usize) {
        unsafe {
            self.gl.bind_vertex_array(Some(self.vao));
            self.gl.draw_elements_instanced(
                self.draw_mode,
                self.index_count as i32,
                glow::UNSIGNED_INT,
                0,
                instances as i32,
            );
            self.gl.bind_vertex_array(None);
        }
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_buffer(self.vbo);
            self.gl.delete_buffer(self.ebo);
            self.gl.delete_vertex_array(self.vao);
        }
    }
}

/// A buffer of per-instance model matrices.
pub struct InstanceBuffer {
    gl: Arc<glow::Context>,
    vbo: glow::Buffer,
    count: usize,
}

impl InstanceBuffer {
    /// First attribute location used by the instance matrix. A `mat4` attribute takes four
    /// consecutive locations, so `3..=6` are occupied.
    pub const FIRST_LOCATION: u32 = 3;

    /// Uploads the matrices into a new buffer.
    pub fn new(gl: &Arc<glow::Context>, transforms: &[Mat4]) -> Result<Self, String> {
        unsafe {
            let vbo = gl.create_buffer()?;
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, as_bytes(transforms), glow::STATIC_DRAW);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            Ok(Self {
                gl: Arc::clone(gl),
                vbo,
                count: transforms.len(),
            })
        }
    }

    /// Adds the instance matrix attributes to the mesh's vertex array, advancing once per
    /// instance instead of once per vertex.
    pub fn attach(&self, mesh: &Mesh) {
        unsafe {
            self.gl.bind_vertex_array(Some(mesh.vao));
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
            let stride = size_of::<Mat4>() as i32;
            for column in 0..4 {
                let location = Self::FIRST_LOCATION + column;
                self.gl.enable_vertex_attrib_array(location);
                self.gl.vertex_attrib_pointer_f32(
                    location,
                    4,
                    glow::FLOAT,
                    false,
                    stride,
                    (column as usize * size_of::<glam::Vec4>()) as i32,
                );
                self.gl.vertex_attrib_divisor(location, 1);
            }
            self.gl.bind_vertex_array(None);
            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
    }

    /// Number of instances in the buffer.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the buffer holds no instances.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl Drop for InstanceBuffer {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_buffer(self.vbo);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layouts_are_tightly_packed() {
        assert_eq!(size_of::<Vertex3D>(), 8 * size_of::<f32>());
        assert_eq!(offset_of!(Vertex3D, normal), 3 * size_of::<f32>());
        assert_eq!(offset_of!(Vertex3D, tex_coords), 6 * size_of::<f32>());
        assert_eq!(size_of::<PositionVertex>(), 3 * size_of::<f32>());
        assert_eq!(size_of::<ScreenVertex>(), 4 * size_of::<f32>());
        assert_eq!(size_of::<Mat4>(), 16 * size_of::<f32>());
    }

    #[test]
    fn byte_view_covers_whole_slice() {
        let indices = [0u32, 1, 2];
        let bytes = as_bytes(&indices);
        assert_eq!(bytes.len(), 12);
        assert_eq!(&bytes[4..8], &1u32.to_ne_bytes());
    }
}
