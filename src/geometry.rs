//! Built-in vertex data shared by the chapters.

use glam::{Vec2, Vec3};

use crate::abs::{PositionVertex, ScreenVertex, Vertex3D};

const fn v(position: [f32; 3], normal: [f32; 3], tex_coords: [f32; 2]) -> Vertex3D {
    Vertex3D::new(position, normal, tex_coords)
}

/// Unit cube centred on the origin, 6 faces of 2 counter-clockwise triangles each, with
/// per-face normals and 0..1 texture coordinates.
pub const CUBE: [Vertex3D; 36] = [
    // back face
    v([-0.5, -0.5, -0.5], [0.0, 0.0, -1.0], [0.0, 0.0]),
    v([0.5, 0.5, -0.5], [0.0, 0.0, -1.0], [1.0, 1.0]),
    v([0.5, -0.5, -0.5], [0.0, 0.0, -1.0], [1.0, 0.0]),
    v([0.5, 0.5, -0.5], [0.0, 0.0, -1.0], [1.0, 1.0]),
    v([-0.5, -0.5, -0.5], [0.0, 0.0, -1.0], [0.0, 0.0]),
    v([-0.5, 0.5, -0.5], [0.0, 0.0, -1.0], [0.0, 1.0]),
    // front face
    v([-0.5, -0.5, 0.5], [0.0, 0.0, 1.0], [0.0, 0.0]),
    v([0.5, -0.5, 0.5], [0.0, 0.0, 1.0], [1.0, 0.0]),
    v([0.5, 0.5, 0.5], [0.0, 0.0, 1.0], [1.0, 1.0]),
    v([0.5, 0.5, 0.5], [0.0, 0.0, 1.0], [1.0, 1.0]),
    v([-0.5, 0.5, 0.5], [0.0, 0.0, 1.0], [0.0, 1.0]),
    v([-0.5, -0.5, 0.5], [0.0, 0.0, 1.0], [0.0, 0.0]),
    // left face
    v([-0.5, 0.5, 0.5], [-1.0, 0.0, 0.0], [1.0, 0.0]),
    v([-0.5, 0.5, -0.5], [-1.0, 0.0, 0.0], [1.0, 1.0]),
    v([-0.5, -0.5, -0.5], [-1.0, 0.0, 0.0], [0.0, 1.0]),
    v([-0.5, -0.5, -0.5], [-1.0, 0.0, 0.0], [0.0, 1.0]),
    v([-0.5, -0.5, 0.5], [-1.0, 0.0, 0.0], [0.0, 0.0]),
    v([-0.5, 0.5, 0.5], [-1.0, 0.0, 0.0], [1.0, 0.0]),
    // right face
    v([0.5, 0.5, 0.5], [1.0, 0.0, 0.0], [1.0, 0.0]),
    v([0.5, -0.5, -0.5], [1.0, 0.0, 0.0], [0.0, 1.0]),
    v([0.5, 0.5, -0.5], [1.0, 0.0, 0.0], [1.0, 1.0]),
    v([0.5, -0.5, -0.5], [1.0, 0.0, 0.0], [0.0, 1.0]),
    v([0.5, 0.5, 0.5], [1.0, 0.0, 0.0], [1.0, 0.0]),
    v([0.5, -0.5, 0.5], [1.0, 0.0, 0.0], [0.0, 0.0]),
    // bottom face
    v([-0.5, -0.5, -0.5], [0.0, -1.0, 0.0], [0.0, 1.0]),
    v([0.5, -0.5, -0.5], [0.0, -1.0, 0.0], [1.0, 1.0]),
    v([0.5, -0.5, 0.5], [0.0, -1.0, 0.0], [1.0, 0.0]),
    v([0.5, -0.5, 0.5], [0.0, -1.0, 0.0], [1.0, 0.0]),
    v([-0.5, -0.5, 0.5], [0.0, -1.0, 0.0], [0.0, 0.0]),
    v([-0.5, -0.5, -0.5], [0.0, -1.0, 0.0], [0.0, 1.0]),
    // top face
    v([-0.5, 0.5, -0.5], [0.0, 1.0, 0.0], [0.0, 1.0]),
    v([0.5, 0.5, 0.5], [0.0, 1.0, 0.0], [1.0, 0.0]),
    v([0.5, 0.5, -0.5], [0.0, 1.0, 0.0], [1.0, 1.0]),
    v([0.5, 0.5, 0.5], [0.0, 1.0, 0.0], [1.0, 0.0]),
    v([-0.5, 0.5, -0.5], [0.0, 1.0, 0.0], [0.0, 1.0]),
    v([-0.5, 0.5, 0.5], [0.0, 1.0, 0.0], [0.0, 0.0]),
];

/// Horizontal plane at `y = -0.5` spanning `±extent`, facing up, with the texture repeated
/// `tiling` times across it.
pub fn floor(extent: f32, tiling: f32) -> [Vertex3D; 6] {
    let (e, t, y) = (extent, tiling, -0.5);
    let n = [0.0, 1.0, 0.0];
    [
        v([e, y, e], n, [t, 0.0]),
        v([-e, y, -e], n, [0.0, t]),
        v([-e, y, e], n, [0.0, 0.0]),
        v([e, y, e], n, [t, 0.0]),
        v([e, y, -e], n, [t, t]),
        v([-e, y, -e], n, [0.0, t]),
    ]
}

/// Unit quad standing upright in the XY plane, bottom edge at `y = -0.5`, used for grass and
/// window sprites.
pub const SPRITE: [Vertex3D; 6] = [
    v([0.0, 0.5, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
    v([0.0, -0.5, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
    v([1.0, -0.5, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
    v([0.0, 0.5, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
    v([1.0, -0.5, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
    v([1.0, 0.5, 0.0], [0.0, 0.0, 1.0], [1.0, 1.0]),
];

/// Two triangles covering the whole screen in normalized device coordinates.
pub fn screen_quad() -> [ScreenVertex; 6] {
    let s = |x: f32, y: f32, u: f32, t: f32| ScreenVertex {
        position: Vec2::new(x, y),
        tex_coords: Vec2::new(u, t),
    };
    [
        s(-1.0, 1.0, 0.0, 1.0),
        s(-1.0, -1.0, 0.0, 0.0),
        s(1.0, -1.0, 1.0, 0.0),
        s(-1.0, 1.0, 0.0, 1.0),
        s(1.0, -1.0, 1.0, 0.0),
        s(1.0, 1.0, 1.0, 1.0),
    ]
}

/// The skybox cube: positions only, spanning `±1`, wound to be seen from the inside.
pub fn skybox() -> Vec<PositionVertex> {
    // Inward-facing: reverse every triangle of the outward unit cube and scale by two.
    CUBE.chunks(3)
        .flat_map(|tri| [tri[0], tri[2], tri[1]])
        .map(|vertex| PositionVertex {
            position: vertex.position * 2.0,
        })
        .collect()
}

/// Positions of the ten textured cubes of the early chapters.
pub const CUBE_POSITIONS: [Vec3; 10] = [
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(2.0, 5.0, -15.0),
    Vec3::new(-1.5, -2.2, -2.5),
    Vec3::new(-3.8, -2.0, -12.3),
    Vec3::new(2.4, -0.4, -3.5),
    Vec3::new(-1.7, 3.0, -7.5),
    Vec3::new(1.3, -2.0, -2.5),
    Vec3::new(1.5, 2.0, -2.5),
    Vec3::new(1.5, 0.2, -1.5),
    Vec3::new(-1.3, 1.0, -1.5),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
        (b - a).cross(c - a).normalize()
    }

    #[test]
    fn cube_triangles_wind_outwards() {
        for tri in CUBE.chunks(3) {
            let n = face_normal(tri[0].position, tri[1].position, tri[2].position);
            for vertex in tri {
                assert!(n.abs_diff_eq(vertex.normal, 1e-5), "{tri:?}");
                // The normal points away from the centre.
                assert!(vertex.position.dot(vertex.normal) > 0.0);
            }
        }
    }

    #[test]
    fn cube_has_six_faces_of_six_vertices() {
        let mut normals: Vec<Vec3> = CUBE.iter().map(|v| v.normal).collect();
        normals.dedup();
        assert_eq!(normals.len(), 6);
        for v in CUBE {
            assert!((0.0..=1.0).contains(&v.tex_coords.x));
            assert!((0.0..=1.0).contains(&v.tex_coords.y));
        }
    }

    #[test]
    fn floor_faces_up_and_tiles() {
        let plane = floor(25.0, 25.0);
        for tri in plane.chunks(3) {
            let n = face_normal(tri[0].position, tri[1].position, tri[2].position);
            assert!(n.abs_diff_eq(Vec3::Y, 1e-5));
        }
        let max_u = plane.iter().map(|v| v.tex_coords.x).fold(0.0, f32::max);
        assert_eq!(max_u, 25.0);
    }

    #[test]
    fn skybox_is_seen_from_inside() {
        let sky = skybox();
        assert_eq!(sky.len(), 36);
        for tri in sky.chunks(3) {
            let (a, b, c) = (tri[0].position, tri[1].position, tri[2].position);
            let n = face_normal(a, b, c);
            assert!(a.dot(n) < 0.0);
            assert!(a.abs().max_element() == 1.0);
        }
    }

    #[test]
    fn screen_quad_covers_ndc() {
        let quad = screen_quad();
        let min = quad.iter().fold(Vec2::MAX, |m, v| m.min(v.position));
        let max = quad.iter().fold(Vec2::MIN, |m, v| m.max(v.position));
        assert_eq!(min, Vec2::splat(-1.0));
        assert_eq!(max, Vec2::splat(1.0));
    }
}
