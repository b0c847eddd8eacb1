//! Light-space transforms for shadow mapping.

use glam::{Mat4, Vec3};

/// View-projection of a directional light for a 2D shadow map.
///
/// The light looks from `light_pos` towards `target` with an orthographic box of
/// `half_extent` units around its axis.
pub fn directional_light_space(
    light_pos: Vec3,
    target: Vec3,
    half_extent: f32,
    near: f32,
    far: f32,
) -> Mat4 {
    let up = if (target - light_pos).normalize().abs().abs_diff_eq(Vec3::Y, 1e-4) {
        Vec3::Z
    } else {
        Vec3::Y
    };
    let projection = Mat4::orthographic_rh_gl(
        -half_extent,
        half_extent,
        -half_extent,
        half_extent,
        near,
        far,
    );
    projection * Mat4::look_at_rh(light_pos, target, up)
}

/// Look direction and up vector of each cube map face, in `GL_TEXTURE_CUBE_MAP_POSITIVE_X + i`
/// order. The up vectors follow the cube map convention where face images are stored with
/// `t` pointing down.
pub const CUBE_FACES: [(Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::NEG_Y),
    (Vec3::NEG_X, Vec3::NEG_Y),
    (Vec3::Y, Vec3::Z),
    (Vec3::NEG_Y, Vec3::NEG_Z),
    (Vec3::Z, Vec3::NEG_Y),
    (Vec3::NEG_Z, Vec3::NEG_Y),
];

/// The six view-projections used to render a point light's depth cube map.
pub fn point_light_transforms(light_pos: Vec3, near: f32, far: f32) -> [Mat4; 6] {
    let projection = Mat4::perspective_rh_gl(90f32.to_radians(), 1.0, near, far);
    CUBE_FACES.map(|(dir, up)| projection * Mat4::look_at_rh(light_pos, light_pos + dir, up))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directional_target_maps_to_center() {
        let light_space =
            directional_light_space(Vec3::new(-2.0, 4.0, -1.0), Vec3::ZERO, 10.0, 1.0, 7.5);
        let ndc = light_space.project_point3(Vec3::ZERO);
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        // Inside the depth range.
        assert!(ndc.z > -1.0 && ndc.z < 1.0);
    }

    #[test]
    fn directional_box_clips_outside_extent() {
        let light_space = directional_light_space(Vec3::new(0.0, 5.0, 5.0), Vec3::ZERO, 2.0, 0.1, 20.0);
        let far_away = light_space.project_point3(Vec3::new(50.0, 0.0, 0.0));
        assert!(far_away.x.abs() > 1.0);
    }

    #[test]
    fn straight_down_light_does_not_degenerate() {
        let light_space = directional_light_space(Vec3::new(0.0, 10.0, 0.0), Vec3::ZERO, 5.0, 1.0, 20.0);
        assert!(light_space.is_finite());
        let ndc = light_space.project_point3(Vec3::ZERO);
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
    }

    #[test]
    fn each_cube_face_centers_its_axis() {
        let pos = Vec3::new(1.0, 2.0, 3.0);
        let transforms = point_light_transforms(pos, 1.0, 25.0);
        for (transform, (dir, _)) in transforms.iter().zip(CUBE_FACES) {
            let ndc = transform.project_point3(pos + dir * 5.0);
            assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4, "face {dir:?} gave {ndc:?}");
            assert!(ndc.z > -1.0 && ndc.z < 1.0);
        }
    }

    #[test]
    fn points_behind_a_face_are_not_in_front() {
        let transforms = point_light_transforms(Vec3::ZERO, 1.0, 25.0);
        let clip = transforms[0] * Vec3::new(-5.0, 0.0, 0.0).extend(1.0);
        assert!(clip.w < 0.0);
    }
}
