//! Per-instance transforms for the asteroid field.

use glam::{Mat4, Vec3};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rayon::prelude::*;

/// Smallest and largest asteroid scale.
pub const SCALE_RANGE: (f32, f32) = (0.05, 0.25);

/// Axis every asteroid is rotated around.
pub const ROTATION_AXIS: Vec3 = Vec3::new(0.4, 0.6, 0.8);

/// Generates `count` model matrices spread around a ring of `radius` in the XZ plane.
///
/// Asteroid `i` sits at angle `i / count * 360°`, displaced by up to `offset` on X and Z and up
/// to `0.4 * offset` on Y, then scaled and rotated randomly. Every asteroid draws from its own
/// RNG seeded from `seed` and its index, so the result only depends on the arguments and not on
/// how the work is split across threads.
pub fn asteroid_field(count: usize, radius: f32, offset: f32, seed: u64) -> Vec<Mat4> {
    (0..count)
        .into_par_iter()
        .map(|i| {
            let mut rng = StdRng::seed_from_u64(seed ^ (i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
            let mut jitter = |extent: f32| {
                if extent > 0.0 {
                    rng.random_range(-extent..extent)
                } else {
                    0.0
                }
            };

            let angle = i as f32 / count as f32 * std::f32::consts::TAU;
            let x = angle.sin() * radius + jitter(offset);
            let y = jitter(offset * 0.4);
            let z = angle.cos() * radius + jitter(offset);

            let scale = rng.random_range(SCALE_RANGE.0..SCALE_RANGE.1);
            let rotation = rng.random_range(0.0..360.0f32).to_radians();

            Mat4::from_translation(Vec3::new(x, y, z))
                * Mat4::from_scale(Vec3::splat(scale))
                * Mat4::from_axis_angle(ROTATION_AXIS.normalize(), rotation)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_field() {
        let a = asteroid_field(500, 50.0, 2.5, 7);
        let b = asteroid_field(500, 50.0, 2.5, 7);
        assert_eq!(a, b);
        let c = asteroid_field(500, 50.0, 2.5, 8);
        assert_ne!(a, c);
    }

    #[test]
    fn asteroids_stay_near_the_ring() {
        let (radius, offset) = (50.0, 2.5);
        for m in asteroid_field(1000, radius, offset, 1) {
            let (scale, _, translation) = m.to_scale_rotation_translation();
            let planar = translation.truncate().with_y(translation.z).length();
            assert!((planar - radius).abs() <= offset * 2f32.sqrt() + 1e-3);
            assert!(translation.y.abs() <= offset * 0.4);
            for s in scale.to_array() {
                assert!((SCALE_RANGE.0 - 1e-4..=SCALE_RANGE.1 + 1e-4).contains(&s));
            }
        }
    }

    #[test]
    fn zero_offset_places_asteroids_exactly_on_the_ring() {
        let field = asteroid_field(4, 10.0, 0.0, 3);
        let first = field[0].w_axis.truncate();
        assert!(first.abs_diff_eq(Vec3::new(0.0, 0.0, 10.0), 1e-4));
        let second = field[1].w_axis.truncate();
        assert!(second.abs_diff_eq(Vec3::new(10.0, 0.0, 0.0), 1e-4));
    }

    #[test]
    fn empty_field() {
        assert!(asteroid_field(0, 10.0, 1.0, 0).is_empty());
    }
}
