//! Ordering of transparent objects.

use glam::Vec3;

/// Sorts positions by distance from `camera`, farthest first, so blended surfaces are drawn
/// back to front. Objects at equal distances keep their relative order.
pub fn sort_back_to_front(camera: Vec3, positions: &[Vec3]) -> Vec<Vec3> {
    let mut sorted = positions.to_vec();
    sorted.sort_by(|a, b| {
        b.distance_squared(camera)
            .total_cmp(&a.distance_squared(camera))
    });
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn farthest_comes_first() {
        let windows = [
            Vec3::new(-1.5, 0.0, -0.48),
            Vec3::new(1.5, 0.0, 0.51),
            Vec3::new(0.0, 0.0, 0.7),
            Vec3::new(-0.3, 0.0, -2.3),
            Vec3::new(0.5, 0.0, -0.6),
        ];
        let camera = Vec3::new(0.0, 0.0, 3.0);
        let sorted = sort_back_to_front(camera, &windows);
        assert_eq!(sorted.len(), windows.len());
        assert_eq!(sorted[0], Vec3::new(-0.3, 0.0, -2.3));
        assert_eq!(sorted[4], Vec3::new(0.0, 0.0, 0.7));
        for pair in sorted.windows(2) {
            assert!(pair[0].distance(camera) >= pair[1].distance(camera));
        }
    }

    #[test]
    fn ties_keep_input_order() {
        let a = Vec3::new(1.0, 0.0, 0.0);
        let b = Vec3::new(-1.0, 0.0, 0.0);
        assert_eq!(sort_back_to_front(Vec3::ZERO, &[a, b]), vec![a, b]);
        assert_eq!(sort_back_to_front(Vec3::ZERO, &[b, a]), vec![b, a]);
    }

    #[test]
    fn empty_input() {
        assert!(sort_back_to_front(Vec3::ZERO, &[]).is_empty());
    }
}
