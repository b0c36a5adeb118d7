//! Scalar and vector interpolation helpers.
//!
//! All interpolation here is clamped: results never leave the range spanned by
//! the two endpoints, whichever order they are given in.

use glam::Vec3;

/// Clamps `val` into `[min, max]`.
#[inline]
pub fn clamp(min: f32, max: f32, val: f32) -> f32 {
    val.min(max).max(min)
}

/// Linear interpolation from `a` to `b` by `perc`, clamped to the endpoints.
///
/// The endpoints may be given in either order.
pub fn lerp(a: f32, b: f32, perc: f32) -> f32 {
    if a > b {
        lerp(b, a, 1.0 - perc)
    } else {
        clamp(a, b, a + (b - a) * perc)
    }
}

/// Inverse of [`lerp`]: the percentage that produces `val` between `min` and `max`.
///
/// Values at or beyond either end map to exactly 0 or 1.
pub fn inverse_lerp(min: f32, max: f32, val: f32) -> f32 {
    if val >= max {
        1.0
    } else if val <= min {
        0.0
    } else {
        (val - min) / (max - min)
    }
}

/// True if `val` lies in the closed range `[min, max]`.
#[inline]
pub fn range_check(min: f32, max: f32, val: f32) -> bool {
    val >= min && val <= max
}

/// Componentwise [`lerp`].
pub fn lerp_vec3(a: Vec3, b: Vec3, perc: f32) -> Vec3 {
    Vec3::new(
        lerp(a.x, b.x, perc),
        lerp(a.y, b.y, perc),
        lerp(a.z, b.z, perc),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_lerp_midpoint() {
        assert!((lerp(2.0, 4.0, 0.5) - 3.0).abs() < EPSILON);
        assert!((lerp(4.0, 2.0, 0.25) - 3.5).abs() < EPSILON);
    }

    #[test]
    fn test_lerp_clamps_to_endpoints() {
        assert_eq!(lerp(0.0, 1.0, 1.5), 1.0);
        assert_eq!(lerp(0.0, 1.0, -0.5), 0.0);
        assert_eq!(lerp(1.0, 0.0, 2.0), 0.0);
        assert_eq!(lerp(1.0, 0.0, -1.0), 1.0);
    }

    #[test]
    fn test_lerp_matches_formula_inside_range() {
        let (a, b) = (0.26_f32, 0.8_f32);
        for i in 1..10 {
            let p = i as f32 / 10.0;
            assert!((lerp(a, b, p) - (a + (b - a) * p)).abs() < EPSILON);
            assert!((lerp(b, a, p) - (b + (a - b) * p)).abs() < EPSILON);
        }
    }

    #[test]
    fn test_inverse_lerp() {
        assert_eq!(inverse_lerp(0.0, 10.0, 15.0), 1.0);
        assert_eq!(inverse_lerp(0.0, 10.0, -3.0), 0.0);
        assert!((inverse_lerp(0.0, 10.0, 2.5) - 0.25).abs() < EPSILON);
    }

    #[test]
    fn test_range_check_is_inclusive() {
        assert!(range_check(0.0, 1.0, 0.0));
        assert!(range_check(0.0, 1.0, 1.0));
        assert!(!range_check(0.0, 1.0, 1.01));
    }

    #[test]
    fn test_lerp_vec3_componentwise() {
        let v = lerp_vec3(Vec3::new(0.0, 100.0, 0.0), Vec3::new(100.0, 100.0, -50.0), 0.5);
        assert!((v - Vec3::new(50.0, 100.0, -25.0)).length() < 1e-4);
    }
}
