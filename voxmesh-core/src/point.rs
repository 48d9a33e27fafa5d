//! Point and vector type aliases

use nalgebra::{Point3, Vector3};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// Linear interpolation between two points by `t` in `[0, 1]`
pub fn lerp_point(a: &Point3f, b: &Point3f, t: f32) -> Point3f {
    Point3f::from(a.coords + (b.coords - a.coords) * t)
}

/// Linear interpolation between two vectors by `t` in `[0, 1]`
pub fn lerp_vector(a: &Vector3f, b: &Vector3f, t: f32) -> Vector3f {
    a + (b - a) * t
}

/// Parameter of the isovalue crossing between two field samples, falling
/// back to the midpoint when the samples are (nearly) equal.
pub fn crossing_parameter(isovalue: f32, f1: f32, f2: f32) -> f32 {
    let denom = f2 - f1;
    if denom.abs() < 1e-12 {
        0.5
    } else {
        (isovalue - f1) / denom
    }
}

/// Position of the isovalue crossing between two samples:
/// `lerp(v1, v2, (isovalue - f1) / (f2 - f1))`.
pub fn interpolate(isovalue: f32, f1: f32, f2: f32, v1: &Point3f, v2: &Point3f) -> Point3f {
    lerp_point(v1, v2, crossing_parameter(isovalue, f1, f2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_point_endpoints() {
        let a = Point3f::new(1.0, 2.0, 3.0);
        let b = Point3f::new(5.0, 6.0, 7.0);
        assert_eq!(lerp_point(&a, &b, 0.0), a);
        assert_eq!(lerp_point(&a, &b, 1.0), b);
        assert_eq!(lerp_point(&a, &b, 0.5), Point3f::new(3.0, 4.0, 5.0));
    }

    #[test]
    fn test_lerp_vector_midpoint() {
        let a = Vector3f::new(0.0, 0.0, 2.0);
        let b = Vector3f::new(2.0, 0.0, 0.0);
        assert_eq!(lerp_vector(&a, &b, 0.5), Vector3f::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn test_interpolate_crossing() {
        let a = Point3f::new(0.0, 0.0, 0.0);
        let b = Point3f::new(4.0, 0.0, 0.0);

        // Isovalue halfway between the samples lands on the midpoint.
        assert_eq!(interpolate(0.5, 0.0, 1.0, &a, &b), Point3f::new(2.0, 0.0, 0.0));
        // A quarter of the way up the ramp lands a quarter along the edge.
        assert_eq!(interpolate(0.25, 0.0, 1.0, &a, &b), Point3f::new(1.0, 0.0, 0.0));
        // Swapping sample order mirrors the parameter.
        assert_eq!(interpolate(0.25, 1.0, 0.0, &a, &b), Point3f::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_interpolate_equal_samples_uses_midpoint() {
        let a = Point3f::new(0.0, 0.0, 0.0);
        let b = Point3f::new(2.0, 0.0, 0.0);
        assert_eq!(interpolate(0.5, 0.3, 0.3, &a, &b), Point3f::new(1.0, 0.0, 0.0));
        assert_eq!(crossing_parameter(0.5, 0.3, 0.3), 0.5);
    }
}
