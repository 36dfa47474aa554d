//! Common sampling functions.

use crate::geometry::*;
use crate::pbrt::*;

/// Sample a direction on the +z hemisphere using cosine-weighted sampling.
///
/// * `u` - The random sample point.
#[inline]
pub fn cosine_sample_hemisphere(u: &Point2f) -> Vector3f {
    let z = u[0].sqrt();
    let r = max(0.0, 1.0 - z * z).sqrt();
    let phi = TWO_PI * u[1];
    Vector3f::new(r * phi.cos(), r * phi.sin(), z)
}

/// Returns the PDF for cosine-weighted sampling a direction from a hemisphere.
///
/// * `cos_theta` - Cosine of the angle to the hemisphere axis.
#[inline]
pub fn cosine_hemisphere_pdf(cos_theta: Float) -> Float {
    max(cos_theta, 0.0) * INV_PI
}

/// Uniformly sample a triangle and return barycentric coordinates of the
/// first two vertices.
///
/// * `u` - The random sample point.
#[inline]
pub fn uniform_sample_triangle(u: &Point2f) -> Point2f {
    let su0 = u[0].sqrt();
    Point2f::new(1.0 - su0, u[1] * su0)
}

/// Transform a direction from the local frame whose z-axis is the normal `n`
/// into world space.
///
/// * `a` - Direction in the local frame.
/// * `n` - Unit normal; the local z-axis.
pub fn to_world(a: &Vector3f, n: &Vector3f) -> Vector3f {
    let c = if n.x.abs() > n.y.abs() {
        let inv_len = 1.0 / (n.x * n.x + n.z * n.z).sqrt();
        Vector3f::new(n.z * inv_len, 0.0, -n.x * inv_len)
    } else {
        let inv_len = 1.0 / (n.y * n.y + n.z * n.z).sqrt();
        Vector3f::new(0.0, n.z * inv_len, -n.y * inv_len)
    };
    let b = c.cross(n);
    a.x * b + a.y * c + a.z * *n
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    prop_compose! {
        fn sample_2d()(x in 0.0..1.0f32, y in 0.0..1.0f32) -> Point2f {
            Point2f::new(x, y)
        }
    }

    prop_compose! {
        fn unit_normal()(
            x in -1.0..1.0f32,
            y in -1.0..1.0f32,
            z in -1.0..1.0f32,
        ) -> Vector3f {
            Vector3f::new(x, y, z)
        }
    }

    #[test]
    fn to_world_maps_z_to_normal() {
        for n in [
            Vector3f::new(0.0, 1.0, 0.0),
            Vector3f::new(1.0, 0.0, 0.0),
            Vector3f::new(0.0, 0.0, -1.0),
        ] {
            let w = to_world(&Vector3f::new(0.0, 0.0, 1.0), &n);
            assert!(approx_eq!(Float, w.dot(&n), 1.0, epsilon = 1e-6));
        }
    }

    proptest! {
        #[test]
        fn cosine_sample_is_unit_and_upper(u in sample_2d()) {
            let d = cosine_sample_hemisphere(&u);
            prop_assert!(approx_eq!(Float, d.length(), 1.0, epsilon = 1e-5));
            prop_assert!(d.z >= 0.0);
        }

        #[test]
        fn to_world_preserves_hemisphere(
            u in sample_2d(),
            n in unit_normal().prop_filter("non-zero", |n| n.length() > 0.1),
        ) {
            let n = n.normalize();
            let local = cosine_sample_hemisphere(&u);
            let w = to_world(&local, &n);
            prop_assert!(approx_eq!(Float, w.length(), 1.0, epsilon = 1e-4));
            prop_assert!(approx_eq!(Float, w.dot(&n), local.z, epsilon = 1e-4));
        }

        #[test]
        fn triangle_barycentrics_inside(u in sample_2d()) {
            let b = uniform_sample_triangle(&u);
            prop_assert!(b.x >= 0.0 && b.y >= 0.0 && b.x + b.y <= 1.0 + 1e-6);
        }
    }
}
