//! Triangles

use simcore::geometry::*;
use simcore::pbrt::*;
use simcore::sampling::*;

/// A single triangle with precomputed edges, normal and area. Immutable after
/// construction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Triangle {
    /// Vertices.
    pub v: [Point3f; 3],

    /// Edge `v1 - v0`.
    e1: Vector3f,

    /// Edge `v2 - v0`.
    e2: Vector3f,

    /// Unit normal `normalize(e1 × e2)`. NaN for degenerate triangles.
    normal: Vector3f,

    /// Surface area.
    area: Float,
}

impl Triangle {
    /// Create a new triangle. The winding `v0 → v1 → v2` is counter-clockwise
    /// when seen from the side the normal points to.
    ///
    /// * `v0` - First vertex.
    /// * `v1` - Second vertex.
    /// * `v2` - Third vertex.
    pub fn new(v0: Point3f, v1: Point3f, v2: Point3f) -> Self {
        let e1 = v1 - v0;
        let e2 = v2 - v0;
        let c = e1.cross(&e2);
        Self {
            v: [v0, v1, v2],
            e1,
            e2,
            normal: c.normalize(),
            area: 0.5 * c.length(),
        }
    }

    /// Returns the centroid.
    pub fn centroid(&self) -> Point3f {
        (self.v[0] + self.v[1] + self.v[2]) / 3.0
    }
}

impl Shape for Triangle {
    /// Returns the bounding box of the vertices.
    fn bounds(&self) -> Bounds3f {
        Bounds3f::new(self.v[0], self.v[1]).union(&self.v[2])
    }

    /// Returns the surface area.
    fn area(&self) -> Float {
        self.area
    }

    /// Returns the unit normal.
    fn normal(&self) -> Vector3f {
        self.normal
    }

    /// Möller–Trumbore intersection. Only the front face is hit: rays must
    /// travel against the normal. Rays nearly parallel to the plane and
    /// degenerate triangles miss.
    ///
    /// * `ray` - The ray.
    fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        if self.normal.dot(&ray.d) > -EPSILON {
            return None;
        }

        let p_vec = ray.d.cross(&self.e2);
        let det = self.e1.dot(&p_vec);
        if det.abs() < 10.0 * EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;

        let t_vec = ray.o - self.v[0];
        let u = t_vec.dot(&p_vec) * inv_det;
        if !(-EPSILON..=1.0 + EPSILON).contains(&u) {
            return None;
        }

        let q_vec = t_vec.cross(&self.e1);
        let v = ray.d.dot(&q_vec) * inv_det;
        if v < -EPSILON || u + v > 1.0 + EPSILON {
            return None;
        }

        let t = self.e2.dot(&q_vec) * inv_det;
        if t < -EPSILON {
            return None;
        }

        Some(Intersection::new(ray.at(t), self.normal, t))
    }

    /// Uniformly sample a point on the triangle.
    ///
    /// * `u` - Sample value to use.
    fn sample(&self, u: &Point2f) -> SurfaceSample {
        let b = uniform_sample_triangle(u);
        let p = b[0] * self.v[0] + b[1] * self.v[1] + (1.0 - b[0] - b[1]) * self.v[2];
        SurfaceSample {
            p,
            n: self.normal,
            pdf: 1.0 / self.area,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    /// Unit right triangle in the y = 0 plane facing +y.
    fn floor() -> Triangle {
        Triangle::new(
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(0.0, 0.0, 1.0),
            Point3f::new(1.0, 0.0, 0.0),
        )
    }

    #[test]
    fn derived_values() {
        let t = floor();
        assert_eq!(t.normal(), Vector3f::new(0.0, 1.0, 0.0));
        assert!(approx_eq!(Float, t.area(), 0.5));
        let b = t.bounds();
        assert_eq!(b.p_min, Point3f::ZERO);
        assert_eq!(b.p_max, Point3f::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn hit_from_front() {
        let ray = Ray::new(Point3f::new(0.25, 2.0, 0.25), Vector3f::new(0.0, -1.0, 0.0));
        let hit = floor().intersect(&ray).unwrap();
        assert!(approx_eq!(Float, hit.distance, 2.0, epsilon = 1e-6));
        assert!(approx_eq!(Float, hit.p.y, 0.0, epsilon = 1e-6));
        assert_eq!(hit.n, Vector3f::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn back_face_is_culled() {
        let ray = Ray::new(Point3f::new(0.25, -2.0, 0.25), Vector3f::new(0.0, 1.0, 0.0));
        assert!(floor().intersect(&ray).is_none());
    }

    #[test]
    fn parallel_ray_misses() {
        let ray = Ray::new(Point3f::new(-1.0, 0.0, 0.25), Vector3f::new(1.0, 0.0, 0.0));
        assert!(floor().intersect(&ray).is_none());
    }

    #[test]
    fn outside_barycentrics_miss() {
        let ray = Ray::new(Point3f::new(0.9, 2.0, 0.9), Vector3f::new(0.0, -1.0, 0.0));
        assert!(floor().intersect(&ray).is_none());
    }

    #[test]
    fn behind_origin_misses() {
        let ray = Ray::new(Point3f::new(0.25, -2.0, 0.25), Vector3f::new(0.0, -1.0, 0.0));
        assert!(floor().intersect(&ray).is_none());
    }

    #[test]
    fn degenerate_triangle_never_hits() {
        let t = Triangle::new(Point3f::ZERO, Point3f::new(1.0, 0.0, 0.0), Point3f::new(2.0, 0.0, 0.0));
        assert_eq!(t.area(), 0.0);
        let ray = Ray::new(Point3f::new(1.0, 1.0, 0.0), Vector3f::new(0.0, -1.0, 0.0));
        assert!(t.intersect(&ray).is_none());
    }

    prop_compose! {
        fn vertex()(x in -10.0..10.0f32, y in -10.0..10.0f32, z in -10.0..10.0f32) -> Point3f {
            Point3f::new(x, y, z)
        }
    }

    prop_compose! {
        fn triangle()(v0 in vertex(), v1 in vertex(), v2 in vertex()) -> Triangle {
            Triangle::new(v0, v1, v2)
        }
    }

    proptest! {
        #[test]
        fn sample_then_intersect_round_trip(
            t in triangle().prop_filter("well shaped", |t| t.area() > 0.5),
            u0 in 0.05..0.95f32,
            u1 in 0.05..0.95f32,
            offset in 0.5..20.0f32,
        ) {
            let s = t.sample(&Point2f::new(u0, u1));
            prop_assert!(approx_eq!(Float, s.pdf, 1.0 / t.area(), ulps = 4));

            let ray = Ray::new(s.p + offset * s.n, -s.n);
            let hit = t.intersect(&ray);
            prop_assert!(hit.is_some());
            let hit = hit.unwrap();
            prop_assert!((hit.distance - offset).abs() < 1e-3 * (1.0 + offset));
        }

        #[test]
        fn sample_lies_in_bounds(t in triangle(), u0 in 0.0..1.0f32, u1 in 0.0..1.0f32) {
            let s = t.sample(&Point2f::new(u0, u1));
            let b = t.bounds();
            let slack = Vector3f::splat(1e-4);
            let grown = Bounds3f::new(b.p_min - slack, b.p_max + slack);
            prop_assert!(grown.contains(&s.p));
        }
    }
}
