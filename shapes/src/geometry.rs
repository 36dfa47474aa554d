//! Closed set of scene geometry kinds

use crate::Triangle;
use simcore::geometry::*;
use simcore::pbrt::*;

/// Every kind of geometry a scene can hold. Dispatch is a `match`, not a
/// virtual call.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Geometry {
    /// A single triangle.
    Triangle(Triangle),
}

impl Geometry {
    /// Returns the centroid of the geometry's bounding box, used to order
    /// primitives while building the BVH.
    pub fn centroid(&self) -> Point3f {
        self.bounds().centroid()
    }
}

impl From<Triangle> for Geometry {
    fn from(t: Triangle) -> Self {
        Self::Triangle(t)
    }
}

impl Shape for Geometry {
    fn bounds(&self) -> Bounds3f {
        match self {
            Self::Triangle(t) => t.bounds(),
        }
    }

    fn area(&self) -> Float {
        match self {
            Self::Triangle(t) => t.area(),
        }
    }

    fn normal(&self) -> Vector3f {
        match self {
            Self::Triangle(t) => t.normal(),
        }
    }

    fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        match self {
            Self::Triangle(t) => t.intersect(ray),
        }
    }

    fn sample(&self, u: &Point2f) -> SurfaceSample {
        match self {
            Self::Triangle(t) => t.sample(u),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_to_triangle() {
        let t = Triangle::new(
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
        );
        let g = Geometry::from(t);
        assert_eq!(g.bounds(), t.bounds());
        assert_eq!(g.area(), t.area());
        assert_eq!(g.normal(), Vector3f::new(0.0, 0.0, 1.0));
        assert_eq!(g.centroid(), Point3f::new(0.5, 0.5, 0.0));
    }
}
