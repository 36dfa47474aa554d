//! Shapes

use super::{Bounds3f, Intersection, Point2f, Point3f, Ray, Vector3f};
use crate::pbrt::*;

/// A point sampled on the surface of a shape.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SurfaceSample {
    /// Sampled position.
    pub p: Point3f,

    /// Surface normal at `p`.
    pub n: Vector3f,

    /// Probability density with respect to surface area.
    pub pdf: Float,
}

/// Geometric queries every scene shape answers.
pub trait Shape {
    /// Returns the world space bounding box.
    fn bounds(&self) -> Bounds3f;

    /// Returns the surface area.
    fn area(&self) -> Float;

    /// Returns the unit surface normal. Shapes that are not flat return the
    /// normal at their centroid.
    fn normal(&self) -> Vector3f;

    /// Returns the nearest intersection of the ray with the shape, or `None`.
    /// The returned `object` index is `NO_INDEX`; callers that know which
    /// object they queried tag it.
    ///
    /// * `ray` - The ray.
    fn intersect(&self, ray: &Ray) -> Option<Intersection>;

    /// Samples a point uniformly on the surface.
    ///
    /// * `u` - Uniform sample in [0, 1)^2.
    fn sample(&self, u: &Point2f) -> SurfaceSample;
}
