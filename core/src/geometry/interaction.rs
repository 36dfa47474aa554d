//! Ray-surface intersections

use super::{Point3f, Vector3f};
use crate::pbrt::*;

/// Surface hit produced by a ray query. A miss is expressed as `None` by the
/// functions that produce these.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Intersection {
    /// Hit position.
    pub p: Point3f,

    /// Surface normal at the hit.
    pub n: Vector3f,

    /// Parametric distance along the ray. Equals the travel distance when
    /// the ray direction has unit length.
    pub distance: Float,

    /// Index of the object hit in the scene object table, or `NO_INDEX` when
    /// the hit comes directly from a shape.
    pub object: Int,
}

impl Intersection {
    /// Returns a new intersection not yet associated with an object.
    ///
    /// * `p`        - Hit position.
    /// * `n`        - Surface normal.
    /// * `distance` - Distance along the ray.
    pub fn new(p: Point3f, n: Vector3f, distance: Float) -> Self {
        Self {
            p,
            n,
            distance,
            object: crate::primitive::NO_INDEX,
        }
    }

    /// Returns a copy tagged with the object index.
    ///
    /// * `object` - Object index.
    pub fn with_object(self, object: Int) -> Self {
        Self { object, ..self }
    }
}
