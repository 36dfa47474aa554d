//! Rays

use super::{Point3f, Vector3f};
use crate::pbrt::*;
use std::fmt;

/// A semi-infinite line specified by its origin and direction.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Ray {
    /// Origin.
    pub o: Point3f,

    /// Direction. Usually unit length but this is not required.
    pub d: Vector3f,
}

impl Ray {
    /// Returns a new ray.
    ///
    /// * `o` - Origin.
    /// * `d` - Direction.
    pub fn new(o: Point3f, d: Vector3f) -> Self {
        Self { o, d }
    }

    /// Returns the position along the ray at parametric distance `t`.
    ///
    /// * `t` - Parameter.
    pub fn at(&self, t: Float) -> Point3f {
        self.o + self.d * t
    }

    /// Returns the reciprocal of the direction. Zero components map to ±∞.
    pub fn inv_dir(&self) -> Vector3f {
        Vector3f::new(1.0 / self.d.x, 1.0 / self.d.y, 1.0 / self.d.z)
    }

    /// Returns 1 for each axis where the direction is negative, else 0.
    pub fn dir_is_neg(&self) -> [usize; 3] {
        [
            (self.d.x < 0.0) as usize,
            (self.d.y < 0.0) as usize,
            (self.d.z < 0.0) as usize,
        ]
    }
}

impl fmt::Display for Ray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[o={}, d={}]", self.o, self.d)
    }
}
