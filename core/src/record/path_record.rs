//! Path records

use crate::geometry::*;
use crate::pbrt::*;

/// One simulated path that reached an emitter.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PathRecord {
    /// Number of surface interactions including the emitter.
    pub bounces: Int,

    /// Total length travelled from the sensor to the emitter.
    pub distance: Float,

    /// Position on the emitter.
    pub position: Point3f,

    /// Direction of the ray arriving at the emitter.
    pub direction: Vector3f,

    /// Monte-Carlo weight. 1 unless Russian roulette rescaled the path.
    pub weight: Float,

    /// Pixel the path was launched from.
    pub pixel: Point2i,

    /// Sample index within the launch pixel.
    pub sample: u32,

    /// Detector pixel hit by the reversed arrival direction, if any.
    pub detector: Option<Point2i>,
}

impl PathRecord {
    /// Returns the key that orders records deterministically.
    pub fn sort_key(&self) -> (Int, Int, u32) {
        (self.pixel.y, self.pixel.x, self.sample)
    }
}

impl Default for PathRecord {
    fn default() -> Self {
        Self {
            bounces: 0,
            distance: 0.0,
            position: Point3f::ZERO,
            direction: Vector3f::ZERO,
            weight: 1.0,
            pixel: Point2i::default(),
            sample: 0,
            detector: None,
        }
    }
}

/// Stable sort of records by launch pixel row, column and sample index.
///
/// * `records` - The records.
pub fn sort_records(records: &mut [PathRecord]) {
    records.sort_by_key(PathRecord::sort_key);
}
