//! 3-D Axis Aligned Bounding Boxes.

use super::{Point3f, Ray, Union, Vector3f};
use crate::pbrt::*;
use std::fmt;
use std::ops::Index;

/// 3-D Axis Aligned Bounding Box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds3f {
    /// Minimum bounds.
    pub p_min: Point3f,

    /// Maximum bounds.
    pub p_max: Point3f,
}

impl Default for Bounds3f {
    /// Returns an empty bounding box.
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Bounds3f {
    /// An empty bounding box where minimum and maximum bounds are +∞ and -∞. It
    /// grows correctly under `union()` and fails every ray test.
    pub const EMPTY: Self = Self {
        p_min: Point3f::splat(INFINITY),
        p_max: Point3f::splat(-INFINITY),
    };

    /// Creates a new 3-D bounding box from 2 points. The minimum and maximum
    /// bounds are used for each coordinate axis.
    ///
    /// * `p1` - First point.
    /// * `p2` - Second point.
    pub fn new(p1: Point3f, p2: Point3f) -> Self {
        Self {
            p_min: p1.min(&p2),
            p_max: p1.max(&p2),
        }
    }

    /// Returns true if the bounds describes an empty box where any component
    /// of `p_max` is less than the matching component of `p_min`.
    pub fn is_empty(&self) -> bool {
        self.p_max.x < self.p_min.x || self.p_max.y < self.p_min.y || self.p_max.z < self.p_min.z
    }

    /// Returns the vector along the box diagonal from the minimum point to
    /// the maximum point.
    pub fn diagonal(&self) -> Vector3f {
        self.p_max - self.p_min
    }

    /// Returns the centre of the box.
    pub fn centroid(&self) -> Point3f {
        0.5 * self.p_min + 0.5 * self.p_max
    }

    /// Returns the surface area of the bounding box.
    pub fn surface_area(&self) -> Float {
        if self.is_empty() {
            0.0
        } else {
            let d = self.diagonal();
            2.0 * (d.x * d.y + d.x * d.z + d.y * d.z)
        }
    }

    /// Returns which of the axes is longest. Ties are broken towards the later
    /// axis because the comparisons are strict: y wins a tie with x and z wins
    /// a tie with y.
    pub fn maximum_extent(&self) -> Axis {
        let d = self.diagonal();
        if d.x > d.y && d.x > d.z {
            Axis::X
        } else if d.y > d.z {
            Axis::Y
        } else {
            Axis::Z
        }
    }

    /// Returns a bounding box containing the intersection of both bounding
    /// boxes. The result is empty if they do not overlap.
    ///
    /// * `other` - The other bounding box.
    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            p_min: self.p_min.max(&other.p_min),
            p_max: self.p_max.min(&other.p_max),
        }
    }

    /// Returns true if a point is inside the bounding box.
    ///
    /// * `p` - The point.
    pub fn contains(&self, p: &Point3f) -> bool {
        (p.x >= self.p_min.x && p.x <= self.p_max.x)
            && (p.y >= self.p_min.y && p.y <= self.p_max.y)
            && (p.z >= self.p_min.z && p.z <= self.p_max.z)
    }

    /// Returns true if another bounding box lies entirely inside this one. An
    /// empty box is contained by every box.
    ///
    /// * `other` - The other bounding box.
    pub fn contains_bounds(&self, other: &Self) -> bool {
        other.is_empty() || (self.contains(&other.p_min) && self.contains(&other.p_max))
    }

    /// Slab test of a ray against the box using the precomputed reciprocal of
    /// the ray direction and the per-axis sign of the direction.
    ///
    /// A zero direction component has no slab interval; the ray then hits only
    /// if its origin lies between the two planes of that axis.
    ///
    /// * `ray`        - The ray.
    /// * `inv_dir`    - Reciprocal of the ray direction.
    /// * `dir_is_neg` - 1 for each axis where the direction is negative, else 0.
    pub fn intersect_p_inv(&self, ray: &Ray, inv_dir: &Vector3f, dir_is_neg: [usize; 3]) -> bool {
        let mut t_enter = -INFINITY;
        let mut t_exit = INFINITY;

        for axis in 0..3 {
            if ray.d[axis] == 0.0 {
                if ray.o[axis] < self.p_min[axis] || ray.o[axis] > self.p_max[axis] {
                    return false;
                }
                continue;
            }

            let t_near = (self[dir_is_neg[axis]][axis] - ray.o[axis]) * inv_dir[axis];
            let t_far = (self[1 - dir_is_neg[axis]][axis] - ray.o[axis]) * inv_dir[axis];

            // Widen the far plane to be conservative about rounding error.
            let t_far = t_far * SLAB_ROUNDING_SCALE;

            t_enter = max(t_near, t_enter);
            t_exit = min(t_far, t_exit);
            if t_enter > t_exit {
                return false;
            }
        }

        t_exit >= 0.0
    }
}

/// 1 + 2·γ(3) where γ(n) bounds the relative error of n floating point
/// operations.
const SLAB_ROUNDING_SCALE: Float = 1.0 + 2.0 * (3.0 * EPSILON * 0.5) / (1.0 - 3.0 * EPSILON * 0.5);

impl Index<usize> for Bounds3f {
    type Output = Point3f;

    /// Index the minimum and maximum bounds.
    ///
    /// * `i` - 0 for minimum and 1 for maximum.
    fn index(&self, i: usize) -> &Self::Output {
        match i {
            0 => &self.p_min,
            1 => &self.p_max,
            _ => panic!("Invalid index for std::Index on Bounds3f"),
        }
    }
}

impl From<Point3f> for Bounds3f {
    /// Use a 3-D point as minimum and maximum 3-D bounds.
    ///
    /// * `p` - 3-D point.
    fn from(p: Point3f) -> Self {
        Self { p_min: p, p_max: p }
    }
}

impl Union<Point3f> for Bounds3f {
    /// Return a bounding box containing the itself and a point.
    ///
    /// * `other` - The point.
    fn union(&self, other: &Point3f) -> Self {
        Self {
            p_min: self.p_min.min(other),
            p_max: self.p_max.max(other),
        }
    }
}

impl Union<Bounds3f> for Bounds3f {
    /// Return a bounding box containing both bounding boxes.
    ///
    /// * `other` - The other bounding box.
    fn union(&self, other: &Bounds3f) -> Self {
        Self {
            p_min: self.p_min.min(&other.p_min),
            p_max: self.p_max.max(&other.p_max),
        }
    }
}

impl fmt::Display for Bounds3f {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ {} - {} ]", self.p_min, self.p_max)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn unit_box() -> Bounds3f {
        Bounds3f::new(Point3f::new(0.0, 0.0, 0.0), Point3f::new(1.0, 1.0, 1.0))
    }

    fn slab_test(b: &Bounds3f, ray: &Ray) -> bool {
        let inv_dir = Vector3f::new(1.0 / ray.d.x, 1.0 / ray.d.y, 1.0 / ray.d.z);
        b.intersect_p_inv(ray, &inv_dir, ray.dir_is_neg())
    }

    #[test]
    fn empty_box_grows_by_union() {
        let b = Bounds3f::EMPTY.union(&Point3f::new(1.0, 2.0, 3.0));
        assert_eq!(b.p_min, b.p_max);
        assert!(!b.is_empty());
        assert!(Bounds3f::EMPTY.is_empty());
    }

    #[test]
    fn empty_box_is_never_hit() {
        let ray = Ray::new(Point3f::new(0.0, 0.0, -5.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(!slab_test(&Bounds3f::EMPTY, &ray));
    }

    #[test]
    fn maximum_extent_tie_breaks() {
        let cube = unit_box();
        assert_eq!(cube.maximum_extent(), Axis::Z);

        let xy = Bounds3f::new(Point3f::ZERO, Point3f::new(2.0, 2.0, 1.0));
        assert_eq!(xy.maximum_extent(), Axis::Y);

        let x = Bounds3f::new(Point3f::ZERO, Point3f::new(3.0, 2.0, 1.0));
        assert_eq!(x.maximum_extent(), Axis::X);
    }

    #[test]
    fn intersection_of_disjoint_boxes_is_empty() {
        let a = unit_box();
        let b = Bounds3f::new(Point3f::splat(2.0), Point3f::splat(3.0));
        assert!(a.intersect(&b).is_empty());
        assert_eq!(a.intersect(&b).surface_area(), 0.0);

        let c = Bounds3f::new(Point3f::splat(0.5), Point3f::splat(2.0));
        let overlap = a.intersect(&c);
        assert_eq!(overlap, Bounds3f::new(Point3f::splat(0.5), Point3f::splat(1.0)));
        assert_eq!(overlap.surface_area(), 1.5);
    }

    #[test]
    fn slab_hits_box_in_front() {
        let ray = Ray::new(Point3f::new(0.5, 0.5, -5.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(slab_test(&unit_box(), &ray));
    }

    #[test]
    fn slab_misses_box_behind() {
        let ray = Ray::new(Point3f::new(0.5, 0.5, 5.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(!slab_test(&unit_box(), &ray));
    }

    #[test]
    fn slab_parallel_ray_outside_slab_misses() {
        let ray = Ray::new(Point3f::new(2.0, 0.5, -5.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(!slab_test(&unit_box(), &ray));
    }

    #[test]
    fn slab_hits_flat_box() {
        let flat = Bounds3f::new(Point3f::new(0.0, 0.0, 0.0), Point3f::new(1.0, 0.0, 1.0));
        let ray = Ray::new(Point3f::new(0.5, 10.0, 0.5), Vector3f::new(0.0, -1.0, 0.0));
        assert!(slab_test(&flat, &ray));
    }

    #[test]
    fn slab_origin_inside_box_hits() {
        let ray = Ray::new(Point3f::splat(0.5), Vector3f::new(1.0, -1.0, 0.5).normalize());
        assert!(slab_test(&unit_box(), &ray));
    }

    prop_vector3!(point_f32, -10.0..10.0f32, -10.0..10.0f32, -10.0..10.0f32);

    proptest! {
        #[test]
        fn union_contains_both(p1 in point_f32(), p2 in point_f32(), p3 in point_f32(), p4 in point_f32()) {
            let a = Bounds3f::new(p1, p2);
            let b = Bounds3f::new(p3, p4);
            let u = a.union(&b);
            prop_assert!(u.contains_bounds(&a));
            prop_assert!(u.contains_bounds(&b));
            prop_assert!(u.contains(&a.centroid()));
        }

        #[test]
        fn ray_towards_centroid_hits(p1 in point_f32(), p2 in point_f32(), o in point_f32()) {
            let b = Bounds3f::new(p1, p2);
            let d = b.centroid() - o;
            prop_assume!(d.length() > 1e-3);
            let ray = Ray::new(o, d.normalize());
            prop_assert!(slab_test(&b, &ray));
        }
    }
}
