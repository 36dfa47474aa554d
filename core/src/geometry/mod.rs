//! Geometry

#[cfg(test)]
macro_rules! prop_vector3 {
    ($name: ident, $xr: expr, $yr: expr, $zr: expr) => {
        prop_compose! {
            fn $name()(x in $xr, y in $yr, z in $zr) -> Vector3f {
                Vector3f { x, y, z }
            }
        }
    };
}

mod bounds3;
mod interaction;
mod point2;
mod ray;
mod shape;
mod vector3;

// Re-export
pub use bounds3::*;
pub use interaction::*;
pub use point2::*;
pub use ray::*;
pub use shape::*;
pub use vector3::*;

/// Returns the union of two values.
pub trait Union<T> {
    /// Return the union of self and other.
    ///
    /// * `other` - The other value.
    fn union(&self, other: &T) -> Self;
}
