//! Diffuse Material

use crate::MaterialInfo;
use simcore::geometry::*;
use simcore::pbrt::*;
use simcore::sampling::*;

/// Implements purely diffuse (Lambertian) surfaces.
///
/// Directions are drawn with cosine-weighted hemisphere sampling and `pdf`
/// returns the matching density `cos θ / π`, so `eval · cos θ / pdf` equals
/// the albedo for every sample.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DiffuseMaterial {
    /// Surface colours.
    pub info: MaterialInfo,
}

impl DiffuseMaterial {
    /// Create a new `DiffuseMaterial`.
    ///
    /// * `info` - Surface colours.
    pub fn new(info: MaterialInfo) -> Self {
        Self { info }
    }

    /// Samples an outgoing direction around the normal.
    ///
    /// * `n` - Unit surface normal.
    /// * `u` - Uniform sample in [0, 1)^2.
    pub fn sample(&self, n: &Vector3f, u: &Point2f) -> Vector3f {
        to_world(&cosine_sample_hemisphere(u), n)
    }

    /// Returns `diffuse / π` when `wo` leaves on the normal's side, else 0.
    ///
    /// * `_wi` - Incoming direction (unused).
    /// * `wo`  - Outgoing direction.
    /// * `n`   - Unit surface normal.
    pub fn eval(&self, _wi: &Vector3f, wo: &Vector3f, n: &Vector3f) -> Vector3f {
        if n.dot(wo) > -EPSILON {
            self.info.diffuse * INV_PI
        } else {
            Vector3f::ZERO
        }
    }

    /// Returns the sampling density of `wo`.
    ///
    /// * `_wi` - Incoming direction (unused).
    /// * `wo`  - Outgoing direction.
    /// * `n`   - Unit surface normal.
    pub fn pdf(&self, _wi: &Vector3f, wo: &Vector3f, n: &Vector3f) -> Float {
        cosine_hemisphere_pdf(n.dot(wo))
    }

    /// Returns true if the emission exceeds machine epsilon.
    pub fn is_emissive(&self) -> bool {
        self.info.emission.length() > EPSILON
    }
}
