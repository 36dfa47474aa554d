//! Material description and the closed set of material kinds

use crate::DiffuseMaterial;
use simcore::geometry::*;
use simcore::pbrt::*;

/// Colours describing a surface as read from a material library. All
/// components are non-negative.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct MaterialInfo {
    /// Emitted radiance.
    pub emission: Vector3f,

    /// Specular reflectance. Carried for completeness; diffuse transport
    /// ignores it.
    pub specular: Vector3f,

    /// Diffuse reflectance (albedo).
    pub diffuse: Vector3f,
}

impl MaterialInfo {
    /// Create a new `MaterialInfo`.
    ///
    /// * `emission` - Emitted radiance.
    /// * `specular` - Specular reflectance.
    /// * `diffuse`  - Diffuse reflectance.
    pub fn new(emission: Vector3f, specular: Vector3f, diffuse: Vector3f) -> Self {
        Self {
            emission,
            specular,
            diffuse,
        }
    }
}

/// Every kind of material a scene can hold.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Material {
    /// Lambertian reflector, optionally emissive.
    Diffuse(DiffuseMaterial),
}

impl Material {
    /// Samples an outgoing direction in the hemisphere around the normal.
    ///
    /// * `n` - Unit surface normal.
    /// * `u` - Uniform sample in [0, 1)^2.
    pub fn sample(&self, n: &Vector3f, u: &Point2f) -> Vector3f {
        match self {
            Self::Diffuse(m) => m.sample(n, u),
        }
    }

    /// Evaluates the BRDF.
    ///
    /// * `wi` - Incoming direction.
    /// * `wo` - Outgoing direction.
    /// * `n`  - Unit surface normal.
    pub fn eval(&self, wi: &Vector3f, wo: &Vector3f, n: &Vector3f) -> Vector3f {
        match self {
            Self::Diffuse(m) => m.eval(wi, wo, n),
        }
    }

    /// Returns the density `sample` generates `wo` with.
    ///
    /// * `wi` - Incoming direction.
    /// * `wo` - Outgoing direction.
    /// * `n`  - Unit surface normal.
    pub fn pdf(&self, wi: &Vector3f, wo: &Vector3f, n: &Vector3f) -> Float {
        match self {
            Self::Diffuse(m) => m.pdf(wi, wo, n),
        }
    }

    /// Returns true if the material emits light.
    pub fn is_emissive(&self) -> bool {
        match self {
            Self::Diffuse(m) => m.is_emissive(),
        }
    }

    /// Returns the emitted radiance.
    pub fn emission(&self) -> Vector3f {
        match self {
            Self::Diffuse(m) => m.info.emission,
        }
    }
}

impl From<MaterialInfo> for Material {
    /// Material libraries only describe diffuse surfaces.
    fn from(info: MaterialInfo) -> Self {
        Self::Diffuse(DiffuseMaterial::new(info))
    }
}
