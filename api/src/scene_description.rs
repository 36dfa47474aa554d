//! Scene description

use cameras::PinholeCamera;
use integrators::Scene;
use materials::{Material, MaterialInfo};
use shapes::{Geometry, Triangle};
use simcore::error::Result;
use simcore::geometry::*;
use simcore::primitive::ObjectEntry;

/// Flat geometry, material and object tables as loaded from disk, before the
/// BVH is built.
#[derive(Clone, Debug, Default)]
pub struct SceneDescription {
    /// Geometry table.
    pub geometries: Vec<Geometry>,

    /// Material table.
    pub materials: Vec<Material>,

    /// Object table.
    pub objects: Vec<ObjectEntry>,
}

impl SceneDescription {
    /// Adds a material and returns its index.
    ///
    /// * `info` - Material colours.
    pub fn add_material(&mut self, info: MaterialInfo) -> usize {
        self.materials.push(info.into());
        self.materials.len() - 1
    }

    /// Adds a triangle with a material and returns its object index.
    ///
    /// * `triangle` - The triangle.
    /// * `material` - Index into the material table.
    pub fn add_triangle(&mut self, triangle: Triangle, material: usize) -> usize {
        self.geometries.push(triangle.into());
        self.objects.push(ObjectEntry::new(self.geometries.len() - 1, material));
        self.objects.len() - 1
    }

    /// Returns the bounding box of all geometry added so far.
    pub fn bounds(&self) -> Bounds3f {
        self.geometries.iter().fold(Bounds3f::EMPTY, |b, g| b.union(&g.bounds()))
    }

    /// Appends the camera's detector quad with its emissive material. Returns
    /// false if the camera has no detector. A detector placed inside the
    /// model's bounds is still added but logged, since it shadows geometry.
    ///
    /// * `camera` - The camera.
    pub fn add_detector(&mut self, camera: &PinholeCamera) -> bool {
        let Some(triangles) = camera.detector() else {
            return false;
        };

        let quad = triangles.iter().fold(Bounds3f::EMPTY, |b, t| b.union(&t.bounds()));
        let overlap = self.bounds().intersect(&quad);
        if !overlap.is_empty() {
            warn!("Detector {} lies inside the model bounds {}", quad, self.bounds());
        }

        let material = self.add_material(PinholeCamera::detector_material());
        for triangle in triangles {
            self.add_triangle(triangle, material);
        }
        info!(
            "Detector of size {} added at distance {}",
            camera.settings().detector_size,
            camera.settings().detector_distance
        );
        true
    }

    /// Returns the number of objects.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Validates the tables and builds the scene.
    pub fn into_scene(self) -> Result<Scene> {
        Scene::new(self.geometries, self.materials, self.objects)
    }
}
