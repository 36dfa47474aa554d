//! Scene

use accelerators::BVHAccel;
use materials::Material;
use shapes::Geometry;
use simcore::error::{Error, Result};
use simcore::geometry::*;
use simcore::pbrt::*;
use simcore::primitive::*;

/// A point sampled on an emitter.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EmitterSample {
    /// Index of the emitting object.
    pub object: usize,

    /// Sampled point. `pdf` is with respect to the total emitter area.
    pub sample: SurfaceSample,
}

/// Flat geometry and material tables, the object table joining them and the
/// BVH built over it. Read-only once constructed.
#[derive(Clone, Debug)]
pub struct Scene {
    /// Geometry table.
    geometries: Vec<Geometry>,

    /// Material table.
    materials: Vec<Material>,

    /// Object table in BVH build order.
    objects: Vec<ObjectEntry>,

    /// Acceleration structure over `objects`.
    bvh: BVHAccel,

    /// Emitting objects with the running sum of their areas.
    emitters: Vec<(usize, Float)>,

    /// Total area of all emitters.
    emitter_area: Float,
}

impl Scene {
    /// Validates the tables and builds the BVH.
    ///
    /// * `geometries` - Geometry table.
    /// * `materials`  - Material table.
    /// * `objects`    - Object table referencing both.
    pub fn new(geometries: Vec<Geometry>, materials: Vec<Material>, mut objects: Vec<ObjectEntry>) -> Result<Self> {
        if objects.is_empty() {
            return Err(Error::EmptyScene);
        }

        for (i, object) in objects.iter().enumerate() {
            if object.material_index().filter(|&m| m < materials.len()).is_none() {
                return Err(Error::MissingMaterial {
                    object: i,
                    material: object.material,
                });
            }
        }

        let bvh = BVHAccel::build(&mut objects, &geometries)?;

        let mut emitters = vec![];
        let mut emitter_area = 0.0;
        for (i, object) in objects.iter().enumerate() {
            let material = object.material_index().and_then(|m| materials.get(m));
            let geometry = object.geometry_index().and_then(|g| geometries.get(g));
            if let (Some(material), Some(geometry)) = (material, geometry) {
                if material.is_emissive() {
                    emitter_area += geometry.area();
                    emitters.push((i, emitter_area));
                }
            }
        }

        if emitters.is_empty() {
            warn!("Scene has no emissive surfaces; no path can succeed");
        }
        info!(
            "Scene with {} objects, {} geometries, {} materials, {} emitters (area {})",
            objects.len(),
            geometries.len(),
            materials.len(),
            emitters.len(),
            emitter_area
        );
        debug!(
            "World bound {} (surface area {})",
            bvh.world_bound(),
            bvh.world_bound().surface_area()
        );

        Ok(Self {
            geometries,
            materials,
            objects,
            bvh,
            emitters,
            emitter_area,
        })
    }

    /// Returns the closest intersection along the ray, if any.
    ///
    /// * `ray` - The ray.
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        self.bvh.intersect(ray, &self.objects, &self.geometries)
    }

    /// Returns the material of an object.
    ///
    /// * `object` - Index into the object table.
    pub fn material(&self, object: usize) -> Option<&Material> {
        self.objects
            .get(object)
            .and_then(ObjectEntry::material_index)
            .and_then(|m| self.materials.get(m))
    }

    /// Returns the geometry of an object.
    ///
    /// * `object` - Index into the object table.
    pub fn geometry(&self, object: usize) -> Option<&Geometry> {
        self.objects
            .get(object)
            .and_then(ObjectEntry::geometry_index)
            .and_then(|g| self.geometries.get(g))
    }

    /// Picks an emitter with probability proportional to its area and samples
    /// a point uniformly on it. Returns `None` if nothing emits.
    ///
    /// * `u_pick` - Uniform sample in [0, 1) selecting the emitter.
    /// * `u`      - Uniform sample in [0, 1)^2 on the emitter.
    pub fn sample_light(&self, u_pick: Float, u: &Point2f) -> Option<EmitterSample> {
        if self.emitter_area <= 0.0 {
            return None;
        }

        let target = u_pick * self.emitter_area;
        let i = self
            .emitters
            .partition_point(|&(_, cdf)| cdf <= target)
            .min(self.emitters.len() - 1);
        let object = self.emitters[i].0;

        let mut sample = self.geometry(object)?.sample(u);
        sample.pdf = 1.0 / self.emitter_area;
        Some(EmitterSample { object, sample })
    }

    /// Returns the total area of all emitters.
    pub fn emitter_area(&self) -> Float {
        self.emitter_area
    }

    /// Returns the number of objects.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Returns the bounding box of the scene.
    pub fn world_bound(&self) -> Bounds3f {
        self.bvh.world_bound()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use materials::MaterialInfo;
    use shapes::Triangle;

    fn square(y: Float, size: Float) -> [Geometry; 2] {
        let h = 0.5 * size;
        [
            Triangle::new(
                Point3f::new(-h, y, -h),
                Point3f::new(-h, y, h),
                Point3f::new(h, y, -h),
            )
            .into(),
            Triangle::new(Point3f::new(h, y, h), Point3f::new(h, y, -h), Point3f::new(-h, y, h)).into(),
        ]
    }

    fn grey() -> Material {
        MaterialInfo::new(Vector3f::ZERO, Vector3f::ZERO, Vector3f::splat(0.5)).into()
    }

    fn light() -> Material {
        MaterialInfo::new(Vector3f::splat(1.0), Vector3f::ZERO, Vector3f::splat(0.5)).into()
    }

    fn two_squares() -> Scene {
        let mut geometries = square(0.0, 1.0).to_vec();
        geometries.extend(square(-1.0, 2.0));
        let objects = vec![
            ObjectEntry::new(0, 1),
            ObjectEntry::new(1, 1),
            ObjectEntry::new(2, 0),
            ObjectEntry::new(3, 0),
        ];
        Scene::new(geometries, vec![grey(), light()], objects).unwrap()
    }

    #[test]
    fn empty_scene_is_rejected() {
        let r = Scene::new(vec![], vec![grey()], vec![]);
        assert!(matches!(r, Err(Error::EmptyScene)));
    }

    #[test]
    fn missing_material_is_rejected() {
        let geometries = square(0.0, 1.0).to_vec();
        let objects = vec![ObjectEntry::new(0, 0), ObjectEntry::new(1, 3)];
        let r = Scene::new(geometries, vec![grey()], objects);
        assert!(matches!(
            r,
            Err(Error::MissingMaterial {
                object: 1,
                material: 3
            })
        ));
    }

    #[test]
    fn intersection_reports_material_of_object_hit() {
        let scene = two_squares();
        assert_eq!(scene.object_count(), 4);

        let ray = Ray::new(Point3f::new(0.1, 5.0, 0.2), Vector3f::new(0.0, -1.0, 0.0));
        let hit = scene.intersect(&ray).unwrap();
        assert!(approx_eq!(Float, hit.distance, 5.0, epsilon = 1e-5));
        let material = scene.material(hit.object as usize).unwrap();
        assert!(material.is_emissive());

        // Outside the small square only the large one is hit.
        let ray = Ray::new(Point3f::new(0.8, 5.0, 0.8), Vector3f::new(0.0, -1.0, 0.0));
        let hit = scene.intersect(&ray).unwrap();
        assert!(approx_eq!(Float, hit.distance, 6.0, epsilon = 1e-5));
        assert!(!scene.material(hit.object as usize).unwrap().is_emissive());
    }

    #[test]
    fn light_samples_lie_on_emitters() {
        let scene = two_squares();
        assert!(approx_eq!(Float, scene.emitter_area(), 1.0, epsilon = 1e-5));

        for (i, u_pick) in [0.0, 0.25, 0.49, 0.51, 0.99].into_iter().enumerate() {
            let u = Point2f::new(0.1 * i as Float, 0.3);
            let s = scene.sample_light(u_pick, &u).unwrap();
            assert!(scene.material(s.object).unwrap().is_emissive());
            assert!(approx_eq!(Float, s.sample.p.y, 0.0, epsilon = 1e-6));
            assert!(approx_eq!(Float, s.sample.pdf, 1.0, epsilon = 1e-5));
        }
    }

    #[test]
    fn no_emitters_no_light_samples() {
        let objects = vec![ObjectEntry::new(0, 0), ObjectEntry::new(1, 0)];
        let scene = Scene::new(square(0.0, 1.0).to_vec(), vec![grey()], objects).unwrap();
        assert!(scene.sample_light(0.5, &Point2f::new(0.5, 0.5)).is_none());
    }

    #[test]
    fn world_bound_encloses_all_objects() {
        let b = two_squares().world_bound();
        assert_eq!(b, Bounds3f::new(Point3f::new(-1.0, -1.0, -1.0), Point3f::new(1.0, 0.0, 1.0)));
        assert!(approx_eq!(Float, b.surface_area(), 16.0, epsilon = 1e-5));
    }
}
