//! Wavefront OBJ/MTL scene loader

use crate::SceneDescription;
use materials::MaterialInfo;
use shapes::Triangle;
use simcore::error::{Error, Result};
use simcore::geometry::*;
use std::path::Path;

/// Converts an MTL material. The ambient colour `Ka` is the emission.
fn material_info(m: &tobj::Material) -> MaterialInfo {
    MaterialInfo::new(
        Vector3f::from(m.ambient.unwrap_or([0.0; 3])),
        Vector3f::from(m.specular.unwrap_or([0.0; 3])),
        Vector3f::from(m.diffuse.unwrap_or([0.0; 3])),
    )
}

/// Loads a triangulated OBJ file and the MTL libraries it references.
///
/// Every face becomes one object bound to its mesh's material. A mesh without
/// a material, or referencing one the libraries do not define, is an error.
///
/// * `path` - Path to the OBJ file.
pub fn load_obj(path: &Path) -> Result<SceneDescription> {
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|e| Error::SceneLoad(format!("{}: {e}", path.display())))?;

    let materials = materials.unwrap_or_else(|e| {
        warn!("{}: no material library loaded: {e}", path.display());
        vec![]
    });

    let mut desc = SceneDescription::default();
    for m in materials.iter() {
        let index = desc.add_material(material_info(m));
        debug!("Material '{}' -> {}", m.name, index);
    }

    for model in models.iter() {
        let mesh = &model.mesh;
        let material = mesh
            .material_id
            .filter(|&id| id < materials.len())
            .ok_or_else(|| {
                Error::SceneLoad(format!(
                    "{}: mesh '{}' has no valid material",
                    path.display(),
                    model.name
                ))
            })?;

        let vertex = |i: u32| -> Result<Point3f> {
            let i = i as usize;
            mesh.positions
                .get(3 * i..3 * i + 3)
                .map(|p| Point3f::new(p[0], p[1], p[2]))
                .ok_or_else(|| {
                    Error::SceneLoad(format!(
                        "{}: mesh '{}' indexes missing vertex {}",
                        path.display(),
                        model.name,
                        i
                    ))
                })
        };

        for face in mesh.indices.chunks_exact(3) {
            let triangle = Triangle::new(vertex(face[0])?, vertex(face[1])?, vertex(face[2])?);
            desc.add_triangle(triangle, material);
        }

        info!(
            "Loaded mesh '{}' with {} triangles",
            model.name,
            mesh.indices.len() / 3
        );
    }

    if desc.objects.is_empty() {
        return Err(Error::SceneLoad(format!("{}: no triangles", path.display())));
    }

    info!(
        "Loaded {} with {} triangles and {} materials",
        path.display(),
        desc.object_count(),
        desc.materials.len()
    );
    Ok(desc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use simcore::pbrt::*;
    use std::fs;

    const MTL: &str = "\
newmtl light
Ka 1.0 0.5 0.25
Kd 0.0 0.0 0.0
Ks 0.0 0.0 0.0

newmtl wall
Ka 0.0 0.0 0.0
Kd 0.7 0.7 0.7
Ks 0.1 0.1 0.1
";

    const OBJ: &str = "\
mtllib scene.mtl
o lamp
v -1 0 -1
v -1 0 1
v 1 0 -1
v 1 0 1
usemtl light
f 1 2 3
f 4 3 2
o floor
v -5 -10 -5
v -5 -10 5
v 5 -10 5
v 5 -10 -5
usemtl wall
f 5 6 7 8
";

    fn write_scene(obj: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("scene.mtl"), MTL).unwrap();
        let path = dir.path().join("scene.obj");
        fs::write(&path, obj).unwrap();
        (dir, path)
    }

    #[test]
    fn loads_triangles_and_materials() {
        let (_dir, path) = write_scene(OBJ);
        let desc = load_obj(&path).unwrap();

        // The quad is triangulated.
        assert_eq!(desc.object_count(), 4);
        assert_eq!(desc.materials.len(), 2);

        let emissive: Vec<_> = desc.objects.iter().map(|o| desc.materials[o.material as usize].is_emissive()).collect();
        assert_eq!(emissive, vec![true, true, false, false]);

        let light = desc.materials.iter().find(|m| m.is_emissive()).unwrap();
        assert!(approx_eq!(Float, light.emission().y, 0.5));

        let scene = desc.into_scene().unwrap();
        assert_eq!(scene.object_count(), 4);
        assert!(approx_eq!(Float, scene.emitter_area(), 4.0, epsilon = 1e-5));
    }

    #[test]
    fn mesh_without_material_is_rejected() {
        let (_dir, path) = write_scene("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
        assert!(matches!(load_obj(&path), Err(Error::SceneLoad(_))));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(load_obj(&dir.path().join("nope.obj")), Err(Error::SceneLoad(_))));
    }
}
