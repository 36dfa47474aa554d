//! Scene object table entries

use crate::pbrt::*;

/// Sentinel index for "no object", "no child" and "no material".
pub const NO_INDEX: Int = -1;

/// Binds one piece of geometry to one material by index into the scene's flat
/// geometry and material tables. Many entries may share a material.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectEntry {
    /// Index into the geometry table.
    pub geometry: Int,

    /// Index into the material table.
    pub material: Int,
}

impl ObjectEntry {
    /// Returns a new object entry.
    ///
    /// * `geometry` - Geometry index.
    /// * `material` - Material index.
    pub fn new(geometry: usize, material: usize) -> Self {
        Self {
            geometry: geometry as Int,
            material: material as Int,
        }
    }

    /// Returns the geometry index, or `None` for the sentinel.
    pub fn geometry_index(&self) -> Option<usize> {
        usize::try_from(self.geometry).ok()
    }

    /// Returns the material index, or `None` for the sentinel.
    pub fn material_index(&self) -> Option<usize> {
        usize::try_from(self.material).ok()
    }
}

impl Default for ObjectEntry {
    fn default() -> Self {
        Self {
            geometry: NO_INDEX,
            material: NO_INDEX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_has_no_indices() {
        let e = ObjectEntry::default();
        assert_eq!(e.geometry_index(), None);
        assert_eq!(e.material_index(), None);
    }

    #[test]
    fn indices_round_trip() {
        let e = ObjectEntry::new(3, 7);
        assert_eq!(e.geometry_index(), Some(3));
        assert_eq!(e.material_index(), Some(7));
    }
}
