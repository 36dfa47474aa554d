//! Errors

use thiserror::Error;

/// Errors raised while loading a scene, building its acceleration structure or
/// running a simulation.
#[derive(Error, Debug)]
pub enum Error {
    /// Scene has no geometry to build over.
    #[error("scene contains no primitives")]
    EmptyScene,

    /// BVH node array is too small for the tree being built.
    #[error("BVH needs {requested} nodes but capacity is {capacity}")]
    CapacityExceeded { capacity: usize, requested: usize },

    /// An object refers to a material that does not exist.
    #[error("object {object} refers to missing material {material}")]
    MissingMaterial { object: usize, material: i32 },

    /// Scene tables are inconsistent.
    #[error("invalid scene: {0}")]
    InvalidScene(String),

    /// A result was dropped because the collector was full.
    #[error("result collector full (capacity {capacity})")]
    CollectorFull { capacity: usize },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Model file could not be parsed.
    #[error("failed to load scene: {0}")]
    SceneLoad(String),

    /// Image could not be written.
    #[error("image error: {0}")]
    Image(String),

    /// I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type using the crate error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_values() {
        let e = Error::CapacityExceeded {
            capacity: 5,
            requested: 6,
        };
        assert_eq!(e.to_string(), "BVH needs 6 nodes but capacity is 5");
    }

    #[test]
    fn io_errors_convert() {
        fn fails() -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))?;
            Ok(())
        }
        assert!(matches!(fails(), Err(Error::Io(_))));
    }
}
