//! Geometry

mod geometry;
mod triangle;

// Re-export
pub use geometry::*;
pub use triangle::*;
