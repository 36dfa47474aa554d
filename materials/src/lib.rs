//! Materials

mod diffuse;
mod material;

// Re-export
pub use diffuse::*;
pub use material::*;
