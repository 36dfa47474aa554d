//! Camera

#[macro_use]
extern crate log;

mod pinhole_camera;

// Re-export
pub use pinhole_camera::*;
