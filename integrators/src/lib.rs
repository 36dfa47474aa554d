//! Integrators

#[macro_use]
extern crate log;

mod progress;
mod random_walk;
mod render;
mod scene;

// Re-export
pub use progress::*;
pub use random_walk::*;
pub use render::*;
pub use scene::*;
