//! Core

#[macro_use]
extern crate hexf;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

// Re-export.
pub mod app;
pub mod detector;
pub mod error;
pub mod geometry;
pub mod parallel;
pub mod pbrt;
pub mod primitive;
pub mod record;
pub mod rng;
pub mod sampling;
pub mod stats;

pub use error::{Error, Result};
