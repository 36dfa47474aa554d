//! API

#[macro_use]
extern crate log;

mod loader;
mod scene_description;

pub use loader::*;
pub use scene_description::*;
