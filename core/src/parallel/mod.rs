//! Parallel

mod collector;
mod compaction;

// Re-export
pub use collector::*;
pub use compaction::*;
