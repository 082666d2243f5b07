//! Faerie Bubbles: a single quad rotated by the arrow keys.
//!
//! The per-frame state machine (`animation`, `latch`) is plain data and runs
//! without a GPU; `render` owns every wgpu resource; `demo` ties both to the
//! engine runtime.

pub mod animation;
pub mod demo;
pub mod error;
pub mod latch;
pub mod loader;
pub mod render;

pub use demo::{FaerieBubbles, LoopState};
pub use error::DemoError;
