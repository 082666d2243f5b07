//! Faerie engine crate.
//!
//! This crate owns the platform + GPU runtime pieces used by the demo layer:
//! context acquisition with backend fallback, the window loop, input
//! translation, frame timing and logging.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
