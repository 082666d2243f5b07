//! GPU device + surface management.
//!
//! This module is responsible for:
//! - describing the requested context (`ContextOptions`)
//! - acquiring a context tier by tier, falling back from the primary backends to GL
//! - creating & configuring the Surface (swapchain) and its MSAA/depth targets
//! - acquiring frames and providing encoders/views for rendering
//! - turning wgpu creation errors into `Result`s (`capture_errors`)

mod error;
mod frame;
mod gpu;
mod options;
mod scope;
mod surface;
mod tier;

pub use error::{ContextError, SurfaceErrorAction};
pub use frame::GpuFrame;
pub use gpu::{Gpu, GpuInit, WindowContextSource};
pub use options::{ContextOptions, PartialContextOptions, PowerPreference};
pub use scope::capture_errors;
pub use tier::{acquire_context, Acquired, ApiTier, ContextSource};
