use faerie_engine::device::{ContextError, capture_errors};

use crate::render::ShaderStage;

/// Construction failures. All of them are fatal to the demo instance.
///
/// Image load failure is deliberately not represented: the placeholder texture
/// simply stays in place.
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error("cannot initialize faerie bubbles: {0}")]
    ContextUnavailable(#[from] ContextError),

    #[error("failed to create {resource}: {reason}")]
    ResourceCreation {
        resource: &'static str,
        reason: String,
    },

    #[error("failed to compile {stage} shader:\n{diagnostic}")]
    Compile {
        stage: ShaderStage,
        diagnostic: String,
    },

    #[error("failed to link shader program: {diagnostic}")]
    Link { diagnostic: String },
}

impl DemoError {
    pub(crate) fn creation(resource: &'static str, err: &wgpu::Error) -> Self {
        DemoError::ResourceCreation {
            resource,
            reason: err.to_string(),
        }
    }
}

/// Runs a wgpu creation call and reports a rejected descriptor or an
/// exhausted device as `ResourceCreation` for `resource`.
pub(crate) fn create_resource<T>(
    device: &wgpu::Device,
    resource: &'static str,
    create: impl FnOnce() -> T,
) -> Result<T, DemoError> {
    capture_errors(device, create).map_err(|e| DemoError::creation(resource, &e))
}
