use super::ApiTier;

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); terminate gracefully.
    Fatal,
}

/// Context acquisition failure.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    /// Every tier was tried and none produced a context.
    #[error("no rendering context available (tried: {})", tier_list(.attempted))]
    Unavailable { attempted: Vec<ApiTier> },
}

fn tier_list(tiers: &[ApiTier]) -> String {
    tiers
        .iter()
        .map(|t| t.name())
        .collect::<Vec<_>>()
        .join(", ")
}
