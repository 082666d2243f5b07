use std::fmt;

use super::{ContextError, ContextOptions};

/// Graphics API tier, tried in `ApiTier::ORDER`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ApiTier {
    /// Native modern backends (Vulkan, Metal, DX12, browser WebGPU).
    Preferred,
    /// OpenGL / WebGL2 with downlevel limits.
    Compatibility,
}

impl ApiTier {
    pub const ORDER: [ApiTier; 2] = [ApiTier::Preferred, ApiTier::Compatibility];

    pub fn name(self) -> &'static str {
        match self {
            ApiTier::Preferred => "primary",
            ApiTier::Compatibility => "gl",
        }
    }

    pub(crate) fn backends(self) -> wgpu::Backends {
        match self {
            ApiTier::Preferred => wgpu::Backends::PRIMARY,
            ApiTier::Compatibility => wgpu::Backends::GL,
        }
    }
}

impl fmt::Display for ApiTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Host surface able to hand out a rendering context for a given tier.
///
/// `None` is the failure sentinel; the reason, if any, is the source's to log.
pub trait ContextSource {
    type Context;

    fn acquire(&mut self, tier: ApiTier, options: &ContextOptions) -> Option<Self::Context>;
}

/// A context together with the tier that produced it.
#[derive(Debug)]
pub struct Acquired<C> {
    pub context: C,
    pub tier: ApiTier,
}

/// Acquires a context, preferred tier first.
///
/// Each failed tier is reported with exactly one warning. Exhausting all tiers
/// is fatal; nothing is retried.
pub fn acquire_context<S>(
    source: &mut S,
    options: &ContextOptions,
) -> Result<Acquired<S::Context>, ContextError>
where
    S: ContextSource,
{
    let mut attempted = Vec::with_capacity(ApiTier::ORDER.len());

    for tier in ApiTier::ORDER {
        attempted.push(tier);
        match source.acquire(tier, options) {
            Some(context) => {
                log::debug!("acquired '{tier}' rendering context");
                return Ok(Acquired { context, tier });
            }
            None => log::warn!("failed to get '{tier}' rendering context"),
        }
    }

    Err(ContextError::Unavailable { attempted })
}
