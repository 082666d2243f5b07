use std::fmt;
use std::str::FromStr;

/// Adapter power preference requested from the host.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum PowerPreference {
    #[default]
    Default,
    HighPerformance,
    LowPower,
}

impl PowerPreference {
    pub fn as_str(self) -> &'static str {
        match self {
            PowerPreference::Default => "default",
            PowerPreference::HighPerformance => "high-performance",
            PowerPreference::LowPower => "low-power",
        }
    }

    pub(crate) fn to_wgpu(self) -> wgpu::PowerPreference {
        match self {
            PowerPreference::Default => wgpu::PowerPreference::None,
            PowerPreference::HighPerformance => wgpu::PowerPreference::HighPerformance,
            PowerPreference::LowPower => wgpu::PowerPreference::LowPower,
        }
    }
}

impl fmt::Display for PowerPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PowerPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(PowerPreference::Default),
            "high-performance" => Ok(PowerPreference::HighPerformance),
            "low-power" => Ok(PowerPreference::LowPower),
            other => Err(format!(
                "unknown power preference '{other}' (expected default, high-performance or low-power)"
            )),
        }
    }
}

/// Attributes requested for the rendering context.
///
/// Every tier is asked for the same merged set; a tier that cannot honor a
/// soft hint (MSAA, mailbox presentation, a given alpha mode) degrades it
/// instead of failing.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ContextOptions {
    /// The drawing surface carries an alpha channel that is composited with the desktop.
    pub alpha: bool,

    /// Render through a multisampled color target.
    pub antialias: bool,

    /// Allocate a depth buffer alongside the color target.
    pub depth: bool,

    /// Low-latency presentation hint (mailbox instead of FIFO).
    pub desynchronized: bool,

    /// Refuse software (CPU) adapters.
    pub fail_if_major_performance_caveat: bool,

    pub power_preference: PowerPreference,

    /// Color output is premultiplied by alpha. Only meaningful with `alpha`.
    pub premultiplied_alpha: bool,

    /// Keep presented frames readable (surface textures gain `COPY_SRC`).
    pub preserve_drawing_buffer: bool,

    /// Allocate a stencil buffer alongside the color target.
    pub stencil: bool,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            alpha: false,
            antialias: true,
            depth: true,
            desynchronized: true,
            fail_if_major_performance_caveat: false,
            power_preference: PowerPreference::Default,
            premultiplied_alpha: false,
            preserve_drawing_buffer: false,
            stencil: true,
        }
    }
}

impl ContextOptions {
    /// Returns the defaults with every field present in `partial` overridden.
    pub fn merged(partial: &PartialContextOptions) -> Self {
        Self::default().with_overrides(partial)
    }

    /// Applies the fields present in `partial` on top of `self`.
    pub fn with_overrides(mut self, partial: &PartialContextOptions) -> Self {
        let PartialContextOptions {
            alpha,
            antialias,
            depth,
            desynchronized,
            fail_if_major_performance_caveat,
            power_preference,
            premultiplied_alpha,
            preserve_drawing_buffer,
            stencil,
        } = *partial;

        if let Some(v) = alpha {
            self.alpha = v;
        }
        if let Some(v) = antialias {
            self.antialias = v;
        }
        if let Some(v) = depth {
            self.depth = v;
        }
        if let Some(v) = desynchronized {
            self.desynchronized = v;
        }
        if let Some(v) = fail_if_major_performance_caveat {
            self.fail_if_major_performance_caveat = v;
        }
        if let Some(v) = power_preference {
            self.power_preference = v;
        }
        if let Some(v) = premultiplied_alpha {
            self.premultiplied_alpha = v;
        }
        if let Some(v) = preserve_drawing_buffer {
            self.preserve_drawing_buffer = v;
        }
        if let Some(v) = stencil {
            self.stencil = v;
        }
        self
    }

    /// Depth/stencil attachment format implied by `depth` and `stencil`.
    pub fn depth_stencil_format(&self) -> Option<wgpu::TextureFormat> {
        match (self.depth, self.stencil) {
            (true, true) => Some(wgpu::TextureFormat::Depth24PlusStencil8),
            (true, false) => Some(wgpu::TextureFormat::Depth32Float),
            (false, true) => Some(wgpu::TextureFormat::Stencil8),
            (false, false) => None,
        }
    }
}

/// Caller-supplied overrides; `None` keeps the default.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct PartialContextOptions {
    pub alpha: Option<bool>,
    pub antialias: Option<bool>,
    pub depth: Option<bool>,
    pub desynchronized: Option<bool>,
    pub fail_if_major_performance_caveat: Option<bool>,
    pub power_preference: Option<PowerPreference>,
    pub premultiplied_alpha: Option<bool>,
    pub preserve_drawing_buffer: Option<bool>,
    pub stencil: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_overrides_yield_defaults() {
        assert_eq!(
            ContextOptions::merged(&PartialContextOptions::default()),
            ContextOptions::default()
        );
    }

    #[test]
    fn each_override_is_independent() {
        let partial = PartialContextOptions {
            antialias: Some(false),
            power_preference: Some(PowerPreference::LowPower),
            ..Default::default()
        };
        let opts = ContextOptions::merged(&partial);

        assert!(!opts.antialias);
        assert_eq!(opts.power_preference, PowerPreference::LowPower);

        // Untouched fields keep their defaults.
        assert!(!opts.alpha);
        assert!(opts.depth);
        assert!(opts.desynchronized);
        assert!(opts.stencil);
    }

    #[test]
    fn override_can_restate_a_default() {
        let partial = PartialContextOptions {
            depth: Some(true),
            ..Default::default()
        };
        assert!(ContextOptions::merged(&partial).depth);
    }

    #[test]
    fn depth_stencil_format_follows_flags() {
        let mut opts = ContextOptions::default();
        assert_eq!(
            opts.depth_stencil_format(),
            Some(wgpu::TextureFormat::Depth24PlusStencil8)
        );

        opts.stencil = false;
        assert_eq!(opts.depth_stencil_format(), Some(wgpu::TextureFormat::Depth32Float));

        opts.depth = false;
        assert_eq!(opts.depth_stencil_format(), None);

        opts.stencil = true;
        assert_eq!(opts.depth_stencil_format(), Some(wgpu::TextureFormat::Stencil8));
    }

    #[test]
    fn power_preference_parses_host_names() {
        for p in [
            PowerPreference::Default,
            PowerPreference::HighPerformance,
            PowerPreference::LowPower,
        ] {
            assert_eq!(p.as_str().parse::<PowerPreference>(), Ok(p));
        }
        assert!("turbo".parse::<PowerPreference>().is_err());
    }
}
