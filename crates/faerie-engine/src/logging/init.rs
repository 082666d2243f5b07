use std::sync::Once;

/// Logger settings, usually filled from the command line.
///
/// `env_filter` uses `env_logger` directive syntax, e.g.
/// `"faerie_bubbles=debug,wgpu_hal=warn"`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

/// wgpu logs every probed adapter at info.
const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";

static INIT: Once = Once::new();

/// Picks the filter directives: explicit, then `RUST_LOG`, then the default.
/// Blank values are skipped.
fn resolve_filter(explicit: Option<&str>, env: Option<&str>) -> String {
    [explicit, env]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|f| !f.is_empty())
        .unwrap_or(DEFAULT_FILTER)
        .to_string()
}

/// Installs the `env_logger` backend. Only the first call has any effect,
/// and a logger installed by someone else is left alone.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let env = std::env::var("RUST_LOG").ok();
        let filter = resolve_filter(config.env_filter.as_deref(), env.as_deref());

        let installed = env_logger::Builder::new()
            .parse_filters(&filter)
            .write_style(config.write_style)
            .format_timestamp_millis()
            .try_init();

        match installed {
            Ok(()) => log::debug!("logging initialized with '{filter}'"),
            Err(e) => log::debug!("keeping existing logger: {e}"),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_wins() {
        assert_eq!(resolve_filter(Some("debug"), Some("warn")), "debug");
    }

    #[test]
    fn env_used_when_no_explicit_filter() {
        assert_eq!(resolve_filter(None, Some("faerie_bubbles=trace")), "faerie_bubbles=trace");
        assert_eq!(resolve_filter(Some("  "), Some("warn")), "warn");
    }

    #[test]
    fn falls_back_to_quiet_wgpu_default() {
        assert_eq!(resolve_filter(None, None), DEFAULT_FILTER);
        assert_eq!(resolve_filter(Some(""), Some("")), DEFAULT_FILTER);
    }
}
