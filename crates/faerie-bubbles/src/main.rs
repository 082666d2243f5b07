use anyhow::Result;
use clap::Parser;
use winit::dpi::LogicalSize;

use faerie_bubbles::FaerieBubbles;
use faerie_bubbles::demo::DEFAULT_IMAGE;
use faerie_engine::device::{GpuInit, PartialContextOptions, PowerPreference};
use faerie_engine::logging::{LoggingConfig, init_logging};
use faerie_engine::window::{Runtime, RuntimeConfig};

/// A green quad you can tilt with the left and right arrow keys.
#[derive(Debug, Parser)]
#[command(name = "faerie-bubbles", version, about)]
struct Cli {
    /// Image to texture the quad with (path or file:// URL).
    #[arg(long, default_value = DEFAULT_IMAGE)]
    image: String,

    #[arg(long, default_value = "faerie bubbles")]
    title: String,

    /// Initial window width in logical pixels.
    #[arg(long, default_value_t = 640, value_parser = clap::value_parser!(u32).range(1..=16384))]
    width: u32,

    #[arg(long, default_value_t = 480, value_parser = clap::value_parser!(u32).range(1..=16384))]
    height: u32,

    /// Log filter in env_logger syntax; overrides RUST_LOG.
    #[arg(long, value_name = "FILTER")]
    log: Option<String>,

    /// Give the drawing surface an alpha channel.
    #[arg(long)]
    alpha: bool,

    #[arg(long)]
    no_antialias: bool,

    #[arg(long)]
    no_depth: bool,

    #[arg(long)]
    no_stencil: bool,

    /// Present with vsync (FIFO) instead of low-latency mailbox.
    #[arg(long)]
    no_desynchronized: bool,

    /// Refuse software adapters.
    #[arg(long)]
    fail_if_major_performance_caveat: bool,

    #[arg(long, value_name = "PREFERENCE")]
    power_preference: Option<PowerPreference>,

    #[arg(long)]
    premultiplied_alpha: bool,

    #[arg(long)]
    preserve_drawing_buffer: bool,
}

impl Cli {
    /// Only flags that were actually given become overrides.
    fn context_overrides(&self) -> PartialContextOptions {
        fn set(flag: bool, value: bool) -> Option<bool> {
            flag.then_some(value)
        }

        PartialContextOptions {
            alpha: set(self.alpha, true),
            antialias: set(self.no_antialias, false),
            depth: set(self.no_depth, false),
            desynchronized: set(self.no_desynchronized, false),
            fail_if_major_performance_caveat: set(self.fail_if_major_performance_caveat, true),
            power_preference: self.power_preference,
            premultiplied_alpha: set(self.premultiplied_alpha, true),
            preserve_drawing_buffer: set(self.preserve_drawing_buffer, true),
            stencil: set(self.no_stencil, false),
        }
    }

    fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            title: self.title.clone(),
            initial_size: LogicalSize::new(f64::from(self.width), f64::from(self.height)),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(LoggingConfig {
        env_filter: cli.log.clone(),
        ..Default::default()
    });

    let app = FaerieBubbles::new(&cli.context_overrides()).with_image(cli.image.clone());
    Runtime::run(cli.runtime_config(), GpuInit::default(), app)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("faerie-bubbles").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn no_flags_means_no_overrides() {
        let cli = parse(&[]);
        assert_eq!(cli.context_overrides(), PartialContextOptions::default());
        assert_eq!(cli.image, DEFAULT_IMAGE);
        assert_eq!(cli.runtime_config().initial_size, LogicalSize::new(640.0, 480.0));
    }

    #[test]
    fn negative_flags_turn_defaults_off() {
        let cli = parse(&["--no-antialias", "--no-stencil", "--no-desynchronized"]);
        let o = cli.context_overrides();
        assert_eq!(o.antialias, Some(false));
        assert_eq!(o.stencil, Some(false));
        assert_eq!(o.desynchronized, Some(false));
        assert_eq!(o.depth, None);
        assert_eq!(o.alpha, None);
    }

    #[test]
    fn power_preference_is_parsed() {
        let cli = parse(&["--power-preference", "high-performance", "--alpha"]);
        let o = cli.context_overrides();
        assert_eq!(o.power_preference, Some(PowerPreference::HighPerformance));
        assert_eq!(o.alpha, Some(true));

        assert!(Cli::try_parse_from(["faerie-bubbles", "--power-preference", "turbo"]).is_err());
    }

    #[test]
    fn window_flags_reach_runtime_config() {
        let cli = parse(&["--title", "bubbles", "--width", "800", "--height", "600"]);
        let config = cli.runtime_config();
        assert_eq!(config.title, "bubbles");
        assert_eq!(config.initial_size, LogicalSize::new(800.0, 600.0));
    }

    #[test]
    fn degenerate_window_sizes_are_rejected() {
        for args in [["--width", "0"], ["--height", "-5"], ["--width", "20000"]] {
            let parsed =
                Cli::try_parse_from(std::iter::once("faerie-bubbles").chain(args.iter().copied()));
            assert!(parsed.is_err(), "{args:?} should be rejected");
        }
    }
}
