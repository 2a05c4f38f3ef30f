//! Command-line interface for `gauntlet-demo`.
//!
//! Most flags fall back to their `GAUNTLET_*` variable. The result is
//! layered over [`Config::from_env`], so settings without a flag (the
//! color mode, `NO_COLOR`) still come from the environment.
//!
//! # Examples
//!
//! ```bash
//! # Run the bundled suites
//! gauntlet-demo
//!
//! # Plain 80-column report, only the addition cases
//! gauntlet-demo --no-color --width 80 --filter addition
//!
//! # Show the effective configuration
//! gauntlet-demo --print-config
//! ```

use clap::Parser;
use clap::builder::BoolishValueParser;
use gauntlet::{ColorMode, Config};

/// Runs the bundled sample suites and exits with the number of failures.
#[derive(Parser, Debug, Clone)]
#[expect(
    clippy::struct_excessive_bools,
    reason = "CLI flags are naturally bools"
)]
#[command(
    name = "gauntlet-demo",
    author,
    version,
    about = "Runs the bundled gauntlet sample suites",
    long_about = "Runs the bundled sample suites through gauntlet and exits with the \
                  number of failed invocations (255 when the session itself faulted)."
)]
pub struct Cli {
    /// Report width in characters (minimum 40)
    #[arg(long, short = 'w', env = "GAUNTLET_WIDTH")]
    pub width: Option<usize>,

    /// Force color output off
    #[arg(long)]
    pub no_color: bool,

    /// Force color output on, even when not writing to a terminal
    #[arg(long, conflicts_with = "no_color")]
    pub force_color: bool,

    /// Print a backtrace for panicking cases
    #[arg(long, env = "GAUNTLET_BACKTRACE", value_parser = BoolishValueParser::new())]
    pub backtrace: bool,

    /// Stop at the first failed invocation
    #[arg(long, env = "GAUNTLET_ABORT_ON_FAILURE", value_parser = BoolishValueParser::new())]
    pub abort_on_failure: bool,

    /// Only run cases whose name contains this text
    #[arg(long, short = 'f', env = "GAUNTLET_FILTER")]
    pub filter: Option<String>,

    /// List the suites in run order and exit
    #[arg(long)]
    pub list: bool,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    pub print_config: bool,

    /// Enable verbose logging (repeat for more)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Parse command line arguments.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Applies the flags on top of `base`.
    #[must_use]
    pub fn apply(&self, mut base: Config) -> Config {
        if let Some(width) = self.width {
            base.width = width;
        }
        if self.no_color {
            base.color_mode = ColorMode::Never;
        } else if self.force_color {
            base.color_mode = ColorMode::Always;
        }
        base.backtraces |= self.backtrace;
        base.abort_on_failure |= self.abort_on_failure;
        if let Some(filter) = &self.filter {
            base.filter = Some(filter.clone());
        }
        base
    }

    /// Default log filter for the verbosity, used when `RUST_LOG` is unset.
    #[must_use]
    pub const fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("gauntlet-demo").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn cli_defaults_keep_base() {
        let base = Config::new().with_width(90).with_filter("env");
        let config = parse(&[]).apply(base.clone());
        assert_eq!(config, base);
    }

    #[test]
    fn cli_flags_override_base() {
        let cli = parse(&[
            "--width",
            "80",
            "--no-color",
            "--backtrace",
            "--abort-on-failure",
            "--filter",
            "addition",
        ]);
        let config = cli.apply(Config::new().with_filter("env"));

        assert_eq!(config.width, 80);
        assert_eq!(config.color_mode, ColorMode::Never);
        assert!(config.backtraces);
        assert!(config.abort_on_failure);
        assert_eq!(config.filter.as_deref(), Some("addition"));
    }

    #[test]
    fn cli_force_color() {
        let config = parse(&["--force-color"]).apply(Config::new());
        assert_eq!(config.color_mode, ColorMode::Always);
    }

    #[test]
    fn cli_force_color_conflicts_with_no_color() {
        let result = Cli::try_parse_from(["gauntlet-demo", "--no-color", "--force-color"]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_verbosity_maps_to_filter() {
        assert_eq!(parse(&[]).log_filter(), "warn");
        assert_eq!(parse(&["-v"]).log_filter(), "info");
        assert_eq!(parse(&["-vv"]).log_filter(), "debug");
        assert_eq!(parse(&["-vvvv"]).log_filter(), "trace");
    }
}
