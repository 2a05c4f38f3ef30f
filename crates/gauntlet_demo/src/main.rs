#![forbid(unsafe_code)]

//! # gauntlet-demo
//!
//! Runs the bundled sample suites through gauntlet.
//!
//! ## Usage
//!
//! ```bash
//! gauntlet-demo                      # Full colored report
//! gauntlet-demo --no-color -w 80     # Plain report, 80 columns
//! gauntlet-demo --list               # Suites in run order
//! RUST_LOG=gauntlet=debug gauntlet-demo
//! ```
//!
//! The process exits with the number of failed invocations.

mod cli;
mod suites;

use anyhow::Context;
use gauntlet::Config;
use gauntlet::session::discover;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();
    init_logging(&cli);

    let env = Config::from_env().context("invalid GAUNTLET_* environment")?;
    let config = cli.apply(env);
    tracing::debug!(config = %config.to_diagnostic_string(), "effective configuration");

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let modules = [suites::module()];

    if cli.list {
        for (module, suite) in discover(&modules) {
            println!("[{}] {} (priority {})", module.name(), suite.path(), suite.priority());
        }
        return Ok(());
    }

    let status = gauntlet::run_tests_with(config, &modules);
    tracing::info!(status, "finished");
    std::process::exit(status);
}

fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
