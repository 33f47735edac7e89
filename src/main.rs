mod cli;
mod config;
mod normalize;
mod report;
mod run;
mod source;
mod structures;
mod tag;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use config::ReportConfig;
use std::io::Write;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = ReportConfig::from_cli(cli)?;
    // colored otherwise drops styling whenever stdout is not a terminal.
    colored::control::set_override(config.color);
    let source = config.open_source()?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let report = run::run_report(&config, source.as_ref(), &mut out)?;
    out.flush()?;

    let success = report.success();
    info!(success, exit_on_failure = config.exit_on_failure, "verdict");
    if !success && config.exit_on_failure {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
