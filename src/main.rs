use anyhow::Context;
use clap::Parser;
use qr_builder::cli::{self, Cli};
use qr_builder::config::{Config, LoggingConfig};
use qr_builder::pipeline::QrBuilder;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Cli::parse();

    // Initialize logging subsystem
    if let Err(e) = qr_builder::logging::init_subscriber(&LoggingConfig::compact(&args.log_level)) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "Command failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Cli) -> anyhow::Result<()> {
    let config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    if let Some(path) = &args.config {
        tracing::debug!(config_file = %path.display(), "Configuration loaded");
    }

    let builder = QrBuilder::new(&config.render, &config.artistic);
    cli::execute(&args.command, &builder, config.render.default_size as i64)?;
    Ok(())
}
