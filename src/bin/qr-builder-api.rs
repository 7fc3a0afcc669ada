use anyhow::Context;
use clap::Parser;
use qr_builder::config::Config;
use std::path::PathBuf;

/// QR Builder HTTP API
#[derive(Parser, Debug)]
#[command(name = "qr-builder-api")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "QR_BUILDER_CONFIG")]
    config: Option<PathBuf>,

    /// Bind address (overrides config and QR_BUILDER_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides config and QR_BUILDER_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Test configuration and exit
    #[arg(long)]
    test: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(host) = args.host {
        config.server.address = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate().context("Invalid configuration")?;

    qr_builder::logging::init_subscriber(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::info!(
        server_address = %config.server.address,
        server_port = config.server.port,
        max_upload_bytes = config.server.max_upload_bytes,
        default_size = config.render.default_size,
        "Configuration loaded successfully"
    );

    if args.test {
        tracing::info!("Configuration test passed");
        return Ok(());
    }

    qr_builder::server::serve(config).await
}
