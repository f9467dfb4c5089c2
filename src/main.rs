use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use webhook_submit::client::ReqwestTransport;
use webhook_submit::config::{AppConfig, Cli};
use webhook_submit::runner::Runner;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Logs go to stderr so stdout only carries the progress lines
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    info!("webhook-submit v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut runner = match build_runner(&cli) {
        Ok(runner) => runner,
        Err(e) => {
            eprintln!("[ERROR] {e:#}");
            return ExitCode::FAILURE;
        }
    };

    // The runner reports its own failures on stderr
    match runner.run().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

fn build_runner(cli: &Cli) -> Result<Runner<ReqwestTransport>> {
    let config = AppConfig::load(cli).context("Failed to load configuration")?;
    let transport = ReqwestTransport::new()?;
    Ok(Runner::new(config, transport).dry_run(cli.dry_run))
}
