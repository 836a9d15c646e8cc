//! Command-line entry point for declgen.
//!
//! Loads configuration from arguments, the environment or a TOML job file,
//! installs logging on stderr, and runs each job through the control plane.

mod config;
mod jobs;

use declgen_core::control::DeclgenControlPlane;
use tracing_subscriber::EnvFilter;

use crate::config::DeclgenConfig;
use crate::jobs::run_job;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = DeclgenConfig::from_args()?;
    init_tracing(&config.log_filter);

    let control = DeclgenControlPlane::new();
    for job in config.jobs {
        run_job(&control, job).await?;
    }
    Ok(())
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
