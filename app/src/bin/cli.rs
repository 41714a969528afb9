//! Command-line entry point.
//!
//! Every invocation opens the local database, runs the startup refresh pass
//! and then executes a single command.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use wallet_notifier_lib::cli::{self, Cli};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    let (db, config, dir) = wallet_notifier_lib::init_foundation()?;
    tracing::debug!("Data directory: {}", dir.display());

    cli::run(args, &db, &config)
}
