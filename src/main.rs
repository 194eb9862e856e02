use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pytutor::Cli;

fn main() -> Result<()> {
    // Respect RUST_LOG; stay quiet by default so advice output is
    // all the user sees.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    pytutor::cli::run(cli)
}
