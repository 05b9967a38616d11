use clap::Parser;
use tracing::Level;

use pii_filter::cli::{scrub, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    scrub::run(&cli)?;
    Ok(())
}
