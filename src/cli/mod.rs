//! Command line front end: sanitize JSON payloads read from a file or stdin.

pub mod scrub;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "pii-filter", version, about = "Redact PII from telemetry events and queue messages")]
pub struct Cli {
    /// Configuration file. Defaults to ~/.config/pii-filter/config.yml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Filter an error-telemetry event.
    Event(InputArgs),
    /// Filter a queue message (only `Body` is inspected).
    Message(InputArgs),
    /// Filter an arbitrary JSON value.
    Value {
        #[command(flatten)]
        input: InputArgs,
        /// Depth budget for the depth limiter. Default: 3.
        #[arg(long)]
        max_depth: Option<usize>,
    },
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// JSON input file; reads stdin when omitted.
    pub file: Option<PathBuf>,

    /// Pretty-print the output.
    #[arg(long)]
    pub pretty: bool,
}
