use std::io::{Read, Write};
use std::sync::Arc;

use crate::config::{default_config_path, FilterConfig};
use crate::error::Result;
use crate::filter::{PiiData, TracingLogger};
use crate::pipeline::PayloadFilter;

use super::{Cli, Command, InputArgs};

/// Read one JSON payload, filter it and print the result to stdout.
pub fn run(cli: &Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = FilterConfig::load_from(&config_path)?;
    let logger = Arc::new(TracingLogger);

    let filter: Box<dyn PayloadFilter> = match &cli.command {
        Command::Event(_) => Box::new(config.event_filter(logger)?),
        Command::Message(_) => Box::new(config.queue_filter(logger)?),
        Command::Value { max_depth, .. } => Box::new(config.generic_pipeline(*max_depth, logger)?),
    };
    let input = match &cli.command {
        Command::Event(input) | Command::Message(input) | Command::Value { input, .. } => input,
    };

    let payload = read_payload(input)?;
    let filtered = filter.filter(payload);

    let rendered = if input.pretty {
        serde_json::to_string_pretty(&filtered)?
    } else {
        serde_json::to_string(&filtered)?
    };
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", rendered)?;
    Ok(())
}

fn read_payload(input: &InputArgs) -> Result<PiiData> {
    let contents = match &input.file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    Ok(serde_json::from_str(&contents)?)
}
