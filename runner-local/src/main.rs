use anyhow::{Context, Result};
use clap::Parser;
use greeter_core::telemetry::init_tracing;
use greeter_core::{load_config, GreetingHandler};
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;

/// Invokes the greeter once outside of Lambda, e.g. from a shell or CI job.
///
/// Loads the config, runs the startup probe, reads one event and prints the
/// response JSON to stdout.
#[derive(Debug, Parser)]
#[command(name = "runner-local", version, about)]
struct Args {
    /// Event JSON file. Reads stdin when omitted.
    #[arg(short, long)]
    event: Option<PathBuf>,

    /// YAML config file. Falls back to GREETER_CONFIG, then defaults.
    #[arg(short, long)]
    config: Option<String>,

    #[arg(long, default_value = "local-invoke")]
    request_id: String,

    /// Print the startup report as JSON to stderr.
    #[arg(long)]
    report: bool,
}

fn read_event(path: Option<&PathBuf>) -> Result<Value> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read event file {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read event from stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("Event is not valid JSON")
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref()).context("Failed to load config")?;
    init_tracing(config.log_filter.as_deref());

    let handler = GreetingHandler::from_config(&config).context("Startup probe failed")?;
    if args.report {
        eprintln!("{}", serde_json::to_string_pretty(handler.report())?);
    }

    let event = read_event(args.event.as_ref())?;
    let response = handler
        .handle(&event, &args.request_id)
        .context("Invocation failed")?;

    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}
